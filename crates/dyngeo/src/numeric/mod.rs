//! Numeric primitives: homogeneous points/lines, conics, univariate
//! polynomials and small real functions.
//!
//! Everything here is a pure function of its arguments. Degenerate inputs are
//! reported through `Option`, never by dividing by zero.
//!
//! Conventions
//! - Points and lines are homogeneous `Vector3<f64>`; the line `(a, b, c)` is
//!   `a x + b y + c = 0` and its direction is `(b, -a)`.
//! - Conics are stored as the flat symmetric matrix
//!   `[A00, A11, A22, A01, A02, A12]`, i.e.
//!   `A00 x² + A11 y² + A22 + 2 A01 xy + 2 A02 x + 2 A12 y = 0`.

pub mod conic;
pub mod func;
pub mod hull;
pub mod upoly;
mod util;

pub use conic::{Conic, ConicType};
pub use func::{Expr, Function};
pub use hull::convex_hull;
pub use upoly::UPoly;
pub use util::{direction, inhom, is_infinite, join, meet, same_line, unit};
