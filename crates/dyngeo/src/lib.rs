//! Dependency-driven geometric constructions.
//!
//! A construction is a DAG of geometric objects (points, lines, conics,
//! functions, numbers, polygons) and the algorithms deriving them. Changing a
//! free object recomputes its dependent closure in topological order;
//! multi-valued algorithms pick the branch nearest their previous state when
//! continuous mode is on; single steps can be exported as polynomial systems
//! for an algebraic prover.
//!
//! Layout
//! - `numeric`, `symbolic`: pure primitives (no graph state).
//! - `object`, `algo`: node types and the one `compute` dispatch.
//! - `graph`: arena, edits, recomputation. `ctx` holds the modes.
//! - `continuity`, `roots`: branch selection and bounded root search.
//! - `prover`: cached polynomial encodings.
//! - `rand`: reproducible random constructions for tests and benches.
//!
//! API Policy
//! - `api` is the curated surface; module paths may move.

pub mod algo;
pub mod api;
mod cfg;
pub mod continuity;
pub mod ctx;
pub mod error;
pub mod graph;
pub mod numeric;
pub mod object;
pub mod prover;
pub mod rand;
pub mod roots;
pub mod symbolic;

pub use cfg::{ELLIPSE_MARGIN, NUMERIC_INTERSECTION_SLOTS, OPEN_CONIC_MARGIN};

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::algo::{AlgoId, AlgoKind};
    pub use crate::ctx::{EvalCtx, Mode};
    pub use crate::error::{GraphError, GraphResult, SymbolicUnsupported};
    pub use crate::graph::{Construction, UpdateListener};
    pub use crate::numeric::{Conic, Expr, Function};
    pub use crate::object::{Number, ObjectId, ObjectKind, Payload};
    pub use nalgebra::{Vector2 as Vec2, Vector3 as Vec3};
}
