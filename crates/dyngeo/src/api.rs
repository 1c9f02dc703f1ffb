//! Curated API for callers (CLI, benches, external provers).
//!
//! Important
//! - Convenience re-exports only; nothing here has behaviour of its own.
//! - Prefer these paths over deep module paths in callers.

// Graph and modes
pub use crate::ctx::{EvalCtx, Mode, ModeScope};
pub use crate::graph::{Construction, Store, UpdateListener};
// Objects and algorithms
pub use crate::algo::{search_interval, AlgoId, AlgoKind, AlgoNode, Arity, Scratch};
pub use crate::object::{GeoObject, Number, ObjectId, ObjectKind, Payload};
// Errors
pub use crate::error::{GraphError, GraphResult, SymbolicUnsupported};
// Numerics
pub use crate::numeric::{convex_hull, Conic, ConicType, Expr, Function, UPoly};
pub use crate::roots::{find_root_points, find_roots, RootCfg};
// Proof encodings
pub use crate::prover::Encoder;
pub use crate::symbolic::{Polynomial, Var, VarPool};
// Random constructions
pub use crate::rand::{drag_free_points, populate, RandomCfg, ReplayToken};
