//! Error types.
//!
//! Structural errors (`GraphError`) are returned before any mutation. Numeric
//! faults (`Fault`) never leave `compute`: they turn outputs undefined.
//! `SymbolicUnsupported` only comes out of proof encoding.

use thiserror::Error;

use crate::algo::AlgoId;
use crate::object::{ObjectId, ObjectKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("object {0} does not exist")]
    UnknownObject(ObjectId),
    #[error("algorithm {0} does not exist")]
    UnknownAlgorithm(AlgoId),
    #[error("{algo}: expected {expected}, got {got}")]
    ArityMismatch {
        algo: &'static str,
        expected: String,
        got: String,
    },
    #[error("object {id} is a {actual:?}, expected {expected:?}")]
    KindMismatch {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },
    #[error("label `{0}` is already taken")]
    DuplicateLabel(String),
    #[error("object {0} is produced by an algorithm")]
    NotFree(ObjectId),
    #[error("object {target} would depend on itself")]
    CyclicDependency { target: ObjectId },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Numeric failure inside `compute`, absorbed as undefined outputs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("degenerate input")]
    DegenerateInput,
    #[error("undefined input")]
    UndefinedInput,
}

/// Why a proof encoding is not available.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolicUnsupported {
    /// The variant has no encoding at all; retrying never helps.
    #[error("{algo} ({kind}) has no symbolic encoding")]
    NoEncoding { algo: AlgoId, kind: &'static str },
    /// An input lacks the variable bindings the encoding needs. May succeed
    /// after a structural edit upstream.
    #[error("{algo}: input {object} carries no symbolic binding")]
    MissingBindings { algo: AlgoId, object: ObjectId },
    #[error("algorithm {0} does not exist")]
    UnknownAlgorithm(AlgoId),
}

impl SymbolicUnsupported {
    /// Whether a later structural change could make the encoding available.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, SymbolicUnsupported::MissingBindings { .. })
    }
}
