//! Construction graph: arena of objects and algorithms, recomputed in
//! dependency order.
//!
//! Purpose
//! - Own every object and algorithm, keep the dependency relation acyclic and
//!   recompute exactly the dependent closure of a change, in a cached
//!   topological order.
//!
//! Model
//! - Objects and algorithms live in arenas (`store.rs`), addressed by
//!   `ObjectId`/`AlgoId`. Edges are id sets; nothing holds references into the
//!   arenas across calls.
//! - The topological order (`topo.rs`) is cached and dropped on structural
//!   edits only (add/remove object or algorithm, redefinition). Value updates
//!   reuse it.
//! - Structural errors are detected before the first mutation, so a rejected
//!   edit leaves the graph as it was.
//! - Modes live in one `EvalCtx`, copied into every compute. `scoped` hands out
//!   a guard that restores the previous mode when dropped.
//!
//! Code cross-refs: `algo::AlgoNode::compute`, `continuity`, `prover::Encoder`.

mod edit;
mod eval;
mod store;
mod topo;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::algo::{AlgoId, AlgoNode};
use crate::ctx::{EvalCtx, Mode, ModeScope};
use crate::error::{GraphError, GraphResult, SymbolicUnsupported};
use crate::object::{GeoObject, ObjectId, Payload};
use crate::prover::Encoder;
use crate::symbolic::Polynomial;

pub use store::Store;

/// Observer of recomputations; receives the ids of every object touched by
/// one update. Not called while the construction is quiet.
pub trait UpdateListener {
    fn updated(&mut self, ids: &[ObjectId]);
}

/// The construction: objects, algorithms, labels, modes, proof encoder.
pub struct Construction {
    store: Store,
    labels: HashMap<String, ObjectId>,
    label_next: HashMap<&'static str, usize>,
    topo: Option<Vec<AlgoId>>,
    ctx: EvalCtx,
    listeners: Vec<Box<dyn UpdateListener>>,
    prover: Encoder,
}

impl Default for Construction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Construction")
            .field("objects", &self.store.objects().count())
            .field("algorithms", &self.store.algorithms().count())
            .field("ctx", &self.ctx)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Construction {
    pub fn new() -> Self {
        Self {
            store: Store::default(),
            labels: HashMap::new(),
            label_next: HashMap::new(),
            topo: None,
            ctx: EvalCtx::default(),
            listeners: Vec::new(),
            prover: Encoder::default(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn object(&self, id: ObjectId) -> Option<&GeoObject> {
        self.store.object(id)
    }

    pub fn algorithm(&self, id: AlgoId) -> Option<&AlgoNode> {
        self.store.algorithm(id)
    }

    /// `(defined, payload)` of an object. The payload of an undefined object
    /// is its last computed value.
    pub fn object_state(&self, id: ObjectId) -> GraphResult<(bool, &Payload)> {
        self.store
            .object(id)
            .map(|o| (o.defined, &o.payload))
            .ok_or(GraphError::UnknownObject(id))
    }

    pub fn find(&self, label: &str) -> Option<ObjectId> {
        self.labels.get(label).copied()
    }

    pub fn label(&self, id: ObjectId) -> Option<&str> {
        self.store.object(id).map(|o| o.label.as_str())
    }

    /// Cached topological order of all live algorithms.
    pub fn topo_order(&mut self) -> &[AlgoId] {
        let store = &self.store;
        self.topo.get_or_insert_with(|| topo::order(store))
    }

    pub fn ctx(&self) -> EvalCtx {
        self.ctx
    }

    pub(crate) fn ctx_mut(&mut self) -> &mut EvalCtx {
        &mut self.ctx
    }

    pub fn set_continuous_mode(&mut self, on: bool) {
        if self.ctx.continuous != on && !self.ctx.quiet {
            tracing::debug!(on, "continuous mode");
        }
        self.ctx.continuous = on;
    }

    /// Override one mode until the returned guard is dropped.
    pub fn scoped(&mut self, mode: Mode, on: bool) -> ModeScope<'_> {
        ModeScope::new(self, mode, on)
    }

    pub fn add_listener(&mut self, listener: Box<dyn UpdateListener>) {
        self.listeners.push(listener);
    }

    /// Polynomial encoding of one construction step for a symbolic prover.
    ///
    /// Lazy and cached; numeric recomputation never touches the cache.
    pub fn encode_for_proof(&mut self, algo: AlgoId) -> Result<Arc<[Polynomial]>, SymbolicUnsupported> {
        self.prover.encode(&self.store, algo)
    }

    pub fn prover(&self) -> &Encoder {
        &self.prover
    }

    fn invalidate_structure(&mut self) {
        self.topo = None;
    }
}

#[cfg(test)]
mod tests;
