//! Value updates and recomputation.

use std::collections::BTreeSet;

use super::Construction;
use crate::algo::AlgoId;
use crate::error::{GraphError, GraphResult};
use crate::object::{ObjectId, Payload};

impl Construction {
    /// Replace the value of a free object and recompute everything below it.
    ///
    /// Numbers keep their slider bounds unless the new value brings its own,
    /// and are clamped to them.
    pub fn set_input_value(&mut self, id: ObjectId, payload: Payload) -> GraphResult<Vec<ObjectId>> {
        let obj = self.store.object_mut(id).ok_or(GraphError::UnknownObject(id))?;
        if !obj.is_free() {
            return Err(GraphError::NotFree(id));
        }
        if obj.kind() != payload.kind() {
            return Err(GraphError::KindMismatch {
                id,
                expected: obj.kind(),
                actual: payload.kind(),
            });
        }
        let payload = match (&obj.payload, payload) {
            (Payload::Number(old), Payload::Number(mut new)) => {
                new.bounds = new.bounds.or(old.bounds);
                Payload::Number(new.clamped())
            }
            (_, p) => p,
        };
        obj.defined = payload.is_valid();
        obj.payload = payload;
        Ok(self.recompute(&BTreeSet::from([id])))
    }

    /// Recompute the dependent closure of `changed` in topological order.
    ///
    /// Returns every touched object: `changed` first, then the outputs of the
    /// recomputed algorithms in run order.
    pub fn recompute(&mut self, changed: &BTreeSet<ObjectId>) -> Vec<ObjectId> {
        let algos = self.store.dependent_algos(changed.iter().copied());
        self.run_algos(&algos, changed.iter().copied().collect())
    }

    /// Recompute every algorithm.
    pub fn recompute_all(&mut self) -> Vec<ObjectId> {
        let all: BTreeSet<AlgoId> = self.store.algorithms().map(|a| a.id).collect();
        self.run_algos(&all, Vec::new())
    }

    pub(super) fn run_algos(&mut self, algos: &BTreeSet<AlgoId>, mut touched: Vec<ObjectId>) -> Vec<ObjectId> {
        let ctx = self.ctx;
        let order: Vec<AlgoId> = self
            .topo_order()
            .iter()
            .copied()
            .filter(|a| algos.contains(a))
            .collect();
        for a in &order {
            touched.extend(self.store.run(*a, ctx));
        }
        if !ctx.quiet {
            tracing::trace!(algos = order.len(), objects = touched.len(), "recomputed");
            for l in self.listeners.iter_mut() {
                l.updated(&touched);
            }
        }
        touched
    }
}
