//! Structural edits: create, redefine, remove, relabel.
//!
//! Every edit validates first and mutates second; on error nothing changed.

use std::collections::BTreeSet;

use super::Construction;
use crate::algo::{AlgoId, AlgoKind, AlgoNode};
use crate::error::{GraphError, GraphResult};
use crate::object::{GeoObject, ObjectId, ObjectKind, Payload};

impl Construction {
    /// Free object with an automatic label (`P1`, `l3`, ...).
    pub fn create_object(&mut self, payload: Payload) -> ObjectId {
        let label = self.fresh_label(payload.kind());
        self.insert_object(label, payload, None)
    }

    pub fn create_object_labeled(&mut self, label: &str, payload: Payload) -> GraphResult<ObjectId> {
        if self.labels.contains_key(label) {
            return Err(GraphError::DuplicateLabel(label.to_owned()));
        }
        Ok(self.insert_object(label.to_owned(), payload, None))
    }

    pub fn relabel(&mut self, id: ObjectId, label: &str) -> GraphResult<()> {
        match self.labels.get(label) {
            Some(owner) if *owner == id => return Ok(()),
            Some(_) => return Err(GraphError::DuplicateLabel(label.to_owned())),
            None => {}
        }
        let obj = self.store.object_mut(id).ok_or(GraphError::UnknownObject(id))?;
        let old = std::mem::replace(&mut obj.label, label.to_owned());
        self.labels.remove(&old);
        self.labels.insert(label.to_owned(), id);
        Ok(())
    }

    /// Add an algorithm over existing objects, allocate its outputs and compute
    /// them once.
    pub fn create_algorithm(&mut self, kind: AlgoKind, inputs: &[ObjectId]) -> GraphResult<AlgoId> {
        self.check_inputs(kind, inputs)?;
        let kind = self.resolve(kind, inputs);
        let aid = self.store.next_algo_id();
        let outputs: Vec<ObjectId> = kind
            .output_kinds()
            .into_iter()
            .map(|k| {
                let label = self.fresh_label(k);
                self.insert_object(label, Payload::empty(k), Some(aid))
            })
            .collect();
        self.store
            .push_algorithm(AlgoNode::new(aid, kind, inputs.to_vec(), outputs.clone()));
        self.invalidate_structure();
        if !self.ctx.quiet {
            tracing::debug!(algo = %aid, kind = kind.name(), outputs = outputs.len(), "algorithm added");
        }
        self.run_algos(&BTreeSet::from([aid]), Vec::new());
        Ok(aid)
    }

    /// Make the free object `target` the single output of a new algorithm.
    ///
    /// Rejected with `CyclicDependency` when any input is `target` or is
    /// computed from it.
    pub fn redefine(&mut self, target: ObjectId, kind: AlgoKind, inputs: &[ObjectId]) -> GraphResult<AlgoId> {
        let obj = self.store.object(target).ok_or(GraphError::UnknownObject(target))?;
        if !obj.is_free() {
            return Err(GraphError::NotFree(target));
        }
        let target_kind = obj.kind();
        self.check_inputs(kind, inputs)?;
        if inputs.iter().any(|i| self.store.depends_on(*i, target)) {
            return Err(GraphError::CyclicDependency { target });
        }
        let kind = self.resolve(kind, inputs);
        match kind.output_kinds().as_slice() {
            [k] if *k == target_kind => {}
            [k] => {
                return Err(GraphError::KindMismatch {
                    id: target,
                    expected: target_kind,
                    actual: *k,
                })
            }
            other => {
                return Err(GraphError::ArityMismatch {
                    algo: kind.name(),
                    expected: "a single output".to_owned(),
                    got: format!("{} outputs", other.len()),
                })
            }
        }

        let aid = self.store.next_algo_id();
        let downstream = self.store.dependent_algos([target]);
        self.prover.invalidate(downstream.iter().copied());
        self.prover.forget_object(target);
        if let Some(obj) = self.store.object_mut(target) {
            obj.parent = Some(aid);
        }
        self.store
            .push_algorithm(AlgoNode::new(aid, kind, inputs.to_vec(), vec![target]));
        self.invalidate_structure();
        if !self.ctx.quiet {
            tracing::debug!(%target, algo = %aid, kind = kind.name(), "object redefined");
        }
        let mut run = downstream;
        run.insert(aid);
        self.run_algos(&run, Vec::new());
        Ok(aid)
    }

    /// Delete a free object. Its consumers keep the dangling input and their
    /// outputs (and everything below) become undefined; labels are kept.
    pub fn remove_object(&mut self, id: ObjectId) -> GraphResult<()> {
        let obj = self.store.object(id).ok_or(GraphError::UnknownObject(id))?;
        if !obj.is_free() {
            return Err(GraphError::NotFree(id));
        }
        let downstream = self.store.dependent_algos([id]);
        if let Some(obj) = self.store.take_object(id) {
            self.labels.remove(&obj.label);
        }
        self.prover.invalidate(downstream.iter().copied());
        self.prover.forget_object(id);
        self.invalidate_structure();
        if !self.ctx.quiet {
            tracing::debug!(object = %id, orphaned = downstream.len(), "object removed");
        }
        self.run_algos(&downstream, vec![id]);
        Ok(())
    }

    /// Delete an algorithm together with its outputs; consumers of the outputs
    /// are orphaned like in [`Construction::remove_object`].
    pub fn remove_algorithm(&mut self, id: AlgoId) -> GraphResult<()> {
        let outputs = self
            .store
            .algorithm(id)
            .map(|n| n.outputs.clone())
            .ok_or(GraphError::UnknownAlgorithm(id))?;
        let mut downstream = self.store.dependent_algos(outputs.iter().copied());
        downstream.remove(&id);
        self.store.take_algorithm(id);
        for o in &outputs {
            if let Some(obj) = self.store.take_object(*o) {
                self.labels.remove(&obj.label);
            }
            self.prover.forget_object(*o);
        }
        self.prover.invalidate(downstream.iter().copied().chain([id]));
        self.invalidate_structure();
        if !self.ctx.quiet {
            tracing::debug!(algo = %id, orphaned = downstream.len(), "algorithm removed");
        }
        self.run_algos(&downstream, outputs);
        Ok(())
    }

    fn check_inputs(&self, kind: AlgoKind, inputs: &[ObjectId]) -> GraphResult<()> {
        let kinds = inputs
            .iter()
            .map(|i| self.store.object(*i).map(GeoObject::kind).ok_or(GraphError::UnknownObject(*i)))
            .collect::<GraphResult<Vec<ObjectKind>>>()?;
        let arity = kind.arity();
        if !arity.accepts(&kinds) {
            return Err(GraphError::ArityMismatch {
                algo: kind.name(),
                expected: arity.to_string(),
                got: format!("{kinds:?}"),
            });
        }
        Ok(())
    }

    fn resolve(&self, kind: AlgoKind, inputs: &[ObjectId]) -> AlgoKind {
        let payloads: Vec<&Payload> = inputs
            .iter()
            .filter_map(|i| self.store.object(*i).map(|o| &o.payload))
            .collect();
        kind.resolve(&payloads)
    }

    fn insert_object(&mut self, label: String, payload: Payload, parent: Option<AlgoId>) -> ObjectId {
        let id = self.store.next_object_id();
        let defined = parent.is_none() && payload.is_valid();
        self.labels.insert(label.clone(), id);
        self.store.push_object(GeoObject {
            id,
            label,
            payload,
            defined,
            parent,
        })
    }

    fn fresh_label(&mut self, kind: ObjectKind) -> String {
        let prefix = kind.label_prefix();
        let next = self.label_next.entry(prefix).or_insert(1);
        loop {
            let label = format!("{prefix}{next}");
            *next += 1;
            if !self.labels.contains_key(&label) {
                return label;
            }
        }
    }
}
