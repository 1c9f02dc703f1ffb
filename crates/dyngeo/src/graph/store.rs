//! Arenas and dependency edges.
//!
//! Ids are arena indices and are never reused; removed entries leave `None`
//! behind. Edges are id sets: object → consuming algorithms here, algorithm →
//! inputs/outputs on the node itself.

use std::collections::{BTreeMap, BTreeSet};

use crate::algo::{AlgoId, AlgoNode};
use crate::ctx::EvalCtx;
use crate::object::{GeoObject, ObjectId, Payload};

#[derive(Clone, Debug, Default)]
pub struct Store {
    objects: Vec<Option<GeoObject>>,
    algos: Vec<Option<AlgoNode>>,
    consumers: BTreeMap<ObjectId, BTreeSet<AlgoId>>,
}

impl Store {
    pub fn object(&self, id: ObjectId) -> Option<&GeoObject> {
        self.objects.get(id.0).and_then(Option::as_ref)
    }

    pub fn algorithm(&self, id: AlgoId) -> Option<&AlgoNode> {
        self.algos.get(id.0).and_then(Option::as_ref)
    }

    /// Live objects in id order.
    pub fn objects(&self) -> impl Iterator<Item = &GeoObject> {
        self.objects.iter().flatten()
    }

    /// Live algorithms in id order.
    pub fn algorithms(&self) -> impl Iterator<Item = &AlgoNode> {
        self.algos.iter().flatten()
    }

    /// Algorithms reading `id`.
    pub fn consumers(&self, id: ObjectId) -> impl Iterator<Item = AlgoId> + '_ {
        self.consumers.get(&id).into_iter().flatten().copied()
    }

    /// Current value of an object, `None` if missing or undefined.
    pub fn value(&self, id: ObjectId) -> Option<&Payload> {
        self.object(id).and_then(GeoObject::value)
    }

    pub(super) fn next_object_id(&self) -> ObjectId {
        ObjectId(self.objects.len())
    }

    pub(super) fn next_algo_id(&self) -> AlgoId {
        AlgoId(self.algos.len())
    }

    pub(super) fn object_mut(&mut self, id: ObjectId) -> Option<&mut GeoObject> {
        self.objects.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(super) fn push_object(&mut self, obj: GeoObject) -> ObjectId {
        let id = obj.id;
        debug_assert_eq!(id, self.next_object_id());
        self.objects.push(Some(obj));
        id
    }

    /// Insert an algorithm and register it as consumer of its inputs.
    pub(super) fn push_algorithm(&mut self, node: AlgoNode) -> AlgoId {
        let id = node.id;
        debug_assert_eq!(id, self.next_algo_id());
        for i in &node.inputs {
            self.consumers.entry(*i).or_default().insert(id);
        }
        self.algos.push(Some(node));
        id
    }

    pub(super) fn take_object(&mut self, id: ObjectId) -> Option<GeoObject> {
        self.consumers.remove(&id);
        self.objects.get_mut(id.0).and_then(Option::take)
    }

    /// Remove an algorithm and its consumer edges. Outputs stay in place.
    pub(super) fn take_algorithm(&mut self, id: AlgoId) -> Option<AlgoNode> {
        let node = self.algos.get_mut(id.0).and_then(Option::take)?;
        for i in &node.inputs {
            if let Some(set) = self.consumers.get_mut(i) {
                set.remove(&id);
                if set.is_empty() {
                    self.consumers.remove(i);
                }
            }
        }
        Some(node)
    }

    /// Algorithms that (transitively) read any of `seeds`.
    pub fn dependent_algos<I>(&self, seeds: I) -> BTreeSet<AlgoId>
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<ObjectId> = seeds.into_iter().collect();
        while let Some(o) = stack.pop() {
            for a in self.consumers(o) {
                if seen.insert(a) {
                    if let Some(node) = self.algorithm(a) {
                        stack.extend(node.outputs.iter().copied());
                    }
                }
            }
        }
        seen
    }

    /// Whether `id` is `target` or is computed from it.
    pub fn depends_on(&self, id: ObjectId, target: ObjectId) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(o) = stack.pop() {
            if o == target {
                return true;
            }
            if !seen.insert(o) {
                continue;
            }
            let parent = self.object(o).and_then(|x| x.parent);
            if let Some(node) = parent.and_then(|a| self.algorithm(a)) {
                stack.extend(node.inputs.iter().copied());
            }
        }
        false
    }

    /// Run one algorithm on the current input values and store its outputs.
    ///
    /// Missing (removed) inputs count as undefined. Returns the output ids.
    pub(super) fn run(&mut self, id: AlgoId, ctx: EvalCtx) -> Vec<ObjectId> {
        let Store { objects, algos, .. } = self;
        let Some(node) = algos.get_mut(id.0).and_then(Option::as_mut) else {
            return Vec::new();
        };
        let inputs: Vec<Option<&Payload>> = node
            .inputs
            .iter()
            .map(|i| objects.get(i.0).and_then(Option::as_ref).and_then(GeoObject::value))
            .collect();
        let out = node.compute(&inputs, ctx);
        for (oid, val) in node.outputs.iter().zip(out) {
            let Some(obj) = objects.get_mut(oid.0).and_then(Option::as_mut) else {
                continue;
            };
            match val {
                Some(p) => {
                    obj.defined = p.is_valid();
                    obj.payload = p;
                }
                // keep the stale payload around; only the flag matters
                None => obj.defined = false,
            }
        }
        node.outputs.clone()
    }
}
