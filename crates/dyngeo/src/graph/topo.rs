//! Topological order of algorithms (Kahn, smallest id first among ready nodes).

use std::collections::{BTreeMap, BTreeSet};

use super::store::Store;
use crate::algo::AlgoId;

/// Every live algorithm after all producers of its inputs.
///
/// Ties are broken by ascending id, so the order is a pure function of the
/// graph's structure.
pub(super) fn order(store: &Store) -> Vec<AlgoId> {
    let mut indeg: BTreeMap<AlgoId, usize> = BTreeMap::new();
    for node in store.algorithms() {
        let n = node
            .inputs
            .iter()
            .filter(|i| {
                store
                    .object(**i)
                    .and_then(|o| o.parent)
                    .is_some_and(|p| store.algorithm(p).is_some())
            })
            .count();
        indeg.insert(node.id, n);
    }

    let mut ready: BTreeSet<AlgoId> = indeg.iter().filter(|(_, d)| **d == 0).map(|(a, _)| *a).collect();
    let mut out = Vec::with_capacity(indeg.len());
    while let Some(a) = ready.pop_first() {
        out.push(a);
        let Some(node) = store.algorithm(a) else { continue };
        for o in &node.outputs {
            for c in store.consumers(*o) {
                let Some(consumer) = store.algorithm(c) else { continue };
                let uses = consumer.inputs.iter().filter(|i| *i == o).count();
                if let Some(d) = indeg.get_mut(&c) {
                    *d -= uses;
                    if *d == 0 {
                        ready.insert(c);
                    }
                }
            }
        }
    }
    debug_assert_eq!(out.len(), indeg.len(), "construction graph has a cycle");
    out
}
