//! Branch selection for multi-valued algorithms ("near-to" rule).
//!
//! Two flavours, both pure tie-breaking over an already computed set of valid
//! outputs:
//! - directions: keep each slot in the hemisphere of its previous direction;
//! - points: give each slot the candidate nearest its previous position.
//!
//! With continuous mode off the caller uses the canonical order instead and
//! ignores history.

use std::cmp::Ordering;

use nalgebra::Vector2;

/// Candidate `cand` oriented into the hemisphere of `prev`.
///
/// Returns the (possibly flipped) candidate and whether it was flipped. No
/// history, or a zero previous vector, keeps the candidate as is.
#[inline]
pub fn align(prev: Option<Vector2<f64>>, cand: Vector2<f64>) -> (Vector2<f64>, bool) {
    match prev {
        Some(p) if p.dot(&cand) < 0.0 => (-cand, true),
        _ => (cand, false),
    }
}

/// Lexicographic (x, then y) order used when history is ignored.
pub fn canonical_cmp(a: &Vector2<f64>, b: &Vector2<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Candidates sorted canonically into `slots` slots; extras are dropped.
pub fn canonical_order(cands: &[Vector2<f64>], slots: usize) -> Vec<Option<Vector2<f64>>> {
    let mut sorted = cands.to_vec();
    sorted.sort_by(canonical_cmp);
    let mut out: Vec<Option<Vector2<f64>>> = sorted.into_iter().take(slots).map(Some).collect();
    out.resize(slots, None);
    out
}

/// Assign candidates to slots by nearest previous position.
///
/// Pairs (slot with history, candidate) are matched greedily by increasing
/// distance. Leftover candidates fill the remaining slots in canonical order,
/// lowest slot index first; candidates that find no slot are dropped.
pub fn assign_nearest(
    prev: &[Option<Vector2<f64>>],
    cands: &[Vector2<f64>],
) -> Vec<Option<Vector2<f64>>> {
    let mut out: Vec<Option<Vector2<f64>>> = vec![None; prev.len()];
    let mut taken = vec![false; cands.len()];

    let mut pairs: Vec<(f64, usize, usize)> = Vec::new();
    for (s, p) in prev.iter().enumerate() {
        let Some(p) = p else { continue };
        for (c, q) in cands.iter().enumerate() {
            pairs.push(((p - q).norm(), s, c));
        }
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
    for (_, s, c) in pairs {
        if out[s].is_none() && !taken[c] {
            out[s] = Some(cands[c]);
            taken[c] = true;
        }
    }

    let mut rest: Vec<Vector2<f64>> = cands
        .iter()
        .zip(&taken)
        .filter(|(_, t)| !**t)
        .map(|(c, _)| *c)
        .collect();
    rest.sort_by(canonical_cmp);
    let mut rest = rest.into_iter();
    for slot in out.iter_mut() {
        if slot.is_none() {
            match rest.next() {
                Some(c) => *slot = Some(c),
                None => break,
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn align_flips_into_previous_hemisphere() {
        let (v, flipped) = align(Some(vector![1.0, 0.0]), vector![-1.0, 0.1]);
        assert!(flipped);
        assert_eq!(v, vector![1.0, -0.1]);
        let (v, flipped) = align(None, vector![-1.0, 0.1]);
        assert!(!flipped);
        assert_eq!(v, vector![-1.0, 0.1]);
        // orthogonal counts as same hemisphere
        assert!(!align(Some(vector![0.0, 1.0]), vector![1.0, 0.0]).1);
    }

    #[test]
    fn nearest_keeps_slots_when_candidates_swap_order() {
        let prev = vec![Some(vector![1.0, 0.0]), Some(vector![-1.0, 0.0])];
        let cands = vec![vector![-0.9, 0.0], vector![0.9, 0.0]];
        let out = assign_nearest(&prev, &cands);
        assert_eq!(out[0], Some(vector![0.9, 0.0]));
        assert_eq!(out[1], Some(vector![-0.9, 0.0]));
        // canonical order would swap them
        let canon = canonical_order(&cands, 2);
        assert_eq!(canon[0], Some(vector![-0.9, 0.0]));
    }

    #[test]
    fn nearest_fills_free_slots_and_drops_extras() {
        let prev = vec![None, Some(vector![5.0, 5.0]), None];
        let cands = vec![vector![2.0, 0.0], vector![4.0, 4.0], vector![1.0, 0.0], vector![3.0, 0.0]];
        let out = assign_nearest(&prev, &cands);
        assert_eq!(out[1], Some(vector![4.0, 4.0]));
        assert_eq!(out[0], Some(vector![1.0, 0.0]));
        assert_eq!(out[2], Some(vector![2.0, 0.0]));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn vanished_candidates_leave_slots_empty() {
        let prev = vec![Some(vector![0.0, 0.0]), Some(vector![1.0, 0.0])];
        let out = assign_nearest(&prev, &[vector![1.1, 0.0]]);
        assert_eq!(out, vec![None, Some(vector![1.1, 0.0])]);
    }
}
