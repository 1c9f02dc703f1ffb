//! Random constructions (replay tokens).
//!
//! Purpose
//! - Reproducible random construction graphs for property tests, benches and
//!   the CLI. Same token, same structure and same coordinates.
//!
//! Model
//! - Start from `free_points` random points in `[-extent, extent]²`, then add
//!   `steps` algorithms of random kind over randomly chosen existing objects.
//!   Missing inputs (numbers, functions) are created as free objects on demand.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::algo::{AlgoId, AlgoKind};
use crate::error::GraphResult;
use crate::graph::Construction;
use crate::numeric::{Expr, Function};
use crate::object::{ObjectId, ObjectKind, Payload};

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    /// Token for the next draw of the same stream.
    #[inline]
    pub fn next(self) -> Self {
        Self {
            index: self.index.wrapping_add(1),
            ..self
        }
    }

    #[inline]
    pub fn rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Random construction configuration.
#[derive(Clone, Copy, Debug)]
pub struct RandomCfg {
    /// Free points created up front (at least 2).
    pub free_points: usize,
    /// Algorithms added after the points.
    pub steps: usize,
    /// Coordinates are drawn from `[-extent, extent]`.
    pub extent: f64,
}

impl Default for RandomCfg {
    fn default() -> Self {
        Self {
            free_points: 6,
            steps: 20,
            extent: 5.0,
        }
    }
}

/// Grow `cons` by a random construction. Returns the added algorithms.
pub fn populate(cons: &mut Construction, cfg: RandomCfg, tok: ReplayToken) -> GraphResult<Vec<AlgoId>> {
    let mut rng = tok.rng();
    let e = cfg.extent.abs().max(1e-6);
    let mut by_kind: BTreeMap<ObjectKind, Vec<ObjectId>> = BTreeMap::new();
    for o in cons.store().objects() {
        by_kind.entry(o.kind()).or_default().push(o.id);
    }
    for _ in 0..cfg.free_points.max(2) {
        let id = cons.create_object(Payload::point(rng.gen_range(-e..=e), rng.gen_range(-e..=e)));
        by_kind.entry(ObjectKind::Point).or_default().push(id);
    }

    let mut added = Vec::with_capacity(cfg.steps);
    for _ in 0..cfg.steps {
        let kind = match rng.gen_range(0..10) {
            0..=2 => AlgoKind::LineThroughPoints,
            3 | 4 => AlgoKind::IntersectLines,
            5 | 6 => AlgoKind::AngularBisector,
            7 => AlgoKind::CirclePointRadius,
            8 => AlgoKind::IntersectFunctionConic { slots: 0 },
            _ => AlgoKind::ConvexHull,
        };
        let inputs = match kind {
            AlgoKind::IntersectLines | AlgoKind::AngularBisector => pick(&mut rng, &by_kind, ObjectKind::Line, 2),
            AlgoKind::CirclePointRadius => {
                let r = cons.create_object(Payload::number(rng.gen_range(0.1..=e)));
                by_kind.entry(ObjectKind::Number).or_default().push(r);
                pick(&mut rng, &by_kind, ObjectKind::Point, 1).map(|mut v| {
                    v.push(r);
                    v
                })
            }
            AlgoKind::IntersectFunctionConic { .. } => {
                let coeffs: Vec<f64> = (0..rng.gen_range(2..=4)).map(|_| rng.gen_range(-1.0..=1.0)).collect();
                let f = cons.create_object(Payload::Function(Function::new(Expr::poly(&coeffs), -2.0 * e, 2.0 * e)));
                by_kind.entry(ObjectKind::Function).or_default().push(f);
                pick(&mut rng, &by_kind, ObjectKind::Conic, 1).map(|c| vec![f, c[0]])
            }
            AlgoKind::ConvexHull => {
                let n = rng.gen_range(3..=6);
                pick(&mut rng, &by_kind, ObjectKind::Point, n)
            }
            AlgoKind::LineThroughPoints => None,
        };
        // fall back to a line whenever the pool lacks the inputs
        let (kind, inputs) = match inputs {
            Some(i) => (kind, i),
            None => (
                AlgoKind::LineThroughPoints,
                pick(&mut rng, &by_kind, ObjectKind::Point, 2).unwrap_or_default(),
            ),
        };
        let a = cons.create_algorithm(kind, &inputs)?;
        if let Some(node) = cons.algorithm(a) {
            for o in &node.outputs {
                if let Some(obj) = cons.object(*o) {
                    by_kind.entry(obj.kind()).or_default().push(*o);
                }
            }
        }
        added.push(a);
    }
    Ok(added)
}

/// Move every free point by a uniform offset in `[-step, step]²`.
pub fn drag_free_points(cons: &mut Construction, step: f64, tok: ReplayToken) -> GraphResult<usize> {
    let mut rng = tok.rng();
    let free: Vec<(ObjectId, f64, f64)> = cons
        .store()
        .objects()
        .filter(|o| o.is_free())
        .filter_map(|o| o.payload.as_xy().map(|p| (o.id, p.x, p.y)))
        .collect();
    let s = step.abs();
    for (id, x, y) in &free {
        let (dx, dy) = if s > 0.0 {
            (rng.gen_range(-s..=s), rng.gen_range(-s..=s))
        } else {
            (0.0, 0.0)
        };
        cons.set_input_value(*id, Payload::point(x + dx, y + dy))?;
    }
    Ok(free.len())
}

/// `n` distinct objects of one kind, or `None` if there are fewer.
fn pick<R: Rng>(
    rng: &mut R,
    by_kind: &BTreeMap<ObjectKind, Vec<ObjectId>>,
    kind: ObjectKind,
    n: usize,
) -> Option<Vec<ObjectId>> {
    let pool = by_kind.get(&kind)?;
    if pool.len() < n {
        return None;
    }
    Some(sample(rng, pool.len(), n).into_iter().map(|i| pool[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_reproducible_and_distinct() {
        let t = ReplayToken::new(7, 3);
        let a: u64 = t.rng().gen();
        let b: u64 = t.rng().gen();
        let c: u64 = t.next().rng().gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn populate_builds_requested_steps() {
        let mut cons = Construction::new();
        let cfg = RandomCfg {
            free_points: 4,
            steps: 12,
            extent: 3.0,
        };
        let added = populate(&mut cons, cfg, ReplayToken::new(1, 0)).unwrap();
        assert_eq!(added.len(), 12);
        assert!(cons.store().objects().filter(|o| o.is_free()).count() >= 4);
    }
}
