//! Polynomial encodings of construction steps for an algebraic prover.
//!
//! Purpose
//! - Translate one algorithm into polynomial equations over point coordinates
//!   (Botana-style): every point gets two variables, every line is bound to
//!   the variables of two points on it.
//!
//! Model
//! - Variables are allocated lazily, the first time a step needs them, and
//!   cached per object. Free points get two fresh variables and no equations.
//! - Encodings are cached per algorithm. The cache belongs to the structure,
//!   not to the numbers: the graph invalidates the dependent closure of a
//!   structural edit and never touches the cache on recompute.
//! - A step whose inputs are not bound yet first encodes their producers.
//!
//! Supported steps: `LineThroughPoints`, `IntersectLines`, `AngularBisector`.
//! The bisector needs two input lines bound to point pairs with a common
//! vertex; the common vertex is found structurally, or numerically at the
//! current intersection of the lines. Its equations describe both bisectors at
//! once, so both output lines are bound to the vertex and the same foot point.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use nalgebra::Vector2;

use crate::algo::{AlgoId, AlgoKind};
use crate::error::SymbolicUnsupported;
use crate::graph::Store;
use crate::numeric::{inhom, meet};
use crate::object::{ObjectId, ObjectKind};
use crate::symbolic::{Polynomial, Var, VarPool};

/// Relative distance under which a point counts as the lines' intersection.
const VERTEX_EPS: f64 = 1e-9;

/// One of the two points a line is bound to. `object` is `None` for auxiliary
/// points that only exist symbolically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Anchor {
    vars: [Var; 2],
    object: Option<ObjectId>,
}

/// Auxiliary point of a bisector encoding: the foot `m` on the segment between
/// the two non-vertex anchors.
#[derive(Clone, Copy, Debug)]
struct Foot {
    m: [Var; 2],
    vertex: [Var; 2],
    a: [Var; 2],
    b: [Var; 2],
}

type EncodeResult<T> = Result<T, SymbolicUnsupported>;

/// Encoder cache: variable bindings and per-algorithm polynomial systems.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    pool: VarPool,
    points: HashMap<ObjectId, [Var; 2]>,
    lines: HashMap<ObjectId, [Anchor; 2]>,
    cache: HashMap<AlgoId, Arc<[Polynomial]>>,
    produced: HashMap<AlgoId, Vec<ObjectId>>,
    feet: HashMap<AlgoId, Foot>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polynomials of one step; cached until a structural edit invalidates it.
    pub fn encode(&mut self, store: &Store, algo: AlgoId) -> EncodeResult<Arc<[Polynomial]>> {
        if let Some(p) = self.cache.get(&algo) {
            return Ok(Arc::clone(p));
        }
        let node = store
            .algorithm(algo)
            .ok_or(SymbolicUnsupported::UnknownAlgorithm(algo))?;
        let (ins, outs) = (&node.inputs, &node.outputs);
        let polys = match node.kind {
            AlgoKind::LineThroughPoints => {
                let a = self.point(store, algo, ins[0])?;
                let b = self.point(store, algo, ins[1])?;
                self.lines.insert(
                    outs[0],
                    [
                        Anchor { vars: a, object: Some(ins[0]) },
                        Anchor { vars: b, object: Some(ins[1]) },
                    ],
                );
                Vec::new()
            }
            AlgoKind::IntersectLines => {
                let g = self.line(store, algo, ins[0])?;
                let h = self.line(store, algo, ins[1])?;
                let pool = &mut self.pool;
                let x = *self.points.entry(outs[0]).or_insert_with(|| pool.fresh_pair());
                vec![on_line(&g, x), on_line(&h, x)]
            }
            AlgoKind::AngularBisector => {
                let g = self.line(store, algo, ins[0])?;
                let h = self.line(store, algo, ins[1])?;
                let (vertex, a, b) = shared_vertex(store, ins[0], ins[1], &g, &h).ok_or(
                    SymbolicUnsupported::MissingBindings {
                        algo,
                        object: ins[1],
                    },
                )?;
                let foot = Foot {
                    m: self.pool.fresh_pair(),
                    vertex: vertex.vars,
                    a: a.vars,
                    b: b.vars,
                };
                let bound = [vertex, Anchor { vars: foot.m, object: None }];
                for o in outs {
                    self.lines.insert(*o, bound);
                }
                self.feet.insert(algo, foot);
                bisector_polys(&foot)
            }
            kind => {
                return Err(SymbolicUnsupported::NoEncoding {
                    algo,
                    kind: kind.name(),
                })
            }
        };
        self.produced.insert(algo, outs.clone());
        let polys: Arc<[Polynomial]> = polys.into();
        self.cache.insert(algo, Arc::clone(&polys));
        tracing::trace!(%algo, polys = polys.len(), vars = self.pool.issued(), "encoded");
        Ok(polys)
    }

    /// Drop cached encodings and the bindings they introduced.
    pub fn invalidate<I>(&mut self, algos: I)
    where
        I: IntoIterator<Item = AlgoId>,
    {
        for a in algos {
            self.cache.remove(&a);
            self.feet.remove(&a);
            for o in self.produced.remove(&a).unwrap_or_default() {
                self.points.remove(&o);
                self.lines.remove(&o);
            }
        }
    }

    /// Forget the variables of one object (removed or redefined).
    pub fn forget_object(&mut self, id: ObjectId) {
        self.points.remove(&id);
        self.lines.remove(&id);
    }

    pub fn is_cached(&self, algo: AlgoId) -> bool {
        self.cache.contains_key(&algo)
    }

    pub fn point_vars(&self, id: ObjectId) -> Option<[Var; 2]> {
        self.points.get(&id).copied()
    }

    /// Numeric value of every bound variable at the current configuration.
    ///
    /// Object variables take the coordinates of their (defined) points; bisector
    /// feet are placed on the inner bisector.
    pub fn witness(&self, store: &Store) -> BTreeMap<Var, f64> {
        let mut w = BTreeMap::new();
        for (id, vars) in &self.points {
            if let Some(p) = store.value(*id).and_then(|p| p.as_xy()) {
                w.insert(vars[0], p.x);
                w.insert(vars[1], p.y);
            }
        }
        // feet can sit on other feet; settle until nothing changes
        let mut pending: Vec<&Foot> = self.feet.values().collect();
        loop {
            let before = pending.len();
            pending.retain(|f| match inner_foot(&w, f) {
                Some(m) => {
                    w.insert(f.m[0], m.x);
                    w.insert(f.m[1], m.y);
                    false
                }
                None => true,
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
        w
    }

    fn point(&mut self, store: &Store, algo: AlgoId, id: ObjectId) -> EncodeResult<[Var; 2]> {
        if let Some(v) = self.points.get(&id) {
            return Ok(*v);
        }
        let missing = SymbolicUnsupported::MissingBindings { algo, object: id };
        let obj = store.object(id).ok_or_else(|| missing.clone())?;
        match obj.parent {
            None if obj.kind() == ObjectKind::Point => {
                let v = self.pool.fresh_pair();
                self.points.insert(id, v);
                Ok(v)
            }
            None => Err(missing),
            Some(p) => {
                self.encode(store, p)?;
                self.points.get(&id).copied().ok_or(missing)
            }
        }
    }

    fn line(&mut self, store: &Store, algo: AlgoId, id: ObjectId) -> EncodeResult<[Anchor; 2]> {
        if let Some(l) = self.lines.get(&id) {
            return Ok(*l);
        }
        let missing = SymbolicUnsupported::MissingBindings { algo, object: id };
        let parent = store.object(id).and_then(|o| o.parent).ok_or_else(|| missing.clone())?;
        self.encode(store, parent)?;
        self.lines.get(&id).copied().ok_or(missing)
    }
}

fn on_line(l: &[Anchor; 2], p: [Var; 2]) -> Polynomial {
    let [a, b] = l;
    Polynomial::collinear(a.vars[0], a.vars[1], b.vars[0], b.vars[1], p[0], p[1])
}

/// `(vertex, other anchor of g, other anchor of h)`.
fn shared_vertex(
    store: &Store,
    g_id: ObjectId,
    h_id: ObjectId,
    g: &[Anchor; 2],
    h: &[Anchor; 2],
) -> Option<(Anchor, Anchor, Anchor)> {
    for i in 0..2 {
        for j in 0..2 {
            if g[i].vars == h[j].vars {
                return Some((g[i], g[1 - i], h[1 - j]));
            }
        }
    }
    // numerically: anchors sitting on the current intersection
    let gl = store.value(g_id)?.as_line()?;
    let hl = store.value(h_id)?.as_line()?;
    let b = inhom(&meet(gl, hl)?)?;
    let at_b = |a: &Anchor| {
        a.object
            .and_then(|o| store.value(o))
            .and_then(|p| p.as_xy())
            .is_some_and(|p| (p - b).norm() <= VERTEX_EPS * b.norm().max(1.0))
    };
    let i = (0..2).find(|i| at_b(&g[*i]))?;
    let j = (0..2).find(|j| at_b(&h[*j]))?;
    Some((g[i], g[1 - i], h[1 - j]))
}

/// `collinear(a, b, m)` and the squared equal-angle condition at the vertex:
/// `((b-v)·(v-m))² |a-v|² - ((a-v)·(v-m))² |b-v|²`.
fn bisector_polys(f: &Foot) -> Vec<Polynomial> {
    let p = |v: Var| Polynomial::from(v);
    let (a1, a2) = (p(f.a[0]), p(f.a[1]));
    let (b1, b2) = (p(f.b[0]), p(f.b[1]));
    let (c1, c2) = (p(f.vertex[0]), p(f.vertex[1]));
    let (m1, m2) = (p(f.m[0]), p(f.m[1]));

    let collinear = Polynomial::collinear(f.a[0], f.a[1], f.b[0], f.b[1], f.m[0], f.m[1]);
    let b_dot = &(&(&b1 - &c1) * &(&c1 - &m1)) + &(&(&b2 - &c2) * &(&c2 - &m2));
    let a_dot = &(&(&a1 - &c1) * &(&c1 - &m1)) + &(&(&a2 - &c2) * &(&c2 - &m2));
    let a_len = &(&a1 - &c1).sqr() + &(&a2 - &c2).sqr();
    let b_len = &(&b1 - &c1).sqr() + &(&b2 - &c2).sqr();
    let angle = &(&b_dot.sqr() * &a_len) - &(&a_dot.sqr() * &b_len);
    vec![collinear, angle]
}

/// Foot of the inner bisector at `vertex` on the segment `a b`
/// (angle bisector theorem).
fn inner_foot(w: &BTreeMap<Var, f64>, f: &Foot) -> Option<Vector2<f64>> {
    let at = |v: [Var; 2]| Some(Vector2::new(*w.get(&v[0])?, *w.get(&v[1])?));
    let (v, a, b) = (at(f.vertex)?, at(f.a)?, at(f.b)?);
    let (da, db) = ((a - v).norm(), (b - v).norm());
    let s = da + db;
    (s > 0.0).then(|| (a * db + b * da) / s)
}
