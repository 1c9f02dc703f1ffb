//! Intersection of a function graph `y = f(x)` with a conic.
//!
//! Polynomial `f`: substitute into the conic and solve the resulting
//! univariate polynomial exactly. Anything else: numeric root search of
//! `t ↦ Q(t, f(t))` on an interval derived from the conic's shape.

use nalgebra::{Vector2, Vector3};

use crate::cfg::{DEDUP_EPS, ELLIPSE_MARGIN, OPEN_CONIC_MARGIN};
use crate::continuity::{assign_nearest, canonical_order};
use crate::ctx::EvalCtx;
use crate::error::Fault;
use crate::numeric::{Conic, ConicType, Function, UPoly};
use crate::roots::{find_root_points, RootCfg};

pub(super) fn compute(
    f: &Function,
    c: &Conic,
    slots: usize,
    prev: &mut [Option<Vector2<f64>>],
    ctx: EvalCtx,
) -> Result<Vec<Option<Vector3<f64>>>, Fault> {
    let mut pts = match f.expr.as_polynomial() {
        Some(p) => polynomial_points(&p, f, c),
        // sub-search runs quiet; the copy keeps our own ctx untouched
        None => numeric_points(f, c, ctx.quieted()),
    };
    pts.dedup_by(|a, b| (*a - *b).norm() <= DEDUP_EPS);
    if pts.len() > slots && !ctx.quiet {
        tracing::debug!(found = pts.len(), slots, "dropping intersections beyond slot count");
    }

    let assigned = if ctx.continuous {
        assign_nearest(prev, &pts)
    } else {
        canonical_order(&pts, slots)
    };
    for (slot, p) in prev.iter_mut().zip(&assigned) {
        if p.is_some() {
            *slot = *p;
        }
    }
    Ok(assigned
        .into_iter()
        .map(|p| p.map(|p| Vector3::new(p.x, p.y, 1.0)))
        .collect())
}

/// Roots of `Q(x, p(x))` within the function's domain, sorted by `x`.
fn polynomial_points(p: &UPoly, f: &Function, c: &Conic) -> Vec<Vector2<f64>> {
    let [a0, a1, a2, a3, a4, a5] = c.m;
    // A22 + 2 A02 x + A00 x² + p (2 A12 + 2 A01 x) + A11 p²
    let r = UPoly::new(vec![a2, 2.0 * a4, a0])
        .add(&p.mul(&UPoly::new(vec![2.0 * a5, 2.0 * a3])))
        .add(&p.mul(p).scale(a1));
    if r.is_zero() {
        // graph lies on the conic: no isolated intersections
        return Vec::new();
    }
    r.real_roots()
        .into_iter()
        .filter(|x| f.in_domain(*x))
        .map(|x| Vector2::new(x, p.eval(x)))
        .filter(|q| q.y.is_finite())
        .collect()
}

fn numeric_points(f: &Function, c: &Conic, ctx: EvalCtx) -> Vec<Vector2<f64>> {
    let Some((lo, hi)) = search_interval(f, c) else {
        if !ctx.quiet {
            tracing::debug!("no finite search interval");
        }
        return Vec::new();
    };
    let hits = find_root_points(
        |t| c.eval(t, f.eval(t)),
        |t| Vector2::new(t, f.eval(t)),
        lo,
        hi,
        &RootCfg::default(),
    );
    if !ctx.quiet {
        tracing::trace!(lo, hi, roots = hits.len(), "numeric intersection search");
    }
    hits.into_iter()
        .filter(|(t, _)| f.in_domain(*t))
        .map(|(_, p)| p)
        .collect()
}

/// Parameter interval searched for function/conic intersections.
///
/// Ellipse or circle: `mid.x ± ELLIPSE_MARGIN · max(half axes)`. Other conics:
/// the function's domain widened by `OPEN_CONIC_MARGIN` of each end's
/// magnitude. `None` for empty conics and unbounded domains.
pub fn search_interval(f: &Function, c: &Conic) -> Option<(f64, f64)> {
    let (lo, hi) = match c.classify() {
        ConicType::Empty => return None,
        ConicType::Circle | ConicType::Ellipse => {
            let mid = c.midpoint()?;
            let (a, b) = c.half_axes()?;
            let r = ELLIPSE_MARGIN * a.max(b);
            (mid.x - r, mid.x + r)
        }
        _ => (
            f.min - OPEN_CONIC_MARGIN * f.min.abs(),
            f.max + OPEN_CONIC_MARGIN * f.max.abs(),
        ),
    };
    (lo.is_finite() && hi.is_finite() && lo <= hi).then_some((lo, hi))
}
