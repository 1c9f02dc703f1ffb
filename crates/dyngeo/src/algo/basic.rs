//! Closed-form single-branch variants.

use nalgebra::{Vector2, Vector3};

use crate::error::Fault;
use crate::numeric::{convex_hull, inhom, join, meet, Conic};

pub(super) fn line_through(a: &Vector3<f64>, b: &Vector3<f64>) -> Result<Vector3<f64>, Fault> {
    join(a, b).ok_or(Fault::DegenerateInput)
}

/// `None` for parallel (or identical) lines.
pub(super) fn intersect_lines(g: &Vector3<f64>, h: &Vector3<f64>) -> Option<Vector3<f64>> {
    meet(g, h).map(|p| p / p.z)
}

pub(super) fn circle(m: &Vector3<f64>, r: f64) -> Result<Conic, Fault> {
    let c = inhom(m).ok_or(Fault::DegenerateInput)?;
    if !r.is_finite() || r < 0.0 {
        return Err(Fault::DegenerateInput);
    }
    Ok(Conic::circle(c, r))
}

pub(super) fn hull(pts: &[Vector2<f64>]) -> Result<Vec<Vector2<f64>>, Fault> {
    convex_hull(pts).ok_or(Fault::DegenerateInput)
}
