//! Angle bisectors of two lines.
//!
//! Non-parallel lines give two perpendicular bisectors through their
//! intersection B: slot 0 bisects the angle between the oriented directions,
//! slot 1 is its perpendicular. Parallel lines give a single midline, in slot 0
//! when the directions agree and slot 1 when they are opposite; the other slot
//! is undefined.
//!
//! In continuous mode each slot keeps the hemisphere of its previous direction
//! so a dragged input never flips the bisector's orientation.

use nalgebra::{Vector2, Vector3};

use crate::continuity::align;
use crate::ctx::EvalCtx;
use crate::error::Fault;
use crate::numeric::{direction, inhom, is_infinite, unit};

pub(super) fn compute(
    g: &Vector3<f64>,
    h: &Vector3<f64>,
    prev: &mut [Option<Vector2<f64>>; 2],
    ctx: EvalCtx,
) -> Result<[Option<Vector3<f64>>; 2], Fault> {
    let (gd_raw, hd_raw) = (direction(g), direction(h));
    let gd = unit(gd_raw).ok_or(Fault::DegenerateInput)?;
    let hd = unit(hd_raw).ok_or(Fault::DegenerateInput)?;
    let (len_g, len_h) = (gd_raw.norm(), hd_raw.norm());

    let b = g.cross(h);
    if is_infinite(&b) {
        // parallel: midline, orientation of g and h may differ
        let (index, mut z) = if gd.dot(&hd) > 0.0 {
            (0, (g.z / len_g + h.z / len_h) / 2.0)
        } else {
            (1, (g.z / len_g - h.z / len_h) / 2.0)
        };
        let mut w = gd;
        if ctx.continuous {
            let (aligned, flipped) = align(prev[index], w);
            w = aligned;
            if flipped {
                z = -z;
            }
        }
        prev[index] = Some(w);
        let mut out = [None, None];
        out[index] = Some(Vector3::new(-w.y, w.x, z));
        return Ok(out);
    }

    let w = if gd.dot(&hd) >= 0.0 {
        gd + hd
    } else {
        // angle > 90°: h - g is normal to the bisector
        let w = Vector2::new(hd.y - gd.y, gd.x - hd.x);
        if gd.x * hd.y < gd.y * hd.x {
            -w
        } else {
            w
        }
    };
    let w = unit(w).ok_or(Fault::DegenerateInput)?;
    let (mut w0, mut w1) = (w, Vector2::new(-w.y, w.x));
    if ctx.continuous {
        w0 = align(prev[0], w0).0;
        w1 = align(prev[1], w1).0;
    }
    *prev = [Some(w0), Some(w1)];

    let bp = inhom(&b).ok_or(Fault::DegenerateInput)?;
    let through_b = |d: Vector2<f64>| {
        let (a, c) = (-d.y, d.x);
        Vector3::new(a, c, -(bp.x * a + bp.y * c))
    };
    Ok([Some(through_b(w0)), Some(through_b(w1))])
}
