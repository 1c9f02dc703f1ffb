use nalgebra::{Vector2, Vector3};

use crate::cfg::{DIR_EPS, INFINITY_EPS};

/// Direction vector `(b, -a)` of the line `a x + b y + c = 0`.
#[inline]
pub fn direction(line: &Vector3<f64>) -> Vector2<f64> {
    Vector2::new(line.y, -line.x)
}

/// Unit vector along `v`, or `None` for (near) zero or non-finite input.
#[inline]
pub fn unit(v: Vector2<f64>) -> Option<Vector2<f64>> {
    let n2 = v.norm_squared();
    if !n2.is_finite() || n2 <= DIR_EPS {
        return None;
    }
    Some(v / n2.sqrt())
}

#[inline]
pub fn is_infinite(p: &Vector3<f64>) -> bool {
    p.z.abs() <= INFINITY_EPS * p.x.abs().max(p.y.abs()).max(1.0)
}

/// Inhomogeneous coordinates of a finite point.
#[inline]
pub fn inhom(p: &Vector3<f64>) -> Option<Vector2<f64>> {
    if is_infinite(p) || !p.iter().all(|c| c.is_finite()) {
        return None;
    }
    Some(Vector2::new(p.x / p.z, p.y / p.z))
}

/// Line through two homogeneous points (`None` if they coincide).
#[inline]
pub fn join(p: &Vector3<f64>, q: &Vector3<f64>) -> Option<Vector3<f64>> {
    let l = p.cross(q);
    unit(direction(&l)).map(|_| l)
}

/// Intersection point of two lines (`None` if parallel or identical).
#[inline]
pub fn meet(g: &Vector3<f64>, h: &Vector3<f64>) -> Option<Vector3<f64>> {
    let p = g.cross(h);
    if is_infinite(&p) {
        None
    } else {
        Some(p)
    }
}

/// Whether two homogeneous lines describe the same point set.
pub fn same_line(a: &Vector3<f64>, b: &Vector3<f64>, eps: f64) -> bool {
    let (na, nb) = (a.norm(), b.norm());
    if na <= eps || nb <= eps {
        return false;
    }
    (a / na).cross(&(b / nb)).norm() <= eps
}
