//! Conics in flat symmetric-matrix form.

use nalgebra::{Matrix2, Matrix3, SymmetricEigen, Vector2};

use crate::cfg::CONIC_EPS;

/// Shape class of a conic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConicType {
    Circle,
    Ellipse,
    Hyperbola,
    Parabola,
    /// Empty (imaginary) ellipse.
    Empty,
    /// Line pairs, double lines, single points.
    Degenerate,
}

/// `A00 x² + A11 y² + A22 + 2 A01 xy + 2 A02 x + 2 A12 y = 0`, stored as
/// `[A00, A11, A22, A01, A02, A12]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Conic {
    pub m: [f64; 6],
}

impl Default for Conic {
    fn default() -> Self {
        Self { m: [0.0; 6] }
    }
}

impl Conic {
    #[inline]
    pub fn new(m: [f64; 6]) -> Self {
        Self { m }
    }

    /// Circle with center `c` and radius `r`.
    pub fn circle(c: Vector2<f64>, r: f64) -> Self {
        Self::new([1.0, 1.0, c.norm_squared() - r * r, 0.0, -c.x, -c.y])
    }

    /// The conic `y = 0` written as `2 A12 y = 0`.
    pub fn x_axis() -> Self {
        Self::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.5])
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        let [a0, a1, a2, a3, a4, a5] = self.m;
        Matrix3::new(a0, a3, a4, a3, a1, a5, a4, a5, a2)
    }

    #[inline]
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let [a0, a1, a2, a3, a4, a5] = self.m;
        a0 * x * x + a1 * y * y + a2 + 2.0 * (a3 * x * y + a4 * x + a5 * y)
    }

    fn quadratic_part(&self) -> Matrix2<f64> {
        Matrix2::new(self.m[0], self.m[3], self.m[3], self.m[1])
    }

    fn scale(&self) -> f64 {
        self.m.iter().fold(0.0_f64, |s, c| s.max(c.abs()))
    }

    /// Shape class from the eigenvalues of the quadratic part and the constant
    /// term at the center. Every threshold is relative to the terms it is
    /// compared with, so the result does not change under scaling of the
    /// coefficients or translation of the curve.
    pub fn classify(&self) -> ConicType {
        let s = self.scale();
        if !s.is_finite() || s == 0.0 {
            return ConicType::Degenerate;
        }
        let eig = SymmetricEigen::new(self.quadratic_part());
        let (l1, l2) = (eig.eigenvalues[0], eig.eigenvalues[1]);
        let q = l1.abs().max(l2.abs());
        if q <= CONIC_EPS * s {
            // no quadratic part: a line, or nothing
            return ConicType::Degenerate;
        }
        let b = Vector2::new(self.m[4], self.m[5]);
        if l1.abs().min(l2.abs()) <= CONIC_EPS * q {
            // direction of the vanishing eigenvalue; the linear term along it
            // does not change under translation
            let k = if l1.abs() < l2.abs() { 0 } else { 1 };
            let v = eig.eigenvectors.column(k);
            let bv = b.x * v[0] + b.y * v[1];
            return if bv.abs() <= CONIC_EPS * s {
                ConicType::Degenerate
            } else {
                ConicType::Parabola
            };
        }
        let Some(c) = self.midpoint() else {
            return ConicType::Degenerate;
        };
        let bc = b.dot(&c);
        let k = self.m[2] + bc;
        if k.abs() <= CONIC_EPS * self.m[2].abs().max(bc.abs()) {
            return ConicType::Degenerate;
        }
        if l1 * l2 < 0.0 {
            return ConicType::Hyperbola;
        }
        // l1 x² + l2 y² + k = 0 is real iff k is opposite to the eigenvalues
        if k * l1 > 0.0 {
            return ConicType::Empty;
        }
        if (l1 - l2).abs() <= CONIC_EPS * q {
            ConicType::Circle
        } else {
            ConicType::Ellipse
        }
    }

    /// Center of a central conic (ellipse, circle, hyperbola).
    pub fn midpoint(&self) -> Option<Vector2<f64>> {
        let q = self.quadratic_part();
        let inv = q.try_inverse()?;
        let c = -(inv * Vector2::new(self.m[4], self.m[5]));
        c.iter().all(|v| v.is_finite()).then_some(c)
    }

    /// Semi-axis lengths of a real ellipse or circle.
    pub fn half_axes(&self) -> Option<(f64, f64)> {
        if !matches!(self.classify(), ConicType::Ellipse | ConicType::Circle) {
            return None;
        }
        let c = self.midpoint()?;
        let k = self.m[2] + self.m[4] * c.x + self.m[5] * c.y;
        let eig = SymmetricEigen::new(self.quadratic_part());
        let (l1, l2) = (eig.eigenvalues[0], eig.eigenvalues[1]);
        let a = (-k / l1).sqrt();
        let b = (-k / l2).sqrt();
        (a.is_finite() && b.is_finite()).then_some((a, b))
    }
}
