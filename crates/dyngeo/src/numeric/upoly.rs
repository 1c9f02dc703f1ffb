//! Dense univariate real polynomials with real-root isolation.
//!
//! Roots are found by recursion on the derivative: the real roots of `p'`
//! split the real line into monotone pieces of `p`, each holding at most one
//! root, which bisection then pins down. Touching roots show up as critical
//! points where `p` vanishes.

use crate::cfg::COEFF_EPS;

const BISECT_ITERS: usize = 200;
const TOUCH_TOL: f64 = 1e-10;
/// Touching roots are only located to about `sqrt(eps)`.
const ROOT_MERGE: f64 = 1e-7;

/// `c[0] + c[1] x + ... + c[n] x^n`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct UPoly {
    coeffs: Vec<f64>,
}

impl UPoly {
    pub fn new(mut coeffs: Vec<f64>) -> Self {
        let scale = coeffs.iter().fold(0.0_f64, |s, c| s.max(c.abs()));
        while let Some(&last) = coeffs.last() {
            if last.abs() <= COEFF_EPS * scale.max(1.0) {
                coeffs.pop();
            } else {
                break;
            }
        }
        Self { coeffs }
    }

    pub fn constant(c: f64) -> Self {
        Self::new(vec![c])
    }

    pub fn x() -> Self {
        Self::new(vec![0.0, 1.0])
    }

    #[inline]
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Degree; `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    pub fn derivative(&self) -> Self {
        Self::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * i as f64)
                .collect(),
        )
    }

    pub fn add(&self, other: &Self) -> Self {
        let n = self.coeffs.len().max(other.coeffs.len());
        Self::new(
            (0..n)
                .map(|i| {
                    self.coeffs.get(i).copied().unwrap_or(0.0)
                        + other.coeffs.get(i).copied().unwrap_or(0.0)
                })
                .collect(),
        )
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::default();
        }
        let mut out = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Self::new(out)
    }

    pub fn scale(&self, s: f64) -> Self {
        Self::new(self.coeffs.iter().map(|c| c * s).collect())
    }

    pub fn powi(&self, e: u32) -> Self {
        (0..e).fold(Self::constant(1.0), |acc, _| acc.mul(self))
    }

    /// Magnitude of the terms at `x`, used as a relative zero threshold.
    fn magnitude(&self, x: f64) -> f64 {
        let ax = x.abs();
        self.coeffs
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * ax + c.abs())
    }

    /// Cauchy bound: all real roots lie in `[-b, b]`.
    fn root_bound(&self) -> f64 {
        let lead = self.coeffs[self.coeffs.len() - 1].abs();
        1.0 + self.coeffs[..self.coeffs.len() - 1]
            .iter()
            .fold(0.0_f64, |m, c| m.max(c.abs() / lead))
    }

    /// Sorted real roots; the zero polynomial and nonzero constants have none.
    pub fn real_roots(&self) -> Vec<f64> {
        match self.degree() {
            None | Some(0) => Vec::new(),
            Some(1) => vec![-self.coeffs[0] / self.coeffs[1]],
            Some(2) => self.quadratic_roots(),
            Some(_) => self.roots_by_derivative(),
        }
    }

    fn quadratic_roots(&self) -> Vec<f64> {
        let (c, b, a) = (self.coeffs[0], self.coeffs[1], self.coeffs[2]);
        let disc = b * b - 4.0 * a * c;
        let tol = TOUCH_TOL * (b * b).max((4.0 * a * c).abs()).max(COEFF_EPS);
        if disc < -tol {
            return Vec::new();
        }
        if disc <= tol {
            return vec![-b / (2.0 * a)];
        }
        // numerically stable pair
        let sign = if b < 0.0 { -1.0 } else { 1.0 };
        let q = -0.5 * (b + sign * disc.sqrt());
        let mut r = vec![q / a, c / q];
        r.sort_by(f64::total_cmp);
        r
    }

    fn roots_by_derivative(&self) -> Vec<f64> {
        let bound = self.root_bound();
        let mut knots = vec![-bound];
        knots.extend(
            self.derivative()
                .real_roots()
                .into_iter()
                .filter(|c| c.abs() < bound),
        );
        knots.push(bound);

        let mut roots = Vec::new();
        for c in &knots[1..knots.len() - 1] {
            if self.eval(*c).abs() <= TOUCH_TOL * self.magnitude(*c).max(1.0) {
                roots.push(*c);
            }
        }
        for w in knots.windows(2) {
            let (a, b) = (w[0], w[1]);
            let (fa, fb) = (self.eval(a), self.eval(b));
            if fa == 0.0 {
                roots.push(a);
            }
            if fa * fb < 0.0 {
                roots.push(self.bisect(a, b, fa));
            }
        }
        roots.sort_by(f64::total_cmp);
        roots.dedup_by(|a, b| (*a - *b).abs() <= ROOT_MERGE * a.abs().max(1.0));
        roots
    }

    fn bisect(&self, mut a: f64, mut b: f64, mut fa: f64) -> f64 {
        for _ in 0..BISECT_ITERS {
            let mid = 0.5 * (a + b);
            if mid <= a || mid >= b {
                break;
            }
            let fm = self.eval(mid);
            if fm == 0.0 {
                return mid;
            }
            if (fm < 0.0) == (fa < 0.0) {
                a = mid;
                fa = fm;
            } else {
                b = mid;
            }
        }
        0.5 * (a + b)
    }
}
