//! Real functions `y = f(x)` given as small expression trees.

use super::upoly::UPoly;

/// Expression in the single variable `x`.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(f64),
    X,
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Powi(Box<Expr>, i32),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Exp(Box<Expr>),
    Ln(Box<Expr>),
    Sqrt(Box<Expr>),
}

impl Expr {
    /// Polynomial `c[0] + c[1] x + ...` as an expression.
    pub fn poly(coeffs: &[f64]) -> Self {
        coeffs
            .iter()
            .enumerate()
            .rev()
            .fold(Expr::Const(0.0), |acc, (i, &c)| {
                let term = match i {
                    0 => Expr::Const(c),
                    1 => Expr::Mul(Box::new(Expr::Const(c)), Box::new(Expr::X)),
                    _ => Expr::Mul(
                        Box::new(Expr::Const(c)),
                        Box::new(Expr::Powi(Box::new(Expr::X), i as i32)),
                    ),
                };
                Expr::Add(Box::new(acc), Box::new(term))
            })
    }

    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Const(c) => *c,
            Expr::X => x,
            Expr::Add(a, b) => a.eval(x) + b.eval(x),
            Expr::Sub(a, b) => a.eval(x) - b.eval(x),
            Expr::Mul(a, b) => a.eval(x) * b.eval(x),
            Expr::Div(a, b) => a.eval(x) / b.eval(x),
            Expr::Neg(a) => -a.eval(x),
            Expr::Powi(a, e) => a.eval(x).powi(*e),
            Expr::Sin(a) => a.eval(x).sin(),
            Expr::Cos(a) => a.eval(x).cos(),
            Expr::Exp(a) => a.eval(x).exp(),
            Expr::Ln(a) => a.eval(x).ln(),
            Expr::Sqrt(a) => a.eval(x).sqrt(),
        }
    }

    /// Coefficients if the expression is a polynomial in `x`.
    ///
    /// Division is only accepted by a nonzero constant; negative powers and
    /// transcendental nodes make the expression non-polynomial.
    pub fn as_polynomial(&self) -> Option<UPoly> {
        match self {
            Expr::Const(c) => c.is_finite().then(|| UPoly::constant(*c)),
            Expr::X => Some(UPoly::x()),
            Expr::Add(a, b) => Some(a.as_polynomial()?.add(&b.as_polynomial()?)),
            Expr::Sub(a, b) => Some(a.as_polynomial()?.add(&b.as_polynomial()?.scale(-1.0))),
            Expr::Mul(a, b) => Some(a.as_polynomial()?.mul(&b.as_polynomial()?)),
            Expr::Div(a, b) => {
                let d = b.as_polynomial()?;
                match d.degree() {
                    Some(0) => Some(a.as_polynomial()?.scale(1.0 / d.coeffs()[0])),
                    _ => None,
                }
            }
            Expr::Neg(a) => Some(a.as_polynomial()?.scale(-1.0)),
            Expr::Powi(a, e) if *e >= 0 => Some(a.as_polynomial()?.powi(*e as u32)),
            _ => None,
        }
    }
}

/// Function `y = expr(x)` restricted to the parameter domain `[min, max]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub expr: Expr,
    pub min: f64,
    pub max: f64,
}

impl Default for Function {
    fn default() -> Self {
        Self::new(Expr::Const(0.0), f64::NEG_INFINITY, f64::INFINITY)
    }
}

impl Function {
    pub fn new(expr: Expr, min: f64, max: f64) -> Self {
        Self { expr, min, max }
    }

    /// Polynomial defined on the whole real line.
    pub fn polynomial(coeffs: &[f64]) -> Self {
        Self::new(Expr::poly(coeffs), f64::NEG_INFINITY, f64::INFINITY)
    }

    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.expr.eval(x)
    }

    #[inline]
    pub fn in_domain(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }
}
