use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use super::var::Var;

/// Product of variable powers, sorted by variable, exponents > 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Monomial(Vec<(Var, u32)>);

impl Monomial {
    pub fn one() -> Self {
        Self(Vec::new())
    }

    pub fn var(v: Var) -> Self {
        Self(vec![(v, 1)])
    }

    pub fn degree(&self) -> u32 {
        self.0.iter().map(|(_, e)| e).sum()
    }

    pub fn powers(&self) -> &[(Var, u32)] {
        &self.0
    }

    fn mul(&self, other: &Monomial) -> Monomial {
        let mut merged: BTreeMap<Var, u32> = self.0.iter().copied().collect();
        for &(v, e) in &other.0 {
            *merged.entry(v).or_insert(0) += e;
        }
        Monomial(merged.into_iter().collect())
    }
}

/// Sparse polynomial with integer coefficients over [`Var`]s.
///
/// Zero coefficients are never stored, so structural equality is polynomial
/// equality.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, i64>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c: i64) -> Self {
        let mut p = Self::zero();
        p.push(Monomial::one(), c);
        p
    }

    pub fn var(v: Var) -> Self {
        let mut p = Self::zero();
        p.push(Monomial::var(v), 1);
        p
    }

    fn push(&mut self, m: Monomial, c: i64) {
        if c == 0 {
            return;
        }
        match self.terms.entry(m) {
            Entry::Vacant(e) => {
                e.insert(c);
            }
            Entry::Occupied(mut e) => {
                *e.get_mut() += c;
                if *e.get() == 0 {
                    e.remove();
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn degree(&self) -> u32 {
        self.terms.keys().map(Monomial::degree).max().unwrap_or(0)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, i64)> {
        self.terms.iter().map(|(m, c)| (m, *c))
    }

    /// Variables occurring in the polynomial, ascending.
    pub fn vars(&self) -> Vec<Var> {
        let mut vs: Vec<Var> = self
            .terms
            .keys()
            .flat_map(|m| m.0.iter().map(|(v, _)| *v))
            .collect();
        vs.sort();
        vs.dedup();
        vs
    }

    pub fn sqr(&self) -> Self {
        self * self
    }

    /// Determinant condition for `(a1,a2)`, `(b1,b2)`, `(c1,c2)` being collinear.
    pub fn collinear(a1: Var, a2: Var, b1: Var, b2: Var, c1: Var, c2: Var) -> Self {
        let [a1, a2, b1, b2, c1, c2] = [a1, a2, b1, b2, c1, c2].map(Polynomial::var);
        &(&(&a1 * &b2) + &(&b1 * &c2)) + &(&c1 * &a2)
            - (&(&(&a2 * &b1) + &(&b2 * &c1)) + &(&c2 * &a1))
    }

    /// Value at a numeric assignment; `None` if a variable is unassigned.
    pub fn eval<F>(&self, value: F) -> Option<f64>
    where
        F: Fn(Var) -> Option<f64>,
    {
        let mut sum = 0.0;
        for (m, c) in &self.terms {
            let mut t = *c as f64;
            for &(v, e) in &m.0 {
                t *= value(v)?.powi(e as i32);
            }
            sum += t;
        }
        Some(sum)
    }
}

impl From<Var> for Polynomial {
    fn from(v: Var) -> Self {
        Polynomial::var(v)
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: &Polynomial) -> Polynomial {
        let mut out = self.clone();
        for (m, c) in &rhs.terms {
            out.push(m.clone(), *c);
        }
        out
    }
}

impl Add for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Polynomial) -> Polynomial {
        &self + &rhs
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Polynomial {
        Polynomial {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Polynomial {
        -&self
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: &Polynomial) -> Polynomial {
        self + &(-rhs)
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Polynomial) -> Polynomial {
        &self - &rhs
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut out = Polynomial::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &rhs.terms {
                out.push(ma.mul(mb), ca * cb);
            }
        }
        out
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: Polynomial) -> Polynomial {
        &self * &rhs
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        // highest degree first
        let mut terms: Vec<_> = self.terms.iter().collect();
        terms.sort_by(|(ma, _), (mb, _)| mb.degree().cmp(&ma.degree()).then(ma.cmp(mb)));
        for (i, (m, c)) in terms.into_iter().enumerate() {
            let c = *c;
            if i == 0 {
                if c < 0 {
                    write!(f, "-")?;
                }
            } else {
                write!(f, "{}", if c < 0 { " - " } else { " + " })?;
            }
            let a = c.unsigned_abs();
            if m.0.is_empty() {
                write!(f, "{a}")?;
                continue;
            }
            if a != 1 {
                write!(f, "{a}*")?;
            }
            for (k, (v, e)) in m.0.iter().enumerate() {
                if k > 0 {
                    write!(f, "*")?;
                }
                if *e == 1 {
                    write!(f, "{v}")?;
                } else {
                    write!(f, "{v}^{e}")?;
                }
            }
        }
        Ok(())
    }
}
