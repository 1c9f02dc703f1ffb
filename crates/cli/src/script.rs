//! JSON construction scripts: the on-disk form of a construction.
//!
//! A script is a list of steps replayed in order against a fresh
//! `Construction`. Objects are referred to by label.
//!
//! ```json
//! { "continuous": true,
//!   "steps": [
//!     { "op": "object", "label": "A", "value": { "kind": "point", "x": 0, "y": 0 } },
//!     { "op": "object", "label": "B", "value": { "kind": "point", "x": 1, "y": 1 } },
//!     { "op": "algorithm", "kind": "line_through_points", "inputs": ["A", "B"], "labels": ["g"] },
//!     { "op": "set", "label": "B", "value": { "kind": "point", "x": 2, "y": 1 } }
//!   ] }
//! ```

use anyhow::{anyhow, bail, Context, Result};
use dyngeo::api::{AlgoId, AlgoKind, Conic, Construction, Expr, Function, Number, ObjectId, Payload};
use dyngeo::prelude::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub continuous: bool,
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Object {
        #[serde(default)]
        label: Option<String>,
        value: Value,
    },
    Algorithm {
        kind: Kind,
        inputs: Vec<String>,
        /// Output slot count for function/conic intersections (0 = automatic).
        #[serde(default)]
        slots: usize,
        /// Labels for the outputs, in slot order; missing ones stay automatic.
        #[serde(default)]
        labels: Vec<String>,
    },
    Redefine {
        target: String,
        kind: Kind,
        inputs: Vec<String>,
    },
    Set {
        label: String,
        value: Value,
    },
    Remove {
        label: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    LineThroughPoints,
    IntersectLines,
    AngularBisector,
    CirclePointRadius,
    IntersectFunctionConic,
    ConvexHull,
}

impl Kind {
    fn to_algo(self, slots: usize) -> AlgoKind {
        match self {
            Kind::LineThroughPoints => AlgoKind::LineThroughPoints,
            Kind::IntersectLines => AlgoKind::IntersectLines,
            Kind::AngularBisector => AlgoKind::AngularBisector,
            Kind::CirclePointRadius => AlgoKind::CirclePointRadius,
            Kind::IntersectFunctionConic => AlgoKind::IntersectFunctionConic { slots },
            Kind::ConvexHull => AlgoKind::ConvexHull,
        }
    }
}

/// Free object values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    Point {
        x: f64,
        y: f64,
    },
    Line {
        a: f64,
        b: f64,
        c: f64,
    },
    /// `[A00, A11, A22, A01, A02, A12]`.
    Conic {
        m: [f64; 6],
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Function {
        expr: Term,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Number {
        value: f64,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

/// Function expression in `x`, e.g. `{"add": [{"sin": "x"}, {"const": 1}]}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    X,
    Const(f64),
    /// Coefficients in ascending powers of `x`.
    Poly(Vec<f64>),
    Add(Box<Term>, Box<Term>),
    Sub(Box<Term>, Box<Term>),
    Mul(Box<Term>, Box<Term>),
    Div(Box<Term>, Box<Term>),
    Neg(Box<Term>),
    Powi(Box<Term>, i32),
    Sin(Box<Term>),
    Cos(Box<Term>),
    Exp(Box<Term>),
    Ln(Box<Term>),
    Sqrt(Box<Term>),
}

impl Term {
    fn to_expr(&self) -> Expr {
        let b = |t: &Term| Box::new(t.to_expr());
        match self {
            Term::X => Expr::X,
            Term::Const(c) => Expr::Const(*c),
            Term::Poly(c) => Expr::poly(c),
            Term::Add(l, r) => Expr::Add(b(l), b(r)),
            Term::Sub(l, r) => Expr::Sub(b(l), b(r)),
            Term::Mul(l, r) => Expr::Mul(b(l), b(r)),
            Term::Div(l, r) => Expr::Div(b(l), b(r)),
            Term::Neg(t) => Expr::Neg(b(t)),
            Term::Powi(t, n) => Expr::Powi(b(t), *n),
            Term::Sin(t) => Expr::Sin(b(t)),
            Term::Cos(t) => Expr::Cos(b(t)),
            Term::Exp(t) => Expr::Exp(b(t)),
            Term::Ln(t) => Expr::Ln(b(t)),
            Term::Sqrt(t) => Expr::Sqrt(b(t)),
        }
    }
}

impl Value {
    pub fn to_payload(&self) -> Payload {
        match self {
            Value::Point { x, y } => Payload::point(*x, *y),
            Value::Line { a, b, c } => Payload::line(*a, *b, *c),
            Value::Conic { m } => Payload::Conic(Conic::new(*m)),
            Value::Circle { cx, cy, r } => Payload::Conic(Conic::circle(Vec2::new(*cx, *cy), *r)),
            Value::Function { expr, min, max } => Payload::Function(Function::new(
                expr.to_expr(),
                min.unwrap_or(f64::NEG_INFINITY),
                max.unwrap_or(f64::INFINITY),
            )),
            Value::Number { value, min, max } => match (min, max) {
                (Some(lo), Some(hi)) => Payload::Number(Number::slider(*value, *lo, *hi)),
                _ => Payload::number(*value),
            },
        }
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    /// Replay every step on a fresh construction.
    pub fn build(&self) -> Result<Construction> {
        let mut cons = Construction::new();
        cons.set_continuous_mode(self.continuous);
        for (i, step) in self.steps.iter().enumerate() {
            apply(&mut cons, step).with_context(|| format!("step {i}"))?;
        }
        Ok(cons)
    }
}

fn lookup(cons: &Construction, label: &str) -> Result<ObjectId> {
    cons.find(label).ok_or_else(|| anyhow!("unknown label `{label}`"))
}

fn lookup_all(cons: &Construction, labels: &[String]) -> Result<Vec<ObjectId>> {
    labels.iter().map(|l| lookup(cons, l)).collect()
}

pub fn apply(cons: &mut Construction, step: &Step) -> Result<Option<AlgoId>> {
    match step {
        Step::Object { label, value } => {
            let payload = value.to_payload();
            match label {
                Some(l) => cons.create_object_labeled(l, payload)?,
                None => cons.create_object(payload),
            };
            Ok(None)
        }
        Step::Algorithm {
            kind,
            inputs,
            slots,
            labels,
        } => {
            let inputs = lookup_all(cons, inputs)?;
            let algo = cons.create_algorithm(kind.to_algo(*slots), &inputs)?;
            let outputs = cons
                .algorithm(algo)
                .map(|n| n.outputs.clone())
                .unwrap_or_default();
            if labels.len() > outputs.len() {
                bail!("{} labels for {} outputs", labels.len(), outputs.len());
            }
            for (o, l) in outputs.iter().zip(labels) {
                cons.relabel(*o, l)?;
            }
            Ok(Some(algo))
        }
        Step::Redefine {
            target,
            kind,
            inputs,
        } => {
            let target = lookup(cons, target)?;
            let inputs = lookup_all(cons, inputs)?;
            Ok(Some(cons.redefine(target, kind.to_algo(0), &inputs)?))
        }
        Step::Set { label, value } => {
            let id = lookup(cons, label)?;
            cons.set_input_value(id, value.to_payload())?;
            Ok(None)
        }
        Step::Remove { label } => {
            let id = lookup(cons, label)?;
            cons.remove_object(id)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BISECTOR: &str = r#"{
        "continuous": true,
        "steps": [
            { "op": "object", "label": "A", "value": { "kind": "point", "x": 0, "y": 0 } },
            { "op": "object", "label": "B", "value": { "kind": "point", "x": 4, "y": 0 } },
            { "op": "object", "label": "C", "value": { "kind": "point", "x": 1, "y": 3 } },
            { "op": "algorithm", "kind": "line_through_points", "inputs": ["A", "B"], "labels": ["g"] },
            { "op": "algorithm", "kind": "line_through_points", "inputs": ["A", "C"], "labels": ["h"] },
            { "op": "algorithm", "kind": "angular_bisector", "inputs": ["g", "h"], "labels": ["w1", "w2"] },
            { "op": "set", "label": "C", "value": { "kind": "point", "x": -1, "y": 3 } }
        ]
    }"#;

    #[test]
    fn script_replays_into_construction() {
        let script: Script = serde_json::from_str(BISECTOR).unwrap();
        let cons = script.build().unwrap();
        assert!(cons.ctx().continuous);
        let w1 = cons.find("w1").unwrap();
        let (defined, payload) = cons.object_state(w1).unwrap();
        assert!(defined);
        assert!(payload.as_line().is_some());
        assert_eq!(cons.object_state(cons.find("C").unwrap()).unwrap().1.as_xy().unwrap().x, -1.0);
    }

    #[test]
    fn functions_and_sliders_parse() {
        let v: Value = serde_json::from_str(
            r#"{ "kind": "function", "expr": { "add": [{ "sin": "x" }, { "const": 1 }] }, "min": -3, "max": 3 }"#,
        )
        .unwrap();
        let Payload::Function(f) = v.to_payload() else {
            panic!("not a function")
        };
        assert!((f.eval(0.0) - 1.0).abs() < 1e-15);
        assert_eq!((f.min, f.max), (-3.0, 3.0));

        let v: Value = serde_json::from_str(r#"{ "kind": "number", "value": 5, "min": 0, "max": 2 }"#).unwrap();
        assert_eq!(v.to_payload().as_number(), Some(2.0));
    }

    #[test]
    fn errors_name_the_failing_step() {
        let script: Script = serde_json::from_str(
            r#"{ "steps": [
                { "op": "object", "label": "A", "value": { "kind": "point", "x": 0, "y": 0 } },
                { "op": "algorithm", "kind": "intersect_lines", "inputs": ["A", "A"] }
            ] }"#,
        )
        .unwrap();
        let err = script.build().unwrap_err();
        assert_eq!(err.to_string(), "step 1");
        assert!(format!("{err:#}").contains("IntersectLines"));
    }
}
