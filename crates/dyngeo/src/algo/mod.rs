//! Algorithm nodes: one closed sum type of variants, one `compute` dispatch.
//!
//! Contract
//! - Inputs are read-only payload references (undefined inputs arrive as `None`).
//! - `compute` returns exactly one entry per output slot; `None` marks the slot
//!   undefined. Output count and kinds never change after construction.
//! - Numeric faults (`Fault`) are absorbed here: all outputs go undefined and
//!   the continuity scratch is reset.

mod basic;
mod bisector;
mod intersect;

use std::fmt;

use nalgebra::Vector2;

use crate::cfg::NUMERIC_INTERSECTION_SLOTS;
use crate::ctx::EvalCtx;
use crate::error::Fault;
use crate::object::{ObjectId, ObjectKind, Payload};

pub use intersect::search_interval;

/// Stable algorithm identifier (arena index, never reused).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlgoId(pub usize);

impl fmt::Display for AlgoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "algo#{}", self.0)
    }
}

/// Computation variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlgoKind {
    /// Point, Point → Line.
    LineThroughPoints,
    /// Line, Line → Point.
    IntersectLines,
    /// Line, Line → Line, Line (the two angle bisectors).
    AngularBisector,
    /// Point, Number → Conic (circle with center and radius).
    CirclePointRadius,
    /// Function, Conic → `slots` Points. `slots == 0` picks the count from the
    /// function at creation time.
    IntersectFunctionConic { slots: usize },
    /// Point × n (n ≥ 1) → Polygon.
    ConvexHull,
}

/// Accepted input kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(&'static [ObjectKind]),
    AtLeast(ObjectKind, usize),
}

impl Arity {
    pub fn accepts(&self, kinds: &[ObjectKind]) -> bool {
        match *self {
            Arity::Exact(want) => want == kinds,
            Arity::AtLeast(k, n) => kinds.len() >= n && kinds.iter().all(|x| *x == k),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "{k:?}"),
            Arity::AtLeast(k, n) => write!(f, "at least {n} × {k:?}"),
        }
    }
}

impl AlgoKind {
    pub fn name(&self) -> &'static str {
        match self {
            AlgoKind::LineThroughPoints => "LineThroughPoints",
            AlgoKind::IntersectLines => "IntersectLines",
            AlgoKind::AngularBisector => "AngularBisector",
            AlgoKind::CirclePointRadius => "CirclePointRadius",
            AlgoKind::IntersectFunctionConic { .. } => "IntersectFunctionConic",
            AlgoKind::ConvexHull => "ConvexHull",
        }
    }

    pub fn arity(&self) -> Arity {
        use ObjectKind::*;
        match self {
            AlgoKind::LineThroughPoints => Arity::Exact(&[Point, Point]),
            AlgoKind::IntersectLines | AlgoKind::AngularBisector => Arity::Exact(&[Line, Line]),
            AlgoKind::CirclePointRadius => Arity::Exact(&[Point, Number]),
            AlgoKind::IntersectFunctionConic { .. } => Arity::Exact(&[Function, Conic]),
            AlgoKind::ConvexHull => Arity::AtLeast(Point, 1),
        }
    }

    /// Fill in creation-time parameters from the current input payloads.
    pub(crate) fn resolve(self, inputs: &[&Payload]) -> Self {
        match self {
            AlgoKind::IntersectFunctionConic { slots: 0 } => {
                let slots = inputs
                    .first()
                    .and_then(|p| p.as_function())
                    .and_then(|f| f.expr.as_polynomial())
                    .and_then(|p| p.degree())
                    .map(|d| (2 * d).max(2))
                    .unwrap_or(NUMERIC_INTERSECTION_SLOTS);
                AlgoKind::IntersectFunctionConic { slots }
            }
            k => k,
        }
    }

    pub fn output_kinds(&self) -> Vec<ObjectKind> {
        match self {
            AlgoKind::LineThroughPoints => vec![ObjectKind::Line],
            AlgoKind::IntersectLines => vec![ObjectKind::Point],
            AlgoKind::AngularBisector => vec![ObjectKind::Line; 2],
            AlgoKind::CirclePointRadius => vec![ObjectKind::Conic],
            AlgoKind::IntersectFunctionConic { slots } => vec![ObjectKind::Point; *slots],
            AlgoKind::ConvexHull => vec![ObjectKind::Polygon],
        }
    }

    /// Whether the variant has several valid output branches.
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            AlgoKind::AngularBisector | AlgoKind::IntersectFunctionConic { .. }
        )
    }

    fn fresh_scratch(&self) -> Scratch {
        match self {
            AlgoKind::AngularBisector => Scratch::Directions([None; 2]),
            AlgoKind::IntersectFunctionConic { slots } => Scratch::Points(vec![None; *slots]),
            _ => Scratch::None,
        }
    }
}

/// Continuity history kept between recomputes.
#[derive(Clone, Debug, PartialEq)]
pub enum Scratch {
    None,
    /// Last chosen direction per output slot.
    Directions([Option<Vector2<f64>>; 2]),
    /// Last position per output slot.
    Points(Vec<Option<Vector2<f64>>>),
}

/// Algorithm instance in the construction graph.
#[derive(Clone, Debug)]
pub struct AlgoNode {
    pub id: AlgoId,
    pub kind: AlgoKind,
    pub inputs: Vec<ObjectId>,
    pub outputs: Vec<ObjectId>,
    scratch: Scratch,
}

impl AlgoNode {
    pub(crate) fn new(id: AlgoId, kind: AlgoKind, inputs: Vec<ObjectId>, outputs: Vec<ObjectId>) -> Self {
        Self {
            id,
            kind,
            inputs,
            outputs,
            scratch: kind.fresh_scratch(),
        }
    }

    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    pub(crate) fn reset_scratch(&mut self) {
        self.scratch = self.kind.fresh_scratch();
    }

    /// Recompute outputs from the current input payloads.
    pub fn compute(&mut self, inputs: &[Option<&Payload>], ctx: EvalCtx) -> Vec<Option<Payload>> {
        let n = self.outputs.len();
        let result = match inputs.iter().copied().collect::<Option<Vec<&Payload>>>() {
            Some(vals) => self.dispatch(&vals, ctx),
            None => Err(Fault::UndefinedInput),
        };
        match result {
            Ok(out) => {
                debug_assert_eq!(out.len(), n, "output arity changed");
                out
            }
            Err(fault) => {
                if !ctx.quiet {
                    tracing::trace!(algo = %self.id, kind = self.kind.name(), %fault, "outputs undefined");
                }
                self.reset_scratch();
                vec![None; n]
            }
        }
    }

    fn dispatch(&mut self, v: &[&Payload], ctx: EvalCtx) -> Result<Vec<Option<Payload>>, Fault> {
        let fault = || Fault::UndefinedInput;
        match self.kind {
            AlgoKind::LineThroughPoints => {
                let (a, b) = (v[0].as_point().ok_or_else(fault)?, v[1].as_point().ok_or_else(fault)?);
                Ok(vec![Some(Payload::Line(basic::line_through(a, b)?))])
            }
            AlgoKind::IntersectLines => {
                let (g, h) = (v[0].as_line().ok_or_else(fault)?, v[1].as_line().ok_or_else(fault)?);
                Ok(vec![basic::intersect_lines(g, h).map(Payload::Point)])
            }
            AlgoKind::AngularBisector => {
                let (g, h) = (v[0].as_line().ok_or_else(fault)?, v[1].as_line().ok_or_else(fault)?);
                let Scratch::Directions(prev) = &mut self.scratch else {
                    return Err(Fault::DegenerateInput);
                };
                let out = bisector::compute(g, h, prev, ctx)?;
                Ok(out.into_iter().map(|l| l.map(Payload::Line)).collect())
            }
            AlgoKind::CirclePointRadius => {
                let m = v[0].as_point().ok_or_else(fault)?;
                let r = v[1].as_number().ok_or_else(fault)?;
                Ok(vec![Some(Payload::Conic(basic::circle(m, r)?))])
            }
            AlgoKind::IntersectFunctionConic { slots } => {
                let f = v[0].as_function().ok_or_else(fault)?;
                let c = v[1].as_conic().ok_or_else(fault)?;
                let Scratch::Points(prev) = &mut self.scratch else {
                    return Err(Fault::DegenerateInput);
                };
                let pts = intersect::compute(f, c, slots, prev, ctx)?;
                Ok(pts.into_iter().map(|p| p.map(Payload::Point)).collect())
            }
            AlgoKind::ConvexHull => {
                let pts = v
                    .iter()
                    .map(|p| p.as_xy())
                    .collect::<Option<Vec<_>>>()
                    .ok_or(Fault::DegenerateInput)?;
                Ok(vec![Some(Payload::Polygon(basic::hull(&pts)?))])
            }
        }
    }
}
