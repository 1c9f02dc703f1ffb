//! Geometric objects: the nodes whose payloads algorithms read and write.

use std::fmt;

use nalgebra::{Vector2, Vector3};

use crate::algo::AlgoId;
use crate::numeric::{inhom, Conic, Function};

/// Stable object identifier (arena index, never reused).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Point,
    Line,
    Conic,
    Function,
    Number,
    Polygon,
}

impl ObjectKind {
    /// Prefix of automatically generated labels.
    pub fn label_prefix(self) -> &'static str {
        match self {
            ObjectKind::Point => "P",
            ObjectKind::Line => "l",
            ObjectKind::Conic => "c",
            ObjectKind::Function => "f",
            ObjectKind::Number => "n",
            ObjectKind::Polygon => "poly",
        }
    }
}

/// Scalar with optional slider bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Number {
    pub value: f64,
    pub bounds: Option<(f64, f64)>,
}

impl Number {
    pub fn free(value: f64) -> Self {
        Self {
            value,
            bounds: None,
        }
    }

    pub fn slider(value: f64, min: f64, max: f64) -> Self {
        Self {
            value,
            bounds: Some((min, max)),
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        match self.bounds {
            Some((lo, hi)) if lo <= hi => Self {
                value: self.value.clamp(lo, hi),
                ..self
            },
            _ => self,
        }
    }
}

/// Kind-specific numeric state of an object.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Homogeneous coordinates `(x, y, z)`.
    Point(Vector3<f64>),
    /// `a x + b y + c = 0` as `(a, b, c)`.
    Line(Vector3<f64>),
    Conic(Conic),
    Function(Function),
    Number(Number),
    /// Vertices in counterclockwise order.
    Polygon(Vec<Vector2<f64>>),
}

impl Payload {
    pub fn point(x: f64, y: f64) -> Self {
        Payload::Point(Vector3::new(x, y, 1.0))
    }

    pub fn line(a: f64, b: f64, c: f64) -> Self {
        Payload::Line(Vector3::new(a, b, c))
    }

    pub fn number(v: f64) -> Self {
        Payload::Number(Number::free(v))
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Payload::Point(_) => ObjectKind::Point,
            Payload::Line(_) => ObjectKind::Line,
            Payload::Conic(_) => ObjectKind::Conic,
            Payload::Function(_) => ObjectKind::Function,
            Payload::Number(_) => ObjectKind::Number,
            Payload::Polygon(_) => ObjectKind::Polygon,
        }
    }

    /// Placeholder payload of an output slot before its first compute.
    pub fn empty(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Point => Payload::Point(Vector3::zeros()),
            ObjectKind::Line => Payload::Line(Vector3::zeros()),
            ObjectKind::Conic => Payload::Conic(Conic::default()),
            ObjectKind::Function => Payload::Function(Function::default()),
            ObjectKind::Number => Payload::number(f64::NAN),
            ObjectKind::Polygon => Payload::Polygon(Vec::new()),
        }
    }

    /// Whether the numbers in the payload are usable (finite, non-degenerate).
    pub fn is_valid(&self) -> bool {
        match self {
            Payload::Point(p) => p.iter().all(|c| c.is_finite()) && p.norm_squared() > 0.0,
            Payload::Line(l) => {
                l.iter().all(|c| c.is_finite()) && (l.x != 0.0 || l.y != 0.0 || l.z != 0.0)
            }
            Payload::Conic(c) => c.m.iter().all(|v| v.is_finite()),
            Payload::Function(f) => !(f.min > f.max),
            Payload::Number(n) => n.value.is_finite(),
            Payload::Polygon(v) => v.iter().all(|p| p.x.is_finite() && p.y.is_finite()),
        }
    }

    pub fn as_point(&self) -> Option<&Vector3<f64>> {
        match self {
            Payload::Point(p) => Some(p),
            _ => None,
        }
    }

    /// Inhomogeneous coordinates of a finite point.
    pub fn as_xy(&self) -> Option<Vector2<f64>> {
        self.as_point().and_then(inhom)
    }

    pub fn as_line(&self) -> Option<&Vector3<f64>> {
        match self {
            Payload::Line(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_conic(&self) -> Option<&Conic> {
        match self {
            Payload::Conic(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Payload::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Payload::Number(n) => Some(n.value),
            _ => None,
        }
    }

    pub fn as_polygon(&self) -> Option<&[Vector2<f64>]> {
        match self {
            Payload::Polygon(v) => Some(v),
            _ => None,
        }
    }
}

/// Node of the construction: label, payload, and provenance.
#[derive(Clone, Debug)]
pub struct GeoObject {
    pub id: ObjectId,
    pub label: String,
    pub payload: Payload,
    pub defined: bool,
    /// Producing algorithm; `None` for free objects.
    pub parent: Option<AlgoId>,
}

impl GeoObject {
    pub fn kind(&self) -> ObjectKind {
        self.payload.kind()
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.parent.is_none()
    }

    /// Payload if the object is defined.
    #[inline]
    pub fn value(&self) -> Option<&Payload> {
        self.defined.then_some(&self.payload)
    }
}
