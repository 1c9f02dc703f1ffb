//! Object state dumps (JSON) and parameter sweeps (CSV/Parquet).

use anyhow::{anyhow, bail, Context, Result};
use dyngeo::api::{Construction, GeoObject, Number, ObjectKind, Payload};
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// One object as written to JSON.
#[derive(Clone, Debug, Serialize)]
pub struct ObjectState {
    pub label: String,
    pub kind: String,
    pub defined: bool,
    /// Producing algorithm, `None` for free objects.
    pub parent: Option<String>,
    /// Point `[x, y]` (or homogeneous `[x, y, z]` at infinity), line `[a, b, c]`,
    /// conic matrix, number `[value]`, polygon `[x0, y0, x1, y1, ...]`,
    /// function domain `[min, max]`.
    pub coords: Vec<f64>,
}

impl ObjectState {
    pub fn of(cons: &Construction, o: &GeoObject) -> Self {
        let parent = o
            .parent
            .and_then(|a| cons.algorithm(a))
            .map(|n| n.kind.name().to_owned());
        Self {
            label: o.label.clone(),
            kind: format!("{:?}", o.kind()),
            defined: o.defined,
            parent,
            coords: coords(&o.payload),
        }
    }
}

fn coords(p: &Payload) -> Vec<f64> {
    match p {
        Payload::Point(h) => match p.as_xy() {
            Some(xy) => vec![xy.x, xy.y],
            None => h.iter().copied().collect(),
        },
        Payload::Line(l) => l.iter().copied().collect(),
        Payload::Conic(c) => c.m.to_vec(),
        Payload::Function(f) => vec![f.min, f.max],
        Payload::Number(n) => vec![n.value],
        Payload::Polygon(v) => v.iter().flat_map(|q| [q.x, q.y]).collect(),
    }
}

/// All live objects in id order.
pub fn dump(cons: &Construction) -> Vec<ObjectState> {
    cons.store().objects().map(|o| ObjectState::of(cons, o)).collect()
}

/// Sweep settings: drive the free number `param` through `steps` evenly spaced
/// values in `[from, to]`.
#[derive(Clone, Debug)]
pub struct Sweep {
    pub param: String,
    pub from: f64,
    pub to: f64,
    pub steps: usize,
}

/// Long-format table of every point per sweep step:
/// `step, param, label, defined, x, y` (`NaN` coordinates when undefined).
pub fn sweep(cons: &mut Construction, s: &Sweep) -> Result<DataFrame> {
    let id = cons
        .find(&s.param)
        .ok_or_else(|| anyhow!("unknown parameter `{}`", s.param))?;
    match cons.object(id).map(GeoObject::kind) {
        Some(ObjectKind::Number) => {}
        other => bail!("parameter `{}` is {:?}, expected a Number", s.param, other),
    }
    let n = s.steps.max(2);
    let (mut step, mut param, mut label, mut defined, mut xs, mut ys) =
        (Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for k in 0..n {
        let t = s.from + (s.to - s.from) * k as f64 / (n - 1) as f64;
        cons.set_input_value(
            id,
            Payload::Number(Number {
                value: t,
                bounds: None,
            }),
        )
        .with_context(|| format!("sweep step {k}"))?;
        let value = cons.store().value(id).and_then(Payload::as_number).unwrap_or(t);
        for o in cons.store().objects().filter(|o| o.kind() == ObjectKind::Point) {
            let xy = o.value().and_then(Payload::as_xy);
            step.push(k as u32);
            param.push(value);
            label.push(o.label.clone());
            defined.push(xy.is_some());
            xs.push(xy.map_or(f64::NAN, |p| p.x));
            ys.push(xy.map_or(f64::NAN, |p| p.y));
        }
    }
    tracing::info!(param = %s.param, steps = n, rows = step.len(), "sweep");
    Ok(df!(
        "step" => step,
        "param" => param,
        "label" => label,
        "defined" => defined,
        "x" => xs,
        "y" => ys
    )?)
}

/// Write `df` as Parquet when `out` ends in `.parquet`, CSV otherwise.
pub fn write_table(df: &mut DataFrame, out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    if out.extension().is_some_and(|e| e == "parquet") {
        ParquetWriter::new(&mut file).finish(df)?;
    } else {
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
    }
    Ok(())
}
