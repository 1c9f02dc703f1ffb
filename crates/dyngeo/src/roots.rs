//! Bounded numeric root search for `f: R -> R` on `[lo, hi]`.
//!
//! Scan the interval at a fixed number of samples, refine every sign change by
//! bisection and every near-zero local minimum of `|f|` by golden-section
//! search (touching roots have no sign change). Iteration counts are fixed, so
//! a search always terminates; no root in range is an empty result, not an
//! error.

use nalgebra::Vector2;

/// Root search settings.
#[derive(Clone, Copy, Debug)]
pub struct RootCfg {
    /// Number of scan intervals.
    pub samples: usize,
    /// Iteration cap for each refinement.
    pub max_iter: usize,
    /// Absolute bracket width at which refinement stops.
    pub tol: f64,
    /// A local minimum of `|f|` counts as a touching root when it is below
    /// `touch_tol` times the larger neighbouring sample. Relative, so a
    /// rescaled `f` has the same roots.
    pub touch_tol: f64,
}

impl Default for RootCfg {
    fn default() -> Self {
        Self {
            samples: 512,
            max_iter: 100,
            tol: 1e-13,
            touch_tol: 1e-9,
        }
    }
}

/// Sorted roots of `f` in `[lo, hi]`.
///
/// `f` is `Fn`, so a search cannot mutate anything it reads; it is evaluated
/// many times. Non-finite values split the scan.
pub fn find_roots<F>(f: F, lo: f64, hi: f64, cfg: &RootCfg) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    if !(lo.is_finite() && hi.is_finite()) || lo > hi || cfg.samples == 0 {
        return Vec::new();
    }
    if lo == hi {
        return if f(lo) == 0.0 { vec![lo] } else { Vec::new() };
    }
    let n = cfg.samples;
    let step = (hi - lo) / n as f64;
    let xs: Vec<f64> = (0..=n)
        .map(|i| if i == n { hi } else { lo + step * i as f64 })
        .collect();
    let fs: Vec<f64> = xs.iter().map(|&x| f(x)).collect();

    let mut roots = Vec::new();
    for i in 0..=n {
        let fi = fs[i];
        if fi == 0.0 {
            roots.push(xs[i]);
            continue;
        }
        if i < n && fi.is_finite() && fs[i + 1].is_finite() && fs[i + 1] != 0.0 {
            if (fi < 0.0) != (fs[i + 1] < 0.0) {
                roots.push(bisect(&f, xs[i], xs[i + 1], fi, cfg));
            }
        }
        if 0 < i && i < n && is_touch_candidate(fs[i - 1], fi, fs[i + 1]) {
            let xm = golden_min_abs(&f, xs[i - 1], xs[i + 1], cfg);
            let around = fs[i - 1].abs().max(fs[i + 1].abs());
            if f(xm).abs() <= cfg.touch_tol * around {
                roots.push(xm);
            }
        }
    }
    roots.sort_by(f64::total_cmp);
    let merge = (step * 1e-3).max(cfg.tol);
    roots.dedup_by(|a, b| (*a - *b).abs() <= merge);
    roots
}

/// Roots together with the curve point at each parameter.
pub fn find_root_points<F, C>(
    f: F,
    curve: C,
    lo: f64,
    hi: f64,
    cfg: &RootCfg,
) -> Vec<(f64, Vector2<f64>)>
where
    F: Fn(f64) -> f64,
    C: Fn(f64) -> Vector2<f64>,
{
    find_roots(f, lo, hi, cfg)
        .into_iter()
        .map(|t| (t, curve(t)))
        .filter(|(_, p)| p.x.is_finite() && p.y.is_finite())
        .collect()
}

/// Local minimum of `|f|` without a sign change around it.
#[inline]
fn is_touch_candidate(f_prev: f64, f_mid: f64, f_next: f64) -> bool {
    if !(f_prev.is_finite() && f_mid.is_finite() && f_next.is_finite()) {
        return false;
    }
    let same_sign = (f_prev < 0.0) == (f_mid < 0.0) && (f_mid < 0.0) == (f_next < 0.0);
    same_sign && f_mid.abs() <= f_prev.abs() && f_mid.abs() <= f_next.abs()
}

fn bisect<F>(f: &F, mut a: f64, mut b: f64, mut fa: f64, cfg: &RootCfg) -> f64
where
    F: Fn(f64) -> f64,
{
    for _ in 0..cfg.max_iter {
        let mid = 0.5 * (a + b);
        if (b - a).abs() <= cfg.tol || mid <= a || mid >= b {
            return mid;
        }
        let fm = f(mid);
        if fm == 0.0 {
            return mid;
        }
        if !fm.is_finite() {
            break;
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

fn golden_min_abs<F>(f: &F, mut a: f64, mut b: f64, cfg: &RootCfg) -> f64
where
    F: Fn(f64) -> f64,
{
    const INV_PHI: f64 = 0.618_033_988_749_894_8;
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c).abs();
    let mut fd = f(d).abs();
    for _ in 0..cfg.max_iter {
        if (b - a).abs() <= cfg.tol {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c).abs();
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d).abs();
        }
    }
    0.5 * (a + b)
}
