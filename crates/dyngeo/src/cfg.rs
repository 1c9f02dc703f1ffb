//! Tolerance and search constants (internal).
//!
//! Policy
//! - Fixed constants, same as the rest of the numeric code. Call sites that need
//!   to vary them take a small config struct (`RootCfg`) instead.

/// Squared-length threshold below which a direction vector counts as zero.
pub(crate) const DIR_EPS: f64 = 1e-14;
/// Homogeneous `z` below this magnitude is a point at infinity.
pub(crate) const INFINITY_EPS: f64 = 1e-12;
/// Coefficient magnitude treated as zero when trimming polynomials.
pub(crate) const COEFF_EPS: f64 = 1e-12;
/// Relative tolerance for conic classification.
pub(crate) const CONIC_EPS: f64 = 1e-10;
/// Distance under which two candidate points are merged.
pub(crate) const DEDUP_EPS: f64 = 1e-9;

/// Search interval half-width factor for ellipses and circles, relative to the
/// larger semi-axis. Empirical; only validated on the unit scenarios in tests.
pub const ELLIPSE_MARGIN: f64 = 1.05;
/// Expansion factor of the function's parameter domain for open conics
/// (hyperbola, parabola, degenerate). Empirical, same caveat as above.
pub const OPEN_CONIC_MARGIN: f64 = 0.5;

/// Output slots for function/conic intersections when the function is not a
/// polynomial and no degree bound is known.
pub const NUMERIC_INTERSECTION_SLOTS: usize = 8;
