//! Interpolants through control points.
//!
//! Three evaluators share the same knot handling:
//! - [`LinearInterpolator`]: piecewise linear, never fails.
//! - [`CubicSpline`]: C2 cubic spline with natural (y'' = 0) or clamped
//!   (fixed y') ends, solved with the tridiagonal sweep.
//! - [`MonotoneCubic`]: Fritsch–Carlson PCHIP; stays within each segment's
//!   y-range, so monotone input data gives a monotone curve.
//!
//! # Algorithm (cubic spline)
//! For knots `x₀ < … < xₙ₋₁` the second derivatives `Mᵢ` satisfy
//! ```text
//! hᵢ₋₁·Mᵢ₋₁ + 2(hᵢ₋₁ + hᵢ)·Mᵢ + hᵢ·Mᵢ₊₁ = 6·(δᵢ − δᵢ₋₁)
//! ```
//! and each segment is evaluated as
//! ```text
//! y = a·yₖ + b·yₖ₊₁ + ((a³ − a)·Mₖ + (b³ − b)·Mₖ₊₁)·h²/6,  a = (xₖ₊₁ − x)/h, b = 1 − a
//! ```
//!
//! # Complexity
//! - Build: O(N)
//! - Evaluate: O(log N) binary search + O(1) interpolation

use crate::curve::points::ControlPoint;

/// Spline construction failures. The LUT builder recovers from all of
/// these by falling back to linear interpolation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    #[error("need at least 2 control points, got {0}")]
    TooFewPoints(usize),
    #[error("x values must be strictly increasing (at index {0})")]
    NotIncreasing(usize),
    #[error("non-finite control point at index {0}")]
    NonFinite(usize),
}

/// End conditions for [`CubicSpline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    /// Zero second derivative at both ends.
    Natural,
    /// Prescribed first derivative at the start and end knots.
    Clamped { start: f64, end: f64 },
}

/// Piecewise-linear evaluation, clamped to the end values outside the knots.
///
/// Borrows the points to avoid allocations in the 256-entry bake loop.
pub struct LinearInterpolator<'a> {
    pub control_points: &'a [ControlPoint],
}

impl LinearInterpolator<'_> {
    /// Returns `x` (identity) when there are no points and the single
    /// y-value for one point.
    pub fn evaluate(&self, x: f64) -> f64 {
        let pts = self.control_points;
        match pts {
            [] => return x,
            [only] => return only.y as f64,
            _ => {}
        }
        let first = pts[0];
        let last = pts[pts.len() - 1];
        if x <= first.x as f64 {
            return first.y as f64;
        }
        if x >= last.x as f64 {
            return last.y as f64;
        }

        let k = segment_index(pts.len(), |i| pts[i].x as f64, x);
        let (x0, y0) = (pts[k].x as f64, pts[k].y as f64);
        let (x1, y1) = (pts[k + 1].x as f64, pts[k + 1].y as f64);
        if (x1 - x0).abs() < 1e-12 {
            return y0;
        }
        y0 + (x - x0) / (x1 - x0) * (y1 - y0)
    }
}

/// C2 cubic spline through every knot.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    /// Natural spline (y'' = 0 at both ends).
    pub fn natural(points: &[ControlPoint]) -> Result<Self, SplineError> {
        Self::with_boundary(points, Boundary::Natural)
    }

    /// Clamped spline whose end slopes equal the first and last secants.
    ///
    /// Choosing the secants keeps a straight-line set of points straight,
    /// in particular the two-point identity curve.
    pub fn clamped_to_secants(points: &[ControlPoint]) -> Result<Self, SplineError> {
        let (xs, ys) = knots(points)?;
        let n = xs.len();
        let start = (ys[1] - ys[0]) / (xs[1] - xs[0]);
        let end = (ys[n - 1] - ys[n - 2]) / (xs[n - 1] - xs[n - 2]);
        Self::solve(xs, ys, Boundary::Clamped { start, end })
    }

    pub fn with_boundary(points: &[ControlPoint], boundary: Boundary) -> Result<Self, SplineError> {
        let (xs, ys) = knots(points)?;
        Self::solve(xs, ys, boundary)
    }

    fn solve(xs: Vec<f64>, ys: Vec<f64>, boundary: Boundary) -> Result<Self, SplineError> {
        let n = xs.len();
        let mut m = vec![0.0_f64; n];
        let mut u = vec![0.0_f64; n];

        if let Boundary::Clamped { start, .. } = boundary {
            let h = xs[1] - xs[0];
            m[0] = -0.5;
            u[0] = (3.0 / h) * ((ys[1] - ys[0]) / h - start);
        }

        // Forward sweep of the tridiagonal system
        for i in 1..n - 1 {
            let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
            let p = sig * m[i - 1] + 2.0;
            m[i] = (sig - 1.0) / p;
            let d = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]) - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
            u[i] = (6.0 * d / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
        }

        let (qn, un) = match boundary {
            Boundary::Natural => (0.0, 0.0),
            Boundary::Clamped { end, .. } => {
                let h = xs[n - 1] - xs[n - 2];
                (0.5, (3.0 / h) * (end - (ys[n - 1] - ys[n - 2]) / h))
            }
        };
        m[n - 1] = (un - qn * u[n - 2]) / (qn * m[n - 2] + 1.0);

        // Back substitution
        for k in (0..n - 1).rev() {
            m[k] = m[k] * m[k + 1] + u[k];
        }

        if let Some(i) = m.iter().position(|v| !v.is_finite()) {
            return Err(SplineError::NonFinite(i));
        }

        Ok(Self {
            xs,
            ys,
            second_derivatives: m,
        })
    }

    /// Evaluate at `x`. Outside the knots the end segments are extended.
    pub fn evaluate(&self, x: f64) -> f64 {
        let k = segment_index(self.xs.len(), |i| self.xs[i], x);
        let (x0, x1) = (self.xs[k], self.xs[k + 1]);
        let h = x1 - x0;
        let a = (x1 - x) / h;
        let b = (x - x0) / h;
        let m = &self.second_derivatives;
        a * self.ys[k]
            + b * self.ys[k + 1]
            + ((a * a * a - a) * m[k] + (b * b * b - b) * m[k + 1]) * h * h / 6.0
    }
}

/// Fritsch–Carlson monotone piecewise cubic Hermite interpolant.
#[derive(Debug, Clone)]
pub struct MonotoneCubic {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
}

impl MonotoneCubic {
    pub fn new(points: &[ControlPoint]) -> Result<Self, SplineError> {
        let (xs, ys) = knots(points)?;
        let n = xs.len();
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let delta: Vec<f64> = (0..n - 1).map(|k| (ys[k + 1] - ys[k]) / h[k]).collect();

        let mut slopes = vec![0.0_f64; n];
        if n == 2 {
            slopes[0] = delta[0];
            slopes[1] = delta[0];
        } else {
            for k in 1..n - 1 {
                if delta[k - 1] * delta[k] > 0.0 {
                    // Weighted harmonic mean keeps the interpolant monotone
                    let w1 = 2.0 * h[k] + h[k - 1];
                    let w2 = h[k] + 2.0 * h[k - 1];
                    slopes[k] = (w1 + w2) / (w1 / delta[k - 1] + w2 / delta[k]);
                }
            }
            slopes[0] = end_slope(h[0], h[1], delta[0], delta[1]);
            slopes[n - 1] = end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
        }

        Ok(Self { xs, ys, slopes })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        let k = segment_index(n, |i| self.xs[i], x);
        let h = self.xs[k + 1] - self.xs[k];
        let t = (x - self.xs[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;
        h00 * self.ys[k] + h10 * h * self.slopes[k] + h01 * self.ys[k + 1] + h11 * h * self.slopes[k + 1]
    }
}

/// Three-point end slope, limited so it cannot overshoot.
fn end_slope(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if d.signum() != d0.signum() || d0 == 0.0 {
        0.0
    } else if d0.signum() != d1.signum() && d.abs() > 3.0 * d0.abs() {
        3.0 * d0
    } else {
        d
    }
}

/// Validate points and split them into f64 knot vectors.
fn knots(points: &[ControlPoint]) -> Result<(Vec<f64>, Vec<f64>), SplineError> {
    if points.len() < 2 {
        return Err(SplineError::TooFewPoints(points.len()));
    }
    for (i, p) in points.iter().enumerate() {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(SplineError::NonFinite(i));
        }
        if i > 0 && p.x <= points[i - 1].x {
            return Err(SplineError::NotIncreasing(i));
        }
    }
    Ok((
        points.iter().map(|p| p.x as f64).collect(),
        points.iter().map(|p| p.y as f64).collect(),
    ))
}

/// Binary search for the segment `[k, k+1]` containing `x`, clamped to the
/// first and last segments. Requires `len >= 2`.
fn segment_index(len: usize, x_at: impl Fn(usize) -> f64, x: f64) -> usize {
    let mut lo = 0;
    let mut hi = len - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if x_at(mid) <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}
