//! One-dimensional interpolation and quadrature on tabulated data.
//!
//! - **Linear interpolation**: binary search plus `y = y₁ + t(y₂ - y₁)`
//! - **Log-log interpolation**: linear in (ln x, ln y), i.e. piecewise power law
//! - **Trapezoidal rule**: integral of sampled data
//!
//! Interpolation never extrapolates; callers decide what happens outside the
//! tabulated range.

use thiserror::Error;

/// Errors that can occur during interpolation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("Value {0} is out of bounds for interpolation range [{1}, {2}]")]
    OutOfBounds(f64, f64, f64),
    #[error("Input vectors must have at least 2 points")]
    InsufficientData,
    #[error("Input vectors must have the same length")]
    MismatchedLengths,
    #[error("X values must be sorted in ascending order")]
    UnsortedData,
}

fn validate(x: f64, xs: &[f64], ys: &[f64]) -> Result<(), InterpError> {
    if xs.len() != ys.len() {
        return Err(InterpError::MismatchedLengths);
    }

    if xs.len() < 2 {
        return Err(InterpError::InsufficientData);
    }

    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(InterpError::UnsortedData);
    }

    let (min_x, max_x) = (xs[0], xs[xs.len() - 1]);
    // Written so that NaN fails the range test
    if !(x >= min_x && x <= max_x) {
        return Err(InterpError::OutOfBounds(x, min_x, max_x));
    }

    Ok(())
}

/// Index pair bracketing `x` plus the fractional position between them.
///
/// Assumes `xs` has been validated and contains `x`.
fn bracket(x: f64, xs: &[f64]) -> (usize, usize, f64) {
    let upper = xs.partition_point(|&probe| probe < x).max(1);
    let lower = upper - 1;
    let t = (x - xs[lower]) / (xs[upper] - xs[lower]);
    (lower, upper, t)
}

/// Performs linear interpolation on 1D data.
///
/// # Arguments
///
/// * `x` - The x-coordinate at which to interpolate
/// * `xs` - Strictly increasing x-coordinates
/// * `ys` - Corresponding y-values
///
/// # Errors
///
/// * `InterpError::OutOfBounds` - x is outside \\[xs\\[0\\], xs\\[n-1\\]\\]
/// * `InterpError::InsufficientData` - Less than 2 data points provided
/// * `InterpError::MismatchedLengths` - xs and ys have different lengths
/// * `InterpError::UnsortedData` - xs is not strictly increasing
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Result<f64, InterpError> {
    validate(x, xs, ys)?;
    let (lower, upper, t) = bracket(x, xs);
    Ok(ys[lower] + t * (ys[upper] - ys[lower]))
}

/// Interpolates a positive power-law-like table linearly in log-log space.
///
/// Segments touching a non-positive y value fall back to linear interpolation,
/// so tables with zeros (e.g. a rate that vanishes at high energy) stay usable.
/// `xs` must be strictly positive.
pub fn interp_loglog(x: f64, xs: &[f64], ys: &[f64]) -> Result<f64, InterpError> {
    validate(x, xs, ys)?;
    let (lower, upper, _) = bracket(x, xs);
    let (y1, y2) = (ys[lower], ys[upper]);

    if y1 <= 0.0 || y2 <= 0.0 || xs[lower] <= 0.0 {
        let t = (x - xs[lower]) / (xs[upper] - xs[lower]);
        return Ok(y1 + t * (y2 - y1));
    }

    let t = (x / xs[lower]).ln() / (xs[upper] / xs[lower]).ln();
    Ok((y1.ln() + t * (y2 / y1).ln()).exp())
}

/// Integrates sampled data with the trapezoidal rule.
///
/// Returns 0 for fewer than two samples. Mismatched lengths use the common prefix.
pub fn trap_integrate(xs: &[f64], ys: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .sum()
}
