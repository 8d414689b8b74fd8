//! Background rate models
//!
//! A background rate model predicts the rate of background events per unit
//! solid angle and time as a function of field-of-view position and
//! reconstructed energy. Synthesis only needs one capability from a model:
//! integrating that rate over energy bins, see [`BackgroundRate`].

pub mod power_law;
pub mod radial_table;

use ndarray::{Array3, ArrayView3, Axis};
use shared::units::{Angle, CompositeUnit, Energy};
use thiserror::Error;

use crate::algo::InterpError;

pub use power_law::PowerLawBackground;
pub use radial_table::RadialTableBackground;

/// Errors raised by background rate models
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackgroundRateError {
    #[error("{quantity} {value} is outside the model support [{min}, {max}]")]
    OutOfDomain {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Evaluation inputs disagree in shape: {0:?}")]
    InputShapes(Vec<Vec<usize>>),

    #[error("Invalid model parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid rate table: {0}")]
    InvalidTable(String),

    #[error("Interpolation failed: {0}")]
    Interpolation(#[from] InterpError),
}

/// Energy-integrated background rate on a (bins, rows, cols) grid
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratedRate {
    /// Integrated rate per energy bin and pixel
    pub values: Array3<f64>,
    /// Unit of `values`, normally a rate per time per solid angle
    pub unit: CompositeUnit,
}

/// Capability to integrate a background rate over reconstructed-energy bins.
///
/// All three inputs share the shape `(n_edges, rows, cols)`: entry `[i, r, c]`
/// of `energy_edges` is edge `i` for pixel `(r, c)`. The result has shape
/// `(n_edges - 1, rows, cols)`, bin `i` integrating between edges `i` and `i + 1`.
///
/// Evaluation outside the model support is an error of the model and is
/// reported through [`BackgroundRateError`]; callers do not reinterpret it.
pub trait BackgroundRate {
    /// Integrate the rate over every energy bin at every FOV position.
    ///
    /// # Arguments
    ///
    /// * `fov_lon` - FOV longitude of each entry, shape `(n_edges, rows, cols)`
    /// * `fov_lat` - FOV latitude of each entry, same shape
    /// * `energy_edges` - Reconstructed-energy bin edges, increasing along axis 0
    ///
    /// # Returns
    ///
    /// An [`IntegratedRate`] of shape `(n_edges - 1, rows, cols)` together with
    /// its unit, e.g. s⁻¹ sr⁻¹ once the energy dimension has been integrated out.
    ///
    /// # Errors
    ///
    /// * `BackgroundRateError::InputShapes` - the three views disagree in shape
    /// * `BackgroundRateError::OutOfDomain` - a position or energy lies outside
    ///   what the model describes
    fn evaluate_integrate(
        &self,
        fov_lon: ArrayView3<'_, Angle>,
        fov_lat: ArrayView3<'_, Angle>,
        energy_edges: ArrayView3<'_, Energy>,
    ) -> Result<IntegratedRate, BackgroundRateError>;
}

/// Integrate a per-pixel bin integrator along the leading (energy edge) axis.
///
/// `integrate_bin(lon, lat, e_lo, e_hi)` returns the integral over one bin for
/// one pixel; the FOV coordinates of the lower edge slot are used.
///
/// Fewer than two edges give an empty `(0, rows, cols)` result. The first error
/// returned by `integrate_bin` stops the loop and is passed through.
///
/// # Errors
///
/// `BackgroundRateError::InputShapes` when the three views differ in shape.
pub fn integrate_bins<F>(
    fov_lon: ArrayView3<'_, Angle>,
    fov_lat: ArrayView3<'_, Angle>,
    energy_edges: ArrayView3<'_, Energy>,
    mut integrate_bin: F,
) -> Result<Array3<f64>, BackgroundRateError>
where
    F: FnMut(Angle, Angle, Energy, Energy) -> Result<f64, BackgroundRateError>,
{
    if fov_lon.shape() != energy_edges.shape() || fov_lat.shape() != energy_edges.shape() {
        return Err(BackgroundRateError::InputShapes(vec![
            fov_lon.shape().to_vec(),
            fov_lat.shape().to_vec(),
            energy_edges.shape().to_vec(),
        ]));
    }

    let (n_edges, rows, cols) = energy_edges.dim();
    if n_edges < 2 {
        return Ok(Array3::zeros((0, rows, cols)));
    }

    let mut values = Array3::zeros((n_edges - 1, rows, cols));
    for (bin, mut plane) in values.axis_iter_mut(Axis(0)).enumerate() {
        for ((row, col), value) in plane.indexed_iter_mut() {
            *value = integrate_bin(
                fov_lon[[bin, row, col]],
                fov_lat[[bin, row, col]],
                energy_edges[[bin, row, col]],
                energy_edges[[bin + 1, row, col]],
            )?;
        }
    }
    Ok(values)
}
