//! Parametric background: power law in energy, Gaussian in FOV offset
//!
//! ```text
//! dN/dE(E, θ) = norm · (E / E_ref)^(-index) · exp(-θ² / (2σ²))
//! ```
//!
//! `norm` is the differential rate at `E_ref` on axis in MeV⁻¹ s⁻¹ sr⁻¹ and
//! θ² = lon² + lat² in FOV coordinates. The energy integral is analytic.

use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};
use shared::units::{Angle, AngleExt, CompositeUnit, Energy, EnergyExt};

use super::{integrate_bins, BackgroundRate, BackgroundRateError, IntegratedRate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PowerLawFields")]
pub struct PowerLawBackground {
    /// Differential rate at the reference energy on axis, MeV⁻¹ s⁻¹ sr⁻¹
    pub norm: f64,
    /// Reference energy in TeV
    pub reference_tev: f64,
    /// Spectral index (positive for a falling spectrum)
    pub index: f64,
    /// Gaussian width of the radial acceptance in degrees
    pub sigma_deg: f64,
}

#[derive(Deserialize)]
struct PowerLawFields {
    norm: f64,
    reference_tev: f64,
    index: f64,
    sigma_deg: f64,
}

impl TryFrom<PowerLawFields> for PowerLawBackground {
    type Error = BackgroundRateError;

    fn try_from(fields: PowerLawFields) -> Result<Self, Self::Error> {
        PowerLawBackground::new(
            fields.norm,
            fields.reference_tev,
            fields.index,
            fields.sigma_deg,
        )
    }
}

impl PowerLawBackground {
    /// Create a validated power-law model.
    ///
    /// # Arguments
    ///
    /// * `norm` - Differential rate at `reference_tev` on axis, MeV⁻¹ s⁻¹ sr⁻¹
    /// * `reference_tev` - Reference energy in TeV
    /// * `index` - Spectral index, positive for a falling spectrum
    /// * `sigma_deg` - Gaussian width of the radial acceptance in degrees
    ///
    /// # Errors
    ///
    /// Returns `BackgroundRateError::InvalidParameter` for a negative or
    /// non-finite norm, a non-positive reference energy or width, or a
    /// non-finite index.
    ///
    /// # Examples
    ///
    /// ```
    /// use background::rate::PowerLawBackground;
    ///
    /// let model = PowerLawBackground::new(1e-9, 1.0, 2.7, 1.5).unwrap();
    /// assert_eq!(model.index, 2.7);
    /// assert!(PowerLawBackground::new(1e-9, 1.0, 2.7, 0.0).is_err());
    /// ```
    pub fn new(
        norm: f64,
        reference_tev: f64,
        index: f64,
        sigma_deg: f64,
    ) -> Result<Self, BackgroundRateError> {
        let model = Self {
            norm,
            reference_tev,
            index,
            sigma_deg,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check parameters, e.g. after deserializing a model file
    pub fn validate(&self) -> Result<(), BackgroundRateError> {
        if !self.norm.is_finite() || self.norm < 0.0 {
            return Err(BackgroundRateError::InvalidParameter(format!(
                "norm must be finite and non-negative, got {}",
                self.norm
            )));
        }
        if !self.reference_tev.is_finite() || self.reference_tev <= 0.0 {
            return Err(BackgroundRateError::InvalidParameter(format!(
                "reference energy must be positive, got {} TeV",
                self.reference_tev
            )));
        }
        if !self.index.is_finite() {
            return Err(BackgroundRateError::InvalidParameter(format!(
                "index must be finite, got {}",
                self.index
            )));
        }
        if !self.sigma_deg.is_finite() || self.sigma_deg <= 0.0 {
            return Err(BackgroundRateError::InvalidParameter(format!(
                "sigma must be positive, got {} deg",
                self.sigma_deg
            )));
        }
        Ok(())
    }

    /// Radial acceptance factor at a FOV position
    fn radial(&self, lon: Angle, lat: Angle) -> f64 {
        let theta2 = lon.as_degrees().powi(2) + lat.as_degrees().powi(2);
        (-theta2 / (2.0 * self.sigma_deg * self.sigma_deg)).exp()
    }

    /// Differential rate on axis, MeV⁻¹ s⁻¹ sr⁻¹
    pub fn differential_on_axis(&self, energy: Energy) -> f64 {
        self.norm * (energy.as_tev() / self.reference_tev).powf(-self.index)
    }

    /// Integral of the on-axis spectrum between two energies, s⁻¹ sr⁻¹
    pub fn integral_on_axis(&self, lo: Energy, hi: Energy) -> Result<f64, BackgroundRateError> {
        for energy in [lo, hi] {
            if energy.as_tev().is_nan() || energy.as_tev() <= 0.0 {
                return Err(BackgroundRateError::OutOfDomain {
                    quantity: "energy [TeV]",
                    value: energy.as_tev(),
                    min: 0.0,
                    max: f64::INFINITY,
                });
            }
        }

        let e_ref_mev = Energy::from_tev(self.reference_tev).as_mev();
        let (x_lo, x_hi) = (
            lo.as_tev() / self.reference_tev,
            hi.as_tev() / self.reference_tev,
        );
        let slope = 1.0 - self.index;

        let integral = if slope.abs() < 1e-10 {
            self.norm * e_ref_mev * (x_hi / x_lo).ln()
        } else {
            self.norm * e_ref_mev * (x_hi.powf(slope) - x_lo.powf(slope)) / slope
        };
        Ok(integral)
    }
}

impl BackgroundRate for PowerLawBackground {
    fn evaluate_integrate(
        &self,
        fov_lon: ArrayView3<'_, Angle>,
        fov_lat: ArrayView3<'_, Angle>,
        energy_edges: ArrayView3<'_, Energy>,
    ) -> Result<IntegratedRate, BackgroundRateError> {
        let values = integrate_bins(fov_lon, fov_lat, energy_edges, |lon, lat, lo, hi| {
            Ok(self.integral_on_axis(lo, hi)? * self.radial(lon, lat))
        })?;
        Ok(IntegratedRate {
            values,
            unit: CompositeUnit::per_second_steradian(),
        })
    }
}
