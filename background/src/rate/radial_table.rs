//! Tabulated, radially symmetric background rate
//!
//! The differential rate is tabulated on energy nodes × FOV offset nodes.
//! Between nodes it is interpolated linearly in offset and as a power law in
//! energy. Bin integrals use the trapezoidal rule in ln(E) on the bin edges
//! plus every energy node inside the bin.

use ndarray::{Array2, ArrayView3};
use shared::units::{Angle, AngleExt, CompositeUnit, Energy, EnergyExt};

use super::{integrate_bins, BackgroundRate, BackgroundRateError, IntegratedRate};
use crate::algo::{interp, interp_loglog, trap_integrate};

/// Relative slack allowed at the table edges for unit-conversion round-off
const NODE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct RadialTableBackground {
    /// Energy nodes in TeV, strictly increasing and positive
    energy_nodes_tev: Vec<f64>,
    /// Offset nodes in degrees, strictly increasing from zero
    offset_nodes_deg: Vec<f64>,
    /// Differential rate [energy, offset] in MeV⁻¹ s⁻¹ sr⁻¹
    rates: Array2<f64>,
}

impl RadialTableBackground {
    /// Build a table from its nodes and differential rates.
    ///
    /// # Arguments
    ///
    /// * `energy_nodes_tev` - Energy nodes in TeV, positive and strictly increasing
    /// * `offset_nodes_deg` - FOV offset nodes in degrees, starting at 0
    /// * `rates` - Differential rate in MeV⁻¹ s⁻¹ sr⁻¹, shape (energies, offsets)
    ///
    /// # Errors
    ///
    /// `BackgroundRateError::InvalidTable` if there are fewer than two nodes
    /// along either axis, the shape disagrees with the nodes, the nodes are out
    /// of order, or any rate is negative or non-finite.
    pub fn new(
        energy_nodes_tev: Vec<f64>,
        offset_nodes_deg: Vec<f64>,
        rates: Array2<f64>,
    ) -> Result<Self, BackgroundRateError> {
        if energy_nodes_tev.len() < 2 || offset_nodes_deg.len() < 2 {
            return Err(BackgroundRateError::InvalidTable(
                "need at least 2 energy and 2 offset nodes".to_string(),
            ));
        }
        if rates.dim() != (energy_nodes_tev.len(), offset_nodes_deg.len()) {
            return Err(BackgroundRateError::InvalidTable(format!(
                "rate table shape {:?} does not match {} energy x {} offset nodes",
                rates.dim(),
                energy_nodes_tev.len(),
                offset_nodes_deg.len()
            )));
        }
        if energy_nodes_tev[0] <= 0.0 || energy_nodes_tev.windows(2).any(|w| w[1] <= w[0]) {
            return Err(BackgroundRateError::InvalidTable(
                "energy nodes must be positive and strictly increasing".to_string(),
            ));
        }
        if offset_nodes_deg[0] != 0.0 || offset_nodes_deg.windows(2).any(|w| w[1] <= w[0]) {
            return Err(BackgroundRateError::InvalidTable(
                "offset nodes must start at 0 and be strictly increasing".to_string(),
            ));
        }
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(BackgroundRateError::InvalidTable(
                "rates must be finite and non-negative".to_string(),
            ));
        }

        Ok(Self {
            energy_nodes_tev,
            offset_nodes_deg,
            rates: rates.as_standard_layout().into_owned(),
        })
    }

    /// Validate an offset against the table, absorbing unit round-off at the edge
    fn checked_offset(&self, offset_deg: f64) -> Result<f64, BackgroundRateError> {
        let max = self.offset_nodes_deg[self.offset_nodes_deg.len() - 1];
        if offset_deg.is_nan() || offset_deg > max * (1.0 + NODE_TOLERANCE) {
            return Err(BackgroundRateError::OutOfDomain {
                quantity: "offset [deg]",
                value: offset_deg,
                min: 0.0,
                max,
            });
        }
        Ok(offset_deg.clamp(0.0, max))
    }

    /// Validate an energy against the table, absorbing unit round-off at the edges
    fn checked_energy(&self, energy_tev: f64) -> Result<f64, BackgroundRateError> {
        let (min, max) = (
            self.energy_nodes_tev[0],
            self.energy_nodes_tev[self.energy_nodes_tev.len() - 1],
        );
        if energy_tev.is_nan()
            || energy_tev < min * (1.0 - NODE_TOLERANCE)
            || energy_tev > max * (1.0 + NODE_TOLERANCE)
        {
            return Err(BackgroundRateError::OutOfDomain {
                quantity: "energy [TeV]",
                value: energy_tev,
                min,
                max,
            });
        }
        Ok(energy_tev.clamp(min, max))
    }

    /// Differential rate at a FOV offset and energy, MeV⁻¹ s⁻¹ sr⁻¹
    pub fn differential(&self, offset: Angle, energy: Energy) -> Result<f64, BackgroundRateError> {
        let offset_deg = self.checked_offset(offset.as_degrees())?;
        let energy_tev = self.checked_energy(energy.as_tev())?;

        // Radial profile at every energy node, then a power law between nodes
        let profile = self
            .rates
            .outer_iter()
            .map(|row| {
                let values = row.as_slice().ok_or_else(|| {
                    BackgroundRateError::InvalidTable("rate rows are not contiguous".to_string())
                })?;
                Ok(interp(offset_deg, &self.offset_nodes_deg, values)?)
            })
            .collect::<Result<Vec<f64>, BackgroundRateError>>()?;
        Ok(interp_loglog(energy_tev, &self.energy_nodes_tev, &profile)?)
    }

    /// Integral of the rate over [lo, hi] at a FOV offset, s⁻¹ sr⁻¹
    pub fn integral(&self, offset: Angle, lo: Energy, hi: Energy) -> Result<f64, BackgroundRateError> {
        let lo_tev = self.checked_energy(lo.as_tev())?;
        let hi_tev = self.checked_energy(hi.as_tev())?;

        let mut samples_tev = vec![lo_tev];
        samples_tev.extend(
            self.energy_nodes_tev
                .iter()
                .copied()
                .filter(|&e| e > lo_tev && e < hi_tev),
        );
        samples_tev.push(hi_tev);

        // ∫ f dE = ∫ f·E d(ln E)
        let mut log_e = Vec::with_capacity(samples_tev.len());
        let mut integrand = Vec::with_capacity(samples_tev.len());
        for &e_tev in &samples_tev {
            let energy = Energy::from_tev(e_tev);
            log_e.push(e_tev.ln());
            integrand.push(self.differential(offset, energy)? * energy.as_mev());
        }
        Ok(trap_integrate(&log_e, &integrand))
    }
}

impl BackgroundRate for RadialTableBackground {
    fn evaluate_integrate(
        &self,
        fov_lon: ArrayView3<'_, Angle>,
        fov_lat: ArrayView3<'_, Angle>,
        energy_edges: ArrayView3<'_, Energy>,
    ) -> Result<IntegratedRate, BackgroundRateError> {
        let values = integrate_bins(fov_lon, fov_lat, energy_edges, |lon, lat, lo, hi| {
            let offset = Angle::from_radians(lon.as_radians().hypot(lat.as_radians()));
            self.integral(offset, lo, hi)
        })?;
        Ok(IntegratedRate {
            values,
            unit: CompositeUnit::per_second_steradian(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array3};

    /// Power law with index 2 and a linear fall-off to half rate at 2 deg
    fn table() -> RadialTableBackground {
        let energies: Vec<f64> = vec![0.1, 1.0, 10.0];
        let offsets = vec![0.0, 1.0, 2.0];
        let rates = Array2::from_shape_fn((3, 3), |(ie, io)| {
            let spectral = 1e-6 * energies[ie].powf(-2.0);
            spectral * (1.0 - 0.25 * offsets[io])
        });
        RadialTableBackground::new(energies, offsets, rates).unwrap()
    }

    #[test]
    fn test_table_validation() {
        let good = Array2::ones((2, 2));
        assert!(RadialTableBackground::new(vec![1.0, 2.0], vec![0.0, 1.0], good.clone()).is_ok());
        assert!(RadialTableBackground::new(vec![1.0], vec![0.0, 1.0], Array2::ones((1, 2))).is_err());
        assert!(RadialTableBackground::new(vec![2.0, 1.0], vec![0.0, 1.0], good.clone()).is_err());
        assert!(RadialTableBackground::new(vec![1.0, 2.0], vec![0.5, 1.0], good.clone()).is_err());
        assert!(RadialTableBackground::new(vec![1.0, 2.0], vec![0.0, 1.0], Array2::ones((2, 3))).is_err());
        assert!(RadialTableBackground::new(
            vec![1.0, 2.0],
            vec![0.0, 1.0],
            array![[1.0, -1.0], [1.0, 1.0]]
        )
        .is_err());
    }

    #[test]
    fn test_differential_on_nodes_and_between() {
        let t = table();
        assert_relative_eq!(
            t.differential(Angle::from_degrees(0.0), Energy::from_tev(1.0)).unwrap(),
            1e-6,
            max_relative = 1e-10
        );
        // Power law between energy nodes
        assert_relative_eq!(
            t.differential(Angle::from_degrees(0.0), Energy::from_tev(3.0)).unwrap(),
            1e-6 / 9.0,
            max_relative = 1e-10
        );
        // Linear in offset
        assert_relative_eq!(
            t.differential(Angle::from_degrees(1.5), Energy::from_tev(1.0)).unwrap(),
            1e-6 * 0.625,
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_integral_close_to_analytic_power_law() {
        let t = table();
        let (lo, hi) = (Energy::from_tev(0.2), Energy::from_tev(5.0));
        let numeric = t.integral(Angle::from_degrees(0.0), lo, hi).unwrap();
        // ∫ 1e-6 (E/TeV)^-2 dE with E in MeV: 1e-6 * 1e6 * (1/0.2 - 1/5)
        let analytic = 1e-6 * 1e6 * (1.0 / 0.2 - 1.0 / 5.0);
        // Trapezoid on only a few samples overestimates a convex integrand
        assert!(numeric >= analytic);
        assert_relative_eq!(numeric, analytic, max_relative = 0.5);
    }

    #[test]
    fn test_out_of_domain_errors() {
        let t = table();
        let offset_err = t
            .differential(Angle::from_degrees(2.5), Energy::from_tev(1.0))
            .unwrap_err();
        assert!(matches!(
            offset_err,
            BackgroundRateError::OutOfDomain { quantity: "offset [deg]", .. }
        ));
        let energy_err = t
            .integral(Angle::from_degrees(0.0), Energy::from_tev(0.05), Energy::from_tev(1.0))
            .unwrap_err();
        assert!(matches!(
            energy_err,
            BackgroundRateError::OutOfDomain { quantity: "energy [TeV]", .. }
        ));
    }

    #[test]
    fn test_evaluate_integrate_uses_combined_offset() {
        let t = table();
        let edges = Array3::from_shape_fn((2, 1, 1), |(i, _, _)| Energy::from_tev(1.0 + i as f64));
        let lon = Array3::from_elem((2, 1, 1), Angle::from_degrees(0.6));
        let lat = Array3::from_elem((2, 1, 1), Angle::from_degrees(0.8));
        let on_lon = Array3::from_elem((2, 1, 1), Angle::from_degrees(1.0));
        let zero = Array3::from_elem((2, 1, 1), Angle::from_degrees(0.0));

        let combined = t.evaluate_integrate(lon.view(), lat.view(), edges.view()).unwrap();
        let reference = t.evaluate_integrate(on_lon.view(), zero.view(), edges.view()).unwrap();
        assert_relative_eq!(
            combined.values[[0, 0, 0]],
            reference.values[[0, 0, 0]],
            max_relative = 1e-10
        );
    }
}
