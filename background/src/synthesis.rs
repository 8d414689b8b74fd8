//! Predicted background counts from a background rate model
//!
//! The rate model is integrated over every reconstructed-energy bin of the
//! target geometry at the FOV offset of every pixel, then multiplied by the
//! pixel solid angle and the observation ontime.
//!
//! The background model is currently treated as radially symmetric: the FOV
//! offset of a pixel is its separation from the pointing direction and the FOV
//! latitude is zero everywhere. Asymmetric models therefore see only their
//! profile along the FOV longitude axis.

use log::debug;
use ndarray::{Array1, Array2, Axis};
use shared::geom::{AxisError, MapGeom};
use shared::map::NdMap;
use shared::sky::SkyCoord;
use shared::units::{Angle, AngleExt, CompositeUnit, SolidAngleExt, Time, TimeExt};

use crate::error::BackgroundError;
use crate::rate::BackgroundRate;

/// Compute a predicted background counts cube from a background rate model.
///
/// # Arguments
///
/// * `pointing` - Pointing direction of the observation
/// * `ontime` - Observation ontime, not corrected for dead time
/// * `bkg` - Background rate model
/// * `geom` - Target geometry; its first non-spatial axis is reconstructed energy
/// * `n_integration_bins` - Sub-bins per energy bin. Accepted for compatibility
///   but currently has no effect: each bin is integrated once over its edges.
///
/// # Returns
///
/// A map on `geom` of shape (energy bins, rows, cols) holding dimensionless
/// predicted counts.
///
/// # Errors
///
/// * `BackgroundError::MissingEnergyAxis` / `EnergyAxis` - no usable energy axis
/// * `BackgroundError::InvalidOntime` - negative or non-finite ontime
/// * `BackgroundError::IncompatibleUnits` - rate × solid angle × time is not a count
/// * `BackgroundError::Rate` - the rate model failed, unchanged
pub fn make_map_background_irf<G, B>(
    pointing: &SkyCoord,
    ontime: Time,
    bkg: &B,
    geom: &G,
    n_integration_bins: usize,
) -> Result<NdMap<G>, BackgroundError>
where
    G: MapGeom + Clone,
    B: BackgroundRate + ?Sized,
{
    let ontime_s = ontime.as_seconds();
    if !ontime_s.is_finite() || ontime_s < 0.0 {
        return Err(BackgroundError::InvalidOntime(ontime_s));
    }

    // TODO: sub-bin integration; until then the parameter must not change results
    if n_integration_bins != 1 {
        debug!("n_integration_bins={n_integration_bins} is ignored, integrating each energy bin once");
    }

    let energy_axis = geom
        .axes()
        .first()
        .ok_or(BackgroundError::MissingEnergyAxis)?;
    let ebounds = Array1::from(energy_axis.energy_edges()?);
    let n_edges = ebounds.len();
    if n_edges < 2 {
        return Err(AxisError::TooFewEdges(energy_axis.name().to_string(), n_edges).into());
    }

    let (rows, cols) = geom.spatial_shape();
    let directions = geom.pixel_directions();
    check_spatial("pixel directions", directions.dim(), (rows, cols))?;

    let fov_lon = directions.mapv(|direction| direction.separation(pointing));
    let fov_lat = Array2::from_elem((rows, cols), Angle::from_radians(0.0));

    let cube = (n_edges, rows, cols);
    let fov_lon = fov_lon
        .broadcast(cube)
        .ok_or_else(|| shape_error("fov_lon", cube, fov_lon.shape()))?;
    let fov_lat = fov_lat
        .broadcast(cube)
        .ok_or_else(|| shape_error("fov_lat", cube, fov_lat.shape()))?;
    let energy_edges = ebounds.view().insert_axis(Axis(1)).insert_axis(Axis(2));
    let energy_edges = energy_edges
        .broadcast(cube)
        .ok_or_else(|| shape_error("energy edges", cube, energy_edges.shape()))?;

    let bkg_de = bkg.evaluate_integrate(fov_lon, fov_lat, energy_edges)?;
    let expected = (n_edges - 1, rows, cols);
    if bkg_de.values.dim() != expected {
        return Err(shape_error(
            "integrated rate",
            expected,
            bkg_de.values.shape(),
        ));
    }

    let d_omega = geom.solid_angle();
    check_spatial("solid angle", d_omega.dim(), (rows, cols))?;
    let d_omega_sr = d_omega.mapv(|omega| omega.as_steradians());

    let to_counts = (bkg_de.unit * CompositeUnit::steradians() * CompositeUnit::seconds())
        .to_dimensionless()?;

    let mut data = bkg_de.values;
    if ontime_s == 0.0 {
        // No exposure means no counts, whatever the rate
        data.fill(0.0);
    } else {
        for mut plane in data.axis_iter_mut(Axis(0)) {
            plane *= &d_omega_sr;
        }
        data *= ontime_s * to_counts;
    }

    debug!(
        "Background cube: {} energy bins x {}x{} pixels, ontime {:.1} s, {:.3e} counts",
        expected.0,
        rows,
        cols,
        ontime_s,
        data.sum()
    );

    Ok(NdMap::new(geom.clone(), data)?)
}

fn check_spatial(
    what: &'static str,
    found: (usize, usize),
    expected: (usize, usize),
) -> Result<(), BackgroundError> {
    if found != expected {
        return Err(BackgroundError::ShapeMismatch {
            what,
            expected: vec![expected.0, expected.1],
            found: vec![found.0, found.1],
        });
    }
    Ok(())
}

fn shape_error(
    what: &'static str,
    expected: (usize, usize, usize),
    found: &[usize],
) -> BackgroundError {
    BackgroundError::ShapeMismatch {
        what,
        expected: vec![expected.0, expected.1, expected.2],
        found: found.to_vec(),
    }
}
