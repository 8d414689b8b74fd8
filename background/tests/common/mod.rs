//! Helpers shared by the background integration tests

#![allow(dead_code)]

use background::rate::{PowerLawBackground, RadialTableBackground};
use ndarray::Array2;
use shared::geom::{AxisUnit, MapAxis, RegularSkyGeom};
use shared::sky::SkyCoord;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Square grid centred on `center` with log-spaced energy bins between 1 and 10 TeV
pub fn square_geom(center: SkyCoord, npix: usize, binsz_deg: f64, nbins: usize) -> RegularSkyGeom {
    let axis = MapAxis::energy_log_spaced(1.0, 10.0, nbins, AxisUnit::Teraelectronvolt)
        .expect("valid energy axis");
    RegularSkyGeom::centered(center, binsz_deg, npix, npix, vec![axis]).expect("valid geometry")
}

/// Power-law background with a broad radial acceptance
pub fn power_law(norm: f64) -> PowerLawBackground {
    PowerLawBackground::new(norm, 1.0, 2.0, 2.0).expect("valid model")
}

/// Tabulated background with an E^-2.5 spectrum, supported out to `max_offset_deg`
pub fn radial_table(max_offset_deg: f64) -> RadialTableBackground {
    let energies: Vec<f64> = vec![0.5, 1.0, 2.0, 5.0, 20.0];
    let offsets: Vec<f64> = (0..=4).map(|i| max_offset_deg * i as f64 / 4.0).collect();
    let rates = Array2::from_shape_fn((energies.len(), offsets.len()), |(ie, io)| {
        1e-8 * energies[ie].powf(-2.5) * (1.0 - 0.5 * offsets[io] / max_offset_deg)
    });
    RadialTableBackground::new(energies, offsets, rates).expect("valid table")
}

/// Include-mask with a disc of `radius_deg` around `center` excluded
pub fn exclusion_disc(geom: &RegularSkyGeom, center: &SkyCoord, radius_deg: f64) -> Array2<bool> {
    use shared::geom::MapGeom;
    use shared::units::AngleExt;

    geom.pixel_directions()
        .mapv(|direction| direction.separation(center).as_degrees() > radius_deg)
}
