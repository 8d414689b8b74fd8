//! End-to-end synthesis of background cubes on regular sky grids

mod common;

use approx::assert_relative_eq;
use background::rate::BackgroundRateError;
use background::{make_map_background_irf, BackgroundError};
use common::{init_logging, power_law, radial_table, square_geom};
use shared::geom::MapGeom;
use shared::sky::SkyCoord;
use shared::units::{Time, TimeExt};

#[test]
fn test_cube_shape_matches_geometry() {
    init_logging();
    let pointing = SkyCoord::from_degrees(120.0, -30.0);
    let model = power_law(1e-9);

    for (npix, nbins) in [(1, 1), (3, 2), (10, 5), (25, 12)] {
        let geom = square_geom(pointing, npix, 0.1, nbins);
        let map = make_map_background_irf(&pointing, Time::from_hours(0.5), &model, &geom, 1)
            .expect("synthesis succeeds");
        assert_eq!(map.data().dim(), (nbins, npix, npix));
        assert_eq!(Some(map.data().dim()), geom.data_shape());
    }
}

#[test]
fn test_counts_are_finite_and_non_negative() {
    init_logging();
    let center = SkyCoord::from_degrees(266.4, -28.9);
    let pointing = SkyCoord::from_degrees(266.9, -28.9);
    let geom = square_geom(center, 30, 0.05, 6);

    let from_power_law =
        make_map_background_irf(&pointing, Time::from_hours(1.0), &power_law(1e-9), &geom, 1)
            .unwrap();
    let from_table =
        make_map_background_irf(&pointing, Time::from_hours(1.0), &radial_table(3.0), &geom, 1)
            .unwrap();

    for map in [&from_power_law, &from_table] {
        assert!(map.data().iter().all(|&v| v.is_finite() && v >= 0.0));
        assert!(map.total() > 0.0);
    }
}

#[test]
fn test_zero_ontime_gives_empty_cube() {
    init_logging();
    let pointing = SkyCoord::from_degrees(10.0, 45.0);
    let geom = square_geom(pointing, 12, 0.1, 4);

    let map =
        make_map_background_irf(&pointing, Time::from_seconds(0.0), &radial_table(2.0), &geom, 1)
            .unwrap();
    assert!(map.data().iter().all(|&v| v == 0.0));
}

#[test]
fn test_counts_scale_with_ontime() {
    let pointing = SkyCoord::from_degrees(10.0, 0.0);
    let geom = square_geom(pointing, 8, 0.1, 3);
    let model = power_law(1e-9);

    let short = make_map_background_irf(&pointing, Time::from_hours(0.5), &model, &geom, 1).unwrap();
    let long = make_map_background_irf(&pointing, Time::from_hours(2.0), &model, &geom, 1).unwrap();
    for (s, l) in short.data().iter().zip(long.data().iter()) {
        assert_relative_eq!(*l, 4.0 * s, max_relative = 1e-12);
    }
}

#[test]
fn test_n_integration_bins_has_no_effect() {
    // Sub-bin integration is not implemented; the argument must leave results untouched
    init_logging();
    let pointing = SkyCoord::from_degrees(83.63, 22.01);
    let geom = square_geom(pointing, 10, 0.1, 5);
    let model = radial_table(2.0);

    let reference =
        make_map_background_irf(&pointing, Time::from_hours(1.0), &model, &geom, 1).unwrap();
    for n_integration_bins in [0, 2, 5, 100] {
        let map = make_map_background_irf(
            &pointing,
            Time::from_hours(1.0),
            &model,
            &geom,
            n_integration_bins,
        )
        .unwrap();
        assert_eq!(map.data(), reference.data());
    }
}

#[test]
fn test_radially_symmetric_about_pointing() {
    // On the equator the grid is mirror symmetric in latitude
    let pointing = SkyCoord::from_degrees(0.0, 0.0);
    let geom = square_geom(pointing, 9, 0.2, 2);
    let map =
        make_map_background_irf(&pointing, Time::from_hours(1.0), &power_law(1e-9), &geom, 1)
            .unwrap();
    let data = map.data();

    for bin in 0..2 {
        for row in 0..9 {
            for col in 0..9 {
                assert_relative_eq!(
                    data[[bin, row, col]],
                    data[[bin, 8 - row, col]],
                    max_relative = 1e-9
                );
                assert_relative_eq!(
                    data[[bin, row, col]],
                    data[[bin, row, 8 - col]],
                    max_relative = 1e-9
                );
            }
        }
    }
    // Falling spectrum: fewer counts at high energy
    assert!(data[[1, 4, 4]] < data[[0, 4, 4]]);
}

#[test]
fn test_offsets_beyond_table_support_propagate() {
    init_logging();
    let pointing = SkyCoord::from_degrees(40.0, 10.0);
    // Corners of a 4 deg wide grid lie well beyond 1 deg
    let geom = square_geom(pointing, 20, 0.2, 2);

    let err = make_map_background_irf(&pointing, Time::from_hours(1.0), &radial_table(1.0), &geom, 1)
        .unwrap_err();
    match err {
        BackgroundError::Rate(BackgroundRateError::OutOfDomain { quantity, value, max, .. }) => {
            assert_eq!(quantity, "offset [deg]");
            assert!(value > max);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_energies_beyond_table_support_propagate() {
    let pointing = SkyCoord::from_degrees(40.0, 10.0);
    let axis = shared::geom::MapAxis::energy_log_spaced(
        0.1,
        1.0,
        2,
        shared::geom::AxisUnit::Teraelectronvolt,
    )
    .unwrap();
    let geom = shared::geom::RegularSkyGeom::centered(pointing, 0.1, 3, 3, vec![axis]).unwrap();

    let err = make_map_background_irf(&pointing, Time::from_hours(1.0), &radial_table(2.0), &geom, 1)
        .unwrap_err();
    assert!(matches!(
        err,
        BackgroundError::Rate(BackgroundRateError::OutOfDomain {
            quantity: "energy [TeV]",
            ..
        })
    ));
}

#[test]
fn test_energy_axis_unit_is_respected() {
    // The same binning expressed in GeV and TeV gives the same cube
    use shared::geom::{AxisUnit, MapAxis, RegularSkyGeom};

    let pointing = SkyCoord::from_degrees(200.0, 60.0);
    let tev = MapAxis::new("energy", vec![1.0, 2.0, 5.0], AxisUnit::Teraelectronvolt).unwrap();
    let gev = MapAxis::new("energy", vec![1000.0, 2000.0, 5000.0], AxisUnit::Gigaelectronvolt)
        .unwrap();
    let geom_tev = RegularSkyGeom::centered(pointing, 0.1, 5, 5, vec![tev]).unwrap();
    let geom_gev = RegularSkyGeom::centered(pointing, 0.1, 5, 5, vec![gev]).unwrap();
    let model = power_law(1e-9);

    let a = make_map_background_irf(&pointing, Time::from_hours(1.0), &model, &geom_tev, 1).unwrap();
    let b = make_map_background_irf(&pointing, Time::from_hours(1.0), &model, &geom_gev, 1).unwrap();
    for (x, y) in a.data().iter().zip(b.data().iter()) {
        assert_relative_eq!(*x, *y, max_relative = 1e-9);
    }
}

#[test]
fn test_geometry_loaded_from_json_is_checked_before_synthesis() {
    use shared::geom::{AxisUnit, MapAxis, RegularSkyGeom};

    let pointing = SkyCoord::from_degrees(83.63, 22.01);
    let axis = MapAxis::new("energy", vec![1.0, 2.0, 4.0], AxisUnit::Teraelectronvolt).unwrap();
    let geom = RegularSkyGeom::centered(pointing, 0.1, 4, 4, vec![axis]).unwrap();
    let json = serde_json::to_string(&geom).unwrap();

    let reloaded: RegularSkyGeom = serde_json::from_str(&json).unwrap();
    let map = make_map_background_irf(&pointing, Time::from_hours(1.0), &power_law(1e-9), &reloaded, 1)
        .unwrap();
    assert!(map.data().iter().all(|&v| v.is_finite() && v >= 0.0));

    // Descending or missing edges never reach synthesis
    let descending = json.replace("[1.0,2.0,4.0]", "[4.0,2.0,1.0]");
    assert_ne!(descending, json);
    assert!(serde_json::from_str::<RegularSkyGeom>(&descending).is_err());
    let empty = json.replace("[1.0,2.0,4.0]", "[]");
    assert!(serde_json::from_str::<RegularSkyGeom>(&empty).is_err());
}
