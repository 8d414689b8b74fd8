//! Background cube synthesis and FOV normalisation demo
//!
//! Synthesises the predicted background for a set of wobble observations around
//! a target, draws Poisson counts from a background scaled by a known factor,
//! excludes a circular region around the target and recovers the scale per
//! energy bin with the FOV normalisation.
//!
//! Usage:
//! ```
//! cargo run --release --bin bkg_cube_demo -- --n-observations 8 --true-norm 1.3
//! RUST_LOG=debug cargo run --bin bkg_cube_demo -- --model bkg.json --energy 0.5:50:6
//! ```

use background::normalization::{fov_background_norm, NormalizationVector};
use background::rate::BackgroundRate;
use background::shared_args::BackgroundArgs;
use background::synthesis::make_map_background_irf;
use background::BackgroundError;
use clap::Parser;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};
use rayon::prelude::*;
use shared::geom::{AxisUnit, MapGeom, RegularSkyGeom};
use shared::map::NdMap;
use shared::sky::SkyCoord;
use shared::units::{AngleExt, Time, TimeExt};

#[derive(Parser, Debug)]
#[command(
    name = "Background Cube Demo",
    about = "Synthesises IRF background cubes and recovers their normalisation",
    long_about = None
)]
struct Args {
    #[command(flatten)]
    shared: BackgroundArgs,

    /// Number of wobble observations
    #[arg(long, default_value_t = 4)]
    n_observations: usize,

    /// Wobble offset of each pointing from the target in degrees
    #[arg(long, default_value_t = 0.5)]
    wobble: f64,

    /// Scale applied to the predicted background when drawing counts
    #[arg(long, default_value_t = 1.2)]
    true_norm: f64,

    /// Radius of the excluded region around the target in degrees
    #[arg(long, default_value_t = 0.3)]
    exclusion_radius: f64,

    /// Random seed for reproducible counts
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Process observations serially instead of in parallel
    #[arg(long, default_value_t = false)]
    serial: bool,
}

struct Observation {
    index: usize,
    pointing: SkyCoord,
    ontime: Time,
}

struct ObservationResult {
    index: usize,
    predicted: f64,
    observed: f64,
    norm: NormalizationVector,
}

/// Pointings on a circle of `wobble` degrees around the target
fn wobble_pointings(target: &SkyCoord, wobble: f64, n: usize) -> Vec<SkyCoord> {
    (0..n)
        .map(|i| {
            let phi = std::f64::consts::TAU * i as f64 / n as f64;
            let lat = (target.lat_degrees() + wobble * phi.sin()).clamp(-90.0, 90.0);
            let cos_lat = target.lat.cos().max(1e-6);
            let lon = target.lon_degrees() + wobble * phi.cos() / cos_lat;
            SkyCoord::from_degrees(lon, lat)
        })
        .collect()
}

fn process_observation(
    obs: &Observation,
    model: &dyn BackgroundRate,
    geom: &RegularSkyGeom,
    mask: &Array2<bool>,
    args: &Args,
) -> Result<ObservationResult, BackgroundError> {
    let predicted = make_map_background_irf(
        &obs.pointing,
        obs.ontime,
        model,
        geom,
        args.shared.n_integration_bins,
    )?;

    let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(obs.index as u64));
    let counts = predicted.data().mapv(|mu| {
        // No Poisson distribution exists for a zero expectation
        Poisson::new(mu * args.true_norm)
            .map(|poisson| poisson.sample(&mut rng))
            .unwrap_or(0.0)
    });
    let counts = NdMap::new(geom.clone(), counts)?;

    let norm = fov_background_norm(&predicted, &counts, Some(mask.view().into_dyn()))?;
    Ok(ObservationResult {
        index: obs.index,
        predicted: predicted.total(),
        observed: counts.total(),
        norm,
    })
}

/// Unweighted mean over all observations and bins with a defined norm
fn mean_finite_norm(results: &[ObservationResult]) -> Option<f64> {
    let (sum, count) = results
        .iter()
        .flat_map(|result| result.norm.iter())
        .filter(|norm| norm.is_finite())
        .fold((0.0, 0usize), |(sum, n), norm| (sum + norm, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging from environment variables
    env_logger::init();

    let args = Args::parse();
    let target = args.shared.pointing();
    let model = args.shared.load_model()?;

    let energy_axis = args.shared.energy.to_axis(AxisUnit::Teraelectronvolt)?;
    let geom = RegularSkyGeom::centered(
        target,
        args.shared.binsz,
        args.shared.npix,
        args.shared.npix,
        vec![energy_axis.clone()],
    )?;

    // Include everything outside the target region
    let mask = geom
        .pixel_directions()
        .mapv(|direction| direction.separation(&target).as_degrees() > args.exclusion_radius);
    let included = mask.iter().filter(|&&keep| keep).count();

    println!("Background Cube Demo");
    println!("====================");
    println!(
        "Target: ({:.3}, {:.3}) deg, {} observations at {:.2} deg wobble",
        target.lon_degrees(),
        target.lat_degrees(),
        args.n_observations,
        args.wobble
    );
    println!(
        "Grid: {}x{} pixels of {} deg, {} energy bins in {} TeV",
        args.shared.npix,
        args.shared.npix,
        args.shared.binsz,
        energy_axis.nbin(),
        args.shared.energy
    );
    println!(
        "Exclusion: {:.2} deg around target, {} of {} pixels used",
        args.exclusion_radius,
        included,
        mask.len()
    );
    println!("Injected background scale: {}", args.true_norm);
    println!();

    let observations: Vec<Observation> =
        wobble_pointings(&target, args.wobble, args.n_observations)
            .into_iter()
            .enumerate()
            .map(|(index, pointing)| Observation {
                index,
                pointing,
                ontime: Time::from_hours(args.shared.ontime),
            })
            .collect();

    let results: Result<Vec<ObservationResult>, BackgroundError> = if args.serial {
        observations
            .iter()
            .map(|obs| process_observation(obs, &model, &geom, &mask, &args))
            .collect()
    } else {
        observations
            .par_iter()
            .map(|obs| process_observation(obs, &model, &geom, &mask, &args))
            .collect()
    };
    let results = results?;

    let centers = energy_axis.centers();
    for result in &results {
        log::info!(
            "Observation {}: {:.1} predicted, {:.0} observed counts",
            result.index,
            result.predicted,
            result.observed
        );
        println!("Observation {}", result.index);
        println!("  E [TeV]      norm");
        for (center, norm) in centers.iter().zip(result.norm.iter()) {
            if norm.is_finite() {
                println!("  {center:>8.3}  {norm:>8.3}");
            } else {
                println!("  {center:>8.3}       n/a");
            }
        }
    }

    if let Some(mean) = mean_finite_norm(&results) {
        println!();
        println!(
            "Mean recovered scale: {:.3} (injected {})",
            mean, args.true_norm
        );
    }

    Ok(())
}
