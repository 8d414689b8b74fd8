use std::path::PathBuf;

use clap::Parser;
use shared::range_arg::EnergyRangeArg;
use shared::sky::SkyCoord;

use crate::rate::PowerLawBackground;

/// Parse a sky position string in format "lon,lat" (degrees)
fn parse_coordinates(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err("Coordinates must be in format 'lon,lat'".to_string());
    }

    let lon = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid longitude value".to_string())?;
    let lat = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid latitude value".to_string())?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Latitude must be within [-90, 90] degrees, got {lat}"));
    }

    Ok((lon, lat))
}

/// Common arguments for background cube binaries
#[derive(Parser, Debug, Clone)]
pub struct BackgroundArgs {
    /// Pointing direction in degrees (format: "lon,lat")
    #[arg(long, default_value = "83.63,22.01", value_parser = parse_coordinates)]
    pub pointing: (f64, f64),

    /// Ontime per observation in hours
    #[arg(long, default_value_t = 0.5)]
    pub ontime: f64,

    /// Reconstructed energy binning in TeV, log-spaced (format: min:max:nbins)
    #[arg(long, default_value = "0.3:30:8")]
    pub energy: EnergyRangeArg,

    /// Pixel size in degrees
    #[arg(long, default_value_t = 0.05)]
    pub binsz: f64,

    /// Number of pixels along each image side
    #[arg(long, default_value_t = 80)]
    pub npix: usize,

    /// JSON file with power-law background model parameters
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Energy sub-bins per bin passed to synthesis (currently has no effect)
    #[arg(long, default_value_t = 1)]
    pub n_integration_bins: usize,
}

impl BackgroundArgs {
    pub fn pointing(&self) -> SkyCoord {
        SkyCoord::from_degrees(self.pointing.0, self.pointing.1)
    }

    /// Load the model file, or fall back to the default background
    pub fn load_model(&self) -> Result<PowerLawBackground, Box<dyn std::error::Error>> {
        let model = match &self.model {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str::<PowerLawBackground>(&text)?
            }
            None => default_model(),
        };
        model.validate()?;
        Ok(model)
    }
}

/// Background used when no model file is given, falling as E^-2.7
pub fn default_model() -> PowerLawBackground {
    PowerLawBackground {
        norm: 5e-10,
        reference_tev: 1.0,
        index: 2.7,
        sigma_deg: 1.5,
    }
}
