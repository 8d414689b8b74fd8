//! Energy range argument for command-line tools.
//!
//! Provides a clap-compatible type describing a log-spaced energy binning as
//! "min:max:nbins", e.g. "0.1:100:12" for twelve bins between 0.1 and 100 TeV.

use std::fmt;
use std::str::FromStr;

use crate::geom::{AxisError, AxisUnit, MapAxis};

/// Parse an energy binning string.
///
/// # Format
/// "min:max:nbins"
/// - **min**: lower edge of the first bin, strictly positive
/// - **max**: upper edge of the last bin, greater than min
/// - **nbins**: number of log-spaced bins, at least one
///
/// # Examples
/// - "0.1:10:6" - six bins per two decades
/// - "1:1:3" - rejected, empty range
/// - "0:10:3" - rejected, log spacing needs a positive minimum
pub fn parse_energy_range(s: &str) -> Result<(f64, f64, usize), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err("Energy range must be in format 'min:max:nbins'".to_string());
    }

    let min = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid min value".to_string())?;
    let max = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| "Invalid max value".to_string())?;
    let nbins = parts[2]
        .trim()
        .parse::<usize>()
        .map_err(|_| "Invalid bin count".to_string())?;

    if !min.is_finite() || min <= 0.0 {
        return Err("Minimum energy must be positive".to_string());
    }

    if !max.is_finite() || max <= min {
        return Err("Maximum energy must be greater than minimum".to_string());
    }

    if nbins == 0 {
        return Err("Bin count must be at least 1".to_string());
    }

    Ok((min, max, nbins))
}

/// Log-spaced energy binning parsed from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyRangeArg {
    pub min: f64,
    pub max: f64,
    pub nbins: usize,
}

impl FromStr for EnergyRangeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max, nbins) = parse_energy_range(s)?;
        Ok(EnergyRangeArg { min, max, nbins })
    }
}

impl fmt::Display for EnergyRangeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.min, self.max, self.nbins)
    }
}

impl EnergyRangeArg {
    /// Build the reconstructed-energy axis in the given unit
    pub fn to_axis(&self, unit: AxisUnit) -> Result<MapAxis, AxisError> {
        MapAxis::energy_log_spaced(self.min, self.max, self.nbins, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_range_parsing() {
        assert_eq!(parse_energy_range("0.1:10:6").unwrap(), (0.1, 10.0, 6));
        assert_eq!(parse_energy_range(" 1 : 100 : 2 ").unwrap(), (1.0, 100.0, 2));

        assert!(parse_energy_range("1:10").is_err()); // Missing bin count
        assert!(parse_energy_range("1:10:2:3").is_err()); // Too many parts
        assert!(parse_energy_range("a:10:2").is_err());
        assert!(parse_energy_range("1:b:2").is_err());
        assert!(parse_energy_range("1:10:2.5").is_err()); // Fractional bin count
        assert!(parse_energy_range("0:10:2").is_err());
        assert!(parse_energy_range("-1:10:2").is_err());
        assert!(parse_energy_range("10:1:2").is_err());
        assert!(parse_energy_range("1:10:0").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let arg: EnergyRangeArg = "0.5:50:4".parse().unwrap();
        assert_eq!(arg.to_string(), "0.5:50:4");
        assert_eq!(arg, arg.to_string().parse().unwrap());
    }

    #[test]
    fn test_to_axis() {
        let arg: EnergyRangeArg = "1:100:2".parse().unwrap();
        let axis = arg.to_axis(AxisUnit::Teraelectronvolt).unwrap();
        assert_eq!(axis.nbin(), 2);
        assert_eq!(axis.unit(), AxisUnit::Teraelectronvolt);
        assert_relative_eq!(axis.edges()[1], 10.0, epsilon = 1e-10);
    }
}
