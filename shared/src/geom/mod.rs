//! Map geometry: non-spatial axes and the spatial pixel grid abstraction
//!
//! A geometry is an ordered set of axes: one 2-D spatial image plus one or more
//! non-spatial axes described by their bin edges. Background cubes treat the
//! first non-spatial axis as reconstructed energy.

pub mod regular;

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sky::SkyCoord;
use crate::units::{Energy, EnergyExt, SolidAngle};

pub use regular::RegularSkyGeom;

/// Errors raised when building or interpreting a map axis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AxisError {
    #[error("Axis '{0}' needs at least 2 edges, got {1}")]
    TooFewEdges(String, usize),

    #[error("Axis '{name}' has a non-finite edge at index {index}")]
    NonFiniteEdge { name: String, index: usize },

    #[error("Axis '{name}' edges must be strictly increasing (violated at index {index})")]
    NotStrictlyIncreasing { name: String, index: usize },

    #[error("Axis '{name}' has unit '{unit}', which is not convertible to energy")]
    NotEnergy { name: String, unit: AxisUnit },

    #[error("Invalid log-spaced axis: min={min}, max={max}, nbin={nbin}")]
    InvalidLogSpacing { min: f64, max: f64, nbin: usize },
}

/// Errors raised when building a spatial geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    #[error("Spatial grid must have at least one pixel, got {rows}x{cols}")]
    EmptyImage { rows: usize, cols: usize },

    #[error("Pixel size must be finite and positive, got {0} deg")]
    InvalidPixelSize(f64),

    #[error("Latitude extent [{min:.3}, {max:.3}] deg crosses a pole")]
    CrossesPole { min: f64, max: f64 },

    #[error(transparent)]
    Axis(#[from] AxisError),
}

/// Physical unit of a non-spatial axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisUnit {
    Electronvolt,
    Kiloelectronvolt,
    Megaelectronvolt,
    Gigaelectronvolt,
    Teraelectronvolt,
    Degree,
    Dimensionless,
}

impl AxisUnit {
    /// Electronvolts per unit, or `None` if the unit is not an energy
    pub fn electronvolts_per_unit(&self) -> Option<f64> {
        match self {
            AxisUnit::Electronvolt => Some(1.0),
            AxisUnit::Kiloelectronvolt => Some(1e3),
            AxisUnit::Megaelectronvolt => Some(1e6),
            AxisUnit::Gigaelectronvolt => Some(1e9),
            AxisUnit::Teraelectronvolt => Some(1e12),
            AxisUnit::Degree | AxisUnit::Dimensionless => None,
        }
    }

    pub fn is_energy(&self) -> bool {
        self.electronvolts_per_unit().is_some()
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AxisUnit::Electronvolt => "eV",
            AxisUnit::Kiloelectronvolt => "keV",
            AxisUnit::Megaelectronvolt => "MeV",
            AxisUnit::Gigaelectronvolt => "GeV",
            AxisUnit::Teraelectronvolt => "TeV",
            AxisUnit::Degree => "deg",
            AxisUnit::Dimensionless => "",
        }
    }
}

impl fmt::Display for AxisUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A named, binned, non-spatial map axis
///
/// Deserialisation goes through [`MapAxis::new`], so a loaded axis satisfies the
/// same invariants as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MapAxisFields")]
pub struct MapAxis {
    name: String,
    edges: Vec<f64>,
    unit: AxisUnit,
}

/// Unvalidated serialized form of [`MapAxis`]
#[derive(Deserialize)]
struct MapAxisFields {
    name: String,
    edges: Vec<f64>,
    unit: AxisUnit,
}

impl TryFrom<MapAxisFields> for MapAxis {
    type Error = AxisError;

    fn try_from(fields: MapAxisFields) -> Result<Self, Self::Error> {
        MapAxis::new(fields.name, fields.edges, fields.unit)
    }
}

impl MapAxis {
    /// Create an axis from explicit bin edges.
    ///
    /// # Arguments
    ///
    /// * `name` - Axis name, e.g. "energy"
    /// * `edges` - Bin edges in `unit`; `edges.len() - 1` bins
    /// * `unit` - Physical unit of the edges
    ///
    /// # Errors
    ///
    /// * `AxisError::TooFewEdges` - fewer than two edges
    /// * `AxisError::NonFiniteEdge` - an edge is NaN or infinite
    /// * `AxisError::NotStrictlyIncreasing` - edges repeat or decrease
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::geom::{AxisUnit, MapAxis};
    ///
    /// let axis = MapAxis::new("energy", vec![1.0, 3.0, 10.0], AxisUnit::Teraelectronvolt).unwrap();
    /// assert_eq!(axis.nbin(), 2);
    /// assert!(MapAxis::new("energy", vec![4.0, 2.0], AxisUnit::Teraelectronvolt).is_err());
    /// ```
    pub fn new(name: impl Into<String>, edges: Vec<f64>, unit: AxisUnit) -> Result<Self, AxisError> {
        let name = name.into();
        if edges.len() < 2 {
            return Err(AxisError::TooFewEdges(name, edges.len()));
        }
        if let Some(index) = edges.iter().position(|e| !e.is_finite()) {
            return Err(AxisError::NonFiniteEdge { name, index });
        }
        if let Some(index) = (1..edges.len()).find(|&i| edges[i] <= edges[i - 1]) {
            return Err(AxisError::NotStrictlyIncreasing { name, index });
        }
        Ok(Self { name, edges, unit })
    }

    /// Reconstructed-energy axis with `nbin` log-spaced bins between `min` and `max`
    pub fn energy_log_spaced(
        min: f64,
        max: f64,
        nbin: usize,
        unit: AxisUnit,
    ) -> Result<Self, AxisError> {
        if nbin == 0 || !min.is_finite() || !max.is_finite() || min <= 0.0 || max <= min {
            return Err(AxisError::InvalidLogSpacing { min, max, nbin });
        }
        let (log_min, log_max) = (min.ln(), max.ln());
        let step = (log_max - log_min) / nbin as f64;
        let mut edges: Vec<f64> = (0..=nbin)
            .map(|i| (log_min + i as f64 * step).exp())
            .collect();
        // Pin the end points so round-off never moves the requested bounds
        edges[0] = min;
        edges[nbin] = max;
        Self::new("energy", edges, unit)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn unit(&self) -> AxisUnit {
        self.unit
    }

    /// Number of bins (edges - 1)
    pub fn nbin(&self) -> usize {
        self.edges.len() - 1
    }

    /// Bin widths in axis units
    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Bin centres; geometric for energy axes, arithmetic otherwise
    pub fn centers(&self) -> Vec<f64> {
        let geometric = self.unit.is_energy() && self.edges[0] > 0.0;
        self.edges
            .windows(2)
            .map(|w| {
                if geometric {
                    (w[0] * w[1]).sqrt()
                } else {
                    0.5 * (w[0] + w[1])
                }
            })
            .collect()
    }

    /// Bin edges as typed energies.
    ///
    /// Fails if the axis unit is not an energy.
    pub fn energy_edges(&self) -> Result<Vec<Energy>, AxisError> {
        let ev_per_unit = self
            .unit
            .electronvolts_per_unit()
            .ok_or_else(|| AxisError::NotEnergy {
                name: self.name.clone(),
                unit: self.unit,
            })?;
        Ok(self
            .edges
            .iter()
            .map(|&e| Energy::from_ev(e * ev_per_unit))
            .collect())
    }
}

/// Geometry of a binned sky cube.
///
/// Implementations own the spatial projection; consumers only see pixel
/// centres, pixel solid angles and the non-spatial axes.
pub trait MapGeom {
    /// Non-spatial axes in order
    fn axes(&self) -> &[MapAxis];

    /// Spatial image shape as (rows, cols)
    fn spatial_shape(&self) -> (usize, usize);

    /// Sky direction of every pixel centre, shaped like the spatial image
    fn pixel_directions(&self) -> Array2<SkyCoord>;

    /// Solid angle of every pixel, shaped like the spatial image
    fn solid_angle(&self) -> Array2<SolidAngle>;

    /// Cube shape (first axis bins, rows, cols), if the geometry has a non-spatial axis
    fn data_shape(&self) -> Option<(usize, usize, usize)> {
        let (rows, cols) = self.spatial_shape();
        self.axes().first().map(|axis| (axis.nbin(), rows, cols))
    }
}
