//! Regular longitude/latitude pixel grid
//!
//! Pixels are laid out on a uniform grid in longitude and latitude around a
//! centre direction. Solid angles are the exact areas of the lon/lat cells,
//! `Δlon · (sin b_top - sin b_bottom)`.

use std::f64::consts::{FRAC_PI_2, TAU};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{GeomError, MapAxis, MapGeom};
use crate::sky::SkyCoord;
use crate::units::{SolidAngle, SolidAngleExt};

/// Uniform lon/lat grid with its non-spatial axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegularSkyGeomFields")]
pub struct RegularSkyGeom {
    center: SkyCoord,
    /// Pixel size in degrees along both axes
    binsz_deg: f64,
    rows: usize,
    cols: usize,
    axes: Vec<MapAxis>,
}

#[derive(Deserialize)]
struct RegularSkyGeomFields {
    center: SkyCoord,
    binsz_deg: f64,
    rows: usize,
    cols: usize,
    axes: Vec<MapAxis>,
}

impl TryFrom<RegularSkyGeomFields> for RegularSkyGeom {
    type Error = GeomError;

    fn try_from(fields: RegularSkyGeomFields) -> Result<Self, Self::Error> {
        RegularSkyGeom::centered(
            fields.center,
            fields.binsz_deg,
            fields.rows,
            fields.cols,
            fields.axes,
        )
    }
}

impl RegularSkyGeom {
    /// Create a grid of `rows` x `cols` pixels of `binsz_deg` centred on `center`.
    ///
    /// Row index increases with latitude and column index with longitude.
    ///
    /// # Arguments
    ///
    /// * `center` - Direction of the grid centre
    /// * `binsz_deg` - Pixel size in degrees, the same in longitude and latitude
    /// * `rows` - Number of pixel rows (latitude)
    /// * `cols` - Number of pixel columns (longitude)
    /// * `axes` - Non-spatial axes, reconstructed energy first for background cubes
    ///
    /// # Errors
    ///
    /// * `GeomError::EmptyImage` - zero rows or columns
    /// * `GeomError::InvalidPixelSize` - non-finite or non-positive pixel size
    /// * `GeomError::CrossesPole` - the latitude extent passes ±90°
    pub fn centered(
        center: SkyCoord,
        binsz_deg: f64,
        rows: usize,
        cols: usize,
        axes: Vec<MapAxis>,
    ) -> Result<Self, GeomError> {
        if rows == 0 || cols == 0 {
            return Err(GeomError::EmptyImage { rows, cols });
        }
        if !binsz_deg.is_finite() || binsz_deg <= 0.0 {
            return Err(GeomError::InvalidPixelSize(binsz_deg));
        }

        let half_extent = 0.5 * rows as f64 * binsz_deg;
        let (min, max) = (
            center.lat_degrees() - half_extent,
            center.lat_degrees() + half_extent,
        );
        if min < -90.0 || max > 90.0 {
            return Err(GeomError::CrossesPole { min, max });
        }

        Ok(Self {
            center,
            binsz_deg,
            rows,
            cols,
            axes,
        })
    }

    pub fn center(&self) -> SkyCoord {
        self.center
    }

    pub fn binsz_deg(&self) -> f64 {
        self.binsz_deg
    }

    /// Offset of a pixel index from the grid centre in pixel units
    fn pixel_offset(index: usize, n: usize) -> f64 {
        index as f64 - 0.5 * (n as f64 - 1.0)
    }

    fn pixel_center(&self, row: usize, col: usize) -> SkyCoord {
        let binsz = self.binsz_deg.to_radians();
        let lon = self.center.lon + Self::pixel_offset(col, self.cols) * binsz;
        let lat = self.center.lat + Self::pixel_offset(row, self.rows) * binsz;
        SkyCoord::new(lon.rem_euclid(TAU), lat)
    }
}

impl MapGeom for RegularSkyGeom {
    fn axes(&self) -> &[MapAxis] {
        &self.axes
    }

    fn spatial_shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn pixel_directions(&self) -> Array2<SkyCoord> {
        Array2::from_shape_fn((self.rows, self.cols), |(row, col)| {
            self.pixel_center(row, col)
        })
    }

    fn solid_angle(&self) -> Array2<SolidAngle> {
        let binsz = self.binsz_deg.to_radians();
        Array2::from_shape_fn((self.rows, self.cols), |(row, col)| {
            let lat = self.pixel_center(row, col).lat;
            let top = (lat + 0.5 * binsz).min(FRAC_PI_2);
            let bottom = (lat - 0.5 * binsz).max(-FRAC_PI_2);
            SolidAngle::from_steradians(binsz * (top.sin() - bottom.sin()))
        })
    }
}
