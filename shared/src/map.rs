//! Labeled sky cube: a geometry plus its (energy, row, col) payload

use ndarray::{Array3, ArrayView3};
use thiserror::Error;

use crate::geom::MapGeom;

/// Errors raised when pairing a payload with a geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Geometry has no non-spatial axis to index the first cube dimension")]
    NoAxes,

    #[error("Data shape {data:?} does not match geometry shape {geom:?}")]
    ShapeMismatch {
        data: (usize, usize, usize),
        geom: (usize, usize, usize),
    },
}

/// Cube of values laid out on a geometry.
///
/// The payload is indexed `[energy bin, row, col]`; the first non-spatial axis
/// of the geometry labels the leading dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct NdMap<G> {
    geom: G,
    data: Array3<f64>,
}

impl<G: MapGeom> NdMap<G> {
    /// Pair a payload with a geometry, checking that the shapes agree.
    ///
    /// # Errors
    ///
    /// * `MapError::NoAxes` - the geometry has no non-spatial axis
    /// * `MapError::ShapeMismatch` - `data` is not (bins, rows, cols) of `geom`
    pub fn new(geom: G, data: Array3<f64>) -> Result<Self, MapError> {
        let expected = geom.data_shape().ok_or(MapError::NoAxes)?;
        if data.dim() != expected {
            return Err(MapError::ShapeMismatch {
                data: data.dim(),
                geom: expected,
            });
        }
        Ok(Self { geom, data })
    }

    pub fn geom(&self) -> &G {
        &self.geom
    }

    pub fn data(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// Sum of all values
    pub fn total(&self) -> f64 {
        self.data.sum()
    }
}
