//! Errors raised by background synthesis and normalisation

use shared::geom::AxisError;
use shared::map::MapError;
use shared::units::UnitError;
use thiserror::Error;

use crate::rate::BackgroundRateError;

/// Configuration errors of the synthesis and normalisation steps.
///
/// Rate-model failures are carried through unchanged in [`BackgroundError::Rate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackgroundError {
    #[error("Geometry has no energy axis")]
    MissingEnergyAxis,

    #[error("Unusable energy axis: {0}")]
    EnergyAxis(#[from] AxisError),

    #[error("Ontime must be finite and non-negative, got {0} s")]
    InvalidOntime(f64),

    #[error("Background rate times solid angle times ontime is not a count: {0}")]
    IncompatibleUnits(#[from] UnitError),

    #[error("Shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error(transparent)]
    Rate(#[from] BackgroundRateError),

    #[error(transparent)]
    Map(#[from] MapError),
}
