//! IRF background cubes for gamma-ray observations
//!
//! This crate predicts the instrumental background of an observation from a
//! background rate model and calibrates that prediction against observed
//! counts in source-free regions of the field of view.

pub mod algo;
pub mod error;
pub mod normalization;
pub mod rate;
pub mod shared_args;
pub mod synthesis;

// Re-exports for easier access
pub use error::BackgroundError;
pub use normalization::{apply_normalization, fov_background_norm, NormalizationVector};
pub use rate::{
    BackgroundRate, BackgroundRateError, IntegratedRate, PowerLawBackground, RadialTableBackground,
};
pub use synthesis::make_map_background_irf;
