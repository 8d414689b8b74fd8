//! Shared components for IRF background modelling.
//!
//! This crate contains the physical units, sky directions, map geometries and
//! labeled cube containers used by the background synthesis and normalisation
//! code, so that the background crate and any downstream consumers agree on
//! one set of types.

pub mod geom;
pub mod map;
pub mod range_arg;
pub mod sky;
pub mod units;

pub use geom::{AxisUnit, MapAxis, MapGeom, RegularSkyGeom};
pub use map::NdMap;
pub use sky::SkyCoord;
