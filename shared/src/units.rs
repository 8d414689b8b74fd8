//! Type-safe physical units for background modelling
//!
//! Scalar inputs (pointing offsets, energies, pixel solid angles, observation
//! time) are strongly typed with the `uom` crate so a degree can never be passed
//! where a radian is expected. Tabulated rates whose dimension is only known at
//! run time carry a [`CompositeUnit`] signature instead, which is checked when
//! the tabulated values are finally reduced to counts.

use std::fmt;
use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::angle::{degree, radian};
use uom::si::energy::electronvolt;
use uom::si::solid_angle::steradian;
use uom::si::time::{hour, second};

pub use uom::si::f64::{Angle, Energy, SolidAngle, Time};

/// Joules per electronvolt
const JOULES_PER_ELECTRONVOLT: f64 = 1.602_176_634e-19;

/// Extension trait for energy conversions used by gamma-ray instruments
pub trait EnergyExt {
    /// Create energy from electronvolts
    fn from_ev(ev: f64) -> Self;

    /// Get energy in electronvolts
    fn as_ev(&self) -> f64;

    /// Create energy from mega-electronvolts
    fn from_mev(mev: f64) -> Self;

    /// Get energy in mega-electronvolts
    fn as_mev(&self) -> f64;

    /// Create energy from tera-electronvolts
    fn from_tev(tev: f64) -> Self;

    /// Get energy in tera-electronvolts
    fn as_tev(&self) -> f64;
}

/// Extension trait for angle conversions
pub trait AngleExt {
    /// Create angle from degrees
    fn from_degrees(deg: f64) -> Self;

    /// Get angle in degrees
    fn as_degrees(&self) -> f64;

    /// Create angle from radians
    fn from_radians(rad: f64) -> Self;

    /// Get angle in radians
    fn as_radians(&self) -> f64;
}

/// Extension trait for solid angle conversions
pub trait SolidAngleExt {
    /// Create solid angle from steradians
    fn from_steradians(sr: f64) -> Self;

    /// Get solid angle in steradians
    fn as_steradians(&self) -> f64;

    /// Create solid angle from square degrees
    fn from_square_degrees(deg2: f64) -> Self;

    /// Get solid angle in square degrees
    fn as_square_degrees(&self) -> f64;
}

/// Extension trait for observation durations
pub trait TimeExt {
    /// Create time from seconds
    fn from_seconds(s: f64) -> Self;

    /// Get time in seconds
    fn as_seconds(&self) -> f64;

    /// Create time from hours
    fn from_hours(h: f64) -> Self;

    /// Get time in hours
    fn as_hours(&self) -> f64;
}

impl EnergyExt for Energy {
    fn from_ev(ev: f64) -> Self {
        Energy::new::<electronvolt>(ev)
    }

    fn as_ev(&self) -> f64 {
        self.get::<electronvolt>()
    }

    fn from_mev(mev: f64) -> Self {
        Energy::new::<electronvolt>(mev * 1e6)
    }

    fn as_mev(&self) -> f64 {
        self.get::<electronvolt>() * 1e-6
    }

    fn from_tev(tev: f64) -> Self {
        Energy::new::<electronvolt>(tev * 1e12)
    }

    fn as_tev(&self) -> f64 {
        self.get::<electronvolt>() * 1e-12
    }
}

impl AngleExt for Angle {
    fn from_degrees(deg: f64) -> Self {
        Angle::new::<degree>(deg)
    }

    fn as_degrees(&self) -> f64 {
        self.get::<degree>()
    }

    fn from_radians(rad: f64) -> Self {
        Angle::new::<radian>(rad)
    }

    fn as_radians(&self) -> f64 {
        self.get::<radian>()
    }
}

impl SolidAngleExt for SolidAngle {
    fn from_steradians(sr: f64) -> Self {
        SolidAngle::new::<steradian>(sr)
    }

    fn as_steradians(&self) -> f64 {
        self.get::<steradian>()
    }

    fn from_square_degrees(deg2: f64) -> Self {
        let rad_per_deg = std::f64::consts::PI / 180.0;
        SolidAngle::new::<steradian>(deg2 * rad_per_deg * rad_per_deg)
    }

    fn as_square_degrees(&self) -> f64 {
        let deg_per_rad = 180.0 / std::f64::consts::PI;
        self.get::<steradian>() * deg_per_rad * deg_per_rad
    }
}

impl TimeExt for Time {
    fn from_seconds(s: f64) -> Self {
        Time::new::<second>(s)
    }

    fn as_seconds(&self) -> f64 {
        self.get::<second>()
    }

    fn from_hours(h: f64) -> Self {
        Time::new::<hour>(h)
    }

    fn as_hours(&self) -> f64 {
        self.get::<hour>()
    }
}

/// Errors raised when reducing a composite unit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("Unit '{0}' cannot be converted to a dimensionless quantity")]
    NotDimensionless(CompositeUnit),
}

/// Dimensional signature of a tabulated quantity.
///
/// Stores the multiplicative factor to SI base units (second, steradian, joule)
/// together with the integer exponent of each dimension that appears in
/// background rates. `s^-1 sr^-1` is `{ scale: 1, time: -1, solid_angle: -1 }`;
/// `MeV^-1 s^-1 sr^-1` additionally has `energy: -1` and a scale of
/// `1 / (1 MeV in joules)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeUnit {
    /// Factor converting one of this unit to SI base units
    pub scale: f64,
    /// Exponent of time
    pub time: i32,
    /// Exponent of solid angle
    pub solid_angle: i32,
    /// Exponent of energy
    pub energy: i32,
}

impl CompositeUnit {
    pub const fn dimensionless() -> Self {
        Self {
            scale: 1.0,
            time: 0,
            solid_angle: 0,
            energy: 0,
        }
    }

    pub const fn seconds() -> Self {
        Self {
            scale: 1.0,
            time: 1,
            solid_angle: 0,
            energy: 0,
        }
    }

    pub const fn steradians() -> Self {
        Self {
            scale: 1.0,
            time: 0,
            solid_angle: 1,
            energy: 0,
        }
    }

    /// Integrated background rate, `s^-1 sr^-1`
    pub const fn per_second_steradian() -> Self {
        Self {
            scale: 1.0,
            time: -1,
            solid_angle: -1,
            energy: 0,
        }
    }

    /// Integrated background rate, `s^-1 deg^-2`
    pub fn per_second_square_degree() -> Self {
        let sr_per_deg2 = SolidAngle::from_square_degrees(1.0).as_steradians();
        Self {
            scale: 1.0 / sr_per_deg2,
            time: -1,
            solid_angle: -1,
            energy: 0,
        }
    }

    /// Energy expressed in a given number of electronvolts per unit
    pub fn electronvolts(ev_per_unit: f64) -> Self {
        Self {
            scale: ev_per_unit * JOULES_PER_ELECTRONVOLT,
            time: 0,
            solid_angle: 0,
            energy: 1,
        }
    }

    /// Differential background rate, `MeV^-1 s^-1 sr^-1`
    pub fn per_mev_second_steradian() -> Self {
        Self::per_second_steradian() / Self::electronvolts(1e6)
    }

    /// Raise to an integer power
    pub fn powi(&self, n: i32) -> Self {
        Self {
            scale: self.scale.powi(n),
            time: self.time * n,
            solid_angle: self.solid_angle * n,
            energy: self.energy * n,
        }
    }

    pub fn is_dimensionless(&self) -> bool {
        self.time == 0 && self.solid_angle == 0 && self.energy == 0
    }

    /// Factor converting a value in this unit to a plain number.
    ///
    /// Fails unless every dimension exponent cancels.
    pub fn to_dimensionless(&self) -> Result<f64, UnitError> {
        if self.is_dimensionless() {
            Ok(self.scale)
        } else {
            Err(UnitError::NotDimensionless(*self))
        }
    }
}

impl Default for CompositeUnit {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl Mul for CompositeUnit {
    type Output = CompositeUnit;

    fn mul(self, rhs: CompositeUnit) -> CompositeUnit {
        CompositeUnit {
            scale: self.scale * rhs.scale,
            time: self.time + rhs.time,
            solid_angle: self.solid_angle + rhs.solid_angle,
            energy: self.energy + rhs.energy,
        }
    }
}

impl Div for CompositeUnit {
    type Output = CompositeUnit;

    fn div(self, rhs: CompositeUnit) -> CompositeUnit {
        self * rhs.powi(-1)
    }
}

impl fmt::Display for CompositeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e}", self.scale)?;
        for (symbol, exp) in [("s", self.time), ("sr", self.solid_angle), ("J", self.energy)] {
            if exp != 0 {
                write!(f, " {symbol}^{exp}")?;
            }
        }
        Ok(())
    }
}
