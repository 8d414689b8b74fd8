//! Numerical helpers shared by the tabulated background models

pub mod interp;

pub use interp::{interp, interp_loglog, trap_integrate, InterpError};
