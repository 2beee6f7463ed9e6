//! Godunov-type finite-volume hydrodynamics on structured grids.
//!
//! The library integrates the compressible Euler equations with dimensionally split MUSCL
//! sweeps, and provides a variety of Riemann solvers and slope limiters for them.

pub use engine::{Engine, MarchSummary};
pub use errors::{ConfigError, HydroError, RiemannError, Side};
pub use fluid::Fluid;
pub use hydrodynamics::Hydrodynamics;
pub use initial_conditions::InitialConditions;

pub mod boundary;
mod engine;
mod errors;
pub mod floors;
mod fluid;
pub mod flux;
pub mod gas_law;
pub mod grid;
mod hydrodynamics;
mod initial_conditions;
pub mod physical_constants;
pub mod physical_quantities;
pub mod reconstruction;
pub mod riemann_solver;
pub mod slope_limiters;
pub mod source_terms;
pub mod timestep;
pub mod units;
