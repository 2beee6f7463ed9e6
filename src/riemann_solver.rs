use glam::DVec3;
use yaml_rust::Yaml;

use crate::{
    errors::{ConfigError, RiemannError, Side},
    gas_law::GasLaw,
    physical_quantities::{Conserved, Primitive, Quantity, State},
};

mod exact;
mod hll;
mod hllc;
mod roe;
mod vacuum;

pub use exact::ExactRiemannSolver;
pub use hll::HLLRiemannSolver;
pub use hllc::HLLCRiemannSolver;
pub use roe::RoeRiemannSolver;
pub(crate) use vacuum::VacuumRiemannSolver;

/// Result of resolving the Riemann problem at one interface.
#[derive(Debug, Clone, Copy)]
pub struct RiemannFlux {
    pub flux: State<Conserved>,
    /// Largest absolute signal speed of the wave pattern.
    pub max_wave_speed: f64,
}

/// Resolves the 1D Riemann problem along `n_unit` into a numerical flux.
///
/// States handed to a solver must be floored: a non-positive or non-finite density or
/// pressure is reported as an error, never repaired.
pub trait RiemannSolver: Send + Sync {
    fn resolve(
        &self,
        left: &State<Primitive>,
        right: &State<Primitive>,
        n_unit: DVec3,
        gas_law: &GasLaw,
    ) -> Result<RiemannFlux, RiemannError>;

    fn name(&self) -> &'static str;
}

pub struct RiemannStarValues {
    pub rho_l: f64,
    pub rho_r: f64,
    pub u: f64,
    pub p: f64,
}

/// Riemann solvers that compute the star region explicitly.
pub trait RiemannStarSolver {
    fn solve_for_star_state(
        &self,
        left: &State<Primitive>,
        right: &State<Primitive>,
        v_l: f64,
        v_r: f64,
        a_l: f64,
        a_r: f64,
        gas_law: &GasLaw,
    ) -> RiemannStarValues;
}

pub(crate) fn check_state(state: &State<Primitive>, side: Side) -> Result<(), RiemannError> {
    let fault = |quantity: Quantity, value: f64| RiemannError::NonPhysicalState {
        side,
        quantity,
        value,
    };
    if let Some((quantity, value)) = state.first_non_finite() {
        return Err(fault(quantity, value));
    }
    if state.density() <= 0. {
        return Err(fault(Quantity::Density, state.density()));
    }
    if state.pressure() <= 0. {
        return Err(fault(Quantity::Pressure, state.pressure()));
    }
    Ok(())
}

/// Flux through the interface of the sampled state at `x / t = 0`.
pub(crate) fn flux_from_half_state(
    half: &State<Primitive>,
    n_unit: DVec3,
    gas_law: &GasLaw,
) -> State<Conserved> {
    if half.density() > 0. {
        half.flux(n_unit, gas_law)
    } else {
        State::<Conserved>::vacuum()
    }
}

/// Carry the passive scalar with the mass flux, taking the fraction from the upwind side.
pub(crate) fn upwind_passive_scalar(
    flux: State<Conserved>,
    left: &State<Primitive>,
    right: &State<Primitive>,
) -> State<Conserved> {
    let fraction = if flux.mass() >= 0. {
        left.passive_scalar()
    } else {
        right.passive_scalar()
    };
    flux.with_passive_scalar(flux.mass() * fraction)
}

pub fn riemann_solver_from_name(name: &str) -> Result<Box<dyn RiemannSolver>, ConfigError> {
    Ok(match name {
        "Exact" => Box::new(ExactRiemannSolver),
        "HLLC" => Box::new(HLLCRiemannSolver),
        "HLL" => Box::new(HLLRiemannSolver),
        "Roe" => Box::new(RoeRiemannSolver::default()),
        _ => return Err(ConfigError::UnknownRiemannSolver(name.to_string())),
    })
}

/// Read the `riemann_solver` section of the hydrodynamics configuration.
pub fn init_riemann_solver(cfg: &Yaml) -> Result<Box<dyn RiemannSolver>, ConfigError> {
    let kind = cfg["kind"]
        .as_str()
        .ok_or(ConfigError::MissingParameter(
            "hydrodynamics:riemann_solver:kind".to_string(),
        ))?;
    match (kind, cfg["entropy_fix"].as_f64()) {
        ("Roe", Some(entropy_fix)) => Ok(Box::new(RoeRiemannSolver::new(entropy_fix))),
        _ => riemann_solver_from_name(kind),
    }
}
