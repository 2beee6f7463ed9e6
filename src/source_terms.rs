use glam::DVec3;
use rayon::prelude::*;
use yaml_rust::Yaml;

use crate::{
    errors::{ConfigError, HydroError},
    floors::{apply_floors, validate},
    grid::{CellIndex, Geometry, Grid},
    physical_constants::HydroConstants,
    physical_quantities::{Conserved, State},
    units::UnitConverter,
};

/// External contribution to the conserved state of a cell over a time step.
pub trait SourceTerm: Send + Sync {
    /// Change of the conserved quantities of the cell at `index` over `dt`.
    fn contribution(&self, grid: &Grid, index: CellIndex, dt: f64) -> State<Conserved>;

    fn name(&self) -> &'static str;
}

/// Add the contributions of all source terms to the real cells, then refresh primitives,
/// enforce floors and validate.
///
/// Every contribution is computed from the state at the start of the call.
pub fn couple_source_terms(
    grid: &mut Grid,
    source_terms: &[Box<dyn SourceTerm>],
    dt: f64,
    constants: &HydroConstants,
) -> Result<(), HydroError> {
    if !source_terms.is_empty() {
        let contributions: Vec<State<Conserved>> = {
            let grid = &*grid;
            (0..grid.cells().len())
                .into_par_iter()
                .map(|linear| {
                    let index = grid.cell_index(linear);
                    if !grid.is_real(index) {
                        return State::vacuum();
                    }
                    source_terms
                        .iter()
                        .fold(State::vacuum(), |total, source| {
                            total + source.contribution(grid, index, dt)
                        })
                })
                .collect()
        };
        grid.par_real_cells_mut().for_each(|(linear, _, cell)| {
            cell.conserved += contributions[linear];
        });
    }
    apply_floors(grid, constants);
    validate(grid)
}

/// Curvature terms of the Euler equations on a cylindrical or spherical grid with the radial
/// coordinate along x.
pub struct GeometricSource {
    alpha: f64,
    constants: HydroConstants,
}

impl GeometricSource {
    /// `None` for Cartesian grids.
    pub fn new(geometry: Geometry, constants: HydroConstants) -> Option<Self> {
        match geometry {
            Geometry::Cartesian => None,
            _ => Some(Self {
                alpha: geometry.alpha(),
                constants,
            }),
        }
    }
}

impl SourceTerm for GeometricSource {
    fn contribution(&self, grid: &Grid, index: CellIndex, dt: f64) -> State<Conserved> {
        let w = &grid.cell(index).primitives;
        let radius = grid.position(index).x;
        // radial flux without the pressure gradient term
        let flux = w.flux(DVec3::X, self.constants.gas_law())
            - State::<Conserved>::new(0., w.pressure() * DVec3::X, 0.);
        (-self.alpha * dt / radius) * flux
    }

    fn name(&self) -> &'static str {
        "geometric"
    }
}

/// Spherically symmetric wind injected uniformly into the cells whose center lies within
/// `radius` of `position`.
///
/// Injected material carries a passive scalar fraction of one.
#[derive(Debug, Clone)]
pub struct StellarWind {
    position: DVec3,
    radius: f64,
    wind_velocity: f64,
    /// Mass injected per unit volume and time.
    density_rate: f64,
    /// Thermal energy per unit mass of the injected gas.
    specific_thermal_energy: f64,
}

impl StellarWind {
    /// All values in code units.
    pub fn new(
        mass_loss_rate: f64,
        wind_velocity: f64,
        wind_temperature: f64,
        radius: f64,
        position: DVec3,
        grid: &Grid,
        constants: &HydroConstants,
    ) -> Result<Self, ConfigError> {
        let cell_volume = grid
            .active_axes()
            .into_iter()
            .map(|axis| grid.cell_width(axis, CellIndex([0; 3])))
            .product::<f64>();
        let injection_cells = grid
            .real_indices()
            .filter(|&index| grid.position(index).distance(position) < radius)
            .count();
        if injection_cells == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "wind:radius".to_string(),
                value: format!("{radius} (no cell centers inside the wind region)"),
            });
        }
        let gas_law = constants.gas_law();
        let specific_thermal_energy = gas_law.thermal_energy_from_pressure(
            constants.specific_gas_constant() * wind_temperature,
        );
        log::info!(
            "Stellar wind injects into {injection_cells} cells around ({}, {}, {})",
            position.x,
            position.y,
            position.z
        );
        Ok(Self {
            position,
            radius,
            wind_velocity,
            density_rate: mass_loss_rate / (injection_cells as f64 * cell_volume),
            specific_thermal_energy,
        })
    }

    /// Read the `wind` section (cgs) and convert to code units.
    pub fn init(
        cfg: &Yaml,
        converter: &UnitConverter,
        grid: &Grid,
        constants: &HydroConstants,
    ) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            cfg[key]
                .as_f64()
                .ok_or(ConfigError::MissingParameter(format!("wind:{key}")))
        };
        let position = match cfg["position"].as_vec() {
            Some(arr) if arr.len() == 3 => {
                let mut position = [0.; 3];
                for (x, yaml) in position.iter_mut().zip(arr) {
                    *x = yaml.as_f64().ok_or(ConfigError::InvalidParameter {
                        name: "wind:position".to_string(),
                        value: format!("{yaml:?}"),
                    })?;
                }
                converter.to_code_units(1., 0, 1, 0) * DVec3::from_array(position)
            }
            Some(arr) => return Err(ConfigError::InvalidArrayLength(3, arr.len())),
            None => DVec3::ZERO,
        };
        Self::new(
            converter.to_code_units(read("mass_loss_rate")?, 1, 0, -1),
            converter.to_code_units(read("velocity")?, 0, 1, -1),
            read("temperature")?,
            converter.to_code_units(read("radius")?, 0, 1, 0),
            position,
            grid,
            constants,
        )
    }
}

impl SourceTerm for StellarWind {
    fn contribution(&self, grid: &Grid, index: CellIndex, dt: f64) -> State<Conserved> {
        let offset = grid.position(index) - self.position;
        if offset.length() >= self.radius {
            return State::vacuum();
        }
        let mass = self.density_rate * dt;
        let direction = offset.normalize_or_zero();
        let energy =
            mass * (0.5 * self.wind_velocity * self.wind_velocity + self.specific_thermal_energy);
        State::<Conserved>::new(mass, mass * self.wind_velocity * direction, energy)
            .with_passive_scalar(mass)
    }

    fn name(&self) -> &'static str {
        "stellar_wind"
    }
}
