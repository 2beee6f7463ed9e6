#![allow(dead_code)]

use grid_hydro::{
    boundary::BoundaryConditions, grid::Grid, units::UnitConverter, Engine, Fluid, Hydrodynamics,
    InitialConditions,
};
use yaml_rust::{Yaml, YamlLoader};

pub const HYDRO_CONFIG: &'static str = r##"
gamma: 1.4
cfl_criterion: 0.4
density_floor: 1e-10
pressure_floor: 1e-10
spatial_order: 1
temporal_order: 2
riemann_solver:
  kind: "HLLC"
slope_limiter:
  kind: "van_leer"
"##;

pub const TIME_INTEGRATION_CONFIG: &'static str = r##"
t_end: 0.1
dt_max: 1.
status_interval: 50
"##;

pub const SOD_GRID_CONFIG: &'static str = r##"
ncells: [200, 1, 1]
side_length: 1.
"##;

pub const BLAST_GRID_CONFIG: &'static str = r##"
ncells: [24, 24, 1]
side_length: 1.
"##;

pub const OUTFLOW_CONFIG: &'static str = r##"
left: "outflow"
right: "outflow"
"##;

pub const PERIODIC_CONFIG: &'static str = r##"
left: "periodic"
right: "periodic"
"##;

pub const REFLECTIVE_CONFIG: &'static str = r##"
left: "reflective"
right: "reflective"
"##;

pub fn load(cfg: &str) -> Yaml {
    YamlLoader::load_from_str(cfg).expect("Error loading cfg!")[0].clone()
}

pub fn get_hydro(cfg: &str) -> Hydrodynamics {
    Hydrodynamics::init(&load(cfg), &UnitConverter::default())
        .expect("Error creating hydrodynamics!")
}

/// Hydrodynamics with the given Riemann solver, slope limiter and orders.
pub fn get_hydro_with(
    riemann_solver: &str,
    slope_limiter: &str,
    spatial_order: u8,
    temporal_order: u8,
) -> Hydrodynamics {
    get_hydro_with_cfl(riemann_solver, slope_limiter, spatial_order, temporal_order, 0.4)
}

pub fn get_hydro_with_cfl(
    riemann_solver: &str,
    slope_limiter: &str,
    spatial_order: u8,
    temporal_order: u8,
    cfl_criterion: f64,
) -> Hydrodynamics {
    get_hydro(&format!(
        r##"
gamma: 1.4
cfl_criterion: {cfl_criterion}
density_floor: 1e-10
pressure_floor: 1e-10
spatial_order: {spatial_order}
temporal_order: {temporal_order}
riemann_solver:
  kind: "{riemann_solver}"
slope_limiter:
  kind: "{slope_limiter}"
"##
    ))
}

pub fn get_fluid(grid_cfg: &str, boundaries_cfg: &str, ics: &str, hydro: &Hydrodynamics) -> Fluid {
    let grid = Grid::init(&load(grid_cfg)).expect("Error creating grid!");
    let boundaries =
        BoundaryConditions::init(&load(boundaries_cfg)).expect("Error creating boundaries!");
    InitialConditions::init(
        &load(&format!("kind: {ics}")),
        grid,
        hydro.constants().gas_law(),
    )
    .expect("Error creating initial conditions!")
    .into_fluid(boundaries)
}

pub fn get_engine(time_integration_cfg: &str, hydro: Hydrodynamics) -> Engine {
    Engine::init(
        &load(time_integration_cfg),
        hydro,
        &UnitConverter::default(),
    )
    .expect("Error initializing engine!")
}
