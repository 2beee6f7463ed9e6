use rayon::prelude::*;
use yaml_rust::Yaml;

use crate::{
    errors::{ConfigError, HydroError},
    floors::{apply_floors, validate},
    flux::{apply_fluxes, compute_fluxes, max_signal_speed},
    fluid::Fluid,
    grid::Axis,
    physical_constants::HydroConstants,
    reconstruction::{predict_half_step, reconstruct, SpatialOrder, TemporalOrder},
    riemann_solver::{init_riemann_solver, RiemannSolver},
    slope_limiters::{init_slope_limiter, SlopeLimiter},
    source_terms::{couple_source_terms, GeometricSource, SourceTerm, StellarWind},
    timestep,
    units::UnitConverter,
};

/// Godunov finite-volume integrator for the Euler equations on a structured grid.
///
/// Owns the Riemann solver and slope limiter for its lifetime. Multi-dimensional grids are
/// advanced with dimensional splitting; the sweep order is reversed every other step.
pub struct Hydrodynamics {
    constants: HydroConstants,
    riemann_solver: Option<Box<dyn RiemannSolver>>,
    slope_limiter: Option<Box<dyn SlopeLimiter>>,
    spatial_order: SpatialOrder,
    temporal_order: TemporalOrder,
    source_terms: Vec<Box<dyn SourceTerm>>,
    step: u64,
}

impl Hydrodynamics {
    /// An integrator without strategies: set a Riemann solver and slope limiter before use.
    pub fn new(constants: HydroConstants) -> Self {
        Self {
            constants,
            riemann_solver: None,
            slope_limiter: None,
            spatial_order: SpatialOrder::Linear,
            temporal_order: TemporalOrder::First,
            source_terms: vec![],
            step: 0,
        }
    }

    /// Read the `hydrodynamics` section.
    ///
    /// The `riemann_solver` and `slope_limiter` subsections are optional here; a missing
    /// strategy is only reported when the march starts.
    pub fn init(cfg: &Yaml, converter: &UnitConverter) -> Result<Self, ConfigError> {
        let mut hydro = Self::new(HydroConstants::init(cfg, converter)?);
        hydro.spatial_order = SpatialOrder::init(cfg)?;
        hydro.temporal_order = TemporalOrder::init(cfg)?;
        if !cfg["riemann_solver"].is_badvalue() {
            hydro.set_riemann_solver(init_riemann_solver(&cfg["riemann_solver"])?);
        }
        if !cfg["slope_limiter"].is_badvalue() {
            hydro.set_slope_limiter(init_slope_limiter(&cfg["slope_limiter"])?);
        }
        log::info!(
            "Hydrodynamics: {} Riemann solver, {} slope limiter, {:?} reconstruction, {:?} order \
             time integration",
            hydro.riemann_solver.as_ref().map_or("no", |solver| solver.name()),
            hydro.slope_limiter.as_ref().map_or("no", |limiter| limiter.name()),
            hydro.spatial_order,
            hydro.temporal_order,
        );
        Ok(hydro)
    }

    /// Add the geometric source terms of the fluid's grid and, if `wind_cfg` is present, a
    /// stellar wind.
    pub fn init_source_terms(
        &mut self,
        wind_cfg: &Yaml,
        converter: &UnitConverter,
        fluid: &Fluid,
    ) -> Result<(), ConfigError> {
        if let Some(source) = GeometricSource::new(fluid.grid().geometry(), self.constants) {
            self.add_source_term(Box::new(source));
        }
        if !wind_cfg.is_badvalue() {
            let wind = StellarWind::init(wind_cfg, converter, fluid.grid(), &self.constants)?;
            self.add_source_term(Box::new(wind));
        }
        Ok(())
    }

    /// Replaces the previous Riemann solver, if any.
    pub fn set_riemann_solver(&mut self, riemann_solver: Box<dyn RiemannSolver>) {
        self.riemann_solver = Some(riemann_solver);
    }

    /// Replaces the previous slope limiter, if any.
    pub fn set_slope_limiter(&mut self, slope_limiter: Box<dyn SlopeLimiter>) {
        self.slope_limiter = Some(slope_limiter);
    }

    pub fn set_spatial_order(&mut self, spatial_order: SpatialOrder) {
        self.spatial_order = spatial_order;
    }

    pub fn set_temporal_order(&mut self, temporal_order: TemporalOrder) {
        self.temporal_order = temporal_order;
    }

    pub fn add_source_term(&mut self, source_term: Box<dyn SourceTerm>) {
        log::info!("Adding {} source term", source_term.name());
        self.source_terms.push(source_term);
    }

    pub fn constants(&self) -> &HydroConstants {
        &self.constants
    }

    /// Number of completed integration steps.
    pub fn step(&self) -> u64 {
        self.step
    }

    fn strategies(&self) -> Result<(&dyn RiemannSolver, &dyn SlopeLimiter), ConfigError> {
        let riemann_solver = self
            .riemann_solver
            .as_deref()
            .ok_or(ConfigError::MissingStrategy("Riemann solver"))?;
        let slope_limiter = self
            .slope_limiter
            .as_deref()
            .ok_or(ConfigError::MissingStrategy("slope limiter"))?;
        Ok((riemann_solver, slope_limiter))
    }

    pub fn check_strategies(&self) -> Result<(), ConfigError> {
        self.strategies().map(|_| ())
    }

    /// Floor and validate the initial state, then fill the ghost cells.
    pub fn fix_initial_conditions(&self, fluid: &mut Fluid) -> Result<(), HydroError> {
        let clamped = apply_floors(fluid.grid_mut(), &self.constants);
        if clamped > 0 {
            log::info!("Floors clamped {clamped} cells of the initial conditions");
        }
        validate(fluid.grid())?;
        fluid.fill_ghost_cells();
        Ok(())
    }

    /// Refresh the primitives of the real cells from their conserved state and fill the ghost
    /// cells.
    pub fn pre_time_step_calculations(&self, fluid: &mut Fluid) {
        let gas_law = self.constants.gas_law();
        fluid
            .grid_mut()
            .par_real_cells_mut()
            .for_each(|(_, _, cell)| cell.refresh_primitives(gas_law));
        fluid.fill_ghost_cells();
    }

    pub fn calculate_time_step(&self, dt_max: f64, fluid: &Fluid) -> f64 {
        timestep::calculate_time_step(dt_max, fluid.grid(), &self.constants)
    }

    /// Advance the fluid over `dt` with one sweep per active axis.
    ///
    /// Ghost cells are refilled before every sweep, floors are enforced and the state is
    /// validated after it.
    pub fn integrate(&mut self, dt: f64, fluid: &mut Fluid) -> Result<(), HydroError> {
        let mut axes = fluid.grid().active_axes();
        if self.step % 2 == 1 {
            axes.reverse();
        }
        for axis in axes {
            self.sweep(axis, dt, fluid)?;
        }
        self.step += 1;
        Ok(())
    }

    fn sweep(&self, axis: Axis, dt: f64, fluid: &mut Fluid) -> Result<(), HydroError> {
        let (riemann_solver, slope_limiter) = self.strategies()?;
        fluid.fill_ghost_cells();

        let grid = fluid.grid();
        let mut faces = reconstruct(
            grid,
            axis,
            slope_limiter,
            self.spatial_order,
            &self.constants,
        );
        if self.temporal_order == TemporalOrder::Second {
            let dt_over_dx = dt / grid.cell_width(axis, grid.cell_index(0));
            predict_half_step(&mut faces, axis, dt_over_dx, &self.constants);
        }
        let fluxes = compute_fluxes(
            grid,
            &faces,
            axis,
            dt,
            riemann_solver,
            self.constants.gas_law(),
        )?;
        log::debug!(
            "Sweep along {axis:?}: maximal wave speed {:.6e}",
            max_signal_speed(&fluxes)
        );

        apply_fluxes(fluid.grid_mut(), &fluxes, axis, dt);
        apply_floors(fluid.grid_mut(), &self.constants);
        validate(fluid.grid())
    }

    /// Add the source term contributions over `dt`, then floor and validate.
    pub fn update_source_terms(&self, dt: f64, fluid: &mut Fluid) -> Result<(), HydroError> {
        couple_source_terms(fluid.grid_mut(), &self.source_terms, dt, &self.constants)
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use glam::DVec3;
    use yaml_rust::YamlLoader;

    use super::*;
    use crate::{
        boundary::{Boundary, BoundaryConditions},
        gas_law::GasLaw,
        grid::{Cell, Geometry, Grid},
        physical_quantities::{Primitive, State},
        riemann_solver::{ExactRiemannSolver, HLLCRiemannSolver},
        slope_limiters::{MinMod, VanLeer},
    };

    fn constants() -> HydroConstants {
        HydroConstants::new(GasLaw::new(1.4), 0.4, 1e-8, 1e-8, 1.).unwrap()
    }

    fn hydro() -> Hydrodynamics {
        let mut hydro = Hydrodynamics::new(constants());
        hydro.set_riemann_solver(Box::new(HLLCRiemannSolver));
        hydro.set_slope_limiter(Box::new(VanLeer));
        hydro
    }

    fn blob(ncells: [usize; 3], boundary: Boundary, gas_law: &GasLaw) -> Fluid {
        let mut grid = Grid::new(ncells, 1., Geometry::Cartesian).unwrap();
        for index in grid.real_indices().collect::<Vec<_>>() {
            let offset = grid.position(index) - DVec3::new(0.5, 0.5, 0.);
            let radius = if ncells[1] > 1 {
                offset.truncate().length()
            } else {
                offset.x.abs()
            };
            let pressure = if radius < 0.2 {
                10.
            } else {
                1.
            };
            *grid.cell_mut(index) = Cell::from_primitives(
                State::<Primitive>::new(1., DVec3::new(0.3, -0.1, 0.), pressure),
                gas_law,
            );
        }
        Fluid::new(grid, BoundaryConditions::uniform(boundary))
    }

    #[test]
    fn test_missing_strategies() {
        let mut hydro = Hydrodynamics::new(constants());
        let mut fluid = blob([8, 1, 1], Boundary::Periodic, constants().gas_law());
        assert!(matches!(
            hydro.check_strategies(),
            Err(ConfigError::MissingStrategy("Riemann solver"))
        ));
        hydro.set_riemann_solver(Box::new(ExactRiemannSolver));
        assert!(matches!(
            hydro.integrate(1e-3, &mut fluid),
            Err(HydroError::Config(ConfigError::MissingStrategy("slope limiter")))
        ));
        hydro.set_slope_limiter(Box::new(MinMod));
        hydro.check_strategies().unwrap();
    }

    #[test]
    fn test_init() {
        let cfg = &YamlLoader::load_from_str(
            r##"
gamma: 1.4
cfl_criterion: 0.3
density_floor: 1e-10
pressure_floor: 1e-10
temporal_order: 2
riemann_solver:
  kind: "Roe"
  entropy_fix: 0.2
slope_limiter:
  kind: "superbee"
"##,
        )
        .unwrap()[0];
        let hydro = Hydrodynamics::init(cfg, &UnitConverter::default()).unwrap();
        hydro.check_strategies().unwrap();
        assert_eq!(hydro.temporal_order, TemporalOrder::Second);
        assert_eq!(hydro.spatial_order, SpatialOrder::Linear);
        assert_approx_eq!(f64, hydro.constants().cfl(), 0.3);
    }

    #[test]
    fn test_periodic_2d_conservation() {
        let mut hydro = hydro();
        hydro.set_temporal_order(TemporalOrder::Second);
        let mut fluid = blob([16, 16, 1], Boundary::Periodic, hydro.constants().gas_law());
        hydro.fix_initial_conditions(&mut fluid).unwrap();
        let before = fluid.grid().total_conserved();
        for _ in 0..5 {
            hydro.pre_time_step_calculations(&mut fluid);
            let dt = hydro.calculate_time_step(1., &fluid);
            hydro.integrate(dt, &mut fluid).unwrap();
            hydro.update_source_terms(dt, &mut fluid).unwrap();
        }
        assert_eq!(hydro.step(), 5);
        let after = fluid.grid().total_conserved();
        assert_approx_eq!(f64, after.mass(), before.mass(), epsilon = 1e-11);
        assert_approx_eq!(f64, after.energy(), before.energy(), epsilon = 1e-10);
        assert_approx_eq!(f64, after.momentum().x, before.momentum().x, epsilon = 1e-11);
        assert_approx_eq!(f64, after.momentum().y, before.momentum().y, epsilon = 1e-11);
    }

    #[test]
    fn test_sweep_order_alternates() {
        // a single step along x then y differs from y then x for a non-trivial state
        let gas_law = *constants().gas_law();
        let mut hydro_a = hydro();
        let mut fluid_a = blob([8, 8, 1], Boundary::Periodic, &gas_law);
        let mut hydro_b = hydro();
        hydro_b.step = 1;
        let mut fluid_b = fluid_a.clone();
        hydro_a.integrate(5e-3, &mut fluid_a).unwrap();
        hydro_b.integrate(5e-3, &mut fluid_b).unwrap();
        let differs = fluid_a
            .grid()
            .cells()
            .iter()
            .zip(fluid_b.grid().cells())
            .any(|(a, b)| a.conserved != b.conserved);
        assert!(differs);
    }

    #[test]
    fn test_reflective_box_keeps_mass() {
        let mut hydro = hydro();
        let mut fluid = blob([12, 1, 1], Boundary::Reflective, hydro.constants().gas_law());
        hydro.fix_initial_conditions(&mut fluid).unwrap();
        let before = fluid.grid().total_conserved();
        for _ in 0..10 {
            hydro.pre_time_step_calculations(&mut fluid);
            let dt = hydro.calculate_time_step(1., &fluid);
            hydro.integrate(dt, &mut fluid).unwrap();
        }
        let after = fluid.grid().total_conserved();
        assert_approx_eq!(f64, after.mass(), before.mass(), epsilon = 1e-12);
        assert_approx_eq!(f64, after.energy(), before.energy(), epsilon = 1e-11);
        for index in fluid.grid().real_indices() {
            let w = &fluid.grid().cell(index).primitives;
            assert!(w.density() >= 1e-8 && w.pressure() >= 1e-8);
        }
        assert!(fluid
            .grid()
            .real_indices()
            .any(|index| fluid.grid().cell(index).primitives.velocity().x != 0.3));
    }
}
