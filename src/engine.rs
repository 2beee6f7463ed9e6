use yaml_rust::Yaml;

use crate::{
    errors::{ConfigError, HydroError},
    fluid::Fluid,
    hydrodynamics::Hydrodynamics,
    units::UnitConverter,
};

/// Outcome of a completed march.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchSummary {
    pub steps: u64,
    pub time: f64,
}

/// Drives the hydrodynamics from `t = 0` to `t_end`.
pub struct Engine {
    hydro: Hydrodynamics,
    t_end: f64,
    dt_max: f64,
    max_steps: Option<u64>,
    status_interval: u64,
}

impl Engine {
    pub fn new(hydro: Hydrodynamics, t_end: f64, dt_max: f64) -> Self {
        Self {
            hydro,
            t_end,
            dt_max,
            max_steps: None,
            status_interval: 100,
        }
    }

    /// Read the `time_integration` section (times in cgs).
    pub fn init(
        cfg: &Yaml,
        hydro: Hydrodynamics,
        converter: &UnitConverter,
    ) -> Result<Self, ConfigError> {
        let read_time = |key: &str| -> Result<f64, ConfigError> {
            let value = cfg[key]
                .as_f64()
                .ok_or(ConfigError::MissingParameter(format!("time_integration:{key}")))?;
            if !(value > 0.) {
                return Err(ConfigError::InvalidParameter {
                    name: format!("time_integration:{key}"),
                    value: value.to_string(),
                });
            }
            Ok(converter.to_code_units(value, 0, 0, 1))
        };
        let mut engine = Self::new(hydro, read_time("t_end")?, read_time("dt_max")?);
        engine.max_steps = cfg["max_steps"].as_i64().map(|n| n.max(0) as u64);
        if let Some(interval) = cfg["status_interval"].as_i64() {
            engine.status_interval = interval.max(1) as u64;
        }
        Ok(engine)
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn hydro(&self) -> &Hydrodynamics {
        &self.hydro
    }

    pub fn hydro_mut(&mut self) -> &mut Hydrodynamics {
        &mut self.hydro
    }

    /// Run the march until `t_end` (or `max_steps`) is reached.
    ///
    /// Configuration faults are reported before the first step. Any fault during the march
    /// halts it and is returned with the step and time at which it occurred.
    pub fn run(&mut self, fluid: &mut Fluid) -> Result<MarchSummary, HydroError> {
        self.hydro.check_strategies()?;
        self.hydro
            .fix_initial_conditions(fluid)
            .map_err(|err| self.fail(err, 0, 0.))?;

        let mut time = 0.;
        let mut steps = 0;
        log::info!("Starting march to t = {:.6e}", self.t_end);
        while time < self.t_end && self.max_steps.map_or(true, |max| steps < max) {
            let dt = self.step(fluid, time).map_err(|err| self.fail(err, steps, time))?;
            if dt <= 0. {
                log::warn!("Vanishing time step at t = {time:.6e}, stopping");
                break;
            }
            time += dt;
            steps += 1;
            if steps % self.status_interval == 0 {
                log::info!("Step {steps}: t = {time:.6e}, dt = {dt:.6e}");
            }
        }
        log::info!("Finished march after {steps} steps at t = {time:.6e}");

        Ok(MarchSummary { steps, time })
    }

    /// Perform one step and return its length.
    fn step(&mut self, fluid: &mut Fluid, time: f64) -> Result<f64, HydroError> {
        self.hydro.pre_time_step_calculations(fluid);
        let dt = self
            .hydro
            .calculate_time_step(self.dt_max.min(self.t_end - time), fluid);
        if dt <= 0. {
            return Ok(dt);
        }
        self.hydro.integrate(dt, fluid)?;
        self.hydro.update_source_terms(dt, fluid)?;
        Ok(dt)
    }

    fn fail(&self, err: HydroError, step: u64, time: f64) -> HydroError {
        let err = err.during_march(step, time);
        log::error!("{err}");
        err
    }
}
