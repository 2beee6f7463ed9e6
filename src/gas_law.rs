use yaml_rust::Yaml;

use crate::errors::ConfigError;

#[derive(Debug, Default, Clone, Copy)]
pub struct AdiabaticIndex {
    gamma: f64,
    gamma_inv: f64,
    odgm1: f64,
    odgp1: f64,
}

impl From<f64> for AdiabaticIndex {
    fn from(value: f64) -> Self {
        AdiabaticIndex {
            gamma: value,
            gamma_inv: 1. / value,
            odgm1: 1. / (value - 1.),
            odgp1: 1. / (value + 1.),
        }
    }
}

impl From<AdiabaticIndex> for f64 {
    fn from(value: AdiabaticIndex) -> Self {
        value.gamma
    }
}

impl AdiabaticIndex {
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn gp1dg(&self) -> f64 {
        (self.gamma + 1.) * self.gamma_inv
    }

    pub fn gm1d2g(&self) -> f64 {
        0.5 * (self.gamma - 1.) * self.gamma_inv
    }

    pub fn gm1dgp1(&self) -> f64 {
        (self.gamma - 1.) * self.odgp1
    }

    pub fn odgm1(&self) -> f64 {
        self.odgm1
    }

    pub fn tdgm1(&self) -> f64 {
        2. * self.odgm1
    }

    pub fn tdgp1(&self) -> f64 {
        2. * self.odgp1
    }
}

/// Ideal gas equation of state `p = (gamma - 1) * rho * e`.
#[derive(Debug, Clone, Copy)]
pub struct GasLaw {
    gamma: AdiabaticIndex,
}

impl GasLaw {
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma: gamma.into(),
        }
    }

    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        let gamma = cfg["gamma"]
            .as_f64()
            .ok_or(ConfigError::MissingParameter("hydrodynamics:gamma".to_string()))?;
        if gamma <= 1. {
            return Err(ConfigError::InvalidParameter {
                name: "hydrodynamics:gamma".to_string(),
                value: gamma.to_string(),
            });
        }
        Ok(Self::new(gamma))
    }

    pub fn gamma(&self) -> &AdiabaticIndex {
        &self.gamma
    }

    /// `gamma * p / rho`.
    ///
    /// The density must already be floored: a vanishing density yields a non-finite result which
    /// the validation pass reports.
    pub fn sound_speed_squared(&self, pressure: f64, density: f64) -> f64 {
        debug_assert!(density > 0., "Sound speed requested for non-positive density!");
        self.gamma.gamma * pressure / density
    }

    pub fn sound_speed(&self, pressure: f64, density: f64) -> f64 {
        self.sound_speed_squared(pressure, density).sqrt()
    }

    /// Thermal energy per unit volume
    pub fn thermal_energy_from_pressure(&self, pressure: f64) -> f64 {
        pressure * self.gamma.odgm1()
    }

    pub fn pressure_from_thermal_energy(&self, thermal_energy: f64) -> f64 {
        (self.gamma.gamma - 1.) * thermal_energy
    }
}
