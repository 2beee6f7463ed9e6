use yaml_rust::Yaml;

use crate::errors::ConfigError;

/// Converts raw cgs values to the code unit system defined by a length, mass and time scale.
#[derive(Debug, Clone, Copy)]
pub struct UnitConverter {
    length: f64,
    mass: f64,
    time: f64,
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self {
            length: 1.,
            mass: 1.,
            time: 1.,
        }
    }
}

impl UnitConverter {
    pub fn new(length: f64, mass: f64, time: f64) -> Result<Self, ConfigError> {
        for (name, scale) in [("units:length", length), ("units:mass", mass), ("units:time", time)] {
            if !(scale > 0. && scale.is_finite()) {
                return Err(ConfigError::InvalidParameter {
                    name: name.to_string(),
                    value: scale.to_string(),
                });
            }
        }
        Ok(Self { length, mass, time })
    }

    /// Missing scales default to 1 (i.e. code units are cgs).
    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        if cfg.is_badvalue() {
            return Ok(Self::default());
        }
        Self::new(
            cfg["length"].as_f64().unwrap_or(1.),
            cfg["mass"].as_f64().unwrap_or(1.),
            cfg["time"].as_f64().unwrap_or(1.),
        )
    }

    fn scale(&self, mass_pow: i32, length_pow: i32, time_pow: i32) -> f64 {
        self.mass.powi(mass_pow) * self.length.powi(length_pow) * self.time.powi(time_pow)
    }

    /// Convert a cgs value with dimensions `M^mass_pow L^length_pow T^time_pow` to code units.
    pub fn to_code_units(&self, value: f64, mass_pow: i32, length_pow: i32, time_pow: i32) -> f64 {
        value / self.scale(mass_pow, length_pow, time_pow)
    }

    pub fn from_code_units(&self, value: f64, mass_pow: i32, length_pow: i32, time_pow: i32) -> f64 {
        value * self.scale(mass_pow, length_pow, time_pow)
    }
}
