use yaml_rust::Yaml;

use crate::{errors::ConfigError, gas_law::GasLaw, units::UnitConverter};

/// Boltzmann constant k (in erg K^-1).
pub const BOLTZMANN_K_IN_CGS: f64 = 1.380658e-16;

/// Hydrogen mass (in g).
pub const HYDROGEN_MASS_IN_CGS: f64 = 1.6738e-24;

/// Parsec (in cm).
pub const PARSEC_IN_CGS: f64 = 3.086e18;

/// Solar mass (in g).
pub const SOLAR_MASS_IN_CGS: f64 = 1.989e33;

/// Year (in s).
pub const YEAR_IN_CGS: f64 = 365.25 * 24. * 3600.;

/// Process-wide hydrodynamic constants, already expressed in code units.
///
/// Built once at setup and never mutated during a march.
#[derive(Debug, Clone, Copy)]
pub struct HydroConstants {
    gas_law: GasLaw,
    cfl: f64,
    density_floor: f64,
    pressure_floor: f64,
    specific_gas_constant: f64,
}

impl HydroConstants {
    /// Construct directly from code-unit values.
    pub fn new(
        gas_law: GasLaw,
        cfl: f64,
        density_floor: f64,
        pressure_floor: f64,
        specific_gas_constant: f64,
    ) -> Result<Self, ConfigError> {
        if !(cfl > 0. && cfl < 1.) {
            return Err(ConfigError::InvalidParameter {
                name: "hydrodynamics:cfl_criterion".to_string(),
                value: cfl.to_string(),
            });
        }
        for (name, floor) in [
            ("hydrodynamics:density_floor", density_floor),
            ("hydrodynamics:pressure_floor", pressure_floor),
        ] {
            if !(floor > 0. && floor.is_finite()) {
                return Err(ConfigError::InvalidParameter {
                    name: name.to_string(),
                    value: floor.to_string(),
                });
            }
        }
        Ok(Self {
            gas_law,
            cfl,
            density_floor,
            pressure_floor,
            specific_gas_constant,
        })
    }

    /// Read the `hydrodynamics` section (floors in cgs) and convert to code units.
    pub fn init(cfg: &Yaml, converter: &UnitConverter) -> Result<Self, ConfigError> {
        let gas_law = GasLaw::init(cfg)?;
        let cfl = cfg["cfl_criterion"]
            .as_f64()
            .ok_or(ConfigError::MissingParameter(
                "hydrodynamics:cfl_criterion".to_string(),
            ))?;
        let mu = cfg["mean_molecular_mass"].as_f64().unwrap_or(1.);
        let specific_gas_constant = converter.to_code_units(
            BOLTZMANN_K_IN_CGS / (mu * HYDROGEN_MASS_IN_CGS),
            0,
            2,
            -2,
        );
        let density_floor = cfg["density_floor"]
            .as_f64()
            .ok_or(ConfigError::MissingParameter(
                "hydrodynamics:density_floor".to_string(),
            ))?;
        let density_floor = converter.to_code_units(density_floor, 1, -3, 0);
        let pressure_floor = match (
            cfg["pressure_floor"].as_f64(),
            cfg["temperature_floor"].as_f64(),
        ) {
            (Some(pressure_floor), _) => converter.to_code_units(pressure_floor, 1, -1, -2),
            (None, Some(temperature_floor)) => {
                0.1 * specific_gas_constant * density_floor * temperature_floor
            }
            (None, None) => {
                return Err(ConfigError::MissingParameter(
                    "hydrodynamics:pressure_floor".to_string(),
                ))
            }
        };

        Self::new(
            gas_law,
            cfl,
            density_floor,
            pressure_floor,
            specific_gas_constant,
        )
    }

    pub fn gas_law(&self) -> &GasLaw {
        &self.gas_law
    }

    pub fn cfl(&self) -> f64 {
        self.cfl
    }

    pub fn density_floor(&self) -> f64 {
        self.density_floor
    }

    pub fn pressure_floor(&self) -> f64 {
        self.pressure_floor
    }

    pub fn specific_gas_constant(&self) -> f64 {
        self.specific_gas_constant
    }

    /// Gas temperature (in K) of a given pressure and density.
    pub fn temperature(&self, pressure: f64, density: f64) -> f64 {
        pressure / (density * self.specific_gas_constant)
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use yaml_rust::YamlLoader;

    use super::*;

    #[test]
    fn test_floors_from_temperature() {
        let cfg = &YamlLoader::load_from_str(
            "gamma: 1.6666667\ncfl_criterion: 0.4\ndensity_floor: 1.0e-26\ntemperature_floor: 10.0",
        )
        .unwrap()[0];
        let converter =
            UnitConverter::new(PARSEC_IN_CGS, SOLAR_MASS_IN_CGS, 1000. * YEAR_IN_CGS).unwrap();
        let constants = HydroConstants::init(cfg, &converter).unwrap();

        let density_floor = converter.to_code_units(1.0e-26, 1, -3, 0);
        assert_approx_eq!(f64, constants.density_floor(), density_floor, ulps = 4);
        assert_approx_eq!(
            f64,
            constants.pressure_floor(),
            0.1 * constants.specific_gas_constant() * density_floor * 10.,
            ulps = 4
        );
        assert_approx_eq!(
            f64,
            constants.temperature(constants.pressure_floor(), density_floor),
            1.,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_invalid_constants() {
        let gas_law = GasLaw::new(1.4);
        assert!(HydroConstants::new(gas_law, 1.2, 1e-8, 1e-8, 1.).is_err());
        assert!(HydroConstants::new(gas_law, 0.4, 0., 1e-8, 1.).is_err());
        assert!(HydroConstants::new(gas_law, 0.4, 1e-8, f64::NAN, 1.).is_err());
        assert!(HydroConstants::new(gas_law, 0.4, 1e-8, 1e-8, 1.).is_ok());

        let cfg = &YamlLoader::load_from_str("gamma: 1.4\ncfl_criterion: 0.4\ndensity_floor: 1.0e-8")
            .unwrap()[0];
        assert!(matches!(
            HydroConstants::init(cfg, &UnitConverter::default()),
            Err(ConfigError::MissingParameter(_))
        ));
    }
}
