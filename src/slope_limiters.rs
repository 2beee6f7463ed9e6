use yaml_rust::Yaml;

use crate::{
    errors::ConfigError,
    physical_quantities::{State, N_QUANTITIES},
};

/// Limited slope of a quantity from three consecutive cell values along one axis.
///
/// Every limiter returns zero for a constant triple and at a local extremum, and otherwise a
/// slope with the sign of the central difference whose magnitude is at most twice the smallest
/// one-sided difference, so the face values `center -/+ slope / 2` stay within the range of the
/// three inputs.
pub trait SlopeLimiter: Send + Sync {
    fn limit(&self, left: f64, center: f64, right: f64) -> f64;

    fn name(&self) -> &'static str;
}

/// Apply the limiter to every component of a state vector.
pub(crate) fn limit_state<T, L: SlopeLimiter + ?Sized>(
    limiter: &L,
    left: &State<T>,
    center: &State<T>,
    right: &State<T>,
) -> State<T> {
    let mut slope = State::<T>::vacuum();
    for i in 0..N_QUANTITIES {
        slope[i] = limiter.limit(left[i], center[i], right[i]);
    }
    slope
}

fn minmod(a: f64, b: f64) -> f64 {
    if a * b <= 0. {
        0.
    } else if a.abs() < b.abs() {
        a
    } else {
        b
    }
}

/// Most diffusive TVD limiter.
pub struct MinMod;

impl SlopeLimiter for MinMod {
    fn limit(&self, left: f64, center: f64, right: f64) -> f64 {
        minmod(center - left, right - center)
    }

    fn name(&self) -> &'static str {
        "minmod"
    }
}

/// Harmonic mean of the one-sided differences.
pub struct VanLeer;

impl SlopeLimiter for VanLeer {
    fn limit(&self, left: f64, center: f64, right: f64) -> f64 {
        let dl = center - left;
        let dr = right - center;
        let prod = dl * dr;
        if prod <= 0. {
            0.
        } else {
            2. * prod / (dl + dr)
        }
    }

    fn name(&self) -> &'static str {
        "van_leer"
    }
}

/// Roe's superbee: the most compressive limiter within the TVD region.
pub struct Superbee;

impl SlopeLimiter for Superbee {
    fn limit(&self, left: f64, center: f64, right: f64) -> f64 {
        let dl = center - left;
        let dr = right - center;
        if dl * dr <= 0. {
            return 0.;
        }
        let s1 = minmod(2. * dl, dr);
        let s2 = minmod(dl, 2. * dr);
        if s1.abs() > s2.abs() {
            s1
        } else {
            s2
        }
    }

    fn name(&self) -> &'static str {
        "superbee"
    }
}

/// Van Leer's monotonized central-difference limiter.
pub struct MonotonizedCentral;

impl SlopeLimiter for MonotonizedCentral {
    fn limit(&self, left: f64, center: f64, right: f64) -> f64 {
        let dl = center - left;
        let dr = right - center;
        if dl * dr <= 0. {
            return 0.;
        }
        minmod(0.5 * (dl + dr), minmod(2. * dl, 2. * dr))
    }

    fn name(&self) -> &'static str {
        "monotonized_central"
    }
}

pub fn slope_limiter_from_name(name: &str) -> Result<Box<dyn SlopeLimiter>, ConfigError> {
    Ok(match name {
        "minmod" => Box::new(MinMod),
        "van_leer" => Box::new(VanLeer),
        "superbee" => Box::new(Superbee),
        "monotonized_central" => Box::new(MonotonizedCentral),
        _ => return Err(ConfigError::UnknownSlopeLimiter(name.to_string())),
    })
}

/// Read the `slope_limiter` section of the hydrodynamics configuration.
pub fn init_slope_limiter(cfg: &Yaml) -> Result<Box<dyn SlopeLimiter>, ConfigError> {
    let kind = cfg["kind"]
        .as_str()
        .ok_or(ConfigError::MissingParameter(
            "hydrodynamics:slope_limiter:kind".to_string(),
        ))?;
    slope_limiter_from_name(kind)
}
