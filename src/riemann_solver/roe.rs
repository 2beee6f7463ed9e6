use glam::DVec3;

use crate::{
    errors::{RiemannError, Side},
    gas_law::GasLaw,
    physical_quantities::{Conserved, Primitive, State},
};

use super::{check_state, hll::hll_flux, upwind_passive_scalar, RiemannFlux, RiemannSolver};

/// Roe-averaged state between two valid primitive states (11.60 in Toro).
#[derive(Debug, Clone, Copy)]
pub(super) struct RoeAverage {
    pub density: f64,
    pub velocity: DVec3,
    pub enthalpy: f64,
    pub sound_speed: f64,
}

impl RoeAverage {
    /// `None` if the averaged sound speed is not real.
    pub fn new(left: &State<Primitive>, right: &State<Primitive>, gas_law: &GasLaw) -> Option<Self> {
        let enthalpy = |state: &State<Primitive>| {
            let conserved = State::<Conserved>::from_primitives(state, gas_law);
            (conserved.energy() + state.pressure()) / state.density()
        };
        let w_l = left.density().sqrt();
        let w_r = right.density().sqrt();
        let norm = 1. / (w_l + w_r);
        let velocity = norm * (w_l * left.velocity() + w_r * right.velocity());
        let enthalpy = norm * (w_l * enthalpy(left) + w_r * enthalpy(right));
        let a2 = (gas_law.gamma().gamma() - 1.) * (enthalpy - 0.5 * velocity.length_squared());
        (a2 > 0.).then(|| Self {
            density: w_l * w_r,
            velocity,
            enthalpy,
            sound_speed: a2.sqrt(),
        })
    }
}

/// Roe's linearised solver with Harten's entropy fix on the acoustic waves.
///
/// Falls back to the HLL flux when the linearisation produces intermediate states with
/// non-positive density or thermal energy.
pub struct RoeRiemannSolver {
    /// Width of the entropy fix in units of the averaged sound speed.
    entropy_fix: f64,
}

impl Default for RoeRiemannSolver {
    fn default() -> Self {
        Self { entropy_fix: 0.1 }
    }
}

impl RoeRiemannSolver {
    pub fn new(entropy_fix: f64) -> Self {
        Self {
            entropy_fix: entropy_fix.max(0.),
        }
    }

    fn fixed_speed(&self, lambda: f64, sound_speed: f64) -> f64 {
        let delta = self.entropy_fix * sound_speed;
        if lambda.abs() < delta {
            0.5 * (lambda * lambda + delta * delta) / delta
        } else {
            lambda.abs()
        }
    }
}

fn is_physical(state: &State<Conserved>) -> bool {
    state.mass() > 0. && state.thermal_energy() > 0.
}

impl RiemannSolver for RoeRiemannSolver {
    fn resolve(
        &self,
        left: &State<Primitive>,
        right: &State<Primitive>,
        n_unit: DVec3,
        gas_law: &GasLaw,
    ) -> Result<RiemannFlux, RiemannError> {
        check_state(left, Side::Left)?;
        check_state(right, Side::Right)?;

        let Some(roe) = RoeAverage::new(left, right, gas_law) else {
            return Ok(hll_flux(left, right, n_unit, gas_law, None));
        };

        let u_n = roe.velocity.dot(n_unit);
        let a = roe.sound_speed;
        let a2 = a * a;

        // wave strengths
        let d_rho = right.density() - left.density();
        let d_p = right.pressure() - left.pressure();
        let d_v = right.velocity() - left.velocity();
        let d_v_n = d_v.dot(n_unit);
        let alpha_1 = 0.5 * (d_p - roe.density * a * d_v_n) / a2;
        let alpha_5 = 0.5 * (d_p + roe.density * a * d_v_n) / a2;
        let alpha_2 = d_rho - d_p / a2;
        let shear = roe.density * (d_v - d_v_n * n_unit);

        // right eigenvectors
        let k_1 = State::<Conserved>::new(1., roe.velocity - a * n_unit, roe.enthalpy - u_n * a);
        let k_5 = State::<Conserved>::new(1., roe.velocity + a * n_unit, roe.enthalpy + u_n * a);
        let k_2 = State::<Conserved>::new(1., roe.velocity, 0.5 * roe.velocity.length_squared());
        let k_shear = State::<Conserved>::new(0., shear, roe.velocity.dot(shear));

        let u_l = State::<Conserved>::from_primitives(left, gas_law);
        let u_r = State::<Conserved>::from_primitives(right, gas_law);
        if !is_physical(&(u_l + alpha_1 * k_1)) || !is_physical(&(u_r - alpha_5 * k_5)) {
            return Ok(hll_flux(left, right, n_unit, gas_law, Some(&roe)));
        }

        let dissipation = (self.fixed_speed(u_n - a, a) * alpha_1) * k_1
            + u_n.abs() * (alpha_2 * k_2 + k_shear)
            + (self.fixed_speed(u_n + a, a) * alpha_5) * k_5;
        let flux = 0.5 * (left.flux(n_unit, gas_law) + right.flux(n_unit, gas_law))
            - 0.5 * dissipation;

        let v_l = left.velocity().dot(n_unit);
        let v_r = right.velocity().dot(n_unit);
        let a_l = gas_law.sound_speed(left.pressure(), left.density());
        let a_r = gas_law.sound_speed(right.pressure(), right.density());
        let max_wave_speed = (u_n.abs() + a)
            .max(v_l.abs() + a_l)
            .max(v_r.abs() + a_r);

        Ok(RiemannFlux {
            flux: upwind_passive_scalar(flux, left, right),
            max_wave_speed,
        })
    }

    fn name(&self) -> &'static str {
        "Roe"
    }
}
