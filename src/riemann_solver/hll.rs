use glam::DVec3;

use crate::{
    errors::{RiemannError, Side},
    gas_law::GasLaw,
    physical_quantities::{Conserved, Primitive, State},
};

use super::{check_state, roe::RoeAverage, upwind_passive_scalar, RiemannFlux, RiemannSolver};

/// Two-wave HLL solver with Einfeldt's wave speed estimates.
pub struct HLLRiemannSolver;

/// HLL flux (10.21 in Toro) between two valid states.
///
/// With a Roe average available the signal speeds are Einfeldt's estimates, which keep the
/// scheme positivity preserving; otherwise Davis' estimates are used.
pub(super) fn hll_flux(
    left: &State<Primitive>,
    right: &State<Primitive>,
    n_unit: DVec3,
    gas_law: &GasLaw,
    roe: Option<&RoeAverage>,
) -> RiemannFlux {
    let v_l = left.velocity().dot(n_unit);
    let v_r = right.velocity().dot(n_unit);
    let a_l = gas_law.sound_speed(left.pressure(), left.density());
    let a_r = gas_law.sound_speed(right.pressure(), right.density());

    let (s_l, s_r) = match roe {
        Some(roe) => {
            let u_n = roe.velocity.dot(n_unit);
            (
                (v_l - a_l).min(u_n - roe.sound_speed),
                (v_r + a_r).max(u_n + roe.sound_speed),
            )
        }
        None => ((v_l - a_l).min(v_r - a_r), (v_l + a_l).max(v_r + a_r)),
    };
    let max_wave_speed = s_l.abs().max(s_r.abs());

    let flux = if s_l >= 0. {
        left.flux(n_unit, gas_law)
    } else if s_r <= 0. {
        right.flux(n_unit, gas_law)
    } else {
        let u_l = State::<Conserved>::from_primitives(left, gas_law);
        let u_r = State::<Conserved>::from_primitives(right, gas_law);
        let f_l = left.flux(n_unit, gas_law);
        let f_r = right.flux(n_unit, gas_law);
        (1. / (s_r - s_l)) * (s_r * f_l - s_l * f_r + s_l * s_r * (u_r - u_l))
    };

    RiemannFlux {
        flux: upwind_passive_scalar(flux, left, right),
        max_wave_speed,
    }
}

impl RiemannSolver for HLLRiemannSolver {
    fn resolve(
        &self,
        left: &State<Primitive>,
        right: &State<Primitive>,
        n_unit: DVec3,
        gas_law: &GasLaw,
    ) -> Result<RiemannFlux, RiemannError> {
        check_state(left, Side::Left)?;
        check_state(right, Side::Right)?;

        let roe = RoeAverage::new(left, right, gas_law);
        Ok(hll_flux(left, right, n_unit, gas_law, roe.as_ref()))
    }

    fn name(&self) -> &'static str {
        "HLL"
    }
}
