use glam::DVec3;

use crate::{
    errors::{RiemannError, Side},
    gas_law::GasLaw,
    physical_quantities::{Conserved, Primitive, State},
};

use super::*;

/// HLLC Riemann solver
pub struct HLLCRiemannSolver;

impl HLLCRiemannSolver {
    /// Star region state of the HLLC approximation on one side of the contact (10.39 in Toro).
    fn star_state(
        state: &State<Primitive>,
        conserved: &State<Conserved>,
        v: f64,
        s: f64,
        s_star: f64,
        n_unit: DVec3,
    ) -> State<Conserved> {
        let rho_inv = 1. / state.density();
        let starfac = state.density() * (s - v) / (s - s_star);
        let e_star = conserved.energy() * rho_inv
            + (s_star - v) * (s_star + state.pressure() / (state.density() * (s - v)));
        starfac
            * State::<Conserved>::new(1., (s_star - v) * n_unit + state.velocity(), e_star)
                .with_passive_scalar(state.passive_scalar())
    }
}

impl RiemannSolver for HLLCRiemannSolver {
    /// See Section 10.4, 10.5 and 10.6 in Toro (2009)
    fn resolve(
        &self,
        left: &State<Primitive>,
        right: &State<Primitive>,
        n_unit: DVec3,
        gas_law: &GasLaw,
    ) -> Result<RiemannFlux, RiemannError> {
        check_state(left, Side::Left)?;
        check_state(right, Side::Right)?;

        let v_l = left.velocity().dot(n_unit);
        let v_r = right.velocity().dot(n_unit);
        let a_l = gas_law.sound_speed(left.pressure(), left.density());
        let a_r = gas_law.sound_speed(right.pressure(), right.density());

        // velocity difference
        let v_r_m_v_l = v_r - v_l;

        // handle vacuum generation
        if VacuumRiemannSolver::is_vacuum(a_l, a_r, v_r_m_v_l, gas_law) {
            let w_half = VacuumRiemannSolver::sample_at(
                left, right, v_l, v_r, a_l, a_r, n_unit, gas_law, 0.,
            );
            let (s_l, s_r) = VacuumRiemannSolver::wave_speeds(v_l, v_r, a_l, a_r);
            return Ok(RiemannFlux {
                flux: flux_from_half_state(&w_half, n_unit, gas_law),
                max_wave_speed: s_l.abs().max(s_r.abs()),
            });
        }

        // STEP 1: Pressure estimate
        let ppvrs = 0.5 * (left.pressure() + right.pressure())
            - 0.125 * v_r_m_v_l * (left.density() + right.density()) * (a_l + a_r);
        let p_star = ppvrs.max(0.);

        // STEP 2: wave speed estimates
        let gp1dg = gas_law.gamma().gp1dg();
        let mut q_l = 1.;
        if p_star > left.pressure() {
            q_l = (1. + 0.5 * gp1dg * (p_star / left.pressure() - 1.)).sqrt();
        }
        let mut q_r = 1.;
        if p_star > right.pressure() {
            q_r = (1. + 0.5 * gp1dg * (p_star / right.pressure() - 1.)).sqrt();
        }

        let s_l_m_v_l = -a_l * q_l;
        let s_r_m_v_r = a_r * q_r;
        let s_l = s_l_m_v_l + v_l;
        let s_r = s_r_m_v_r + v_r;
        let s_star = (right.pressure() - left.pressure() + left.density() * v_l * s_l_m_v_l
            - right.density() * v_r * s_r_m_v_r)
            / (left.density() * s_l_m_v_l - right.density() * s_r_m_v_r);

        // STEP 3: HLLC flux
        let mut flux;
        if s_star >= 0. {
            // flux FL
            flux = left.flux(n_unit, gas_law);
            if s_l < 0. {
                // flux FL*
                let u_l = State::<Conserved>::from_primitives(left, gas_law);
                let u_star = Self::star_state(left, &u_l, v_l, s_l, s_star, n_unit);
                flux += s_l * (u_star - u_l);
            }
        } else {
            // flux FR
            flux = right.flux(n_unit, gas_law);
            if s_r > 0. {
                // flux FR*
                let u_r = State::<Conserved>::from_primitives(right, gas_law);
                let u_star = Self::star_state(right, &u_r, v_r, s_r, s_star, n_unit);
                flux += s_r * (u_star - u_r);
            }
        }
        debug_assert!(flux.mass().is_finite());

        Ok(RiemannFlux {
            flux,
            max_wave_speed: s_l.abs().max(s_r.abs()),
        })
    }

    fn name(&self) -> &'static str {
        "HLLC"
    }
}
