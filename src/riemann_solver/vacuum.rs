use glam::DVec3;

use crate::{
    gas_law::GasLaw,
    physical_quantities::{Primitive, State},
};

/// Exact solution of a Riemann problem whose rarefactions are strong enough to open a vacuum
/// between them.
pub struct VacuumRiemannSolver;

impl VacuumRiemannSolver {
    /// Pressure positivity condition (4.40) in Toro.
    pub fn is_vacuum(a_l: f64, a_r: f64, v_r_m_v_l: f64, gas_law: &GasLaw) -> bool {
        gas_law.gamma().tdgm1() * (a_l + a_r) <= v_r_m_v_l
    }

    /// State inside a rarefaction fan at `x / t = xi`.
    ///
    /// `a` is the sound speed of the undisturbed state for a left fan and minus that sound speed
    /// for a right fan.
    pub(super) fn sample_fan(
        state: &State<Primitive>,
        v: f64,
        a: f64,
        xi: f64,
        n_unit: DVec3,
        gas_law: &GasLaw,
    ) -> State<Primitive> {
        let gamma = gas_law.gamma();
        let base = gamma.tdgp1() + gamma.gm1dgp1() * (v - xi) / a;
        let v_half = gamma.tdgp1() * (a + v / gamma.tdgm1() + xi) - v;
        State::<Primitive>::new(
            state.density() * base.powf(gamma.tdgm1()),
            state.velocity() + n_unit * v_half,
            state.pressure() * base.powf(gamma.gamma() * gamma.tdgm1()),
        )
        .with_passive_scalar(state.passive_scalar())
    }

    /// Sample the self-similar solution at `x / t = xi`.
    ///
    /// Both states must be non-vacuum and satisfy [`Self::is_vacuum`].
    pub fn sample_at(
        left: &State<Primitive>,
        right: &State<Primitive>,
        v_l: f64,
        v_r: f64,
        a_l: f64,
        a_r: f64,
        n_unit: DVec3,
        gas_law: &GasLaw,
        xi: f64,
    ) -> State<Primitive> {
        debug_assert!(Self::is_vacuum(a_l, a_r, v_r - v_l, gas_law));

        let tdgm1 = gas_law.gamma().tdgm1();
        let s_tail_l = v_l + tdgm1 * a_l;
        let s_tail_r = v_r - tdgm1 * a_r;

        if xi <= s_tail_l {
            if xi <= v_l - a_l {
                *left
            } else {
                Self::sample_fan(left, v_l, a_l, xi, n_unit, gas_law)
            }
        } else if xi >= s_tail_r {
            if xi >= v_r + a_r {
                *right
            } else {
                Self::sample_fan(right, v_r, -a_r, xi, n_unit, gas_law)
            }
        } else {
            State::<Primitive>::vacuum()
        }
    }

    /// Heads of the two rarefactions.
    pub fn wave_speeds(v_l: f64, v_r: f64, a_l: f64, a_r: f64) -> (f64, f64) {
        (v_l - a_l, v_r + a_r)
    }
}
