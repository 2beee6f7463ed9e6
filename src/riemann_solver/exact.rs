use glam::DVec3;

use crate::{
    errors::{RiemannError, Side},
    gas_law::GasLaw,
    physical_quantities::{Primitive, State},
};

use super::{
    check_state, flux_from_half_state, RiemannFlux, RiemannSolver, RiemannStarSolver,
    RiemannStarValues, VacuumRiemannSolver,
};

const TOLERANCE: f64 = 1e-8;
const MAX_NEWTON_ITERATIONS: usize = 1000;

/// Exact iterative Riemann solver (Toro, chapter 4).
pub struct ExactRiemannSolver;

impl ExactRiemannSolver {
    /// Functions (4.6) and (4.7) in Toro.
    fn fb(p: f64, state: &State<Primitive>, a: f64, gas_law: &GasLaw) -> f64 {
        let gamma = gas_law.gamma();
        if p > state.pressure() {
            let cap_a = gamma.tdgp1() / state.density();
            let cap_b = gamma.gm1dgp1() * state.pressure();
            (p - state.pressure()) * (cap_a / (p + cap_b)).sqrt()
        } else {
            gamma.tdgm1() * a * ((p / state.pressure()).powf(gamma.gm1d2g()) - 1.)
        }
    }

    /// Function (4.5) in Toro
    fn f(
        p: f64,
        left: &State<Primitive>,
        right: &State<Primitive>,
        v_l: f64,
        v_r: f64,
        a_l: f64,
        a_r: f64,
        gas_law: &GasLaw,
    ) -> f64 {
        Self::fb(p, left, a_l, gas_law) + Self::fb(p, right, a_r, gas_law) + (v_r - v_l)
    }

    /// Function (4.37) in Toro
    fn fprimeb(p: f64, state: &State<Primitive>, a: f64, gas_law: &GasLaw) -> f64 {
        let gamma = gas_law.gamma();
        if p > state.pressure() {
            let cap_a = gamma.tdgp1() / state.density();
            let cap_b = gamma.gm1dgp1() * state.pressure();
            (1. - 0.5 * (p - state.pressure()) / (cap_b + p)) * (cap_a / (p + cap_b)).sqrt()
        } else {
            1. / state.density() / a * (p / state.pressure()).powf(-gamma.gm1d2g())
        }
    }

    /// The derivative of f w.r.t. p
    fn fprime(
        p: f64,
        left: &State<Primitive>,
        right: &State<Primitive>,
        a_l: f64,
        a_r: f64,
        gas_law: &GasLaw,
    ) -> f64 {
        Self::fprimeb(p, left, a_l, gas_law) + Self::fprimeb(p, right, a_r, gas_law)
    }

    /// Bottom function of (4.48) in Toro
    fn gb(p: f64, state: &State<Primitive>, gas_law: &GasLaw) -> f64 {
        let gamma = gas_law.gamma();
        let cap_a = gamma.tdgp1() / state.density();
        let cap_b = gamma.gm1dgp1() * state.pressure();
        (cap_a / (p + cap_b)).sqrt()
    }

    /// Get a good first guess for the pressure in the iterative scheme
    ///
    /// This function is based on (4.47) and (4.48) in Toro and on the
    /// FORTRAN code provided in Toro p.156-157
    fn guess_p(
        left: &State<Primitive>,
        right: &State<Primitive>,
        v_l: f64,
        v_r: f64,
        a_l: f64,
        a_r: f64,
        gas_law: &GasLaw,
    ) -> f64 {
        let gamma = gas_law.gamma();
        let p_min = left.pressure().min(right.pressure());
        let p_max = left.pressure().max(right.pressure());
        let q_max = p_max / p_min;
        let ppv = 0.5 * (left.pressure() + right.pressure())
            - 0.125 * (v_r - v_l) * (left.density() + right.density()) * (a_l + a_r);
        let ppv = ppv.max(TOLERANCE);
        let p_guess = if q_max <= 2. && p_min <= ppv && ppv <= p_max {
            ppv
        } else if ppv < p_min {
            // two rarefactions
            let base = (a_l + a_r - 0.5 * (gamma.gamma() - 1.) * (v_r - v_l))
                / (a_l / left.pressure().powf(gamma.gm1d2g())
                    + a_r / right.pressure().powf(gamma.gm1d2g()));
            base.powf(gamma.gamma() * gamma.tdgm1())
        } else {
            // two shocks
            let g_l = Self::gb(ppv, left, gas_law);
            let g_r = Self::gb(ppv, right, gas_law);
            (g_l * left.pressure() + g_r * right.pressure() - v_r + v_l) / (g_l + g_r)
        };

        p_guess.max(TOLERANCE)
    }

    /// Find the zeropoint of f(p) using Brent's method
    fn solve_brent(
        lower_lim: f64,
        upper_lim: f64,
        low_f: f64,
        up_f: f64,
        error_tol: f64,
        left: &State<Primitive>,
        right: &State<Primitive>,
        v_l: f64,
        v_r: f64,
        a_l: f64,
        a_r: f64,
        gas_law: &GasLaw,
    ) -> f64 {
        let mut a = lower_lim;
        let mut b = upper_lim;
        let mut c;
        let mut d = f64::INFINITY;

        let mut fa = low_f;
        let mut fb = up_f;
        let mut fc;

        let mut s;
        let mut fs;

        debug_assert!(
            fa * fb <= 0.,
            "Brent's method was called with equal sign function values!"
        );

        // if |f(a)| < |f(b)| then swap (a,b)
        if fa.abs() < fb.abs() {
            (a, b) = (b, a);
            (fa, fb) = (fb, fa);
        }

        c = a;
        fc = fa;
        let mut mflag = true;

        while fb != 0. && (a - b).abs() > error_tol * 0.5 * (a + b) {
            s = if fa != fc && fb != fc {
                // Inverse quadratic interpolation
                a * fb * fc / (fa - fb) / (fa - fc)
                    + b * fa * fc / (fb - fa) / (fb - fc)
                    + c * fa * fb / (fc - fa) / (fc - fb)
            } else {
                // Secant rule
                b - fb * (b - a) / (fb - fa)
            };

            let tmp = 0.25 * (3. * a + b);

            if !((s > tmp && s < b) || (s < tmp && s > b))
                || (mflag && (s - b).abs() >= (0.5 * (b - c).abs()))
                || (!mflag && (s - b).abs() >= (0.5 * (c - d).abs()))
                || (mflag && (b - c).abs() < 0.5 * error_tol * (b + c))
                || (!mflag && (c - d).abs() < 0.5 * error_tol * (c + d))
            {
                s = 0.5 * (a + b);
                mflag = true;
            } else {
                mflag = false;
            }

            fs = Self::f(s, left, right, v_l, v_r, a_l, a_r, gas_law);
            d = c;
            c = b;
            fc = fb;
            if fa * fs < 0. {
                b = s;
                fb = fs;
            } else {
                a = s;
                fa = fs;
            }

            // if |f(a)| < |f(b)| then swap (a,b)
            if fa.abs() < fb.abs() {
                (a, b) = (b, a);
                (fa, fb) = (fb, fa);
            }
        }

        b
    }

    fn middle_density(p: f64, state: &State<Primitive>, gas_law: &GasLaw) -> f64 {
        let gamma = gas_law.gamma();
        let pdps = p / state.pressure();
        if pdps > 1. {
            // shock
            state.density() * (pdps + gamma.gm1dgp1()) / (gamma.gm1dgp1() * pdps + 1.)
        } else {
            // rarefaction
            state.density() * pdps.powf(1. / gamma.gamma())
        }
    }

    /// Speeds of the outermost left and right waves: shock speeds or rarefaction heads.
    fn wave_speeds(
        star: &RiemannStarValues,
        left: &State<Primitive>,
        right: &State<Primitive>,
        v_l: f64,
        v_r: f64,
        a_l: f64,
        a_r: f64,
        gas_law: &GasLaw,
    ) -> (f64, f64) {
        let gp1d2g = 0.5 * gas_law.gamma().gp1dg();
        let gm1d2g = gas_law.gamma().gm1d2g();
        let s_l = if star.p > left.pressure() {
            v_l - a_l * (gp1d2g * star.p / left.pressure() + gm1d2g).sqrt()
        } else {
            v_l - a_l
        };
        let s_r = if star.p > right.pressure() {
            v_r + a_r * (gp1d2g * star.p / right.pressure() + gm1d2g).sqrt()
        } else {
            v_r + a_r
        };
        (s_l, s_r)
    }

    /// Sample the self-similar solution of a non-vacuum problem at `x / t = xi`
    /// (Toro, section 4.5).
    pub fn sample(
        star: &RiemannStarValues,
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
        let gm1d2g = gas_law.gamma().gm1d2g();
        let (s_l, s_r) = Self::wave_speeds(star, left, right, v_l, v_r, a_l, a_r, gas_law);
        let star_state = |state: &State<Primitive>, v: f64, density: f64| {
            State::<Primitive>::new(
                density,
                state.velocity() + (star.u - v) * n_unit,
                star.p,
            )
            .with_passive_scalar(state.passive_scalar())
        };

        if xi <= star.u {
            if star.p > left.pressure() {
                // left shock
                if xi <= s_l {
                    *left
                } else {
                    star_state(left, v_l, star.rho_l)
                }
            } else {
                // left rarefaction
                let s_tail = star.u - a_l * (star.p / left.pressure()).powf(gm1d2g);
                if xi <= s_l {
                    *left
                } else if xi >= s_tail {
                    star_state(left, v_l, star.rho_l)
                } else {
                    VacuumRiemannSolver::sample_fan(left, v_l, a_l, xi, n_unit, gas_law)
                }
            }
        } else if star.p > right.pressure() {
            // right shock
            if xi >= s_r {
                *right
            } else {
                star_state(right, v_r, star.rho_r)
            }
        } else {
            // right rarefaction
            let s_tail = star.u + a_r * (star.p / right.pressure()).powf(gm1d2g);
            if xi >= s_r {
                *right
            } else if xi <= s_tail {
                star_state(right, v_r, star.rho_r)
            } else {
                VacuumRiemannSolver::sample_fan(right, v_r, -a_r, xi, n_unit, gas_law)
            }
        }
    }

    /// Exact solution of the Riemann problem between `left` and `right` at `x / t = xi`.
    pub fn sample_at(
        &self,
        left: &State<Primitive>,
        right: &State<Primitive>,
        n_unit: DVec3,
        gas_law: &GasLaw,
        xi: f64,
    ) -> Result<State<Primitive>, RiemannError> {
        check_state(left, Side::Left)?;
        check_state(right, Side::Right)?;

        let v_l = left.velocity().dot(n_unit);
        let v_r = right.velocity().dot(n_unit);
        let a_l = gas_law.sound_speed(left.pressure(), left.density());
        let a_r = gas_law.sound_speed(right.pressure(), right.density());

        if VacuumRiemannSolver::is_vacuum(a_l, a_r, v_r - v_l, gas_law) {
            return Ok(VacuumRiemannSolver::sample_at(
                left, right, v_l, v_r, a_l, a_r, n_unit, gas_law, xi,
            ));
        }
        let star = self.solve_for_star_state(left, right, v_l, v_r, a_l, a_r, gas_law);
        Ok(Self::sample(
            &star, left, right, v_l, v_r, a_l, a_r, n_unit, gas_law, xi,
        ))
    }
}

impl RiemannStarSolver for ExactRiemannSolver {
    fn solve_for_star_state(
        &self,
        left: &State<Primitive>,
        right: &State<Primitive>,
        v_l: f64,
        v_r: f64,
        a_l: f64,
        a_r: f64,
        gas_law: &GasLaw,
    ) -> RiemannStarValues {
        /* We normally use a Newton-Raphson iteration to find the zeropoint
        of f(p), but if pstar is close to 0, we risk negative p values.
        Since f(p) is undefined for negative pressures, we don't
        want this to happen.
        We therefore switch to Brent's method as soon as the guess overshoots
        the root, which gives a bracketing interval [0, p_guess]. */
        let mut p = 0.;
        let mut p_guess = Self::guess_p(left, right, v_l, v_r, a_l, a_r, gas_law);
        let fp = Self::f(p, left, right, v_l, v_r, a_l, a_r, gas_law);
        let mut fp_guess = Self::f(p_guess, left, right, v_l, v_r, a_l, a_r, gas_law);
        if fp * fp_guess >= 0. {
            // Newton-Raphson until convergence or until suitable interval is found
            // to use Brent's method
            let mut counter = 0;
            while (p - p_guess).abs() > TOLERANCE * 0.5 * (p + p_guess) && fp_guess < 0.0 {
                p = p_guess;
                p_guess -= fp_guess / Self::fprime(p_guess, left, right, a_l, a_r, gas_law);
                fp_guess = Self::f(p_guess, left, right, v_l, v_r, a_l, a_r, gas_law);
                counter += 1;
                if counter > MAX_NEWTON_ITERATIONS {
                    log::warn!("Newton-Raphson iteration for p* did not converge, continuing with p = {p_guess}");
                    break;
                }
            }
        }

        // As soon as there is a suitable interval: use Brent's method
        if (p - p_guess).abs() > TOLERANCE * 0.5 * (p + p_guess) && fp_guess > 0. {
            // bracket [0, p_guess]; fp already holds f(0)
            p = Self::solve_brent(
                0., p_guess, fp, fp_guess, TOLERANCE, left, right, v_l, v_r, a_l, a_r, gas_law,
            );
        } else {
            p = p_guess;
        }

        // calculate the velocity in the intermediate state
        let u = 0.5 * (v_l + v_r)
            + 0.5 * (Self::fb(p, right, a_r, gas_law) - Self::fb(p, left, a_l, gas_law));

        // calculate the left and right intermediate densities
        let rho_l = Self::middle_density(p, left, gas_law);
        let rho_r = Self::middle_density(p, right, gas_law);

        RiemannStarValues { rho_l, rho_r, u, p }
    }
}

impl RiemannSolver for ExactRiemannSolver {
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

        let (half, (s_l, s_r)) = if VacuumRiemannSolver::is_vacuum(a_l, a_r, v_r - v_l, gas_law) {
            (
                VacuumRiemannSolver::sample_at(
                    left, right, v_l, v_r, a_l, a_r, n_unit, gas_law, 0.,
                ),
                VacuumRiemannSolver::wave_speeds(v_l, v_r, a_l, a_r),
            )
        } else {
            let star = self.solve_for_star_state(left, right, v_l, v_r, a_l, a_r, gas_law);
            (
                Self::sample(&star, left, right, v_l, v_r, a_l, a_r, n_unit, gas_law, 0.),
                Self::wave_speeds(&star, left, right, v_l, v_r, a_l, a_r, gas_law),
            )
        };

        Ok(RiemannFlux {
            flux: flux_from_half_state(&half, n_unit, gas_law),
            max_wave_speed: s_l.abs().max(s_r.abs()),
        })
    }

    fn name(&self) -> &'static str {
        "Exact"
    }
}
