use common::{
    get_engine, get_fluid, get_hydro, get_hydro_with, get_hydro_with_cfl, HYDRO_CONFIG, OUTFLOW_CONFIG,
    SOD_GRID_CONFIG, TIME_INTEGRATION_CONFIG,
};
use float_cmp::assert_approx_eq;
use glam::DVec3;
use grid_hydro::{
    gas_law::GasLaw,
    physical_quantities::{Primitive, State},
    riemann_solver::ExactRiemannSolver,
    Fluid, Hydrodynamics,
};

mod common;

struct L1Errors {
    density: f64,
    velocity: f64,
    pressure: f64,
}

/// Mean absolute deviation from the analytic solution of the Sod shock tube.
fn l1_errors(fluid: &Fluid, time: f64) -> L1Errors {
    let gas_law = &GasLaw::new(1.4);
    let left = State::<Primitive>::new(1., DVec3::ZERO, 1.);
    let right = State::<Primitive>::new(0.125, DVec3::ZERO, 0.1);
    let mut errors = L1Errors {
        density: 0.,
        velocity: 0.,
        pressure: 0.,
    };
    let mut count = 0;
    for (position, cell) in fluid.real_cells() {
        let xi = (position.x - 0.5) / time;
        let exact = ExactRiemannSolver
            .sample_at(&left, &right, DVec3::X, gas_law, xi)
            .expect("Valid Sod states");
        let w = &cell.primitives;
        errors.density += (w.density() - exact.density()).abs();
        errors.velocity += (w.velocity().x - exact.velocity().x).abs();
        errors.pressure += (w.pressure() - exact.pressure()).abs();
        count += 1;
    }
    L1Errors {
        density: errors.density / count as f64,
        velocity: errors.velocity / count as f64,
        pressure: errors.pressure / count as f64,
    }
}

fn run_sod(hydro: Hydrodynamics) -> (Fluid, f64) {
    let mut fluid = get_fluid(SOD_GRID_CONFIG, OUTFLOW_CONFIG, "sodshock", &hydro);
    let mut engine = get_engine(TIME_INTEGRATION_CONFIG, hydro);
    let summary = engine.run(&mut fluid).expect("Sod shock tube should not fail");
    assert_approx_eq!(f64, summary.time, 0.1, epsilon = 1e-12);
    (fluid, summary.time)
}

#[test]
fn test_sod_shock_second_order() {
    let (fluid, time) = run_sod(get_hydro(HYDRO_CONFIG));
    let errors = l1_errors(&fluid, time);
    assert!(errors.density < 0.02, "density L1 error {}", errors.density);
    assert!(errors.velocity < 0.03, "velocity L1 error {}", errors.velocity);
    assert!(errors.pressure < 0.02, "pressure L1 error {}", errors.pressure);

    // undisturbed gas far from the initial discontinuity
    let (_, first) = fluid.real_cells().next().unwrap();
    assert_approx_eq!(f64, first.primitives.density(), 1., epsilon = 1e-12);
    let (_, last) = fluid.real_cells().last().unwrap();
    assert_approx_eq!(f64, last.primitives.pressure(), 0.1, epsilon = 1e-12);
}

#[test]
fn test_sod_shock_all_solvers() {
    for solver in ["Exact", "HLLC", "HLL", "Roe"] {
        let (fluid, time) = run_sod(get_hydro_with(solver, "minmod", 1, 2));
        let errors = l1_errors(&fluid, time);
        assert!(
            errors.density < 0.025,
            "{solver}: density L1 error {}",
            errors.density
        );
        assert!(
            errors.pressure < 0.025,
            "{solver}: pressure L1 error {}",
            errors.pressure
        );
    }
}

#[test]
fn test_sod_shock_first_order() {
    let (fluid, time) = run_sod(get_hydro_with("Exact", "minmod", 0, 1));
    let errors = l1_errors(&fluid, time);
    assert!(errors.density < 0.04, "density L1 error {}", errors.density);
    assert!(errors.pressure < 0.04, "pressure L1 error {}", errors.pressure);
}

#[test]
fn test_sod_shock_high_cfl() {
    for solver in ["Exact", "HLLC", "HLL", "Roe"] {
        let (fluid, time) = run_sod(get_hydro_with_cfl(solver, "minmod", 0, 1, 0.9));
        let errors = l1_errors(&fluid, time);
        assert!(
            errors.density < 0.05,
            "{solver}: density L1 error {}",
            errors.density
        );
        assert!(
            errors.pressure < 0.05,
            "{solver}: pressure L1 error {}",
            errors.pressure
        );
    }
}

#[test]
fn test_contact_carries_passive_scalar() {
    let (fluid, time) = run_sod(get_hydro(HYDRO_CONFIG));
    // contact moves at the star velocity 0.92745
    let contact = 0.5 + 0.92745 * time;
    for (position, cell) in fluid.real_cells() {
        let scalar = cell.primitives.passive_scalar();
        if position.x < contact - 0.08 {
            assert_approx_eq!(f64, scalar, 1., epsilon = 1e-3);
        } else if position.x > contact + 0.08 {
            assert_approx_eq!(f64, scalar, 0., epsilon = 1e-3);
        }
    }
}
