use rayon::prelude::*;

use crate::{grid::Grid, physical_constants::HydroConstants};

/// CFL-limited time step: `min(dt_max, cfl * min(dx / (|v| + c)))` over all real cells and
/// active axes.
///
/// Cells with vanishing signal speed impose no constraint; if no cell does, `dt_max` is
/// returned.
pub fn calculate_time_step(dt_max: f64, grid: &Grid, constants: &HydroConstants) -> f64 {
    let gas_law = constants.gas_law();
    let axes = grid.active_axes();
    let dt_cfl = grid
        .par_real_cells()
        .filter_map(|(_, index, cell)| {
            let w = &cell.primitives;
            let signal_speed =
                w.velocity().length() + gas_law.sound_speed(w.pressure(), w.density());
            if signal_speed > 0. {
                axes.iter()
                    .map(|&axis| grid.cell_width(axis, index) / signal_speed)
                    .reduce(f64::min)
            } else {
                None
            }
        })
        .reduce(|| f64::INFINITY, f64::min);

    dt_max.min(constants.cfl() * dt_cfl)
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use glam::DVec3;

    use super::*;
    use crate::{
        gas_law::GasLaw,
        grid::{Cell, CellIndex, Geometry},
        physical_quantities::{Primitive, State},
    };

    fn constants() -> HydroConstants {
        HydroConstants::new(GasLaw::new(1.4), 0.4, 1e-8, 1e-8, 1.).unwrap()
    }

    fn grid_with(w: State<Primitive>, constants: &HydroConstants) -> Grid {
        let mut grid = Grid::new([10, 1, 1], 1., Geometry::Cartesian).unwrap();
        for cell in grid.cells_mut() {
            *cell = Cell::from_primitives(w, constants.gas_law());
        }
        grid
    }

    #[test]
    fn test_cfl_step() {
        let constants = constants();
        let grid = grid_with(State::<Primitive>::new(1., 0.5 * DVec3::X, 1.), &constants);
        let c = 1.4f64.sqrt();
        let expected = 0.4 * 0.1 / (0.5 + c);
        assert_approx_eq!(f64, calculate_time_step(1., &grid, &constants), expected);
        assert_approx_eq!(f64, calculate_time_step(1e-3, &grid, &constants), 1e-3);
    }

    #[test]
    fn test_zero_signal_speed() {
        let constants = constants();
        let mut grid = grid_with(State::<Primitive>::new(1., DVec3::ZERO, 1.), &constants);
        for cell in grid.cells_mut() {
            cell.primitives = State::<Primitive>::new(1., DVec3::ZERO, 0.);
        }
        assert_eq!(calculate_time_step(0.25, &grid, &constants), 0.25);
    }

    #[test]
    fn test_faster_cell_never_increases_step() {
        let constants = constants();
        let mut grid = grid_with(State::<Primitive>::new(1., DVec3::ZERO, 1.), &constants);
        let mut previous = calculate_time_step(1., &grid, &constants);
        for speed in [0.1, 0.5, 2., 10.] {
            grid.cell_mut(CellIndex([7, 0, 0])).primitives =
                State::<Primitive>::new(1., speed * DVec3::Y, 1.);
            let dt = calculate_time_step(1., &grid, &constants);
            assert!(dt <= previous);
            previous = dt;
        }
    }

    #[test]
    fn test_ghost_cells_are_ignored() {
        let constants = constants();
        let mut grid = grid_with(State::<Primitive>::new(1., DVec3::ZERO, 1.), &constants);
        let dt = calculate_time_step(1., &grid, &constants);
        grid.cell_mut(CellIndex([0, 0, 0])).primitives =
            State::<Primitive>::new(1., 100. * DVec3::X, 1.);
        assert_eq!(calculate_time_step(1., &grid, &constants), dt);
    }
}
