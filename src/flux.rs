use rayon::prelude::*;

use crate::{
    errors::HydroError,
    gas_law::GasLaw,
    grid::{Axis, CellIndex, Grid},
    physical_quantities::{Conserved, State},
    reconstruction::FaceStates,
    riemann_solver::RiemannSolver,
};

/// Numerical flux through the lower face of a cell along the sweep axis.
#[derive(Debug, Clone, Copy)]
pub struct FluxInfo {
    pub fluxes: State<Conserved>,
    pub v_max: f64,
}

impl FluxInfo {
    pub fn zero() -> Self {
        Self {
            fluxes: State::vacuum(),
            v_max: 0.,
        }
    }
}

/// Whether the lower face of the cell at `index` bounds a real cell along `axis`: transverse
/// coordinates are real and the axis coordinate runs over the real cells plus the first upper
/// ghost.
fn has_active_lower_face(grid: &Grid, index: CellIndex, axis: Axis) -> bool {
    Axis::ALL.into_iter().all(|other| {
        let range = grid.real_range(other);
        let i = index.0[other.index()];
        if other == axis {
            i >= range.start && i <= range.end
        } else {
            range.contains(&i)
        }
    })
}

/// Resolve the Riemann problem at every face bounding a real cell along `axis`.
///
/// The result is indexed by the linear index of the cell above the face. Face states are read
/// from the reconstruction buffers only, so no cell is read after it was updated.
///
/// Fails if a reconstructed state is rejected by the solver or if the signal speed of a cell
/// next to a face would let information cross more than one cell in `dt`.
pub fn compute_fluxes(
    grid: &Grid,
    faces: &[FaceStates],
    axis: Axis,
    dt: f64,
    riemann_solver: &dyn RiemannSolver,
    gas_law: &GasLaw,
) -> Result<Vec<FluxInfo>, HydroError> {
    let stride = grid.stride(axis);
    let n_unit = axis.unit();
    (0..grid.cells().len())
        .into_par_iter()
        .map(|linear| {
            let index = grid.cell_index(linear);
            if !has_active_lower_face(grid, index, axis) {
                return Ok(FluxInfo::zero());
            }
            let left = &faces[linear - stride].hi;
            let right = &faces[linear].lo;
            let riemann = riemann_solver
                .resolve(left, right, n_unit, gas_law)
                .map_err(|source| HydroError::InterfaceState {
                    index,
                    axis,
                    source,
                })?;

            // the time step is selected from |v| + c of the cells, not from solver estimates
            let signal_speed = [linear - stride, linear]
                .into_iter()
                .map(|i| {
                    let w = &grid.cells()[i].primitives;
                    w.velocity().dot(n_unit).abs() + gas_law.sound_speed(w.pressure(), w.density())
                })
                .fold(0., f64::max);
            let courant = signal_speed * dt / grid.cell_width(axis, index);
            if courant > 1. {
                return Err(HydroError::CflViolation {
                    index,
                    axis,
                    courant,
                });
            }

            Ok(FluxInfo {
                fluxes: riemann.flux,
                v_max: riemann.max_wave_speed,
            })
        })
        .collect()
}

/// Conservative update of the real cells from the face fluxes:
/// `Q -= dt / dx * (F_hi - F_lo)`.
///
/// Primitives are not refreshed here.
pub fn apply_fluxes(grid: &mut Grid, fluxes: &[FluxInfo], axis: Axis, dt: f64) {
    let stride = grid.stride(axis);
    // uniform cell widths
    let dt_over_dx = dt / grid.cell_width(axis, grid.cell_index(0));
    grid.par_real_cells_mut().for_each(|(linear, _, cell)| {
        let flux_lo = &fluxes[linear].fluxes;
        let flux_hi = &fluxes[linear + stride].fluxes;
        cell.conserved -= dt_over_dx * (*flux_hi - *flux_lo);
    });
}

/// Largest signal speed over all faces.
pub fn max_signal_speed(fluxes: &[FluxInfo]) -> f64 {
    fluxes
        .par_iter()
        .map(|flux| flux.v_max)
        .reduce(|| 0., f64::max)
}
