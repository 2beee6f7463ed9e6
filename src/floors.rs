use rayon::prelude::*;

use crate::{
    errors::HydroError,
    grid::{Cell, Grid},
    physical_constants::HydroConstants,
    physical_quantities::{Conserved, Primitive, Quantity, State},
};

/// Clamp the density and pressure of a primitive state to the floors.
///
/// Non-finite values are left untouched so validation can still report them.
pub(crate) fn floor_primitives(
    primitives: State<Primitive>,
    constants: &HydroConstants,
) -> State<Primitive> {
    clamp_primitives(primitives, constants).0
}

fn clamp_primitives(
    mut primitives: State<Primitive>,
    constants: &HydroConstants,
) -> (State<Primitive>, bool) {
    let mut clamped = false;
    if primitives.density() < constants.density_floor() {
        primitives.set_density(constants.density_floor());
        clamped = true;
    }
    if primitives.pressure() < constants.pressure_floor() {
        primitives.set_pressure(constants.pressure_floor());
        clamped = true;
    }
    (primitives, clamped)
}

/// Derive the primitives of a cell from its conserved state and enforce the floors.
///
/// The order is fixed: primitives are derived from the unclamped conserved state (a
/// non-positive mass density yields zero velocity and purely thermal energy), the density is
/// clamped, then the pressure is clamped, and only then are all conserved quantities rebuilt
/// once from the final primitives. Cells that need no clamp keep their conserved state
/// bit-for-bit.
///
/// Returns whether a clamp fired.
pub fn enforce_floors(cell: &mut Cell, constants: &HydroConstants) -> bool {
    let gas_law = constants.gas_law();
    let primitives = State::<Primitive>::from_conserved(&cell.conserved, gas_law);
    let (floored, clamped) = clamp_primitives(primitives, constants);
    if clamped {
        if cell.conserved.mass() <= 0. {
            log::warn!(
                "Flooring cell with non-positive mass density {}",
                cell.conserved.mass()
            );
        }
        cell.conserved = State::<Conserved>::from_primitives(&floored, gas_law);
    }
    cell.primitives = floored;
    clamped
}

/// Enforce floors on every real cell, returning the number of cells that were clamped.
pub fn apply_floors(grid: &mut Grid, constants: &HydroConstants) -> usize {
    let clamped = grid
        .par_real_cells_mut()
        .map(|(_, _, cell)| enforce_floors(cell, constants))
        .filter(|&clamped| clamped)
        .count();
    if clamped > 0 {
        log::debug!("Floors clamped {clamped} cells");
    }
    clamped
}

/// Scan the conserved and primitive state of every real cell.
///
/// Reports the first non-finite component, or a density or pressure that is not strictly
/// positive, of the lowest offending cell in arena order.
pub fn validate(grid: &Grid) -> Result<(), HydroError> {
    let fault = grid
        .par_real_cells()
        .find_map_first(|(_, index, cell)| {
            if let Some((quantity, value)) = cell.conserved.first_non_finite() {
                return Some(HydroError::NonFinite {
                    index,
                    quantity,
                    value,
                });
            }
            if let Some((quantity, value)) = cell.primitives.first_non_finite() {
                return Some(HydroError::NonFinite {
                    index,
                    quantity,
                    value,
                });
            }
            let density = cell.primitives.density();
            let pressure = cell.primitives.pressure();
            if density <= 0. {
                Some(HydroError::Unphysical {
                    index,
                    quantity: Quantity::Density,
                    value: density,
                })
            } else if pressure <= 0. {
                Some(HydroError::Unphysical {
                    index,
                    quantity: Quantity::Pressure,
                    value: pressure,
                })
            } else {
                None
            }
        });
    match fault {
        Some(fault) => Err(fault),
        None => Ok(()),
    }
}
