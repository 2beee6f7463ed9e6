use rayon::prelude::*;
use yaml_rust::Yaml;

use crate::{
    errors::ConfigError,
    floors::floor_primitives,
    grid::{Axis, Grid},
    physical_constants::HydroConstants,
    physical_quantities::{Conserved, Primitive, State},
    slope_limiters::{limit_state, SlopeLimiter},
};

/// Order of the spatial reconstruction inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum SpatialOrder {
    /// Piecewise constant: the slope is forced to zero.
    Constant = 0,
    /// Piecewise linear with limited slopes.
    Linear = 1,
}

/// Order of the time integration of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum TemporalOrder {
    First = 1,
    /// MUSCL-Hancock predictor on the face states.
    Second = 2,
}

fn read_order<T: TryFrom<u8>>(cfg: &Yaml, key: &str, default: u8) -> Result<T, ConfigError> {
    let value = cfg[key].as_i64().unwrap_or(default as i64);
    u8::try_from(value)
        .ok()
        .and_then(|value| T::try_from(value).ok())
        .ok_or(ConfigError::InvalidParameter {
            name: format!("hydrodynamics:{key}"),
            value: value.to_string(),
        })
}

impl SpatialOrder {
    /// Defaults to linear reconstruction.
    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        read_order(cfg, "spatial_order", Self::Linear as u8)
    }
}

impl TemporalOrder {
    /// Defaults to first order.
    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        read_order(cfg, "temporal_order", Self::First as u8)
    }
}

/// Reconstructed primitive states on the lower and upper face of a cell along one axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceStates {
    pub lo: State<Primitive>,
    pub hi: State<Primitive>,
}

/// Reconstruct the face states of every cell of the arena along `axis`.
///
/// The result is indexed by linear cell index. Cells at the edge of the arena lack a
/// neighbour along `axis` and are reconstructed piecewise constant; they never border a face
/// that is updated. Face states are floored before they are returned.
pub fn reconstruct(
    grid: &Grid,
    axis: Axis,
    limiter: &dyn SlopeLimiter,
    order: SpatialOrder,
    constants: &HydroConstants,
) -> Vec<FaceStates> {
    grid.cells()
        .par_iter()
        .enumerate()
        .map(|(linear, cell)| {
            let center = &cell.primitives;
            let slope = match order {
                SpatialOrder::Constant => State::<Primitive>::vacuum(),
                SpatialOrder::Linear => {
                    let index = grid.cell_index(linear);
                    match (
                        grid.neighbour(index, axis, -1),
                        grid.neighbour(index, axis, 1),
                    ) {
                        (Some(left), Some(right)) => limit_state(
                            limiter,
                            &left.primitives,
                            center,
                            &right.primitives,
                        ),
                        _ => State::<Primitive>::vacuum(),
                    }
                }
            };
            FaceStates {
                lo: floor_primitives(*center - 0.5 * slope, constants),
                hi: floor_primitives(*center + 0.5 * slope, constants),
            }
        })
        .collect()
}

/// Advance the face states of every cell by half a time step using the flux difference across
/// the cell (Toro, section 14.4).
pub fn predict_half_step(
    faces: &mut [FaceStates],
    axis: Axis,
    dt_over_dx: f64,
    constants: &HydroConstants,
) {
    let gas_law = constants.gas_law();
    let n_unit = axis.unit();
    faces.par_iter_mut().for_each(|face| {
        let delta = (0.5 * dt_over_dx)
            * (face.lo.flux(n_unit, gas_law) - face.hi.flux(n_unit, gas_law));
        let evolve = |w: &State<Primitive>| {
            let u = State::<Conserved>::from_primitives(w, gas_law) + delta;
            floor_primitives(State::<Primitive>::from_conserved(&u, gas_law), constants)
        };
        *face = FaceStates {
            lo: evolve(&face.lo),
            hi: evolve(&face.hi),
        };
    });
}
