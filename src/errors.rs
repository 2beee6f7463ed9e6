use crate::{
    grid::{Axis, CellIndex},
    physical_quantities::Quantity,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required parameter in configuration: {0}")]
    MissingParameter(String),
    #[error("Invalid value for parameter {name}: {value}")]
    InvalidParameter { name: String, value: String },
    #[error("Unknown type of Riemann solver configured: {0}")]
    UnknownRiemannSolver(String),
    #[error("Unknown type of slope limiter configured: {0}")]
    UnknownSlopeLimiter(String),
    #[error("Unknown type of grid geometry configured: {0}")]
    UnknownGeometry(String),
    #[error("Unknown type of boundary condition configured: {0}")]
    UnknownBoundaryConditions(String),
    #[error("Unknown type of initial conditions configured: {0}")]
    UnknownICs(String),
    #[error("Expected array of length {0}, but found {1}")]
    InvalidArrayLength(usize, usize),
    #[error("No {0} was set before the start of the march")]
    MissingStrategy(&'static str),
    #[error("Cell width must be strictly positive, but found {0}")]
    InvalidCellWidth(f64),
    #[error("Periodic boundary conditions along {0:?} must be set on both faces")]
    InconsistentPeriodicBoundary(Axis),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Raised by a Riemann solver that was handed a state violating positivity.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RiemannError {
    #[error("{side:?} state has non-physical {quantity}: {value}")]
    NonPhysicalState {
        side: Side,
        quantity: Quantity,
        value: f64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum HydroError {
    #[error("Non-finite {quantity} ({value}) in cell {index}")]
    NonFinite {
        index: CellIndex,
        quantity: Quantity,
        value: f64,
    },
    #[error("Non-physical {quantity} ({value}) survived flooring in cell {index}")]
    Unphysical {
        index: CellIndex,
        quantity: Quantity,
        value: f64,
    },
    #[error("Invalid reconstructed state at the {axis:?} face below cell {index}")]
    InterfaceState {
        index: CellIndex,
        axis: Axis,
        #[source]
        source: RiemannError,
    },
    #[error("Courant number {courant} exceeds unity at the {axis:?} face below cell {index}")]
    CflViolation {
        index: CellIndex,
        axis: Axis,
        courant: f64,
    },
    #[error("March halted at step {step} (t = {time})")]
    March {
        step: u64,
        time: f64,
        #[source]
        source: Box<HydroError>,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HydroError {
    pub(crate) fn during_march(self, step: u64, time: f64) -> Self {
        match self {
            HydroError::March { .. } => self,
            _ => HydroError::March {
                step,
                time,
                source: Box::new(self),
            },
        }
    }
}
