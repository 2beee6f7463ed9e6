use std::fmt::Display;

use glam::DVec3;
use rayon::prelude::*;
use yaml_rust::Yaml;

use crate::{
    errors::ConfigError,
    gas_law::GasLaw,
    physical_quantities::{Conserved, Primitive, State},
};

/// Number of ghost cells on each side of an active axis.
pub const GHOST_WIDTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::IntoPrimitive, num_enum::TryFromPrimitive)]
#[repr(usize)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self.into()
    }

    pub fn unit(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Cartesian,
    /// Radial coordinate along x, axial coordinate along y.
    Cylindrical,
    /// Radial coordinate along x.
    Spherical,
}

impl Geometry {
    /// Exponent of the radial coordinate in the volume element, `dV ~ r^alpha dr`.
    pub fn alpha(&self) -> f64 {
        match self {
            Geometry::Cartesian => 0.,
            Geometry::Cylindrical => 1.,
            Geometry::Spherical => 2.,
        }
    }
}

/// Location of a cell in the arena, ghost cells included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex(pub [usize; 3]);

impl CellIndex {
    /// Index of the neighbour `offset` cells away along `axis`.
    ///
    /// Returns `None` when leaving the arena.
    pub fn shifted(&self, axis: Axis, offset: isize) -> Option<Self> {
        let mut idx = self.0;
        idx[axis.index()] = idx[axis.index()].checked_add_signed(offset)?;
        Some(Self(idx))
    }
}

impl Display for CellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct Cell {
    pub conserved: State<Conserved>,
    pub primitives: State<Primitive>,
}

impl Cell {
    pub fn from_primitives(primitives: State<Primitive>, gas_law: &GasLaw) -> Self {
        Self {
            conserved: State::<Conserved>::from_primitives(&primitives, gas_law),
            primitives,
        }
    }

    pub fn refresh_primitives(&mut self, gas_law: &GasLaw) {
        self.primitives = State::<Primitive>::from_conserved(&self.conserved, gas_law);
    }
}

/// Uniform structured grid stored as a flat arena of cells, ghost layers included.
#[derive(Debug, Clone)]
pub struct Grid {
    ncells: [usize; 3],
    ghosts: [usize; 3],
    dims: [usize; 3],
    cell_width: f64,
    geometry: Geometry,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of `ncells` real cells, where `side_length` spans the x axis.
    ///
    /// Cells are cubes; an axis with a single cell is inactive and carries no ghosts.
    pub fn new(
        ncells: [usize; 3],
        side_length: f64,
        geometry: Geometry,
    ) -> Result<Self, ConfigError> {
        if ncells.contains(&0) {
            return Err(ConfigError::InvalidParameter {
                name: "grid:ncells".to_string(),
                value: format!("{ncells:?}"),
            });
        }
        let cell_width = side_length / ncells[0] as f64;
        if !(cell_width > 0. && cell_width.is_finite()) {
            return Err(ConfigError::InvalidCellWidth(cell_width));
        }
        let ghosts = ncells.map(|n| if n > 1 { GHOST_WIDTH } else { 0 });
        let dims = [
            ncells[0] + 2 * ghosts[0],
            ncells[1] + 2 * ghosts[1],
            ncells[2] + 2 * ghosts[2],
        ];
        Ok(Self {
            ncells,
            ghosts,
            dims,
            cell_width,
            geometry,
            cells: vec![Cell::default(); dims[0] * dims[1] * dims[2]],
        })
    }

    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        let ncells = match cfg["ncells"].as_vec() {
            Some(arr) if arr.len() == 3 => {
                let mut ncells = [1; 3];
                for (n, yaml) in ncells.iter_mut().zip(arr.iter()) {
                    *n = yaml
                        .as_i64()
                        .filter(|&n| n > 0)
                        .ok_or(ConfigError::InvalidParameter {
                            name: "grid:ncells".to_string(),
                            value: format!("{yaml:?}"),
                        })? as usize;
                }
                ncells
            }
            Some(arr) => return Err(ConfigError::InvalidArrayLength(3, arr.len())),
            None => return Err(ConfigError::MissingParameter("grid:ncells".to_string())),
        };
        let side_length = cfg["side_length"]
            .as_f64()
            .ok_or(ConfigError::MissingParameter("grid:side_length".to_string()))?;
        let geometry = match cfg["geometry"].as_str().unwrap_or("cartesian") {
            "cartesian" => Geometry::Cartesian,
            "cylindrical" => Geometry::Cylindrical,
            "spherical" => Geometry::Spherical,
            other => return Err(ConfigError::UnknownGeometry(other.to_string())),
        };
        Self::new(ncells, side_length, geometry)
    }

    pub fn ncells(&self) -> [usize; 3] {
        self.ncells
    }

    pub fn ghosts(&self, axis: Axis) -> usize {
        self.ghosts[axis.index()]
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn is_active(&self, axis: Axis) -> bool {
        self.ncells[axis.index()] > 1
    }

    pub fn active_axes(&self) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|&axis| self.is_active(axis))
            .collect()
    }

    /// Width of the cell along `axis`.
    ///
    /// Cells are uniform in coordinate space for every geometry; non-Cartesian geometries only
    /// enter through geometric source terms.
    pub fn cell_width(&self, _axis: Axis, _index: CellIndex) -> f64 {
        self.cell_width
    }

    /// Coordinates of the center of a cell (ghosts lie outside `[0, side_length)`).
    pub fn position(&self, index: CellIndex) -> DVec3 {
        let coordinate = |axis: usize| {
            (index.0[axis] as f64 - self.ghosts[axis] as f64 + 0.5) * self.cell_width
        };
        DVec3::new(coordinate(0), coordinate(1), coordinate(2))
    }

    pub fn linear_index(&self, index: CellIndex) -> usize {
        let [i, j, k] = index.0;
        debug_assert!(i < self.dims[0] && j < self.dims[1] && k < self.dims[2]);
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    pub fn cell_index(&self, linear: usize) -> CellIndex {
        cell_index(linear, self.dims)
    }

    /// Distance in the arena between neighbours along `axis`.
    pub fn stride(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => 1,
            Axis::Y => self.dims[0],
            Axis::Z => self.dims[0] * self.dims[1],
        }
    }

    pub fn cell(&self, index: CellIndex) -> &Cell {
        &self.cells[self.linear_index(index)]
    }

    pub fn cell_mut(&mut self, index: CellIndex) -> &mut Cell {
        let linear = self.linear_index(index);
        &mut self.cells[linear]
    }

    /// Neighbour `offset` cells away along `axis`, if it lies in the arena.
    pub fn neighbour(&self, index: CellIndex, axis: Axis, offset: isize) -> Option<&Cell> {
        index
            .shifted(axis, offset)
            .filter(|shifted| shifted.0[axis.index()] < self.dims[axis.index()])
            .map(|shifted| self.cell(shifted))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn is_real(&self, index: CellIndex) -> bool {
        is_real(index, self.ncells, self.ghosts)
    }

    /// Arena index range of the real cells along an axis.
    pub fn real_range(&self, axis: Axis) -> std::ops::Range<usize> {
        let g = self.ghosts[axis.index()];
        g..g + self.ncells[axis.index()]
    }

    /// All real (non-ghost) cell indices, in arena order.
    pub fn real_indices(&self) -> impl Iterator<Item = CellIndex> + '_ {
        let [xr, yr, zr] = [
            self.real_range(Axis::X),
            self.real_range(Axis::Y),
            self.real_range(Axis::Z),
        ];
        zr.flat_map(move |k| {
            let xr = xr.clone();
            yr.clone()
                .flat_map(move |j| xr.clone().map(move |i| CellIndex([i, j, k])))
        })
    }

    /// Parallel iterator over the real cells, with their linear and arena index.
    pub fn par_real_cells(&self) -> impl ParallelIterator<Item = (usize, CellIndex, &Cell)> + '_ {
        let (ncells, ghosts, dims) = (self.ncells, self.ghosts, self.dims);
        self.cells
            .par_iter()
            .enumerate()
            .filter_map(move |(linear, cell)| {
                let index = cell_index(linear, dims);
                is_real(index, ncells, ghosts).then_some((linear, index, cell))
            })
    }

    pub fn par_real_cells_mut(
        &mut self,
    ) -> impl ParallelIterator<Item = (usize, CellIndex, &mut Cell)> + '_ {
        let (ncells, ghosts, dims) = (self.ncells, self.ghosts, self.dims);
        self.cells
            .par_iter_mut()
            .enumerate()
            .filter_map(move |(linear, cell)| {
                let index = cell_index(linear, dims);
                is_real(index, ncells, ghosts).then_some((linear, index, cell))
            })
    }

    /// Sum of the conserved quantities over the real cells.
    pub fn total_conserved(&self) -> State<Conserved> {
        self.real_indices()
            .fold(State::<Conserved>::vacuum(), |total, index| {
                total + self.cell(index).conserved
            })
    }
}

fn cell_index(linear: usize, dims: [usize; 3]) -> CellIndex {
    let i = linear % dims[0];
    let j = (linear / dims[0]) % dims[1];
    let k = linear / (dims[0] * dims[1]);
    CellIndex([i, j, k])
}

fn is_real(index: CellIndex, ncells: [usize; 3], ghosts: [usize; 3]) -> bool {
    (0..3).all(|axis| {
        let i = index.0[axis];
        i >= ghosts[axis] && i < ghosts[axis] + ncells[axis]
    })
}
