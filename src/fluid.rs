use glam::DVec3;
use yaml_rust::Yaml;

use crate::{
    boundary::BoundaryConditions,
    errors::ConfigError,
    grid::{Axis, Cell, Grid},
};

/// Fluid state container: the cell arena together with the boundary conditions that populate
/// its ghost layers.
#[derive(Debug, Clone)]
pub struct Fluid {
    grid: Grid,
    boundaries: BoundaryConditions,
}

impl Fluid {
    pub fn new(grid: Grid, boundaries: BoundaryConditions) -> Self {
        let boundaries = boundaries.adapt_to_geometry(grid.geometry());
        Self { grid, boundaries }
    }

    /// Build an empty fluid from the `grid` and `boundaries` sections.
    pub fn init(grid_cfg: &Yaml, boundaries_cfg: &Yaml) -> Result<Self, ConfigError> {
        let grid = Grid::init(grid_cfg)?;
        let boundaries = BoundaryConditions::init(boundaries_cfg)?;
        log::info!(
            "Grid of {:?} cells ({:?} geometry, cell width {})",
            grid.ncells(),
            grid.geometry(),
            grid.cell_width(Axis::X, grid.cell_index(0))
        );
        Ok(Self::new(grid, boundaries))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn boundaries(&self) -> &BoundaryConditions {
        &self.boundaries
    }

    /// Populate the ghost layers from the current state of the real cells.
    pub fn fill_ghost_cells(&mut self) {
        self.boundaries.fill_ghost_cells(&mut self.grid);
    }

    /// Primitive states of the real cells with their cell-center positions, in arena order.
    pub fn real_cells(&self) -> impl Iterator<Item = (DVec3, &Cell)> + '_ {
        self.grid
            .real_indices()
            .map(|index| (self.grid.position(index), self.grid.cell(index)))
    }
}
