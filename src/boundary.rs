use glam::DVec3;
use yaml_rust::Yaml;

use crate::{
    errors::ConfigError,
    grid::{Axis, CellIndex, Geometry, Grid},
    physical_quantities::{Conserved, State},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    Periodic,
    Reflective,
    /// Zero-gradient outflow.
    Outflow,
}

impl Boundary {
    fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "periodic" => Ok(Boundary::Periodic),
            "reflective" => Ok(Boundary::Reflective),
            "outflow" => Ok(Boundary::Outflow),
            _ => Err(ConfigError::UnknownBoundaryConditions(name.to_string())),
        }
    }
}

/// Boundary conditions on the six faces of a grid.
///
/// Fills the ghost layers of every active axis; the hydrodynamics never writes ghost cells itself.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryConditions {
    left: [Boundary; 3],
    right: [Boundary; 3],
}

impl BoundaryConditions {
    pub fn new(left: [Boundary; 3], right: [Boundary; 3]) -> Result<Self, ConfigError> {
        for axis in Axis::ALL {
            let (l, r) = (left[axis.index()], right[axis.index()]);
            if (l == Boundary::Periodic) != (r == Boundary::Periodic) {
                return Err(ConfigError::InconsistentPeriodicBoundary(axis));
            }
        }
        Ok(Self { left, right })
    }

    pub fn uniform(boundary: Boundary) -> Self {
        Self {
            left: [boundary; 3],
            right: [boundary; 3],
        }
    }

    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        let parse_faces = |key: &str| -> Result<[Boundary; 3], ConfigError> {
            match cfg[key].as_vec() {
                Some(arr) if arr.len() == 3 => {
                    let mut faces = [Boundary::Outflow; 3];
                    for (face, yaml) in faces.iter_mut().zip(arr.iter()) {
                        *face = Boundary::parse(yaml.as_str().ok_or(
                            ConfigError::InvalidParameter {
                                name: format!("boundaries:{key}"),
                                value: format!("{yaml:?}"),
                            },
                        )?)?;
                    }
                    Ok(faces)
                }
                Some(arr) => Err(ConfigError::InvalidArrayLength(3, arr.len())),
                None => match cfg[key].as_str() {
                    Some(name) => Ok([Boundary::parse(name)?; 3]),
                    None => Err(ConfigError::MissingParameter(format!("boundaries:{key}"))),
                },
            }
        };
        Self::new(parse_faces("left")?, parse_faces("right")?)
    }

    /// Curvilinear grids have their symmetry axis/center on the inner x face.
    pub fn adapt_to_geometry(mut self, geometry: Geometry) -> Self {
        if geometry != Geometry::Cartesian && self.left[0] != Boundary::Reflective {
            log::info!("Forcing reflective inner radial boundary for {geometry:?} geometry");
            self.left[0] = Boundary::Reflective;
            if self.right[0] == Boundary::Periodic {
                self.right[0] = Boundary::Outflow;
            }
        }
        self
    }

    pub fn left(&self, axis: Axis) -> Boundary {
        self.left[axis.index()]
    }

    pub fn right(&self, axis: Axis) -> Boundary {
        self.right[axis.index()]
    }

    /// Populate the ghost cells of every active axis.
    ///
    /// Axes are processed in order over the full transverse extent so corner ghosts are
    /// filled consistently.
    pub fn fill_ghost_cells(&self, grid: &mut Grid) {
        for axis in grid.active_axes() {
            self.fill_axis(grid, axis);
        }
    }

    fn fill_axis(&self, grid: &mut Grid, axis: Axis) {
        let a = axis.index();
        let g = grid.ghosts(axis);
        let n = grid.ncells()[a];
        let dims = grid.dims();
        let normal = axis.unit();
        let (t1, t2) = ((a + 1) % 3, (a + 2) % 3);

        for i1 in 0..dims[t1] {
            for i2 in 0..dims[t2] {
                let at = |i: usize| {
                    let mut idx = [0; 3];
                    idx[a] = i;
                    idx[t1] = i1;
                    idx[t2] = i2;
                    CellIndex(idx)
                };
                for m in 0..g {
                    // left ghost `g - 1 - m`, right ghost `g + n + m`
                    let left_ghost = at(g - 1 - m);
                    let left_source = match self.left[a] {
                        Boundary::Periodic => at(g + n - 1 - m),
                        Boundary::Reflective => at(g + m),
                        Boundary::Outflow => at(g),
                    };
                    let mut cell = *grid.cell(left_source);
                    if self.left[a] == Boundary::Reflective {
                        cell.primitives = cell.primitives.reflect(normal);
                        cell.conserved = reflect_momentum(cell.conserved, normal);
                    }
                    *grid.cell_mut(left_ghost) = cell;

                    let right_ghost = at(g + n + m);
                    let right_source = match self.right[a] {
                        Boundary::Periodic => at(g + m),
                        Boundary::Reflective => at(g + n - 1 - m),
                        Boundary::Outflow => at(g + n - 1),
                    };
                    let mut cell = *grid.cell(right_source);
                    if self.right[a] == Boundary::Reflective {
                        cell.primitives = cell.primitives.reflect(normal);
                        cell.conserved = reflect_momentum(cell.conserved, normal);
                    }
                    *grid.cell_mut(right_ghost) = cell;
                }
            }
        }
    }
}

fn reflect_momentum(conserved: State<Conserved>, normal: DVec3) -> State<Conserved> {
    let momentum = conserved.momentum() - 2. * conserved.momentum().dot(normal) * normal;
    State::<Conserved>::new(conserved.mass(), momentum, conserved.energy())
        .with_passive_scalar(conserved.passive_scalar())
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use yaml_rust::YamlLoader;

    use super::*;
    use crate::{gas_law::GasLaw, grid::Cell, physical_quantities::Primitive};

    fn ramp_grid() -> Grid {
        let gas_law = GasLaw::new(1.4);
        let mut grid = Grid::new([4, 1, 1], 1., Geometry::Cartesian).unwrap();
        for (n, index) in grid.real_indices().collect::<Vec<_>>().into_iter().enumerate() {
            let w = State::<Primitive>::new(1. + n as f64, 0.5 * DVec3::X, 1.);
            *grid.cell_mut(index) = Cell::from_primitives(w, &gas_law);
        }
        grid
    }

    #[test]
    fn test_periodic() {
        let mut grid = ramp_grid();
        BoundaryConditions::uniform(Boundary::Periodic).fill_ghost_cells(&mut grid);
        let density = |i| grid.cell(CellIndex([i, 0, 0])).primitives.density();
        assert_approx_eq!(f64, density(1), 4.);
        assert_approx_eq!(f64, density(0), 3.);
        assert_approx_eq!(f64, density(6), 1.);
        assert_approx_eq!(f64, density(7), 2.);
    }

    #[test]
    fn test_reflective() {
        let mut grid = ramp_grid();
        BoundaryConditions::uniform(Boundary::Reflective).fill_ghost_cells(&mut grid);
        let ghost = grid.cell(CellIndex([1, 0, 0]));
        assert_approx_eq!(f64, ghost.primitives.density(), 1.);
        assert_approx_eq!(f64, ghost.primitives.velocity().x, -0.5);
        assert_approx_eq!(f64, ghost.conserved.momentum().x, -0.5);
        let ghost = grid.cell(CellIndex([7, 0, 0]));
        assert_approx_eq!(f64, ghost.primitives.density(), 3.);
        assert_approx_eq!(f64, ghost.primitives.velocity().x, -0.5);
    }

    #[test]
    fn test_outflow() {
        let mut grid = ramp_grid();
        BoundaryConditions::uniform(Boundary::Outflow).fill_ghost_cells(&mut grid);
        let ghost = grid.cell(CellIndex([0, 0, 0]));
        assert_approx_eq!(f64, ghost.primitives.density(), 1.);
        let ghost = grid.cell(CellIndex([7, 0, 0]));
        assert_approx_eq!(f64, ghost.primitives.density(), 4.);
        assert_approx_eq!(f64, ghost.primitives.velocity().x, 0.5);
    }

    #[test]
    fn test_init() {
        let cfg = &YamlLoader::load_from_str(
            "left: [reflective, periodic, outflow]\nright: [outflow, periodic, outflow]",
        )
        .unwrap()[0];
        let bc = BoundaryConditions::init(cfg).unwrap();
        assert_eq!(bc.left(Axis::X), Boundary::Reflective);
        assert_eq!(bc.right(Axis::Y), Boundary::Periodic);

        let cfg = &YamlLoader::load_from_str("left: periodic\nright: outflow").unwrap()[0];
        assert!(matches!(
            BoundaryConditions::init(cfg),
            Err(ConfigError::InconsistentPeriodicBoundary(Axis::X))
        ));

        let bc = BoundaryConditions::uniform(Boundary::Periodic)
            .adapt_to_geometry(Geometry::Cylindrical);
        assert_eq!(bc.left(Axis::X), Boundary::Reflective);
        assert_eq!(bc.right(Axis::X), Boundary::Outflow);
        assert_eq!(bc.left(Axis::Y), Boundary::Periodic);
    }
}
