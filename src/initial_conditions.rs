use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use yaml_rust::Yaml;

use crate::{
    boundary::BoundaryConditions,
    errors::ConfigError,
    fluid::Fluid,
    gas_law::GasLaw,
    grid::{Axis, Cell, Grid},
    physical_quantities::{Primitive, State},
};

fn sod_shock(coordinate: DVec3) -> State<Primitive> {
    if coordinate.x < 0.5 {
        State::<Primitive>::new(1., DVec3::ZERO, 1.).with_passive_scalar(1.)
    } else {
        State::<Primitive>::new(0.125, DVec3::ZERO, 0.1)
    }
}

fn noh(coordinate: DVec3) -> State<Primitive> {
    let velocity = if coordinate.x < 0.5 {
        DVec3::X
    } else {
        -DVec3::X
    };
    State::<Primitive>::new(1., velocity, 1.0e-6)
}

/// Two strong rarefactions leaving a near vacuum in the center.
fn toro(coordinate: DVec3) -> State<Primitive> {
    let velocity = if coordinate.x < 0.5 { -2. } else { 2. };
    State::<Primitive>::new(1., velocity * DVec3::X, 0.4)
}

fn constant(_coordinate: DVec3) -> State<Primitive> {
    State::<Primitive>::new(1., DVec3::ZERO, 1.)
}

fn square(coordinate: DVec3) -> State<Primitive> {
    if coordinate.x < 0.25 || coordinate.x > 0.75 {
        State::<Primitive>::new(1., DVec3::X, 1.)
    } else {
        State::<Primitive>::new(4., DVec3::X, 1.).with_passive_scalar(1.)
    }
}

fn blast_2d(coordinate: DVec3) -> State<Primitive> {
    let radius = (coordinate.truncate() - glam::DVec2::splat(0.5)).length();
    if radius < 0.1 {
        State::<Primitive>::new(1., DVec3::ZERO, 10.).with_passive_scalar(1.)
    } else {
        State::<Primitive>::new(1., DVec3::ZERO, 0.1)
    }
}

/// Grid whose real cells hold the initial state of a simulation.
pub struct InitialConditions {
    grid: Grid,
}

impl InitialConditions {
    /// Fill the real cells of `grid` by evaluating `f` at the cell centers.
    ///
    /// With `perturbations`, densities are multiplied by a random factor drawn uniformly from
    /// `[1 - perturbations, 1 + perturbations)`.
    pub fn from_fn<F>(
        mut grid: Grid,
        gas_law: &GasLaw,
        perturbations: Option<(f64, u64)>,
        f: F,
    ) -> Self
    where
        F: Fn(DVec3) -> State<Primitive>,
    {
        let mut rng = perturbations.map(|(_, seed)| StdRng::seed_from_u64(seed));
        for index in grid.real_indices().collect::<Vec<_>>() {
            let mut primitives = f(grid.position(index));
            if let (Some((amplitude, _)), Some(rng)) = (perturbations, rng.as_mut()) {
                let factor = 1. + amplitude * (2. * rng.gen::<f64>() - 1.);
                primitives.set_density(factor * primitives.density());
            }
            *grid.cell_mut(index) = Cell::from_primitives(primitives, gas_law);
        }
        Self { grid }
    }

    /// Read the `initial_conditions` section and fill `grid` from the named preset.
    ///
    /// Presets are defined on the unit box: positions are divided by the side length of the
    /// grid.
    pub fn init(cfg: &Yaml, grid: Grid, gas_law: &GasLaw) -> Result<Self, ConfigError> {
        let kind = cfg["kind"].as_str().ok_or(ConfigError::MissingParameter(
            "initial_conditions:kind".to_string(),
        ))?;
        let perturbations = cfg["perturbations"]
            .as_f64()
            .map(|amplitude| (amplitude, cfg["seed"].as_i64().unwrap_or(0) as u64));
        if let Some((amplitude, _)) = perturbations {
            if !(0. ..1.).contains(&amplitude) {
                return Err(ConfigError::InvalidParameter {
                    name: "initial_conditions:perturbations".to_string(),
                    value: amplitude.to_string(),
                });
            }
        }

        let preset: fn(DVec3) -> State<Primitive> = match kind {
            "sodshock" => sod_shock,
            "noh" => noh,
            "toro" => toro,
            "constant" => constant,
            "square-advection" => square,
            "blast2d" => blast_2d,
            _ => return Err(ConfigError::UnknownICs(kind.to_string())),
        };
        let side_length = grid.ncells()[0] as f64 * grid.cell_width(Axis::X, grid.cell_index(0));
        log::info!("Setting up {kind} initial conditions");

        Ok(Self::from_fn(grid, gas_law, perturbations, |position| {
            preset(position / side_length)
        }))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn into_fluid(self, boundaries: BoundaryConditions) -> Fluid {
        Fluid::new(self.grid, boundaries)
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use yaml_rust::YamlLoader;

    use super::*;
    use crate::grid::{CellIndex, Geometry};

    fn grid() -> Grid {
        Grid::new([10, 1, 1], 2., Geometry::Cartesian).unwrap()
    }

    #[test]
    fn test_from_fn_fills_real_cells() {
        let gas_law = GasLaw::new(1.4);
        let ics = InitialConditions::from_fn(grid(), &gas_law, None, |position| {
            State::<Primitive>::new(1. + position.x, DVec3::Y, 2.)
        });
        let grid = ics.grid();
        for index in grid.real_indices() {
            let cell = grid.cell(index);
            assert_approx_eq!(f64, cell.primitives.density(), 1. + grid.position(index).x);
            assert_approx_eq!(f64, cell.conserved.momentum().y, cell.primitives.density());
        }
        // ghosts are left to the boundary conditions
        assert_eq!(grid.cell(CellIndex([0, 0, 0])).primitives.density(), 0.);
    }

    #[test]
    fn test_perturbations() {
        let gas_law = GasLaw::new(1.4);
        let ics = InitialConditions::from_fn(grid(), &gas_law, Some((0.1, 42)), constant);
        let densities: Vec<f64> = ics
            .grid()
            .real_indices()
            .map(|index| ics.grid().cell(index).primitives.density())
            .collect();
        assert!(densities.iter().all(|&rho| (0.9..1.1).contains(&rho)));
        assert!(densities.iter().any(|&rho| rho != 1.));

        // same seed, same state
        let again = InitialConditions::from_fn(grid(), &gas_law, Some((0.1, 42)), constant);
        for (index, rho) in again.grid().real_indices().zip(densities) {
            assert_eq!(again.grid().cell(index).primitives.density(), rho);
        }
    }

    #[test]
    fn test_presets() {
        let gas_law = GasLaw::new(1.4);
        let cfg = &YamlLoader::load_from_str("kind: sodshock").unwrap()[0];
        let ics = InitialConditions::init(cfg, grid(), &gas_law).unwrap();
        // the side length is 2: the discontinuity sits at x = 1
        let left = ics.grid().cell(CellIndex([6, 0, 0])).primitives;
        let right = ics.grid().cell(CellIndex([7, 0, 0])).primitives;
        assert_eq!(left.density(), 1.);
        assert_eq!(left.passive_scalar(), 1.);
        assert_eq!(right.density(), 0.125);
        assert_eq!(right.pressure(), 0.1);

        let cfg = &YamlLoader::load_from_str("kind: sedov").unwrap()[0];
        assert!(matches!(
            InitialConditions::init(cfg, grid(), &gas_law),
            Err(ConfigError::UnknownICs(_))
        ));

        let cfg = &YamlLoader::load_from_str("kind: constant\nperturbations: 1.5").unwrap()[0];
        assert!(matches!(
            InitialConditions::init(cfg, grid(), &gas_law),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }
}
