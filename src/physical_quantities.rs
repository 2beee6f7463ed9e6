use std::{
    fmt::Display,
    marker::PhantomData,
    ops::{Add, AddAssign, Index, IndexMut, Mul, Sub, SubAssign},
};

use glam::DVec3;

use crate::gas_law::GasLaw;

/// Number of components in a state vector.
pub const N_QUANTITIES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Density,
    VelocityX,
    VelocityY,
    VelocityZ,
    Pressure,
    MomentumX,
    MomentumY,
    MomentumZ,
    Energy,
    PassiveScalar,
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Quantity::Density => "density",
            Quantity::VelocityX => "velocity_x",
            Quantity::VelocityY => "velocity_y",
            Quantity::VelocityZ => "velocity_z",
            Quantity::Pressure => "pressure",
            Quantity::MomentumX => "momentum_x",
            Quantity::MomentumY => "momentum_y",
            Quantity::MomentumZ => "momentum_z",
            Quantity::Energy => "energy",
            Quantity::PassiveScalar => "passive_scalar",
        };
        write!(f, "{name}")
    }
}

pub trait StateKind {
    /// Names of the components, in index order.
    const QUANTITIES: [Quantity; N_QUANTITIES];
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Primitive;
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Conserved;

impl StateKind for Primitive {
    const QUANTITIES: [Quantity; N_QUANTITIES] = [
        Quantity::Density,
        Quantity::VelocityX,
        Quantity::VelocityY,
        Quantity::VelocityZ,
        Quantity::Pressure,
        Quantity::PassiveScalar,
    ];
}

impl StateKind for Conserved {
    const QUANTITIES: [Quantity; N_QUANTITIES] = [
        Quantity::Density,
        Quantity::MomentumX,
        Quantity::MomentumY,
        Quantity::MomentumZ,
        Quantity::Energy,
        Quantity::PassiveScalar,
    ];
}

/// State vector of a fluid element.
///
/// For primitives: density, velocity, pressure and passive scalar fraction.
/// For conserved quantities (all per unit volume): mass density, momentum density, total energy
/// density and passive scalar density.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct State<T>(f64, DVec3, f64, f64, PhantomData<T>);

impl<T> Add for State<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(
            self.0 + rhs.0,
            self.1 + rhs.1,
            self.2 + rhs.2,
            self.3 + rhs.3,
            PhantomData,
        )
    }
}

impl<T> AddAssign for State<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.1 += rhs.1;
        self.2 += rhs.2;
        self.3 += rhs.3;
    }
}

impl<T> Sub for State<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(
            self.0 - rhs.0,
            self.1 - rhs.1,
            self.2 - rhs.2,
            self.3 - rhs.3,
            PhantomData,
        )
    }
}

impl<T> SubAssign for State<T> {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.1 -= rhs.1;
        self.2 -= rhs.2;
        self.3 -= rhs.3;
    }
}

impl<T> Mul<State<T>> for f64 {
    type Output = State<T>;

    fn mul(self, rhs: State<T>) -> Self::Output {
        State::<T>(
            self * rhs.0,
            self * rhs.1,
            self * rhs.2,
            self * rhs.3,
            PhantomData,
        )
    }
}

impl<T> State<T> {
    pub fn vacuum() -> Self {
        Self(0., DVec3::ZERO, 0., 0., PhantomData)
    }

    pub fn pairwise_max(&self, other: &Self) -> Self {
        Self(
            self.0.max(other.0),
            self.1.max(other.1),
            self.2.max(other.2),
            self.3.max(other.3),
            PhantomData,
        )
    }

    pub fn pairwise_min(&self, other: &Self) -> Self {
        Self(
            self.0.min(other.0),
            self.1.min(other.1),
            self.2.min(other.2),
            self.3.min(other.3),
            PhantomData,
        )
    }

    /// Apply `f` to each pair of corresponding components.
    pub fn zip_map(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut result = Self::vacuum();
        for i in 0..N_QUANTITIES {
            result[i] = f(self[i], other[i]);
        }
        result
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.2.is_finite() && self.3.is_finite()
    }
}

impl<T: StateKind> State<T> {
    /// The first component that is NaN or infinite, if any.
    pub fn first_non_finite(&self) -> Option<(Quantity, f64)> {
        (0..N_QUANTITIES)
            .find(|&i| !self[i].is_finite())
            .map(|i| (T::QUANTITIES[i], self[i]))
    }
}

impl<T> Index<usize> for State<T> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.0,
            1 => &self.1.x,
            2 => &self.1.y,
            3 => &self.1.z,
            4 => &self.2,
            5 => &self.3,
            _ => panic!("Index out of bounds for StateVector!"),
        }
    }
}

impl<T> IndexMut<usize> for State<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match index {
            0 => &mut self.0,
            1 => &mut self.1.x,
            2 => &mut self.1.y,
            3 => &mut self.1.z,
            4 => &mut self.2,
            5 => &mut self.3,
            _ => panic!("Index out of bounds for StateVector!"),
        }
    }
}

impl State<Primitive> {
    pub fn new(density: f64, velocity: DVec3, pressure: f64) -> Self {
        Self(density, velocity, pressure, 0., PhantomData)
    }

    pub fn with_passive_scalar(mut self, fraction: f64) -> Self {
        self.3 = fraction;
        self
    }

    pub fn density(&self) -> f64 {
        self.0
    }

    pub fn velocity(&self) -> DVec3 {
        self.1
    }

    pub fn pressure(&self) -> f64 {
        self.2
    }

    pub fn passive_scalar(&self) -> f64 {
        self.3
    }

    pub(crate) fn set_density(&mut self, density: f64) {
        self.0 = density;
    }

    pub(crate) fn set_pressure(&mut self, pressure: f64) {
        self.2 = pressure;
    }

    /// Derive primitives from conserved quantities without applying any floor.
    ///
    /// A non-positive mass density has no meaningful velocity: velocity and passive scalar are
    /// then set to zero and all energy is treated as thermal.
    pub fn from_conserved(conserved: &State<Conserved>, gas_law: &GasLaw) -> Self {
        let density = conserved.mass();
        if density > 0. {
            let density_inv = 1. / density;
            let velocity = conserved.momentum() * density_inv;
            let pressure = gas_law.pressure_from_thermal_energy(conserved.thermal_energy());
            Self::new(density, velocity, pressure)
                .with_passive_scalar(conserved.passive_scalar() * density_inv)
        } else {
            Self::new(
                density,
                DVec3::ZERO,
                gas_law.pressure_from_thermal_energy(conserved.energy()),
            )
        }
    }

    /// Physical flux of the Euler equations through a face with the given unit normal.
    pub fn flux(&self, n_unit: DVec3, gas_law: &GasLaw) -> State<Conserved> {
        let v_n = self.velocity().dot(n_unit);
        let conserved = State::<Conserved>::from_primitives(self, gas_law);
        v_n * conserved + State::<Conserved>::new(0., self.pressure() * n_unit, self.pressure() * v_n)
    }

    /// Reflect velocity component along normal
    pub fn reflect(&self, normal: DVec3) -> Self {
        let v = self.velocity() - 2. * self.velocity().dot(normal) * normal;
        Self::new(self.density(), v, self.pressure()).with_passive_scalar(self.passive_scalar())
    }
}

impl State<Conserved> {
    pub fn new(mass: f64, momentum: DVec3, energy: f64) -> Self {
        Self(mass, momentum, energy, 0., PhantomData)
    }

    pub fn with_passive_scalar(mut self, scalar_density: f64) -> Self {
        self.3 = scalar_density;
        self
    }

    pub fn mass(&self) -> f64 {
        self.0
    }

    pub fn momentum(&self) -> DVec3 {
        self.1
    }

    pub fn energy(&self) -> f64 {
        self.2
    }

    pub fn passive_scalar(&self) -> f64 {
        self.3
    }

    pub fn kinetic_energy(&self) -> f64 {
        if self.mass() > 0. {
            0.5 * self.momentum().length_squared() / self.mass()
        } else {
            0.
        }
    }

    /// Thermal energy per unit volume: `E - E_kin`.
    pub fn thermal_energy(&self) -> f64 {
        self.energy() - self.kinetic_energy()
    }

    pub fn from_primitives(primitives: &State<Primitive>, gas_law: &GasLaw) -> Self {
        let density = primitives.density();
        let momentum = density * primitives.velocity();
        let energy = 0.5 * momentum.dot(primitives.velocity())
            + gas_law.thermal_energy_from_pressure(primitives.pressure());
        Self::new(density, momentum, energy)
            .with_passive_scalar(density * primitives.passive_scalar())
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use glam::DVec3;

    use super::*;
    use crate::gas_law::GasLaw;

    #[test]
    fn test_conversions() {
        let primitives = State::<Primitive>::new(
            0.75,
            DVec3 {
                x: 0.4,
                y: -0.1,
                z: 0.,
            },
            0.8,
        )
        .with_passive_scalar(0.3);
        let gas_law = GasLaw::new(5. / 3.);
        let conserved = State::<Conserved>::from_primitives(&primitives, &gas_law);
        let primitives_new = State::<Primitive>::from_conserved(&conserved, &gas_law);

        assert_approx_eq!(f64, primitives.density(), primitives_new.density());
        assert_approx_eq!(f64, primitives.velocity().x, primitives_new.velocity().x);
        assert_approx_eq!(f64, primitives.velocity().y, primitives_new.velocity().y);
        assert_approx_eq!(f64, primitives.velocity().z, primitives_new.velocity().z);
        assert_approx_eq!(f64, primitives.pressure(), primitives_new.pressure());
        assert_approx_eq!(f64, primitives.passive_scalar(), primitives_new.passive_scalar());
    }

    #[test]
    fn test_non_positive_mass() {
        let gas_law = GasLaw::new(1.4);
        let conserved = State::<Conserved>::new(-1e-3, DVec3::X, 2.);
        let primitives = State::<Primitive>::from_conserved(&conserved, &gas_law);
        assert_eq!(primitives.velocity(), DVec3::ZERO);
        assert_approx_eq!(f64, primitives.pressure(), 0.8);
    }

    #[test]
    fn test_flux() {
        let gas_law = GasLaw::new(1.4);
        let w = State::<Primitive>::new(2., DVec3::new(0.5, 1., 0.), 3.).with_passive_scalar(0.5);
        let flux = w.flux(DVec3::X, &gas_law);
        let energy = 0.5 * 2. * 1.25 + 3. / 0.4;
        assert_approx_eq!(f64, flux.mass(), 1.);
        assert_approx_eq!(f64, flux.momentum().x, 2. * 0.25 + 3.);
        assert_approx_eq!(f64, flux.momentum().y, 1.);
        assert_approx_eq!(f64, flux.momentum().z, 0.);
        assert_approx_eq!(f64, flux.energy(), (energy + 3.) * 0.5);
        assert_approx_eq!(f64, flux.passive_scalar(), 0.5);

        let flux_y = w.flux(DVec3::Y, &gas_law);
        assert_approx_eq!(f64, flux_y.mass(), 2.);
        assert_approx_eq!(f64, flux_y.momentum().y, 2. + 3.);
    }

    #[test]
    fn test_non_finite_detection() {
        let mut conserved = State::<Conserved>::new(1., DVec3::ZERO, 1.);
        assert!(conserved.first_non_finite().is_none());
        conserved[4] = f64::NAN;
        let (quantity, value) = conserved.first_non_finite().unwrap();
        assert_eq!(quantity, Quantity::Energy);
        assert!(value.is_nan());

        let mut primitives = State::<Primitive>::new(1., DVec3::ZERO, 1.);
        primitives[2] = f64::INFINITY;
        assert_eq!(
            primitives.first_non_finite().map(|(q, _)| q),
            Some(Quantity::VelocityY)
        );
    }
}
