use num_traits::Float;
use std::fmt::Debug;

use crate::error::Result;
use crate::field::ConcentrationFields;

/// Numeric types the Runge–Kutta integrator can work with.
pub trait Scalar: Float + Debug + 'static {}

impl<T: Float + Debug + 'static> Scalar for T {}

/// A semi-discrete (method-of-lines) system `dy/dT = f(T, y)`.
pub trait DynamicalSystem<T: Scalar> {
    /// Length of the state vector.
    fn dimension(&self) -> usize;

    /// Writes `f(t, x)` into `out`.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// A fixed-step integrator for a [`DynamicalSystem`].
pub trait Steppable<T: Scalar> {
    /// Advances `state` from `t` to `t + dt` in place.
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}

/// One time-integration scheme for the concentration fields.
///
/// Implementations read row `k - 1` and fill row `k` of every field they
/// own, surface node included. `eps` is the dimensionless overpotential that
/// drives the electrode at row `k`.
pub trait DiffusionScheme {
    fn name(&self) -> &'static str;

    fn advance(&mut self, fields: &mut ConcentrationFields, k: usize, eps: f64) -> Result<()>;

    /// Potential the electrode actually sees while `applied` is imposed.
    fn electrode_potential(&self, applied: f64) -> f64 {
        applied
    }

    /// Current measured in the external circuit at the present row, given
    /// the faradaic current. `dt` is the physical length of the next step,
    /// `None` on the last row.
    fn measured_current(&mut self, _applied: f64, faradaic: f64, _dt: Option<f64>) -> f64 {
        faradaic
    }
}
