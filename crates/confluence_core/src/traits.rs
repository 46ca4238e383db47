use crate::error::Result;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as coordinate values.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Converts an `f64` constant into the scalar type.
/// Values the target type cannot represent become NaN rather than panicking.
pub(crate) fn constant<T: Scalar>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// The right-hand side of a first-order ODE, as seen by an external integrator.
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates dx/dt.
    /// t: current time
    /// x: current state
    /// out: buffer receiving the derivative; overwritten in full
    fn apply(&mut self, t: T, x: &[T], out: &mut [T]) -> Result<()>;
}
