pub mod contributor;
pub mod contributors;
pub mod coordinates;
pub mod dynamics;
pub mod error;
pub mod jacobian;
/// The `confluence_core` crate assembles the right-hand side of a first-order ODE
/// from independently authored contributors.
///
/// Contributors never see the global layout of the state vector. They declare the
/// named coordinates they touch, cache the indices handed back, and on every
/// evaluation add their share to the derivative.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `DynamicalSystem` (what an integrator calls).
/// - **Coordinates**: the name-to-index registry and the per-evaluation `Frame`.
/// - **Dynamics**: the assembler driving the two-phase contributor protocol.
/// - **Contributors**: reference gravity and quadratic drag models.
/// - **Jacobian**: finite-difference Jacobians for implicit integrators.
pub mod traits;

pub use contributor::Contributor;
pub use coordinates::{CoordinateLayout, Coordinates, Frame};
pub use dynamics::{Dynamics, Phase};
pub use error::{CoordinateError, Result};
pub use traits::{DynamicalSystem, Scalar};
