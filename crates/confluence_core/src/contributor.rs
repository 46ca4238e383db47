use crate::coordinates::{Coordinates, Frame};
use crate::error::Result;
use crate::traits::Scalar;

/// A contributor to the equations of motion.
///
/// Contributors follow a two-phase protocol:
/// 1. `declare_coordinates` runs once, when the contributor is added to a
///    [`Dynamics`](crate::dynamics::Dynamics). It registers every coordinate
///    the contributor reads or writes and caches the returned indices. No
///    state exists yet, so it must not try to read any.
/// 2. `declare_contributions` runs on every evaluation. It reads state through
///    the frame and accumulates into the derivative slots it affects.
///
/// Contributions must depend only on the state and the contributor's own
/// parameters; `&self` keeps them from depending on evaluation order.
pub trait Contributor<T: Scalar> {
    fn declare_coordinates(&mut self, coordinates: &mut Coordinates) -> Result<()>;

    fn declare_contributions(&self, frame: &mut Frame<'_, T>) -> Result<()>;
}

/// Lets a caller keep ownership of a contributor and lend it to the system.
impl<T: Scalar, C: Contributor<T> + ?Sized> Contributor<T> for &mut C {
    fn declare_coordinates(&mut self, coordinates: &mut Coordinates) -> Result<()> {
        (**self).declare_coordinates(coordinates)
    }

    fn declare_contributions(&self, frame: &mut Frame<'_, T>) -> Result<()> {
        (**self).declare_contributions(frame)
    }
}

impl<T: Scalar, C: Contributor<T> + ?Sized> Contributor<T> for Box<C> {
    fn declare_coordinates(&mut self, coordinates: &mut Coordinates) -> Result<()> {
        (**self).declare_coordinates(coordinates)
    }

    fn declare_contributions(&self, frame: &mut Frame<'_, T>) -> Result<()> {
        (**self).declare_contributions(frame)
    }
}
