use crate::contributor::Contributor;
use crate::coordinates::{Coordinates, Frame};
use crate::error::{CoordinateError, Result};
use crate::traits::Scalar;

/// Unidirectional gravity, i.e. weight along a single axis.
///
/// Adds a constant acceleration to the derivative of `z_dot`. The `z`
/// coordinate is registered so that the layout carries the matching position
/// even though this contributor never reads it.
#[derive(Debug, Clone)]
pub struct UnidirectionalGravity<T: Scalar> {
    acceleration: T,
    z_key: String,
    z_dot_key: String,
    indices: Option<(usize, usize)>,
}

impl<T: Scalar> UnidirectionalGravity<T> {
    pub fn new(acceleration: T, z_key: impl Into<String>, z_dot_key: impl Into<String>) -> Self {
        Self {
            acceleration,
            z_key: z_key.into(),
            z_dot_key: z_dot_key.into(),
            indices: None,
        }
    }

    pub fn acceleration(&self) -> T {
        self.acceleration
    }

    pub fn z_index(&self) -> Option<usize> {
        self.indices.map(|(z, _)| z)
    }

    pub fn z_dot_index(&self) -> Option<usize> {
        self.indices.map(|(_, z_dot)| z_dot)
    }
}

impl<T: Scalar> Contributor<T> for UnidirectionalGravity<T> {
    fn declare_coordinates(&mut self, coordinates: &mut Coordinates) -> Result<()> {
        let z = coordinates.register(&self.z_key)?;
        let z_dot = coordinates.register(&self.z_dot_key)?;
        self.indices = Some((z, z_dot));
        Ok(())
    }

    fn declare_contributions(&self, frame: &mut Frame<'_, T>) -> Result<()> {
        let (_, z_dot) = self.indices.ok_or(CoordinateError::PhaseViolation {
            operation: "contributing before declaring coordinates",
        })?;
        frame.accumulate(z_dot, self.acceleration)
    }
}
