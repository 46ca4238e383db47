use crate::contributor::Contributor;
use crate::coordinates::{Coordinates, Frame};
use crate::error::{CoordinateError, Result};
use crate::traits::{constant, Scalar};
use serde::{Deserialize, Serialize};

/// Exponential atmosphere: `density = surface_density * exp(h / scale_height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereModel {
    pub surface_density: f64,
    pub scale_height: f64,
}

impl Default for AtmosphereModel {
    fn default() -> Self {
        Self {
            surface_density: 1.225,
            scale_height: 8500.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DragIndices {
    x_dot: usize,
    y_dot: usize,
    mass: usize,
}

/// Quadratic drag with a constant drag coefficient and cross-sectional area.
/// Kept two dimensional.
///
/// The drag acceleration `0.5 * rho * |v|^2 * cd * area / mass` is split into
/// components along `alpha = atan(y_dot / x_dot)` and subtracted from the
/// velocity derivatives.
///
/// Two quirks are kept for compatibility with existing trajectories:
/// - the density height is read from the `y_dot` coordinate, not `y`;
/// - `alpha` comes from `atan`, not `atan2`, so the split always opposes `+x`
///   rather than the velocity direction.
///
/// The model is undefined at `x_dot == 0` (including at rest) and at
/// `mass == 0`; both fail with [`CoordinateError::Singular`] instead of
/// producing non-finite derivatives.
#[derive(Debug, Clone)]
pub struct ConstantCdAndAreaDrag<T: Scalar> {
    cd: T,
    area: T,
    atmosphere: AtmosphereModel,
    x_key: String,
    y_key: String,
    x_dot_key: String,
    y_dot_key: String,
    mass_key: String,
    indices: Option<DragIndices>,
}

impl<T: Scalar> ConstantCdAndAreaDrag<T> {
    pub fn new(
        cd: T,
        area: T,
        x_key: impl Into<String>,
        y_key: impl Into<String>,
        x_dot_key: impl Into<String>,
        y_dot_key: impl Into<String>,
        mass_key: impl Into<String>,
    ) -> Self {
        Self {
            cd,
            area,
            atmosphere: AtmosphereModel::default(),
            x_key: x_key.into(),
            y_key: y_key.into(),
            x_dot_key: x_dot_key.into(),
            y_dot_key: y_dot_key.into(),
            mass_key: mass_key.into(),
            indices: None,
        }
    }

    pub fn with_atmosphere(mut self, atmosphere: AtmosphereModel) -> Self {
        self.atmosphere = atmosphere;
        self
    }

    pub fn atmosphere(&self) -> AtmosphereModel {
        self.atmosphere
    }

    fn density(&self, height: T) -> T {
        let rho0: T = constant(self.atmosphere.surface_density);
        let scale: T = constant(self.atmosphere.scale_height);
        rho0 * (height / scale).exp()
    }
}

impl<T: Scalar> Contributor<T> for ConstantCdAndAreaDrag<T> {
    fn declare_coordinates(&mut self, coordinates: &mut Coordinates) -> Result<()> {
        coordinates.register(&self.x_key)?;
        let x_dot = coordinates.register(&self.x_dot_key)?;
        coordinates.register(&self.y_key)?;
        let y_dot = coordinates.register(&self.y_dot_key)?;
        let mass = coordinates.register(&self.mass_key)?;
        self.indices = Some(DragIndices { x_dot, y_dot, mass });
        Ok(())
    }

    fn declare_contributions(&self, frame: &mut Frame<'_, T>) -> Result<()> {
        let idx = self.indices.ok_or(CoordinateError::PhaseViolation {
            operation: "contributing before declaring coordinates",
        })?;

        let density = self.density(frame.value_at(idx.y_dot)?);

        let x_dot = frame.value_at(idx.x_dot)?;
        let y_dot = frame.value_at(idx.y_dot)?;
        let mass = frame.value_at(idx.mass)?;

        if mass.is_zero() {
            return Err(CoordinateError::Singular {
                model: "quadratic drag",
                quantity: "mass",
            });
        }
        if x_dot.is_zero() {
            return Err(CoordinateError::Singular {
                model: "quadratic drag",
                quantity: "horizontal velocity",
            });
        }

        let v2 = x_dot * x_dot + y_dot * y_dot;
        let drag_acc = constant::<T>(0.5) * density * v2 * self.cd * self.area / mass;

        let alpha = (y_dot / x_dot).atan();
        frame.accumulate(idx.x_dot, -drag_acc * alpha.cos())?;
        frame.accumulate(idx.y_dot, -drag_acc * alpha.sin())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AtmosphereModel, ConstantCdAndAreaDrag};
    use crate::contributors::UnidirectionalGravity;
    use crate::error::CoordinateError;
    use crate::dynamics::Dynamics;

    fn unit_drag() -> ConstantCdAndAreaDrag<f64> {
        ConstantCdAndAreaDrag::new(1.0, 1.0, "x", "y", "x_dot", "y_dot", "mass")
    }

    #[test]
    fn registers_coordinates_in_declaration_order() {
        let mut dynamics = Dynamics::new();
        dynamics.add_contributor(unit_drag()).unwrap();
        assert_eq!(
            dynamics.layout().names,
            vec!["x", "x_dot", "y", "y_dot", "mass"]
        );
    }

    #[test]
    fn horizontal_motion_produces_horizontal_drag_only() {
        let mut dynamics = Dynamics::new();
        dynamics.add_contributor(unit_drag()).unwrap();
        let state = dynamics
            .state_vector([("x_dot", 10.0), ("y_dot", 0.0), ("mass", 1.0)])
            .unwrap();
        let derivative = dynamics.derivative(&state).unwrap();

        let x_dot = dynamics.coordinates().index_of("x_dot").unwrap();
        let y_dot = dynamics.coordinates().index_of("y_dot").unwrap();
        assert_eq!(derivative[y_dot], 0.0);
        assert!((derivative[x_dot] + 0.5 * 1.225 * 100.0).abs() < 1e-12);
        for (i, value) in derivative.iter().enumerate() {
            if i != x_dot {
                assert_eq!(*value, 0.0);
            }
        }
    }

    #[test]
    fn drag_scales_with_velocity_squared_and_inverse_mass() {
        let mut dynamics = Dynamics::new();
        dynamics.add_contributor(unit_drag()).unwrap();
        let x_dot = dynamics.coordinates().index_of("x_dot").unwrap();

        let slow = dynamics
            .state_vector([("x_dot", 5.0), ("mass", 1.0)])
            .unwrap();
        let fast = dynamics
            .state_vector([("x_dot", 10.0), ("mass", 2.0)])
            .unwrap();
        let slow_acc = dynamics.derivative(&slow).unwrap()[x_dot];
        let fast_acc = dynamics.derivative(&fast).unwrap()[x_dot];
        assert!((fast_acc / slow_acc - 2.0).abs() < 1e-12);
    }

    #[test]
    fn oblique_velocity_splits_along_heading() {
        let mut dynamics = Dynamics::new();
        dynamics.add_contributor(unit_drag()).unwrap();
        let state = dynamics
            .state_vector([("x_dot", 3.0), ("y_dot", 4.0), ("mass", 1.0)])
            .unwrap();
        let derivative = dynamics.derivative(&state).unwrap();

        let density = 1.225 * (4.0_f64 / 8500.0).exp();
        let drag = 0.5 * density * 25.0;
        assert!((derivative[1] + drag * 0.6).abs() < 1e-9);
        assert!((derivative[3] + drag * 0.8).abs() < 1e-9);
    }

    #[test]
    fn density_reads_vertical_velocity_slot() {
        let atmosphere = AtmosphereModel {
            surface_density: 2.0,
            scale_height: 1.0,
        };
        let mut drag = unit_drag().with_atmosphere(atmosphere);
        let mut dynamics = Dynamics::new();
        dynamics.add_contributor(&mut drag).unwrap();

        let low = dynamics
            .state_vector([("x_dot", 1.0), ("y", 0.0), ("mass", 1.0)])
            .unwrap();
        let high = dynamics
            .state_vector([("x_dot", 1.0), ("y", 1000.0), ("mass", 1.0)])
            .unwrap();
        let low_acc = dynamics.derivative(&low).unwrap()[1];
        let high_acc = dynamics.derivative(&high).unwrap()[1];
        assert_eq!(low_acc, high_acc);
        assert!((low_acc + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_horizontal_velocity_is_singular() {
        let mut drag = unit_drag();
        let mut dynamics = Dynamics::new();
        dynamics.add_contributor(&mut drag).unwrap();

        let vertical = dynamics
            .state_vector([("y_dot", -2.0), ("mass", 1.0)])
            .unwrap();
        assert_eq!(
            dynamics.derivative(&vertical),
            Err(CoordinateError::Singular {
                model: "quadratic drag",
                quantity: "horizontal velocity",
            })
        );

        let at_rest = dynamics.state_vector([("mass", 1.0)]).unwrap();
        assert!(matches!(
            dynamics.derivative(&at_rest),
            Err(CoordinateError::Singular {
                quantity: "horizontal velocity",
                ..
            })
        ));
    }

    #[test]
    fn zero_mass_is_singular() {
        let mut dynamics = Dynamics::new();
        dynamics.add_contributor(unit_drag()).unwrap();
        let state = dynamics.state_vector([("x_dot", 10.0)]).unwrap();
        let mut derivative = vec![0.0; dynamics.size()];
        let result = dynamics.evaluate(&state, &mut derivative);
        assert!(matches!(
            result,
            Err(CoordinateError::Singular {
                quantity: "mass",
                ..
            })
        ));
        assert!(derivative.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn drag_and_gravity_share_vertical_velocity() {
        let mut dynamics = Dynamics::new();
        dynamics.add_contributor(unit_drag()).unwrap();
        dynamics
            .add_contributor(UnidirectionalGravity::new(-9.81, "y", "y_dot"))
            .unwrap();
        assert_eq!(dynamics.size(), 5);

        let state = dynamics
            .state_vector([("x_dot", 10.0), ("mass", 1.0)])
            .unwrap();
        let derivative = dynamics.derivative(&state).unwrap();
        assert!((derivative[3] + 9.81).abs() < 1e-12);
        assert!((derivative[1] + 61.25).abs() < 1e-12);
    }

    #[test]
    fn atmosphere_deserializes_from_json() {
        let atmosphere: AtmosphereModel =
            serde_json::from_str(r#"{"surface_density":1.0,"scale_height":7000.0}"#).unwrap();
        assert_eq!(atmosphere.scale_height, 7000.0);
        assert_eq!(AtmosphereModel::default().surface_density, 1.225);

        let drag = unit_drag().with_atmosphere(atmosphere);
        assert_eq!(drag.atmosphere(), atmosphere);
    }
}
