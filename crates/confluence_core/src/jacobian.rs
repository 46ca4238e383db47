//! Finite-difference Jacobians of an assembled system.
//!
//! Contributors only promise values, not derivatives, so implicit integrators
//! that need `∂f/∂x` get it from central differences over the derivative
//! function.

use crate::traits::DynamicalSystem;
use anyhow::{bail, Context, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JacobianSettings {
    /// Relative perturbation; scaled by `max(1, |x_j|)` per column.
    pub relative_step: f64,
}

impl Default for JacobianSettings {
    fn default() -> Self {
        Self {
            relative_step: 1e-6,
        }
    }
}

/// Evaluates the derivative function once and returns it as a vector.
pub fn evaluate<S>(system: &mut S, t: f64, state: &[f64]) -> Result<DVector<f64>>
where
    S: DynamicalSystem<f64> + ?Sized,
{
    let mut out = vec![0.0; system.dimension()];
    system
        .apply(t, state, &mut out)
        .context("Failed to evaluate the derivative function.")?;
    Ok(DVector::from_vec(out))
}

/// Central-difference Jacobian; entry `(i, j)` is `∂f_i/∂x_j`.
pub fn jacobian<S>(
    system: &mut S,
    t: f64,
    state: &[f64],
    settings: JacobianSettings,
) -> Result<DMatrix<f64>>
where
    S: DynamicalSystem<f64> + ?Sized,
{
    let dim = system.dimension();
    if state.len() != dim {
        bail!(
            "State dimension mismatch. Expected {}, got {}.",
            dim,
            state.len()
        );
    }
    if !(settings.relative_step > 0.0 && settings.relative_step.is_finite()) {
        bail!("relative_step must be positive and finite.");
    }

    let mut jac = DMatrix::zeros(dim, dim);
    let mut perturbed = state.to_vec();
    let mut forward = vec![0.0; dim];
    let mut backward = vec![0.0; dim];

    for j in 0..dim {
        let h = settings.relative_step * state[j].abs().max(1.0);

        perturbed[j] = state[j] + h;
        system
            .apply(t, &perturbed, &mut forward)
            .with_context(|| format!("Failed to evaluate forward perturbation of column {j}."))?;
        perturbed[j] = state[j] - h;
        system
            .apply(t, &perturbed, &mut backward)
            .with_context(|| format!("Failed to evaluate backward perturbation of column {j}."))?;
        perturbed[j] = state[j];

        for i in 0..dim {
            jac[(i, j)] = (forward[i] - backward[i]) / (2.0 * h);
        }
    }

    Ok(jac)
}
