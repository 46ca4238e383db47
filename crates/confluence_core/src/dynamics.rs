//! The dynamics assembler.
//!
//! `Dynamics` owns the coordinate registry and an ordered list of
//! contributors. It exposes a single derivative function that an external
//! integrator calls once per stage.

use crate::contributor::Contributor;
use crate::coordinates::{CoordinateLayout, Coordinates};
use crate::error::{CoordinateError, Result};
use crate::traits::{DynamicalSystem, Scalar};

/// Lifecycle of a [`Dynamics`].
///
/// Contributors can only be added while in `Setup`. The first evaluation moves
/// the system to `Running`, after which the coordinate count is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Running,
}

/// A system of first-order ODEs assembled from contributors.
pub struct Dynamics<'c, T: Scalar> {
    coordinates: Coordinates,
    contributors: Vec<Box<dyn Contributor<T> + 'c>>,
    phase: Phase,
}

impl<'c, T: Scalar> Default for Dynamics<'c, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c, T: Scalar> Dynamics<'c, T> {
    pub fn new() -> Self {
        Self {
            coordinates: Coordinates::new(),
            contributors: Vec::new(),
            phase: Phase::Setup,
        }
    }

    /// Adds a contributor, letting it declare its coordinates immediately.
    ///
    /// If the declaration fails, any coordinates it registered are rolled back
    /// and the contributor is dropped.
    pub fn add_contributor<C>(&mut self, mut contributor: C) -> Result<()>
    where
        C: Contributor<T> + 'c,
    {
        if self.phase == Phase::Running {
            log::warn!("rejected contributor added after evaluation began");
            return Err(CoordinateError::PhaseViolation {
                operation: "adding a contributor after evaluation began",
            });
        }

        let before = self.coordinates.size();
        if let Err(err) = contributor.declare_coordinates(&mut self.coordinates) {
            self.coordinates.truncate(before);
            return Err(err);
        }

        self.contributors.push(Box::new(contributor));
        log::debug!(
            "added contributor #{} ({} new coordinates, {} total)",
            self.contributors.len(),
            self.coordinates.size() - before,
            self.coordinates.size()
        );
        Ok(())
    }

    /// Computes the state derivative.
    ///
    /// `derivative` is zeroed and then filled in place with the sum of every
    /// contributor's contributions, in the order the contributors were added.
    /// Both buffers must have length [`Dynamics::size`].
    pub fn evaluate(&mut self, state: &[T], derivative: &mut [T]) -> Result<()> {
        if self.phase == Phase::Setup {
            log::info!(
                "dynamics running with {} coordinates from {} contributors",
                self.coordinates.size(),
                self.contributors.len()
            );
            self.phase = Phase::Running;
        }
        log::trace!("evaluating {} contributors", self.contributors.len());

        let mut frame = self.coordinates.reset(state, derivative)?;
        for contributor in &self.contributors {
            contributor.declare_contributions(&mut frame)?;
        }
        Ok(())
    }

    /// Evaluates into a freshly allocated derivative vector.
    pub fn derivative(&mut self, state: &[T]) -> Result<Vec<T>> {
        let mut out = vec![T::zero(); self.size()];
        self.evaluate(state, &mut out)?;
        Ok(out)
    }

    /// Number of registered coordinates; the length of every state buffer.
    pub fn size(&self) -> usize {
        self.coordinates.size()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn contributor_count(&self) -> usize {
        self.contributors.len()
    }

    pub fn layout(&self) -> CoordinateLayout {
        self.coordinates.layout()
    }

    /// See [`Coordinates::state_vector`].
    pub fn state_vector<'n, I>(&self, values: I) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = (&'n str, T)>,
    {
        self.coordinates.state_vector(values)
    }
}

impl<'c, T: Scalar> DynamicalSystem<T> for Dynamics<'c, T> {
    fn dimension(&self) -> usize {
        self.size()
    }

    fn apply(&mut self, _t: T, x: &[T], out: &mut [T]) -> Result<()> {
        self.evaluate(x, out)
    }
}
