//! The coordinate registry.
//!
//! `Coordinates` is the broker between contributors: it hands out a dense
//! index for every named quantity so that no contributor needs to know the
//! total number of coordinates or the order in which they were declared.
//! During an evaluation the registry lends itself to a [`Frame`], which
//! borrows the integrator's state and derivative buffers for exactly one call.

use crate::error::{CoordinateError, Result};
use crate::traits::Scalar;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps coordinate names to dense indices in registration order.
#[derive(Debug, Clone, Default)]
pub struct Coordinates {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
    sealed: bool,
}

impl Coordinates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a coordinate and returns its index.
    ///
    /// A name that is already registered keeps its index and nothing changes,
    /// which is how two contributors end up sharing one physical quantity.
    /// Once the registry has been sealed by [`Coordinates::reset`], new names
    /// are rejected: the external buffers have already been sized.
    pub fn register(&mut self, name: &str) -> Result<usize> {
        if let Some(&index) = self.lookup.get(name) {
            log::debug!("coordinate \"{name}\" already registered at index {index}");
            return Ok(index);
        }
        if self.sealed {
            return Err(CoordinateError::PhaseViolation {
                operation: "registering a coordinate after evaluation began",
            });
        }

        let index = self.names.len();
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), index);
        log::debug!("registered coordinate \"{name}\" at index {index}");
        Ok(index)
    }

    /// Drops every coordinate registered at or after `len`.
    /// Used to roll back a declaration that failed partway through.
    pub(crate) fn truncate(&mut self, len: usize) {
        for name in self.names.drain(len.min(self.names.len())..) {
            self.lookup.remove(&name);
        }
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.lookup
            .get(name)
            .copied()
            .ok_or_else(|| CoordinateError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn name_of(&self, index: usize) -> Result<&str> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or(CoordinateError::OutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Number of registered coordinates.
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// Names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn layout(&self) -> CoordinateLayout {
        CoordinateLayout {
            names: self.names.clone(),
        }
    }

    /// Builds a state vector in index order from `(name, value)` pairs.
    /// Coordinates that are not named stay at zero.
    pub fn state_vector<'n, T, I>(&self, values: I) -> Result<Vec<T>>
    where
        T: Scalar,
        I: IntoIterator<Item = (&'n str, T)>,
    {
        let mut state = vec![T::zero(); self.size()];
        for (name, value) in values {
            state[self.index_of(name)?] = value;
        }
        Ok(state)
    }

    /// Lends the registry to one evaluation.
    ///
    /// Both buffers must match [`Coordinates::size`]; the check happens before
    /// anything is touched. On success the derivative buffer is zeroed, so
    /// accumulation always starts from a clean slate, and the registry is
    /// sealed against further registration.
    pub fn reset<'a, T: Scalar>(
        &'a mut self,
        state: &'a [T],
        derivative: &'a mut [T],
    ) -> Result<Frame<'a, T>> {
        let expected = self.size();
        if state.len() != expected {
            return Err(CoordinateError::LengthMismatch {
                buffer: "state",
                expected,
                actual: state.len(),
            });
        }
        if derivative.len() != expected {
            return Err(CoordinateError::LengthMismatch {
                buffer: "derivative",
                expected,
                actual: derivative.len(),
            });
        }

        self.sealed = true;
        derivative.fill(T::zero());

        Ok(Frame {
            coordinates: self,
            state,
            derivative,
        })
    }
}

/// A registry view bound to one evaluation's buffers.
///
/// Contributors read state and accumulate derivatives through a frame using
/// the indices they cached while declaring coordinates. The frame never
/// outlives the evaluation, so replacing buffers between steps cannot leave a
/// contributor holding a stale reference.
#[derive(Debug)]
pub struct Frame<'a, T: Scalar> {
    coordinates: &'a Coordinates,
    state: &'a [T],
    derivative: &'a mut [T],
}

impl<'a, T: Scalar> Frame<'a, T> {
    pub fn size(&self) -> usize {
        self.state.len()
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.coordinates.index_of(name)
    }

    pub fn value_at(&self, index: usize) -> Result<T> {
        self.state
            .get(index)
            .copied()
            .ok_or(CoordinateError::OutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Adds `value` to the derivative at `index`.
    /// Contributions are summed, never overwritten.
    pub fn accumulate(&mut self, index: usize, value: T) -> Result<()> {
        let size = self.size();
        let slot = self
            .derivative
            .get_mut(index)
            .ok_or(CoordinateError::OutOfRange { index, size })?;
        *slot = *slot + value;
        Ok(())
    }

    /// The derivative accumulated so far in this evaluation.
    pub fn derivative(&self) -> &[T] {
        self.derivative
    }
}

/// Ordered coordinate names, detached from the registry.
/// Used to label state columns when recording or exporting a trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateLayout {
    pub names: Vec<String>,
}

impl CoordinateLayout {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
