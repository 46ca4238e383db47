use thiserror::Error;

/// Failures raised by the coordinate registry and the dynamics assembler.
///
/// Every variant reflects a configuration or usage mistake, so none of them
/// are retried; they propagate straight back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("coordinate \"{name}\" is not registered")]
    NotFound { name: String },

    #[error("coordinate index {index} is out of range for {size} coordinates")]
    OutOfRange { index: usize, size: usize },

    #[error("{buffer} buffer has length {actual}, expected {expected}")]
    LengthMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{quantity} is zero in {model}; the model is singular there")]
    Singular {
        model: &'static str,
        quantity: &'static str,
    },

    #[error("{operation} is not allowed in the current phase")]
    PhaseViolation { operation: &'static str },
}

pub type Result<T, E = CoordinateError> = std::result::Result<T, E>;
