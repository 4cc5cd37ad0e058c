//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// Functions in this workspace return [`anyhow::Result`]; errors of this type
/// are wrapped into [`anyhow::Error`] and can be recovered with
/// [`anyhow::Error::downcast_ref`].
#[derive(Error, Debug, PartialEq)]
pub enum DqnError {
    /// Invalid shape, capacity, action count or other construction parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A batch was requested from a replay memory holding too few transitions.
    #[error("Insufficient transitions: requested {requested}, available {available}")]
    InsufficientTransitions {
        /// Requested batch size.
        requested: usize,
        /// Number of stored transitions.
        available: usize,
    },

    /// Malformed result from an environment.
    #[error("Environment contract violation: {0}")]
    EnvContract(String),

    /// An observation does not have the shape of the previously stored ones.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Shape of the stored observations.
        expected: Vec<usize>,
        /// Shape of the given observation.
        actual: Vec<usize>,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
