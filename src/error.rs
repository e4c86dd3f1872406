//! Error type shared by the annealing engine and the record stores.

use crate::asa::AnnealState;

/// Coarse classification of an [`AnnealError`].
///
/// Callers usually only need to know whether they passed bad input, drove
/// the protocol out of order, or hit a numeric failure that ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad construction input or configuration. Nothing was created.
    InvalidArgument,
    /// An operation was called in a state where it is not valid.
    /// The engine was left untouched.
    InvalidState,
    /// Non-recoverable numeric failure. The engine has been moved to
    /// [`AnnealState::ReadyToStop`] and can not be stepped again.
    Fatal,
    /// A persistence back-end failed.
    Store,
}

/// Errors produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum AnnealError {
    /// The initial parameter vector has no elements.
    #[error("initial parameters must have at least one dimension")]
    EmptyParameters,

    /// A per-dimension input does not have D entries.
    #[error("dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Which input was mismatched.
        what: &'static str,
        /// The number of dimensions D.
        expected: usize,
        /// The length that was supplied.
        got: usize,
    },

    /// A bound pair with `min > max` or a non-finite limit.
    #[error("invalid bounds in dimension {index}: [{min}, {max}]")]
    InvalidBounds {
        /// Dimension index.
        index: usize,
        /// Lower limit.
        min: f64,
        /// Upper limit.
        max: f64,
    },

    /// The initial point lies outside the search box.
    #[error("initial parameter {index} = {value} lies outside [{min}, {max}]")]
    OutOfBounds {
        /// Dimension index.
        index: usize,
        /// Offending value.
        value: f64,
        /// Lower limit.
        min: f64,
        /// Upper limit.
        max: f64,
    },

    /// Rejected by [`AsaConfig::validate`](crate::asa::AsaConfig::validate).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A protocol operation was called out of order.
    #[error("`{operation}` is not valid in state {state:?}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the engine was in.
        state: AnnealState,
    },

    /// A reanneal tangent estimate was NaN or infinite.
    #[error("non-finite tangent {value} in dimension {index}")]
    NonFiniteTangent {
        /// Dimension index.
        index: usize,
        /// The tangent value.
        value: f64,
    },

    /// A rescaled reanneal temperature was not a positive finite number.
    #[error("rescaled temperature {value} in dimension {index} is not positive and finite")]
    InvalidRescaledTemperature {
        /// Dimension index.
        index: usize,
        /// The rescaled temperature.
        value: f64,
    },

    /// No in-bounds candidate was produced within the attempt limit.
    #[error("no in-bounds candidate after {attempts} attempts")]
    GenerationExhausted {
        /// How many whole vectors were drawn.
        attempts: usize,
    },

    /// Generic persistence back-end failure.
    #[error("record store: {0}")]
    Store(String),

    /// I/O failure while writing a record.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialisation failure.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AnnealError {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnnealError::EmptyParameters
            | AnnealError::DimensionMismatch { .. }
            | AnnealError::InvalidBounds { .. }
            | AnnealError::OutOfBounds { .. }
            | AnnealError::InvalidConfig(_) => ErrorKind::InvalidArgument,
            AnnealError::InvalidState { .. } => ErrorKind::InvalidState,
            AnnealError::NonFiniteTangent { .. }
            | AnnealError::InvalidRescaledTemperature { .. }
            | AnnealError::GenerationExhausted { .. } => ErrorKind::Fatal,
            AnnealError::Store(_) | AnnealError::Io(_) => ErrorKind::Store,
            #[cfg(feature = "serde")]
            AnnealError::Json(_) => ErrorKind::Store,
        }
    }

    /// True for errors that end the run.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, AnnealError>;
