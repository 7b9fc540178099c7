//! Error types for cellfield operations.
//!
//! Recoverable conditions (bad configuration, out-of-order calls, corrupt
//! checkpoints) are reported through [`FieldError`]. Internal consistency
//! failures of the transform itself are not errors: they abort.

use crate::types::SignalId;
use std::error::Error;
use std::fmt;

/// Result type for cellfield operations.
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors that can occur during cellfield operations.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Configuration errors.
    Config(ConfigError),
    /// Transform lifecycle errors.
    Transform(TransformError),
    /// Checkpoint encoding/decoding errors.
    Checkpoint(CheckpointError),
    /// I/O errors (wrapped).
    Io(String),
    /// Serialization errors.
    Serialization(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Config(e) => write!(f, "Config error: {}", e),
            FieldError::Transform(e) => write!(f, "Transform error: {}", e),
            FieldError::Checkpoint(e) => write!(f, "Checkpoint error: {}", e),
            FieldError::Io(msg) => write!(f, "I/O error: {}", msg),
            FieldError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for FieldError {}

impl From<std::io::Error> for FieldError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => FieldError::Checkpoint(CheckpointError::Truncated),
            _ => FieldError::Io(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(e: serde_json::Error) -> Self {
        FieldError::Serialization(e.to_string())
    }
}

impl From<ConfigError> for FieldError {
    fn from(e: ConfigError) -> Self {
        FieldError::Config(e)
    }
}

impl From<TransformError> for FieldError {
    fn from(e: TransformError) -> Self {
        FieldError::Transform(e)
    }
}

impl From<CheckpointError> for FieldError {
    fn from(e: CheckpointError) -> Self {
        FieldError::Checkpoint(e)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid value.
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// The same signal configured twice.
    DuplicateSignal(SignalId),
    /// Signal not present in the configuration.
    UnknownSignal(SignalId),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value for {}: {} ({})", field, value, reason)
            }
            ConfigError::DuplicateSignal(signal) => {
                write!(f, "Signal configured more than once: {}", signal)
            }
            ConfigError::UnknownSignal(signal) => {
                write!(f, "Signal is not configured as diffusive: {}", signal)
            }
        }
    }
}

/// Transform lifecycle errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// An operation was called in the wrong phase of the cycle.
    InvalidPhase {
        operation: &'static str,
        phase: String,
    },
    /// The population changed size between ingestion and delivery.
    PopulationChanged { ingested: usize, delivered: usize },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::InvalidPhase { operation, phase } => {
                write!(f, "Cannot {} while transform is {}", operation, phase)
            }
            TransformError::PopulationChanged {
                ingested,
                delivered,
            } => write!(
                f,
                "Population changed between ingestion ({} cells) and delivery ({} cells)",
                ingested, delivered
            ),
        }
    }
}

/// Checkpoint errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckpointError {
    /// Input ended in the middle of a record.
    Truncated,
    /// The record count does not fit the 16-bit header.
    TooManySignals(usize),
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::Truncated => write!(f, "Checkpoint data is truncated"),
            CheckpointError::TooManySignals(n) => {
                write!(f, "Too many diffusive signals to checkpoint: {} (max {})", n, u16::MAX)
            }
        }
    }
}

// Convenience constructors
impl FieldError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FieldError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn unknown_signal(signal: SignalId) -> Self {
        FieldError::Config(ConfigError::UnknownSignal(signal))
    }

    pub fn invalid_phase(operation: &'static str, phase: impl fmt::Display) -> Self {
        FieldError::Transform(TransformError::InvalidPhase {
            operation,
            phase: phase.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_maps_to_truncated_checkpoint() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        assert_eq!(FieldError::from(io), FieldError::Checkpoint(CheckpointError::Truncated));
    }

    #[test]
    fn display_names_the_phase() {
        let e = FieldError::invalid_phase("normalize", "idle");
        assert_eq!(e.to_string(), "Transform error: Cannot normalize while transform is idle");
    }
}
