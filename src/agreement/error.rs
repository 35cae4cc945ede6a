//! Error types for configuration and agreement runs

use crate::agreement::types::{ParticipantId, RelayPath};

/// Configuration rejected before any round runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: String,
    pub reason: String,
}

impl ConfigError {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        ConfigError {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid configuration for {}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised while running the agreement protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgreementError {
    InvalidConfig(ConfigError),
    /// A relayer has no record for the path it is supposed to extend
    MissingParentRecord {
        participant: ParticipantId,
        path: RelayPath,
    },
    /// Aggregation found no record for a path the tree says was delivered
    MissingRecord {
        participant: ParticipantId,
        path: RelayPath,
    },
    /// The path tree has no entry where one is required
    MissingTreeEntry(String),
    UnknownParticipant(ParticipantId),
    RoundOutOfOrder {
        expected: usize,
        requested: usize,
    },
    RoundsIncomplete {
        completed: usize,
        required: usize,
    },
    Runtime(String),
}

impl std::fmt::Display for AgreementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgreementError::InvalidConfig(e) => write!(f, "{}", e),
            AgreementError::MissingParentRecord { participant, path } => write!(
                f,
                "General {} has no record to relay along {}",
                participant, path
            ),
            AgreementError::MissingRecord { participant, path } => {
                write!(f, "General {} has no record for {}", participant, path)
            }
            AgreementError::MissingTreeEntry(e) => write!(f, "Path tree entry missing: {}", e),
            AgreementError::UnknownParticipant(id) => write!(f, "No general with id {}", id),
            AgreementError::RoundOutOfOrder {
                expected,
                requested,
            } => write!(
                f,
                "Round {} requested but round {} is next",
                requested, expected
            ),
            AgreementError::RoundsIncomplete {
                completed,
                required,
            } => write!(
                f,
                "Only {} of {} rounds relayed before deciding",
                completed, required
            ),
            AgreementError::Runtime(e) => write!(f, "Runtime error: {}", e),
        }
    }
}

impl std::error::Error for AgreementError {}

impl From<ConfigError> for AgreementError {
    fn from(err: ConfigError) -> Self {
        AgreementError::InvalidConfig(err)
    }
}

impl From<tokio::task::JoinError> for AgreementError {
    fn from(err: tokio::task::JoinError) -> Self {
        AgreementError::Runtime(err.to_string())
    }
}

/// Result type for agreement operations
pub type AgreementResult<T> = Result<T, AgreementError>;
