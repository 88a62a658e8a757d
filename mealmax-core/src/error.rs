//! Error taxonomy shared by the record store and the battle engine

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a meal or battle operation can surface
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed meal, outcome token, or leaderboard parameter
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("combatant list is full ({capacity} combatants), cannot add more")]
    RegistryFull { capacity: usize },

    #[error("combatant list is empty")]
    EmptyRegistry,

    #[error("two combatants must be prepped for a battle, found {found}")]
    NotEnoughCombatants { found: usize },

    #[error(transparent)]
    RandomSource(#[from] RandomSourceError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} has been deleted")]
    Deleted(String),

    #[error("record store failure: {0}")]
    Persistence(String),
}

/// Failure modes of the random source, kept apart so callers can pick a
/// retry policy per cause
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RandomSourceError {
    #[error("random source request failed: {0}")]
    Transport(String),

    #[error("random source timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid response from random source: {0}")]
    Malformed(String),
}

/// Coarse error classes for branching without matching on messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Capacity,
    Precondition,
    ExternalUnavailable,
    NotFound,
    Persistence,
}

impl ErrorKind {
    /// Whether the same call may succeed if simply tried again
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::ExternalUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Capacity => "capacity",
            ErrorKind::Precondition => "precondition",
            ErrorKind::ExternalUnavailable => "external-unavailable",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Persistence => "persistence",
        };
        write!(f, "{}", label)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::RegistryFull { .. } => ErrorKind::Capacity,
            Error::EmptyRegistry | Error::NotEnoughCombatants { .. } => ErrorKind::Precondition,
            Error::RandomSource(_) => ErrorKind::ExternalUnavailable,
            Error::NotFound(_) | Error::Deleted(_) => ErrorKind::NotFound,
            Error::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}
