//! Error taxonomy
//!
//! Lookup-shaped failures never appear here: a missing reference, id or
//! registry is reported as `Ok(None)` by the layer that looked it up. What
//! remains are corruption-shaped and infrastructure failures, which are
//! surfaced to the caller as hard errors.

use thiserror::Error;

use crate::entity_type::EntityType;

/// Result alias used across the workspace
pub type HangarResult<T> = Result<T, HangarError>;

/// Errors raised by the registry stack
#[derive(Debug, Error)]
pub enum HangarError {
    /// A registry name does not map to any live backend
    #[error("registry '{name}' is unavailable")]
    BackendUnavailable {
        /// The registry name that failed to resolve
        name: String,
    },

    /// A stored record could not be turned into a live entry
    #[error("revival of {entity_type} '{id}' failed: {reason}")]
    RevivalFailure {
        /// Type of the record being revived
        entity_type: EntityType,
        /// Storage id of the record
        id: String,
        /// What was wrong with the record
        reason: String,
    },

    /// A registry name string could not be parsed
    #[error("invalid registry name '{0}'")]
    InvalidRegistryName(String),

    /// A record path could not be parsed or followed
    #[error("invalid record path '{path}': {reason}")]
    InvalidPath {
        /// The offending path
        path: String,
        /// Why it could not be used
        reason: String,
    },

    /// Write attempted against a locked content pack
    #[error("content pack '{pack}' is locked")]
    ReadOnly {
        /// Pack id
        pack: String,
    },

    /// A live entry was handed to an operation context it does not belong to
    #[error("entry '{id}' belongs to a different operation context")]
    ContextMismatch {
        /// Id of the foreign entry
        id: String,
    },

    /// Serialization failure
    #[error("serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
    },

    /// Backend store failure
    #[error("storage error: {message}")]
    Storage {
        /// Error description
        message: String,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {message}")]
    Config {
        /// Error description
        message: String,
    },
}

impl HangarError {
    /// Build a revival failure
    pub fn revival(entity_type: EntityType, id: impl Into<String>, reason: impl Into<String>) -> Self {
        HangarError::RevivalFailure {
            entity_type,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Build a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        HangarError::Serialization {
            message: message.into(),
        }
    }

    /// Build a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        HangarError::Storage {
            message: message.into(),
        }
    }

    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        HangarError::Config {
            message: message.into(),
        }
    }

    /// Whether this error reports corrupt stored data
    pub fn is_revival_failure(&self) -> bool {
        matches!(self, HangarError::RevivalFailure { .. })
    }
}

impl From<serde_json::Error> for HangarError {
    fn from(e: serde_json::Error) -> Self {
        HangarError::serialization(e.to_string())
    }
}

impl From<toml::de::Error> for HangarError {
    fn from(e: toml::de::Error) -> Self {
        HangarError::config(e.to_string())
    }
}

/// Outcome of a soft-failing write
///
/// Writes against an id that vanished between lookup and use do not abort
/// the caller; they report `StaleHandle` so batch operations can continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write reached the stored record
    Applied,
    /// The target no longer exists; nothing was written
    StaleHandle,
}

impl WriteOutcome {
    /// Whether the write was applied
    pub fn is_applied(self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}
