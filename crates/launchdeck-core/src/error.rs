//! Error types for launchdeck.

use thiserror::Error;

/// A shared error type for every launchdeck crate.
///
/// The type is `Clone` so a single failed request can be handed to every
/// caller that joined the same in-flight page load.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LaunchdeckError {
    /// The query API answered with a non-success status, or the transport
    /// failed before any status was received (`status == None`).
    #[error("Request failed{}: {message}", status_suffix(.status))]
    Request {
        status: Option<u16>,
        message: String,
    },

    /// Durable key-value storage cannot be used in this environment.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A document could not be encoded or decoded.
    #[error("Invalid {format}: {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// File system failure other than unavailable storage.
    #[error("I/O failure: {message}")]
    Io { message: String },

    /// Unreadable or invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A lookup by id matched nothing.
    #[error("No {entity_type} with id '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Broken invariant, such as a poisoned lock.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LaunchdeckError {
    /// Creates a Request error for a non-success HTTP status.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a Request error for a transport failure (no status received).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Request {
            status: None,
            message: message.into(),
        }
    }

    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn serialization(format: &str, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            format: format.to_string(),
            message: err.to_string(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// HTTP status carried by a Request error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<std::io::Error> for LaunchdeckError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{err} ({:?})", err.kind()),
        }
    }
}

impl From<serde_json::Error> for LaunchdeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err)
    }
}

impl From<toml::de::Error> for LaunchdeckError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

impl From<toml::ser::Error> for LaunchdeckError {
    fn from(err: toml::ser::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

/// A type alias for `Result<T, LaunchdeckError>`.
pub type Result<T> = std::result::Result<T, LaunchdeckError>;
