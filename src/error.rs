//! Error types for remod
//!
//! All modules use `RemodResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for remod operations
pub type RemodResult<T> = Result<T, RemodError>;

/// All errors that can occur in remod
#[derive(Error, Debug)]
pub enum RemodError {
    // Resolution errors
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Not a remote specifier: {0}")]
    NotRemote(String),

    // Fetch errors
    #[error("GET {url} failed: status {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("GET {url} failed: {source}")]
    FetchTransport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Redirect from {url} has no Location header")]
    RedirectMissingLocation { url: String },

    #[error("Redirect limit ({limit}) exceeded fetching {url}")]
    RedirectLoop { url: String, limit: u32 },

    #[error("Response body for {url} exceeds {limit} bytes")]
    ContentTooLarge { url: String, limit: u64 },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl RemodError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid-URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotRemote(_) => Some("Only http:// and https:// specifiers can be fetched"),
            Self::RedirectLoop { .. } => {
                Some("Raise [fetch] max_redirects in the config if the chain is legitimate")
            }
            Self::ContentTooLarge { .. } => Some("Raise [fetch] max_size_mb in the config"),
            _ => None,
        }
    }
}
