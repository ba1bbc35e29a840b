//! Error types for the reconciliation system
//!
//! Errors fall into two propagation classes (the engine enforces this):
//! configuration, authentication and desired-state errors are fatal to the
//! run; actual-state and per-operation errors are captured, logged and the
//! run proceeds.

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the reconciliation system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing secrets, bad paths) — fatal before any API call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication against the DNS provider failed — fatal, never retried
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Desired-state extraction failed — fatal, an empty desired set must
    /// never be mistaken for "delete everything"
    #[error("Inventory extraction error: {0}")]
    Extraction(String),

    /// A raw record entry could not be parsed into the canonical model
    #[error("Unparseable record entry: {entry}")]
    Parse {
        /// The offending raw entry
        entry: String,
    },

    /// The provider API reported an error for one mutation
    #[error("Provider API error ({key}): {message}")]
    Api {
        /// Provider error key (e.g. "bad_request")
        key: String,
        /// Provider error message
        message: String,
        /// Optional hint from the provider
        hint: Option<String>,
    },

    /// The provider responded, but with a shape we do not recognize
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// The provider responded with non-JSON, non-empty text
    #[error("Unparseable response: {0}")]
    UnparseableResponse(String),

    /// The call could not be completed at all (distinct from an API-reported error)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors (reading cached outputs, spawning tools)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a desired-state extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a parse error naming the offending entry
    pub fn parse(entry: impl Into<String>) -> Self {
        Self::Parse {
            entry: entry.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an unexpected-shape error
    pub fn unexpected_shape(msg: impl Into<String>) -> Self {
        Self::UnexpectedShape(msg.into())
    }

    /// True if this error terminates the run before any mutation is attempted
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Authentication(_) | Self::Extraction(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
