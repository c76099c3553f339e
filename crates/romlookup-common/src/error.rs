//! Common error types used throughout romlookup.
//!
//! Most of these conditions never reach a caller of the lookup engine: the
//! orchestrator absorbs them into an empty result and a log entry. Only
//! configuration problems are expected to propagate.

use crate::types::SourceKind;

/// Common error type for romlookup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A metadata source failed to initialize.
    #[error("Source {source_kind} unavailable: {reason}")]
    SourceUnavailable {
        source_kind: SourceKind,
        reason: String,
    },

    /// A live source raised a storage-layer error while answering a query.
    #[error("Query against {source_kind} failed: {message}")]
    QueryFailed {
        source_kind: SourceKind,
        message: String,
    },

    /// An artwork URL failed structural validation.
    #[error("Invalid artwork URL: {0}")]
    InvalidArtworkUrl(String),

    /// A persisted cache is older than its time-to-live.
    #[error("Cache is stale")]
    CacheStale,

    /// A persisted cache could not be decoded.
    #[error("Cache is corrupt: {0}")]
    CacheCorrupt(String),

    /// The configuration handed to the engine is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// The requested record was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new SourceUnavailable error.
    pub fn source_unavailable<S: Into<String>>(source_kind: SourceKind, reason: S) -> Self {
        Self::SourceUnavailable {
            source_kind,
            reason: reason.into(),
        }
    }

    /// Create a new QueryFailed error.
    pub fn query_failed<S: Into<String>>(source_kind: SourceKind, message: S) -> Self {
        Self::QueryFailed {
            source_kind,
            message: message.into(),
        }
    }

    /// Create a new InvalidArtworkUrl error.
    pub fn invalid_artwork_url<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArtworkUrl(msg.into())
    }

    /// Create a new CacheCorrupt error.
    pub fn cache_corrupt<S: Into<String>>(msg: S) -> Self {
        Self::CacheCorrupt(msg.into())
    }

    /// Create a new InvalidConfig error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
