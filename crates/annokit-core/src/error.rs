//! Error handling for annokit
//!
//! Provides error types for the layers of the session core:
//! - Worker errors (compute worker load/request failures)
//! - Session errors (lifecycle misuse and wrapped worker failures)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Compute worker error type
///
/// Represents failures of the out-of-line boundary computation worker.
/// These are absorbed by the owning session, which notifies the user and
/// falls back to an empty working state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The worker could not be created
    #[error("Failed to load worker: {reason}")]
    LoadFailed {
        /// The reason the worker failed to load.
        reason: String,
    },

    /// The worker rejected or failed a request
    #[error("Worker request failed: {reason}")]
    RequestFailed {
        /// The reason the request failed.
        reason: String,
    },

    /// The worker's message channel closed before a reply arrived
    #[error("Worker disconnected")]
    Disconnected,

    /// The worker has already been disposed
    #[error("Worker disposed")]
    Disposed,
}

impl WorkerError {
    /// Shorthand for a failed request
    pub fn request(reason: impl Into<String>) -> Self {
        WorkerError::RequestFailed {
            reason: reason.into(),
        }
    }

    /// Shorthand for a failed load
    pub fn load(reason: impl Into<String>) -> Self {
        WorkerError::LoadFailed {
            reason: reason.into(),
        }
    }
}

/// Tool session error type
///
/// `NotMounted` and `Disposed` are programming errors: an operation was
/// invoked outside the lifetime of its owning session. They are propagated,
/// never absorbed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation invoked on a session that has been unmounted
    #[error("Session '{session}' is not mounted")]
    NotMounted {
        /// The session name.
        session: String,
    },

    /// Operation needs a worker but the session's worker was disposed
    #[error("Session '{session}' worker has been disposed")]
    Disposed {
        /// The session name.
        session: String,
    },

    /// Worker failure surfaced to the caller
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Main error type for annokit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Worker error
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a worker error, directly or wrapped by a session
    pub fn is_worker_error(&self) -> bool {
        matches!(
            self,
            Error::Worker(_) | Error::Session(SessionError::Worker(_))
        )
    }

    /// Check if this is a session lifecycle error
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(
            self,
            Error::Session(SessionError::NotMounted { .. } | SessionError::Disposed { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
