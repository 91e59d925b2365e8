//! Error types for grappler-item
//!
//! This module defines all error types used throughout the crate, plus the
//! [`Status`] returned across the analysis backend boundary.

use std::fmt;

use thiserror::Error;

/// Category of a non-OK backend status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// The graph or its metadata is malformed
    InvalidArgument,
    /// A referenced node or tensor does not exist
    NotFound,
    /// The graph is well-formed but cannot be analysed in its current state
    FailedPrecondition,
    /// The backend hit an internal error
    Internal,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Internal => "INTERNAL",
        };
        f.write_str(name)
    }
}

/// Non-OK status reported by an analysis backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Error category
    pub code: StatusCode,
    /// Diagnostic message
    pub message: String,
}

impl Status {
    /// Create a status with the given code
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `INVALID_ARGUMENT` status
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    /// `NOT_FOUND` status
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    /// `INTERNAL` status
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Status {}

/// Main error type for graph item operations
#[derive(Error, Debug)]
pub enum ItemError {
    /// The backend rejected the graph as incomplete or invalid
    #[error("Invalid graph ({code}): {message}")]
    Validation {
        /// Status code reported by the backend
        code: StatusCode,
        /// Status message reported by the backend
        message: String,
    },

    /// A tensor properties record returned by the backend failed to decode
    #[error("Failed to decode tensor properties for op '{op}': {source}")]
    Decode {
        /// Op whose record failed
        op: String,
        /// Underlying protobuf error
        source: prost::DecodeError,
    },

    /// Meta-graph input could not be used
    #[error("Invalid meta-graph: {0}")]
    InvalidMetaGraph(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf decode error
    #[error("Protobuf decode error: {0}")]
    ProtoDecode(#[from] prost::DecodeError),
}

impl ItemError {
    /// Check whether this error came from graph validation
    pub fn is_validation(&self) -> bool {
        matches!(self, ItemError::Validation { .. })
    }
}

impl From<Status> for ItemError {
    fn from(status: Status) -> Self {
        ItemError::Validation {
            code: status.code,
            message: status.message,
        }
    }
}

/// Result type alias for graph item operations
pub type ItemResult<T> = Result<T, ItemError>;
