//! Error types for the host runtime and the JIT control layer.
//!
//! Every failure carries an [`ErrorKind`] that callers branch on and a
//! human-readable message for logs.

use thiserror::Error;

/// The kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Requested frame does not exist, or the thread has no managed stack
    InvalidState,
    /// The requested optimization tier is not supported by the host policy
    UnsupportedTier,
    /// The request would race a live activation against code invalidation
    UnsafeOperation,
    /// The host accepted the request but reported failure
    HostRequestFailed,
    /// A method identity could not be resolved
    UnknownMethod,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::UnsupportedTier => "unsupported tier",
            ErrorKind::UnsafeOperation => "unsafe operation",
            ErrorKind::HostRequestFailed => "host request failed",
            ErrorKind::UnknownMethod => "unknown method",
        };
        f.write_str(name)
    }
}

/// An error with its kind and message.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, VmError};
///
/// let error = VmError::new(ErrorKind::UnsafeOperation, "method is on stack");
/// assert_eq!(error.to_string(), "unsafe operation: method is on stack");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct VmError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl VmError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`ErrorKind::InvalidState`]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// Shorthand for [`ErrorKind::HostRequestFailed`]
    pub fn host_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HostRequestFailed, message)
    }

    /// Shorthand for [`ErrorKind::UnknownMethod`]
    pub fn unknown_method(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownMethod, message)
    }
}

/// Result alias used across the workspace
pub type VmResult<T> = Result<T, VmError>;
