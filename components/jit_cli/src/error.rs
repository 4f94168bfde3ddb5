//! Error types for the CLI

use core_types::VmError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Runtime or control-layer error
    #[error("runtime error: {0}")]
    Vm(#[from] VmError),

    /// File I/O error
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed settings file
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// A scenario step did not report what it should have
    #[error("scenario {scenario} failed at {step}: expected {expected}, got {actual}")]
    Mismatch {
        /// Scenario name
        scenario: &'static str,
        /// Step description
        step: String,
        /// Expected result
        expected: bool,
        /// Reported result
        actual: bool,
    },
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
