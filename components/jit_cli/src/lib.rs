//! Diagnostic JIT control CLI library
//!
//! Provides argument parsing, settings loading and the canned scenarios
//! `jitctl` runs against a simulated runtime.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod scenarios;
pub mod settings;

pub use cli::{Cli, Scenario};
pub use error::{CliError, CliResult};
pub use scenarios::{run, Report, Step};
pub use settings::Settings;
