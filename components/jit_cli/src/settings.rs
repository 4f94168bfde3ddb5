//! Settings file loading

use std::fs;
use std::path::Path;

use jit_compiler::{CompileMode, JitConfig};
use jit_control::ControlConfig;
use serde::{Deserialize, Serialize};

use crate::error::CliResult;

/// Host and control configuration
///
/// Loaded from a JSON file; missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Host compilation policy
    pub jit: JitConfig,
    /// Control-layer policy
    pub control: ControlConfig,
}

impl Settings {
    /// Read settings from a JSON file
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, verbose: bool, background: bool) -> Self {
        if verbose {
            self.control.verbose = true;
        }
        if background {
            self.jit.mode = CompileMode::Background;
        }
        self
    }
}
