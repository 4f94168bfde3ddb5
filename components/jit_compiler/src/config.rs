//! Compilation policy configuration

use core_types::CompilationTier;
use serde::{Deserialize, Serialize};

/// How compile requests are serviced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileMode {
    /// Compile on the requesting thread and install before returning
    Synchronous,
    /// Queue the request for a background compiler thread
    Background,
}

/// Compilation policy of the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitConfig {
    /// Request servicing mode
    pub mode: CompileMode,
    /// Tiers the host will compile at
    pub supported_tiers: Vec<CompilationTier>,
    /// Capacity of the background compile queue
    pub queue_capacity: usize,
    /// Reject OSR requests whose offset is not a basic-block start
    pub osr_requires_block_start: bool,
}

impl JitConfig {
    /// Create default configuration: every tier, synchronous
    pub fn new() -> Self {
        Self::tiered()
    }

    /// Baseline compiler only, synchronous
    pub fn client() -> Self {
        Self {
            mode: CompileMode::Synchronous,
            supported_tiers: vec![CompilationTier::Baseline],
            queue_capacity: 64,
            osr_requires_block_start: true,
        }
    }

    /// Every tier, synchronous
    pub fn tiered() -> Self {
        Self {
            mode: CompileMode::Synchronous,
            supported_tiers: CompilationTier::ALL.to_vec(),
            queue_capacity: 64,
            osr_requires_block_start: true,
        }
    }

    /// Every tier, compiled on a background thread
    pub fn background() -> Self {
        Self {
            mode: CompileMode::Background,
            ..Self::tiered()
        }
    }

    /// Whether the policy compiles at `tier`
    pub fn supports(&self, tier: CompilationTier) -> bool {
        self.supported_tiers.contains(&tier)
    }
}

impl Default for JitConfig {
    fn default() -> Self {
        Self::new()
    }
}
