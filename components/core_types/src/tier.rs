//! Optimization tiers.
//!
//! Tiers follow the usual tiered-compilation scale: level 0 is the
//! interpreter and is never the tier of a compiled artifact, levels 1-3
//! are baseline code with increasing profiling, level 4 is fully optimized.

use crate::{ErrorKind, VmError, VmResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Optimization tier of a compiled artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompilationTier {
    /// Level 1: baseline code without profiling
    Baseline = 1,
    /// Level 2: baseline code with invocation and backedge counters
    LimitedProfile = 2,
    /// Level 3: baseline code with full profiling
    FullProfile = 3,
    /// Level 4: optimizing compiler
    Optimized = 4,
}

impl CompilationTier {
    /// All compiled tiers, lowest first
    pub const ALL: [CompilationTier; 4] = [
        CompilationTier::Baseline,
        CompilationTier::LimitedProfile,
        CompilationTier::FullProfile,
        CompilationTier::Optimized,
    ];

    /// Numeric level of this tier
    pub fn level(self) -> i32 {
        self as i32
    }

    /// Convert a numeric level into a compiled tier.
    ///
    /// Level 0 (interpreter) and anything above 4 are not tiers code can be
    /// compiled at and yield [`ErrorKind::UnsupportedTier`].
    pub fn from_level(level: i32) -> VmResult<Self> {
        match level {
            1 => Ok(CompilationTier::Baseline),
            2 => Ok(CompilationTier::LimitedProfile),
            3 => Ok(CompilationTier::FullProfile),
            4 => Ok(CompilationTier::Optimized),
            _ => Err(VmError::new(
                ErrorKind::UnsupportedTier,
                format!("no compiled tier at level {}", level),
            )),
        }
    }

    /// Whether code at this tier comes from the optimizing compiler
    pub fn is_optimizing(self) -> bool {
        matches!(self, CompilationTier::Optimized)
    }
}

impl fmt::Display for CompilationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompilationTier::Baseline => "baseline",
            CompilationTier::LimitedProfile => "limited-profile",
            CompilationTier::FullProfile => "full-profile",
            CompilationTier::Optimized => "optimized",
        };
        write!(f, "{} (level {})", name, self.level())
    }
}
