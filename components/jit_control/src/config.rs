//! Control-layer policy configuration

use core_types::CompilationTier;
use serde::{Deserialize, Serialize};

/// How a requested tier is compared with an artifact's tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierMatch {
    /// The artifact must be compiled at exactly the requested tier
    #[default]
    Exact,
    /// Any tier at or above the requested one satisfies
    AtLeast,
}

impl TierMatch {
    /// Whether code compiled at `actual` satisfies a request for `wanted`
    pub fn satisfies(self, actual: CompilationTier, wanted: CompilationTier) -> bool {
        match self {
            TierMatch::Exact => actual == wanted,
            TierMatch::AtLeast => actual >= wanted,
        }
    }
}

/// What `ensure_deoptimized` invalidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeoptScope {
    /// Mark every artifact of the frame's method and its dependents, then
    /// deoptimize all affected activations at a safepoint
    #[default]
    Method,
    /// Rewrite only the caller's physical frame; artifacts stay installed.
    ///
    /// When the caller runs inlined in another method's compiled code, the
    /// whole physical frame is unpacked, so the enclosing inlined scopes
    /// return to the interpreter as well.
    Frame,
}

/// Control-layer policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Tier used when an operation names none
    pub default_tier: CompilationTier,
    /// Tier comparison for status queries
    pub tier_match: TierMatch,
    /// Deoptimization scope
    pub deopt_scope: DeoptScope,
    /// Log one line per operation
    pub verbose: bool,
}

impl ControlConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            default_tier: CompilationTier::Baseline,
            tier_match: TierMatch::Exact,
            deopt_scope: DeoptScope::Method,
            verbose: false,
        }
    }

    /// Default policy with per-operation tracing
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::new()
        }
    }

    /// Default policy deoptimizing single frames only
    pub fn frame_scoped() -> Self {
        Self {
            deopt_scope: DeoptScope::Frame,
            ..Self::new()
        }
    }

    /// Set the tier comparison
    pub fn with_tier_match(mut self, tier_match: TierMatch) -> Self {
        self.tier_match = tier_match;
        self
    }

    /// Set the default tier
    pub fn with_default_tier(mut self, tier: CompilationTier) -> Self {
        self.default_tier = tier;
        self
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::new()
    }
}
