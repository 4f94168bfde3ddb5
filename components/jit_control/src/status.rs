//! Compiled-code status resolution
//!
//! All functions here take the [`CodeTable`] and so can only run inside
//! the code-cache critical section (see
//! [`crate::CompilationHost::with_code_table`]).

use core_types::{CodeId, CompilationTier, MethodId};
use jit_compiler::{CodeTable, CompiledCode};
use vm_core::VFrame;

use crate::config::TierMatch;

/// What a status lookup is asked to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusQuery {
    /// Requested tier
    pub tier: CompilationTier,
    /// Tier comparison
    pub tier_match: TierMatch,
    /// Ignore standard artifacts
    pub osr_only: bool,
}

impl StatusQuery {
    /// Query for standard or OSR code at `tier`
    pub fn new(tier: CompilationTier, tier_match: TierMatch) -> Self {
        Self {
            tier,
            tier_match,
            osr_only: false,
        }
    }

    /// Restrict the query to OSR artifacts
    pub fn osr_only(mut self) -> Self {
        self.osr_only = true;
        self
    }
}

/// Result of a status lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStatus {
    /// No alive artifact
    NotCompiled,
    /// Alive but already scheduled for invalidation
    PendingDeoptimization(CodeId),
    /// Alive, unmarked, but compiled at a tier the query does not accept
    TierMismatch {
        /// Artifact found
        code: CodeId,
        /// Its tier
        tier: CompilationTier,
    },
    /// Alive, unmarked and at an accepted tier
    Usable {
        /// Artifact found
        code: CodeId,
        /// Its tier
        tier: CompilationTier,
        /// Whether it is an OSR artifact
        osr: bool,
    },
}

impl CodeStatus {
    /// Whether a satisfying artifact was found
    pub fn is_usable(&self) -> bool {
        matches!(self, CodeStatus::Usable { .. })
    }

    /// The usable artifact, if any
    pub fn usable_code(&self) -> Option<CodeId> {
        match self {
            CodeStatus::Usable { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn classify(code: Option<&CompiledCode>, query: &StatusQuery) -> CodeStatus {
    match code {
        None => CodeStatus::NotCompiled,
        Some(code) if !code.is_alive() => CodeStatus::NotCompiled,
        Some(code) if code.is_marked_for_deoptimization() => {
            CodeStatus::PendingDeoptimization(code.id)
        }
        Some(code) if !query.tier_match.satisfies(code.tier, query.tier) => {
            CodeStatus::TierMismatch {
                code: code.id,
                tier: code.tier,
            }
        }
        Some(code) => CodeStatus::Usable {
            code: code.id,
            tier: code.tier,
            osr: code.is_osr(),
        },
    }
}

/// Resolve the compiled status of `method`.
///
/// OSR artifacts are consulted first, at any entry offset, preferring the
/// nearest tier the query accepts. Unless the query is OSR-only, an OSR
/// miss falls back to the method's standard artifact. When neither is
/// usable, the OSR finding is reported if there was one.
pub fn resolve(table: &CodeTable, method: MethodId, query: StatusQuery) -> CodeStatus {
    let exact = query.tier_match == TierMatch::Exact;
    let osr = classify(
        table.lookup_osr(method, None, Some(query.tier), exact),
        &query,
    );
    if osr.is_usable() || query.osr_only {
        return osr;
    }

    let standard = classify(table.code(method), &query);
    if standard == CodeStatus::NotCompiled && osr != CodeStatus::NotCompiled {
        return osr;
    }
    standard
}

/// Resolve the status of the code a logical frame depends on.
///
/// A compiled frame is satisfied by the artifact it is running, which for
/// an inlined scope belongs to another method. Otherwise the frame's method
/// is resolved as by [`resolve`].
pub fn resolve_frame(table: &CodeTable, frame: &VFrame, query: StatusQuery) -> CodeStatus {
    if let Some(code) = frame.code() {
        let running = classify(table.get(code), &query);
        if running.is_usable() {
            return running;
        }
    }
    resolve(table, frame.method, query)
}
