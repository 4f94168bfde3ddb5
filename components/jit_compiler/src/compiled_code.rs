//! Compiled artifacts

use core_types::{Bci, CodeId, CompilationTier, CompileEntry, MethodId};

/// Lifecycle state of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeState {
    /// Installed and enterable
    InUse,
    /// No new activations may enter; existing ones may still run
    NotEntrant,
    /// No activation runs it any more
    Zombie,
}

/// Compiled form of a method at one tier
///
/// Owned by the [`crate::CodeCache`]; only read outside the cache lock
/// through clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCode {
    /// Artifact identity
    pub id: CodeId,
    /// Method this artifact was compiled for
    pub method: MethodId,
    /// Optimization tier
    pub tier: CompilationTier,
    /// Standard or OSR entry
    pub entry: CompileEntry,
    /// Methods inlined into this artifact
    pub inlined: Vec<MethodId>,
    /// Size of the generated code in bytes
    pub code_size: usize,
    pub(crate) state: CodeState,
    pub(crate) marked_for_deoptimization: bool,
}

impl CompiledCode {
    /// Lifecycle state
    pub fn state(&self) -> CodeState {
        self.state
    }

    /// Whether any activation may still run this artifact
    pub fn is_alive(&self) -> bool {
        self.state != CodeState::Zombie
    }

    /// Whether new activations may enter this artifact
    pub fn is_in_use(&self) -> bool {
        self.state == CodeState::InUse
    }

    /// Whether this is an OSR artifact
    pub fn is_osr(&self) -> bool {
        self.entry.is_osr()
    }

    /// OSR entry offset
    pub fn osr_entry_bci(&self) -> Option<Bci> {
        self.entry.osr_bci()
    }

    /// Whether invalidation is pending
    pub fn is_marked_for_deoptimization(&self) -> bool {
        self.marked_for_deoptimization
    }

    /// Whether the artifact is usable for new activations
    pub fn is_enterable(&self) -> bool {
        self.is_in_use() && !self.marked_for_deoptimization
    }

    /// Whether this artifact inlines `method`
    pub fn inlines(&self, method: MethodId) -> bool {
        self.inlined.contains(&method)
    }

    pub(crate) fn mark_for_deoptimization(&mut self) -> bool {
        if self.marked_for_deoptimization || !self.is_alive() {
            return false;
        }
        self.marked_for_deoptimization = true;
        true
    }

    pub(crate) fn make_not_entrant(&mut self) -> bool {
        if self.state != CodeState::InUse {
            return false;
        }
        self.state = CodeState::NotEntrant;
        true
    }
}
