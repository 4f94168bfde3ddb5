//! Method compiler
//!
//! Produces the artifact description for a method at a tier. Code
//! generation itself is not modelled; what matters to the rest of the
//! system is which requests the compiler accepts and what the resulting
//! artifact looks like.

use core_types::{CompilationTier, CompileEntry, MethodId, VmError, VmResult};
use vm_core::MethodInfo;

/// Statistics for compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerStats {
    /// Number of standard-entry compilations
    pub functions_compiled: u64,
    /// Number of OSR compilations
    pub osr_compilations: u64,
    /// Number of requests the compiler refused
    pub rejected: u64,
    /// Total code size generated
    pub total_code_size: usize,
}

/// Output of a successful compilation, ready to install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlob {
    /// Compiled method
    pub method: MethodId,
    /// Tier compiled at
    pub tier: CompilationTier,
    /// Entry kind
    pub entry: CompileEntry,
    /// Methods inlined into the code
    pub inlined: Vec<MethodId>,
    /// Generated size in bytes
    pub code_size: usize,
}

/// Compiler front end shared by all tiers
#[derive(Debug, Clone)]
pub struct Compiler {
    /// Reject OSR entries that are not block starts
    osr_requires_block_start: bool,
}

impl Compiler {
    /// Create a compiler
    pub fn new(osr_requires_block_start: bool) -> Self {
        Self {
            osr_requires_block_start,
        }
    }

    /// Compile `method` at `tier` for `entry`
    ///
    /// # Returns
    /// * `Ok(CodeBlob)` - Code ready for installation
    /// * `Err(VmError)` - `HostRequestFailed` when the compiler bails out
    ///
    /// An OSR entry must sit at the start of a basic block; the type-flow
    /// pass cannot build a state for any other offset.
    pub fn compile(
        &self,
        method: &MethodInfo,
        tier: CompilationTier,
        entry: CompileEntry,
    ) -> VmResult<CodeBlob> {
        if !method.compilable {
            return Err(VmError::host_failed(format!(
                "{} is not compilable",
                method.external_name()
            )));
        }

        if let CompileEntry::Osr(bci) = entry {
            if bci >= method.code_length {
                return Err(VmError::host_failed(format!(
                    "OSR entry {} outside of {} (length {})",
                    bci,
                    method.external_name(),
                    method.code_length
                )));
            }
            if self.osr_requires_block_start && !method.is_block_start(bci) {
                return Err(VmError::host_failed(format!(
                    "OSR entry {} of {} is not a block start",
                    bci,
                    method.external_name()
                )));
            }
        }

        let per_bytecode = 4 * tier.level() as usize;
        Ok(CodeBlob {
            method: method.id,
            tier,
            entry,
            inlined: method.inlinees.clone(),
            code_size: method.code_length as usize * per_bytecode + 32 * method.inlinees.len(),
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(true)
    }
}
