//! On-Stack Replacement (OSR) support
//!
//! OSR moves a running interpreted activation into compiled code at a loop
//! back edge. The compiled code must have been produced for exactly that
//! bytecode offset.

use crate::compiled_code::CompiledCode;
use core_types::{Bci, CodeId, MethodId, VmError, VmResult};
use vm_core::{CallFrame, ScopeDesc};

/// On-Stack Replacement entry point
///
/// Represents the location where an interpreted frame of `method` may
/// transfer into the OSR artifact `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsrEntry {
    /// Method the entry belongs to
    pub method: MethodId,
    /// Offset in bytecode where OSR can occur
    pub bytecode_offset: Bci,
    /// Artifact entered
    pub code: CodeId,
}

impl OsrEntry {
    /// Create a new OSR entry
    pub fn new(method: MethodId, bytecode_offset: Bci, code: CodeId) -> Self {
        Self {
            method,
            bytecode_offset,
            code,
        }
    }

    /// Entry of an OSR artifact; `None` for standard artifacts
    pub fn from_code(code: &CompiledCode) -> Option<Self> {
        code.osr_entry_bci()
            .map(|bci| Self::new(code.method, bci, code.id))
    }

    /// Enter compiled code at this OSR point
    ///
    /// Validates that `frame` is an interpreted activation of the entry's
    /// method sitting exactly at the entry offset, and returns the compiled
    /// frame that replaces it.
    pub fn enter_at(&self, frame: &CallFrame) -> VmResult<CallFrame> {
        let CallFrame::Interpreted { method, bci } = *frame else {
            return Err(VmError::invalid_state(format!(
                "OSR into {} from a compiled frame",
                self.code
            )));
        };

        if method != self.method {
            return Err(VmError::invalid_state(format!(
                "OSR entry of {} used by a frame of {}",
                self.method, method
            )));
        }

        if bci != self.bytecode_offset {
            return Err(VmError::invalid_state(format!(
                "OSR entry at {} but frame at {}",
                self.bytecode_offset, bci
            )));
        }

        Ok(CallFrame::Compiled {
            code: self.code,
            root: ScopeDesc { method, bci },
            inlined: Vec::new(),
        })
    }
}
