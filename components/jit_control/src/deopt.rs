//! Deoptimization driver

use core_types::{MethodId, VmResult};
use jit_compiler::CodeTable;
use log::debug;
use vm_core::ManagedThread;

use crate::config::DeoptScope;
use crate::frames;
use crate::host::CompilationHost;

/// Result of an ensure-deoptimized request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeoptOutcome {
    /// The frame was already interpreted; nothing was done
    AlreadyInterpreted,
    /// The frame now interprets.
    ///
    /// `invalidated` counts artifacts newly marked by this request (method
    /// scope) or frames rewritten (frame scope). It may be 0 when another
    /// request had already marked the frame's code.
    Deoptimized {
        /// Artifacts or frames invalidated
        invalidated: usize,
    },
    /// Nothing could be invalidated
    NoOp,
}

impl DeoptOutcome {
    /// Whether the frame interprets after the request
    pub fn is_satisfied(&self) -> bool {
        !matches!(self, DeoptOutcome::NoOp)
    }
}

/// Force the frame at `depth` of `thread` back into the interpreter.
pub fn ensure_deoptimized<H: CompilationHost>(
    host: &H,
    thread: &ManagedThread,
    depth: usize,
    scope: DeoptScope,
) -> VmResult<DeoptOutcome> {
    let frame = frames::require_frame_at(thread, depth)?;
    let Some(code) = frame.code() else {
        return Ok(DeoptOutcome::AlreadyInterpreted);
    };

    match scope {
        DeoptScope::Frame => {
            if host.deoptimize_frame(thread, depth)? {
                Ok(DeoptOutcome::Deoptimized { invalidated: 1 })
            } else {
                Ok(DeoptOutcome::NoOp)
            }
        }
        DeoptScope::Method => {
            let (invalidated, pending) = host.with_code_table(|table| {
                let mut invalidated = mark_method(table, frame.method);
                if table.mark_for_deoptimization(code) {
                    invalidated += 1;
                }
                (invalidated, table.is_marked(code))
            });

            if invalidated == 0 && !pending {
                return Ok(DeoptOutcome::NoOp);
            }
            let retired = host.deoptimize_marked();
            debug!(
                "deoptimized {}: {} artifacts marked, {} retired",
                frame.method, invalidated, retired
            );
            Ok(DeoptOutcome::Deoptimized { invalidated })
        }
    }
}

/// Mark every OSR and standard artifact of `method`, plus the code of other
/// methods that inlined it. Returns how many were newly marked.
pub fn mark_method(table: &mut CodeTable, method: MethodId) -> usize {
    let mut marked = table.mark_osr_for_deoptimization(method);
    if let Some(id) = table.code(method).map(|code| code.id) {
        if table.mark_for_deoptimization(id) {
            marked += 1;
        }
    }
    marked + table.mark_dependents(method)
}
