//! Deoptimization support
//!
//! Rewrites compiled frames into interpreter frames. Two entry points:
//! - [`Deoptimizer::deoptimize_marked`] runs at a safepoint and converts every
//!   frame on every thread whose artifact is marked, then retires the marked
//!   artifacts.
//! - [`Deoptimizer::deoptimize_frame`] converts one frame of the calling
//!   thread and leaves the artifact installed.

use std::collections::HashSet;

use core_types::{CodeId, MethodId, ThreadId, VmError, VmResult};
use log::debug;
use parking_lot::Mutex;
use vm_core::{CallFrame, ManagedThread, StoppedWorld, VmOperation, VM};

use crate::code_cache::CodeCache;

/// Reason for deoptimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeoptReason {
    /// The frame's artifact was marked for deoptimization
    MarkedCode,
    /// Explicit request for one frame
    Explicit,
}

/// Information about a deoptimization event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeoptInfo {
    /// Reason for deoptimization
    pub reason: DeoptReason,
    /// Thread whose frame was rewritten
    pub thread: ThreadId,
    /// Method owning the physical frame
    pub method: MethodId,
    /// Artifact the frame was running
    pub code: CodeId,
    /// Number of interpreter frames produced
    pub frames: usize,
}

/// Replace the compiled frame at `index` with its interpreter frames
fn unpack_at(stack: &mut Vec<CallFrame>, index: usize) -> Option<(MethodId, CodeId, usize)> {
    let frame = stack.get(index)?;
    let code = frame.code()?;
    let method = frame.method();
    let unpacked = frame.unpack();
    let count = unpacked.len();
    drop(stack.splice(index..=index, unpacked));
    Some((method, code, count))
}

struct DeoptimizeMarked<'a> {
    cache: &'a CodeCache,
    records: Vec<DeoptInfo>,
    retired: usize,
}

impl VmOperation for DeoptimizeMarked<'_> {
    fn name(&self) -> &'static str {
        "DeoptimizeMarked"
    }

    fn doit(&mut self, world: &mut StoppedWorld<'_>) {
        let mut table = self.cache.lock();
        let mut running = HashSet::new();

        for (thread, stack) in world.stacks_mut() {
            // Top down so unpacking never shifts an index still to visit.
            for index in (0..stack.len()).rev() {
                let marked = stack[index].code().map_or(false, |code| table.is_marked(code));
                if !marked {
                    continue;
                }
                if let Some((method, code, frames)) = unpack_at(stack, index) {
                    self.records.push(DeoptInfo {
                        reason: DeoptReason::MarkedCode,
                        thread,
                        method,
                        code,
                        frames,
                    });
                }
            }
            running.extend(stack.iter().filter_map(CallFrame::code));
        }

        self.retired = table.make_marked_not_entrant();
        table.sweep(&running);
    }
}

/// Deoptimizer for safe fallback to interpreter
///
/// Keeps a history of every frame it rewrote.
#[derive(Debug, Default)]
pub struct Deoptimizer {
    /// History of deoptimizations
    deopt_history: Mutex<Vec<DeoptInfo>>,
}

impl Deoptimizer {
    /// Create a new deoptimizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Deoptimize every frame running marked code, on every thread.
    ///
    /// Blocks the caller for a full safepoint. Returns the number of
    /// artifacts retired.
    pub fn deoptimize_marked(&self, vm: &VM, cache: &CodeCache) -> usize {
        let mut op = DeoptimizeMarked {
            cache,
            records: Vec::new(),
            retired: 0,
        };
        vm.execute(&mut op);

        debug!(
            "deoptimized {} frames, retired {} artifacts",
            op.records.len(),
            op.retired
        );
        self.deopt_history.lock().extend(op.records);
        op.retired
    }

    /// Deoptimize the physical frame at `physical_index` of the calling thread.
    ///
    /// Returns `false` when the frame is already interpreted.
    pub fn deoptimize_frame(&self, thread: &ManagedThread, physical_index: usize) -> VmResult<bool> {
        let unpacked = thread.with_frames(|stack| {
            if physical_index >= stack.len() {
                return Err(VmError::invalid_state(format!(
                    "{} has no physical frame {}",
                    thread.id(),
                    physical_index
                )));
            }
            Ok(unpack_at(stack, physical_index))
        })?;

        let Some((method, code, frames)) = unpacked else {
            return Ok(false);
        };
        debug!("deoptimized frame of {} running {} on {}", method, code, thread.id());
        self.deopt_history.lock().push(DeoptInfo {
            reason: DeoptReason::Explicit,
            thread: thread.id(),
            method,
            code,
            frames,
        });
        Ok(true)
    }

    /// Get the deoptimization count
    pub fn deopt_count(&self) -> usize {
        self.deopt_history.lock().len()
    }

    /// Get deoptimization history
    pub fn history(&self) -> Vec<DeoptInfo> {
        self.deopt_history.lock().clone()
    }

    /// Clear deoptimization history
    pub fn clear_history(&self) {
        self.deopt_history.lock().clear();
    }
}
