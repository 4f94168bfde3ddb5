//! Frame location on the calling thread's logical stack
//!
//! Every call takes a fresh snapshot. Results must not outlive the operation
//! that asked for them.

use core_types::{MethodId, VmError, VmResult};
use vm_core::{ManagedThread, VFrame};

/// Logical frame at `depth`, 0 being the innermost managed frame.
///
/// `None` if the thread has no managed frame or the stack is shallower.
pub fn frame_at(thread: &ManagedThread, depth: usize) -> Option<VFrame> {
    thread.snapshot().at(depth).copied()
}

/// Logical frame at `depth`, or `InvalidState` if there is none
pub fn require_frame_at(thread: &ManagedThread, depth: usize) -> VmResult<VFrame> {
    let snapshot = thread.snapshot();
    if snapshot.is_empty() {
        return Err(VmError::invalid_state(format!(
            "{} has no managed frame",
            thread.id()
        )));
    }
    snapshot.at(depth).copied().ok_or_else(|| {
        VmError::invalid_state(format!(
            "no frame at depth {} on {} (stack height {})",
            depth,
            thread.id(),
            snapshot.len()
        ))
    })
}

/// Whether any logical frame of `thread`, inlined or not, runs `method`
pub fn is_on_stack(thread: &ManagedThread, method: MethodId) -> bool {
    thread.snapshot().contains_method(method)
}
