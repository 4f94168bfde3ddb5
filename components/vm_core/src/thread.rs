//! Managed execution threads
//!
//! A thread owns its call stack. Only the owning thread pushes and pops
//! frames; other threads may touch the stack only while the world is
//! stopped for a VM operation (see [`crate::safepoint`]).

use crate::call_frame::{CallFrame, ScopeDesc};
use crate::vframe::StackSnapshot;
use core_types::{Bci, MethodId, ThreadId, VmError, VmResult};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};

/// Execution mode of a managed thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Running managed code
    InManaged,
    /// Running trusted host code on behalf of a managed call
    InVm,
}

/// A managed execution thread
#[derive(Debug)]
pub struct ManagedThread {
    id: ThreadId,
    name: String,
    stack: Mutex<Vec<CallFrame>>,
    state: Mutex<ThreadState>,
    stopped: AtomicBool,
}

impl ManagedThread {
    pub(crate) fn new(id: ThreadId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            stack: Mutex::new(Vec::with_capacity(64)),
            state: Mutex::new(ThreadState::InManaged),
            stopped: AtomicBool::new(false),
        }
    }

    /// Thread identity
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Push a physical frame
    pub fn push_frame(&self, frame: CallFrame) {
        self.stack.lock().push(frame);
    }

    /// Push an interpreted frame for `method`
    pub fn push_interpreted(&self, method: MethodId) {
        self.push_frame(CallFrame::interpreted(method));
    }

    /// Pop the top physical frame
    pub fn pop_frame(&self) -> Option<CallFrame> {
        self.stack.lock().pop()
    }

    /// Whether the thread has at least one managed frame
    pub fn has_last_frame(&self) -> bool {
        !self.stack.lock().is_empty()
    }

    /// Number of physical frames
    pub fn physical_depth(&self) -> usize {
        self.stack.lock().len()
    }

    /// Take a fresh logical view of the stack
    pub fn snapshot(&self) -> StackSnapshot {
        StackSnapshot::capture(&self.stack.lock())
    }

    /// Move the innermost logical frame to `bci`
    pub fn set_bci(&self, bci: Bci) -> VmResult<()> {
        let mut stack = self.stack.lock();
        match stack.last_mut() {
            Some(CallFrame::Interpreted { bci: current, .. }) => *current = bci,
            Some(CallFrame::Compiled { root, inlined, .. }) => {
                let scope: &mut ScopeDesc = inlined.last_mut().unwrap_or(root);
                scope.bci = bci;
            }
            None => {
                return Err(VmError::invalid_state(format!(
                    "{} has no managed frame",
                    self.id
                )))
            }
        }
        Ok(())
    }

    /// Run `f` with mutable access to this thread's physical frames.
    ///
    /// Must only be called by the owning thread.
    pub fn with_frames<R>(&self, f: impl FnOnce(&mut Vec<CallFrame>) -> R) -> R {
        f(&mut self.stack.lock())
    }

    pub(crate) fn lock_stack(&self) -> MutexGuard<'_, Vec<CallFrame>> {
        self.stack.lock()
    }

    /// Current execution mode
    pub fn state(&self) -> ThreadState {
        *self.state.lock()
    }

    /// Whether a VM operation currently holds this thread stopped.
    ///
    /// Independent of [`Self::state`]: a stop never rewrites the mode the
    /// owner is in.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub(crate) fn set_stopped(&self, stopped: bool) {
        self.stopped.store(stopped, Ordering::Release);
    }

    /// Switch execution mode until the returned guard is dropped
    pub fn transition(&self, to: ThreadState) -> ThreadStateGuard<'_> {
        let previous = std::mem::replace(&mut *self.state.lock(), to);
        ThreadStateGuard {
            thread: self,
            previous,
        }
    }
}

/// Restores the previous thread state on drop
#[derive(Debug)]
pub struct ThreadStateGuard<'a> {
    thread: &'a ManagedThread,
    previous: ThreadState,
}

impl Drop for ThreadStateGuard<'_> {
    fn drop(&mut self) {
        *self.thread.state.lock() = self.previous;
    }
}
