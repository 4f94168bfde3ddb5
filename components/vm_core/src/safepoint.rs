//! Stop-the-world VM operations
//!
//! A VM operation runs while every attached thread is held away from its
//! stack. It is the only sanctioned way to rewrite frames on a thread other
//! than the caller.

use crate::call_frame::CallFrame;
use crate::thread::ManagedThread;
use core_types::ThreadId;
use log::debug;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// An operation executed at a safepoint
pub trait VmOperation {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Perform the operation with every thread stopped
    fn doit(&mut self, world: &mut StoppedWorld<'_>);
}

/// Exclusive access to every attached thread's stack
pub struct StoppedWorld<'a> {
    stacks: Vec<(ThreadId, MutexGuard<'a, Vec<CallFrame>>)>,
}

impl<'a> StoppedWorld<'a> {
    /// Number of stopped threads
    pub fn thread_count(&self) -> usize {
        self.stacks.len()
    }

    /// Every stopped thread's physical frames, bottom first
    pub fn stacks_mut(&mut self) -> Vec<(ThreadId, &mut Vec<CallFrame>)> {
        self.stacks
            .iter_mut()
            .map(|(id, stack)| (*id, &mut **stack))
            .collect()
    }
}

/// Executor of VM operations
///
/// Operations are serialized: at most one runs at a time.
#[derive(Debug, Default)]
pub struct VmThread {
    op_lock: Mutex<()>,
    executed: AtomicU64,
}

impl VmThread {
    /// Create an executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop `threads`, run `op`, resume.
    ///
    /// Blocks the caller until the operation completes. The caller must not
    /// hold any thread's stack.
    pub fn execute(&self, threads: &[Arc<ManagedThread>], op: &mut dyn VmOperation) {
        let _serial = self.op_lock.lock();
        debug!("safepoint begin: {} ({} threads)", op.name(), threads.len());

        {
            let mut world = StoppedWorld {
                stacks: threads
                    .iter()
                    .map(|thread| (thread.id(), thread.lock_stack()))
                    .collect(),
            };
            for thread in threads {
                thread.set_stopped(true);
            }
            op.doit(&mut world);
            for thread in threads {
                thread.set_stopped(false);
            }
        }

        self.executed.fetch_add(1, Ordering::SeqCst);
        debug!("safepoint end: {}", op.name());
    }

    /// Number of operations executed so far
    pub fn operations_executed(&self) -> u64 {
        self.executed.load(Ordering::SeqCst)
    }
}
