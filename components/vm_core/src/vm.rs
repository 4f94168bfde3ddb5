//! Virtual Machine
//!
//! Owns the method table, the attached threads and the VM-operation executor.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use core_types::{MethodId, ThreadId};
use log::debug;
use parking_lot::RwLock;

use crate::method::{MethodDef, MethodInfo, MethodTable};
use crate::safepoint::{VmOperation, VmThread};
use crate::thread::ManagedThread;

/// Virtual Machine shared by all managed threads
///
/// The VM manages:
/// - Method registry and identity resolution
/// - Attached managed threads
/// - Serialized stop-the-world operations
#[derive(Debug, Default)]
pub struct VM {
    /// Registered methods
    methods: MethodTable,
    /// Attached threads in attach order
    threads: RwLock<Vec<Arc<ManagedThread>>>,
    /// Next thread id to hand out
    next_thread_id: AtomicU32,
    /// Executor for safepoint operations
    vm_thread: VmThread,
}

impl VM {
    /// Create a new VM with no methods and no threads
    pub fn new() -> Self {
        Self::default()
    }

    /// Method registry
    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    /// Register a method and return its id
    pub fn define_method(&self, def: MethodDef) -> MethodId {
        self.methods.define(def)
    }

    /// Look up a method by id
    pub fn method(&self, id: MethodId) -> Option<Arc<MethodInfo>> {
        self.methods.get(id)
    }

    /// Attach a new managed thread
    pub fn attach_thread(&self, name: &str) -> Arc<ManagedThread> {
        let id = ThreadId(self.next_thread_id.fetch_add(1, Ordering::SeqCst));
        let thread = Arc::new(ManagedThread::new(id, name));
        self.threads.write().push(Arc::clone(&thread));
        debug!("attached {} ({})", id, name);
        thread
    }

    /// Detach a thread; returns whether it was attached
    pub fn detach_thread(&self, id: ThreadId) -> bool {
        let mut threads = self.threads.write();
        let before = threads.len();
        threads.retain(|thread| thread.id() != id);
        before != threads.len()
    }

    /// Snapshot of the attached threads
    pub fn threads(&self) -> Vec<Arc<ManagedThread>> {
        self.threads.read().clone()
    }

    /// Number of attached threads
    pub fn thread_count(&self) -> usize {
        self.threads.read().len()
    }

    /// Run `op` with every attached thread stopped
    pub fn execute(&self, op: &mut dyn VmOperation) {
        let threads = self.threads();
        self.vm_thread.execute(&threads, op);
    }

    /// Number of safepoint operations executed
    pub fn safepoints(&self) -> u64 {
        self.vm_thread.operations_executed()
    }
}
