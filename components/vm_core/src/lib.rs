//! Host execution engine model
//!
//! This crate provides the parts of a managed runtime the JIT control layer
//! observes:
//! - Method table with identity resolution
//! - Managed threads owning their physical call stacks
//! - Logical, inlining-aware frame snapshots (sender chain)
//! - Safepoint executor for stop-the-world VM operations
//!
//! # Example
//!
//! ```
//! use vm_core::{MethodDef, VM};
//!
//! let vm = VM::new();
//! let main = vm.define_method(MethodDef::new("demo.App", "main"));
//! let thread = vm.attach_thread("main");
//! thread.push_interpreted(main);
//!
//! let snapshot = thread.snapshot();
//! assert_eq!(snapshot.len(), 1);
//! assert!(snapshot.top().unwrap().is_interpreted_frame());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call_frame;
pub mod method;
pub mod safepoint;
pub mod thread;
pub mod vframe;
pub mod vm;

// Re-export main types at crate root
pub use call_frame::{CallFrame, ScopeDesc};
pub use method::{MethodDef, MethodInfo, MethodTable};
pub use safepoint::{StoppedWorld, VmOperation, VmThread};
pub use thread::{ManagedThread, ThreadState, ThreadStateGuard};
pub use vframe::{FrameMode, StackSnapshot, VFrame};
pub use vm::VM;
