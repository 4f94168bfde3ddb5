//! Diagnostic JIT control
//!
//! Lets a test harness running on a managed thread ask whether a frame or
//! method is interpreted or compiled, and drive it into or out of compiled
//! execution:
//!
//! - [`frames`]: locating logical frames and checking stack presence
//! - [`status`]: resolving the compiled-code status of a method
//! - [`compile`]: deciding and issuing compile requests
//! - [`deopt`]: forcing frames back to the interpreter
//! - [`registry`]: the set-once facility flag and entry point table
//! - [`JitControl`]: the six operations behind one façade
//!
//! The layer never compiles or deoptimizes anything itself. Every state
//! change goes through a [`CompilationHost`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use jit_compiler::{JitConfig, JitRuntime};
//! use jit_control::{registry, ControlConfig, JitControl};
//! use vm_core::MethodDef;
//!
//! registry::set_used();
//! let runtime = Arc::new(JitRuntime::new(JitConfig::tiered()));
//! let control = JitControl::new(Arc::clone(&runtime), ControlConfig::default()).unwrap();
//!
//! let foo = runtime.vm().define_method(MethodDef::new("demo.App", "foo"));
//! let main = runtime.vm().define_method(MethodDef::new("demo.App", "main"));
//! let thread = runtime.vm().attach_thread("main");
//! runtime.invoke(&thread, main).unwrap();
//!
//! assert!(control.is_being_interpreted(&thread));
//! assert!(!control.is_method_jit_compiled(foo, None));
//! assert!(control.ensure_method_jit_compiled(&thread, foo, None));
//! assert!(control.is_method_jit_compiled(foo, None));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod compile;
pub mod config;
pub mod control;
pub mod deopt;
pub mod frames;
pub mod host;
pub mod registry;
pub mod status;

pub use compile::CompileOutcome;
pub use config::{ControlConfig, DeoptScope, TierMatch};
pub use control::JitControl;
pub use deopt::DeoptOutcome;
pub use host::CompilationHost;
pub use registry::EntryPoint;
pub use status::{CodeStatus, StatusQuery};
