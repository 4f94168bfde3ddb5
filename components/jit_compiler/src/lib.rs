//! Tiered JIT compilation subsystem of the host runtime
//!
//! This crate provides:
//! - Code cache: compiled artifacts per method (standard + OSR) behind one lock
//! - Compile broker: synchronous or background compilation at a requested tier
//! - OSR: entering compiled code from a running interpreted frame
//! - Deoptimization: rewriting compiled frames back into interpreter frames
//! - [`JitRuntime`]: the VM and the compiler assembled into one host
//!
//! # Example
//!
//! ```
//! use core_types::{CompilationTier, CompileEntry};
//! use jit_compiler::{JitConfig, JitRuntime};
//! use vm_core::{FrameMode, MethodDef};
//!
//! let runtime = JitRuntime::new(JitConfig::tiered());
//! let foo = runtime.vm().define_method(MethodDef::new("demo.App", "foo"));
//!
//! let result = runtime
//!     .compile(foo, CompilationTier::Baseline, CompileEntry::Standard)
//!     .unwrap();
//! assert!(result.accepted());
//!
//! let thread = runtime.vm().attach_thread("main");
//! let mode = runtime.invoke(&thread, foo).unwrap();
//! assert!(matches!(mode, FrameMode::Compiled(_)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod code_cache;
pub mod compile_broker;
pub mod compiled_code;
pub mod compiler;
pub mod config;
pub mod deopt;
pub mod osr;
pub mod runtime;

// Re-export main types at crate root
pub use code_cache::{CodeCache, CodeTable};
pub use compile_broker::{CompileBroker, CompileResult};
pub use compiled_code::{CodeState, CompiledCode};
pub use compiler::{CodeBlob, Compiler, CompilerStats};
pub use config::{CompileMode, JitConfig};
pub use deopt::{DeoptInfo, DeoptReason, Deoptimizer};
pub use osr::OsrEntry;
pub use runtime::JitRuntime;
