//! Shared identities and error types for the JIT control workspace.
//!
//! This crate provides the vocabulary every other component speaks:
//! opaque handles for methods, compiled artifacts and threads, the
//! optimization tier scale, compile entry points, and the error taxonomy.
//!
//! # Overview
//!
//! - [`MethodId`] - Stable identity of a unit of managed code
//! - [`CodeId`] - Identity of one compiled artifact in the code cache
//! - [`ThreadId`] - Identity of a managed execution thread
//! - [`CompilationTier`] - Optimization tier of a compiled artifact
//! - [`CompileEntry`] - Standard entry or on-stack-replacement entry
//! - [`VmError`] / [`ErrorKind`] - Errors surfaced by the host and control layer
//!
//! # Examples
//!
//! ```
//! use core_types::{CompilationTier, CompileEntry, ErrorKind, VmError};
//!
//! let tier = CompilationTier::from_level(1).unwrap();
//! assert_eq!(tier, CompilationTier::Baseline);
//!
//! let entry = CompileEntry::Osr(12);
//! assert!(entry.is_osr());
//!
//! let err = VmError::invalid_state("no frame at depth 3");
//! assert_eq!(err.kind, ErrorKind::InvalidState);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod entry;
mod error;
mod ids;
mod tier;

pub use entry::{Bci, CompileEntry};
pub use error::{ErrorKind, VmError, VmResult};
pub use ids::{CodeId, MethodId, ThreadId};
pub use tier::CompilationTier;
