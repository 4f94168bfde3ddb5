//! Contract compliance tests for core_types
//!
//! These tests pin the public surface other components rely on.

use core_types::{
    Bci, CodeId, CompilationTier, CompileEntry, ErrorKind, MethodId, ThreadId, VmError, VmResult,
};
use std::collections::HashSet;

#[test]
fn test_handles_are_hashable_and_copy() {
    let mut set = HashSet::new();
    let m = MethodId(1);
    set.insert(m);
    set.insert(m);
    assert_eq!(set.len(), 1);

    let c = CodeId(9);
    let copied = c;
    assert_eq!(c, copied);

    let t: ThreadId = ThreadId(2);
    assert_eq!(t.0, 2);
}

#[test]
fn test_error_has_kind_and_message_fields() {
    let err: VmError = VmError::new(ErrorKind::UnsupportedTier, "level 2");
    let _kind: ErrorKind = err.kind;
    let _message: &String = &err.message;
}

#[test]
fn test_result_alias() {
    let ok: VmResult<Bci> = Ok(3);
    assert_eq!(ok.unwrap(), 3);
}

#[test]
fn test_tier_from_level_returns_result() {
    let tier: VmResult<CompilationTier> = CompilationTier::from_level(4);
    assert_eq!(tier.unwrap(), CompilationTier::Optimized);
}

#[test]
fn test_compile_entry_variants() {
    let _standard = CompileEntry::Standard;
    let _osr = CompileEntry::Osr(0);
}
