//! Unit tests for VmError and ErrorKind

use core_types::{ErrorKind, VmError, VmResult};

#[test]
fn test_error_kinds_are_distinct() {
    let kinds = [
        ErrorKind::InvalidState,
        ErrorKind::UnsupportedTier,
        ErrorKind::UnsafeOperation,
        ErrorKind::HostRequestFailed,
        ErrorKind::UnknownMethod,
    ];
    for (i, a) in kinds.iter().enumerate() {
        for (j, b) in kinds.iter().enumerate() {
            assert_eq!(i == j, a == b);
        }
    }
}

#[test]
fn test_error_propagates_through_question_mark() {
    fn inner() -> VmResult<u32> {
        Err(VmError::invalid_state("no managed stack"))
    }
    fn outer() -> VmResult<u32> {
        let value = inner()?;
        Ok(value + 1)
    }

    let err = outer().unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert_eq!(err.message, "no managed stack");
}

#[test]
fn test_error_kind_display() {
    assert_eq!(ErrorKind::UnsafeOperation.to_string(), "unsafe operation");
    assert_eq!(ErrorKind::HostRequestFailed.to_string(), "host request failed");
}
