//! Ensure-compiled followed by the matching query

use crate::common::Harness;
use core_types::{CompilationTier, CompileEntry};
use jit_control::CompileOutcome;

#[test]
fn test_method_round_trip_at_each_tier() {
    let h = Harness::tiered();
    let main = h.method("main");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();

    for tier in CompilationTier::ALL {
        let m = h.method(&format!("at_{}", tier.level()));
        assert!(!h.control.is_method_jit_compiled(m, Some(tier)));
        assert!(h.control.ensure_method_jit_compiled(&thread, m, Some(tier)));
        assert!(h.control.is_method_jit_compiled(m, Some(tier)));
    }
}

#[test]
fn test_frame_round_trip_through_osr() {
    let h = Harness::tiered();
    let main = h.method("main");
    let m = h.loop_method("loop", 10);
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();
    h.runtime.invoke(&thread, m).unwrap();
    thread.set_bci(10).unwrap();

    assert!(!h.control.is_jit_compiled(&thread, 0, None));
    let outcome = h.control.try_ensure_jit_compiled(&thread, 0, None).unwrap();
    assert_eq!(outcome, CompileOutcome::CompileRequested(CompileEntry::Osr(10)));
    assert!(h.control.is_jit_compiled(&thread, 0, None));

    // Still interpreting until the loop comes round again.
    assert!(h.control.is_being_interpreted(&thread));
    assert!(h.runtime.backedge(&thread, 10).unwrap());
    assert!(!h.control.is_being_interpreted(&thread));

    let outcome = h.control.try_ensure_jit_compiled(&thread, 0, None).unwrap();
    assert!(matches!(outcome, CompileOutcome::AlreadyCompiledAnyTier(_)));
}

#[test]
fn test_osr_request_off_block_start_fails() {
    let h = Harness::tiered();
    let m = h.loop_method("loop", 10);
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, m).unwrap();
    thread.set_bci(7).unwrap();

    assert!(!h.control.ensure_jit_compiled(&thread, 0, None));
    assert!(!h.control.is_jit_compiled(&thread, 0, None));
    assert_eq!(h.runtime.broker().stats().rejected, 1);
}

#[test]
fn test_frame_round_trip_for_caller() {
    let h = Harness::tiered();
    let outer = h.loop_method("outer", 4);
    let inner = h.method("inner");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, outer).unwrap();
    thread.set_bci(4).unwrap();
    h.runtime.invoke(&thread, inner).unwrap();

    assert!(h.control.ensure_jit_compiled(&thread, 1, None));
    assert!(h.control.is_jit_compiled(&thread, 1, None));
    assert!(!h.control.is_jit_compiled(&thread, 0, None));
}
