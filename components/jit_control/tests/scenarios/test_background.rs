//! Behaviour under a background compiler

use std::time::Duration;

use crate::common::{poll_until, Harness};
use core_types::CompileEntry;
use jit_compiler::JitConfig;
use jit_control::{CompileOutcome, ControlConfig};

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_method_request_is_accepted_before_install() {
    let h = Harness::new(JitConfig::background(), ControlConfig::default());
    let main = h.method("main");
    let foo = h.method("foo");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();

    let outcome = h.control.try_ensure_method_jit_compiled(&thread, foo, None).unwrap();
    assert_eq!(outcome, CompileOutcome::CompileRequested(CompileEntry::Standard));

    assert!(poll_until(TIMEOUT, || h.control.is_method_jit_compiled(foo, None)));
    let again = h.control.try_ensure_method_jit_compiled(&thread, foo, None).unwrap();
    assert!(matches!(again, CompileOutcome::AlreadyCompiledAtTier(_)));
}

#[test]
fn test_osr_round_trip_after_polling() {
    let h = Harness::new(JitConfig::background(), ControlConfig::default());
    let m = h.loop_method("loop", 12);
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, m).unwrap();
    thread.set_bci(12).unwrap();

    assert!(h.control.ensure_jit_compiled(&thread, 0, None));
    assert!(poll_until(TIMEOUT, || h.control.is_jit_compiled(&thread, 0, None)));

    // Emulate the loop running until migration happens.
    assert!(poll_until(TIMEOUT, || {
        h.runtime.backedge(&thread, 12).unwrap_or(false)
    }));
    assert!(!h.control.is_being_interpreted(&thread));
}

#[test]
fn test_queue_pressure_gives_definite_outcomes() {
    let config = JitConfig {
        queue_capacity: 1,
        ..JitConfig::background()
    };
    let h = Harness::new(config, ControlConfig::default());
    let main = h.method("main");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();

    let methods: Vec<_> = (0..64).map(|i| h.method(&format!("m{}", i))).collect();
    let outcomes: Vec<_> = methods
        .iter()
        .map(|&m| h.control.try_ensure_method_jit_compiled(&thread, m, None).unwrap())
        .collect();

    assert!(outcomes.iter().any(CompileOutcome::is_satisfied));
    for outcome in &outcomes {
        assert!(matches!(
            outcome,
            CompileOutcome::CompileRequested(_) | CompileOutcome::CompileRequestFailed(_)
        ));
    }
    assert!(h.runtime.wait_for_compilation(TIMEOUT));
}
