//! Repeated queries and requests without intervening activity

use crate::common::Harness;
use core_types::CompilationTier;
use jit_compiler::JitConfig;
use jit_control::{CompileOutcome, ControlConfig, TierMatch};

#[test]
fn test_queries_are_stable() {
    let h = Harness::tiered();
    let main = h.method("main");
    let foo = h.method("foo");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();

    for _ in 0..5 {
        assert!(!h.control.is_method_jit_compiled(foo, None));
        assert!(!h.control.is_jit_compiled(&thread, 0, None));
    }
    assert!(h.control.ensure_method_jit_compiled(&thread, foo, None));
    for _ in 0..5 {
        assert!(h.control.is_method_jit_compiled(foo, None));
    }
}

#[test]
fn test_repeated_ensure_issues_one_request() {
    let h = Harness::tiered();
    let main = h.method("main");
    let foo = h.method("foo");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();

    let first = h.control.try_ensure_method_jit_compiled(&thread, foo, None).unwrap();
    assert!(first.issued_request());
    for _ in 0..3 {
        let again = h.control.try_ensure_method_jit_compiled(&thread, foo, None).unwrap();
        assert!(matches!(again, CompileOutcome::AlreadyCompiledAtTier(_)));
    }
    assert_eq!(h.runtime.broker().stats().functions_compiled, 1);
}

#[test]
fn test_ensure_again_after_deoptimization() {
    let h = Harness::tiered();
    let main = h.method("main");
    let foo = h.method("foo");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();

    assert!(h.control.ensure_method_jit_compiled(&thread, foo, None));
    h.runtime.invoke(&thread, foo).unwrap();
    assert!(h.control.ensure_deoptimized(&thread));
    h.runtime.return_from(&thread).unwrap();

    assert!(!h.control.is_method_jit_compiled(foo, None));
    let outcome = h.control.try_ensure_method_jit_compiled(&thread, foo, None).unwrap();
    assert!(outcome.issued_request());
    assert_eq!(h.runtime.broker().stats().functions_compiled, 2);
}

#[test]
fn test_exact_tier_does_not_accept_higher_code() {
    let h = Harness::tiered();
    let main = h.method("main");
    let foo = h.method("foo");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();

    assert!(h
        .control
        .ensure_method_jit_compiled(&thread, foo, Some(CompilationTier::Optimized)));
    assert!(!h.control.is_method_jit_compiled(foo, Some(CompilationTier::Baseline)));
    assert!(h.control.is_method_jit_compiled(foo, Some(CompilationTier::Optimized)));
}

#[test]
fn test_at_least_tier_accepts_higher_code() {
    let h = Harness::new(
        JitConfig::tiered(),
        ControlConfig::new().with_tier_match(TierMatch::AtLeast),
    );
    let main = h.method("main");
    let foo = h.method("foo");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();

    assert!(h
        .control
        .ensure_method_jit_compiled(&thread, foo, Some(CompilationTier::Optimized)));
    assert!(h.control.is_method_jit_compiled(foo, Some(CompilationTier::Baseline)));

    let outcome = h
        .control
        .try_ensure_method_jit_compiled(&thread, foo, Some(CompilationTier::FullProfile))
        .unwrap();
    assert!(matches!(outcome, CompileOutcome::AlreadyCompiledAtTier(_)));
}
