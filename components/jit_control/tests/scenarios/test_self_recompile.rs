//! A method may not ask for its own compilation while it is running

use crate::common::Harness;
use jit_control::CompileOutcome;

#[test]
fn test_method_on_stack_is_refused() {
    let h = Harness::tiered();
    let bar = h.method("bar");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, bar).unwrap();

    assert!(!h.control.ensure_method_jit_compiled(&thread, bar, None));
    assert!(h.runtime.standard_code(bar).is_none());
    assert!(!h.control.is_method_jit_compiled(bar, None));
}

#[test]
fn test_recursive_activation_is_refused() {
    let h = Harness::tiered();
    let main = h.method("main");
    let m = h.method("recurse");
    let helper = h.method("helper");
    let thread = h.runtime.vm().attach_thread("main");

    h.runtime.invoke(&thread, main).unwrap();
    for _ in 0..3 {
        h.runtime.invoke(&thread, m).unwrap();
    }
    h.runtime.invoke(&thread, helper).unwrap();

    let outcome = h
        .control
        .try_ensure_method_jit_compiled(&thread, m, None)
        .unwrap();
    assert_eq!(outcome, CompileOutcome::UnsafeToCompile);
    assert_eq!(h.runtime.broker().stats().functions_compiled, 0);

    // Once every activation has returned the request goes through.
    for _ in 0..4 {
        h.runtime.return_from(&thread).unwrap();
    }
    assert!(h.control.ensure_method_jit_compiled(&thread, m, None));
    assert!(h.control.is_method_jit_compiled(m, None));
}

#[test]
fn test_already_compiled_method_on_stack_is_satisfied() {
    let h = Harness::tiered();
    let m = h.method("m");
    let main = h.method("main");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();
    assert!(h.control.ensure_method_jit_compiled(&thread, m, None));

    h.runtime.invoke(&thread, m).unwrap();
    let outcome = h
        .control
        .try_ensure_method_jit_compiled(&thread, m, None)
        .unwrap();
    assert!(matches!(outcome, CompileOutcome::AlreadyCompiledAtTier(_)));
}
