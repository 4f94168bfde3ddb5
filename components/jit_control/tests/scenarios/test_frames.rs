//! Frame location against independently known stack content

use crate::common::Harness;
use core_types::ErrorKind;
use jit_control::frames;

#[test]
fn test_frame_at_matches_call_sequence() {
    let h = Harness::tiered();
    let names = ["main", "a", "b", "c"];
    let methods: Vec<_> = names.iter().map(|n| h.method(n)).collect();
    let thread = h.runtime.vm().attach_thread("main");
    for &m in &methods {
        h.runtime.invoke(&thread, m).unwrap();
    }

    for (depth, &expected) in methods.iter().rev().enumerate() {
        assert_eq!(frames::require_frame_at(&thread, depth).unwrap().method, expected);
    }
    let err = frames::require_frame_at(&thread, methods.len()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[test]
fn test_inlined_callee_is_its_own_logical_frame() {
    let h = Harness::tiered();
    let callee = h.method("callee");
    let caller = h.runtime.vm().define_method(
        vm_core::MethodDef::new(crate::common::HOLDER, "caller").inlines(callee),
    );
    h.runtime
        .compile(caller, core_types::CompilationTier::Optimized, core_types::CompileEntry::Standard)
        .unwrap();

    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, caller).unwrap();
    h.runtime.invoke(&thread, callee).unwrap();

    assert_eq!(frames::require_frame_at(&thread, 0).unwrap().method, callee);
    assert_eq!(frames::require_frame_at(&thread, 1).unwrap().method, caller);
    assert!(!h.control.is_being_interpreted(&thread));
    assert!(frames::is_on_stack(&thread, callee));
}
