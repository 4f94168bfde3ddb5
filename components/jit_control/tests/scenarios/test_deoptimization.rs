//! Forcing frames back into the interpreter

use crate::common::Harness;
use core_types::{CompilationTier, CompileEntry};
use jit_compiler::{DeoptReason, JitConfig};
use jit_control::{ControlConfig, DeoptOutcome};

fn compiled_call(h: &Harness, name: &str) -> (core_types::MethodId, std::sync::Arc<vm_core::ManagedThread>) {
    let main = h.method("main");
    let m = h.method(name);
    h.runtime
        .compile(m, CompilationTier::Baseline, CompileEntry::Standard)
        .unwrap();
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();
    h.runtime.invoke(&thread, m).unwrap();
    (m, thread)
}

#[test]
fn test_deoptimized_frame_reports_interpreted() {
    let h = Harness::tiered();
    let (m, thread) = compiled_call(&h, "hot");
    assert!(!h.control.is_being_interpreted(&thread));
    assert!(h.control.is_jit_compiled(&thread, 0, None));

    assert!(h.control.ensure_deoptimized(&thread));
    assert!(h.control.is_being_interpreted(&thread));
    assert!(!h.control.is_jit_compiled(&thread, 0, None));
    assert!(!h.control.is_method_jit_compiled(m, None));
}

#[test]
fn test_method_scope_sends_future_calls_to_interpreter() {
    let h = Harness::tiered();
    let (m, thread) = compiled_call(&h, "hot");

    assert!(h.control.ensure_deoptimized(&thread));
    h.runtime.return_from(&thread).unwrap();
    h.runtime.invoke(&thread, m).unwrap();
    assert!(h.control.is_being_interpreted(&thread));
    assert_eq!(h.runtime.vm().safepoints(), 1);
}

#[test]
fn test_frame_scope_leaves_code_installed() {
    let h = Harness::new(JitConfig::tiered(), ControlConfig::frame_scoped());
    let (m, thread) = compiled_call(&h, "hot");

    let outcome = h.control.try_ensure_deoptimized(&thread).unwrap();
    assert_eq!(outcome, DeoptOutcome::Deoptimized { invalidated: 1 });
    assert!(h.control.is_being_interpreted(&thread));
    assert!(h.control.is_method_jit_compiled(m, None));
    assert_eq!(h.runtime.vm().safepoints(), 0);

    // The next call enters the still-installed code.
    h.runtime.invoke(&thread, m).unwrap();
    assert!(!h.control.is_being_interpreted(&thread));
    assert_eq!(h.runtime.deoptimizer().history()[0].reason, DeoptReason::Explicit);
}

#[test]
fn test_interpreted_caller_is_already_satisfied() {
    let h = Harness::tiered();
    let main = h.method("main");
    let m = h.method("m");
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();
    h.runtime.invoke(&thread, m).unwrap();

    let outcome = h.control.try_ensure_deoptimized(&thread).unwrap();
    assert_eq!(outcome, DeoptOutcome::AlreadyInterpreted);
    assert!(h.control.ensure_deoptimized(&thread));
    assert_eq!(h.runtime.vm().safepoints(), 0);
    assert_eq!(h.runtime.deoptimizer().deopt_count(), 0);
}

#[test]
fn test_inlined_frame_deoptimizes_whole_physical_frame() {
    let h = Harness::tiered();
    let callee = h.method("callee");
    let caller = h.runtime.vm().define_method(
        vm_core::MethodDef::new(crate::common::HOLDER, "caller").inlines(callee),
    );
    h.runtime
        .compile(caller, CompilationTier::Optimized, CompileEntry::Standard)
        .unwrap();
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, caller).unwrap();
    h.runtime.invoke(&thread, callee).unwrap();

    // The callee has no code of its own; the caller's code depends on it.
    let outcome = h.control.try_ensure_deoptimized(&thread).unwrap();
    assert_eq!(outcome, DeoptOutcome::Deoptimized { invalidated: 1 });

    let snapshot = thread.snapshot();
    assert_eq!(thread.physical_depth(), 2);
    assert!(snapshot.iter().all(|vf| vf.is_interpreted_frame()));
    assert!(h.runtime.standard_code(caller).is_none());
}

#[test]
fn test_osr_and_standard_code_both_invalidated() {
    let h = Harness::tiered();
    let main = h.method("main");
    let m = h.loop_method("loop", 8);
    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();

    h.runtime
        .compile(m, CompilationTier::Baseline, CompileEntry::Osr(8))
        .unwrap();
    h.runtime
        .compile(m, CompilationTier::Baseline, CompileEntry::Standard)
        .unwrap();
    h.runtime.invoke(&thread, m).unwrap();

    let outcome = h.control.try_ensure_deoptimized(&thread).unwrap();
    assert_eq!(outcome, DeoptOutcome::Deoptimized { invalidated: 2 });
    assert!(h
        .runtime
        .code_cache()
        .lock()
        .lookup_osr(m, None, None, false)
        .is_none());
}
