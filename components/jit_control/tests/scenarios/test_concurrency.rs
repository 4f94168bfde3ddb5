//! Control operations racing across managed threads

use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crate::common::{poll_until, Harness};
use core_types::{CompilationTier, CompileEntry};
use jit_compiler::JitConfig;
use jit_control::ControlConfig;

#[test]
fn test_method_deopt_reaches_other_threads() {
    let h = Arc::new(Harness::tiered());
    let main = h.method("main");
    let hot = h.method("hot");
    h.runtime
        .compile(hot, CompilationTier::Baseline, CompileEntry::Standard)
        .unwrap();

    let (ready_tx, ready_rx) = mpsc::channel();
    let (go_tx, go_rx) = mpsc::channel::<()>();

    let worker = {
        let h = Arc::clone(&h);
        thread::spawn(move || {
            let thread = h.runtime.vm().attach_thread("worker");
            h.runtime.invoke(&thread, main).unwrap();
            h.runtime.invoke(&thread, hot).unwrap();
            let compiled = !h.control.is_being_interpreted(&thread);
            ready_tx.send(compiled).unwrap();
            go_rx.recv().unwrap();
            h.control.is_being_interpreted(&thread)
        })
    };

    assert!(ready_rx.recv().unwrap(), "worker should start in compiled code");

    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();
    h.runtime.invoke(&thread, hot).unwrap();
    assert!(h.control.ensure_deoptimized(&thread));
    assert!(h.control.is_being_interpreted(&thread));

    go_tx.send(()).unwrap();
    assert!(worker.join().unwrap(), "worker frame should be interpreted");
}

#[test]
fn test_concurrent_ensure_compiles_each_method() {
    let h = Arc::new(Harness::new(JitConfig::background(), ControlConfig::default()));
    let main = h.method("main");
    let shared = h.method("shared");
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let h = Arc::clone(&h);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let thread = h.runtime.vm().attach_thread(&format!("t{}", i));
                h.runtime.invoke(&thread, main).unwrap();
                barrier.wait();
                h.control.ensure_method_jit_compiled(&thread, shared, None)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert!(poll_until(Duration::from_secs(5), || {
        h.control.is_method_jit_compiled(shared, None)
    }));
    assert!(h.runtime.broker().stats().functions_compiled >= 1);
}

#[test]
fn test_queries_race_with_deoptimization() {
    let h = Arc::new(Harness::tiered());
    let main = h.method("main");
    let hot = h.method("hot");
    let rounds = 50;

    let querier = {
        let h = Arc::clone(&h);
        thread::spawn(move || {
            let thread = h.runtime.vm().attach_thread("querier");
            h.runtime.invoke(&thread, main).unwrap();
            for _ in 0..rounds * 4 {
                // Any answer is fine; it must just never tear.
                let _ = h.control.is_method_jit_compiled(hot, None);
                assert!(h.control.is_being_interpreted(&thread));
            }
        })
    };

    let thread = h.runtime.vm().attach_thread("main");
    h.runtime.invoke(&thread, main).unwrap();
    for _ in 0..rounds {
        assert!(h.control.ensure_method_jit_compiled(&thread, hot, None));
        h.runtime.invoke(&thread, hot).unwrap();
        assert!(h.control.ensure_deoptimized(&thread));
        assert!(h.control.is_being_interpreted(&thread));
        h.runtime.return_from(&thread).unwrap();
    }

    querier.join().unwrap();
    assert_eq!(h.runtime.vm().safepoints(), rounds as u64);
}
