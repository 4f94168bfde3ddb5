//! Safepoint operations across threads

use std::sync::Arc;
use std::thread;

use core_types::MethodId;
use vm_core::{CallFrame, MethodDef, StoppedWorld, VmOperation, VM};

struct RewriteTop {
    from: MethodId,
    to: MethodId,
    rewritten: usize,
}

impl VmOperation for RewriteTop {
    fn name(&self) -> &'static str {
        "RewriteTop"
    }

    fn doit(&mut self, world: &mut StoppedWorld<'_>) {
        for (_, stack) in world.stacks_mut() {
            for frame in stack.iter_mut() {
                if frame.method() == self.from {
                    *frame = CallFrame::interpreted(self.to);
                    self.rewritten += 1;
                }
            }
        }
    }
}

#[test]
fn test_operation_rewrites_frames_of_other_threads() {
    let vm = Arc::new(VM::new());
    let a = vm.define_method(MethodDef::new("T", "a"));
    let b = vm.define_method(MethodDef::new("T", "b"));

    let worker = vm.attach_thread("worker");
    worker.push_interpreted(a);

    let main = vm.attach_thread("main");
    main.push_interpreted(a);

    let mut op = RewriteTop { from: a, to: b, rewritten: 0 };
    vm.execute(&mut op);

    assert_eq!(op.rewritten, 2);
    assert_eq!(worker.snapshot().top().unwrap().method, b);
    assert_eq!(main.snapshot().top().unwrap().method, b);
}

#[test]
fn test_concurrent_operations_are_serialized() {
    let vm = Arc::new(VM::new());
    let m = vm.define_method(MethodDef::new("T", "m"));
    for i in 0..4 {
        vm.attach_thread(&format!("t{}", i)).push_interpreted(m);
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let vm = Arc::clone(&vm);
            thread::spawn(move || {
                let mut op = RewriteTop { from: MethodId(999), to: m, rewritten: 0 };
                vm.execute(&mut op);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(vm.safepoints(), 4);
}
