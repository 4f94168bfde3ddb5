//! Shared scenario fixtures

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use core_types::{Bci, MethodId};
use jit_compiler::{JitConfig, JitRuntime};
use jit_control::{registry, ControlConfig, JitControl};
use vm_core::MethodDef;

pub const HOLDER: &str = "demo.Scenario";

/// A runtime with the control facility bound to it
pub struct Harness {
    pub runtime: Arc<JitRuntime>,
    pub control: JitControl,
}

impl Harness {
    pub fn new(jit: JitConfig, control: ControlConfig) -> Self {
        registry::set_used();
        let runtime = Arc::new(JitRuntime::new(jit));
        let control = JitControl::new(Arc::clone(&runtime), control)
            .expect("facility enabled above");
        Self { runtime, control }
    }

    /// Synchronous tiered host, default control policy
    pub fn tiered() -> Self {
        Self::new(JitConfig::tiered(), ControlConfig::default())
    }

    pub fn method(&self, name: &str) -> MethodId {
        self.runtime.vm().define_method(MethodDef::new(HOLDER, name))
    }

    /// A method with a loop header at `header`
    pub fn loop_method(&self, name: &str, header: Bci) -> MethodId {
        self.runtime
            .vm()
            .define_method(MethodDef::new(HOLDER, name).code_length(32).block_starts([header]))
    }
}

/// Poll `condition` until it holds or `timeout` passes
pub fn poll_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
