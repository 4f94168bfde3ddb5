//! JIT-enabled runtime
//!
//! Glues the VM, the code cache, the compile broker and the deoptimizer
//! into the host the control layer talks to. It also decides how calls,
//! returns and loop back edges move frames between interpreted and compiled
//! execution.
//!
//! Lock order: a thread's stack, then the code cache. Safepoint operations
//! follow the same order.

use std::sync::Arc;
use std::time::Duration;

use core_types::{Bci, CompilationTier, CompileEntry, MethodId, VmError, VmResult};
use log::trace;
use vm_core::{CallFrame, FrameMode, ManagedThread, ScopeDesc, VM};

use crate::code_cache::CodeCache;
use crate::compile_broker::{CompileBroker, CompileResult};
use crate::compiled_code::CompiledCode;
use crate::config::JitConfig;
use crate::deopt::Deoptimizer;
use crate::osr::OsrEntry;

/// The host runtime: VM plus tiered compilation
#[derive(Debug)]
pub struct JitRuntime {
    vm: Arc<VM>,
    code_cache: Arc<CodeCache>,
    broker: CompileBroker,
    deoptimizer: Deoptimizer,
}

impl JitRuntime {
    /// Create a runtime with a fresh VM
    pub fn new(config: JitConfig) -> Self {
        Self::with_vm(Arc::new(VM::new()), config)
    }

    /// Create a runtime around an existing VM
    pub fn with_vm(vm: Arc<VM>, config: JitConfig) -> Self {
        let code_cache = Arc::new(CodeCache::new());
        let broker = CompileBroker::new(config, Arc::clone(&code_cache));
        Self {
            vm,
            code_cache,
            broker,
            deoptimizer: Deoptimizer::new(),
        }
    }

    /// The virtual machine
    pub fn vm(&self) -> &Arc<VM> {
        &self.vm
    }

    /// The code cache
    pub fn code_cache(&self) -> &CodeCache {
        &self.code_cache
    }

    /// The compile broker
    pub fn broker(&self) -> &CompileBroker {
        &self.broker
    }

    /// The deoptimizer
    pub fn deoptimizer(&self) -> &Deoptimizer {
        &self.deoptimizer
    }

    /// Compilation policy
    pub fn config(&self) -> &JitConfig {
        self.broker.config()
    }

    /// Request compilation of `method`
    pub fn compile(
        &self,
        method: MethodId,
        tier: CompilationTier,
        entry: CompileEntry,
    ) -> VmResult<CompileResult> {
        let info = self.vm.methods().require(method)?;
        self.broker.compile_method(info, tier, entry)
    }

    /// Block until background compilation drains
    pub fn wait_for_compilation(&self, timeout: Duration) -> bool {
        self.broker.wait_until_idle(timeout)
    }

    /// Call `method` on `thread`.
    ///
    /// Runs inside the caller's compiled frame if that code inlined the
    /// callee, enters the method's standard artifact if one is enterable,
    /// and interprets otherwise.
    pub fn invoke(&self, thread: &ManagedThread, method: MethodId) -> VmResult<FrameMode> {
        self.vm.methods().require(method)?;

        let mode = thread.with_frames(|stack| {
            let table = self.code_cache.lock();

            if let Some(CallFrame::Compiled { code, inlined, .. }) = stack.last_mut() {
                if table.get(*code).map_or(false, |artifact| artifact.inlines(method)) {
                    inlined.push(ScopeDesc::new(method));
                    return FrameMode::Compiled(*code);
                }
            }

            match table.code(method).filter(|code| code.is_enterable()) {
                Some(code) => {
                    stack.push(CallFrame::compiled(code.id, method));
                    FrameMode::Compiled(code.id)
                }
                None => {
                    stack.push(CallFrame::interpreted(method));
                    FrameMode::Interpreted
                }
            }
        });

        trace!("{} invoked {} ({:?})", thread.id(), method, mode);
        Ok(mode)
    }

    /// Return from the innermost logical frame of `thread`
    pub fn return_from(&self, thread: &ManagedThread) -> VmResult<MethodId> {
        thread.with_frames(|stack| {
            if let Some(CallFrame::Compiled { inlined, .. }) = stack.last_mut() {
                if let Some(scope) = inlined.pop() {
                    return Ok(scope.method);
                }
            }
            stack
                .pop()
                .map(|frame| frame.method())
                .ok_or_else(|| VmError::invalid_state(format!("{} has no frame to return from", thread.id())))
        })
    }

    /// Take a loop back edge to `bci` in the innermost frame.
    ///
    /// An interpreted frame migrates into an enterable OSR artifact compiled
    /// for exactly `bci`. Returns whether the frame migrated.
    pub fn backedge(&self, thread: &ManagedThread, bci: Bci) -> VmResult<bool> {
        thread.with_frames(|stack| {
            let method = match stack.last_mut() {
                None => {
                    return Err(VmError::invalid_state(format!(
                        "{} has no managed frame",
                        thread.id()
                    )))
                }
                Some(CallFrame::Compiled { .. }) => return Ok(false),
                Some(CallFrame::Interpreted { method, bci: current }) => {
                    *current = bci;
                    *method
                }
            };

            let entry = self
                .code_cache
                .lock()
                .lookup_osr(method, Some(bci), None, false)
                .filter(|code| code.is_enterable())
                .and_then(OsrEntry::from_code);
            let Some(entry) = entry else {
                return Ok(false);
            };

            if let Some(top) = stack.last_mut() {
                *top = entry.enter_at(top)?;
            }
            trace!("{} migrated {} into {} at bci {}", thread.id(), method, entry.code, bci);
            Ok(true)
        })
    }

    /// Deoptimize every frame running marked code (safepoint)
    pub fn deoptimize_marked(&self) -> usize {
        self.deoptimizer.deoptimize_marked(&self.vm, &self.code_cache)
    }

    /// Deoptimize the logical frame at `depth` of the calling thread.
    ///
    /// The whole physical frame is rewritten, including scopes inlined
    /// around it. Returns `false` if the frame is already interpreted.
    pub fn deoptimize_frame(&self, thread: &ManagedThread, depth: usize) -> VmResult<bool> {
        let snapshot = thread.snapshot();
        let frame = snapshot.at(depth).ok_or_else(|| {
            VmError::invalid_state(format!(
                "depth {} exceeds stack height {}",
                depth,
                snapshot.len()
            ))
        })?;
        if frame.is_interpreted_frame() {
            return Ok(false);
        }
        self.deoptimizer.deoptimize_frame(thread, frame.physical_index)
    }

    /// Copy of the enterable standard artifact of `method`
    pub fn standard_code(&self, method: MethodId) -> Option<CompiledCode> {
        self.code_cache
            .lock()
            .code(method)
            .filter(|code| code.is_enterable())
            .cloned()
    }
}
