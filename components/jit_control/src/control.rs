//! The diagnostic façade
//!
//! [`JitControl`] exposes the six operations with boolean results. Each
//! boolean operation has a `try_` twin returning the full outcome or error.
//! Operations on the calling thread's frames switch the thread into VM mode
//! for their duration.
//!
//! Every `ensure_*` operation returns `true` when the requested state
//! already holds or the host accepted the transition, and `false` when the
//! request was refused, rejected or failed.

use std::sync::Arc;

use core_types::{Bci, CompilationTier, CompileEntry, MethodId, VmResult};
use jit_compiler::JitRuntime;
use log::{debug, info, warn};
use vm_core::{ManagedThread, ThreadState};

use crate::compile::{self, CompileOutcome};
use crate::config::ControlConfig;
use crate::deopt::{self, DeoptOutcome};
use crate::frames;
use crate::host::CompilationHost;
use crate::registry::{self, EntryPoint};
use crate::status::{self, StatusQuery};

/// Diagnostic JIT control bound to one host
#[derive(Debug)]
pub struct JitControl<H = JitRuntime> {
    host: Arc<H>,
    config: ControlConfig,
    entry_points: &'static [EntryPoint],
}

impl<H: CompilationHost> JitControl<H> {
    /// Bind the facility to `host`.
    ///
    /// Fails with `InvalidState` unless [`registry::set_used`] ran first.
    pub fn new(host: Arc<H>, config: ControlConfig) -> VmResult<Self> {
        let entry_points = registry::register()?;
        debug!("diagnostic JIT control enabled ({} entry points)", entry_points.len());
        Ok(Self {
            host,
            config,
            entry_points,
        })
    }

    /// The host runtime
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Control policy
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Registered entry points
    pub fn entry_points(&self) -> &'static [EntryPoint] {
        self.entry_points
    }

    /// Resolve `holder.name` to a method
    pub fn resolve_method(&self, holder: &str, name: &str) -> VmResult<MethodId> {
        self.host.resolve_method(holder, name)
    }

    fn tier(&self, tier: Option<CompilationTier>) -> CompilationTier {
        tier.unwrap_or(self.config.default_tier)
    }

    fn query(&self, tier: Option<CompilationTier>) -> StatusQuery {
        StatusQuery::new(self.tier(tier), self.config.tier_match)
    }

    fn trace(&self, op: &str, method: MethodId, detail: Option<String>) {
        if !self.config.verbose {
            return;
        }
        let name = self
            .host
            .method(method)
            .map(|info| info.external_name())
            .unwrap_or_else(|_| method.to_string());
        match detail {
            Some(detail) => info!(">>{}(): method=\"{}\", {}<<", op, name, detail),
            None => info!(">>{}(): method=\"{}\"<<", op, name),
        }
    }

    fn trace_frame(
        &self,
        op: &str,
        thread: &ManagedThread,
        depth: usize,
        detail: impl FnOnce(Bci) -> Option<String>,
    ) {
        if !self.config.verbose {
            return;
        }
        if let Some(frame) = frames::frame_at(thread, depth) {
            self.trace(op, frame.method, detail(frame.bci));
        }
    }

    fn settle<T>(op: &str, result: VmResult<T>, satisfied: impl FnOnce(&T) -> bool) -> bool {
        match result {
            Ok(value) => satisfied(&value),
            Err(err) => {
                warn!("{} failed: {}", op, err);
                false
            }
        }
    }

    fn settle_compile(op: &str, result: VmResult<CompileOutcome>) -> bool {
        Self::settle(op, result, |outcome| {
            if let Some(err) = outcome.error() {
                debug!("{}: {}", op, err);
            }
            outcome.is_satisfied()
        })
    }

    /// Whether the caller's own frame runs in the interpreter
    pub fn try_is_being_interpreted(&self, thread: &ManagedThread) -> VmResult<bool> {
        let _vm = thread.transition(ThreadState::InVm);
        let frame = frames::require_frame_at(thread, 0)?;
        self.trace("IsBeingInterpreted", frame.method, None);
        Ok(frame.is_interpreted_frame())
    }

    /// Boolean form of [`Self::try_is_being_interpreted`]
    pub fn is_being_interpreted(&self, thread: &ManagedThread) -> bool {
        Self::settle("isBeingInterpreted", self.try_is_being_interpreted(thread), |b| *b)
    }

    /// Whether the frame at `depth` has usable compiled code at `tier`
    pub fn try_is_jit_compiled(
        &self,
        thread: &ManagedThread,
        depth: usize,
        tier: Option<CompilationTier>,
    ) -> VmResult<bool> {
        let _vm = thread.transition(ThreadState::InVm);
        let frame = frames::require_frame_at(thread, depth)?;
        self.trace("IsJitCompiled", frame.method, None);

        let query = self.query(tier);
        let found = self
            .host
            .with_code_table(|table| status::resolve_frame(table, &frame, query));
        Ok(found.is_usable())
    }

    /// Boolean form of [`Self::try_is_jit_compiled`]
    pub fn is_jit_compiled(
        &self,
        thread: &ManagedThread,
        depth: usize,
        tier: Option<CompilationTier>,
    ) -> bool {
        Self::settle("isJitCompiled", self.try_is_jit_compiled(thread, depth, tier), |b| *b)
    }

    /// Whether `method` has usable compiled code at `tier`, regardless of
    /// any frame
    pub fn try_is_method_jit_compiled(
        &self,
        method: MethodId,
        tier: Option<CompilationTier>,
    ) -> VmResult<bool> {
        self.host.method(method)?;
        self.trace("IsMethodJitCompiled", method, None);

        let query = self.query(tier);
        let found = self
            .host
            .with_code_table(|table| status::resolve(table, method, query));
        Ok(found.is_usable())
    }

    /// Boolean form of [`Self::try_is_method_jit_compiled`]
    pub fn is_method_jit_compiled(&self, method: MethodId, tier: Option<CompilationTier>) -> bool {
        Self::settle(
            "isMethodJitCompiled",
            self.try_is_method_jit_compiled(method, tier),
            |b| *b,
        )
    }

    /// [`Self::is_method_jit_compiled`] for a method named by holder and name
    pub fn is_method_jit_compiled_by_name(
        &self,
        holder: &str,
        name: &str,
        tier: Option<CompilationTier>,
    ) -> bool {
        let result = self
            .resolve_method(holder, name)
            .and_then(|method| self.try_is_method_jit_compiled(method, tier));
        Self::settle("isMethodJitCompiled", result, |b| *b)
    }

    /// Make sure the frame at `depth` runs, or can enter, compiled code.
    ///
    /// See [`compile::ensure_frame_compiled`]; the request is an OSR compile
    /// at the frame's current offset, which must start a basic block.
    pub fn try_ensure_jit_compiled(
        &self,
        thread: &ManagedThread,
        depth: usize,
        tier: Option<CompilationTier>,
    ) -> VmResult<CompileOutcome> {
        let _vm = thread.transition(ThreadState::InVm);
        self.trace_frame("EnsureJitCompiled", thread, depth, |bci| {
            Some(CompileEntry::Osr(bci).to_string())
        });
        compile::ensure_frame_compiled(
            self.host.as_ref(),
            thread,
            depth,
            self.tier(tier),
            self.config.tier_match,
        )
    }

    /// Boolean form of [`Self::try_ensure_jit_compiled`]
    pub fn ensure_jit_compiled(
        &self,
        thread: &ManagedThread,
        depth: usize,
        tier: Option<CompilationTier>,
    ) -> bool {
        Self::settle_compile(
            "ensureJitCompiled",
            self.try_ensure_jit_compiled(thread, depth, tier),
        )
    }

    /// Make sure `method` has standard compiled code at `tier`.
    ///
    /// Refused while `method` is active anywhere on the calling stack.
    pub fn try_ensure_method_jit_compiled(
        &self,
        thread: &ManagedThread,
        method: MethodId,
        tier: Option<CompilationTier>,
    ) -> VmResult<CompileOutcome> {
        let _vm = thread.transition(ThreadState::InVm);
        self.trace(
            "EnsureMethodJitCompiled",
            method,
            Some(CompileEntry::Standard.to_string()),
        );
        compile::ensure_method_compiled(
            self.host.as_ref(),
            thread,
            method,
            self.tier(tier),
            self.config.tier_match,
        )
    }

    /// Boolean form of [`Self::try_ensure_method_jit_compiled`]
    pub fn ensure_method_jit_compiled(
        &self,
        thread: &ManagedThread,
        method: MethodId,
        tier: Option<CompilationTier>,
    ) -> bool {
        Self::settle_compile(
            "ensureMethodJitCompiled",
            self.try_ensure_method_jit_compiled(thread, method, tier),
        )
    }

    /// [`Self::ensure_method_jit_compiled`] for a method named by holder and
    /// name
    pub fn ensure_method_jit_compiled_by_name(
        &self,
        thread: &ManagedThread,
        holder: &str,
        name: &str,
        tier: Option<CompilationTier>,
    ) -> bool {
        let result = self
            .resolve_method(holder, name)
            .and_then(|method| self.try_ensure_method_jit_compiled(thread, method, tier));
        Self::settle_compile("ensureMethodJitCompiled", result)
    }

    /// Force the caller's own frame back into the interpreter, using the
    /// configured [`crate::DeoptScope`].
    ///
    /// Method scope blocks the caller for a safepoint.
    pub fn try_ensure_deoptimized(&self, thread: &ManagedThread) -> VmResult<DeoptOutcome> {
        let _vm = thread.transition(ThreadState::InVm);
        let scope = self.config.deopt_scope;
        self.trace_frame("EnsureDeoptimized", thread, 0, |_| {
            Some(format!("scope={:?}", scope).to_lowercase())
        });
        deopt::ensure_deoptimized(self.host.as_ref(), thread, 0, scope)
    }

    /// Boolean form of [`Self::try_ensure_deoptimized`]
    pub fn ensure_deoptimized(&self, thread: &ManagedThread) -> bool {
        Self::settle(
            "ensureDeoptimized",
            self.try_ensure_deoptimized(thread),
            DeoptOutcome::is_satisfied,
        )
    }
}
