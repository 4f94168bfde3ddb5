//! The host runtime as seen by the control layer

use std::sync::Arc;

use core_types::{CompilationTier, CompileEntry, MethodId, VmError, VmResult};
use jit_compiler::{CodeTable, CompileResult, JitRuntime};
use vm_core::{ManagedThread, MethodInfo};

/// Narrow entry points into the host's method table, code cache, compiler
/// and deoptimizer.
///
/// Implementations must run [`CompilationHost::with_code_table`] inside the
/// same critical section that guards artifact install and invalidation, and
/// must not call back into the control layer from it.
pub trait CompilationHost: Send + Sync {
    /// Look up a registered method
    fn method(&self, id: MethodId) -> VmResult<Arc<MethodInfo>>;

    /// Resolve `holder.name` to a method identity
    fn resolve_method(&self, holder: &str, name: &str) -> VmResult<MethodId>;

    /// Whether the compilation policy compiles at `tier`
    fn supports_tier(&self, tier: CompilationTier) -> bool;

    /// Run `f` inside the code-cache critical section
    fn with_code_table<R>(&self, f: impl FnOnce(&mut CodeTable) -> R) -> R;

    /// Submit a compile request.
    ///
    /// `Ok` means the host accepted it; the artifact may be installed later.
    /// A refused or failed request is `HostRequestFailed`.
    fn request_compile(
        &self,
        method: MethodId,
        tier: CompilationTier,
        entry: CompileEntry,
    ) -> VmResult<()>;

    /// Deoptimize every activation of marked code at a safepoint.
    ///
    /// Blocks the caller. Returns the number of artifacts retired.
    fn deoptimize_marked(&self) -> usize;

    /// Rewrite the logical frame at `depth` of the calling thread into
    /// interpreter frames. Returns `false` if it was already interpreted.
    fn deoptimize_frame(&self, thread: &ManagedThread, depth: usize) -> VmResult<bool>;
}

impl CompilationHost for JitRuntime {
    fn method(&self, id: MethodId) -> VmResult<Arc<MethodInfo>> {
        self.vm().methods().require(id)
    }

    fn resolve_method(&self, holder: &str, name: &str) -> VmResult<MethodId> {
        self.vm().methods().resolve(holder, name)
    }

    fn supports_tier(&self, tier: CompilationTier) -> bool {
        self.broker().supports_tier(tier)
    }

    fn with_code_table<R>(&self, f: impl FnOnce(&mut CodeTable) -> R) -> R {
        f(&mut self.code_cache().lock())
    }

    fn request_compile(
        &self,
        method: MethodId,
        tier: CompilationTier,
        entry: CompileEntry,
    ) -> VmResult<()> {
        match self.compile(method, tier, entry)? {
            CompileResult::Installed(_) | CompileResult::Queued => Ok(()),
            CompileResult::Rejected(reason) => Err(VmError::host_failed(reason)),
        }
    }

    fn deoptimize_marked(&self) -> usize {
        JitRuntime::deoptimize_marked(self)
    }

    fn deoptimize_frame(&self, thread: &ManagedThread, depth: usize) -> VmResult<bool> {
        JitRuntime::deoptimize_frame(self, thread, depth)
    }
}
