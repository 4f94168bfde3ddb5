//! Compilation driver
//!
//! Decides whether a compile request is needed, unsafe, or already
//! satisfied, and issues it through the host. The decision is advisory:
//! two threads racing on the same method may both request compilation,
//! and the host collapses duplicates.

use core_types::{CodeId, CompilationTier, CompileEntry, ErrorKind, MethodId, VmError, VmResult};
use log::debug;
use vm_core::ManagedThread;

use crate::config::TierMatch;
use crate::frames;
use crate::host::CompilationHost;
use crate::status::{self, StatusQuery};

/// Result of an ensure-compiled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Usable code at the requested tier already exists
    AlreadyCompiledAtTier(CodeId),
    /// The frame already runs compiled code, whatever its tier
    AlreadyCompiledAnyTier(CodeId),
    /// The method is active on the calling stack; nothing was requested
    UnsafeToCompile,
    /// The host accepted a compile request
    CompileRequested(CompileEntry),
    /// The host refused or failed the request
    CompileRequestFailed(String),
}

impl CompileOutcome {
    /// Whether the target state holds or was accepted by the host
    pub fn is_satisfied(&self) -> bool {
        matches!(
            self,
            CompileOutcome::AlreadyCompiledAtTier(_)
                | CompileOutcome::AlreadyCompiledAnyTier(_)
                | CompileOutcome::CompileRequested(_)
        )
    }

    /// The refusal or failure as an error, if the request did not succeed
    pub fn error(&self) -> Option<VmError> {
        match self {
            CompileOutcome::UnsafeToCompile => Some(VmError::new(
                ErrorKind::UnsafeOperation,
                "method is active on the calling stack",
            )),
            CompileOutcome::CompileRequestFailed(reason) => Some(VmError::host_failed(reason.clone())),
            _ => None,
        }
    }

    /// Whether a new request went to the host
    pub fn issued_request(&self) -> bool {
        matches!(
            self,
            CompileOutcome::CompileRequested(_) | CompileOutcome::CompileRequestFailed(_)
        )
    }
}

fn check_tier<H: CompilationHost>(host: &H, tier: CompilationTier) -> VmResult<()> {
    if host.supports_tier(tier) {
        return Ok(());
    }
    Err(VmError::new(
        ErrorKind::UnsupportedTier,
        format!("{} is not supported by the host", tier),
    ))
}

fn request<H: CompilationHost>(
    host: &H,
    method: MethodId,
    tier: CompilationTier,
    entry: CompileEntry,
) -> VmResult<CompileOutcome> {
    match host.request_compile(method, tier, entry) {
        Ok(()) => Ok(CompileOutcome::CompileRequested(entry)),
        Err(err) if err.kind == ErrorKind::HostRequestFailed => {
            debug!("compile request for {} failed: {}", method, err.message);
            Ok(CompileOutcome::CompileRequestFailed(err.message))
        }
        Err(err) => Err(err),
    }
}

/// Make sure `method` has usable standard or OSR code at `tier`.
///
/// Refuses when `method` has any activation on `thread`'s stack, since the
/// new code could race that activation against invalidation.
pub fn ensure_method_compiled<H: CompilationHost>(
    host: &H,
    thread: &ManagedThread,
    method: MethodId,
    tier: CompilationTier,
    tier_match: TierMatch,
) -> VmResult<CompileOutcome> {
    host.method(method)?;
    check_tier(host, tier)?;

    let query = StatusQuery::new(tier, tier_match);
    let found = host.with_code_table(|table| status::resolve(table, method, query));
    if let Some(code) = found.usable_code() {
        return Ok(CompileOutcome::AlreadyCompiledAtTier(code));
    }

    if frames::is_on_stack(thread, method) {
        debug!("{} is active on {}, not compiling", method, thread.id());
        return Ok(CompileOutcome::UnsafeToCompile);
    }

    request(host, method, tier, CompileEntry::Standard)
}

/// Make sure the frame at `depth` can run compiled code at `tier`.
///
/// A frame already running compiled code is left alone. An interpreted
/// frame gets an OSR request at its current bytecode offset unless the
/// method already has usable OSR code at `tier`. The request is only
/// reliable when the offset starts a basic block (a loop header or branch
/// target); the host may reject any other offset. The frame keeps
/// interpreting until it next takes a back edge at that offset.
pub fn ensure_frame_compiled<H: CompilationHost>(
    host: &H,
    thread: &ManagedThread,
    depth: usize,
    tier: CompilationTier,
    tier_match: TierMatch,
) -> VmResult<CompileOutcome> {
    check_tier(host, tier)?;
    let frame = frames::require_frame_at(thread, depth)?;

    if let Some(code) = frame.code() {
        return Ok(CompileOutcome::AlreadyCompiledAnyTier(code));
    }

    let query = StatusQuery::new(tier, tier_match).osr_only();
    let found = host.with_code_table(|table| status::resolve(table, frame.method, query));
    if let Some(code) = found.usable_code() {
        return Ok(CompileOutcome::AlreadyCompiledAtTier(code));
    }

    request(host, frame.method, tier, CompileEntry::Osr(frame.bci))
}
