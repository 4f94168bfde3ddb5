//! Facility registration
//!
//! The diagnostic entry points are only handed out once the facility has
//! been enabled. The flag is set once at startup, before any thread asks
//! for the entry points, and never cleared.

use std::sync::atomic::{AtomicBool, Ordering};

use core_types::{VmError, VmResult};

static USED: AtomicBool = AtomicBool::new(false);

/// Enable the diagnostic facility for this process
pub fn set_used() {
    USED.store(true, Ordering::Release);
}

/// Whether the diagnostic facility was enabled
pub fn is_used() -> bool {
    USED.load(Ordering::Acquire)
}

/// A diagnostic operation as exposed to managed code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    /// Name on the managed façade
    pub name: &'static str,
    /// Managed descriptor
    pub signature: &'static str,
}

const fn entry(name: &'static str, signature: &'static str) -> EntryPoint {
    EntryPoint { name, signature }
}

/// Every diagnostic operation
pub const ENTRY_POINTS: [EntryPoint; 6] = [
    entry("isBeingInterpreted", "()Z"),
    entry("isJitCompiled0", "(II)Z"),
    entry("isMethodJitCompiled0", "(Ljava/lang/reflect/Method;I)Z"),
    entry("ensureJitCompiled0", "(II)Z"),
    entry("ensureMethodJitCompiled0", "(Ljava/lang/reflect/Method;I)Z"),
    entry("ensureDeoptimized", "()Z"),
];

/// Hand out the entry points, or `InvalidState` if the facility is disabled
pub fn register() -> VmResult<&'static [EntryPoint]> {
    if !is_used() {
        return Err(VmError::invalid_state(
            "diagnostic JIT control is not enabled",
        ));
    }
    Ok(&ENTRY_POINTS)
}

/// Look up an entry point by managed name
pub fn entry_point(name: &str) -> Option<&'static EntryPoint> {
    ENTRY_POINTS.iter().find(|ep| ep.name == name)
}
