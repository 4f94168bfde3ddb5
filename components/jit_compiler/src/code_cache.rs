//! Code cache
//!
//! Every read or write of artifact state goes through [`CodeCache::lock`].
//! Holding the guard is the code-cache critical section: installs,
//! invalidations and status lookups for a method never interleave.

use std::collections::{HashMap, HashSet};

use core_types::{Bci, CodeId, CompilationTier, CompileEntry, MethodId};
use log::{debug, trace};
use parking_lot::{Mutex, MutexGuard};

use crate::compiled_code::{CodeState, CompiledCode};
use crate::compiler::CodeBlob;

/// Artifact table guarded by the code cache lock
#[derive(Debug, Default)]
pub struct CodeTable {
    artifacts: HashMap<CodeId, CompiledCode>,
    standard: HashMap<MethodId, CodeId>,
    osr: HashMap<MethodId, Vec<CodeId>>,
    next_id: u64,
}

impl CodeTable {
    /// Look up an artifact by id
    pub fn get(&self, id: CodeId) -> Option<&CompiledCode> {
        self.artifacts.get(&id)
    }

    /// Current standard artifact of `method`
    pub fn code(&self, method: MethodId) -> Option<&CompiledCode> {
        self.standard.get(&method).and_then(|id| self.artifacts.get(id))
    }

    /// OSR artifacts registered for `method`
    pub fn osr_codes(&self, method: MethodId) -> impl Iterator<Item = &CompiledCode> + '_ {
        self.osr
            .get(&method)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.artifacts.get(id))
    }

    /// Find an OSR artifact of `method`.
    ///
    /// `bci = None` matches any entry offset. With `match_level` the tier
    /// must equal `min_tier`; otherwise the highest alive tier at or above
    /// `min_tier` wins (`None` means no lower bound).
    pub fn lookup_osr(
        &self,
        method: MethodId,
        bci: Option<Bci>,
        min_tier: Option<CompilationTier>,
        match_level: bool,
    ) -> Option<&CompiledCode> {
        let candidates = self
            .osr_codes(method)
            .filter(|code| code.is_alive())
            .filter(|code| bci.map_or(true, |bci| code.osr_entry_bci() == Some(bci)));

        if match_level {
            let tier = min_tier?;
            return candidates.filter(|code| code.tier == tier).last();
        }
        candidates
            .filter(|code| min_tier.map_or(true, |min| code.tier >= min))
            .max_by_key(|code| code.tier)
    }

    /// Install a freshly compiled artifact.
    ///
    /// A new standard artifact replaces the method's previous one, which
    /// becomes not entrant. An OSR artifact replaces an existing one at the
    /// same offset and tier.
    pub fn install(&mut self, blob: CodeBlob) -> CodeId {
        let id = CodeId(self.next_id);
        self.next_id += 1;

        match blob.entry {
            CompileEntry::Standard => {
                if let Some(previous) = self.standard.insert(blob.method, id) {
                    if let Some(old) = self.artifacts.get_mut(&previous) {
                        old.make_not_entrant();
                    }
                }
            }
            CompileEntry::Osr(bci) => {
                let list = self.osr.entry(blob.method).or_default();
                let artifacts = &mut self.artifacts;
                list.retain(|existing| match artifacts.get_mut(existing) {
                    Some(old) if old.osr_entry_bci() == Some(bci) && old.tier == blob.tier => {
                        old.make_not_entrant();
                        false
                    }
                    _ => true,
                });
                list.push(id);
            }
        }

        debug!(
            "installed {} for {} at {} ({})",
            id, blob.method, blob.tier, blob.entry
        );
        self.artifacts.insert(
            id,
            CompiledCode {
                id,
                method: blob.method,
                tier: blob.tier,
                entry: blob.entry,
                inlined: blob.inlined,
                code_size: blob.code_size,
                state: CodeState::InUse,
                marked_for_deoptimization: false,
            },
        );
        id
    }

    /// Mark one artifact; returns whether it was newly marked
    pub fn mark_for_deoptimization(&mut self, id: CodeId) -> bool {
        let marked = self
            .artifacts
            .get_mut(&id)
            .map_or(false, |code| code.mark_for_deoptimization());
        if marked {
            trace!("marked {} for deoptimization", id);
        }
        marked
    }

    /// Mark every OSR artifact of `method`; returns how many were newly marked
    pub fn mark_osr_for_deoptimization(&mut self, method: MethodId) -> usize {
        let ids: Vec<CodeId> = self.osr.get(&method).cloned().unwrap_or_default();
        ids.into_iter()
            .filter(|id| self.mark_for_deoptimization(*id))
            .count()
    }

    /// Mark artifacts of other methods that inlined `method`
    pub fn mark_dependents(&mut self, method: MethodId) -> usize {
        let ids: Vec<CodeId> = self
            .artifacts
            .values()
            .filter(|code| code.method != method && code.is_in_use() && code.inlines(method))
            .map(|code| code.id)
            .collect();
        ids.into_iter()
            .filter(|id| self.mark_for_deoptimization(*id))
            .count()
    }

    /// Whether `id` is marked for deoptimization
    pub fn is_marked(&self, id: CodeId) -> bool {
        self.artifacts
            .get(&id)
            .map_or(false, CompiledCode::is_marked_for_deoptimization)
    }

    /// Make every marked artifact not entrant and detach it from its method.
    ///
    /// Returns the number of artifacts affected.
    pub fn make_marked_not_entrant(&mut self) -> usize {
        let marked: Vec<(CodeId, MethodId)> = self
            .artifacts
            .values_mut()
            .filter(|code| code.marked_for_deoptimization)
            .filter_map(|code| code.make_not_entrant().then_some((code.id, code.method)))
            .collect();

        for (id, method) in &marked {
            if self.standard.get(method) == Some(id) {
                self.standard.remove(method);
            }
            if let Some(list) = self.osr.get_mut(method) {
                list.retain(|existing| existing != id);
            }
        }
        marked.len()
    }

    /// Turn not-entrant artifacts no frame runs into zombies
    pub fn sweep(&mut self, running: &HashSet<CodeId>) -> usize {
        let mut swept = 0;
        for code in self.artifacts.values_mut() {
            if code.state == CodeState::NotEntrant && !running.contains(&code.id) {
                code.state = CodeState::Zombie;
                swept += 1;
            }
        }
        swept
    }

    /// Number of artifacts ever installed and not yet dropped
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether no artifact was installed
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Lock-protected code cache shared by compiler threads and the VM
#[derive(Debug, Default)]
pub struct CodeCache {
    table: Mutex<CodeTable>,
}

impl CodeCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the code-cache critical section
    pub fn lock(&self) -> MutexGuard<'_, CodeTable> {
        self.table.lock()
    }
}
