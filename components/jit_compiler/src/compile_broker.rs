//! Compile broker
//!
//! Front door for compile requests. In synchronous mode the requesting
//! thread compiles and installs the code itself. In background mode the
//! request is queued for a compiler thread and the caller only learns that
//! the request was accepted.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Sender, TrySendError};
use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use core_types::{CodeId, CompilationTier, CompileEntry, ErrorKind, MethodId, VmError, VmResult};
use vm_core::MethodInfo;

use crate::code_cache::CodeCache;
use crate::compiler::{Compiler, CompilerStats};
use crate::config::{CompileMode, JitConfig};

/// Outcome of a compile request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileResult {
    /// Compiled and installed before returning
    Installed(CodeId),
    /// Accepted for background compilation
    Queued,
    /// Refused or failed
    Rejected(String),
}

impl CompileResult {
    /// Whether the host accepted the request
    pub fn accepted(&self) -> bool {
        !matches!(self, CompileResult::Rejected(_))
    }
}

type TaskKey = (MethodId, CompilationTier, CompileEntry);

struct CompileTask {
    method: Arc<MethodInfo>,
    tier: CompilationTier,
    entry: CompileEntry,
}

impl CompileTask {
    fn key(&self) -> TaskKey {
        (self.method.id, self.tier, self.entry)
    }
}

struct Shared {
    cache: Arc<CodeCache>,
    compiler: Compiler,
    stats: Mutex<CompilerStats>,
    in_flight: Mutex<HashSet<TaskKey>>,
    idle: Condvar,
}

impl Shared {
    fn run(&self, task: &CompileTask) -> CompileResult {
        match self.compiler.compile(&task.method, task.tier, task.entry) {
            Ok(blob) => {
                let size = blob.code_size;
                let id = self.cache.lock().install(blob);

                let mut stats = self.stats.lock();
                if task.entry.is_osr() {
                    stats.osr_compilations += 1;
                } else {
                    stats.functions_compiled += 1;
                }
                stats.total_code_size += size;
                CompileResult::Installed(id)
            }
            Err(err) => {
                warn!("compilation of {} failed: {}", task.method.external_name(), err);
                self.stats.lock().rejected += 1;
                CompileResult::Rejected(err.message)
            }
        }
    }

    fn finish(&self, key: &TaskKey) {
        let mut in_flight = self.in_flight.lock();
        in_flight.remove(key);
        if in_flight.is_empty() {
            self.idle.notify_all();
        }
    }
}

/// Broker between compile requests and the compiler
pub struct CompileBroker {
    config: JitConfig,
    shared: Arc<Shared>,
    queue: Option<Sender<CompileTask>>,
    worker: Option<JoinHandle<()>>,
}

impl CompileBroker {
    /// Create a broker installing into `cache`.
    ///
    /// Background mode spawns the compiler thread immediately.
    pub fn new(config: JitConfig, cache: Arc<CodeCache>) -> Self {
        let shared = Arc::new(Shared {
            cache,
            compiler: Compiler::new(config.osr_requires_block_start),
            stats: Mutex::new(CompilerStats::default()),
            in_flight: Mutex::new(HashSet::new()),
            idle: Condvar::new(),
        });

        let (queue, worker) = match config.mode {
            CompileMode::Synchronous => (None, None),
            CompileMode::Background => {
                let (sender, receiver) = channel::bounded::<CompileTask>(config.queue_capacity);
                let worker_shared = Arc::clone(&shared);
                let handle = thread::Builder::new()
                    .name("jit-compiler".to_string())
                    .spawn(move || {
                        debug!("background compiler started");
                        for task in receiver.iter() {
                            worker_shared.run(&task);
                            worker_shared.finish(&task.key());
                        }
                        debug!("background compiler stopped");
                    })
                    .ok();
                if handle.is_none() {
                    warn!("could not spawn compiler thread, compiling synchronously");
                    (None, None)
                } else {
                    (Some(sender), handle)
                }
            }
        };

        Self {
            config,
            shared,
            queue,
            worker,
        }
    }

    /// Compilation policy
    pub fn config(&self) -> &JitConfig {
        &self.config
    }

    /// Whether `tier` is compiled by this host
    pub fn supports_tier(&self, tier: CompilationTier) -> bool {
        self.config.supports(tier)
    }

    /// Request compilation of `method` at `tier` for `entry`.
    ///
    /// Fails with `UnsupportedTier` when the policy does not compile at
    /// `tier`. Identical requests already queued are not queued twice.
    pub fn compile_method(
        &self,
        method: Arc<MethodInfo>,
        tier: CompilationTier,
        entry: CompileEntry,
    ) -> VmResult<CompileResult> {
        if !self.supports_tier(tier) {
            return Err(VmError::new(
                ErrorKind::UnsupportedTier,
                format!("{} is not enabled by the compilation policy", tier),
            ));
        }

        let task = CompileTask {
            method,
            tier,
            entry,
        };
        debug!(
            "compile request: {} at {} ({})",
            task.method.external_name(),
            tier,
            entry
        );

        let Some(queue) = &self.queue else {
            return Ok(self.shared.run(&task));
        };

        let key = task.key();
        if !self.shared.in_flight.lock().insert(key) {
            return Ok(CompileResult::Queued);
        }
        match queue.try_send(task) {
            Ok(()) => Ok(CompileResult::Queued),
            Err(TrySendError::Full(_)) => {
                self.shared.finish(&key);
                self.shared.stats.lock().rejected += 1;
                Ok(CompileResult::Rejected("compile queue is full".to_string()))
            }
            Err(TrySendError::Disconnected(_)) => {
                self.shared.finish(&key);
                Ok(CompileResult::Rejected("compiler thread is gone".to_string()))
            }
        }
    }

    /// Number of queued or running background compilations
    pub fn pending(&self) -> usize {
        self.shared.in_flight.lock().len()
    }

    /// Block until no background compilation is pending or `timeout` passes.
    ///
    /// Returns whether the broker became idle.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut in_flight = self.shared.in_flight.lock();
        while !in_flight.is_empty() {
            if self
                .shared
                .idle
                .wait_until(&mut in_flight, deadline)
                .timed_out()
            {
                return in_flight.is_empty();
            }
        }
        true
    }

    /// Compilation statistics
    pub fn stats(&self) -> CompilerStats {
        self.shared.stats.lock().clone()
    }

    /// Reset compilation statistics
    pub fn reset_stats(&self) {
        *self.shared.stats.lock() = CompilerStats::default();
    }
}

impl std::fmt::Debug for CompileBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileBroker")
            .field("config", &self.config)
            .field("pending", &self.pending())
            .finish()
    }
}

impl Drop for CompileBroker {
    fn drop(&mut self) {
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
