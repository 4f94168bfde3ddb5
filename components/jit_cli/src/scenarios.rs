//! Canned diagnostic scenarios
//!
//! Each scenario builds a fresh runtime, plays a managed call sequence on
//! one thread and records every control operation with its result. A result
//! differing from the expected one aborts the scenario.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use core_types::MethodId;
use jit_compiler::{CompileMode, JitRuntime};
use jit_control::{registry, JitControl};
use log::debug;
use vm_core::{ManagedThread, MethodDef};

use crate::cli::Scenario;
use crate::error::{CliError, CliResult};
use crate::settings::Settings;

const HOLDER: &str = "jitctl.Scenario";
const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// One recorded operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Scenario the step belongs to
    pub scenario: &'static str,
    /// Operation and its target
    pub operation: String,
    /// Reported result
    pub result: bool,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} = {}", self.scenario, self.operation, self.result)
    }
}

/// Every step of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Steps in execution order
    pub steps: Vec<Step>,
}

struct Session<'r> {
    scenario: &'static str,
    runtime: Arc<JitRuntime>,
    control: JitControl,
    thread: Arc<ManagedThread>,
    report: &'r mut Report,
}

impl<'r> Session<'r> {
    fn new(scenario: Scenario, settings: &Settings, report: &'r mut Report) -> CliResult<Self> {
        let runtime = Arc::new(JitRuntime::new(settings.jit.clone()));
        let control = JitControl::new(Arc::clone(&runtime), settings.control.clone())?;
        let thread = runtime.vm().attach_thread("main");
        Ok(Self {
            scenario: scenario.name(),
            runtime,
            control,
            thread,
            report,
        })
    }

    fn define(&self, def: MethodDef) -> MethodId {
        self.runtime.vm().define_method(def)
    }

    fn name(&self, method: MethodId) -> String {
        self.runtime
            .vm()
            .method(method)
            .map(|info| info.external_name())
            .unwrap_or_else(|| method.to_string())
    }

    fn background(&self) -> bool {
        self.runtime.config().mode == CompileMode::Background
    }

    fn check(&mut self, operation: String, actual: bool, expected: bool) -> CliResult<()> {
        self.report.steps.push(Step {
            scenario: self.scenario,
            operation: operation.clone(),
            result: actual,
        });
        if actual != expected {
            return Err(CliError::Mismatch {
                scenario: self.scenario,
                step: operation,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Like `check`, but polls under a background compiler
    fn check_eventually(
        &mut self,
        operation: String,
        expected: bool,
        mut probe: impl FnMut(&Self) -> bool,
    ) -> CliResult<()> {
        let mut actual = probe(self);
        if self.background() {
            let deadline = Instant::now() + POLL_TIMEOUT;
            while actual != expected && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
                actual = probe(self);
            }
        }
        self.check(operation, actual, expected)
    }
}

fn compile_method(s: &mut Session<'_>) -> CliResult<()> {
    let main = s.define(MethodDef::new(HOLDER, "main"));
    let foo = s.define(MethodDef::new(HOLDER, "foo"));
    let name = s.name(foo);
    s.runtime.invoke(&s.thread, main)?;

    let compiled = s.control.is_method_jit_compiled(foo, None);
    s.check(format!("isMethodJitCompiled({})", name), compiled, false)?;
    let ensured = s.control.ensure_method_jit_compiled(&s.thread, foo, None);
    s.check(format!("ensureMethodJitCompiled({})", name), ensured, true)?;
    s.check_eventually(format!("isMethodJitCompiled({})", name), true, |s| {
        s.control.is_method_jit_compiled(foo, None)
    })
}

fn self_recompile(s: &mut Session<'_>) -> CliResult<()> {
    let bar = s.define(MethodDef::new(HOLDER, "bar"));
    let name = s.name(bar);
    s.runtime.invoke(&s.thread, bar)?;
    s.runtime.invoke(&s.thread, bar)?;

    let ensured = s.control.ensure_method_jit_compiled(&s.thread, bar, None);
    s.check(format!("ensureMethodJitCompiled({})", name), ensured, false)?;
    let compiled = s.control.is_method_jit_compiled(bar, None);
    s.check(format!("isMethodJitCompiled({})", name), compiled, false)
}

fn osr(s: &mut Session<'_>) -> CliResult<()> {
    const HEADER: u32 = 8;
    let looping = s.define(
        MethodDef::new(HOLDER, "loop")
            .code_length(24)
            .block_starts([HEADER]),
    );
    s.runtime.invoke(&s.thread, looping)?;
    s.thread.set_bci(HEADER)?;

    let interpreted = s.control.is_being_interpreted(&s.thread);
    s.check("isBeingInterpreted()".to_string(), interpreted, true)?;
    let ensured = s.control.ensure_jit_compiled(&s.thread, 0, None);
    s.check(format!("ensureJitCompiled(0) at bci {}", HEADER), ensured, true)?;
    s.check_eventually("isJitCompiled(0)".to_string(), true, |s| {
        s.control.is_jit_compiled(&s.thread, 0, None)
    })?;

    let migrated = s.runtime.backedge(&s.thread, HEADER)?;
    debug!("back edge at bci {} migrated: {}", HEADER, migrated);
    let interpreted = s.control.is_being_interpreted(&s.thread);
    s.check("isBeingInterpreted()".to_string(), interpreted, false)
}

fn deoptimize(s: &mut Session<'_>) -> CliResult<()> {
    let main = s.define(MethodDef::new(HOLDER, "main"));
    let hot = s.define(MethodDef::new(HOLDER, "hot"));
    let name = s.name(hot);
    s.runtime.invoke(&s.thread, main)?;

    let ensured = s.control.ensure_method_jit_compiled(&s.thread, hot, None);
    s.check(format!("ensureMethodJitCompiled({})", name), ensured, true)?;
    s.check_eventually(format!("isMethodJitCompiled({})", name), true, |s| {
        s.control.is_method_jit_compiled(hot, None)
    })?;

    s.runtime.invoke(&s.thread, hot)?;
    let interpreted = s.control.is_being_interpreted(&s.thread);
    s.check("isBeingInterpreted()".to_string(), interpreted, false)?;
    let deoptimized = s.control.ensure_deoptimized(&s.thread);
    s.check("ensureDeoptimized()".to_string(), deoptimized, true)?;
    let interpreted = s.control.is_being_interpreted(&s.thread);
    s.check("isBeingInterpreted()".to_string(), interpreted, true)
}

fn run_one(scenario: Scenario, settings: &Settings, report: &mut Report) -> CliResult<()> {
    debug!("running scenario {}", scenario.name());
    let mut session = Session::new(scenario, settings, report)?;
    match scenario {
        Scenario::CompileMethod => compile_method(&mut session),
        Scenario::SelfRecompile => self_recompile(&mut session),
        Scenario::Osr => osr(&mut session),
        Scenario::Deoptimize => deoptimize(&mut session),
        Scenario::All => Ok(()),
    }
}

/// Run `scenario` (or every scenario for [`Scenario::All`]).
///
/// Enables the diagnostic facility for the process.
pub fn run(scenario: Scenario, settings: &Settings) -> CliResult<Report> {
    registry::set_used();
    let mut report = Report::default();
    let selected: &[Scenario] = match scenario {
        Scenario::All => &Scenario::EACH,
        _ => std::slice::from_ref(&scenario),
    };
    for &each in selected {
        run_one(each, settings, &mut report)?;
    }
    Ok(report)
}
