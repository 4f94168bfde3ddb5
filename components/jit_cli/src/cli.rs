//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Canned diagnostic scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Compile a method that is not on the stack
    CompileMethod,
    /// A running method asks for its own compilation
    SelfRecompile,
    /// OSR-compile an interpreted loop and migrate into it
    Osr,
    /// Deoptimize a compiled caller
    Deoptimize,
    /// Every scenario in turn
    All,
}

impl Scenario {
    /// Scenarios `All` expands to
    pub const EACH: [Scenario; 4] = [
        Scenario::CompileMethod,
        Scenario::SelfRecompile,
        Scenario::Osr,
        Scenario::Deoptimize,
    ];

    /// Name as printed in reports
    pub fn name(self) -> &'static str {
        match self {
            Scenario::CompileMethod => "compile-method",
            Scenario::SelfRecompile => "self-recompile",
            Scenario::Osr => "osr",
            Scenario::Deoptimize => "deoptimize",
            Scenario::All => "all",
        }
    }
}

/// jitctl: exercise diagnostic JIT control against a simulated runtime
#[derive(Parser, Debug)]
#[command(name = "jitctl")]
#[command(version = "0.1.0")]
#[command(about = "Query and force JIT compilation state of managed frames", long_about = None)]
pub struct Cli {
    /// Scenario to run
    #[arg(value_enum, default_value_t = Scenario::All)]
    pub scenario: Scenario,

    /// JSON settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Trace every control operation
    #[arg(short, long)]
    pub verbose: bool,

    /// Compile on a background thread
    #[arg(short, long)]
    pub background: bool,
}
