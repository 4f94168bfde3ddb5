//! jitctl
//!
//! Entry point for the diagnostic JIT control tool. Parses CLI arguments,
//! loads settings and runs the requested scenario.

use clap::Parser;
use jit_cli::{run, Cli, CliError, Settings};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error: could not load '{}': {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => Settings::default(),
    };
    let settings = settings.with_overrides(cli.verbose, cli.background);

    match run(cli.scenario, &settings) {
        Ok(report) => {
            for step in &report.steps {
                println!("{}", step);
            }
            println!("{} steps, all as expected", report.steps.len());
        }
        Err(e @ CliError::Mismatch { .. }) => {
            eprintln!("FAILED: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
