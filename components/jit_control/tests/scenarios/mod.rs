//! Scenario tests for diagnostic JIT control
//!
//! Each module drives a [`jit_compiler::JitRuntime`] through a managed
//! call sequence and checks what the control layer reports.

mod common;

mod test_background;
mod test_concurrency;
mod test_deoptimization;
mod test_frames;
mod test_idempotence;
mod test_round_trip;
mod test_self_recompile;
