//! schwarzschild CLI - relativistic orbit integrator
//!
//! Thin wrapper over [`schwarzschild::cli`].

use std::process::ExitCode;

use schwarzschild::cli::{run_cli, Args};

fn main() -> ExitCode {
    run_cli(Args::parse())
}
