//! CLI module for schwarzschild.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! The entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, RunOptions};
pub use commands::{
    execute, ignored_scenario_flags, resolve_config, run_cli, run_command, run_scenario, run_with_options,
    scenario_command, validate_config,
};
pub use output::{
    format_run_summary, print_help, print_run_summary, print_scenarios, print_validation_result,
    print_version, RunReport,
};
