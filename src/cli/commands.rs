//! CLI command handlers.

use std::path::Path;
use std::process::ExitCode;

use tracing::info;

use crate::config::OrbitConfig;
use crate::error::OrbitResult;
use crate::logging::{init_tracing, InitError};
use crate::orbit::builder::TrajectoryBuilder;
use crate::orbit::params::OrbitParameters;
use crate::orbit::physics::Metric;
use crate::orbit::scenarios::OrbitScenario;
use crate::orbit::table::export_csv;
use crate::orbit::trajectory::OrbitRun;

use super::output::{
    print_help, print_run_summary, print_scenarios, print_validation_result, print_version,
    RunReport,
};
use super::{Args, Command, RunOptions};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run(options) => run_command(&options),
        Command::Scenario { name, options } => scenario_command(&name, &options),
        Command::ListScenarios => {
            print_scenarios();
            ExitCode::SUCCESS
        }
        Command::Validate { config_path } => validate_config(&config_path),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Merge the config file (if any) with the command-line overrides.
///
/// # Errors
///
/// Returns error if the file cannot be loaded or the merged config is invalid.
pub fn resolve_config(options: &RunOptions) -> OrbitResult<OrbitConfig> {
    let base = match &options.config_path {
        Some(path) => OrbitConfig::load(path)?,
        None => OrbitConfig::default(),
    };

    let mut overrides = OrbitConfig::builder();
    if let Some(r0) = options.initial_radius {
        overrides = overrides.initial_radius(r0);
    }
    if let Some(factor) = options.angular_momentum_factor {
        overrides = overrides.angular_momentum_factor(factor);
    }
    if let Some(resolution) = options.time_resolution {
        overrides = overrides.time_resolution(resolution);
    }
    if let Some(steps) = options.max_steps {
        overrides = overrides.max_steps(steps);
    }
    if options.newtonian {
        overrides = overrides.metric(Metric::Newtonian);
    }
    if options.periods {
        overrides = overrides.period_detection(true);
    }
    if options.verbose {
        overrides = overrides.log_level("debug");
    }

    let config = overrides.apply(base);
    config.check()?;
    Ok(config)
}

/// Integrate `params` with the guard and detector settings of `config`.
#[must_use]
pub fn execute(config: &OrbitConfig, params: &OrbitParameters) -> OrbitRun {
    let mut builder = TrajectoryBuilder::new(params).jidoka(config.jidoka.clone());
    if let Some(period) = config.period_detection() {
        builder = builder.period_detection(period);
    }
    builder.run()
}

fn init_logging(level: &str) {
    match init_tracing(level) {
        Ok(()) | Err(InitError::AlreadyInitialised) => {}
        Err(e) => eprintln!("Warning: {e}"),
    }
}

fn report(run: &OrbitRun, options: &RunOptions) -> OrbitResult<()> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(&RunReport::from_run(run))?);
    } else {
        print_run_summary(run, options.verbose);
    }

    if let Some(dir) = &options.csv_dir {
        let (trajectory, precession) = export_csv(run, dir)?;
        info!(trajectory = %trajectory.display(), precession = %precession.display(), "wrote CSV tables");
        if !options.json {
            println!("\nWrote {}", trajectory.display());
            println!("Wrote {}", precession.display());
        }
    }

    Ok(())
}

fn finish(result: OrbitResult<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Run the `run` command and return the produced run.
///
/// # Errors
///
/// Returns error if the configuration is invalid.
pub fn run_with_options(options: &RunOptions) -> OrbitResult<OrbitRun> {
    let config = resolve_config(options)?;
    init_logging(&config.logging.level);
    let params = config.to_parameters()?;
    Ok(execute(&config, &params))
}

/// Integrate an orbit from a config file and/or flags.
#[must_use]
pub fn run_command(options: &RunOptions) -> ExitCode {
    finish(run_with_options(options).and_then(|run| report(&run, options)))
}

/// Orbit flags a preset overrides, in command-line spelling.
#[must_use]
pub fn ignored_scenario_flags(options: &RunOptions) -> Vec<&'static str> {
    [
        ("--config", options.config_path.is_some()),
        ("--r0", options.initial_radius.is_some()),
        ("--l-factor", options.angular_momentum_factor.is_some()),
        ("--resolution", options.time_resolution.is_some()),
        ("--steps", options.max_steps.is_some()),
        ("--newtonian", options.newtonian),
    ]
    .into_iter()
    .filter_map(|(flag, set)| set.then_some(flag))
    .collect()
}

/// Run a named preset and return the produced run.
///
/// Orbit flags are reported on stderr and ignored.
///
/// # Errors
///
/// Returns error for an unknown name or invalid output options.
pub fn run_scenario(name: &str, options: &RunOptions) -> OrbitResult<OrbitRun> {
    let scenario = OrbitScenario::from_name(name)?;
    for flag in ignored_scenario_flags(options) {
        eprintln!("Ignoring {flag}: scenario '{name}' fixes the orbit");
    }
    let config = resolve_config(&RunOptions {
        config_path: None,
        initial_radius: None,
        angular_momentum_factor: None,
        time_resolution: None,
        max_steps: None,
        newtonian: false,
        ..options.clone()
    })?;
    init_logging(&config.logging.level);
    let params = scenario.parameters()?;
    Ok(execute(&config, &params))
}

/// Integrate a named preset.
#[must_use]
pub fn scenario_command(name: &str, options: &RunOptions) -> ExitCode {
    finish(run_scenario(name, options).and_then(|run| report(&run, options)))
}

/// Validate a YAML config file.
#[must_use]
pub fn validate_config(path: &Path) -> ExitCode {
    let result = OrbitConfig::load(path)
        .and_then(|config| config.to_parameters().map(|_| ()))
        .map_err(|e| e.to_string());

    print_validation_result(&path.display().to_string(), &result);

    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
