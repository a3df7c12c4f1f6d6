//! CLI argument parsing.
//!
//! Hand-rolled over an iterator of strings so the parser is testable
//! without touching `std::env::args()`.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Integrate an orbit from a config file and/or flags.
    Run(RunOptions),
    /// Integrate a named preset.
    Scenario {
        /// Preset name.
        name: String,
        /// Output options (orbit overrides are ignored).
        options: RunOptions,
    },
    /// List the presets.
    ListScenarios,
    /// Validate a YAML config file.
    Validate {
        /// Path to the config file.
        config_path: PathBuf,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Options shared by `run` and `scenario`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// YAML config to start from.
    pub config_path: Option<PathBuf>,
    /// `--r0` override.
    pub initial_radius: Option<f64>,
    /// `--l-factor` override.
    pub angular_momentum_factor: Option<f64>,
    /// `--resolution` override.
    pub time_resolution: Option<f64>,
    /// `--steps` override.
    pub max_steps: Option<usize>,
    /// Use the Newtonian reference dynamics.
    pub newtonian: bool,
    /// Enable return detection.
    pub periods: bool,
    /// Directory for the CSV tables.
    pub csv_dir: Option<PathBuf>,
    /// Print a JSON report instead of text.
    pub json: bool,
    /// Debug-level logging and per-perihelion output.
    pub verbose: bool,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// The first item is the program name.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Command::Run(parse_run_options(&args[2..])),
            "scenario" => Self::parse_scenario_command(args),
            "list-scenarios" => Command::ListScenarios,
            "validate" => Self::parse_validate_command(args),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    fn parse_scenario_command(args: &[String]) -> Command {
        match args.get(2) {
            Some(name) if !name.starts_with('-') => Command::Scenario {
                name: name.clone(),
                options: parse_run_options(&args[3..]),
            },
            _ => {
                eprintln!("Error: 'scenario' command requires a scenario name");
                Command::Help
            }
        }
    }

    fn parse_validate_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'validate' command requires config path");
            return Command::Help;
        }

        Command::Validate {
            config_path: PathBuf::from(&args[2]),
        }
    }
}

/// Parse the flags after the subcommand. Unknown flags and unparsable
/// values are reported and skipped. A following `--flag` is never taken
/// as a value.
fn parse_run_options(args: &[String]) -> RunOptions {
    let mut options = RunOptions::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .map(String::as_str)
            .filter(|v| !v.starts_with("--"));
        let consumed = if value.is_some() && takes_value(flag) { 2 } else { 1 };

        match flag {
            "--config" | "-c" => options.config_path = parse_path(flag, value),
            "--r0" => options.initial_radius = parse_value(flag, value),
            "--l-factor" => options.angular_momentum_factor = parse_value(flag, value),
            "--resolution" => options.time_resolution = parse_value(flag, value),
            "--steps" => options.max_steps = parse_value(flag, value),
            "--csv" => options.csv_dir = parse_path(flag, value),
            "--newtonian" => options.newtonian = true,
            "--periods" => options.periods = true,
            "--json" => options.json = true,
            "-v" | "--verbose" => options.verbose = true,
            other => eprintln!("Ignoring unknown option: {other}"),
        }

        i += consumed;
    }

    options
}

fn takes_value(flag: &str) -> bool {
    matches!(
        flag,
        "--config" | "-c" | "--r0" | "--l-factor" | "--resolution" | "--steps" | "--csv"
    )
}

fn parse_path(flag: &str, value: Option<&str>) -> Option<PathBuf> {
    if value.is_none() {
        eprintln!("Ignoring {flag}: expected a path");
    }
    value.map(PathBuf::from)
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&str>) -> Option<T> {
    let parsed = value.and_then(|v| v.parse().ok());
    if parsed.is_none() {
        eprintln!("Ignoring {flag}: expected a number");
    }
    parsed
}
