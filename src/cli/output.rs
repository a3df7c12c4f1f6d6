//! CLI output formatting.

use std::fmt::Write as _;

use serde::Serialize;

use crate::orbit::params::OrbitParameters;
use crate::orbit::physics::Metric;
use crate::orbit::scenarios::OrbitScenario;
use crate::orbit::table::{perihelion_rows, PerihelionRow};
use crate::orbit::trajectory::{OrbitRun, ReturnEvent, RunDiagnostics, Termination};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print version information.
pub fn print_version() {
    println!(
        "schwarzschild {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("SCHWARZSCHILD_GIT_HASH")
    );
}

/// Print help message.
pub fn print_help() {
    println!(
        r"schwarzschild - Relativistic orbit integrator

USAGE:
    schwarzschild <COMMAND> [OPTIONS]

COMMANDS:
    run                         Integrate an orbit
        -c, --config <FILE>     Start from a YAML config
        --r0 <N>                Initial radius in GM (4-90)
        --l-factor <N>          Angular momentum as a fraction of l_c (0.5-1.2)
        --resolution <N>        Steps per characteristic time (100-2000)
        --steps <N>             Maximum number of steps (10-10000)
        --newtonian             Drop the relativistic term
        --periods               Report returns to the initial state
        --csv <DIR>             Write trajectory and perihelion CSV tables
        --json                  Print a JSON report
        -v, --verbose           Debug logging and the perihelion table

    scenario <NAME> [OPTIONS]   Integrate a preset (see list-scenarios)

    list-scenarios              List the presets

    validate <config.yaml>      Validate a config file

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    schwarzschild run
    schwarzschild run --r0 30 --l-factor 0.9 --csv out/
    schwarzschild scenario capture --json
    schwarzschild validate orbit.yaml

ENVIRONMENT:
    SCHWARZSCHILD_LOG           Log filter (falls back to RUST_LOG)
"
    );
}

/// Print the preset table.
pub fn print_scenarios() {
    println!("Available scenarios:\n");
    for scenario in OrbitScenario::ALL {
        println!("  {:<16} {}", scenario.name(), scenario.description());
    }
}

/// Machine-readable run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Parameters the run used.
    pub parameters: OrbitParameters,
    /// Why the run stopped.
    pub termination: Termination,
    /// Stored samples, including the initial one.
    pub samples: usize,
    /// Perihelion table in display units.
    pub perihelia: Vec<PerihelionRow>,
    /// Mean precession per radial period, degrees.
    pub mean_precession_deg: f64,
    /// Advisory returns.
    pub returns: Vec<ReturnEvent>,
    /// Guard summary.
    pub diagnostics: RunDiagnostics,
}

impl RunReport {
    /// Summarise `run`.
    #[must_use]
    pub fn from_run(run: &OrbitRun) -> Self {
        Self {
            parameters: run.parameters().clone(),
            termination: run.termination(),
            samples: run.samples().len(),
            perihelia: perihelion_rows(run),
            mean_precession_deg: run.mean_precession_degrees(),
            returns: run.returns().to_vec(),
            diagnostics: run.diagnostics().clone(),
        }
    }
}

fn describe_termination(termination: Termination) -> String {
    match termination {
        Termination::Completed => "completed".to_string(),
        Termination::Captured { step, r } => format!("captured at step {step} (r = {r:.3})"),
        Termination::Escaped { step, r } => format!("escaped at step {step} (r = {r:.3e})"),
        Termination::NonFinite { step } => format!("non-finite state at step {step}"),
    }
}

/// Human-readable run summary.
#[must_use]
pub fn format_run_summary(run: &OrbitRun, verbose: bool) -> String {
    let params = run.parameters();
    let metric = match params.metric() {
        Metric::Schwarzschild => "schwarzschild",
        Metric::Newtonian => "newtonian",
    };

    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "r0 = {:.3} GM, l = {:.3} lc = {:.4}, metric: {metric}",
        params.initial_radius(),
        params.angular_momentum_factor(),
        params.angular_momentum()
    );
    let _ = writeln!(
        out,
        "dtau = {:.4} (tau_c / {}), max steps: {}",
        params.dtau(),
        params.time_resolution(),
        params.max_steps()
    );
    let _ = writeln!(out, "{RULE}\n");

    let _ = writeln!(out, "Steps taken:     {}", run.steps_taken());
    let _ = writeln!(out, "Termination:     {}", describe_termination(run.termination()));
    let _ = writeln!(out, "Perihelia:       {}", run.perihelia().len());
    let _ = writeln!(
        out,
        "Mean precession: {:.2}°",
        run.mean_precession_degrees()
    );
    if !run.returns().is_empty() {
        let steps: Vec<String> = run.returns().iter().map(|r| r.step.to_string()).collect();
        let _ = writeln!(out, "Returns at step: {}", steps.join(", "));
    }

    let diagnostics = run.diagnostics();
    let _ = writeln!(
        out,
        "Energy drift:    {:.2e} (warnings: {})",
        diagnostics.max_energy_drift, diagnostics.warnings
    );

    if verbose && !run.perihelia().is_empty() {
        let _ = writeln!(out, "\n{:>10} {:>10} {:>10}", "τ (τc)", "r (GM)", "φ (°)");
        for row in perihelion_rows(run) {
            let _ = writeln!(out, "{:>10.3} {:>10.3} {:>10.3}", row.tau, row.r, row.phi_deg);
        }
    }

    out
}

/// Print the human-readable run summary.
pub fn print_run_summary(run: &OrbitRun, verbose: bool) {
    print!("{}", format_run_summary(run, verbose));
}

/// Print the outcome of `validate`.
pub fn print_validation_result(path: &str, result: &Result<(), String>) {
    println!("Validating: {path}\n");
    println!("{RULE}");
    match result {
        Ok(()) => println!("✓ Config validation PASSED"),
        Err(e) => {
            println!("✗ Config validation FAILED");
            println!("{RULE}\n");
            println!("Error: {e}");
            return;
        }
    }
    println!("{RULE}");
}
