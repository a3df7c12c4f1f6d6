//! Tabular output: trajectory rows, perihelion rows, and CSV export.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{OrbitError, OrbitResult};
use crate::orbit::trajectory::OrbitRun;
use crate::orbit::units::display_degrees;

/// Trajectory CSV header.
pub const TRAJECTORY_HEADER: &str = "τ (τc),r (GM),v (GM),φ (°)";

/// Perihelion CSV header.
pub const PERIHELION_HEADER: &str = "τ (τc),r (GM),φ (°)";

/// Label of the trailing precession row.
pub const PRECESSION_LABEL: &str = "mean precession (deg):";

/// Default trajectory file name.
pub const TRAJECTORY_FILE: &str = "schwarzschild_orbit_trajectory.csv";

/// Default perihelion file name.
pub const PRECESSION_FILE: &str = "schwarzschild_orbit_precession.csv";

/// One trajectory row in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryRow {
    /// Proper time in units of τ_c.
    pub tau: f64,
    /// Radius.
    pub r: f64,
    /// Radial velocity.
    pub v: f64,
    /// Angle in degrees, [0, 360).
    pub phi_deg: f64,
}

/// One perihelion row in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerihelionRow {
    /// Proper time in units of τ_c.
    pub tau: f64,
    /// Radius at the minimum.
    pub r: f64,
    /// Angle in degrees, [0, 360).
    pub phi_deg: f64,
}

/// Trajectory rows for `run`.
#[must_use]
pub fn trajectory_rows(run: &OrbitRun) -> Vec<TrajectoryRow> {
    let params = run.parameters();
    run.samples()
        .iter()
        .map(|s| TrajectoryRow {
            tau: params.tau_in_characteristic_units(s.step),
            r: s.r,
            v: s.v,
            phi_deg: display_degrees(s.phi),
        })
        .collect()
}

/// Perihelion rows for `run`.
#[must_use]
pub fn perihelion_rows(run: &OrbitRun) -> Vec<PerihelionRow> {
    let params = run.parameters();
    run.perihelia()
        .iter()
        .map(|p| PerihelionRow {
            tau: params.tau_in_characteristic_units(p.step),
            r: p.r,
            phi_deg: display_degrees(p.phi),
        })
        .collect()
}

fn write_line<W: Write>(writer: &mut W, line: &str) -> OrbitResult<()> {
    writeln!(writer, "{line}").map_err(|e| OrbitError::io(format!("Write failed: {e}")))
}

/// Write the trajectory table as CSV.
///
/// # Errors
///
/// Returns `OrbitError::Io` if the writer fails.
pub fn write_trajectory_csv<W: Write>(run: &OrbitRun, writer: &mut W) -> OrbitResult<()> {
    write_line(writer, TRAJECTORY_HEADER)?;

    let mut line = String::new();
    for row in trajectory_rows(run) {
        line.clear();
        let _ = write!(line, "{},{},{},{}", row.tau, row.r, row.v, row.phi_deg);
        write_line(writer, &line)?;
    }

    writer
        .flush()
        .map_err(|e| OrbitError::io(format!("Flush failed: {e}")))
}

/// Write the perihelion table as CSV, followed by the mean precession row.
///
/// # Errors
///
/// Returns `OrbitError::Io` if the writer fails.
pub fn write_perihelion_csv<W: Write>(run: &OrbitRun, writer: &mut W) -> OrbitResult<()> {
    write_line(writer, PERIHELION_HEADER)?;

    for row in perihelion_rows(run) {
        write_line(writer, &format!("{},{},{}", row.tau, row.r, row.phi_deg))?;
    }
    write_line(
        writer,
        &format!("{PRECESSION_LABEL},,{}", run.mean_precession_degrees()),
    )?;

    writer
        .flush()
        .map_err(|e| OrbitError::io(format!("Flush failed: {e}")))
}

/// Write both tables into `dir` under their default names.
///
/// # Errors
///
/// Returns `OrbitError::Io` if a file cannot be created or written.
pub fn export_csv(run: &OrbitRun, dir: &Path) -> OrbitResult<(PathBuf, PathBuf)> {
    let trajectory_path = dir.join(TRAJECTORY_FILE);
    let precession_path = dir.join(PRECESSION_FILE);

    let file = File::create(&trajectory_path)
        .map_err(|e| OrbitError::io(format!("Failed to create {}: {e}", trajectory_path.display())))?;
    write_trajectory_csv(run, &mut BufWriter::new(file))?;

    let file = File::create(&precession_path)
        .map_err(|e| OrbitError::io(format!("Failed to create {}: {e}", precession_path.display())))?;
    write_perihelion_csv(run, &mut BufWriter::new(file))?;

    Ok((trajectory_path, precession_path))
}
