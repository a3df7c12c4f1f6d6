//! Trajectory store and the immutable result of one run.
//!
//! A [`Trajectory`] is append-only while the builder owns it. Once the run
//! finishes it is frozen inside an [`OrbitRun`], which callers hold and
//! replace wholesale when parameters change.

use serde::Serialize;

use crate::orbit::jidoka::JidokaStatus;
use crate::orbit::params::OrbitParameters;
use crate::orbit::physics::OrbitState;
use crate::orbit::units::{display_degrees, in_valid_domain, HORIZON_RADIUS};

/// One emitted element of the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Step index; 0 is the initial condition.
    pub step: usize,
    /// Proper time τ = step · dτ.
    pub tau: f64,
    /// Radius.
    pub r: f64,
    /// Radial velocity.
    pub v: f64,
    /// Accumulated azimuthal angle in radians.
    pub phi: f64,
}

impl Sample {
    /// Build a sample from a state.
    #[must_use]
    pub fn from_state(step: usize, dtau: f64, state: &OrbitState) -> Self {
        Self {
            step,
            tau: step as f64 * dtau,
            r: state.r,
            v: state.v,
            phi: state.phi,
        }
    }

    /// State carried by this sample.
    #[must_use]
    pub const fn state(&self) -> OrbitState {
        OrbitState::new(self.r, self.v, self.phi)
    }

    /// Cartesian x = r cos φ.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.r * self.phi.cos()
    }

    /// Cartesian y = r sin φ.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.r * self.phi.sin()
    }

    /// Angle in display degrees [0, 360).
    #[must_use]
    pub fn phi_degrees(&self) -> f64 {
        display_degrees(self.phi)
    }
}

/// A confirmed local minimum of r.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerihelionRecord {
    /// Step index of the minimum.
    pub step: usize,
    /// Radius at the minimum.
    pub r: f64,
    /// Unwrapped angle at the minimum, in radians.
    pub phi: f64,
}

impl PerihelionRecord {
    /// Angle in display degrees [0, 360).
    #[must_use]
    pub fn phi_degrees(&self) -> f64 {
        display_degrees(self.phi)
    }
}

/// Advisory near-return to the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnEvent {
    /// Step index of the return.
    pub step: usize,
    /// Radius at the return.
    pub r: f64,
    /// Signed angular distance to φ₀ in radians.
    pub angle_offset: f64,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Termination {
    /// The full step budget was used.
    Completed,
    /// A step produced r ≤ 2 (capture by the horizon).
    Captured {
        /// Step that would have crossed.
        step: usize,
        /// Offending radius.
        r: f64,
    },
    /// A step produced r ≥ 10⁶ (escape).
    Escaped {
        /// Step that would have crossed.
        step: usize,
        /// Offending radius.
        r: f64,
    },
    /// A step produced NaN or infinity.
    NonFinite {
        /// Step that failed.
        step: usize,
    },
}

impl Termination {
    /// Classify the radius produced at `step`; `None` while it stays inside
    /// the valid domain.
    #[must_use]
    pub fn for_radius(step: usize, r: f64) -> Option<Self> {
        if !r.is_finite() {
            Some(Self::NonFinite { step })
        } else if in_valid_domain(r) {
            None
        } else if r <= HORIZON_RADIUS {
            Some(Self::Captured { step, r })
        } else {
            Some(Self::Escaped { step, r })
        }
    }

    /// Check if the run stopped before using its step budget.
    #[must_use]
    pub const fn is_early(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// Ordered, append-only sample sequence with its derived events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trajectory {
    samples: Vec<Sample>,
    perihelia: Vec<PerihelionRecord>,
    returns: Vec<ReturnEvent>,
}

impl Trajectory {
    /// Empty store sized for `capacity` samples.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            perihelia: Vec::new(),
            returns: Vec::new(),
        }
    }

    /// Append a sample. Steps must arrive in strictly increasing order.
    pub fn push_sample(&mut self, sample: Sample) {
        debug_assert!(
            self.samples.last().map_or(true, |last| last.step < sample.step),
            "samples must be appended in step order"
        );
        self.samples.push(sample);
    }

    /// Append a perihelion record.
    pub fn push_perihelion(&mut self, record: PerihelionRecord) {
        self.perihelia.push(record);
    }

    /// Append a return event.
    pub fn push_return(&mut self, event: ReturnEvent) {
        self.returns.push(event);
    }

    /// All samples in step order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Detected perihelia in step order.
    #[must_use]
    pub fn perihelia(&self) -> &[PerihelionRecord] {
        &self.perihelia
    }

    /// Advisory returns to the initial state.
    #[must_use]
    pub fn returns(&self) -> &[ReturnEvent] {
        &self.returns
    }

    /// Number of samples, including the initial one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no sample has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample.
    #[must_use]
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

/// Health summary collected while integrating.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunDiagnostics {
    /// Largest relative specific-energy drift seen.
    pub max_energy_drift: f64,
    /// Largest relative angular momentum error implied by the φ steps.
    pub max_angular_momentum_error: f64,
    /// Number of guard warnings raised.
    pub warnings: usize,
}

impl From<&JidokaStatus> for RunDiagnostics {
    fn from(status: &JidokaStatus) -> Self {
        Self {
            max_energy_drift: status.max_energy_drift,
            max_angular_momentum_error: status.max_angular_momentum_error,
            warnings: status.warning_count,
        }
    }
}

/// Immutable result bundle of one integration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitRun {
    parameters: OrbitParameters,
    trajectory: Trajectory,
    mean_precession: f64,
    termination: Termination,
    diagnostics: RunDiagnostics,
}

impl OrbitRun {
    /// Freeze a finished trajectory.
    #[must_use]
    pub fn new(
        parameters: OrbitParameters,
        trajectory: Trajectory,
        mean_precession: f64,
        termination: Termination,
        diagnostics: RunDiagnostics,
    ) -> Self {
        Self {
            parameters,
            trajectory,
            mean_precession,
            termination,
            diagnostics,
        }
    }

    /// Parameters the run was produced from.
    #[must_use]
    pub const fn parameters(&self) -> &OrbitParameters {
        &self.parameters
    }

    /// Full trajectory store.
    #[must_use]
    pub const fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Samples in step order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        self.trajectory.samples()
    }

    /// Perihelia in step order.
    #[must_use]
    pub fn perihelia(&self) -> &[PerihelionRecord] {
        self.trajectory.perihelia()
    }

    /// Advisory returns to the initial state.
    #[must_use]
    pub fn returns(&self) -> &[ReturnEvent] {
        self.trajectory.returns()
    }

    /// Mean precession per radial period in radians (0 with fewer than two perihelia).
    #[must_use]
    pub const fn mean_precession(&self) -> f64 {
        self.mean_precession
    }

    /// Mean precession in degrees.
    #[must_use]
    pub fn mean_precession_degrees(&self) -> f64 {
        self.mean_precession.to_degrees()
    }

    /// Why the run stopped.
    #[must_use]
    pub const fn termination(&self) -> Termination {
        self.termination
    }

    /// Guard summary.
    #[must_use]
    pub const fn diagnostics(&self) -> &RunDiagnostics {
        &self.diagnostics
    }

    /// Last stored state.
    #[must_use]
    pub fn final_state(&self) -> Option<OrbitState> {
        self.trajectory.last().map(Sample::state)
    }

    /// Number of integration steps actually taken.
    #[must_use]
    pub fn steps_taken(&self) -> usize {
        self.trajectory.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sample_cartesian() {
        let s = Sample::from_state(3, 0.5, &OrbitState::new(10.0, 0.0, PI / 2.0));
        assert_eq!(s.step, 3);
        assert!((s.tau - 1.5).abs() < 1e-12);
        assert!(s.x().abs() < 1e-9);
        assert!((s.y() - 10.0).abs() < 1e-9);
        assert!((s.phi_degrees() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_termination_classification() {
        assert!(matches!(Termination::for_radius(5, 1.9), Some(Termination::Captured { step: 5, .. })));
        assert!(matches!(Termination::for_radius(5, 2.0), Some(Termination::Captured { .. })));
        assert!(matches!(Termination::for_radius(7, 2e6), Some(Termination::Escaped { step: 7, .. })));
        assert!(matches!(Termination::for_radius(9, f64::NAN), Some(Termination::NonFinite { step: 9 })));
        assert_eq!(Termination::for_radius(1, 10.0), None);
        assert_eq!(Termination::for_radius(1, 999_999.0), None);
        assert!(!Termination::Completed.is_early());
        assert!(Termination::NonFinite { step: 1 }.is_early());
    }

    #[test]
    fn test_trajectory_append() {
        let mut t = Trajectory::with_capacity(4);
        assert!(t.is_empty());
        t.push_sample(Sample::from_state(0, 1.0, &OrbitState::new(10.0, 0.0, 0.0)));
        t.push_sample(Sample::from_state(1, 1.0, &OrbitState::new(9.0, -0.1, 0.1)));
        t.push_perihelion(PerihelionRecord { step: 1, r: 9.0, phi: 0.1 });
        assert_eq!(t.len(), 2);
        assert_eq!(t.perihelia().len(), 1);
        assert!(t.returns().is_empty());
        assert_eq!(t.last().map(|s| s.step), Some(1));
    }

    #[test]
    fn test_termination_serializes_with_tag() {
        let json = serde_json::to_string(&Termination::Captured { step: 3, r: 1.5 });
        assert!(json.is_ok());
        if let Ok(json) = json {
            assert!(json.contains("\"kind\":\"captured\""));
        }
    }
}
