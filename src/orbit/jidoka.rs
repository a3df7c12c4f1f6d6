//! Jidoka (自働化) - run-health guard for orbit integration.
//!
//! Every new state is checked before it is stored:
//! - non-finite values halt the run (the state is discarded),
//! - specific-energy drift beyond tolerance raises a warning,
//! - the angular momentum implied by the integrated φ step drifting from
//!   `l` raises a warning.
//!
//! The angular-momentum check reads φ off the states themselves: over one
//! step, `Δφ/dτ` divided by the trapezoid mean of `1/r²` must reproduce
//! `l` to O(dτ²). Warnings never stop integration; they are counted and
//! surfaced in the run diagnostics so a caller can judge the step size.

use serde::{Deserialize, Serialize};

use crate::orbit::physics::{Metric, OrbitState};

/// Guard verdict for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaResponse {
    /// All checks passed.
    Continue,

    /// Drift detected; integration continues.
    Warning {
        violation: OrbitJidokaViolation,
    },

    /// Unrecoverable state; integration must stop before storing it.
    Halt {
        violation: OrbitJidokaViolation,
    },
}

impl JidokaResponse {
    /// Check if this response allows continuation.
    #[must_use]
    pub fn can_continue(&self) -> bool {
        matches!(self, Self::Continue | Self::Warning { .. })
    }

    /// Check if this is a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning { .. })
    }

    /// Check if integration should halt.
    #[must_use]
    pub fn should_halt(&self) -> bool {
        matches!(self, Self::Halt { .. })
    }
}

/// Violation kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrbitJidokaViolation {
    /// Non-finite value (NaN or Inf) detected.
    NonFinite {
        field: String,
        value: f64,
    },

    /// Specific energy drifted.
    EnergyDrift {
        initial: f64,
        current: f64,
        relative_error: f64,
        tolerance: f64,
    },

    /// The φ advance over one step no longer reproduces l.
    AngularMomentumDrift {
        expected: f64,
        current: f64,
        relative_error: f64,
        tolerance: f64,
    },
}

impl std::fmt::Display for OrbitJidokaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite { field, value } => {
                write!(f, "Non-finite {field}: {value}")
            }
            Self::EnergyDrift { relative_error, tolerance, .. } => {
                write!(f, "Energy drift {relative_error:.2e} exceeds tolerance {tolerance:.2e}")
            }
            Self::AngularMomentumDrift { relative_error, tolerance, .. } => {
                write!(f, "Angular momentum drift {relative_error:.2e} exceeds tolerance {tolerance:.2e}")
            }
        }
    }
}

/// Guard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitJidokaConfig {
    /// Check for non-finite values.
    pub check_finite: bool,
    /// Check specific-energy conservation.
    pub check_energy: bool,
    /// Relative energy drift tolerance.
    pub energy_tolerance: f64,
    /// Check the angular momentum implied by each φ step against l.
    pub check_angular_momentum: bool,
    /// Relative angular momentum tolerance (the estimate itself is O(dτ²)).
    pub angular_momentum_tolerance: f64,
}

impl Default for OrbitJidokaConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            check_energy: true,
            energy_tolerance: 1e-6,
            check_angular_momentum: true,
            angular_momentum_tolerance: 1e-3,
        }
    }
}

/// Running status for diagnostics (Mieruka).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JidokaStatus {
    /// Largest relative energy drift seen.
    pub max_energy_drift: f64,
    /// Largest relative angular momentum error seen.
    pub max_angular_momentum_error: f64,
    /// Last checked state was finite.
    pub finite_ok: bool,
    /// Total warning count.
    pub warning_count: usize,
}

/// Orbit guard with graceful degradation.
#[derive(Debug, Clone)]
pub struct OrbitJidokaGuard {
    config: OrbitJidokaConfig,
    metric: Metric,
    angular_momentum: f64,
    dtau: f64,
    initial_energy: Option<f64>,
    previous: Option<OrbitState>,
    status: JidokaStatus,
}

impl OrbitJidokaGuard {
    /// Create a guard for the given model, angular momentum and step size.
    #[must_use]
    pub fn new(config: OrbitJidokaConfig, metric: Metric, angular_momentum: f64, dtau: f64) -> Self {
        Self {
            config,
            metric,
            angular_momentum,
            dtau,
            initial_energy: None,
            previous: None,
            status: JidokaStatus::default(),
        }
    }

    /// Record the reference energy from the initial state.
    pub fn initialize(&mut self, state: &OrbitState) {
        self.initial_energy = Some(self.metric.specific_energy(state, self.angular_momentum));
        self.previous = Some(*state);
        self.status = JidokaStatus {
            finite_ok: state.is_finite(),
            ..JidokaStatus::default()
        };
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> &JidokaStatus {
        &self.status
    }

    /// Check a freshly integrated state.
    ///
    /// Unless the verdict is `Halt`, `state` becomes the previous state for
    /// the next check.
    pub fn check(&mut self, state: &OrbitState) -> JidokaResponse {
        if self.config.check_finite {
            if let Some(response) = self.check_finite(state) {
                return response;
            }
        }

        let mut response = JidokaResponse::Continue;

        if self.config.check_energy {
            if let Some(warning) = self.check_energy(state) {
                response = warning;
            }
        }

        if self.config.check_angular_momentum {
            if let Some(warning) = self.check_angular_momentum(state) {
                if !response.is_warning() {
                    response = warning;
                }
            }
        }

        if response.is_warning() {
            self.status.warning_count += 1;
        }
        self.previous = Some(*state);
        response
    }

    fn check_finite(&mut self, state: &OrbitState) -> Option<JidokaResponse> {
        let fields = [("r", state.r), ("v", state.v), ("phi", state.phi)];
        self.status.finite_ok = true;
        for (field, value) in fields {
            if !value.is_finite() {
                self.status.finite_ok = false;
                return Some(JidokaResponse::Halt {
                    violation: OrbitJidokaViolation::NonFinite {
                        field: field.to_string(),
                        value,
                    },
                });
            }
        }
        None
    }

    fn check_energy(&mut self, state: &OrbitState) -> Option<JidokaResponse> {
        let initial = self.initial_energy?;
        let current = self.metric.specific_energy(state, self.angular_momentum);
        let relative_error = relative_error(initial, current);

        if relative_error > self.status.max_energy_drift {
            self.status.max_energy_drift = relative_error;
        }

        let tolerance = self.config.energy_tolerance;
        (relative_error > tolerance).then_some(JidokaResponse::Warning {
            violation: OrbitJidokaViolation::EnergyDrift {
                initial,
                current,
                relative_error,
                tolerance,
            },
        })
    }

    fn check_angular_momentum(&mut self, state: &OrbitState) -> Option<JidokaResponse> {
        let previous = self.previous?;
        if self.dtau <= 0.0 {
            return None;
        }

        let expected = self.angular_momentum;
        let mean_inverse_r2 = 0.5 * (previous.r.powi(-2) + state.r.powi(-2));
        let current = (state.phi - previous.phi) / self.dtau / mean_inverse_r2;
        let relative_error = relative_error(expected, current);

        if relative_error > self.status.max_angular_momentum_error {
            self.status.max_angular_momentum_error = relative_error;
        }

        let tolerance = self.config.angular_momentum_tolerance;
        (relative_error > tolerance).then_some(JidokaResponse::Warning {
            violation: OrbitJidokaViolation::AngularMomentumDrift {
                expected,
                current,
                relative_error,
                tolerance,
            },
        })
    }
}

fn relative_error(reference: f64, current: f64) -> f64 {
    if reference.abs() > f64::EPSILON {
        (current - reference).abs() / reference.abs()
    } else {
        (current - reference).abs()
    }
}
