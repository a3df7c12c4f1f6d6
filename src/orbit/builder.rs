//! Trajectory builder: drives the integrator and feeds the event detector.
//!
//! [`OrbitStepper`] is the lazy sample stream. It yields the initial
//! condition as step 0, then one RK4 step per item, and stops for good the
//! moment a produced radius leaves (2, 10⁶) or the step budget runs out.
//! [`TrajectoryBuilder`] drains a stepper into a fresh [`Trajectory`] and
//! freezes the outcome as an [`OrbitRun`].

use tracing::{debug, info, trace, warn};

use crate::orbit::events::{EventDetector, PeriodDetectionConfig};
use crate::orbit::jidoka::{JidokaResponse, JidokaStatus, OrbitJidokaConfig, OrbitJidokaGuard};
use crate::orbit::params::OrbitParameters;
use crate::orbit::physics::{OrbitState, Rk4Integrator};
use crate::orbit::trajectory::{OrbitRun, RunDiagnostics, Sample, Termination, Trajectory};

/// Upper bound on the up-front sample allocation.
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 16;

/// Lazy stream of trajectory samples.
#[derive(Debug, Clone)]
pub struct OrbitStepper {
    integrator: Rk4Integrator,
    angular_momentum: f64,
    dtau: f64,
    max_steps: usize,
    state: OrbitState,
    next_step: usize,
    guard: OrbitJidokaGuard,
    termination: Option<Termination>,
}

impl OrbitStepper {
    /// Stepper with the default guard configuration.
    #[must_use]
    pub fn new(params: &OrbitParameters) -> Self {
        Self::with_jidoka(params, OrbitJidokaConfig::default())
    }

    /// Stepper with an explicit guard configuration.
    #[must_use]
    pub fn with_jidoka(params: &OrbitParameters, config: OrbitJidokaConfig) -> Self {
        let state = params.initial_state();
        let mut guard = OrbitJidokaGuard::new(
            config,
            params.metric(),
            params.angular_momentum(),
            params.dtau(),
        );
        guard.initialize(&state);

        Self {
            integrator: Rk4Integrator::new(params.metric()),
            angular_momentum: params.angular_momentum(),
            dtau: params.dtau(),
            max_steps: params.max_steps(),
            state,
            next_step: 0,
            guard,
            termination: None,
        }
    }

    /// Why the stream ended; `None` while samples remain.
    #[must_use]
    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Guard status accumulated so far.
    #[must_use]
    pub fn jidoka_status(&self) -> &JidokaStatus {
        self.guard.status()
    }

    fn finish(&mut self, termination: Termination) -> Option<Sample> {
        self.termination = Some(termination);
        None
    }
}

impl Iterator for OrbitStepper {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.termination.is_some() {
            return None;
        }

        let step = self.next_step;
        if step == 0 {
            self.next_step = 1;
            return Some(Sample::from_state(0, self.dtau, &self.state));
        }
        if step > self.max_steps {
            return self.finish(Termination::Completed);
        }

        let candidate = self.integrator.step(&self.state, self.dtau, self.angular_momentum);

        if let Some(termination) = Termination::for_radius(step, candidate.r) {
            debug!(step, r = candidate.r, ?termination, "radius left the valid domain");
            return self.finish(termination);
        }

        match self.guard.check(&candidate) {
            JidokaResponse::Continue => {}
            JidokaResponse::Warning { violation } => {
                if self.guard.status().warning_count == 1 {
                    warn!(step, %violation, "integration drift");
                } else {
                    trace!(step, %violation, "integration drift");
                }
            }
            JidokaResponse::Halt { violation } => {
                warn!(step, %violation, "halting integration");
                return self.finish(Termination::NonFinite { step });
            }
        }

        self.state = candidate;
        self.next_step = step + 1;
        Some(Sample::from_state(step, self.dtau, &candidate))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.termination.is_some() {
            return (0, Some(0));
        }
        let remaining = self.max_steps.saturating_add(1).saturating_sub(self.next_step);
        (0, Some(remaining))
    }
}

/// Runs one full integration into a fresh store.
#[derive(Debug, Clone)]
pub struct TrajectoryBuilder<'a> {
    params: &'a OrbitParameters,
    jidoka: OrbitJidokaConfig,
    period_detection: Option<PeriodDetectionConfig>,
}

impl<'a> TrajectoryBuilder<'a> {
    /// Builder for `params` with default guards and no period detection.
    #[must_use]
    pub fn new(params: &'a OrbitParameters) -> Self {
        Self {
            params,
            jidoka: OrbitJidokaConfig::default(),
            period_detection: None,
        }
    }

    /// Override the guard configuration.
    #[must_use]
    pub fn jidoka(mut self, config: OrbitJidokaConfig) -> Self {
        self.jidoka = config;
        self
    }

    /// Enable advisory return detection.
    #[must_use]
    pub fn period_detection(mut self, config: PeriodDetectionConfig) -> Self {
        self.period_detection = Some(config);
        self
    }

    /// Integrate and collect the result bundle.
    #[must_use]
    pub fn run(self) -> OrbitRun {
        let params = self.params;
        let _span = tracing::debug_span!(
            "orbit_run",
            r0 = params.initial_radius(),
            l = params.angular_momentum(),
            dtau = params.dtau(),
            max_steps = params.max_steps(),
        )
        .entered();

        let mut stepper = OrbitStepper::with_jidoka(params, self.jidoka);
        let mut detector = EventDetector::new();
        if let Some(config) = self.period_detection {
            detector = detector.with_period_detection(config, params.initial_state());
        }

        let capacity = params.max_steps().min(MAX_PREALLOCATED_SAMPLES) + 1;
        let mut trajectory = Trajectory::with_capacity(capacity);

        for sample in stepper.by_ref() {
            trajectory.push_sample(sample);
            let events = detector.observe(&sample);
            if let Some(record) = events.perihelion {
                debug!(step = record.step, r = record.r, phi = record.phi, "perihelion");
                trajectory.push_perihelion(record);
            }
            if let Some(event) = events.return_event {
                debug!(step = event.step, r = event.r, offset = event.angle_offset, "return to initial state");
                trajectory.push_return(event);
            }
        }

        let termination = stepper.termination().unwrap_or(Termination::Completed);
        let diagnostics = RunDiagnostics::from(stepper.jidoka_status());
        let mean_precession = detector.mean_precession();

        info!(
            samples = trajectory.len(),
            perihelia = trajectory.perihelia().len(),
            precession_deg = mean_precession.to_degrees(),
            ?termination,
            warnings = diagnostics.warnings,
            "orbit run finished"
        );

        OrbitRun::new(
            params.clone(),
            trajectory,
            mean_precession,
            termination,
            diagnostics,
        )
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_samples_are_consecutive_and_in_domain(
            r0 in 4.0f64..90.0,
            factor in 0.5f64..1.2,
            steps in 10usize..400,
        ) {
            let Ok(p) = OrbitParameters::new(r0, factor, 500.0, steps) else {
                return Err(TestCaseError::fail("parameters rejected"));
            };
            let run = TrajectoryBuilder::new(&p).run();
            let samples = run.samples();

            prop_assert!(!samples.is_empty());
            prop_assert!(samples.len() <= steps + 1);
            prop_assert_eq!(samples[0].r, r0);
            for (i, s) in samples.iter().enumerate() {
                prop_assert_eq!(s.step, i);
                prop_assert!(s.r > 2.0 && s.r < 1.0e6);
            }
            if !run.termination().is_early() {
                prop_assert_eq!(samples.len(), steps + 1);
            }
        }

        #[test]
        fn prop_perihelion_steps_strictly_increase(
            r0 in 20.0f64..90.0,
            factor in 0.6f64..0.95,
        ) {
            let Ok(p) = OrbitParameters::new(r0, factor, 200.0, 2000) else {
                return Err(TestCaseError::fail("parameters rejected"));
            };
            let run = TrajectoryBuilder::new(&p).run();
            for pair in run.perihelia().windows(2) {
                prop_assert!(pair[0].step < pair[1].step);
            }
        }
    }
}
