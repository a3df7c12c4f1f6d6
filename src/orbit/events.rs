//! Event detection over the sample stream.
//!
//! The detector sees samples one at a time through a three-slot ring
//! buffer, so the same code serves the streaming path (fed by the builder
//! while integrating) and the batch path ([`EventDetector::scan`] over a
//! finished trajectory).
//!
//! # Events
//!
//! - **Perihelion**: strict local minimum of r over (before, current, after).
//! - **Precession**: mean of consecutive perihelion angle differences, minus 2π.
//! - **Return** (advisory): state comes back within tolerance of (r₀, v₀, φ₀).

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::orbit::physics::OrbitState;
use crate::orbit::trajectory::{PerihelionRecord, ReturnEvent, Sample};
use crate::orbit::units::shortest_angular_distance;

/// Fixed three-slot window over the most recent samples.
#[derive(Debug, Clone, Default)]
pub struct SampleWindow {
    slots: [Option<Sample>; 3],
    head: usize,
}

impl SampleWindow {
    /// Empty window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a sample, evicting the oldest once full.
    pub fn push(&mut self, sample: Sample) {
        self.slots[self.head] = Some(sample);
        self.head = (self.head + 1) % 3;
    }

    /// `(before, current, after)` in step order, once three samples have arrived.
    #[must_use]
    pub fn triple(&self) -> Option<(&Sample, &Sample, &Sample)> {
        let before = self.slots[self.head].as_ref()?;
        let current = self.slots[(self.head + 1) % 3].as_ref()?;
        let after = self.slots[(self.head + 2) % 3].as_ref()?;
        Some((before, current, after))
    }
}

/// Strict local-minimum test, no tie tolerance.
#[must_use]
pub fn is_perihelion(before: &Sample, current: &Sample, after: &Sample) -> bool {
    before.r > current.r && current.r < after.r
}

/// Running sum of angle advances between consecutive perihelia.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrecessionAccumulator {
    sum: f64,
    count: usize,
    last_phi: Option<f64>,
}

impl PrecessionAccumulator {
    /// Empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a perihelion angle.
    pub fn record(&mut self, phi: f64) {
        if let Some(prev) = self.last_phi {
            self.sum += phi - prev;
            self.count += 1;
        }
        self.last_phi = Some(phi);
    }

    /// Number of consecutive perihelion pairs seen.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Mean advance per radial period minus 2π, or 0 without a pair.
    #[must_use]
    pub fn mean_precession(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64 - TAU
        } else {
            0.0
        }
    }
}

/// Thresholds for the advisory return-to-initial-state detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodDetectionConfig {
    /// Minimum steps between two reported returns.
    pub min_separation: usize,
    /// Radius tolerance.
    pub tolerance_r: f64,
    /// Radial velocity tolerance.
    pub tolerance_v: f64,
    /// Angular tolerance in radians.
    pub tolerance_phi: f64,
}

impl Default for PeriodDetectionConfig {
    fn default() -> Self {
        Self {
            min_separation: 100,
            tolerance_r: 0.5,
            tolerance_v: 0.01,
            tolerance_phi: 0.05,
        }
    }
}

/// Flags samples that come back close to the initial state.
#[derive(Debug, Clone)]
pub struct PeriodDetector {
    config: PeriodDetectionConfig,
    initial: OrbitState,
    last_return: usize,
}

impl PeriodDetector {
    /// Detector anchored at `initial`; the initial sample counts as step 0.
    #[must_use]
    pub const fn new(config: PeriodDetectionConfig, initial: OrbitState) -> Self {
        Self {
            config,
            initial,
            last_return: 0,
        }
    }

    /// Check one sample.
    pub fn observe(&mut self, sample: &Sample) -> Option<ReturnEvent> {
        if sample.step < self.last_return + self.config.min_separation {
            return None;
        }

        let angle_offset = shortest_angular_distance(sample.phi, self.initial.phi);
        let near = (sample.r - self.initial.r).abs() <= self.config.tolerance_r
            && (sample.v - self.initial.v).abs() <= self.config.tolerance_v
            && angle_offset.abs() <= self.config.tolerance_phi;

        if near {
            self.last_return = sample.step;
            Some(ReturnEvent {
                step: sample.step,
                r: sample.r,
                angle_offset,
            })
        } else {
            None
        }
    }
}

/// Events produced by a single observed sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetectedEvents {
    /// Perihelion confirmed at the previous sample.
    pub perihelion: Option<PerihelionRecord>,
    /// Advisory return at this sample.
    pub return_event: Option<ReturnEvent>,
}

/// Summary of a batch scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSummary {
    /// Perihelia in step order.
    pub perihelia: Vec<PerihelionRecord>,
    /// Advisory returns in step order.
    pub returns: Vec<ReturnEvent>,
    /// Mean precession in radians.
    pub mean_precession: f64,
}

/// Incremental perihelion, precession and return detector.
#[derive(Debug, Clone, Default)]
pub struct EventDetector {
    window: SampleWindow,
    precession: PrecessionAccumulator,
    period: Option<PeriodDetector>,
}

impl EventDetector {
    /// Detector for perihelia and precession only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report advisory returns to `initial`.
    #[must_use]
    pub fn with_period_detection(mut self, config: PeriodDetectionConfig, initial: OrbitState) -> Self {
        self.period = Some(PeriodDetector::new(config, initial));
        self
    }

    /// Feed the next sample in step order.
    pub fn observe(&mut self, sample: &Sample) -> DetectedEvents {
        self.window.push(*sample);

        let perihelion = match self.window.triple() {
            Some((before, current, after)) if is_perihelion(before, current, after) => {
                Some(PerihelionRecord {
                    step: current.step,
                    r: current.r,
                    phi: current.phi,
                })
            }
            _ => None,
        };
        if let Some(record) = &perihelion {
            self.precession.record(record.phi);
        }

        let return_event = self.period.as_mut().and_then(|p| p.observe(sample));

        DetectedEvents {
            perihelion,
            return_event,
        }
    }

    /// Mean precession over the perihelia seen so far.
    #[must_use]
    pub fn mean_precession(&self) -> f64 {
        self.precession.mean_precession()
    }

    /// Run the detector over a finished sample sequence.
    #[must_use]
    pub fn scan(mut self, samples: &[Sample]) -> EventSummary {
        let mut summary = EventSummary::default();
        for sample in samples {
            let events = self.observe(sample);
            summary.perihelia.extend(events.perihelion);
            summary.returns.extend(events.return_event);
        }
        summary.mean_precession = self.mean_precession();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(step: usize, r: f64, phi: f64) -> Sample {
        Sample::from_state(step, 1.0, &OrbitState::new(r, 0.0, phi))
    }

    #[test]
    fn test_window_needs_three_samples() {
        let mut w = SampleWindow::new();
        assert!(w.triple().is_none());
        w.push(sample(0, 3.0, 0.0));
        w.push(sample(1, 2.5, 0.0));
        assert!(w.triple().is_none());
        w.push(sample(2, 2.8, 0.0));
        let steps = w.triple().map(|(a, b, c)| (a.step, b.step, c.step));
        assert_eq!(steps, Some((0, 1, 2)));
    }

    #[test]
    fn test_window_keeps_order_after_wrap() {
        let mut w = SampleWindow::new();
        for i in 0..7 {
            w.push(sample(i, 10.0, 0.0));
        }
        let steps = w.triple().map(|(a, b, c)| (a.step, b.step, c.step));
        assert_eq!(steps, Some((4, 5, 6)));
    }

    #[test]
    fn test_strict_minimum() {
        let a = sample(0, 10.0, 0.0);
        let b = sample(1, 9.0, 0.0);
        let c = sample(2, 9.5, 0.0);
        assert!(is_perihelion(&a, &b, &c));
        // ties are not minima
        let flat = sample(2, 9.0, 0.0);
        assert!(!is_perihelion(&a, &b, &flat));
        assert!(!is_perihelion(&b, &b, &c));
    }

    #[test]
    fn test_accumulator_needs_pair() {
        let mut acc = PrecessionAccumulator::new();
        assert_eq!(acc.mean_precession(), 0.0);
        acc.record(1.0);
        assert_eq!(acc.count(), 0);
        assert_eq!(acc.mean_precession(), 0.0);
        acc.record(1.0 + TAU + 0.2);
        acc.record(1.0 + 2.0 * TAU + 0.6);
        assert_eq!(acc.count(), 2);
        assert!((acc.mean_precession() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_detector_reports_previous_step() {
        let mut det = EventDetector::new();
        assert!(det.observe(&sample(0, 10.0, 0.0)).perihelion.is_none());
        assert!(det.observe(&sample(1, 8.0, 0.5)).perihelion.is_none());
        let ev = det.observe(&sample(2, 9.0, 1.0));
        assert_eq!(ev.perihelion, Some(PerihelionRecord { step: 1, r: 8.0, phi: 0.5 }));
        assert!(ev.return_event.is_none());
    }

    #[test]
    fn test_scan_matches_streaming() {
        let radii = [10.0, 8.0, 9.0, 10.0, 7.0, 8.0, 9.0, 6.0, 6.5];
        let samples: Vec<Sample> = radii
            .iter()
            .enumerate()
            .map(|(i, &r)| sample(i, r, i as f64 * 1.3))
            .collect();

        let summary = EventDetector::new().scan(&samples);
        let steps: Vec<usize> = summary.perihelia.iter().map(|p| p.step).collect();
        assert_eq!(steps, vec![1, 4, 7]);

        let mut det = EventDetector::new();
        let streamed: Vec<PerihelionRecord> = samples
            .iter()
            .filter_map(|s| det.observe(s).perihelion)
            .collect();
        assert_eq!(streamed, summary.perihelia);
        assert_eq!(det.mean_precession(), summary.mean_precession);
        assert!((summary.mean_precession - (3.0 * 1.3 - TAU)).abs() < 1e-12);
    }

    #[test]
    fn test_period_detector_respects_separation() {
        let config = PeriodDetectionConfig {
            min_separation: 5,
            ..PeriodDetectionConfig::default()
        };
        let mut det = PeriodDetector::new(config, OrbitState::new(10.0, 0.0, 0.0));
        assert!(det.observe(&sample(0, 10.0, 0.0)).is_none());
        assert!(det.observe(&sample(4, 10.0, TAU)).is_none());
        let ev = det.observe(&sample(5, 10.1, TAU - 0.01));
        assert!(ev.is_some());
        if let Some(ev) = ev {
            assert_eq!(ev.step, 5);
            assert!((ev.angle_offset + 0.01).abs() < 1e-9);
        }
        assert!(det.observe(&sample(6, 10.0, TAU)).is_none());
        assert!(det.observe(&sample(10, 10.0, 2.0 * TAU)).is_some());
    }

    #[test]
    fn test_period_detector_tolerances() {
        let mut det = PeriodDetector::new(
            PeriodDetectionConfig { min_separation: 1, ..PeriodDetectionConfig::default() },
            OrbitState::new(10.0, 0.0, 0.0),
        );
        // radius off
        assert!(det.observe(&sample(1, 11.0, 0.0)).is_none());
        // angle off
        assert!(det.observe(&sample(2, 10.0, 0.5)).is_none());
        // velocity off
        let fast = Sample::from_state(3, 1.0, &OrbitState::new(10.0, 0.5, 0.0));
        assert!(det.observe(&fast).is_none());
    }

    #[test]
    fn test_period_detection_does_not_touch_precession() {
        let samples: Vec<Sample> = [10.0, 8.0, 9.0, 10.0, 7.0, 8.0]
            .iter()
            .enumerate()
            .map(|(i, &r)| sample(i, r, i as f64))
            .collect();
        let plain = EventDetector::new().scan(&samples);
        let with_period = EventDetector::new()
            .with_period_detection(PeriodDetectionConfig::default(), OrbitState::new(10.0, 0.0, 0.0))
            .scan(&samples);
        assert_eq!(plain.perihelia, with_period.perihelia);
        assert_eq!(plain.mean_precession, with_period.mean_precession);
    }
}
