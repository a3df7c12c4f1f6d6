//! Orbit E2E Tests
//!
//! Validates acceptance criteria AC-1 through AC-14 for the orbit integrator.
//!
//! Each test is written to falsify a hypothesis about the system:
//! - Tests are deterministic and reproducible
//! - Tests verify invariant properties
//! - Tests use metamorphic relations where no oracle is available

use schwarzschild::orbit::metamorphic::{
    check_angular_momentum_consistency, check_deterministic_replay, run_all_metamorphic_tests,
};
use schwarzschild::orbit::prelude::*;

fn params(r0: f64, factor: f64, resolution: f64, steps: usize) -> OrbitParameters {
    OrbitParameters::new(r0, factor, resolution, steps).expect("valid parameters")
}

fn default_orbit() -> OrbitParameters {
    params(50.0, 0.75, 1000.0, 4286)
}

/// AC-1: The first sample is the initial condition, bit for bit.
#[test]
fn ac1_first_sample_is_initial_condition() {
    let p = OrbitParameters::builder()
        .initial_radius(37.5)
        .initial_velocity(0.01)
        .initial_angle(0.25)
        .build()
        .expect("valid parameters");
    let run = run_orbit(&p);
    let first = run.samples()[0];

    assert_eq!(first.step, 0);
    assert_eq!(first.tau, 0.0);
    assert_eq!(first.r, 37.5);
    assert_eq!(first.v, 0.01);
    assert_eq!(first.phi, 0.25);
}

/// AC-2: r²·dφ/dτ, differenced from the stored angles, equals l to O(dτ²).
#[test]
fn ac2_angular_momentum_matches_l() {
    let run = run_orbit(&default_orbit());
    let result = check_angular_momentum_consistency(&run, 1e-3);
    assert!(result.passed, "AC-2 FAILED: {}", result.details);
}

/// AC-3: Running twice with the same parameters gives identical runs.
#[test]
fn ac3_reruns_are_idempotent() {
    let p = default_orbit();
    assert!(check_deterministic_replay(&p).passed);
    assert_eq!(run_orbit(&p), run_orbit(&p));
}

/// AC-4: Perihelion steps strictly increase and each is a strict local minimum.
#[test]
fn ac4_perihelia_are_ordered_local_minima() {
    let run = run_orbit(&default_orbit());
    let samples = run.samples();

    assert!(run.perihelia().len() >= 2);
    for pair in run.perihelia().windows(2) {
        assert!(pair[0].step < pair[1].step);
    }
    for p in run.perihelia() {
        let s = p.step;
        assert!(samples[s - 1].r > samples[s].r && samples[s].r < samples[s + 1].r);
        assert_eq!(samples[s].r, p.r);
        assert_eq!(samples[s].phi, p.phi);
    }
}

/// AC-5: r₀ = 50 at 0.75·l_c precesses forward by roughly 50° per radial period.
#[test]
fn ac5_default_orbit_precesses() {
    let run = run_orbit(&default_orbit());
    let deg = run.mean_precession_degrees();

    assert_eq!(run.perihelia().len(), 7);
    assert!(deg > 40.0 && deg < 60.0, "AC-5 FAILED: precession {deg:.3}°");
}

/// AC-6: Precession shrinks as the orbit moves away from the hole.
#[test]
fn ac6_precession_decreases_with_radius() {
    let precession: Vec<f64> = [30.0, 60.0, 90.0]
        .iter()
        .map(|&r0| run_orbit(&params(r0, 0.9, 1000.0, 4286)).mean_precession_degrees())
        .collect();

    assert!(
        precession[0] > precession[1] && precession[1] > precession[2],
        "AC-6 FAILED: {precession:?}"
    );
    assert!(precession[2] > 0.0);
}

/// AC-7: Newtonian dynamics give (numerically) zero precession.
#[test]
fn ac7_newtonian_precession_vanishes() {
    for (r0, factor) in [(50.0, 0.75), (90.0, 0.9)] {
        let p = params(r0, factor, 1000.0, 4286)
            .to_builder()
            .metric(Metric::Newtonian)
            .build()
            .expect("valid parameters");
        let run = run_orbit(&p);
        assert!(run.perihelia().len() >= 2);
        assert!(
            run.mean_precession_degrees().abs() < 0.5,
            "AC-7 FAILED at r0 = {r0}: {:.4}°",
            run.mean_precession_degrees()
        );
    }
}

/// AC-8: r₀ = 4 at 0.5·l_c falls through the horizon before the step budget.
#[test]
fn ac8_capture_terminates_early() {
    let run = run_orbit(&params(4.0, 0.5, 1000.0, 10_000));

    let Termination::Captured { step, r } = run.termination() else {
        panic!("AC-8 FAILED: {:?}", run.termination());
    };
    assert!(step < 10_000);
    assert!(r <= HORIZON_RADIUS);
    assert_eq!(run.samples().len(), step);
    assert!(run.samples().iter().all(|s| s.r > HORIZON_RADIUS));
    assert_eq!(run.mean_precession(), 0.0);
}

/// AC-8b: A fast outward start leaves through r = 10⁶ and keeps every in-domain sample.
#[test]
fn ac8b_escape_terminates_early() {
    let p = OrbitParameters::builder()
        .initial_velocity(0.5)
        .time_resolution(10.0)
        .max_steps(100_000)
        .build()
        .expect("valid parameters");
    let run = run_orbit(&p);

    match run.termination() {
        Termination::Escaped { step, r } => {
            assert_eq!(step, 9867);
            assert!(r >= ESCAPE_RADIUS);
        }
        other => panic!("AC-8b FAILED: expected escape, got {other:?}"),
    }
    assert_eq!(run.samples().len(), 9867);
    assert!(run.samples().iter().all(|s| s.r < ESCAPE_RADIUS));
    assert!(run.samples().last().is_some_and(|s| s.r > 9.0e5));
}

/// AC-9: dτ = τ_c / resolution, and rebuilding the parameters reproduces the run.
#[test]
fn ac9_time_step_derivation() {
    let p = default_orbit();
    let tau_c = 2.0 * std::f64::consts::PI * 50.0 * 50.0 / p.circular_angular_momentum();

    assert!((p.characteristic_time() - tau_c).abs() < 1e-9);
    assert!((p.dtau() - tau_c / 1000.0).abs() < 1e-12);

    let rebuilt = p.to_builder().build().expect("valid parameters");
    assert_eq!(run_orbit(&rebuilt).samples(), run_orbit(&p).samples());

    let run = run_orbit(&p);
    for s in run.samples().iter().step_by(500) {
        assert!((s.tau - s.step as f64 * p.dtau()).abs() < 1e-9);
    }
}

/// AC-10: A circular orbit keeps its radius and has no perihelion.
#[test]
fn ac10_circular_orbit() {
    let run = run_orbit(&params(20.0, 1.0, 1000.0, 4286));

    assert_eq!(run.termination(), Termination::Completed);
    assert!(run.perihelia().is_empty());
    assert_eq!(run.mean_precession(), 0.0);
    assert!(run.samples().iter().all(|s| (s.r - 20.0).abs() < 1e-6));
}

/// AC-11: A reference radius of 50 with r₀ = 4 reproduces the fixed-scale plunge.
#[test]
fn ac11_reference_radius_plunge() {
    let p = OrbitParameters::builder()
        .initial_radius(4.0)
        .angular_momentum_factor(0.5)
        .reference_radius(50.0)
        .build()
        .expect("valid parameters");
    let run = run_orbit(&p);

    assert!(matches!(run.termination(), Termination::Captured { .. }));
    assert!(run.samples().len() < 20);
}

/// AC-12: The step budget bounds the trajectory length.
#[test]
fn ac12_step_budget() {
    let run = run_orbit(&params(50.0, 0.75, 1000.0, 10));
    assert_eq!(run.samples().len(), 11);
    assert_eq!(run.steps_taken(), 10);
    assert_eq!(run.termination(), Termination::Completed);
}

/// AC-13: All metamorphic relations hold for the default orbit.
#[test]
fn ac13_metamorphic_relations() {
    for result in run_all_metamorphic_tests(&default_orbit()) {
        assert!(result.passed, "{} FAILED: {}", result.relation, result.details);
    }
}

/// AC-14: Return detection is advisory and leaves the trajectory untouched.
#[test]
fn ac14_period_detection_is_advisory() {
    let p = default_orbit();
    let plain = run_orbit(&p);
    let detected = TrajectoryBuilder::new(&p)
        .period_detection(PeriodDetectionConfig::default())
        .run();

    assert_eq!(plain.samples(), detected.samples());
    assert_eq!(plain.perihelia(), detected.perihelia());
    assert_eq!(plain.mean_precession(), detected.mean_precession());
    assert!(plain.returns().is_empty());
    assert_eq!(detected.returns().len(), 1);
    assert!(detected.returns()[0].step.abs_diff(4276) <= 5);
}

/// Runs are plain values that can cross threads.
#[test]
fn orbit_run_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync + Clone>() {}
    assert_send_sync::<OrbitRun>();
    assert_send_sync::<OrbitParameters>();
}
