//! Reproducibility QA.
//!
//! Each test states a null hypothesis that would make results unreproducible
//! and tries to falsify it by comparing serialized runs bit for bit.

use schwarzschild::orbit::prelude::*;
use schwarzschild::prelude::OrbitConfig;

fn default_params() -> OrbitParameters {
    OrbitParameters::builder().build().unwrap()
}

// H0: Repeated runs with identical parameters diverge
// Falsification: Run 20 times; compare serialized output
#[test]
fn h0_1_repeated_runs_are_identical() {
    let params = default_params();
    let first = serde_json::to_string(&run_orbit(&params)).unwrap();

    for i in 1..20 {
        let output = serde_json::to_string(&run_orbit(&params)).unwrap();
        assert_eq!(output, first, "Run {i} produced different output");
    }
}

// H0: Running on different threads changes results
#[test]
fn h0_2_thread_invariance() {
    use std::thread;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(|| serde_json::to_string(&run_orbit(&default_params())).unwrap())
        })
        .collect();

    let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, result) in results.iter().enumerate().skip(1) {
        assert_eq!(&results[0], result, "Thread {i} produced different result");
    }
}

// H0: A previous run leaks state into the next one
// Falsification: Interleave two parameter sets; compare with isolated runs
#[test]
fn h0_3_runs_do_not_share_state() {
    let a = default_params();
    let b = OrbitParameters::new(4.0, 0.5, 1000.0, 10_000).unwrap();

    let isolated_a = serde_json::to_string(&run_orbit(&a)).unwrap();
    let isolated_b = serde_json::to_string(&run_orbit(&b)).unwrap();

    for _ in 0..3 {
        assert_eq!(serde_json::to_string(&run_orbit(&b)).unwrap(), isolated_b);
        assert_eq!(serde_json::to_string(&run_orbit(&a)).unwrap(), isolated_a);
    }
}

// H0: Streaming and batch event detection disagree
#[test]
fn h0_4_streaming_matches_batch_detection() {
    let run = run_orbit(&default_params());
    let summary = EventDetector::new().scan(run.samples());

    assert_eq!(summary.perihelia, run.perihelia());
    assert_eq!(summary.mean_precession, run.mean_precession());
}

// H0: The lazy stepper and the builder produce different samples
#[test]
fn h0_5_stepper_matches_builder() {
    let params = default_params();
    let streamed: Vec<Sample> = OrbitStepper::new(&params).collect();
    assert_eq!(streamed.as_slice(), run_orbit(&params).samples());
}

// H0: Loading the same configuration from YAML changes the run
#[test]
fn h0_6_config_roundtrip_reproduces_run() {
    let config = OrbitConfig::builder()
        .initial_radius(35.0)
        .angular_momentum_factor(0.85)
        .build();
    let yaml = config.to_yaml().unwrap();
    let reloaded = OrbitConfig::from_yaml(&yaml).unwrap();

    let direct = run_orbit(&config.to_parameters().unwrap());
    let via_yaml = run_orbit(&reloaded.to_parameters().unwrap());
    assert_eq!(
        serde_json::to_string(&direct).unwrap(),
        serde_json::to_string(&via_yaml).unwrap()
    );
}
