//! Metamorphic relations for the orbit integrator.
//!
//! The exact trajectory of a relativistic orbit has no closed form, so the
//! integrator is checked through relations between runs instead of against
//! reference values.
//!
//! # Relations
//!
//! 1. **Deterministic Replay**: identical parameters give bit-identical runs
//! 2. **Rotation Invariance**: shifting φ₀ shifts every perihelion angle by the same amount
//! 3. **Resolution Convergence**: refining dτ barely moves the precession estimate
//! 4. **Newtonian Closure**: without the GR term the ellipse closes
//! 5. **Angular Momentum Consistency**: r²·dφ/dτ, with dφ/dτ differenced from the
//!    stored angles, reproduces l along the run

use serde::Serialize;

use crate::orbit::builder::TrajectoryBuilder;
use crate::orbit::params::OrbitParameters;
use crate::orbit::physics::Metric;
use crate::orbit::trajectory::OrbitRun;

/// Outcome of one relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetamorphicResult {
    /// Relation name.
    pub relation: String,
    /// Whether the relation holds within tolerance.
    pub passed: bool,
    /// Measured deviation.
    pub error: f64,
    /// Tolerance used.
    pub tolerance: f64,
    /// Additional details.
    pub details: String,
}

impl MetamorphicResult {
    /// Passing result.
    #[must_use]
    pub fn pass(relation: &str, error: f64, tolerance: f64) -> Self {
        Self {
            relation: relation.to_string(),
            passed: true,
            error,
            tolerance,
            details: String::new(),
        }
    }

    /// Failing result.
    #[must_use]
    pub fn fail(relation: &str, error: f64, tolerance: f64, details: &str) -> Self {
        Self {
            relation: relation.to_string(),
            passed: false,
            error,
            tolerance,
            details: details.to_string(),
        }
    }

    fn judge(relation: &str, error: f64, tolerance: f64, details: String) -> Self {
        if error <= tolerance {
            Self::pass(relation, error, tolerance)
        } else {
            Self::fail(relation, error, tolerance, &details)
        }
    }
}

/// MR-1: two runs from the same parameters must agree bit for bit.
#[must_use]
pub fn check_deterministic_replay(params: &OrbitParameters) -> MetamorphicResult {
    let first = TrajectoryBuilder::new(params).run();
    let second = TrajectoryBuilder::new(params).run();

    if first == second {
        MetamorphicResult::pass("Deterministic Replay", 0.0, 0.0)
    } else {
        MetamorphicResult::fail("Deterministic Replay", 1.0, 0.0, "Runs not bit-identical")
    }
}

/// MR-2: φ does not enter the equations, so rotating the start by `shift`
/// moves every sample angle by `shift` and leaves r untouched.
#[must_use]
pub fn check_rotation_invariance(
    params: &OrbitParameters,
    shift: f64,
    tolerance: f64,
) -> MetamorphicResult {
    const NAME: &str = "Rotation Invariance";

    let rotated_params = match params
        .to_builder()
        .initial_angle(params.initial_angle() + shift)
        .build()
    {
        Ok(p) => p,
        Err(e) => return MetamorphicResult::fail(NAME, f64::NAN, tolerance, &e.to_string()),
    };

    let base = TrajectoryBuilder::new(params).run();
    let rotated = TrajectoryBuilder::new(&rotated_params).run();

    if base.samples().len() != rotated.samples().len()
        || base.perihelia().len() != rotated.perihelia().len()
    {
        return MetamorphicResult::fail(NAME, f64::INFINITY, tolerance, "Run lengths differ");
    }

    let sample_error = base
        .samples()
        .iter()
        .zip(rotated.samples())
        .map(|(a, b)| (a.r - b.r).abs().max((b.phi - a.phi - shift).abs()))
        .fold(0.0, f64::max);
    let perihelion_error = base
        .perihelia()
        .iter()
        .zip(rotated.perihelia())
        .map(|(a, b)| (b.phi - a.phi - shift).abs())
        .fold(0.0, f64::max);
    let error = sample_error.max(perihelion_error);

    MetamorphicResult::judge(NAME, error, tolerance, format!("Max deviation: {error:.2e}"))
}

/// MR-3: doubling the resolution changes the precession estimate by at most
/// `tolerance` radians.
#[must_use]
pub fn check_resolution_convergence(params: &OrbitParameters, tolerance: f64) -> MetamorphicResult {
    const NAME: &str = "Resolution Convergence";

    let refined = match params
        .to_builder()
        .time_resolution(params.time_resolution() * 2.0)
        .max_steps(params.max_steps().saturating_mul(2))
        .build()
    {
        Ok(p) => p,
        Err(e) => return MetamorphicResult::fail(NAME, f64::NAN, tolerance, &e.to_string()),
    };

    let coarse = TrajectoryBuilder::new(params).run();
    let fine = TrajectoryBuilder::new(&refined).run();

    if coarse.perihelia().len() < 2 || fine.perihelia().len() < 2 {
        return MetamorphicResult::fail(NAME, f64::NAN, tolerance, "Fewer than two perihelia");
    }

    let error = (coarse.mean_precession() - fine.mean_precession()).abs();
    MetamorphicResult::judge(
        NAME,
        error,
        tolerance,
        format!(
            "Precession {:.4} deg vs {:.4} deg",
            coarse.mean_precession_degrees(),
            fine.mean_precession_degrees()
        ),
    )
}

/// MR-4: the same orbit under Newtonian gravity has (numerically) zero precession.
#[must_use]
pub fn check_newtonian_closure(params: &OrbitParameters, tolerance: f64) -> MetamorphicResult {
    const NAME: &str = "Newtonian Closure";

    let newtonian = match params.to_builder().metric(Metric::Newtonian).build() {
        Ok(p) => p,
        Err(e) => return MetamorphicResult::fail(NAME, f64::NAN, tolerance, &e.to_string()),
    };

    let run = TrajectoryBuilder::new(&newtonian).run();
    if run.perihelia().len() < 2 {
        return MetamorphicResult::fail(NAME, f64::NAN, tolerance, "Fewer than two perihelia");
    }

    let error = run.mean_precession().abs();
    MetamorphicResult::judge(
        NAME,
        error,
        tolerance,
        format!("Residual precession {:.4} deg", run.mean_precession_degrees()),
    )
}

/// MR-5: r²·dφ/dτ equals l, with dφ/dτ taken as the central difference
/// `(φ[i+1] − φ[i−1]) / 2dτ` of the stored angles.
///
/// The difference quotient is itself O(dτ²), so `tolerance` must allow for
/// it; halving dτ shrinks the error about fourfold.
#[must_use]
pub fn check_angular_momentum_consistency(run: &OrbitRun, tolerance: f64) -> MetamorphicResult {
    const NAME: &str = "Angular Momentum Consistency";

    let params = run.parameters();
    let l = params.angular_momentum();
    let dtau = params.dtau();
    let samples = run.samples();

    if samples.len() < 3 {
        return MetamorphicResult::fail(NAME, f64::NAN, tolerance, "Fewer than three samples");
    }

    let error = samples
        .windows(3)
        .map(|w| {
            let dphi = (w[2].phi - w[0].phi) / (2.0 * dtau);
            (w[1].r * w[1].r * dphi - l).abs() / l.abs().max(f64::MIN_POSITIVE)
        })
        .fold(0.0, f64::max);

    MetamorphicResult::judge(NAME, error, tolerance, format!("Max relative error: {error:.2e}"))
}

/// Run every relation against `params`.
#[must_use]
pub fn run_all_metamorphic_tests(params: &OrbitParameters) -> Vec<MetamorphicResult> {
    let run = TrajectoryBuilder::new(params).run();
    vec![
        check_deterministic_replay(params),
        check_rotation_invariance(params, 1.0, 1e-9),
        check_resolution_convergence(params, 1.0_f64.to_radians()),
        check_newtonian_closure(params, 0.5_f64.to_radians()),
        check_angular_momentum_consistency(&run, 1e-3),
    ]
}
