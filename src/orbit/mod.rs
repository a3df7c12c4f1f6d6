//! Schwarzschild orbit integration.
//!
//! A test particle in the equatorial plane of a non-rotating black hole,
//! in geometric units (G = M = 1):
//!
//! ```text
//! dr/dτ = v
//! dv/dτ = −1/r² + l²/r³ − 3l²/r⁴
//! dφ/dτ = l/r²
//! ```
//!
//! The module is layered leaves first:
//! - [`physics`]: the derivative model and the RK4 step
//! - [`builder`]: drives the integrator within the valid radius domain
//! - [`events`]: perihelion detection, precession averaging, return detection
//! - [`trajectory`]: the sample store and the immutable [`OrbitRun`](trajectory::OrbitRun)
//!
//! with [`params`], [`units`], [`jidoka`], [`scenarios`], [`metamorphic`]
//! and [`table`] around them.
//!
//! # Example
//!
//! ```rust
//! use schwarzschild::orbit::prelude::*;
//!
//! let params = OrbitParameters::new(50.0, 0.75, 1000.0, 4286)?;
//! let run = run_orbit(&params);
//!
//! assert_eq!(run.samples()[0].r, 50.0);
//! assert!(run.perihelia().len() >= 2);
//! assert!(run.mean_precession_degrees() > 0.0);
//! # Ok::<(), schwarzschild::error::OrbitError>(())
//! ```

pub mod builder;
pub mod events;
pub mod jidoka;
pub mod metamorphic;
pub mod params;
pub mod physics;
pub mod scenarios;
pub mod table;
pub mod trajectory;
pub mod units;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::builder::{OrbitStepper, TrajectoryBuilder};
    pub use super::events::{
        is_perihelion, EventDetector, EventSummary, PeriodDetectionConfig, PeriodDetector,
        PrecessionAccumulator, SampleWindow,
    };
    pub use super::jidoka::{
        JidokaResponse, JidokaStatus, OrbitJidokaConfig, OrbitJidokaGuard, OrbitJidokaViolation,
    };
    pub use super::metamorphic::{run_all_metamorphic_tests, MetamorphicResult};
    pub use super::params::{OrbitParameters, OrbitParametersBuilder};
    pub use super::physics::{Derivatives, Metric, OrbitState, Rk4Integrator};
    pub use super::run_orbit;
    pub use super::scenarios::OrbitScenario;
    pub use super::trajectory::{
        OrbitRun, PerihelionRecord, ReturnEvent, RunDiagnostics, Sample, Termination, Trajectory,
    };
    pub use super::units::{OrbitAngle, ESCAPE_RADIUS, HORIZON_RADIUS};
}

/// Integrate one orbit with default guards and no period detection.
///
/// Each call starts from a fresh store, detector and accumulator, so two
/// calls with equal parameters return equal runs.
#[must_use]
pub fn run_orbit(params: &params::OrbitParameters) -> trajectory::OrbitRun {
    builder::TrajectoryBuilder::new(params).run()
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_run_orbit_is_idempotent() {
        let params = OrbitParameters::builder().build().unwrap();
        let a = run_orbit(&params);
        let b = run_orbit(&params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_orbit_rerun_with_new_parameters() {
        let first = OrbitParameters::builder().build().unwrap();
        let second = OrbitParameters::new(80.0, 0.75, 1000.0, 4286).unwrap();
        let a = run_orbit(&first);
        let b = run_orbit(&second);
        assert_eq!(b.samples()[0].r, 80.0);
        assert!(a.mean_precession() > b.mean_precession());
    }
}
