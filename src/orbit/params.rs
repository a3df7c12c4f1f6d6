//! Validated orbit parameters (Poka-Yoke).
//!
//! [`OrbitParameters`] is the only way to hand inputs to the integrator.
//! It is checked once at construction, so the integration loop never sees a
//! radius inside the photon sphere or a non-positive step.

use serde::Serialize;

use crate::error::{OrbitError, OrbitResult};
use crate::orbit::physics::{characteristic_time, circular_angular_momentum, Metric, OrbitState};
use crate::orbit::units::{ESCAPE_RADIUS, PHOTON_SPHERE_RADIUS};

/// Input domains exposed to interactive front ends.
///
/// These bound the sliders of a UI; [`OrbitParameters`] itself only enforces
/// the physical constraints.
pub mod domain {
    use std::ops::RangeInclusive;

    /// Initial radius range.
    pub const INITIAL_RADIUS: RangeInclusive<f64> = 4.0..=90.0;
    /// Angular momentum as a fraction of the circular value.
    pub const ANGULAR_MOMENTUM_FACTOR: RangeInclusive<f64> = 0.5..=1.2;
    /// Steps per characteristic time τ_c.
    pub const TIME_RESOLUTION: RangeInclusive<f64> = 100.0..=2000.0;
    /// Maximum number of integration steps.
    pub const MAX_STEPS: RangeInclusive<usize> = 10..=10_000;
    /// Slider units per unit of angular momentum factor.
    pub const SLIDER_SCALE: f64 = 10_000.0;
}

/// Default initial radius.
pub const DEFAULT_INITIAL_RADIUS: f64 = 50.0;
/// Default angular momentum factor.
pub const DEFAULT_ANGULAR_MOMENTUM_FACTOR: f64 = 0.75;
/// Default steps per τ_c.
pub const DEFAULT_TIME_RESOLUTION: f64 = 1000.0;
/// Default step budget.
pub const DEFAULT_MAX_STEPS: usize = 4286;

/// Immutable inputs for one integration run.
///
/// Derived quantities (l_c, l, τ_c, dτ) are computed once on construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitParameters {
    initial_radius: f64,
    initial_velocity: f64,
    initial_angle: f64,
    angular_momentum_factor: f64,
    time_resolution: f64,
    max_steps: usize,
    reference_radius: f64,
    metric: Metric,
    circular_angular_momentum: f64,
    angular_momentum: f64,
    characteristic_time: f64,
    dtau: f64,
}

impl OrbitParameters {
    /// Create parameters with zero initial velocity and angle.
    ///
    /// # Errors
    ///
    /// Returns [`OrbitError::OutOfDomain`] if any input is invalid.
    pub fn new(
        initial_radius: f64,
        angular_momentum_factor: f64,
        time_resolution: f64,
        max_steps: usize,
    ) -> OrbitResult<Self> {
        Self::builder()
            .initial_radius(initial_radius)
            .angular_momentum_factor(angular_momentum_factor)
            .time_resolution(time_resolution)
            .max_steps(max_steps)
            .build()
    }

    /// Create parameters from slider units (angular momentum in 1/10000 of l_c).
    ///
    /// # Errors
    ///
    /// Returns [`OrbitError::OutOfDomain`] if any input is invalid.
    pub fn from_slider_units(
        initial_radius: f64,
        angular_momentum_slider: u32,
        time_resolution: u32,
        max_steps: usize,
    ) -> OrbitResult<Self> {
        Self::new(
            initial_radius,
            f64::from(angular_momentum_slider) / domain::SLIDER_SCALE,
            f64::from(time_resolution),
            max_steps,
        )
    }

    /// Create a builder initialised with the defaults.
    #[must_use]
    pub fn builder() -> OrbitParametersBuilder {
        OrbitParametersBuilder::default()
    }

    /// Builder pre-filled with these parameters.
    #[must_use]
    pub fn to_builder(&self) -> OrbitParametersBuilder {
        OrbitParametersBuilder {
            initial_radius: self.initial_radius,
            initial_velocity: self.initial_velocity,
            initial_angle: self.initial_angle,
            angular_momentum_factor: self.angular_momentum_factor,
            time_resolution: self.time_resolution,
            max_steps: self.max_steps,
            reference_radius: Some(self.reference_radius),
            metric: self.metric,
        }
    }

    /// Initial radius r₀.
    #[must_use]
    pub const fn initial_radius(&self) -> f64 {
        self.initial_radius
    }

    /// Initial radial velocity v₀.
    #[must_use]
    pub const fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    /// Initial angle φ₀ in radians.
    #[must_use]
    pub const fn initial_angle(&self) -> f64 {
        self.initial_angle
    }

    /// Initial state (r₀, v₀, φ₀).
    #[must_use]
    pub const fn initial_state(&self) -> OrbitState {
        OrbitState::new(self.initial_radius, self.initial_velocity, self.initial_angle)
    }

    /// Angular momentum as a fraction of l_c.
    #[must_use]
    pub const fn angular_momentum_factor(&self) -> f64 {
        self.angular_momentum_factor
    }

    /// Steps per characteristic time.
    #[must_use]
    pub const fn time_resolution(&self) -> f64 {
        self.time_resolution
    }

    /// Maximum number of integration steps after the initial sample.
    #[must_use]
    pub const fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Radius at which l_c and τ_c are evaluated.
    #[must_use]
    pub const fn reference_radius(&self) -> f64 {
        self.reference_radius
    }

    /// Dynamics model.
    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Circular-orbit reference angular momentum l_c.
    #[must_use]
    pub const fn circular_angular_momentum(&self) -> f64 {
        self.circular_angular_momentum
    }

    /// Angular momentum l = factor · l_c.
    #[must_use]
    pub const fn angular_momentum(&self) -> f64 {
        self.angular_momentum
    }

    /// Characteristic orbital time τ_c.
    #[must_use]
    pub const fn characteristic_time(&self) -> f64 {
        self.characteristic_time
    }

    /// Proper-time step dτ = τ_c / resolution.
    #[must_use]
    pub const fn dtau(&self) -> f64 {
        self.dtau
    }

    /// Proper time of step `i` in units of τ_c.
    #[must_use]
    pub fn tau_in_characteristic_units(&self, step: usize) -> f64 {
        step as f64 / self.time_resolution
    }
}

/// Builder for [`OrbitParameters`].
#[derive(Debug, Clone)]
pub struct OrbitParametersBuilder {
    initial_radius: f64,
    initial_velocity: f64,
    initial_angle: f64,
    angular_momentum_factor: f64,
    time_resolution: f64,
    max_steps: usize,
    reference_radius: Option<f64>,
    metric: Metric,
}

impl Default for OrbitParametersBuilder {
    fn default() -> Self {
        Self {
            initial_radius: DEFAULT_INITIAL_RADIUS,
            initial_velocity: 0.0,
            initial_angle: 0.0,
            angular_momentum_factor: DEFAULT_ANGULAR_MOMENTUM_FACTOR,
            time_resolution: DEFAULT_TIME_RESOLUTION,
            max_steps: DEFAULT_MAX_STEPS,
            reference_radius: None,
            metric: Metric::default(),
        }
    }
}

impl OrbitParametersBuilder {
    /// Set the initial radius r₀.
    #[must_use]
    pub const fn initial_radius(mut self, r0: f64) -> Self {
        self.initial_radius = r0;
        self
    }

    /// Set the initial radial velocity v₀.
    #[must_use]
    pub const fn initial_velocity(mut self, v0: f64) -> Self {
        self.initial_velocity = v0;
        self
    }

    /// Set the initial angle φ₀ in radians.
    #[must_use]
    pub const fn initial_angle(mut self, phi0: f64) -> Self {
        self.initial_angle = phi0;
        self
    }

    /// Set the angular momentum factor (fraction of l_c).
    #[must_use]
    pub const fn angular_momentum_factor(mut self, factor: f64) -> Self {
        self.angular_momentum_factor = factor;
        self
    }

    /// Set the number of steps per τ_c.
    #[must_use]
    pub const fn time_resolution(mut self, resolution: f64) -> Self {
        self.time_resolution = resolution;
        self
    }

    /// Set the step budget.
    #[must_use]
    pub const fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    /// Evaluate l_c and τ_c at a fixed radius instead of r₀.
    #[must_use]
    pub const fn reference_radius(mut self, r: f64) -> Self {
        self.reference_radius = Some(r);
        self
    }

    /// Set the dynamics model.
    #[must_use]
    pub const fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns [`OrbitError::OutOfDomain`] when:
    /// - r₀ or the reference radius is not in (3, 10⁶)
    /// - the angular momentum factor or time resolution is not positive
    /// - the step budget is zero
    /// - any input is non-finite
    pub fn build(self) -> OrbitResult<OrbitParameters> {
        check_radius("initial_radius", self.initial_radius)?;
        let reference_radius = self.reference_radius.unwrap_or(self.initial_radius);
        check_radius("reference_radius", reference_radius)?;
        check_finite("initial_velocity", self.initial_velocity)?;
        check_finite("initial_angle", self.initial_angle)?;
        check_positive("angular_momentum_factor", self.angular_momentum_factor)?;
        check_positive("time_resolution", self.time_resolution)?;
        if self.max_steps == 0 {
            return Err(OrbitError::out_of_domain(
                "max_steps",
                0.0,
                "at least one step is required",
            ));
        }

        let lc = circular_angular_momentum(reference_radius).ok_or_else(|| {
            OrbitError::out_of_domain(
                "reference_radius",
                reference_radius,
                "no circular orbit inside the photon sphere",
            )
        })?;
        let tau_c = characteristic_time(reference_radius).ok_or_else(|| {
            OrbitError::out_of_domain(
                "reference_radius",
                reference_radius,
                "characteristic time undefined",
            )
        })?;

        Ok(OrbitParameters {
            initial_radius: self.initial_radius,
            initial_velocity: self.initial_velocity,
            initial_angle: self.initial_angle,
            angular_momentum_factor: self.angular_momentum_factor,
            time_resolution: self.time_resolution,
            max_steps: self.max_steps,
            reference_radius,
            metric: self.metric,
            circular_angular_momentum: lc,
            angular_momentum: self.angular_momentum_factor * lc,
            characteristic_time: tau_c,
            dtau: tau_c / self.time_resolution,
        })
    }
}

fn check_finite(parameter: &'static str, value: f64) -> OrbitResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(OrbitError::out_of_domain(parameter, value, "must be finite"))
    }
}

fn check_positive(parameter: &'static str, value: f64) -> OrbitResult<()> {
    check_finite(parameter, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(OrbitError::out_of_domain(parameter, value, "must be positive"))
    }
}

fn check_radius(parameter: &'static str, value: f64) -> OrbitResult<()> {
    check_finite(parameter, value)?;
    if value <= PHOTON_SPHERE_RADIUS {
        return Err(OrbitError::out_of_domain(
            parameter,
            value,
            format!("must exceed the photon sphere radius {PHOTON_SPHERE_RADIUS}"),
        ));
    }
    if value >= ESCAPE_RADIUS {
        return Err(OrbitError::out_of_domain(
            parameter,
            value,
            format!("must be below the escape radius {ESCAPE_RADIUS:e}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_defaults_match_reference_orbit() {
        let p = OrbitParameters::builder().build();
        assert!(p.is_ok());
        if let Ok(p) = p {
            assert_eq!(p.initial_radius(), 50.0);
            assert_eq!(p.max_steps(), 4286);
            assert_eq!(p.initial_velocity(), 0.0);
            assert_eq!(p.initial_angle(), 0.0);
            assert_eq!(p.metric(), Metric::Schwarzschild);
            let lc = 50.0 / 47.0_f64.sqrt();
            assert!((p.circular_angular_momentum() - lc).abs() < EPSILON);
            assert!((p.angular_momentum() - 0.75 * lc).abs() < EPSILON);
            assert!((p.characteristic_time() - TAU * 2500.0 / lc).abs() < 1e-9);
            assert!((p.dtau() - p.characteristic_time() / 1000.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_from_slider_units() {
        let p = OrbitParameters::from_slider_units(50.0, 7500, 1000, 4286);
        let q = OrbitParameters::new(50.0, 0.75, 1000.0, 4286);
        assert!(p.is_ok());
        assert_eq!(p.ok(), q.ok());
    }

    #[test]
    fn test_rejects_photon_sphere() {
        for r0 in [3.0, 2.5, 0.0, -4.0] {
            let err = OrbitParameters::new(r0, 0.75, 1000.0, 100);
            assert!(
                matches!(err, Err(OrbitError::OutOfDomain { parameter: "initial_radius", .. })),
                "r0 = {r0} accepted"
            );
        }
    }

    #[test]
    fn test_rejects_escape_radius() {
        assert!(OrbitParameters::new(1e6, 0.75, 1000.0, 100).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(OrbitParameters::new(f64::NAN, 0.75, 1000.0, 100).is_err());
        assert!(OrbitParameters::new(50.0, f64::INFINITY, 1000.0, 100).is_err());
        assert!(OrbitParameters::builder().initial_velocity(f64::NAN).build().is_err());
        assert!(OrbitParameters::builder().initial_angle(f64::NEG_INFINITY).build().is_err());
    }

    #[test]
    fn test_rejects_non_positive_factors() {
        assert!(OrbitParameters::new(50.0, 0.0, 1000.0, 100).is_err());
        assert!(OrbitParameters::new(50.0, -0.5, 1000.0, 100).is_err());
        assert!(OrbitParameters::new(50.0, 0.75, 0.0, 100).is_err());
    }

    #[test]
    fn test_rejects_zero_steps() {
        let err = OrbitParameters::new(50.0, 0.75, 1000.0, 0);
        assert!(matches!(err, Err(OrbitError::OutOfDomain { parameter: "max_steps", .. })));
    }

    #[test]
    fn test_reference_radius() {
        let p = OrbitParameters::builder()
            .initial_radius(4.0)
            .reference_radius(50.0)
            .build();
        assert!(p.is_ok());
        if let Ok(p) = p {
            assert_eq!(p.reference_radius(), 50.0);
            assert!((p.circular_angular_momentum() - 50.0 / 47.0_f64.sqrt()).abs() < EPSILON);
        }
        assert!(OrbitParameters::builder().reference_radius(3.0).build().is_err());
    }

    #[test]
    fn test_to_builder_roundtrip() {
        let p = OrbitParameters::new(30.0, 0.9, 500.0, 1234);
        assert!(p.is_ok());
        if let Ok(p) = p {
            assert_eq!(p.to_builder().build().ok(), Some(p));
        }
    }

    #[test]
    fn test_tau_in_characteristic_units() {
        let p = OrbitParameters::new(50.0, 0.75, 1000.0, 4286);
        assert!(p.is_ok());
        if let Ok(p) = p {
            assert!((p.tau_in_characteristic_units(4286) - 4.286).abs() < EPSILON);
            assert_eq!(p.tau_in_characteristic_units(0), 0.0);
        }
    }

    #[test]
    fn test_domain_contains_defaults() {
        assert!(domain::INITIAL_RADIUS.contains(&DEFAULT_INITIAL_RADIUS));
        assert!(domain::ANGULAR_MOMENTUM_FACTOR.contains(&DEFAULT_ANGULAR_MOMENTUM_FACTOR));
        assert!(domain::TIME_RESOLUTION.contains(&DEFAULT_TIME_RESOLUTION));
        assert!(domain::MAX_STEPS.contains(&DEFAULT_MAX_STEPS));
    }
}
