//! Run configuration with YAML schema and validation.
//!
//! Mistake-proofing happens in three layers:
//! - typed structs with `deny_unknown_fields`
//! - `validator` range checks on the interactive parameter domains
//! - semantic checks that need more than one field

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{OrbitError, OrbitResult};
use crate::logging::DEFAULT_LEVEL;
use crate::orbit::events::PeriodDetectionConfig;
use crate::orbit::jidoka::OrbitJidokaConfig;
use crate::orbit::params::{
    OrbitParameters, DEFAULT_ANGULAR_MOMENTUM_FACTOR, DEFAULT_INITIAL_RADIUS, DEFAULT_MAX_STEPS,
    DEFAULT_TIME_RESOLUTION,
};
use crate::orbit::physics::Metric;
use crate::orbit::units::PHOTON_SPHERE_RADIUS;

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OrbitConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Initial condition and integration settings.
    #[validate(nested)]
    #[serde(default)]
    pub orbit: OrbitSection,

    /// Advisory return detection.
    #[validate(nested)]
    #[serde(default)]
    pub period_detection: PeriodDetectionSection,

    /// Run-health guard.
    #[serde(default)]
    pub jidoka: OrbitJidokaConfig,

    /// Log output.
    #[validate(nested)]
    #[serde(default)]
    pub logging: LoggingSection,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl OrbitConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> OrbitResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> OrbitResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize back to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> OrbitResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> OrbitConfigBuilder {
        OrbitConfigBuilder::default()
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns `OrbitError::Validation` for range violations,
    /// `OrbitError::NonFiniteValue` for a NaN or infinite initial velocity or
    /// angle, and `OrbitError::Config` for other semantic ones.
    pub fn check(&self) -> OrbitResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    fn validate_semantic(&self) -> OrbitResult<()> {
        if let Some(r_ref) = self.orbit.reference_radius {
            if !(r_ref.is_finite() && r_ref > PHOTON_SPHERE_RADIUS) {
                return Err(OrbitError::config(format!(
                    "reference_radius must exceed {PHOTON_SPHERE_RADIUS}, got {r_ref}"
                )));
            }
        }

        for (location, value) in [
            ("orbit.initial_velocity", self.orbit.initial_velocity),
            ("orbit.initial_angle", self.orbit.initial_angle),
        ] {
            if !value.is_finite() {
                return Err(OrbitError::NonFiniteValue {
                    location: location.to_string(),
                });
            }
        }

        if self.period_detection.tolerance_phi > std::f64::consts::PI {
            return Err(OrbitError::config(
                "period_detection.tolerance_phi cannot exceed pi",
            ));
        }

        let jidoka = &self.jidoka;
        if jidoka.energy_tolerance <= 0.0 || jidoka.angular_momentum_tolerance <= 0.0 {
            return Err(OrbitError::config("Jidoka tolerances must be positive"));
        }

        Ok(())
    }

    /// Validated orbit parameters for this configuration.
    ///
    /// # Errors
    ///
    /// Propagates `OrbitParameters` domain errors.
    pub fn to_parameters(&self) -> OrbitResult<OrbitParameters> {
        let orbit = &self.orbit;
        let mut builder = OrbitParameters::builder()
            .initial_radius(orbit.initial_radius)
            .initial_velocity(orbit.initial_velocity)
            .initial_angle(orbit.initial_angle)
            .angular_momentum_factor(orbit.angular_momentum_factor)
            .time_resolution(orbit.time_resolution)
            .max_steps(orbit.max_steps)
            .metric(orbit.metric);
        if let Some(r_ref) = orbit.reference_radius {
            builder = builder.reference_radius(r_ref);
        }
        builder.build()
    }

    /// Return detection settings, if enabled.
    #[must_use]
    pub fn period_detection(&self) -> Option<PeriodDetectionConfig> {
        self.period_detection
            .enabled
            .then(|| self.period_detection.thresholds())
    }
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            orbit: OrbitSection::default(),
            period_detection: PeriodDetectionSection::default(),
            jidoka: OrbitJidokaConfig::default(),
            logging: LoggingSection::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct OrbitConfigBuilder {
    initial_radius: Option<f64>,
    angular_momentum_factor: Option<f64>,
    time_resolution: Option<f64>,
    max_steps: Option<usize>,
    metric: Option<Metric>,
    period_detection: Option<bool>,
    log_level: Option<String>,
}

impl OrbitConfigBuilder {
    /// Set r₀.
    #[must_use]
    pub const fn initial_radius(mut self, r0: f64) -> Self {
        self.initial_radius = Some(r0);
        self
    }

    /// Set the angular-momentum factor.
    #[must_use]
    pub const fn angular_momentum_factor(mut self, factor: f64) -> Self {
        self.angular_momentum_factor = Some(factor);
        self
    }

    /// Set the time resolution.
    #[must_use]
    pub const fn time_resolution(mut self, resolution: f64) -> Self {
        self.time_resolution = Some(resolution);
        self
    }

    /// Set the step budget.
    #[must_use]
    pub const fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Set the dynamics model.
    #[must_use]
    pub const fn metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Enable or disable return detection.
    #[must_use]
    pub const fn period_detection(mut self, enabled: bool) -> Self {
        self.period_detection = Some(enabled);
        self
    }

    /// Set the default log level.
    #[must_use]
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Build the configuration. Call [`OrbitConfig::check`] to validate it.
    #[must_use]
    pub fn build(self) -> OrbitConfig {
        self.apply(OrbitConfig::default())
    }

    /// Apply only the values that were set on top of `config`.
    #[must_use]
    pub fn apply(self, mut config: OrbitConfig) -> OrbitConfig {
        if let Some(r0) = self.initial_radius {
            config.orbit.initial_radius = r0;
        }
        if let Some(factor) = self.angular_momentum_factor {
            config.orbit.angular_momentum_factor = factor;
        }
        if let Some(resolution) = self.time_resolution {
            config.orbit.time_resolution = resolution;
        }
        if let Some(steps) = self.max_steps {
            config.orbit.max_steps = steps;
        }
        if let Some(metric) = self.metric {
            config.orbit.metric = metric;
        }
        if let Some(enabled) = self.period_detection {
            config.period_detection.enabled = enabled;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        config
    }
}

/// Initial condition and integration settings.
///
/// Ranges match `orbit::params::domain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OrbitSection {
    /// Initial radius r₀ (GM).
    #[validate(range(min = 4.0, max = 90.0))]
    #[serde(default = "default_initial_radius")]
    pub initial_radius: f64,

    /// Initial radial velocity.
    #[serde(default)]
    pub initial_velocity: f64,

    /// Initial angle in radians.
    #[serde(default)]
    pub initial_angle: f64,

    /// Fraction of the circular angular momentum.
    #[validate(range(min = 0.5, max = 1.2))]
    #[serde(default = "default_angular_momentum_factor")]
    pub angular_momentum_factor: f64,

    /// Steps per characteristic time.
    #[validate(range(min = 100.0, max = 2000.0))]
    #[serde(default = "default_time_resolution")]
    pub time_resolution: f64,

    /// Step budget.
    #[validate(range(min = 10, max = 10_000))]
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Radius used for l_c and τ_c; r₀ when absent.
    #[serde(default)]
    pub reference_radius: Option<f64>,

    /// Dynamics model.
    #[serde(default)]
    pub metric: Metric,
}

const fn default_initial_radius() -> f64 {
    DEFAULT_INITIAL_RADIUS
}

const fn default_angular_momentum_factor() -> f64 {
    DEFAULT_ANGULAR_MOMENTUM_FACTOR
}

const fn default_time_resolution() -> f64 {
    DEFAULT_TIME_RESOLUTION
}

const fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

impl Default for OrbitSection {
    fn default() -> Self {
        Self {
            initial_radius: default_initial_radius(),
            initial_velocity: 0.0,
            initial_angle: 0.0,
            angular_momentum_factor: default_angular_momentum_factor(),
            time_resolution: default_time_resolution(),
            max_steps: default_max_steps(),
            reference_radius: None,
            metric: Metric::default(),
        }
    }
}

/// Return detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PeriodDetectionSection {
    /// Enable return detection.
    #[serde(default)]
    pub enabled: bool,

    /// Minimum steps between two reported returns.
    #[validate(range(min = 1))]
    #[serde(default = "default_min_separation")]
    pub min_separation: usize,

    /// Radius tolerance.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_tolerance_r")]
    pub tolerance_r: f64,

    /// Radial velocity tolerance.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_tolerance_v")]
    pub tolerance_v: f64,

    /// Angular tolerance in radians.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_tolerance_phi")]
    pub tolerance_phi: f64,
}

fn default_min_separation() -> usize {
    PeriodDetectionConfig::default().min_separation
}

fn default_tolerance_r() -> f64 {
    PeriodDetectionConfig::default().tolerance_r
}

fn default_tolerance_v() -> f64 {
    PeriodDetectionConfig::default().tolerance_v
}

fn default_tolerance_phi() -> f64 {
    PeriodDetectionConfig::default().tolerance_phi
}

impl PeriodDetectionSection {
    /// Detector thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> PeriodDetectionConfig {
        PeriodDetectionConfig {
            min_separation: self.min_separation,
            tolerance_r: self.tolerance_r,
            tolerance_v: self.tolerance_v,
            tolerance_phi: self.tolerance_phi,
        }
    }
}

impl Default for PeriodDetectionSection {
    fn default() -> Self {
        Self {
            enabled: false,
            min_separation: default_min_separation(),
            tolerance_r: default_tolerance_r(),
            tolerance_v: default_tolerance_v(),
            tolerance_phi: default_tolerance_phi(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Filter directive used when no environment override is set.
    #[validate(length(min = 1))]
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    DEFAULT_LEVEL.to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
