//! Pre-built orbit scenarios.
//!
//! Canonical demonstrations around a Schwarzschild black hole:
//! - the default precessing ellipse (r₀ = 50, l = 0.75·l_c)
//! - a circular orbit at l = l_c
//! - a plunge that crosses the horizon
//! - a wide, nearly Newtonian orbit with small precession
//! - the same default ellipse under Newtonian gravity (no precession)

use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, OrbitResult};
use crate::orbit::params::{
    OrbitParameters, DEFAULT_ANGULAR_MOMENTUM_FACTOR, DEFAULT_INITIAL_RADIUS, DEFAULT_MAX_STEPS,
    DEFAULT_TIME_RESOLUTION,
};
use crate::orbit::physics::Metric;

/// Named scenario presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrbitScenario {
    /// Eccentric orbit with large perihelion advance.
    Precessing,
    /// Circular orbit outside the ISCO.
    Circular,
    /// Low angular momentum close in: falls through the horizon.
    Capture,
    /// Wide orbit where the relativistic correction is small.
    NearNewtonian,
    /// Default orbit integrated without the relativistic term.
    Newtonian,
}

impl OrbitScenario {
    /// Every preset, in display order.
    pub const ALL: [Self; 5] = [
        Self::Precessing,
        Self::Circular,
        Self::Capture,
        Self::NearNewtonian,
        Self::Newtonian,
    ];

    /// Command-line name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Precessing => "precessing",
            Self::Circular => "circular",
            Self::Capture => "capture",
            Self::NearNewtonian => "near-newtonian",
            Self::Newtonian => "newtonian",
        }
    }

    /// One-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Precessing => "r0 = 50, l = 0.75 lc: eccentric orbit, perihelion advances ~50 deg per pass",
            Self::Circular => "r0 = 20, l = lc: circular orbit, no perihelion",
            Self::Capture => "r0 = 4, l = 0.5 lc: plunges through the horizon",
            Self::NearNewtonian => "r0 = 90, l = 0.9 lc: wide orbit, small precession",
            Self::Newtonian => "r0 = 50, l = 0.75 lc without the GR term: closed ellipse",
        }
    }

    /// Look a preset up by name.
    ///
    /// # Errors
    ///
    /// Returns `OrbitError::Config` for an unknown name.
    pub fn from_name(name: &str) -> OrbitResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| OrbitError::config(format!("unknown scenario '{name}'")))
    }

    /// Build the parameters for this preset.
    ///
    /// # Errors
    ///
    /// Propagates parameter validation; the presets themselves are valid.
    pub fn parameters(self) -> OrbitResult<OrbitParameters> {
        let builder = OrbitParameters::builder()
            .time_resolution(DEFAULT_TIME_RESOLUTION)
            .max_steps(DEFAULT_MAX_STEPS);

        let builder = match self {
            Self::Precessing => builder
                .initial_radius(DEFAULT_INITIAL_RADIUS)
                .angular_momentum_factor(DEFAULT_ANGULAR_MOMENTUM_FACTOR),
            Self::Circular => builder.initial_radius(20.0).angular_momentum_factor(1.0),
            Self::Capture => builder
                .initial_radius(4.0)
                .angular_momentum_factor(0.5)
                .max_steps(10_000),
            Self::NearNewtonian => builder.initial_radius(90.0).angular_momentum_factor(0.9),
            Self::Newtonian => builder
                .initial_radius(DEFAULT_INITIAL_RADIUS)
                .angular_momentum_factor(DEFAULT_ANGULAR_MOMENTUM_FACTOR)
                .metric(Metric::Newtonian),
        };

        builder.build()
    }
}

impl std::fmt::Display for OrbitScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for OrbitScenario {
    type Err = OrbitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::builder::TrajectoryBuilder;
    use crate::orbit::trajectory::Termination;

    fn run(scenario: OrbitScenario) -> crate::orbit::trajectory::OrbitRun {
        match scenario.parameters() {
            Ok(p) => TrajectoryBuilder::new(&p).run(),
            Err(e) => panic!("{scenario}: {e}"),
        }
    }

    #[test]
    fn test_all_presets_build() {
        for scenario in OrbitScenario::ALL {
            assert!(scenario.parameters().is_ok(), "{scenario}");
            assert!(!scenario.description().is_empty());
        }
    }

    #[test]
    fn test_name_roundtrip() {
        for scenario in OrbitScenario::ALL {
            assert_eq!(OrbitScenario::from_name(scenario.name()).ok(), Some(scenario));
            assert_eq!(scenario.name().parse::<OrbitScenario>().ok(), Some(scenario));
        }
        assert!(OrbitScenario::from_name("kepler").is_err());
    }

    #[test]
    fn test_precessing_preset() {
        let r = run(OrbitScenario::Precessing);
        assert_eq!(r.termination(), Termination::Completed);
        assert!(r.mean_precession_degrees() > 40.0);
    }

    #[test]
    fn test_circular_preset() {
        let r = run(OrbitScenario::Circular);
        assert!(r.perihelia().is_empty());
        assert!(r.samples().iter().all(|s| (s.r - 20.0).abs() < 1e-6));
    }

    #[test]
    fn test_capture_preset() {
        let r = run(OrbitScenario::Capture);
        assert!(matches!(r.termination(), Termination::Captured { .. }));
        assert!(r.samples().len() < 10_001);
    }

    #[test]
    fn test_precession_ordering() {
        let strong = run(OrbitScenario::Precessing).mean_precession_degrees();
        let weak = run(OrbitScenario::NearNewtonian).mean_precession_degrees();
        let none = run(OrbitScenario::Newtonian).mean_precession_degrees();
        assert!(strong > weak);
        assert!(weak > 5.0);
        assert!(none.abs() < 0.5);
    }

    #[test]
    fn test_scenario_serde_names() {
        let json = serde_json::to_string(&OrbitScenario::NearNewtonian);
        assert_eq!(json.ok().as_deref(), Some("\"near-newtonian\""));
    }
}
