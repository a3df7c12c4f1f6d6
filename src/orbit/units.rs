//! Geometric units and angle handling (Poka-Yoke).
//!
//! All lengths and proper times are expressed in geometric units with
//! G = M = 1, so a radius of 2 is the event horizon. Angles are wrapped in
//! [`OrbitAngle`], a newtype over the `uom` angle quantity, so radians and
//! degrees cannot be mixed by accident.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use uom::si::angle::{degree, radian};
use uom::si::f64::Angle;

/// Schwarzschild radius (event horizon) in units of GM/c².
pub const HORIZON_RADIUS: f64 = 2.0;

/// Photon sphere radius; circular orbits require r > 3.
pub const PHOTON_SPHERE_RADIUS: f64 = 3.0;

/// Radius beyond which the orbiter is treated as escaped.
pub const ESCAPE_RADIUS: f64 = 1.0e6;

/// Full turn in degrees.
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Check whether a radius lies in the open interval (horizon, escape).
///
/// NaN is never inside the domain.
#[must_use]
pub fn in_valid_domain(r: f64) -> bool {
    r > HORIZON_RADIUS && r < ESCAPE_RADIUS
}

/// Type-safe azimuthal angle.
///
/// The wrapped value is unbounded: integration accumulates φ across turns
/// and only the display conversion wraps it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct OrbitAngle(pub Angle);

impl OrbitAngle {
    /// Create from radians.
    #[must_use]
    pub fn from_radians(rad: f64) -> Self {
        Self(Angle::new::<radian>(rad))
    }

    /// Get value in radians.
    #[must_use]
    pub fn as_radians(&self) -> f64 {
        self.0.get::<radian>()
    }

    /// Get value in degrees (unwrapped).
    #[must_use]
    pub fn as_degrees(&self) -> f64 {
        self.0.get::<degree>()
    }

    /// Degrees wrapped into [0, 360) for tables and plots.
    #[must_use]
    pub fn as_display_degrees(&self) -> f64 {
        let wrapped = self.as_degrees().rem_euclid(FULL_TURN_DEGREES);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if wrapped >= FULL_TURN_DEGREES {
            0.0
        } else {
            wrapped
        }
    }
}

/// Shortest signed difference `a - b` modulo 2π, in (-π, π].
#[must_use]
pub fn shortest_angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Convert radians to display degrees in [0, 360).
#[must_use]
pub fn display_degrees(rad: f64) -> f64 {
    OrbitAngle::from_radians(rad).as_display_degrees()
}
