//! Equatorial geodesic dynamics and the fixed-step RK4 integrator.
//!
//! The radial equation of a massive test particle in the Schwarzschild
//! metric, written in proper time τ with G = M = 1:
//!
//! ```text
//! dr/dτ = v
//! dv/dτ = -1/r² + l²/r³ - 3l²/r⁴
//! dφ/dτ = l/r²
//! ```
//!
//! The last term of `dv/dτ` is the relativistic correction responsible for
//! perihelion precession. [`Metric::Newtonian`] drops it and serves as the
//! Kepler reference.
//!
//! # References
//!
//! [1] Hartle, "Gravity: An Introduction to Einstein's General Relativity," 2003, ch. 9.
//! [2] Hairer, Nørsett, Wanner, "Solving Ordinary Differential Equations I," 1993.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::orbit::units::PHOTON_SPHERE_RADIUS;

/// Instantaneous orbital state (r, v, φ).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    /// Radial coordinate.
    pub r: f64,
    /// Radial velocity dr/dτ.
    pub v: f64,
    /// Accumulated azimuthal angle in radians (never wrapped).
    pub phi: f64,
}

impl OrbitState {
    /// Create a new state.
    #[must_use]
    pub const fn new(r: f64, v: f64, phi: f64) -> Self {
        Self { r, v, phi }
    }

    /// Check if all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.v.is_finite() && self.phi.is_finite()
    }

    /// State displaced along `d` by `h`.
    fn offset(&self, d: &Derivatives, h: f64) -> Self {
        Self {
            r: self.r + h * d.dr,
            v: self.v + h * d.dv,
            phi: self.phi + h * d.dphi,
        }
    }
}

/// Time derivatives of an [`OrbitState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivatives {
    /// dr/dτ
    pub dr: f64,
    /// dv/dτ
    pub dv: f64,
    /// dφ/dτ
    pub dphi: f64,
}

/// Dynamics model for the radial equation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Schwarzschild geodesic (relativistic correction included).
    #[default]
    Schwarzschild,
    /// Newtonian two-body reference (no precession).
    Newtonian,
}

impl Metric {
    /// Derivatives of `state` for angular momentum `l`.
    ///
    /// Pure; undefined at r = 0, which callers must keep out of reach.
    #[must_use]
    pub fn derivatives(self, state: &OrbitState, l: f64) -> Derivatives {
        let r = state.r;
        let r2 = r * r;
        let r3 = r2 * r;
        let l2 = l * l;

        let mut dv = -1.0 / r2 + l2 / r3;
        if self == Self::Schwarzschild {
            dv -= 3.0 * l2 / (r3 * r);
        }

        Derivatives {
            dr: state.v,
            dv,
            dphi: l / r2,
        }
    }

    /// Effective potential V(r) such that dv/dτ = -dV/dr.
    #[must_use]
    pub fn effective_potential(self, r: f64, l: f64) -> f64 {
        let l2 = l * l;
        let newtonian = -1.0 / r + l2 / (2.0 * r * r);
        match self {
            Self::Schwarzschild => newtonian - l2 / (r * r * r),
            Self::Newtonian => newtonian,
        }
    }

    /// Specific energy ½v² + V(r), conserved along exact solutions.
    #[must_use]
    pub fn specific_energy(self, state: &OrbitState, l: f64) -> f64 {
        0.5 * state.v * state.v + self.effective_potential(state.r, l)
    }

    /// Check if the model predicts perihelion precession.
    #[must_use]
    pub const fn is_relativistic(self) -> bool {
        matches!(self, Self::Schwarzschild)
    }
}

/// Angular momentum of the circular orbit at radius `r`: l_c = r/√(r−3).
///
/// Returns `None` at or inside the photon sphere, where no circular orbit exists.
#[must_use]
pub fn circular_angular_momentum(r: f64) -> Option<f64> {
    if r.is_finite() && r > PHOTON_SPHERE_RADIUS {
        Some(r / (r - PHOTON_SPHERE_RADIUS).sqrt())
    } else {
        None
    }
}

/// Characteristic orbital time τ_c = 2πr²/l_c at radius `r`.
#[must_use]
pub fn characteristic_time(r: f64) -> Option<f64> {
    circular_angular_momentum(r).map(|lc| TAU * r * r / lc)
}

/// Classical 4th order Runge-Kutta integrator.
///
/// # Properties
///
/// - Order: 4
/// - Symplectic: No (energy drift is O(dτ⁴) per unit time)
/// - Deterministic: identical inputs give bit-identical outputs
#[derive(Debug, Clone, Copy, Default)]
pub struct Rk4Integrator {
    metric: Metric,
}

impl Rk4Integrator {
    /// Create an integrator for the given dynamics model.
    #[must_use]
    pub const fn new(metric: Metric) -> Self {
        Self { metric }
    }

    /// Dynamics model used by this integrator.
    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Advance `state` by one proper-time step `dtau`.
    ///
    /// Produces non-finite values if a stage lands on r = 0; bounding the
    /// state before the next call is the caller's job.
    #[must_use]
    pub fn step(&self, state: &OrbitState, dtau: f64, l: f64) -> OrbitState {
        let half = 0.5 * dtau;

        let k1 = self.metric.derivatives(state, l);
        let k2 = self.metric.derivatives(&state.offset(&k1, half), l);
        let k3 = self.metric.derivatives(&state.offset(&k2, half), l);
        let k4 = self.metric.derivatives(&state.offset(&k3, dtau), l);

        let w = dtau / 6.0;
        OrbitState {
            r: state.r + w * (k1.dr + 2.0 * k2.dr + 2.0 * k3.dr + k4.dr),
            v: state.v + w * (k1.dv + 2.0 * k2.dv + 2.0 * k3.dv + k4.dv),
            phi: state.phi + w * (k1.dphi + 2.0 * k2.dphi + 2.0 * k3.dphi + k4.dphi),
        }
    }

    /// Get integrator order.
    #[must_use]
    pub const fn order(&self) -> u32 {
        4
    }

    /// Check if integrator is symplectic.
    #[must_use]
    pub const fn is_symplectic(&self) -> bool {
        false
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// r² · dφ/dτ reproduces l for any state.
        #[test]
        fn prop_angular_rate_encodes_l(r in 2.1f64..1e4, v in -1.0f64..1.0, l in 0.1f64..20.0) {
            let d = Metric::Schwarzschild.derivatives(&OrbitState::new(r, v, 0.0), l);
            prop_assert!((d.dphi * r * r - l).abs() / l < 1e-12);
        }

        /// The relativistic term always pulls inward relative to Newton.
        #[test]
        fn prop_relativistic_term_attractive(r in 2.1f64..1e4, l in 0.1f64..20.0) {
            let s = OrbitState::new(r, 0.0, 0.0);
            let gr = Metric::Schwarzschild.derivatives(&s, l).dv;
            let newt = Metric::Newtonian.derivatives(&s, l).dv;
            prop_assert!(gr < newt);
        }

        /// One RK4 step is deterministic.
        #[test]
        fn prop_rk4_deterministic(r in 4.0f64..90.0, v in -0.1f64..0.1, dtau in 0.01f64..5.0) {
            let rk4 = Rk4Integrator::default();
            let s = OrbitState::new(r, v, 0.0);
            prop_assert_eq!(rk4.step(&s, dtau, 3.5), rk4.step(&s, dtau, 3.5));
        }
    }
}
