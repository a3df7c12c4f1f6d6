//! # schwarzschild
//!
//! Relativistic orbits around a Schwarzschild black hole.
//!
//! Integrates the equatorial geodesic equation of a test particle with a
//! fixed-step RK4 scheme, detects perihelion passages, and estimates the
//! mean perihelion precession per radial period.
//!
//! ## Example
//!
//! ```rust
//! use schwarzschild::prelude::*;
//!
//! let config = OrbitConfig::builder()
//!     .initial_radius(50.0)
//!     .angular_momentum_factor(0.75)
//!     .build();
//! config.check()?;
//!
//! let run = run_orbit(&config.to_parameters()?);
//! println!("mean precession: {:.2} deg", run.mean_precession_degrees());
//! # Ok::<(), OrbitError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::many_single_char_names,
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::float_cmp))]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod orbit;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{OrbitConfig, OrbitConfigBuilder};
    pub use crate::error::{OrbitError, OrbitResult};
    pub use crate::orbit::prelude::*;
}

/// Re-export for public API
pub use error::{OrbitError, OrbitResult};
pub use orbit::run_orbit;
