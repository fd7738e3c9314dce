//! Frame-stepped 2D ideal gas of rigid discs in a rectangular box.
//!
//! Each frame reflects particles off the walls they are moving into, resolves every
//! closing pair of overlapping discs with a mass-weighted elastic collision, then moves
//! every particle by its velocity.
//!
//! ```
//! use idealgas::config::ContainerConfig;
//! use idealgas::core::{Bounds, Color, Container, Particle};
//!
//! # fn main() -> idealgas::error::Result<()> {
//! let bounds = Bounds::new([0.0, 0.0], [100.0, 100.0])?;
//! let a = Particle::new([20.0, 20.0], [1.0, 0.0], Color::ORANGE, 10.0, 1.0)?;
//! let b = Particle::new([30.0, 20.0], [-1.0, 0.0], Color::ORANGE, 10.0, 1.0)?;
//! let mut gas = Container::new(ContainerConfig::new(bounds), vec![a, b])?;
//! gas.advance_one_frame();
//! assert_eq!(gas.particles()[0].position(), [19.0, 20.0]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::core::{Bounds, CollisionEngine, Color, Container, Particle, SpeedHistogram};
pub use crate::error::{Error, Result};
