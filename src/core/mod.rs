//! Core simulation types for the ideal gas.
//!
//! [`Particle`] is the leaf entity, [`CollisionEngine`] holds the stateless wall and
//! pair collision rules, and [`Container`] owns the particles and runs the frame loop.
//! [`SpeedHistogram`] is a read-only consumer of particle speeds.

pub mod container;
pub mod histogram;
pub mod particle;
pub mod physics;

pub use container::Container;
pub use histogram::SpeedHistogram;
pub use particle::{Color, Particle, Vec2, DIM};
pub use physics::{Bounds, CollisionEngine, Wall};
