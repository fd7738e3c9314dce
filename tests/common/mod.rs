#![allow(dead_code)]

use idealgas::config::ContainerConfig;
use idealgas::core::{Bounds, Color, Container, Particle, Vec2};
use idealgas::error::Result;

pub const RADIUS: f64 = 10.0;
pub const MASS: f64 = 1.0;

/// 100x100 box with the origin at the top-left corner.
pub fn config() -> Result<ContainerConfig> {
    Ok(ContainerConfig::new(Bounds::new([0.0, 0.0], [100.0, 100.0])?)
        .radius(RADIUS)
        .mass(MASS)
        .color(Color::ORANGE))
}

pub fn disc(position: Vec2, velocity: Vec2) -> Result<Particle> {
    Particle::new(position, velocity, Color::ORANGE, RADIUS, MASS)
}

pub fn container(particles: Vec<Particle>) -> Result<Container> {
    Container::new(config()?, particles)
}
