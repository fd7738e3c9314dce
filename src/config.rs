//! Configuration types for building a gas container.
//!
//! The physics core never hardcodes geometry or demo particles; drivers build a
//! [`ContainerConfig`] (or take the [`DemoConfig`] preset) and hand it to the container.

use crate::core::particle::{Color, Particle, Vec2};
use crate::core::physics::Bounds;
use crate::core::Container;
use crate::error::{Error, Result};
use std::f64::consts::FRAC_1_SQRT_2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default fraction of the radius used as the per-axis random velocity range.
pub const DEFAULT_VELOCITY_REDUCTION_FACTOR: f64 = 0.7;

/// Container geometry plus the defaults used for randomly synthesised particles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerConfig {
    /// Container rectangle.
    pub bounds: Bounds,
    /// Radius given to random particles (> 0).
    pub default_radius: f64,
    /// Mass given to random particles (> 0).
    pub default_mass: f64,
    /// Display tag given to random particles.
    pub default_color: Color,
    /// Random velocity components are drawn from `[-f * radius, f * radius]`.
    ///
    /// Must lie in `[0, 1/sqrt(2)]` so that random speeds never exceed the radius.
    pub velocity_reduction_factor: f64,
}

impl ContainerConfig {
    /// Config for `bounds` with unit radius and mass.
    #[must_use]
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            default_radius: 1.0,
            default_mass: 1.0,
            default_color: Color::default(),
            velocity_reduction_factor: DEFAULT_VELOCITY_REDUCTION_FACTOR,
        }
    }

    /// Set the radius of random particles.
    #[must_use]
    pub fn radius(mut self, radius: f64) -> Self {
        self.default_radius = radius;
        self
    }

    /// Set the mass of random particles.
    #[must_use]
    pub fn mass(mut self, mass: f64) -> Self {
        self.default_mass = mass;
        self
    }

    /// Set the display tag of random particles.
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    /// Set the random velocity range as a fraction of the radius.
    #[must_use]
    pub fn velocity_reduction_factor(mut self, factor: f64) -> Self {
        self.velocity_reduction_factor = factor;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.default_radius.is_finite() || self.default_radius <= 0.0 {
            return Err(Error::InvalidParam(
                "default radius must be finite and > 0".into(),
            ));
        }
        if !self.default_mass.is_finite() || self.default_mass <= 0.0 {
            return Err(Error::InvalidParam("default mass must be finite and > 0".into()));
        }
        let f = self.velocity_reduction_factor;
        if !f.is_finite() || !(0.0..=FRAC_1_SQRT_2).contains(&f) {
            return Err(Error::InvalidParam(format!(
                "velocity reduction factor {f} must lie in [0, 1/sqrt(2)]"
            )));
        }
        Ok(())
    }
}

/// Speed histogram settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistogramConfig {
    /// Width of each speed bin (> 0).
    pub bin_width: f64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self { bin_width: 1.0 }
    }
}

/// A particle the driver appends on an "add" input.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticleTemplate {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    pub radius: f64,
    pub mass: f64,
}

impl ParticleTemplate {
    /// Instantiate a fresh particle from the template.
    pub fn spawn(&self) -> Result<Particle> {
        Particle::new(self.position, self.velocity, self.color, self.radius, self.mass)
    }
}

/// Interactive demo preset: a 500x500 box, three particle species and their histograms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DemoConfig {
    pub container: ContainerConfig,
    /// Particles placed in the container at start-up, in insertion order.
    pub initial: Vec<ParticleTemplate>,
    /// Number of random particles synthesised at start-up.
    pub random_count: usize,
    /// Per-axis delta applied on a global speed-up/slow-down input.
    pub speed_delta: Vec2,
    pub histogram: HistogramConfig,
}

impl DemoConfig {
    /// The reference demo: orange, white and blue species launched from one corner.
    pub fn reference() -> Result<Self> {
        let bounds = Bounds::new([100.0, 100.0], [600.0, 600.0])?;
        let species = |velocity: Vec2, color: Color, radius: f64, mass: f64| ParticleTemplate {
            position: [550.0, 550.0],
            velocity,
            color,
            radius,
            mass,
        };
        Ok(Self {
            container: ContainerConfig::new(bounds)
                .radius(3.0)
                .mass(1.0)
                .color(Color::ORANGE),
            initial: vec![
                species([-1.0, -1.5], Color::ORANGE, 9.0, 11.0),
                species([-2.0, -2.0], Color::WHITE, 6.0, 8.0),
                species([-3.0, -1.0], Color::BLUE, 3.0, 5.0),
            ],
            random_count: 0,
            speed_delta: [1.0, 1.0],
            histogram: HistogramConfig::default(),
        })
    }

    /// Template for the species tagged `color`, if the demo has one.
    pub fn template(&self, color: Color) -> Option<&ParticleTemplate> {
        self.initial.iter().find(|t| t.color == color)
    }

    /// Display tags of the demo species, in insertion order.
    pub fn colors(&self) -> Vec<Color> {
        self.initial.iter().map(|t| t.color).collect()
    }

    /// Build the demo container with a nondeterministic RNG, or seeded if `seed` is given.
    pub fn build_container(&self, seed: Option<u64>) -> Result<Container> {
        let initial = self
            .initial
            .iter()
            .map(ParticleTemplate::spawn)
            .collect::<Result<Vec<_>>>()?;
        Container::seeded(self.container.clone(), initial, self.random_count, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Result<Bounds> {
        Bounds::new([0.0, 0.0], [100.0, 100.0])
    }

    #[test]
    fn builder_sets_fields() -> Result<()> {
        let cfg = ContainerConfig::new(bounds()?)
            .radius(10.0)
            .mass(2.0)
            .color(Color::BLUE)
            .velocity_reduction_factor(0.5);
        assert_eq!(cfg.default_radius, 10.0);
        assert_eq!(cfg.default_mass, 2.0);
        assert_eq!(cfg.default_color, Color::BLUE);
        assert_eq!(cfg.velocity_reduction_factor, 0.5);
        cfg.validate()
    }

    #[test]
    fn validate_rejects_bad_defaults() -> Result<()> {
        assert!(ContainerConfig::new(bounds()?).radius(0.0).validate().is_err());
        assert!(ContainerConfig::new(bounds()?).mass(f64::NAN).validate().is_err());
        let err = ContainerConfig::new(bounds()?)
            .velocity_reduction_factor(0.9)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("velocity reduction factor"));
        Ok(())
    }

    #[test]
    fn reference_demo_has_three_species() -> Result<()> {
        let demo = DemoConfig::reference()?;
        assert_eq!(demo.colors(), vec![Color::ORANGE, Color::WHITE, Color::BLUE]);
        let blue = demo.template(Color::BLUE).map(|t| (t.radius, t.mass));
        assert_eq!(blue, Some((3.0, 5.0)));
        assert!(demo.template(Color::rgb(1, 2, 3)).is_none());
        demo.container.validate()
    }

    #[test]
    fn demo_container_holds_initial_particles() -> Result<()> {
        let demo = DemoConfig::reference()?;
        let container = demo.build_container(Some(9))?;
        assert_eq!(container.len(), 3);
        assert_eq!(container.particles()[1].color(), Color::WHITE);
        Ok(())
    }
}
