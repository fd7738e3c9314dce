use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// A 2D real-valued vector `[x, y]`.
pub type Vec2 = [f64; DIM];

/// Opaque display tag carried by every particle.
///
/// The physics never reads it; renderers draw with it and histograms group by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    /// Build a tag from 8-bit channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::rgb(r, g, b)
    }
}

/// A rigid circular gas particle.
///
/// Invariants enforced at construction:
/// - `radius` finite and > 0
/// - `mass` finite and > 0
/// - position and velocity finite
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Particle {
    position: Vec2,
    velocity: Vec2,
    color: Color,
    radius: f64,
    mass: f64,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` or `mass` is non-positive or any component is NaN/inf.
    pub fn new(position: Vec2, velocity: Vec2, color: Color, radius: f64, mass: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !position.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !velocity.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            position,
            velocity,
            color,
            radius,
            mass,
        })
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Euclidean norm of the velocity.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity[0].hypot(self.velocity[1])
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let vsq: f64 = self.velocity.iter().map(|&c| c * c).sum();
        0.5 * self.mass * vsq
    }

    /// Linear momentum m * v.
    #[inline]
    pub fn momentum(&self) -> Vec2 {
        self.velocity.map(|c| self.mass * c)
    }

    /// Replace the velocity. Any vector is accepted, including zero.
    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Move the particle by one frame of its current velocity (explicit Euler, dt = 1).
    #[inline]
    pub fn advance(&mut self) {
        for (r, v) in self.position.iter_mut().zip(self.velocity) {
            *r += v;
        }
    }

    /// Grow (`increase`) or shrink each non-zero velocity component's magnitude by the
    /// matching component of `delta`, keeping the component's sign.
    ///
    /// Zero components stay zero. There is no floor: shrinking by more than the current
    /// magnitude flips the component's sign.
    pub fn adjust_speed(&mut self, delta: Vec2, increase: bool) {
        let step = if increase { 1.0 } else { -1.0 };
        for (v, d) in self.velocity.iter_mut().zip(delta) {
            if *v > 0.0 {
                *v += step * d;
            } else if *v < 0.0 {
                *v -= step * d;
            }
        }
    }

    /// Confine the centre to `[min, max]` per axis. Returns true if anything moved.
    pub(crate) fn clamp_position(&mut self, min: Vec2, max: Vec2) -> bool {
        let mut clamped = false;
        for ((r, lo), hi) in self.position.iter_mut().zip(min).zip(max) {
            if *r < lo {
                *r = lo;
                clamped = true;
            } else if *r > hi {
                *r = hi;
                clamped = true;
            }
        }
        clamped
    }
}
