//! Collision detection and response for discs in an axis-aligned box.
//!
//! The engine is stateless apart from the container bounds: every call receives the
//! particles it must examine and mutates velocities in place. Positions are never
//! touched here; integration belongs to the container.

use crate::core::particle::{Particle, Vec2, DIM};
use crate::error::{Error, Result};
use tracing::{trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Squared centre distance below which two discs have no usable contact normal.
const EPS_DIST_SQ: f64 = 1e-12;

/// Axis-aligned container rectangle in screen coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    top_left: Vec2,
    bottom_right: Vec2,
}

impl Bounds {
    /// Create bounds from the top-left and bottom-right corners.
    ///
    /// Errors: `Error::InvalidParam` if a corner is not finite or the rectangle has no area.
    pub fn new(top_left: Vec2, bottom_right: Vec2) -> Result<Self> {
        if !top_left.iter().chain(bottom_right.iter()).all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("bounds corners must be finite".into()));
        }
        if top_left[0] >= bottom_right[0] || top_left[1] >= bottom_right[1] {
            return Err(Error::InvalidParam(format!(
                "top-left corner {top_left:?} must lie strictly above and left of bottom-right corner {bottom_right:?}"
            )));
        }
        Ok(Self {
            top_left,
            bottom_right,
        })
    }

    #[inline]
    pub fn top_left(&self) -> Vec2 {
        self.top_left
    }

    #[inline]
    pub fn bottom_right(&self) -> Vec2 {
        self.bottom_right
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.top_left[0]
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.bottom_right[0]
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.top_left[1]
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.bottom_right[1]
    }

    pub fn width(&self) -> f64 {
        self.right() - self.left()
    }

    pub fn height(&self) -> f64 {
        self.bottom() - self.top()
    }

    /// True if `point` lies inside or exactly on the rectangle.
    pub fn contains(&self, point: Vec2) -> bool {
        (0..DIM).all(|k| point[k] >= self.top_left[k] && point[k] <= self.bottom_right[k])
    }
}

/// One of the four container walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wall {
    Top,
    Bottom,
    Left,
    Right,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::Top, Wall::Bottom, Wall::Left, Wall::Right];

    /// Velocity axis reflected by this wall.
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            Wall::Left | Wall::Right => 0,
            Wall::Top | Wall::Bottom => 1,
        }
    }
}

/// Pure collision logic parameterised by the container bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEngine {
    bounds: Bounds,
}

impl CollisionEngine {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// True if the disc's edge has reached or passed `wall` and it is moving into it.
    ///
    /// A disc resting on a wall while moving away never collides with it.
    pub fn is_colliding_with_wall(&self, particle: &Particle, wall: Wall) -> bool {
        let [x, y] = particle.position();
        let [vx, vy] = particle.velocity();
        let r = particle.radius();
        match wall {
            Wall::Top => y - r <= self.bounds.top() && vy < 0.0,
            Wall::Bottom => y + r >= self.bounds.bottom() && vy > 0.0,
            Wall::Left => x - r <= self.bounds.left() && vx < 0.0,
            Wall::Right => x + r >= self.bounds.right() && vx > 0.0,
        }
    }

    pub fn is_colliding_with_top_wall(&self, particle: &Particle) -> bool {
        self.is_colliding_with_wall(particle, Wall::Top)
    }

    pub fn is_colliding_with_bottom_wall(&self, particle: &Particle) -> bool {
        self.is_colliding_with_wall(particle, Wall::Bottom)
    }

    pub fn is_colliding_with_left_wall(&self, particle: &Particle) -> bool {
        self.is_colliding_with_wall(particle, Wall::Left)
    }

    pub fn is_colliding_with_right_wall(&self, particle: &Particle) -> bool {
        self.is_colliding_with_wall(particle, Wall::Right)
    }

    /// Reflect `particle` off every wall it is colliding with.
    ///
    /// All four walls are tested against the velocity as it was on entry, and the
    /// combined result is written once, so a corner hit flips both components.
    /// Returns true if the velocity changed.
    pub fn reflect_off_walls(&self, particle: &mut Particle) -> bool {
        let mut v = particle.velocity();
        let mut hit = false;
        for wall in Wall::ALL {
            if self.is_colliding_with_wall(particle, wall) {
                v[wall.axis()] = -particle.velocity()[wall.axis()];
                hit = true;
            }
        }
        if hit {
            particle.set_velocity(v);
        }
        hit
    }

    /// True if the discs overlap (or touch) and their centres are closing.
    pub fn collides(&self, a: &Particle, b: &Particle) -> bool {
        let dp = sub(&a.position(), &b.position());
        let dv = sub(&a.velocity(), &b.velocity());
        let r_sum = a.radius() + b.radius();
        let touching = dot(&dp, &dp).sqrt() <= r_sum;
        let approaching = dot(&dv, &dp) < 0.0;
        touching && approaching
    }

    /// Apply the mass-weighted elastic collision response to both particles.
    ///
    /// Both new velocities are computed from the pre-collision state before either
    /// is written.
    ///
    /// Errors: `Error::MathError` if the centres coincide; velocities are left untouched.
    pub fn resolve(&self, a: &mut Particle, b: &mut Particle) -> Result<()> {
        let dp = sub(&a.position(), &b.position());
        let dist_sq = dot(&dp, &dp);
        if dist_sq <= EPS_DIST_SQ {
            return Err(Error::MathError(
                "degenerate contact normal: particle centres coincide".into(),
            ));
        }
        let (va, vb) = (a.velocity(), b.velocity());
        let dv = sub(&va, &vb);
        let (ma, mb) = (a.mass(), b.mass());

        // Projection of relative velocity on the line of centres; -dp flips both
        // operands for the second particle, so the scalar is shared.
        let proj = dot(&dv, &dp) / dist_sq;
        let fa = (2.0 * mb / (ma + mb)) * proj;
        let fb = (2.0 * ma / (ma + mb)) * proj;

        let mut va_new = va;
        let mut vb_new = vb;
        for k in 0..DIM {
            va_new[k] -= fa * dp[k];
            vb_new[k] += fb * dp[k];
        }
        a.set_velocity(va_new);
        b.set_velocity(vb_new);
        Ok(())
    }

    /// Wall phase over a whole particle set. Returns the number of reflected particles.
    pub fn resolve_wall_collisions(&self, particles: &mut [Particle]) -> usize {
        particles
            .iter_mut()
            .map(|p| self.reflect_off_walls(p))
            .filter(|&hit| hit)
            .count()
    }

    /// Pairwise phase: test and resolve every pair `(i, j)` with `i < j` in order.
    ///
    /// Resolution is sequential, so a pair resolved early changes the velocities seen
    /// by later pairs. Sets of fewer than two particles are a no-op. A closing pair whose
    /// centres coincide has no contact normal; it is skipped and left unchanged.
    /// Returns the number of resolved collisions.
    pub fn resolve_particle_collisions(&self, particles: &mut [Particle]) -> usize {
        let n = particles.len();
        let mut resolved = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = particles.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                if !self.collides(a, b) {
                    continue;
                }
                if let Err(e) = self.resolve(a, b) {
                    warn!(i, j, error = %e, "skipping particle collision");
                    continue;
                }
                trace!(i, j, "resolved particle collision");
                resolved += 1;
            }
        }
        resolved
    }
}

// ============ Utility helpers ============

#[inline]
fn dot(a: &Vec2, b: &Vec2) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline]
fn sub(a: &Vec2, b: &Vec2) -> Vec2 {
    let mut out = [0.0_f64; DIM];
    for ((o, &x), &y) in out.iter_mut().zip(a.iter()).zip(b.iter()) {
        *o = x - y;
    }
    out
}
