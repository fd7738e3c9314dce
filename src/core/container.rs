use crate::config::ContainerConfig;
use crate::core::particle::{Color, Particle, Vec2, DIM};
use crate::core::physics::{Bounds, CollisionEngine};
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, warn};

/// A rectangular box of gas particles advanced one frame at a time.
///
/// Each frame runs three phases to completion:
/// 1. wall phase: every particle is reflected off the walls it is moving into;
/// 2. pairwise phase: every pair `(i, j)`, `i < j`, is tested and resolved in order;
/// 3. integration phase: every particle moves by its (possibly new) velocity.
#[derive(Debug)]
pub struct Container {
    config: ContainerConfig,
    engine: CollisionEngine,
    particles: Vec<Particle>,
    frame: u64,
}

impl Container {
    /// Create a container holding exactly `initial`, in order.
    pub fn new(config: ContainerConfig, initial: Vec<Particle>) -> Result<Self> {
        config.validate()?;
        let engine = CollisionEngine::new(config.bounds);
        debug!(
            particles = initial.len(),
            bounds = ?config.bounds,
            "created gas container"
        );
        Ok(Self {
            config,
            engine,
            particles: initial,
            frame: 0,
        })
    }

    /// Create a container with `random_count` synthesised particles followed by `initial`.
    pub fn with_random<R: Rng>(
        config: ContainerConfig,
        initial: Vec<Particle>,
        random_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let mut container = Self::new(config, Vec::with_capacity(random_count + initial.len()))?;
        container.add_random_particles(random_count, rng)?;
        container.particles.extend(initial);
        Ok(container)
    }

    /// Like [`Container::with_random`] with an owned RNG; `None` seeds nondeterministically.
    pub fn seeded(
        config: ContainerConfig,
        initial: Vec<Particle>,
        random_count: usize,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        Self::with_random(config, initial, random_count, &mut rng)
    }

    /// Number of frames advanced so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn bounds(&self) -> &Bounds {
        &self.config.bounds
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn engine(&self) -> &CollisionEngine {
        &self.engine
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// All particles in insertion order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particle at `index`.
    pub fn particle(&self, index: usize) -> Result<&Particle> {
        self.particles.get(index).ok_or_else(|| {
            Error::OutOfBounds(format!(
                "particle index {index} (len {})",
                self.particles.len()
            ))
        })
    }

    /// Particles tagged `color`, in insertion order.
    pub fn particles_by_color(&self, color: Color) -> Vec<&Particle> {
        self.particles.iter().filter(|p| p.color() == color).collect()
    }

    /// Append a particle; returns its index.
    pub fn add_particle(&mut self, particle: Particle) -> usize {
        self.particles.push(particle);
        let index = self.particles.len() - 1;
        debug!(index, color = ?self.particles[index].color(), "added particle");
        index
    }

    /// Remove every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Append `count` particles with the configured defaults at random positions.
    ///
    /// Positions are uniform over the bounds inset by the radius (the full axis when the
    /// container is narrower than one diameter). Velocity components are uniform in
    /// `[-f * radius, f * radius]`.
    pub fn add_random_particles<R: Rng>(&mut self, count: usize, rng: &mut R) -> Result<()> {
        let cfg = &self.config;
        let radius = cfg.default_radius;
        let bounds = cfg.bounds;
        let mut lo = bounds.top_left();
        let mut hi = bounds.bottom_right();
        for k in 0..DIM {
            if hi[k] - lo[k] >= 2.0 * radius {
                lo[k] += radius;
                hi[k] -= radius;
            } else if count > 0 {
                warn!(
                    axis = k,
                    radius, "container narrower than a particle diameter; placing centres anywhere"
                );
            }
        }
        let v_range = cfg.velocity_reduction_factor * radius;

        self.particles.reserve(count);
        for _ in 0..count {
            let mut r: Vec2 = [0.0; DIM];
            for (k, r_k) in r.iter_mut().enumerate() {
                *r_k = rng.random_range(lo[k]..=hi[k]);
            }
            let mut v: Vec2 = [0.0; DIM];
            v.iter_mut()
                .for_each(|x| *x = rng.random_range(-v_range..=v_range));
            self.particles.push(Particle::new(
                r,
                v,
                cfg.default_color,
                radius,
                cfg.default_mass,
            )?);
        }
        Ok(())
    }

    /// Grow or shrink every particle's per-axis speed by `delta`.
    pub fn modify_particles_speed(&mut self, delta: Vec2, increase: bool) {
        for p in &mut self.particles {
            p.adjust_speed(delta, increase);
        }
    }

    /// Advance the whole system by one frame.
    ///
    /// Every phase always runs to completion; pairs without a contact normal are
    /// skipped by the pairwise phase rather than aborting the frame.
    pub fn advance_one_frame(&mut self) {
        self.engine.resolve_wall_collisions(&mut self.particles);
        self.engine.resolve_particle_collisions(&mut self.particles);
        self.integrate();
        self.frame += 1;
    }

    /// Advance by `frames` frames.
    pub fn advance_frames(&mut self, frames: u64) {
        for _ in 0..frames {
            self.advance_one_frame();
        }
    }

    /// Total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Total linear momentum (diagnostic).
    pub fn momentum(&self) -> Vec2 {
        self.particles.iter().fold([0.0; DIM], |mut acc, p| {
            for (a, m) in acc.iter_mut().zip(p.momentum()) {
                *a += m;
            }
            acc
        })
    }

    // ============ Internal helpers ============

    fn integrate(&mut self) {
        let (lo, hi) = (self.config.bounds.top_left(), self.config.bounds.bottom_right());
        for (i, p) in self.particles.iter_mut().enumerate() {
            p.advance();
            // Safety clamp for particles fast enough to skip past the wall margin.
            if p.clamp_position(lo, hi) {
                debug!(index = i, frame = self.frame, "clamped particle centre into bounds");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Result<ContainerConfig> {
        Ok(ContainerConfig::new(Bounds::new([0.0, 0.0], [100.0, 100.0])?)
            .radius(10.0)
            .color(Color::ORANGE))
    }

    fn disc(position: Vec2, velocity: Vec2) -> Result<Particle> {
        Particle::new(position, velocity, Color::ORANGE, 10.0, 1.0)
    }

    #[test]
    fn tracks_initial_particles_in_order() -> Result<()> {
        let a = disc([10.0, 0.0], [0.0, 0.0])?;
        let b = disc([10.0, 10.0], [0.0, 0.0])?;
        let c = Container::new(config()?, vec![a.clone(), b.clone()])?;
        assert_eq!(c.len(), 2);
        assert_eq!(c.particle(0)?, &a);
        assert_eq!(c.particle(1)?, &b);
        assert!(matches!(c.particle(2), Err(Error::OutOfBounds(_))));
        Ok(())
    }

    #[test]
    fn random_particles_are_inside_and_slower_than_radius() -> Result<()> {
        let c = Container::seeded(config()?, Vec::new(), 10, Some(1234))?;
        assert_eq!(c.len(), 10);
        for p in c.particles() {
            assert!(c.bounds().contains(p.position()));
            assert!(p.speed() <= p.radius());
            assert_eq!(p.color(), Color::ORANGE);
        }
        Ok(())
    }

    #[test]
    fn random_particles_precede_initial_ones() -> Result<()> {
        let marker = Particle::new([50.0, 50.0], [0.0, 0.0], Color::BLUE, 2.0, 3.0)?;
        let c = Container::seeded(config()?, vec![marker.clone()], 4, Some(7))?;
        assert_eq!(c.len(), 5);
        assert_eq!(c.particle(4)?, &marker);
        Ok(())
    }

    #[test]
    fn seeded_containers_are_reproducible() -> Result<()> {
        let a = Container::seeded(config()?, Vec::new(), 5, Some(42))?;
        let b = Container::seeded(config()?, Vec::new(), 5, Some(42))?;
        assert_eq!(a.particles(), b.particles());
        Ok(())
    }

    #[test]
    fn invalid_config_rejected() -> Result<()> {
        let err = Container::new(config()?.mass(0.0), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("mass"));
        Ok(())
    }

    #[test]
    fn filters_by_color() -> Result<()> {
        let mut c = Container::new(config()?, vec![disc([20.0, 20.0], [0.0, 0.0])?])?;
        let idx = c.add_particle(Particle::new([50.0, 50.0], [1.0, 0.0], Color::BLUE, 3.0, 5.0)?);
        assert_eq!(idx, 1);
        assert_eq!(c.particles_by_color(Color::BLUE).len(), 1);
        assert_eq!(c.particles_by_color(Color::ORANGE).len(), 1);
        assert!(c.particles_by_color(Color::WHITE).is_empty());
        c.clear();
        assert!(c.is_empty());
        Ok(())
    }

    #[test]
    fn empty_and_single_containers_advance() -> Result<()> {
        let mut empty = Container::new(config()?, Vec::new())?;
        empty.advance_one_frame();
        assert_eq!(empty.frame_count(), 1);

        let mut single = Container::new(config()?, vec![disc([50.0, 50.0], [1.0, 2.0])?])?;
        single.advance_frames(3);
        assert_eq!(single.particle(0)?.position(), [53.0, 56.0]);
        Ok(())
    }

    #[test]
    fn fast_particle_is_clamped_into_bounds() -> Result<()> {
        let mut c = Container::new(config()?, vec![disc([85.0, 50.0], [40.0, 0.0])?])?;
        c.advance_one_frame();
        let p = c.particle(0)?;
        assert_eq!(p.position(), [100.0, 50.0]);
        assert_eq!(p.velocity(), [40.0, 0.0]);
        c.advance_one_frame();
        assert_eq!(c.particle(0)?.velocity(), [-40.0, 0.0]);
        Ok(())
    }

    #[test]
    fn near_coincident_pair_does_not_stall_the_frame() -> Result<()> {
        let mut c = Container::new(
            config()?,
            vec![
                disc([10.0, 50.0], [-1.0, 0.0])?,
                disc([50.0, 50.0], [1.0, 0.0])?,
                disc([50.0 + 1e-7, 50.0], [-1.0, 0.0])?,
            ],
        )?;
        for frame in 1..=3 {
            c.advance_one_frame();
            assert_eq!(c.frame_count(), frame);
        }
        // wall bounce on frame 1, then three frames of travel
        assert_eq!(c.particle(0)?.velocity(), [1.0, 0.0]);
        assert_eq!(c.particle(0)?.position(), [13.0, 50.0]);
        // the degenerate pair keeps its velocities and separates
        assert_eq!(c.particle(1)?.velocity(), [1.0, 0.0]);
        assert_eq!(c.particle(2)?.velocity(), [-1.0, 0.0]);
        assert_eq!(c.particle(1)?.position(), [53.0, 50.0]);
        Ok(())
    }
}
