use crate::core::particle::{Color, Particle};
use crate::core::Container;
use crate::error::{Error, Result};
use ordered_float::OrderedFloat;
use std::ops::Range;

/// Upper limit on the number of bins a single update may allocate.
pub const MAX_BINS: usize = 1 << 16;

/// Speed distribution of a particle group, rebuilt from scratch on every update.
///
/// Bin `i` counts speeds in `[i * w, (i + 1) * w)`. The bin count follows the fastest
/// particle: `floor(max_speed / w) + 1`, so it grows and shrinks frame to frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedHistogram {
    bin_width: f64,
    bins: Vec<usize>,
}

impl SpeedHistogram {
    /// Create an empty histogram (one empty bin).
    ///
    /// Errors: `Error::InvalidParam` unless `bin_width` is finite and > 0.
    pub fn new(bin_width: f64) -> Result<Self> {
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(Error::InvalidParam("bin width must be finite and > 0".into()));
        }
        Ok(Self {
            bin_width,
            bins: vec![0],
        })
    }

    /// Histogram of `particles` in one call.
    pub fn from_particles<'a, I>(bin_width: f64, particles: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        let mut hist = Self::new(bin_width)?;
        hist.update(particles)?;
        Ok(hist)
    }

    /// One histogram per display tag, in the order of `colors`.
    pub fn by_color(
        container: &Container,
        colors: &[Color],
        bin_width: f64,
    ) -> Result<Vec<(Color, SpeedHistogram)>> {
        colors
            .iter()
            .map(|&c| {
                let hist = Self::from_particles(bin_width, container.particles_by_color(c))?;
                Ok((c, hist))
            })
            .collect()
    }

    /// Rebuild the bins from the speeds of `particles`.
    ///
    /// Errors: see [`SpeedHistogram::update_speeds`].
    pub fn update<'a, I>(&mut self, particles: I) -> Result<&[usize]>
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        self.update_speeds(particles.into_iter().map(Particle::speed))
    }

    /// Rebuild the bins from raw speed values.
    ///
    /// Errors: `Error::InvalidParam` if a speed is not finite or the fastest one would
    /// need more than [`MAX_BINS`] bins. The previous bins are kept on error.
    pub fn update_speeds<I>(&mut self, speeds: I) -> Result<&[usize]>
    where
        I: IntoIterator<Item = f64>,
    {
        let speeds: Vec<f64> = speeds.into_iter().collect();
        if let Some(bad) = speeds.iter().find(|s| !s.is_finite()) {
            return Err(Error::InvalidParam(format!("speed {bad} is not finite")));
        }
        let max_speed = speeds
            .iter()
            .copied()
            .map(OrderedFloat)
            .max()
            .map_or(0.0, OrderedFloat::into_inner);

        let num_bins = self
            .bin_of(max_speed)
            .checked_add(1)
            .filter(|&n| n <= MAX_BINS)
            .ok_or_else(|| {
                Error::InvalidParam(format!(
                    "speed {max_speed} needs more than {MAX_BINS} bins of width {}",
                    self.bin_width
                ))
            })?;
        self.bins.clear();
        self.bins.resize(num_bins, 0);
        for s in speeds {
            let bin = self.bin_of(s).min(num_bins - 1);
            self.bins[bin] += 1;
        }
        Ok(&self.bins)
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Particle count per bin.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Count in the fullest bin; renderers scale the y axis by it.
    pub fn max_count(&self) -> usize {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// Total number of binned speeds.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Speed interval covered by bin `index`.
    pub fn bin_range(&self, index: usize) -> Range<f64> {
        let lo = index as f64 * self.bin_width;
        lo..lo + self.bin_width
    }

    #[inline]
    fn bin_of(&self, speed: f64) -> usize {
        // `as` saturates: negative and NaN land in bin 0.
        (speed / self.bin_width).floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::Vec2;

    fn moving(velocity: Vec2) -> Result<Particle> {
        Particle::new([10.0, 10.0], velocity, Color::WHITE, 10.0, 1.0)
    }

    #[test]
    fn rejects_bad_bin_width() {
        assert!(SpeedHistogram::new(0.0).is_err());
        assert!(SpeedHistogram::new(-1.0).is_err());
        assert!(SpeedHistogram::new(f64::NAN).is_err());
    }

    #[test]
    fn no_particles_gives_single_empty_bin() -> Result<()> {
        let mut h = SpeedHistogram::new(1.0)?;
        assert_eq!(h.update(std::iter::empty::<&Particle>())?, &[0]);
        assert_eq!(h.max_count(), 0);
        Ok(())
    }

    #[test]
    fn slow_particle_fills_first_bin() -> Result<()> {
        let p = moving([0.1, 0.0])?;
        let h = SpeedHistogram::from_particles(1.0, [&p])?;
        assert_eq!(h.bins(), &[1]);
        Ok(())
    }

    #[test]
    fn speed_on_a_bin_edge_opens_a_new_bin() -> Result<()> {
        let p = moving([1.0, 0.0])?;
        let h = SpeedHistogram::from_particles(1.0, [&p])?;
        assert_eq!(h.bins(), &[0, 1]);
        Ok(())
    }

    #[test]
    fn bin_count_follows_fastest_particle() -> Result<()> {
        let slow = moving([0.1, 0.0])?;
        let fast = moving([10.0, 5.0])?;
        let mut h = SpeedHistogram::new(1.0)?;
        assert_eq!(h.update([&slow])?, &[1]);
        let bins = h.update([&slow, &fast])?.to_vec();
        assert_eq!(bins.len(), 12);
        assert_eq!(bins, vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        // shrinks again once the fast particle is gone
        assert_eq!(h.update([&slow])?, &[1]);
        Ok(())
    }

    #[test]
    fn spread_of_speeds() -> Result<()> {
        let mut h = SpeedHistogram::new(1.0)?;
        h.update_speeds([0.1, 2.0, 5.0, 5.0])?;
        assert_eq!(h.bins(), &[1, 0, 1, 0, 0, 2]);
        assert_eq!(h.num_bins(), 6);
        assert_eq!(h.max_count(), 2);
        assert_eq!(h.total(), 4);
        Ok(())
    }

    #[test]
    fn wider_bins() -> Result<()> {
        let mut h = SpeedHistogram::new(2.5)?;
        h.update_speeds([0.0, 2.4, 2.5, 7.4])?;
        assert_eq!(h.bins(), &[2, 1, 1]);
        assert_eq!(h.bin_range(1), 2.5..5.0);
        Ok(())
    }

    #[test]
    fn rejects_speeds_it_cannot_bin() -> Result<()> {
        let mut h = SpeedHistogram::new(1.0)?;
        h.update_speeds([0.5, 2.5])?;
        for bad in [1e300, f64::INFINITY, f64::NAN, (MAX_BINS as f64) * 1.5] {
            let err = h.update_speeds([0.5, bad]).unwrap_err();
            assert!(matches!(err, Error::InvalidParam(_)));
            assert_eq!(h.bins(), &[1, 0, 1]);
        }
        // the largest speed that still fits fills the last bin
        let top = (MAX_BINS - 1) as f64;
        assert_eq!(h.update_speeds([top])?.len(), MAX_BINS);
        Ok(())
    }

    #[test]
    fn unvalidated_particle_velocity_is_rejected() -> Result<()> {
        let mut p = moving([1.0, 0.0])?;
        p.set_velocity([f64::MAX, f64::MAX]);
        assert!(SpeedHistogram::from_particles(1.0, [&p]).is_err());
        Ok(())
    }
}
