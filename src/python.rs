use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::ContainerConfig;
use crate::core::particle::DIM;
use crate::core::{Bounds, Color, Container, Particle, SpeedHistogram};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Python-facing driver around the Rust gas container.
///
/// API:
/// - __new__(num_particles, top_left, bottom_right, radius=1.0, mass=1.0, seed=None)
/// - advance_one_frame() / advance_frames(n)
/// - modify_speed(dx, dy, increase)
/// - add_particle(position, velocity, radius, mass, color=(255, 255, 255))
/// - get_positions() / get_velocities() -> np.ndarray, shape (N, 2)
/// - get_speed_histogram(bin_width, color=None) -> list[int]
#[pyclass(name = "GasContainer")]
pub struct PyGasContainer {
    inner: Container,
}

#[pymethods]
impl PyGasContainer {
    /// Create a container with `num_particles` random particles of the given radius and mass.
    ///
    /// Errors: raises ValueError on invalid bounds, radius or mass.
    #[new]
    #[pyo3(signature = (num_particles, top_left, bottom_right, radius=1.0, mass=1.0, seed=None))]
    fn new(
        num_particles: usize,
        top_left: (f64, f64),
        bottom_right: (f64, f64),
        radius: f64,
        mass: f64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let bounds =
            Bounds::new([top_left.0, top_left.1], [bottom_right.0, bottom_right.1]).map_err(py_err)?;
        let config = ContainerConfig::new(bounds).radius(radius).mass(mass);
        let inner = Container::seeded(config, Vec::new(), num_particles, seed).map_err(py_err)?;
        Ok(Self { inner })
    }

    /// Number of particles in the container.
    fn num_particles(&self) -> usize {
        self.inner.len()
    }

    /// Frames advanced so far.
    fn frame_count(&self) -> u64 {
        self.inner.frame_count()
    }

    fn kinetic_energy(&self) -> f64 {
        self.inner.kinetic_energy()
    }

    /// Advance by one frame.
    fn advance_one_frame(&mut self) {
        self.inner.advance_one_frame();
    }

    /// Advance by `frames` frames (releases the GIL during computation).
    fn advance_frames(&mut self, py: Python<'_>, frames: u64) {
        py.detach(|| self.inner.advance_frames(frames));
    }

    /// Grow (`increase=True`) or shrink every particle's per-axis speed by (dx, dy).
    fn modify_speed(&mut self, dx: f64, dy: f64, increase: bool) {
        self.inner.modify_particles_speed([dx, dy], increase);
    }

    /// Append one particle; returns its index.
    #[pyo3(signature = (position, velocity, radius, mass, color=(255, 255, 255)))]
    fn add_particle(
        &mut self,
        position: (f64, f64),
        velocity: (f64, f64),
        radius: f64,
        mass: f64,
        color: (u8, u8, u8),
    ) -> PyResult<usize> {
        let particle = Particle::new(
            [position.0, position.1],
            [velocity.0, velocity.1],
            Color::rgb(color.0, color.1, color.2),
            radius,
            mass,
        )
        .map_err(py_err)?;
        Ok(self.inner.add_particle(particle))
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let arr = self.table(|p| p.position());
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let arr = self.table(|p| p.velocity());
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Speed histogram bin counts, optionally restricted to particles tagged `color`.
    #[pyo3(signature = (bin_width, color=None))]
    fn get_speed_histogram(
        &self,
        bin_width: f64,
        color: Option<(u8, u8, u8)>,
    ) -> PyResult<Vec<usize>> {
        let hist = match color {
            Some((r, g, b)) => SpeedHistogram::from_particles(
                bin_width,
                self.inner.particles_by_color(Color::rgb(r, g, b)),
            ),
            None => SpeedHistogram::from_particles(bin_width, self.inner.particles()),
        }
        .map_err(py_err)?;
        Ok(hist.bins().to_vec())
    }
}

impl PyGasContainer {
    fn table(&self, field: impl Fn(&Particle) -> [f64; DIM]) -> Array2<f64> {
        let mut arr = Array2::<f64>::zeros((self.inner.len(), DIM));
        for (i, p) in self.inner.particles().iter().enumerate() {
            for (k, x) in field(p).into_iter().enumerate() {
                arr[[i, k]] = x;
            }
        }
        arr
    }
}

/// The idealgas Python module entry point.
#[pymodule]
fn idealgas(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGasContainer>()?;
    Ok(())
}
