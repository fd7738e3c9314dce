use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the ideal gas core.
///
/// The physics itself is total: detection and integration never fail. Errors
/// only surface from construction-time validation and from the degenerate
/// coincident-centre collision.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical or geometric issue (e.g., coincident centres with no contact normal).
    #[error("numerical error: {0}")]
    MathError(String),

    /// Particle index outside the current particle set.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
}
