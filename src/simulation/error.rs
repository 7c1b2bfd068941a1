//! Error kinds raised by the simulation kernel
//!
//! Every variant is a precondition violation or a corrupted state; none are
//! retried by the kernel.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Bad generation input (counts, resolution, domain size, density grid)
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `dt` was zero, negative, or not finite
    #[error("invalid timestep: dt = {0} (must be finite and > 0)")]
    InvalidTimestep(f64),

    /// A position, velocity or density is non-finite, or a step would make it so
    #[error("non-finite {field} at index {index}")]
    NumericAnomaly { field: &'static str, index: usize },
}

pub type SimResult<T> = Result<T, SimError>;
