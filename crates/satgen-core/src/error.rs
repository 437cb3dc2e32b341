//! Error kinds the core distinguishes (spec §7). `Unreachable` is
//! deliberately absent: it is a non-fatal, first-class data value
//! (`ForwardingEntry::UNREACHABLE`), never an `Err`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Parser preconditions: monotonic ids, column counts, algorithm
    /// preconditions. Fatal at construction, before any state is written.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An ISL exceeds `max_isl_length_m` at some t, or a GSL edge used
    /// during post-analysis exceeds its bound.
    #[error("geometry violation: {0}")]
    GeometryViolation(String),

    /// Interface counts or graph shape incompatible with the chosen
    /// algorithm.
    #[error("algorithm precondition violated: {0}")]
    AlgorithmMismatch(String),

    /// File create/read/write failure.
    #[error("I/O failure at {path}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<satgen_orbit::OrbitError> for CoreError {
    fn from(e: satgen_orbit::OrbitError) -> Self {
        CoreError::InvalidInput(e.to_string())
    }
}
