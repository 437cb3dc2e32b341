//! Per-time-step forwarding-state computation (spec §4.3, §4.4): the two
//! shared shortest-path primitives, the four closed-set algorithms built on
//! top of them, and the dense tables/delta framing a dynamic-state driver
//! threads from one step to the next.

use thiserror::Error;

pub mod algorithms;
pub mod dense;
pub mod floyd_warshall;
pub mod primitives;
pub mod step;

pub use algorithms::{Algorithm, StepGeometry};
pub use dense::{ForwardingTable, GslBandwidthTable};
pub use floyd_warshall::{floyd_warshall as run_floyd_warshall, DistMatrix};
pub use primitives::{primitive_a, primitive_b};
pub use step::{diff_step, StepContext, StepDelta};

#[derive(Error, Debug)]
pub enum ForwardingError {
    #[error("algorithm precondition violated: {0}")]
    AlgorithmMismatch(String),
}

impl From<ForwardingError> for satgen_core::CoreError {
    fn from(e: ForwardingError) -> Self {
        satgen_core::CoreError::AlgorithmMismatch(e.to_string())
    }
}
