//! Time-axis driver (spec §4.4): iterates `t = offset_ns, …, t_end_ns -
//! step_ns`, invoking the topology builder (C4) and forwarding engine (C5)
//! at each step and writing delta files, sharded across `std::thread::scope`
//! workers with no shared mutable state between shards (spec §5).

use satgen_core::CoreError;
use thiserror::Error;

pub mod driver;

pub use driver::{run_range, run_sharded, DriverConfig};

#[derive(Error, Debug)]
pub enum DynamicStateError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, DynamicStateError>;
