//! Post-analysis (spec §4.5): path reconstruction over accumulated
//! forwarding-state deltas, RTT computation with live-geometry
//! re-validation, aggregate ECDF outputs, top-k listings, and
//! granularity-robustness analysis.

use satgen_core::CoreError;
use thiserror::Error;

pub mod ecdf;
pub mod granularity;
pub mod path;
pub mod replay;
pub mod rtt;
pub mod topk;

pub use ecdf::{ecdf, write_ecdf_file};
pub use granularity::{count_missed_changes, granularity_robustness, PathChangeEvent};
pub use path::{get_path, Fstate};
pub use replay::accumulate_fstate_up_to;
pub use rtt::{path_length_m, rtt_ns, IslSet, SPEED_OF_LIGHT_M_S};
pub use topk::{top_k_deduped, PairMetric};

#[derive(Error, Debug)]
pub enum PostAnalysisError {
    #[error("geometry violation: {0}")]
    GeometryViolation(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, PostAnalysisError>;

impl From<PostAnalysisError> for CoreError {
    fn from(e: PostAnalysisError) -> Self {
        match e {
            PostAnalysisError::GeometryViolation(msg) => CoreError::GeometryViolation(msg),
            PostAnalysisError::InvalidInput(msg) => CoreError::InvalidInput(msg),
        }
    }
}
