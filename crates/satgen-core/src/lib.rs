//! Shared node-id arithmetic, error types, and the plain-text readers/
//! writers for the six on-disk formats the core consumes and produces
//! (spec §6). None of this is "the interesting part" — it exists because
//! something has to turn bytes on disk into the typed state the rest of
//! the workspace operates on.

pub mod config;
pub mod error;
pub mod ids;
pub mod io;

pub use error::CoreError;
pub use ids::{ForwardingEntry, GroundId, IfaceIdx, IfaceMeta, NodeId, SatId};
