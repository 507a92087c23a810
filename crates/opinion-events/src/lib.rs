//! Shared snapshot types and serialization for the opinion simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Renderers and analysis tools depend on it instead of the engine.

pub mod snapshot;
pub mod step;

pub use snapshot::{generate_snapshot_id, AgentSnapshot, WorldSnapshot, ZoneSnapshot};
pub use step::StepRecord;
