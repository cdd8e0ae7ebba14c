// src/vertex/mod.rs

//! Per-vertex state and the vertex manager.
//!
//! - [`state`] holds the mutable per-vertex record: lifecycle, parallelism,
//!   installed routing descriptors, ready set, and pre-configuration buffers.
//! - [`manager`] contains the [`VertexManager`], the single authority for
//!   mutating parallelism/routing and admitting ready tasks.
//! - [`step`] defines the result type for scheduling steps.

pub mod manager;
pub mod state;
pub mod step;

pub use manager::VertexManager;
pub use state::{VertexLifecycle, VertexState};
pub use step::AdmissionStep;
