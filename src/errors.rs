// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::types::VertexName;

#[derive(Error, Debug)]
pub enum VertexManagerError {
    /// The one-shot reconfiguration latch for this vertex is already set.
    ///
    /// At the plugin context boundary this is mapped to `Ok(false)` so that
    /// benign re-entry does not look like a failure; embedders calling the
    /// vertex manager directly get the typed variant.
    #[error("vertex '{0}' has already been reconfigured")]
    AlreadyReconfigured(VertexName),

    #[error("invalid parallelism {requested} for vertex '{vertex}': {reason}")]
    InvalidParallelism {
        vertex: VertexName,
        requested: usize,
        reason: String,
    },

    #[error(
        "edge descriptor for source '{source_vertex}' of vertex '{vertex}' declares \
         {descriptor_tasks} destination tasks, expected {expected_tasks}"
    )]
    InconsistentEdgeDescriptor {
        vertex: VertexName,
        source_vertex: VertexName,
        descriptor_tasks: usize,
        expected_tasks: usize,
    },

    #[error("unknown vertex: {0}")]
    UnknownVertex(VertexName),

    #[error("vertex '{0}' belongs to a canceled DAG")]
    VertexCanceled(VertexName),

    #[error("Topology error: {0}")]
    TopologyError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, VertexManagerError>;
