// src/topology/model.rs

//! Serde models for the DAG topology file.
//!
//! The topology is described in TOML:
//!
//! ```toml
//! [vertex.mapper]
//! parallelism = 10
//! extra_inputs = ["input-files"]
//!
//! [vertex.reducer]
//! parallelism = 4
//! inputs = [{ source = "mapper", movement = "scatter_gather" }]
//! ```
//!
//! `RawDagFile` is what serde produces; `DagFile` is the validated form
//! obtained via `TryFrom` (see [`super::validate`]).

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{DataMovement, VertexName};

/// One input edge of a vertex, identified by the source vertex name.
#[derive(Debug, Clone, Deserialize)]
pub struct InputEdgeSpec {
    pub source: VertexName,
    pub movement: DataMovement,
}

/// Declared properties of a single vertex.
#[derive(Debug, Clone, Deserialize)]
pub struct VertexSpec {
    /// Declared (initial) number of tasks. Must be >= 1.
    pub parallelism: usize,

    /// Input edges, in declaration order.
    #[serde(default)]
    pub inputs: Vec<InputEdgeSpec>,

    /// Names of non-vertex data sources feeding this vertex.
    #[serde(default)]
    pub extra_inputs: Vec<String>,
}

/// Topology file as deserialized from TOML, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDagFile {
    /// Vertices keyed by name. BTreeMap keeps iteration deterministic.
    #[serde(default)]
    pub vertex: BTreeMap<VertexName, VertexSpec>,
}

/// Validated topology file.
///
/// Construct via `DagFile::try_from(raw)`; `new_unchecked` is reserved for
/// the validation module.
#[derive(Debug, Clone)]
pub struct DagFile {
    vertex: BTreeMap<VertexName, VertexSpec>,
}

impl DagFile {
    pub(crate) fn new_unchecked(vertex: BTreeMap<VertexName, VertexSpec>) -> Self {
        Self { vertex }
    }

    pub fn vertices(&self) -> &BTreeMap<VertexName, VertexSpec> {
        &self.vertex
    }
}
