// src/topology/mod.rs

//! DAG topology definition and validation.
//!
//! - [`model`] holds the raw (serde) and validated TOML models.
//! - [`validate`] checks edge references and acyclicity.
//! - [`loader`] reads a topology file from disk.
//! - [`snapshot`] provides the immutable [`TopologySnapshot`] the runtime
//!   reads for the lifetime of a DAG.

pub mod loader;
pub mod model;
pub mod snapshot;
pub mod validate;

pub use loader::{default_dag_path, load_and_validate, load_from_path};
pub use model::{DagFile, InputEdgeSpec, RawDagFile, VertexSpec};
pub use snapshot::{InputEdge, TopologySnapshot, VertexTopology};
