#![allow(dead_code)]

use std::collections::BTreeMap;

use vertexman::topology::{DagFile, InputEdgeSpec, RawDagFile, VertexSpec};
use vertexman::types::DataMovement;

/// Builder for `DagFile` to simplify test setup.
pub struct DagFileBuilder {
    raw: RawDagFile,
}

impl DagFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawDagFile {
                vertex: BTreeMap::new(),
            },
        }
    }

    pub fn with_vertex(mut self, name: &str, spec: VertexSpec) -> Self {
        self.raw.vertex.insert(name.to_string(), spec);
        self
    }

    pub fn build(self) -> DagFile {
        DagFile::try_from(self.raw).expect("Failed to build valid topology from builder")
    }
}

impl Default for DagFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `VertexSpec`.
pub struct VertexSpecBuilder {
    spec: VertexSpec,
}

impl VertexSpecBuilder {
    pub fn new(parallelism: usize) -> Self {
        Self {
            spec: VertexSpec {
                parallelism,
                inputs: vec![],
                extra_inputs: vec![],
            },
        }
    }

    pub fn input(mut self, source: &str, movement: DataMovement) -> Self {
        self.spec.inputs.push(InputEdgeSpec {
            source: source.to_string(),
            movement,
        });
        self
    }

    pub fn extra_input(mut self, name: &str) -> Self {
        self.spec.extra_inputs.push(name.to_string());
        self
    }

    pub fn build(self) -> VertexSpec {
        self.spec
    }
}
