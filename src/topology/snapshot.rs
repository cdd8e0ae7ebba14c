// src/topology/snapshot.rs

//! Immutable topology snapshot taken at DAG submission.

use std::collections::{BTreeMap, BTreeSet};

use crate::topology::model::DagFile;
use crate::types::{DataMovement, VertexName};

/// One input edge of a vertex: source vertex name plus the declared
/// data-movement contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEdge {
    pub source: VertexName,
    pub movement: DataMovement,
}

/// Static per-vertex facts from the DAG definition.
///
/// These never change after submission, regardless of reconfiguration
/// anywhere in the graph. A vertex's *current* task count lives in its
/// mutable `VertexState`, not here.
#[derive(Debug, Clone)]
pub struct VertexTopology {
    pub name: VertexName,
    pub declared_parallelism: usize,
    /// Input edges in declaration order.
    pub input_edges: Vec<InputEdge>,
    /// Non-vertex data sources feeding this vertex.
    pub extra_inputs: BTreeSet<String>,
}

/// Immutable snapshot of the whole DAG topology.
///
/// Shared read-only by every per-vertex runtime; cross-vertex lookups go
/// through name-based access rather than direct references.
#[derive(Debug, Clone)]
pub struct TopologySnapshot {
    vertices: BTreeMap<VertexName, VertexTopology>,
}

impl TopologySnapshot {
    /// Build a snapshot from a validated [`DagFile`].
    pub fn from_dag(dag: &DagFile) -> Self {
        let mut vertices = BTreeMap::new();

        for (name, spec) in dag.vertices().iter() {
            let input_edges = spec
                .inputs
                .iter()
                .map(|e| InputEdge {
                    source: e.source.clone(),
                    movement: e.movement,
                })
                .collect();

            vertices.insert(
                name.clone(),
                VertexTopology {
                    name: name.clone(),
                    declared_parallelism: spec.parallelism,
                    input_edges,
                    extra_inputs: spec.extra_inputs.iter().cloned().collect(),
                },
            );
        }

        Self { vertices }
    }

    pub fn vertex(&self, name: &str) -> Option<&VertexTopology> {
        self.vertices.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vertices.contains_key(name)
    }

    /// All vertex names, in deterministic order.
    pub fn vertex_names(&self) -> impl Iterator<Item = &str> {
        self.vertices.keys().map(|s| s.as_str())
    }

    /// Vertices that directly consume the output of `source`.
    pub fn downstream_of(&self, source: &str) -> Vec<&VertexTopology> {
        self.vertices
            .values()
            .filter(|v| v.input_edges.iter().any(|e| e.source == source))
            .collect()
    }

    /// Vertex names in a valid execution order (sources before consumers).
    ///
    /// The snapshot is built from a validated, acyclic [`DagFile`], so this
    /// always terminates.
    pub fn execution_order(&self) -> Vec<VertexName> {
        let mut order = Vec::new();
        let mut placed: BTreeSet<&str> = BTreeSet::new();

        while order.len() < self.vertices.len() {
            for v in self.vertices.values() {
                if placed.contains(v.name.as_str()) {
                    continue;
                }
                let ready = v
                    .input_edges
                    .iter()
                    .all(|e| placed.contains(e.source.as_str()));
                if ready {
                    placed.insert(v.name.as_str());
                    order.push(v.name.clone());
                }
            }
        }

        order
    }
}
