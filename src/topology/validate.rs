// src/topology/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, VertexManagerError};
use crate::topology::model::{DagFile, RawDagFile};

impl TryFrom<RawDagFile> for DagFile {
    type Error = crate::errors::VertexManagerError;

    fn try_from(raw: RawDagFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_dag(&raw)?;
        Ok(DagFile::new_unchecked(raw.vertex))
    }
}

fn validate_raw_dag(raw: &RawDagFile) -> Result<()> {
    ensure_has_vertices(raw)?;
    validate_vertex_specs(raw)?;
    validate_edge_references(raw)?;
    validate_acyclic(raw)?;
    Ok(())
}

fn ensure_has_vertices(raw: &RawDagFile) -> Result<()> {
    if raw.vertex.is_empty() {
        return Err(VertexManagerError::TopologyError(
            "topology must contain at least one [vertex.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_vertex_specs(raw: &RawDagFile) -> Result<()> {
    for (name, spec) in raw.vertex.iter() {
        if spec.parallelism == 0 {
            return Err(VertexManagerError::TopologyError(format!(
                "vertex '{}' declares parallelism 0 (must be >= 1)",
                name
            )));
        }
    }
    Ok(())
}

fn validate_edge_references(raw: &RawDagFile) -> Result<()> {
    for (name, spec) in raw.vertex.iter() {
        let mut seen = std::collections::HashSet::new();

        for edge in spec.inputs.iter() {
            if !raw.vertex.contains_key(&edge.source) {
                return Err(VertexManagerError::TopologyError(format!(
                    "vertex '{}' has unknown input source '{}'",
                    name, edge.source
                )));
            }
            if edge.source == *name {
                return Err(VertexManagerError::TopologyError(format!(
                    "vertex '{}' cannot use itself as an input source",
                    name
                )));
            }
            if !seen.insert(edge.source.as_str()) {
                return Err(VertexManagerError::TopologyError(format!(
                    "vertex '{}' lists input source '{}' more than once",
                    name, edge.source
                )));
            }
        }
    }
    Ok(())
}

fn validate_acyclic(raw: &RawDagFile) -> Result<()> {
    // Edge direction: source -> destination. A topological sort fails iff
    // the execution-edge graph has a cycle.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in raw.vertex.keys() {
        graph.add_node(name.as_str());
    }

    for (name, spec) in raw.vertex.iter() {
        for edge in spec.inputs.iter() {
            graph.add_edge(edge.source.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(VertexManagerError::TopologyError(format!(
                "cycle detected in vertex DAG involving vertex '{}'",
                node
            )))
        }
    }
}
