// src/routing/router.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{Result, VertexManagerError};
use crate::routing::descriptor::RoutingDescriptor;
use crate::types::VertexName;

/// Read-only routing view over the descriptors installed for one vertex.
///
/// A router is a snapshot: it holds `Arc`s to the descriptors that were
/// installed when it was taken, so a concurrent reconfiguration of another
/// vertex (or a later snapshot of this one) never changes what an existing
/// router computes. Obtainable only from a CONFIGURED vertex; see
/// `VertexState::router`.
#[derive(Debug, Clone)]
pub struct EventRouter {
    vertex: VertexName,
    descriptors: BTreeMap<VertexName, Arc<RoutingDescriptor>>,
}

impl EventRouter {
    pub(crate) fn new(
        vertex: VertexName,
        descriptors: BTreeMap<VertexName, Arc<RoutingDescriptor>>,
    ) -> Self {
        Self {
            vertex,
            descriptors,
        }
    }

    /// Destination vertex this router delivers to.
    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    /// Descriptor installed for the edge from `source`, if any.
    pub fn descriptor_for(&self, source: &str) -> Option<&RoutingDescriptor> {
        self.descriptors.get(source).map(|d| d.as_ref())
    }

    /// Destination task indices for an event produced by task `source_task`
    /// (out of `source_task_count`) of the `source` vertex.
    ///
    /// Pure and side-effect-free; fails only if `source` is not an input
    /// edge of this vertex.
    pub fn route(
        &self,
        source: &str,
        source_task: usize,
        source_task_count: usize,
    ) -> Result<Vec<usize>> {
        let descriptor = self
            .descriptors
            .get(source)
            .ok_or_else(|| VertexManagerError::UnknownVertex(source.to_string()))?;

        Ok(descriptor.route(source_task, source_task_count))
    }
}
