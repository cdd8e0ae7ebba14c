// src/plugin/context.rs

//! Runtime-side implementation of the plugin context.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::errors::{Result, VertexManagerError};
use crate::plugin::VertexManagerContext;
use crate::routing::RoutingDescriptor;
use crate::types::{DataMovement, VertexLocationHint, VertexName};
use crate::vertex::{AdmissionStep, VertexManager};

/// Context handle passed to a plugin for the duration of one callback.
///
/// Borrows the vertex manager mutably, which is what serializes plugin
/// callbacks against reconfiguration commits and state queries: nothing
/// else can touch vertex state while a callback is in flight. Admissions
/// produced during the callback are accumulated in [`Self::take_step`] for
/// the caller to turn into scheduler notifications.
pub struct RuntimeContext<'a> {
    vertex: VertexName,
    manager: &'a mut VertexManager,
    step: AdmissionStep,
}

impl<'a> RuntimeContext<'a> {
    pub fn new(vertex: impl Into<VertexName>, manager: &'a mut VertexManager) -> Self {
        Self {
            vertex: vertex.into(),
            manager,
            step: AdmissionStep::default(),
        }
    }

    /// Admissions accumulated across the callback, in request order.
    pub fn take_step(self) -> AdmissionStep {
        self.step
    }
}

impl VertexManagerContext for RuntimeContext<'_> {
    fn vertex_name(&self) -> &str {
        &self.vertex
    }

    fn input_vertex_edge_properties(&self) -> BTreeMap<VertexName, DataMovement> {
        self.manager
            .input_edge_properties(&self.vertex)
            .unwrap_or_default()
    }

    fn vertex_num_tasks(&self, vertex: &str) -> Result<usize> {
        self.manager.vertex_num_tasks(vertex)
    }

    fn set_vertex_parallelism(
        &mut self,
        parallelism: usize,
        source_edge_descriptors: BTreeMap<VertexName, RoutingDescriptor>,
    ) -> Result<bool> {
        match self
            .manager
            .set_parallelism(&self.vertex, parallelism, source_edge_descriptors)
        {
            Ok(step) => {
                self.step.merge(step);
                Ok(true)
            }
            Err(VertexManagerError::AlreadyReconfigured(vertex)) => {
                debug!(
                    vertex = %vertex,
                    "parallelism change rejected by the one-shot latch; reporting false"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn schedule_vertex_tasks(&mut self, task_indices: &[usize]) -> Result<()> {
        let step = self.manager.schedule_tasks(&self.vertex, task_indices)?;
        self.step.merge(step);
        Ok(())
    }

    fn vertex_input_names(&self) -> BTreeSet<String> {
        self.manager
            .vertex_input_names(&self.vertex)
            .unwrap_or_default()
    }

    fn set_vertex_location_hint(&mut self, hint: VertexLocationHint) -> Result<()> {
        self.manager.set_location_hint(&self.vertex, hint)
    }
}
