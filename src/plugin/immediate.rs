// src/plugin/immediate.rs

//! Trivial built-in policy: start every task as soon as the vertex starts.

use tracing::debug;

use crate::engine::SourceTaskEvent;
use crate::errors::Result;
use crate::plugin::{VertexManagerContext, VertexManagerPlugin};

/// Policy that never reconfigures and schedules all tasks on start.
///
/// Used by the CLI harness and as the default for vertices whose behaviour
/// does not depend on upstream signals.
#[derive(Debug, Default)]
pub struct ImmediateStartPolicy;

impl VertexManagerPlugin for ImmediateStartPolicy {
    fn on_vertex_started(&mut self, ctx: &mut dyn VertexManagerContext) -> Result<()> {
        let vertex = ctx.vertex_name().to_string();
        let num_tasks = ctx.vertex_num_tasks(&vertex)?;
        let indices: Vec<usize> = (0..num_tasks).collect();

        debug!(
            vertex = %ctx.vertex_name(),
            num_tasks,
            "immediate-start policy scheduling all tasks"
        );

        ctx.schedule_vertex_tasks(&indices)
    }

    fn on_source_task_event(
        &mut self,
        _ctx: &mut dyn VertexManagerContext,
        _event: &SourceTaskEvent,
    ) -> Result<()> {
        Ok(())
    }
}
