// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - updated per-vertex state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - forwarding task admissions to the scheduler backend
//! - handling Ctrl+C / shutdown
//!
//! Processing one event at a time is also what serializes plugin callbacks
//! per vertex and makes a reconfiguration commit a critical section with
//! respect to event delivery and state queries.
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, or processes.

use std::sync::Arc;

use crate::engine::event_handlers::{
    handle_dag_canceled, handle_source_task_event, handle_vertex_manager_event,
    handle_vertex_started, CoreStep, PluginMap,
};
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::plugin::VertexManagerPlugin;
use crate::topology::TopologySnapshot;
use crate::types::VertexName;
use crate::vertex::VertexManager;

/// Pure core runtime state.
///
/// This owns:
/// - the vertex manager (topology snapshot + per-vertex records)
/// - one policy plugin per vertex
/// - runtime options (e.g. `exit_when_quiescent`)
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
pub struct CoreRuntime {
    manager: VertexManager,
    plugins: PluginMap,
    options: RuntimeOptions,
}

impl std::fmt::Debug for CoreRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreRuntime")
            .field("manager", &self.manager)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CoreRuntime {
    pub fn new(
        topology: Arc<TopologySnapshot>,
        plugins: impl IntoIterator<Item = (VertexName, Box<dyn VertexManagerPlugin>)>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            manager: VertexManager::new(topology),
            plugins: plugins.into_iter().collect(),
            options,
        }
    }

    /// Direct access to the vertex manager (for tests and embedders).
    pub fn manager(&self) -> &VertexManager {
        &self.manager
    }

    /// Whether every vertex is configured with all of its tasks admitted.
    pub fn is_quiescent(&self) -> bool {
        self.manager.fully_scheduled()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let mut step = match event {
            RuntimeEvent::VertexStarted { vertex } => {
                handle_vertex_started(&mut self.manager, &mut self.plugins, vertex)
            }
            RuntimeEvent::SourceTask(event) => {
                handle_source_task_event(&mut self.manager, &mut self.plugins, event)
            }
            RuntimeEvent::VertexManagerEvent { vertex, payload } => {
                handle_vertex_manager_event(&mut self.manager, &mut self.plugins, vertex, payload)
            }
            RuntimeEvent::DagCanceled => handle_dag_canceled(&mut self.manager),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        };

        if step.keep_running && self.options.exit_when_quiescent && self.is_quiescent() {
            step.keep_running = false;
        }

        step
    }
}
