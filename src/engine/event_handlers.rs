// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeMap;

use tracing::{debug, error, warn};

use crate::engine::{PluginNotice, SourceTaskEvent};
use crate::plugin::{RuntimeContext, VertexManagerPlugin};
use crate::types::{VertexLocationHint, VertexName};
use crate::vertex::{AdmissionStep, VertexManager};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Notify the external task scheduler that these tasks may execute.
    AdmitTasks {
        vertex: VertexName,
        task_indices: Vec<usize>,
        location_hint: Option<VertexLocationHint>,
    },
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn idle() -> Self {
        Self::running(Vec::new())
    }
}

/// Plugin instances keyed by the vertex they manage.
pub type PluginMap = BTreeMap<VertexName, Box<dyn VertexManagerPlugin>>;

/// Handle a vertex start notification.
///
/// Transitions the vertex to reconfiguring, delivers `on_vertex_started`,
/// then replays any events buffered before the plugin was ready, in arrival
/// order. A plugin error aborts only that callback; the vertex stays usable
/// with its defaults.
pub fn handle_vertex_started(
    manager: &mut VertexManager,
    plugins: &mut PluginMap,
    vertex: VertexName,
) -> CoreStep {
    if manager.is_canceled() {
        debug!(vertex = %vertex, "ignoring vertex start for canceled DAG");
        return CoreStep::idle();
    }

    let Some(plugin) = plugins.get_mut(&vertex) else {
        warn!(vertex = %vertex, "vertex start for unknown vertex; ignoring");
        return CoreStep::idle();
    };

    if let Err(e) = manager.mark_reconfiguring(&vertex) {
        warn!(vertex = %vertex, error = %e, "cannot start vertex; ignoring");
        return CoreStep::idle();
    }

    let mut step = AdmissionStep::default();

    {
        let mut ctx = RuntimeContext::new(vertex.clone(), manager);
        if let Err(e) = plugin.on_vertex_started(&mut ctx) {
            error!(vertex = %vertex, error = %e, "plugin on_vertex_started failed");
        }
        step.merge(ctx.take_step());
    }

    if let Err(e) = manager.mark_plugin_started(&vertex) {
        warn!(vertex = %vertex, error = %e, "failed to mark plugin started");
    }

    // Replay events that arrived before the plugin was ready.
    let notices = manager.drain_notices(&vertex).unwrap_or_default();
    if !notices.is_empty() {
        debug!(
            vertex = %vertex,
            count = notices.len(),
            "replaying buffered events to the plugin in arrival order"
        );
    }
    for notice in notices {
        step.merge(deliver_notice(manager, plugin, &vertex, &notice));
    }

    step.merge(maybe_commit_defaults(manager, &vertex));

    CoreStep::running(commands_from_step(manager, &vertex, step))
}

/// Handle an upstream source-task event destined for `event.dest`.
///
/// Buffered if the destination's plugin has not been started yet; forwarded
/// to the plugin otherwise. Events are never dropped while the DAG is live.
pub fn handle_source_task_event(
    manager: &mut VertexManager,
    plugins: &mut PluginMap,
    event: SourceTaskEvent,
) -> CoreStep {
    if manager.is_canceled() {
        debug!(vertex = %event.dest, "discarding source task event for canceled DAG");
        return CoreStep::idle();
    }

    let vertex = event.dest.clone();

    let started = match manager.vertex(&vertex) {
        Ok(state) => state.plugin_started,
        Err(e) => {
            warn!(vertex = %vertex, error = %e, "source task event for unknown vertex; ignoring");
            return CoreStep::idle();
        }
    };

    if !started {
        if let Err(e) = manager.buffer_notice(&vertex, PluginNotice::SourceTask(event)) {
            warn!(vertex = %vertex, error = %e, "failed to buffer source task event");
        }
        return CoreStep::idle();
    }

    let Some(plugin) = plugins.get_mut(&vertex) else {
        warn!(vertex = %vertex, "no plugin registered for vertex; ignoring event");
        return CoreStep::idle();
    };

    let mut step = deliver_notice(manager, plugin, &vertex, &PluginNotice::SourceTask(event));
    step.merge(maybe_commit_defaults(manager, &vertex));

    CoreStep::running(commands_from_step(manager, &vertex, step))
}

/// Handle an opaque vertex-manager event from a running task.
pub fn handle_vertex_manager_event(
    manager: &mut VertexManager,
    plugins: &mut PluginMap,
    vertex: VertexName,
    payload: Vec<u8>,
) -> CoreStep {
    if manager.is_canceled() {
        debug!(vertex = %vertex, "discarding vertex manager event for canceled DAG");
        return CoreStep::idle();
    }

    let started = match manager.vertex(&vertex) {
        Ok(state) => state.plugin_started,
        Err(e) => {
            warn!(vertex = %vertex, error = %e, "manager event for unknown vertex; ignoring");
            return CoreStep::idle();
        }
    };

    if !started {
        if let Err(e) = manager.buffer_notice(&vertex, PluginNotice::ManagerEvent { payload }) {
            warn!(vertex = %vertex, error = %e, "failed to buffer vertex manager event");
        }
        return CoreStep::idle();
    }

    let Some(plugin) = plugins.get_mut(&vertex) else {
        warn!(vertex = %vertex, "no plugin registered for vertex; ignoring event");
        return CoreStep::idle();
    };

    let mut step = deliver_notice(
        manager,
        plugin,
        &vertex,
        &PluginNotice::ManagerEvent { payload },
    );
    step.merge(maybe_commit_defaults(manager, &vertex));

    CoreStep::running(commands_from_step(manager, &vertex, step))
}

/// Handle DAG cancellation: abort unconfigured vertices, discard buffers,
/// and stop the loop. Late plugin callbacks are rejected by the manager
/// with `VertexCanceled`.
pub fn handle_dag_canceled(manager: &mut VertexManager) -> CoreStep {
    manager.cancel_dag();
    CoreStep {
        commands: Vec::new(),
        keep_running: false,
    }
}

/// Deliver one buffered-or-live event to the plugin inside a fresh context.
fn deliver_notice(
    manager: &mut VertexManager,
    plugin: &mut Box<dyn VertexManagerPlugin>,
    vertex: &str,
    notice: &PluginNotice,
) -> AdmissionStep {
    let mut ctx = RuntimeContext::new(vertex.to_string(), manager);

    let result = match notice {
        PluginNotice::SourceTask(event) => plugin.on_source_task_event(&mut ctx, event),
        PluginNotice::ManagerEvent { payload } => plugin.on_vertex_manager_event(&mut ctx, payload),
    };

    if let Err(e) = result {
        error!(vertex = %vertex, error = %e, "plugin event callback failed");
    }

    ctx.take_step()
}

/// Commit the declared parallelism if the plugin asked for tasks to start
/// while the vertex was still unconfigured: scheduling implies the plugin
/// declined its one allowed reconfiguration.
fn maybe_commit_defaults(manager: &mut VertexManager, vertex: &str) -> AdmissionStep {
    let wants_defaults = manager
        .vertex(vertex)
        .map(|s| !s.lifecycle.is_configured() && !s.pending_schedule.is_empty())
        .unwrap_or(false);

    if !wants_defaults {
        return AdmissionStep::default();
    }

    match manager.configure_with_defaults(vertex) {
        Ok(step) => step,
        Err(e) => {
            warn!(vertex = %vertex, error = %e, "failed to configure vertex with defaults");
            AdmissionStep::default()
        }
    }
}

/// Turn accumulated admissions into scheduler commands.
fn commands_from_step(
    manager: &VertexManager,
    vertex: &str,
    step: AdmissionStep,
) -> Vec<CoreCommand> {
    if step.admitted.is_empty() {
        return Vec::new();
    }

    let location_hint = manager
        .vertex(vertex)
        .ok()
        .and_then(|s| s.location_hint.clone());

    vec![CoreCommand::AdmitTasks {
        vertex: vertex.to_string(),
        task_indices: step.admitted,
        location_hint,
    }]
}
