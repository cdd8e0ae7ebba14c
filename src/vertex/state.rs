// src/vertex/state.rs

//! Mutable per-vertex record.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use crate::engine::PluginNotice;
use crate::routing::{EventRouter, RoutingDescriptor};
use crate::topology::{InputEdge, VertexTopology};
use crate::types::{VertexLocationHint, VertexName};

/// Lifecycle of a vertex within this component.
///
/// Parallelism and routing are mutable only in `Unconfigured` and
/// `Reconfiguring`; no transition leaves `Configured` except towards
/// `TasksScheduled`. `Aborted` is terminal and only reachable through DAG
/// cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLifecycle {
    /// Created from the topology; the plugin has not been invoked yet.
    Unconfigured,
    /// The plugin has been invoked and may still change parallelism/routing.
    Reconfiguring,
    /// Parallelism and routing are frozen.
    Configured,
    /// Frozen, and at least one task has been admitted for execution.
    TasksScheduled,
    /// The enclosing DAG was canceled before this vertex was configured.
    Aborted,
}

impl VertexLifecycle {
    /// Whether parallelism and routing are frozen.
    pub fn is_configured(&self) -> bool {
        matches!(
            self,
            VertexLifecycle::Configured | VertexLifecycle::TasksScheduled
        )
    }
}

/// Per-vertex record holding current parallelism, installed routing
/// descriptors, the one-shot reconfiguration latch, and the buffers used
/// before the plugin is ready.
///
/// All mutation goes through [`super::VertexManager`].
#[derive(Debug)]
pub struct VertexState {
    pub name: VertexName,
    pub declared_parallelism: usize,
    /// Current task count. Equals `declared_parallelism` until a committed
    /// reconfiguration shrinks it.
    pub parallelism: usize,
    pub lifecycle: VertexLifecycle,
    /// One-shot latch: set when a parallelism change is committed.
    pub reconfigured: bool,

    /// Input edges, copied from the topology snapshot. Immutable.
    pub input_edges: Vec<InputEdge>,
    /// Non-vertex input source names. Immutable.
    pub extra_inputs: BTreeSet<String>,

    /// Installed routing descriptors per input edge, keyed by source vertex
    /// name. Empty until the vertex is configured; after that the map is
    /// only ever replaced wholesale, never edited in place.
    pub(crate) routing: BTreeMap<VertexName, Arc<RoutingDescriptor>>,

    /// Monotone set of admitted task indices.
    pub ready: BTreeSet<usize>,
    /// Schedule requests received before configuration, in request order.
    pub(crate) pending_schedule: Vec<usize>,

    pub location_hint: Option<VertexLocationHint>,

    /// Whether `on_vertex_started` has been delivered to the plugin.
    pub plugin_started: bool,
    /// Events received before the plugin was started, in arrival order.
    pub(crate) buffered_notices: VecDeque<PluginNotice>,
}

impl VertexState {
    pub fn from_topology(topo: &VertexTopology) -> Self {
        Self {
            name: topo.name.clone(),
            declared_parallelism: topo.declared_parallelism,
            parallelism: topo.declared_parallelism,
            lifecycle: VertexLifecycle::Unconfigured,
            reconfigured: false,
            input_edges: topo.input_edges.clone(),
            extra_inputs: topo.extra_inputs.clone(),
            routing: BTreeMap::new(),
            ready: BTreeSet::new(),
            pending_schedule: Vec::new(),
            location_hint: None,
            plugin_started: false,
            buffered_notices: VecDeque::new(),
        }
    }

    /// Snapshot router over the currently installed descriptors.
    ///
    /// Returns `None` while the vertex is earlier than `Configured`; events
    /// destined for an unconfigured vertex must not be routed.
    pub fn router(&self) -> Option<EventRouter> {
        if !self.lifecycle.is_configured() {
            return None;
        }
        Some(EventRouter::new(self.name.clone(), self.routing.clone()))
    }

    /// The declared data movement of the edge from `source`, if one exists.
    pub fn edge_from(&self, source: &str) -> Option<&InputEdge> {
        self.input_edges.iter().find(|e| e.source == source)
    }
}
