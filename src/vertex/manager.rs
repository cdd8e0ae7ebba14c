// src/vertex/manager.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::PluginNotice;
use crate::errors::{Result, VertexManagerError};
use crate::routing::{EventRouter, RoutingDescriptor};
use crate::topology::TopologySnapshot;
use crate::types::{DataMovement, VertexLocationHint, VertexName};
use crate::vertex::state::{VertexLifecycle, VertexState};
use crate::vertex::step::AdmissionStep;

/// Single authority for mutating vertex parallelism/routing and for
/// admitting ready-task notifications.
///
/// Holds the immutable topology snapshot plus one mutable [`VertexState`]
/// per vertex, indexed by name. Cross-vertex queries go through name-based
/// lookup; `vertex_num_tasks` is live (it reflects the queried vertex's own
/// committed reconfiguration) while a vertex's input edge properties are
/// answered from the snapshot.
#[derive(Debug)]
pub struct VertexManager {
    topology: Arc<TopologySnapshot>,
    vertices: BTreeMap<VertexName, VertexState>,
    canceled: bool,
}

impl VertexManager {
    pub fn new(topology: Arc<TopologySnapshot>) -> Self {
        let mut vertices = BTreeMap::new();
        for name in topology.vertex_names() {
            // vertex_names comes from the same snapshot; lookup cannot fail.
            if let Some(topo) = topology.vertex(name) {
                vertices.insert(name.to_string(), VertexState::from_topology(topo));
            }
        }

        Self {
            topology,
            vertices,
            canceled: false,
        }
    }

    pub fn topology(&self) -> &TopologySnapshot {
        &self.topology
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Read-only view of a vertex's state.
    pub fn vertex(&self, name: &str) -> Result<&VertexState> {
        self.vertices
            .get(name)
            .ok_or_else(|| VertexManagerError::UnknownVertex(name.to_string()))
    }

    fn vertex_mut(&mut self, name: &str) -> Result<&mut VertexState> {
        self.vertices
            .get_mut(name)
            .ok_or_else(|| VertexManagerError::UnknownVertex(name.to_string()))
    }

    fn ensure_live(&self, name: &str) -> Result<()> {
        if self.canceled {
            return Err(VertexManagerError::VertexCanceled(name.to_string()));
        }
        Ok(())
    }

    /// Current task count of any vertex in the DAG (live, not snapshot).
    pub fn vertex_num_tasks(&self, name: &str) -> Result<usize> {
        Ok(self.vertex(name)?.parallelism)
    }

    /// Edge properties on the input edges of `vertex`, keyed by source
    /// vertex name. Answered from the submission-time snapshot.
    pub fn input_edge_properties(&self, vertex: &str) -> Result<BTreeMap<VertexName, DataMovement>> {
        let state = self.vertex(vertex)?;
        Ok(state
            .input_edges
            .iter()
            .map(|e| (e.source.clone(), e.movement))
            .collect())
    }

    /// Names of the non-vertex inputs of `vertex`. May be empty, never
    /// ambiguous about emptiness.
    pub fn vertex_input_names(&self, vertex: &str) -> Result<std::collections::BTreeSet<String>> {
        Ok(self.vertex(vertex)?.extra_inputs.clone())
    }

    /// Routing snapshot for a configured vertex.
    ///
    /// `Ok(None)` while the vertex has not reached `Configured`; events for
    /// it must not be routed yet.
    pub fn router(&self, vertex: &str) -> Result<Option<EventRouter>> {
        Ok(self.vertex(vertex)?.router())
    }

    /// Record that the policy plugin has been invoked for this vertex.
    pub fn mark_reconfiguring(&mut self, vertex: &str) -> Result<()> {
        self.ensure_live(vertex)?;
        let state = self.vertex_mut(vertex)?;
        if state.lifecycle == VertexLifecycle::Unconfigured {
            debug!(vertex = %state.name, "plugin invoked; vertex is now reconfiguring");
            state.lifecycle = VertexLifecycle::Reconfiguring;
        }
        Ok(())
    }

    /// Record that `on_vertex_started` has been delivered to the plugin.
    pub fn mark_plugin_started(&mut self, vertex: &str) -> Result<()> {
        self.vertex_mut(vertex)?.plugin_started = true;
        Ok(())
    }

    /// Buffer an event that arrived before the plugin was started.
    pub fn buffer_notice(&mut self, vertex: &str, notice: PluginNotice) -> Result<()> {
        self.ensure_live(vertex)?;
        let state = self.vertex_mut(vertex)?;
        state.buffered_notices.push_back(notice);
        Ok(())
    }

    /// Drain buffered events in arrival order for replay to the plugin.
    pub fn drain_notices(&mut self, vertex: &str) -> Result<Vec<PluginNotice>> {
        let state = self.vertex_mut(vertex)?;
        Ok(state.buffered_notices.drain(..).collect())
    }

    /// Commit a one-time parallelism change for `vertex`.
    ///
    /// Validates everything before mutating anything, so a rejected attempt
    /// leaves the vertex exactly as it was (still reconfigurable, default
    /// routing still derivable). On success the new descriptor map is built
    /// completely and assigned in a single replacement: edges listed in
    /// `descriptors` get the supplied descriptor, every other input edge
    /// gets the default derived from its data-movement pattern at the new
    /// count. Returns the admissions produced by flushing schedule requests
    /// that were buffered before configuration.
    pub fn set_parallelism(
        &mut self,
        vertex: &str,
        new_count: usize,
        descriptors: BTreeMap<VertexName, RoutingDescriptor>,
    ) -> Result<AdmissionStep> {
        self.ensure_live(vertex)?;
        let state = self.vertex_mut(vertex)?;

        if state.reconfigured || state.lifecycle.is_configured() {
            return Err(VertexManagerError::AlreadyReconfigured(state.name.clone()));
        }

        if new_count == 0 {
            return Err(VertexManagerError::InvalidParallelism {
                vertex: state.name.clone(),
                requested: new_count,
                reason: "parallelism must be >= 1".to_string(),
            });
        }

        if new_count > state.declared_parallelism {
            return Err(VertexManagerError::InvalidParallelism {
                vertex: state.name.clone(),
                requested: new_count,
                reason: format!(
                    "parallelism may only shrink or stay equal to the declared count {}",
                    state.declared_parallelism
                ),
            });
        }

        for (source, descriptor) in descriptors.iter() {
            if state.edge_from(source).is_none() {
                return Err(VertexManagerError::UnknownVertex(source.clone()));
            }
            if descriptor.dest_task_count() != new_count {
                return Err(VertexManagerError::InconsistentEdgeDescriptor {
                    vertex: state.name.clone(),
                    source_vertex: source.clone(),
                    descriptor_tasks: descriptor.dest_task_count(),
                    expected_tasks: new_count,
                });
            }
        }

        // All checks passed; apply the whole decision at once.
        let mut descriptors = descriptors;
        let mut routing: BTreeMap<VertexName, Arc<RoutingDescriptor>> = BTreeMap::new();
        for edge in state.input_edges.iter() {
            let descriptor = match descriptors.remove(&edge.source) {
                Some(d) => d,
                None => RoutingDescriptor::default_for(edge.movement, new_count),
            };
            routing.insert(edge.source.clone(), Arc::new(descriptor));
        }

        info!(
            vertex = %state.name,
            declared = state.declared_parallelism,
            parallelism = new_count,
            "committing one-time parallelism change"
        );

        state.parallelism = new_count;
        state.routing = routing;
        state.reconfigured = true;
        state.lifecycle = VertexLifecycle::Configured;

        self.flush_pending_schedule(vertex)
    }

    /// Freeze `vertex` at its declared parallelism with default routing.
    ///
    /// This is the decline path: the plugin finished deciding without
    /// changing parallelism. Does not set the reconfiguration latch; the
    /// `Configured` lifecycle alone makes later changes impossible.
    pub fn configure_with_defaults(&mut self, vertex: &str) -> Result<AdmissionStep> {
        self.ensure_live(vertex)?;
        let state = self.vertex_mut(vertex)?;

        if state.lifecycle.is_configured() {
            return Ok(AdmissionStep::default());
        }

        let count = state.parallelism;
        let mut routing = BTreeMap::new();
        for edge in state.input_edges.iter() {
            routing.insert(
                edge.source.clone(),
                Arc::new(RoutingDescriptor::default_for(edge.movement, count)),
            );
        }

        debug!(
            vertex = %state.name,
            parallelism = count,
            "configuring vertex with declared parallelism and default routing"
        );

        state.routing = routing;
        state.lifecycle = VertexLifecycle::Configured;

        self.flush_pending_schedule(vertex)
    }

    /// Add task indices to the ready set and report what changed.
    ///
    /// Before configuration the indices are buffered; they are validated
    /// against the final parallelism at commit/decline time. After
    /// configuration, out-of-range indices are dropped with a warning and
    /// in-range indices are admitted at most once.
    pub fn schedule_tasks(&mut self, vertex: &str, indices: &[usize]) -> Result<AdmissionStep> {
        self.ensure_live(vertex)?;
        let state = self.vertex_mut(vertex)?;

        if !state.lifecycle.is_configured() {
            let mut buffered = 0;
            for &idx in indices {
                if !state.pending_schedule.contains(&idx) {
                    state.pending_schedule.push(idx);
                    buffered += 1;
                }
            }
            debug!(
                vertex = %state.name,
                ?indices,
                "vertex not configured yet; buffering schedule request"
            );
            return Ok(AdmissionStep {
                admitted: Vec::new(),
                dropped: Vec::new(),
                buffered,
            });
        }

        Ok(Self::admit_into(state, indices))
    }

    /// Store an advisory placement hint, forwarded verbatim with admissions.
    pub fn set_location_hint(&mut self, vertex: &str, hint: VertexLocationHint) -> Result<()> {
        self.ensure_live(vertex)?;
        let state = self.vertex_mut(vertex)?;
        state.location_hint = Some(hint);
        Ok(())
    }

    /// Transition every not-yet-configured vertex to `Aborted` and discard
    /// buffered work. Any later mutating call answers `VertexCanceled`.
    pub fn cancel_dag(&mut self) {
        self.canceled = true;

        for state in self.vertices.values_mut() {
            state.pending_schedule.clear();
            state.buffered_notices.clear();

            if !state.lifecycle.is_configured() {
                warn!(vertex = %state.name, "DAG canceled; aborting unconfigured vertex");
                state.lifecycle = VertexLifecycle::Aborted;
            }
        }
    }

    /// Whether every vertex is configured with its full ready set admitted.
    pub fn fully_scheduled(&self) -> bool {
        self.vertices.values().all(|s| {
            s.lifecycle == VertexLifecycle::TasksScheduled && s.ready.len() == s.parallelism
        })
    }

    /// Validate and apply schedule requests buffered before configuration.
    fn flush_pending_schedule(&mut self, vertex: &str) -> Result<AdmissionStep> {
        let state = self.vertex_mut(vertex)?;
        if state.pending_schedule.is_empty() {
            return Ok(AdmissionStep::default());
        }

        let pending = std::mem::take(&mut state.pending_schedule);
        Ok(Self::admit_into(state, &pending))
    }

    fn admit_into(state: &mut VertexState, indices: &[usize]) -> AdmissionStep {
        let mut step = AdmissionStep::default();

        for &idx in indices {
            if idx >= state.parallelism {
                warn!(
                    vertex = %state.name,
                    task = idx,
                    parallelism = state.parallelism,
                    "dropping task index outside the vertex's task range"
                );
                step.dropped.push(idx);
                continue;
            }
            if state.ready.insert(idx) {
                step.admitted.push(idx);
            }
        }

        if !step.admitted.is_empty() && state.lifecycle == VertexLifecycle::Configured {
            state.lifecycle = VertexLifecycle::TasksScheduled;
        }

        step
    }
}
