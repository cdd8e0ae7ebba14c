// src/plugin/mod.rs

//! Policy plugin boundary.
//!
//! A policy plugin decides, for exactly one vertex, whether to change the
//! vertex's parallelism and event routing and when its tasks should start.
//! The runtime holds an opaque handle to the plugin and never branches on
//! the concrete policy type.
//!
//! - [`VertexManagerContext`] is the fixed set of operations the runtime
//!   exposes to a plugin during a callback.
//! - [`VertexManagerPlugin`] is the callback set the runtime consumes.
//! - [`context`] provides the runtime-side context implementation.
//! - [`immediate`] contains the trivial built-in policy that starts every
//!   task as soon as the vertex starts.

pub mod context;
pub mod immediate;

use std::collections::{BTreeMap, BTreeSet};

use crate::engine::SourceTaskEvent;
use crate::errors::Result;
use crate::routing::RoutingDescriptor;
use crate::types::{DataMovement, VertexLocationHint, VertexName};

pub use context::RuntimeContext;
pub use immediate::ImmediateStartPolicy;

/// Operations the runtime exposes to a policy plugin.
///
/// Callbacks for one vertex are serialized by the runtime, so plugin
/// implementations need no internal synchronization.
pub trait VertexManagerContext {
    /// Name of the vertex this plugin manages.
    fn vertex_name(&self) -> &str;

    /// Edge properties on the input edges of this vertex, keyed by source
    /// vertex name. Immutable after DAG submission.
    fn input_vertex_edge_properties(&self) -> BTreeMap<VertexName, DataMovement>;

    /// Current number of tasks in the given vertex. Live: reflects that
    /// vertex's own committed reconfiguration.
    fn vertex_num_tasks(&self, vertex: &str) -> Result<usize>;

    /// Change this vertex's parallelism and, for the listed source edges,
    /// its event routing. Allowed at most once per vertex.
    ///
    /// Returns `Ok(false)` without effect if the one-shot latch is already
    /// set, so benign re-entry is not an error. Invalid requests (zero or
    /// growing parallelism, descriptors built for another task count,
    /// unknown sources) fail with the corresponding typed error and leave
    /// the vertex unchanged and still reconfigurable.
    fn set_vertex_parallelism(
        &mut self,
        parallelism: usize,
        source_edge_descriptors: BTreeMap<VertexName, RoutingDescriptor>,
    ) -> Result<bool>;

    /// Ask the engine to start the given tasks of this vertex.
    ///
    /// May be called incrementally, before or after reconfiguration.
    /// Indices requested before the final parallelism is known are buffered
    /// and validated at configuration time; out-of-range indices are dropped
    /// with a warning. Idempotent per index.
    fn schedule_vertex_tasks(&mut self, task_indices: &[usize]) -> Result<()>;

    /// Names of the non-vertex inputs of this vertex. May be empty.
    fn vertex_input_names(&self) -> BTreeSet<String>;

    /// Store an advisory placement hint, forwarded verbatim to the task
    /// scheduler with every admission.
    fn set_vertex_location_hint(&mut self, hint: VertexLocationHint) -> Result<()>;
}

/// Callbacks a policy plugin must implement.
pub trait VertexManagerPlugin: Send {
    /// The vertex is starting; upstream vertices may already be running.
    fn on_vertex_started(&mut self, ctx: &mut dyn VertexManagerContext) -> Result<()>;

    /// An upstream task changed state on an edge feeding this vertex.
    fn on_source_task_event(
        &mut self,
        ctx: &mut dyn VertexManagerContext,
        event: &SourceTaskEvent,
    ) -> Result<()>;

    /// A running task sent an opaque payload to this vertex's manager.
    fn on_vertex_manager_event(
        &mut self,
        ctx: &mut dyn VertexManagerContext,
        payload: &[u8],
    ) -> Result<()> {
        let _ = (ctx, payload);
        Ok(())
    }
}
