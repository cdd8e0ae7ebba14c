// src/engine/mod.rs

//! Vertex manager runtime.
//!
//! This module ties together:
//! - the per-vertex state held by the [`crate::vertex::VertexManager`]
//! - the policy plugins deciding parallelism and routing
//! - the main runtime event loop that reacts to:
//!   - vertex start notifications
//!   - upstream source-task events
//!   - opaque vertex-manager events from running tasks
//!   - DAG cancellation and shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::types::VertexName;

/// What happened to an upstream task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTaskEventKind {
    /// The source task completed.
    Completed,
    /// The source task reported the size of its output for this edge.
    OutputReport { bytes: u64 },
}

/// A meaningful state change of an upstream task on an edge feeding a
/// vertex.
///
/// Events from a single source task are delivered in the order they were
/// produced; no ordering holds across different source tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTaskEvent {
    /// Vertex whose plugin should observe the event.
    pub dest: VertexName,
    /// Source vertex of the edge the event arrived on.
    pub source: VertexName,
    /// Index of the source task within its vertex.
    pub source_task: usize,
    pub kind: SourceTaskEventKind,
}

/// An event destined for a plugin, buffered while the plugin has not been
/// started yet.
#[derive(Debug, Clone)]
pub enum PluginNotice {
    SourceTask(SourceTaskEvent),
    /// Opaque payload sent by a running task to its vertex's manager.
    ManagerEvent { payload: Vec<u8> },
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once every vertex is configured and all of
    /// its tasks have been admitted (used for `--once`).
    pub exit_when_quiescent: bool,
}

/// Events flowing into the runtime from the engine's control plane and from
/// upstream tasks.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A vertex is starting; invoke its policy plugin.
    VertexStarted { vertex: VertexName },
    /// An upstream task changed state on an edge feeding `event.dest`.
    SourceTask(SourceTaskEvent),
    /// A running task sent an opaque payload to `vertex`'s manager.
    VertexManagerEvent { vertex: VertexName, payload: Vec<u8> },
    /// The enclosing DAG was canceled.
    DagCanceled,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use self::core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
