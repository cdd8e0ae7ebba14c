// src/sched/backend.rs

//! Pluggable scheduler backend abstraction.
//!
//! The runtime talks to a `SchedulerBackend` instead of a raw mpsc sender.
//! This makes it easy to swap in a fake scheduler in tests while keeping
//! the channel-backed implementation for production.
//!
//! - `ChannelSchedulerBackend` forwards admissions over an mpsc channel to
//!   whatever task scheduler the surrounding engine provides.
//! - Tests can provide their own `SchedulerBackend` that, for example,
//!   records admissions and feeds source-task events back into the runtime.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::errors::Result;
use crate::types::{VertexLocationHint, VertexName};

/// A batch of tasks of one vertex that may now execute.
#[derive(Debug, Clone)]
pub struct TaskAdmission {
    pub vertex: VertexName,
    /// Admitted task indices, in admission order.
    pub task_indices: Vec<usize>,
    /// Advisory placement preference, forwarded verbatim.
    pub location_hint: Option<VertexLocationHint>,
}

/// Trait abstracting how admitted tasks reach the external task scheduler.
///
/// All cross-vertex effects are asynchronous fire-and-forget notifications;
/// an implementation must not block on other vertices.
pub trait SchedulerBackend: Send {
    /// Forward the given admission to the task scheduler.
    fn admit_tasks(
        &mut self,
        admission: TaskAdmission,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Channel-backed scheduler backend used in production.
///
/// The external task scheduler owns the receiving half of the channel.
pub struct ChannelSchedulerBackend {
    tx: mpsc::Sender<TaskAdmission>,
}

impl ChannelSchedulerBackend {
    pub fn new(tx: mpsc::Sender<TaskAdmission>) -> Self {
        Self { tx }
    }
}

impl SchedulerBackend for ChannelSchedulerBackend {
    fn admit_tasks(
        &mut self,
        admission: TaskAdmission,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            tx.send(admission).await.map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
