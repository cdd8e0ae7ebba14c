// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::sched::{SchedulerBackend, TaskAdmission};

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives the vertex managers in response to `RuntimeEvent`s, and delegates
/// task admission to a `SchedulerBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics. This struct handles async IO: reading events from
/// channels and forwarding admissions to the external task scheduler.
pub struct Runtime<S: SchedulerBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    scheduler: S,
}

impl<S: SchedulerBackend> fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<S: SchedulerBackend> Runtime<S> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, scheduler: S) -> Self {
        Self {
            core,
            event_rx,
            scheduler,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes the commands returned by the core (admit tasks, exit).
    pub async fn run(mut self) -> Result<()> {
        info!("vertexman runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            // Feed the event into the pure core and get commands back.
            let step = self.core.step(event);

            // Execute the commands.
            for command in step.commands {
                self.execute_command(command).await?;
            }

            // If the core says to stop, break out of the loop.
            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::AdmitTasks {
                vertex,
                task_indices,
                location_hint,
            } => {
                debug!(vertex = %vertex, ?task_indices, "admitting tasks to the scheduler");
                self.scheduler
                    .admit_tasks(TaskAdmission {
                        vertex,
                        task_indices,
                        location_hint,
                    })
                    .await?;
            }
        }
        Ok(())
    }
}
