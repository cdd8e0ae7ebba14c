// src/sched/mod.rs

//! Task scheduler boundary.
//!
//! The runtime never places tasks itself; it notifies an external task
//! scheduler which tasks of a vertex are ready to execute. The boundary is
//! the [`SchedulerBackend`] trait so tests can substitute a fake scheduler
//! without any channel plumbing.

pub mod backend;

pub use backend::{ChannelSchedulerBackend, SchedulerBackend, TaskAdmission};
