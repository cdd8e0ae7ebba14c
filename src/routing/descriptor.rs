// src/routing/descriptor.rs

//! Immutable routing descriptors.
//!
//! A descriptor is a pure function `(source_task, source_task_count) ->
//! destination task indices` over a declared destination task count. Once
//! installed for an edge it is never mutated; reconfiguration replaces the
//! whole descriptor value, so readers observe either the old or the new
//! descriptor, never a mix.

use std::fmt;
use std::sync::Arc;

use crate::types::DataMovement;

/// Plugin-supplied routing function: `(source_task, source_task_count)` to
/// destination task indices. Must be deterministic.
pub type RouteFn = Arc<dyn Fn(usize, usize) -> Vec<usize> + Send + Sync>;

/// How events fan out across an edge.
#[derive(Clone)]
pub enum RoutePattern {
    /// Index-to-index; meaningful when source and destination counts match.
    OneToOne,
    /// Every source task reaches every destination task.
    Broadcast,
    /// Every source task produces one partition per destination task, so
    /// every destination observes every source event.
    ScatterGather,
    /// Plugin-supplied routing function.
    Custom(RouteFn),
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePattern::OneToOne => write!(f, "OneToOne"),
            RoutePattern::Broadcast => write!(f, "Broadcast"),
            RoutePattern::ScatterGather => write!(f, "ScatterGather"),
            RoutePattern::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Immutable description of how events route across one edge for a given
/// destination parallelism.
#[derive(Debug, Clone)]
pub struct RoutingDescriptor {
    dest_task_count: usize,
    pattern: RoutePattern,
}

impl RoutingDescriptor {
    pub fn one_to_one(dest_task_count: usize) -> Self {
        Self {
            dest_task_count,
            pattern: RoutePattern::OneToOne,
        }
    }

    pub fn broadcast(dest_task_count: usize) -> Self {
        Self {
            dest_task_count,
            pattern: RoutePattern::Broadcast,
        }
    }

    pub fn scatter_gather(dest_task_count: usize) -> Self {
        Self {
            dest_task_count,
            pattern: RoutePattern::ScatterGather,
        }
    }

    pub fn custom(dest_task_count: usize, route: RouteFn) -> Self {
        Self {
            dest_task_count,
            pattern: RoutePattern::Custom(route),
        }
    }

    /// Default descriptor for an edge, derived from its declared
    /// data-movement pattern and the destination task count.
    pub fn default_for(movement: DataMovement, dest_task_count: usize) -> Self {
        match movement {
            DataMovement::OneToOne => Self::one_to_one(dest_task_count),
            DataMovement::Broadcast => Self::broadcast(dest_task_count),
            DataMovement::ScatterGather => Self::scatter_gather(dest_task_count),
        }
    }

    /// Destination task count this descriptor was built for.
    ///
    /// A descriptor is only installable while this matches the vertex's
    /// parallelism at the moment of installation.
    pub fn dest_task_count(&self) -> usize {
        self.dest_task_count
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Destination task indices for an event from `source_task` out of
    /// `source_task_count` source tasks.
    ///
    /// Total over its domain: out-of-range inputs yield an empty set rather
    /// than panicking, and custom outputs are clamped to the destination
    /// range.
    pub fn route(&self, source_task: usize, source_task_count: usize) -> Vec<usize> {
        if source_task >= source_task_count {
            return Vec::new();
        }

        match &self.pattern {
            RoutePattern::OneToOne => {
                if source_task < self.dest_task_count {
                    vec![source_task]
                } else {
                    Vec::new()
                }
            }
            RoutePattern::Broadcast | RoutePattern::ScatterGather => {
                (0..self.dest_task_count).collect()
            }
            RoutePattern::Custom(route) => {
                let mut targets = route(source_task, source_task_count);
                targets.retain(|&t| t < self.dest_task_count);
                targets.sort_unstable();
                targets.dedup();
                targets
            }
        }
    }
}
