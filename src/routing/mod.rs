// src/routing/mod.rs

//! Event routing across edges.
//!
//! - [`descriptor`] defines the immutable [`RoutingDescriptor`] values that
//!   describe how events fan out across one edge.
//! - [`router`] provides the [`EventRouter`], a read-only view over the
//!   descriptors installed for a configured vertex.

pub mod descriptor;
pub mod router;

pub use descriptor::{RouteFn, RoutePattern, RoutingDescriptor};
pub use router::EventRouter;
