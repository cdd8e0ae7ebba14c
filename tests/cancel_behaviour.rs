// tests/cancel_behaviour.rs

//! DAG cancellation: unconfigured vertices abort, buffers are discarded,
//! and late plugin callbacks are rejected instead of applied silently.

use std::collections::BTreeMap;
use std::sync::Arc;

use vertexman::engine::{CoreRuntime, RuntimeEvent, RuntimeOptions};
use vertexman::errors::{Result, VertexManagerError};
use vertexman::plugin::{ImmediateStartPolicy, VertexManagerContext, VertexManagerPlugin};
use vertexman::topology::TopologySnapshot;
use vertexman::types::DataMovement;
use vertexman::vertex::{VertexLifecycle, VertexManager};
use vertexman_test_utils::builders::{DagFileBuilder, VertexSpecBuilder};
use vertexman_test_utils::init_tracing;

fn chain_snapshot() -> Arc<TopologySnapshot> {
    let dag = DagFileBuilder::new()
        .with_vertex("a", VertexSpecBuilder::new(2).build())
        .with_vertex(
            "b",
            VertexSpecBuilder::new(3)
                .input("a", DataMovement::Broadcast)
                .build(),
        )
        .build();
    Arc::new(TopologySnapshot::from_dag(&dag))
}

#[test]
fn cancel_aborts_unconfigured_vertices_and_rejects_late_calls() {
    init_tracing();
    let mut manager = VertexManager::new(chain_snapshot());

    // a is configured before the cancel; b is still reconfiguring.
    manager.configure_with_defaults("a").unwrap();
    manager.mark_reconfiguring("b").unwrap();
    manager.schedule_tasks("b", &[0]).unwrap(); // buffered

    manager.cancel_dag();

    assert_eq!(
        manager.vertex("a").unwrap().lifecycle,
        VertexLifecycle::Configured
    );
    assert_eq!(
        manager.vertex("b").unwrap().lifecycle,
        VertexLifecycle::Aborted
    );

    // Late callbacks answer VertexCanceled rather than applying silently.
    let err = manager
        .set_parallelism("b", 2, BTreeMap::new())
        .unwrap_err();
    assert!(matches!(err, VertexManagerError::VertexCanceled(_)));

    let err = manager.schedule_tasks("b", &[1]).unwrap_err();
    assert!(matches!(err, VertexManagerError::VertexCanceled(_)));
}

/// Plugin whose start callback arrives only after the DAG was canceled.
struct LateStarter;

impl VertexManagerPlugin for LateStarter {
    fn on_vertex_started(&mut self, ctx: &mut dyn VertexManagerContext) -> Result<()> {
        // The runtime never invokes this after cancellation; reaching it
        // would schedule tasks on an aborted vertex.
        ctx.schedule_vertex_tasks(&[0])
    }

    fn on_source_task_event(
        &mut self,
        _ctx: &mut dyn VertexManagerContext,
        _event: &vertexman::engine::SourceTaskEvent,
    ) -> Result<()> {
        Ok(())
    }
}

#[test]
fn core_stops_and_ignores_events_after_cancellation() {
    init_tracing();

    let plugins: Vec<(String, Box<dyn VertexManagerPlugin>)> = vec![
        ("a".to_string(), Box::new(ImmediateStartPolicy)),
        ("b".to_string(), Box::new(LateStarter)),
    ];
    let mut core = CoreRuntime::new(chain_snapshot(), plugins, RuntimeOptions::default());

    let step = core.step(RuntimeEvent::DagCanceled);
    assert!(!step.keep_running);
    assert!(step.commands.is_empty());

    // A vertex start arriving after the cancel produces no admissions.
    let step = core.step(RuntimeEvent::VertexStarted {
        vertex: "b".to_string(),
    });
    assert!(step.commands.is_empty());
    assert_eq!(
        core.manager().vertex("b").unwrap().lifecycle,
        VertexLifecycle::Aborted
    );
}
