// tests/location_hints.rs

//! Location hints: stored via the context, forwarded verbatim with every
//! admission, and advisory only.

use std::sync::Arc;

use vertexman::engine::{CoreCommand, CoreRuntime, RuntimeEvent, RuntimeOptions, SourceTaskEvent};
use vertexman::errors::Result;
use vertexman::plugin::{VertexManagerContext, VertexManagerPlugin};
use vertexman::topology::TopologySnapshot;
use vertexman::types::VertexLocationHint;
use vertexman::vertex::VertexManager;
use vertexman_test_utils::builders::{DagFileBuilder, VertexSpecBuilder};
use vertexman_test_utils::init_tracing;

fn two_task_snapshot() -> Arc<TopologySnapshot> {
    let dag = DagFileBuilder::new()
        .with_vertex("a", VertexSpecBuilder::new(2).build())
        .build();
    Arc::new(TopologySnapshot::from_dag(&dag))
}

/// Plugin that stores a placement hint before asking for its tasks.
struct HintedStart;

impl VertexManagerPlugin for HintedStart {
    fn on_vertex_started(&mut self, ctx: &mut dyn VertexManagerContext) -> Result<()> {
        ctx.set_vertex_location_hint(VertexLocationHint::for_hosts(vec![
            vec!["node-1".to_string()],
            vec!["node-2".to_string()],
        ]))?;
        ctx.schedule_vertex_tasks(&[0, 1])
    }

    fn on_source_task_event(
        &mut self,
        _ctx: &mut dyn VertexManagerContext,
        _event: &SourceTaskEvent,
    ) -> Result<()> {
        Ok(())
    }
}

#[test]
fn admissions_carry_the_stored_hint() {
    init_tracing();

    let plugins: Vec<(String, Box<dyn VertexManagerPlugin>)> =
        vec![("a".to_string(), Box::new(HintedStart))];
    let mut core = CoreRuntime::new(two_task_snapshot(), plugins, RuntimeOptions::default());

    let step = core.step(RuntimeEvent::VertexStarted {
        vertex: "a".to_string(),
    });

    assert_eq!(step.commands.len(), 1);
    match &step.commands[0] {
        CoreCommand::AdmitTasks {
            vertex,
            task_indices,
            location_hint,
        } => {
            assert_eq!(vertex, "a");
            assert_eq!(task_indices, &vec![0, 1]);

            let hint = location_hint.as_ref().expect("hint must be forwarded");
            assert_eq!(hint.per_task.len(), 2);
            assert_eq!(hint.per_task[0].hosts, vec!["node-1".to_string()]);
            assert_eq!(hint.per_task[1].hosts, vec!["node-2".to_string()]);
        }
    }
}

#[test]
fn hints_do_not_affect_parallelism_or_admission() {
    init_tracing();
    let mut manager = VertexManager::new(two_task_snapshot());

    manager
        .set_location_hint("a", VertexLocationHint::for_hosts(vec![vec![
            "node-9".to_string(),
        ]]))
        .unwrap();

    assert_eq!(manager.vertex_num_tasks("a").unwrap(), 2);

    manager.configure_with_defaults("a").unwrap();
    let step = manager.schedule_tasks("a", &[0, 1]).unwrap();
    assert_eq!(step.admitted, vec![0, 1]);

    let state = manager.vertex("a").unwrap();
    let hint = state.location_hint.as_ref().expect("hint stored");
    assert_eq!(hint.per_task[0].hosts, vec!["node-9".to_string()]);
}
