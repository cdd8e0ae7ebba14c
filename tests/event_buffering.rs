// tests/event_buffering.rs

//! Buffering and in-order replay of events that arrive before the plugin
//! is started, plus an event-driven reconfiguration scenario stepped
//! through the pure core.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use vertexman::engine::{
    CoreCommand, CoreRuntime, RuntimeEvent, RuntimeOptions, SourceTaskEvent, SourceTaskEventKind,
};
use vertexman::errors::Result;
use vertexman::plugin::{VertexManagerContext, VertexManagerPlugin};
use vertexman::routing::RoutingDescriptor;
use vertexman::topology::TopologySnapshot;
use vertexman::types::DataMovement;
use vertexman_test_utils::builders::{DagFileBuilder, VertexSpecBuilder};
use vertexman_test_utils::init_tracing;

/// Plugin that records every source task event it observes.
struct RecordingPlugin {
    seen: Arc<Mutex<Vec<(String, usize)>>>,
}

impl VertexManagerPlugin for RecordingPlugin {
    fn on_vertex_started(&mut self, _ctx: &mut dyn VertexManagerContext) -> Result<()> {
        Ok(())
    }

    fn on_source_task_event(
        &mut self,
        _ctx: &mut dyn VertexManagerContext,
        event: &SourceTaskEvent,
    ) -> Result<()> {
        let mut guard = self.seen.lock().unwrap();
        guard.push((event.source.clone(), event.source_task));
        Ok(())
    }
}

/// What a plugin callback observed, with enough detail to assert order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Observed {
    SourceTask(usize),
    ManagerPayload(Vec<u8>),
}

/// Plugin that records both event kinds in the order they are delivered.
struct ObservingPlugin {
    seen: Arc<Mutex<Vec<Observed>>>,
}

impl VertexManagerPlugin for ObservingPlugin {
    fn on_vertex_started(&mut self, _ctx: &mut dyn VertexManagerContext) -> Result<()> {
        Ok(())
    }

    fn on_source_task_event(
        &mut self,
        _ctx: &mut dyn VertexManagerContext,
        event: &SourceTaskEvent,
    ) -> Result<()> {
        let mut guard = self.seen.lock().unwrap();
        guard.push(Observed::SourceTask(event.source_task));
        Ok(())
    }

    fn on_vertex_manager_event(
        &mut self,
        _ctx: &mut dyn VertexManagerContext,
        payload: &[u8],
    ) -> Result<()> {
        let mut guard = self.seen.lock().unwrap();
        guard.push(Observed::ManagerPayload(payload.to_vec()));
        Ok(())
    }
}

/// Plugin that shrinks to 4 tasks after observing three upstream reports,
/// then schedules the surviving tasks; any later event asks for an
/// out-of-range task.
struct ShrinkAfterThreeEvents {
    events_seen: usize,
}

impl VertexManagerPlugin for ShrinkAfterThreeEvents {
    fn on_vertex_started(&mut self, _ctx: &mut dyn VertexManagerContext) -> Result<()> {
        Ok(())
    }

    fn on_source_task_event(
        &mut self,
        ctx: &mut dyn VertexManagerContext,
        _event: &SourceTaskEvent,
    ) -> Result<()> {
        self.events_seen += 1;

        if self.events_seen == 3 {
            let mut descriptors = BTreeMap::new();
            descriptors.insert("map".to_string(), RoutingDescriptor::one_to_one(4));
            let ok = ctx.set_vertex_parallelism(4, descriptors)?;
            assert!(ok);
            ctx.schedule_vertex_tasks(&[0, 1, 2, 3])?;
        } else if self.events_seen > 3 {
            ctx.schedule_vertex_tasks(&[5])?;
        }

        Ok(())
    }
}

fn map_reduce_core(plugin: Box<dyn VertexManagerPlugin>) -> CoreRuntime {
    let dag = DagFileBuilder::new()
        .with_vertex("map", VertexSpecBuilder::new(4).build())
        .with_vertex(
            "reduce",
            VertexSpecBuilder::new(10)
                .input("map", DataMovement::ScatterGather)
                .build(),
        )
        .build();
    let topology = Arc::new(TopologySnapshot::from_dag(&dag));

    CoreRuntime::new(
        topology,
        vec![("reduce".to_string(), plugin)],
        RuntimeOptions::default(),
    )
}

fn report(source_task: usize, bytes: u64) -> RuntimeEvent {
    RuntimeEvent::SourceTask(SourceTaskEvent {
        dest: "reduce".to_string(),
        source: "map".to_string(),
        source_task,
        kind: SourceTaskEventKind::OutputReport { bytes },
    })
}

#[test]
fn events_before_plugin_start_are_replayed_in_arrival_order() {
    init_tracing();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let plugin = Box::new(RecordingPlugin {
        seen: Arc::clone(&seen),
    });
    let mut core = map_reduce_core(plugin);

    // Events arrive before the vertex (and so its plugin) has started.
    core.step(report(2, 100));
    core.step(report(0, 50));
    core.step(report(2, 200));
    assert!(seen.lock().unwrap().is_empty());

    // Starting the vertex replays the whole buffer in arrival order, which
    // preserves per-source-task order (task 2's events stay 100-then-200).
    core.step(RuntimeEvent::VertexStarted {
        vertex: "reduce".to_string(),
    });

    let replayed = seen.lock().unwrap().clone();
    assert_eq!(
        replayed,
        vec![
            ("map".to_string(), 2),
            ("map".to_string(), 0),
            ("map".to_string(), 2),
        ]
    );
}

#[test]
fn manager_events_are_buffered_and_replayed_interleaved_with_source_events() {
    init_tracing();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let plugin = Box::new(ObservingPlugin {
        seen: Arc::clone(&seen),
    });
    let mut core = map_reduce_core(plugin);

    let manager_event = |payload: &[u8]| RuntimeEvent::VertexManagerEvent {
        vertex: "reduce".to_string(),
        payload: payload.to_vec(),
    };

    // Both event kinds arrive before the vertex has started.
    core.step(manager_event(b"progress"));
    core.step(report(1, 40));
    core.step(manager_event(b"stats"));
    assert!(seen.lock().unwrap().is_empty());

    core.step(RuntimeEvent::VertexStarted {
        vertex: "reduce".to_string(),
    });

    // Replay preserves arrival order across the two kinds.
    let replayed = seen.lock().unwrap().clone();
    assert_eq!(
        replayed,
        vec![
            Observed::ManagerPayload(b"progress".to_vec()),
            Observed::SourceTask(1),
            Observed::ManagerPayload(b"stats".to_vec()),
        ]
    );

    // Once started, manager events are delivered directly.
    core.step(manager_event(b"late"));
    assert_eq!(
        seen.lock().unwrap().last(),
        Some(&Observed::ManagerPayload(b"late".to_vec()))
    );
}

#[test]
fn event_driven_shrink_admits_only_surviving_tasks() {
    init_tracing();

    let plugin = Box::new(ShrinkAfterThreeEvents { events_seen: 0 });
    let mut core = map_reduce_core(plugin);

    core.step(RuntimeEvent::VertexStarted {
        vertex: "reduce".to_string(),
    });

    // First two reports: no decision yet.
    assert!(core.step(report(0, 10)).commands.is_empty());
    assert!(core.step(report(1, 12)).commands.is_empty());

    // Third report triggers the commit and the schedule request.
    let step = core.step(report(2, 9));
    assert_eq!(step.commands.len(), 1);
    match &step.commands[0] {
        CoreCommand::AdmitTasks {
            vertex,
            task_indices,
            ..
        } => {
            assert_eq!(vertex, "reduce");
            assert_eq!(task_indices, &vec![0, 1, 2, 3]);
        }
    }
    assert_eq!(core.manager().vertex_num_tasks("reduce").unwrap(), 4);

    // A later event asks for task 5, which is out of range: dropped with a
    // warning, no admission reaches the scheduler.
    let step = core.step(report(3, 11));
    assert!(step.commands.is_empty());
}
