// tests/runtime_fake_scheduler.rs

//! Async shell driving the core with a fake scheduler backend.

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use vertexman::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use vertexman::plugin::{ImmediateStartPolicy, VertexManagerPlugin};
use vertexman::topology::TopologySnapshot;
use vertexman::types::DataMovement;
use vertexman_test_utils::builders::{DagFileBuilder, VertexSpecBuilder};
use vertexman_test_utils::fake_scheduler::FakeScheduler;
use vertexman_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

/// Very simple chain: a (2 tasks) -> b (3 tasks)
fn simple_chain_snapshot() -> Arc<TopologySnapshot> {
    let dag = DagFileBuilder::new()
        .with_vertex("a", VertexSpecBuilder::new(2).build())
        .with_vertex(
            "b",
            VertexSpecBuilder::new(3)
                .input("a", DataMovement::ScatterGather)
                .build(),
        )
        .build();
    Arc::new(TopologySnapshot::from_dag(&dag))
}

#[tokio::test]
async fn runtime_with_fake_scheduler_admits_all_tasks() -> TestResult {
    init_tracing();

    let topology = simple_chain_snapshot();

    let plugins: Vec<(String, Box<dyn VertexManagerPlugin>)> = vec![
        ("a".to_string(), Box::new(ImmediateStartPolicy)),
        ("b".to_string(), Box::new(ImmediateStartPolicy)),
    ];

    let options = RuntimeOptions {
        exit_when_quiescent: true,
    };

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);

    let admissions = Arc::new(Mutex::new(Vec::new()));
    let scheduler = FakeScheduler::new(Arc::clone(&admissions));

    // Seed vertex starts before starting the runtime loop.
    for vertex in ["a", "b"] {
        rt_tx
            .send(RuntimeEvent::VertexStarted {
                vertex: vertex.to_string(),
            })
            .await?;
    }

    let core = CoreRuntime::new(topology, plugins, options);
    let runtime = Runtime::new(core, rt_rx, scheduler);

    // Enforce an upper bound on how long this test may run.
    let run_result = timeout(Duration::from_secs(3), runtime.run()).await;

    match run_result {
        Ok(Ok(())) => {
            // Runtime finished normally within the timeout.
        }
        Ok(Err(e)) => {
            return Err(e.into());
        }
        Err(_) => {
            panic!("runtime did not finish within 3 seconds");
        }
    }

    let recorded = admissions.lock().unwrap().clone();
    let summary: Vec<(String, Vec<usize>)> = recorded
        .iter()
        .map(|a| (a.vertex.clone(), a.task_indices.clone()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("a".to_string(), vec![0, 1]),
            ("b".to_string(), vec![0, 1, 2]),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn runtime_stops_on_shutdown_request() -> TestResult {
    init_tracing();

    let topology = simple_chain_snapshot();
    let plugins: Vec<(String, Box<dyn VertexManagerPlugin>)> = Vec::new();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let admissions = Arc::new(Mutex::new(Vec::new()));
    let scheduler = FakeScheduler::new(Arc::clone(&admissions));

    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

    let core = CoreRuntime::new(topology, plugins, RuntimeOptions::default());
    let runtime = Runtime::new(core, rt_rx, scheduler);

    timeout(Duration::from_secs(3), runtime.run()).await??;

    assert!(admissions.lock().unwrap().is_empty());
    Ok(())
}
