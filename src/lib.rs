// src/lib.rs

pub mod cli;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod plugin;
pub mod routing;
pub mod sched;
pub mod topology;
pub mod types;
pub mod vertex;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::engine::{
    CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, SourceTaskEvent, SourceTaskEventKind,
};
use crate::plugin::{ImmediateStartPolicy, VertexManagerPlugin};
use crate::sched::{ChannelSchedulerBackend, TaskAdmission};
use crate::topology::loader::load_and_validate;
use crate::topology::{DagFile, TopologySnapshot};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - topology loading
/// - one immediate-start policy plugin per vertex
/// - the core runtime and its async shell
/// - a driver that simulates upstream task completions for admitted tasks
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let dag_path = PathBuf::from(&args.dag);
    let dag = load_and_validate(&dag_path)?;

    if args.dry_run {
        print_dry_run(&dag);
        return Ok(());
    }

    let topology = Arc::new(TopologySnapshot::from_dag(&dag));

    // One policy plugin per vertex, chosen at submission time.
    let plugins: Vec<(String, Box<dyn VertexManagerPlugin>)> = topology
        .vertex_names()
        .map(|name| {
            (
                name.to_string(),
                Box::new(ImmediateStartPolicy) as Box<dyn VertexManagerPlugin>,
            )
        })
        .collect();

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Admissions flow to the external scheduler; here a driver consumes them
    // and simulates instantly-completing upstream tasks.
    let (admit_tx, admit_rx) = mpsc::channel::<TaskAdmission>(64);
    let scheduler = ChannelSchedulerBackend::new(admit_tx);
    let _driver_handle = spawn_upstream_driver(Arc::clone(&topology), admit_rx, rt_tx.clone());

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Start every vertex in execution order (sources before consumers).
    // Seeded from a task so a topology wider than the channel capacity
    // cannot fill the channel before the runtime loop starts draining it.
    let order = topology.execution_order();
    info!(?order, "starting vertices in execution order");
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            for vertex in order {
                if tx.send(RuntimeEvent::VertexStarted { vertex }).await.is_err() {
                    return;
                }
            }
        });
    }

    let options = RuntimeOptions {
        exit_when_quiescent: args.once,
    };

    // Construct the pure core runtime (single source of truth for semantics).
    let core = CoreRuntime::new(topology, plugins, options);

    // Construct the async IO shell around the core.
    let runtime = Runtime::new(core, rt_rx, scheduler);
    runtime.run().await?;
    Ok(())
}

/// Consume admissions and report each admitted task as a completed source
/// task on every outgoing edge of its vertex.
///
/// This stands in for the execution engine: admitted tasks "run" instantly
/// and their completion events feed downstream vertex managers.
fn spawn_upstream_driver(
    topology: Arc<TopologySnapshot>,
    mut admit_rx: mpsc::Receiver<TaskAdmission>,
    rt_tx: mpsc::Sender<RuntimeEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(admission) = admit_rx.recv().await {
            info!(
                vertex = %admission.vertex,
                tasks = ?admission.task_indices,
                "tasks admitted for execution"
            );

            for downstream in topology.downstream_of(&admission.vertex) {
                for &task in admission.task_indices.iter() {
                    let event = RuntimeEvent::SourceTask(SourceTaskEvent {
                        dest: downstream.name.clone(),
                        source: admission.vertex.clone(),
                        source_task: task,
                        kind: SourceTaskEventKind::Completed,
                    });
                    if rt_tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
        }
    })
}

/// Simple dry-run output: print vertices, parallelism, and edges.
fn print_dry_run(dag: &DagFile) {
    println!("vertexman dry-run");
    println!();

    println!("vertices ({}):", dag.vertices().len());
    for (name, spec) in dag.vertices().iter() {
        println!("  - {name}");
        println!("      parallelism: {}", spec.parallelism);
        for edge in spec.inputs.iter() {
            println!("      input: {} ({:?})", edge.source, edge.movement);
        }
        if !spec.extra_inputs.is_empty() {
            println!("      extra_inputs: {:?}", spec.extra_inputs);
        }
    }
}
