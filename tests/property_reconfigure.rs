// tests/property_reconfigure.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use vertexman::routing::RoutingDescriptor;
use vertexman::topology::TopologySnapshot;
use vertexman::types::DataMovement;
use vertexman::vertex::VertexManager;
use vertexman_test_utils::builders::{DagFileBuilder, VertexSpecBuilder};

fn manager_with_declared(declared: usize) -> VertexManager {
    let dag = DagFileBuilder::new()
        .with_vertex("src", VertexSpecBuilder::new(4).build())
        .with_vertex(
            "v",
            VertexSpecBuilder::new(declared)
                .input("src", DataMovement::ScatterGather)
                .build(),
        )
        .build();
    VertexManager::new(Arc::new(TopologySnapshot::from_dag(&dag)))
}

fn movement_strategy() -> impl Strategy<Value = DataMovement> {
    prop_oneof![
        Just(DataMovement::OneToOne),
        Just(DataMovement::Broadcast),
        Just(DataMovement::ScatterGather),
    ]
}

proptest! {
    /// Across any sequence of attempts, at most one parallelism change
    /// succeeds, and the committed value is the first valid one.
    #[test]
    fn at_most_one_parallelism_change_succeeds(
        declared in 1..20usize,
        attempts in proptest::collection::vec(0..30usize, 1..12),
    ) {
        let mut manager = manager_with_declared(declared);
        let mut successes = Vec::new();

        for &requested in attempts.iter() {
            let mut descriptors = BTreeMap::new();
            descriptors.insert(
                "src".to_string(),
                RoutingDescriptor::one_to_one(requested),
            );

            if manager.set_parallelism("v", requested, descriptors).is_ok() {
                successes.push(requested);
            }
        }

        prop_assert!(successes.len() <= 1, "more than one change committed");

        match successes.first() {
            Some(&committed) => {
                prop_assert!(committed >= 1 && committed <= declared);
                prop_assert_eq!(manager.vertex_num_tasks("v").unwrap(), committed);
            }
            None => {
                // Nothing committed: every attempt was invalid, and the
                // declared parallelism is untouched.
                prop_assert!(attempts.iter().all(|&n| n == 0 || n > declared));
                prop_assert_eq!(manager.vertex_num_tasks("v").unwrap(), declared);
            }
        }
    }

    /// Routing descriptors are total and deterministic over their domain,
    /// and never emit an index outside the destination range.
    #[test]
    fn descriptors_are_total_and_in_range(
        movement in movement_strategy(),
        dest_count in 1..10usize,
        source_count in 1..10usize,
    ) {
        let descriptor = RoutingDescriptor::default_for(movement, dest_count);

        for source_task in 0..source_count {
            let first = descriptor.route(source_task, source_count);
            let second = descriptor.route(source_task, source_count);

            prop_assert_eq!(&first, &second, "routing must be deterministic");
            prop_assert!(first.iter().all(|&t| t < dest_count));
        }
    }

    /// Task admission never exceeds the committed parallelism and stays
    /// monotone under repeated scheduling.
    #[test]
    fn ready_set_is_monotone_and_bounded(
        declared in 1..12usize,
        requests in proptest::collection::vec(
            proptest::collection::vec(0..20usize, 0..6),
            1..6,
        ),
    ) {
        let mut manager = manager_with_declared(declared);
        manager.configure_with_defaults("v").unwrap();

        let mut last_len = 0;
        for batch in requests.iter() {
            manager.schedule_tasks("v", batch).unwrap();
            let ready = &manager.vertex("v").unwrap().ready;

            prop_assert!(ready.len() >= last_len, "ready set must be monotone");
            prop_assert!(ready.iter().all(|&t| t < declared));
            last_len = ready.len();
        }
    }
}
