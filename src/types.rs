// src/types.rs

use serde::Deserialize;
use std::str::FromStr;

/// Canonical vertex name type used throughout the crate.
pub type VertexName = String;

/// Data-movement pattern declared on an input edge.
///
/// This is the opaque "edge property" of the topology: it describes the
/// contract between the source and destination task sets and is the basis
/// for the default routing descriptor of the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMovement {
    /// Source task i feeds destination task i. Requires equal task counts.
    OneToOne,
    /// Every source task feeds every destination task.
    Broadcast,
    /// Every source task produces one partition per destination task.
    ScatterGather,
}

impl FromStr for DataMovement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "one_to_one" => Ok(DataMovement::OneToOne),
            "broadcast" => Ok(DataMovement::Broadcast),
            "scatter_gather" => Ok(DataMovement::ScatterGather),
            other => Err(format!(
                "invalid movement: {other} (expected \"one_to_one\", \"broadcast\" or \"scatter_gather\")"
            )),
        }
    }
}

/// Advisory placement preference for a single task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskLocationHint {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub racks: Vec<String>,
}

/// Advisory placement preferences for the tasks of a vertex.
///
/// Forwarded verbatim to the external task scheduler on every admission.
/// Has no effect on routing or parallelism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VertexLocationHint {
    /// One hint per task index; may be shorter than the task count, in which
    /// case the remaining tasks have no preference.
    pub per_task: Vec<TaskLocationHint>,
}

impl VertexLocationHint {
    pub fn for_hosts(hosts: Vec<Vec<String>>) -> Self {
        Self {
            per_task: hosts
                .into_iter()
                .map(|hosts| TaskLocationHint {
                    hosts,
                    racks: Vec::new(),
                })
                .collect(),
        }
    }
}
