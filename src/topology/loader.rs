// src/topology/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::topology::model::{DagFile, RawDagFile};

/// Load a topology file from a given path and return the raw `RawDagFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (edge references, acyclicity). Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawDagFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawDagFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a topology file from path and run validation.
///
/// This is the recommended entry point for the rest of the crate:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - unknown or duplicated input sources,
///   - cycles among execution edges,
///   - zero parallelism.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<DagFile> {
    let raw = load_from_path(&path)?;
    let dag = DagFile::try_from(raw)?;
    Ok(dag)
}

/// Helper to resolve a default topology path.
pub fn default_dag_path() -> PathBuf {
    PathBuf::from("Dag.toml")
}
