// src/vertex/step.rs

//! Step result types for task admission.

/// Structured result of a single scheduling or commit step.
///
/// This is useful for tests that want to manually step a vertex and make
/// assertions about what changed.
#[derive(Debug, Clone, Default)]
pub struct AdmissionStep {
    /// Task indices newly admitted to the ready set by this step, in the
    /// order they were requested.
    pub admitted: Vec<usize>,
    /// Requested indices that were dropped because they fall outside
    /// `[0, parallelism)`.
    pub dropped: Vec<usize>,
    /// Number of indices buffered for later because the vertex is not yet
    /// configured.
    pub buffered: usize,
}

impl AdmissionStep {
    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty() && self.dropped.is_empty() && self.buffered == 0
    }

    /// Fold another step into this one, preserving order.
    pub fn merge(&mut self, mut other: AdmissionStep) {
        self.admitted.append(&mut other.admitted);
        self.dropped.append(&mut other.dropped);
        self.buffered += other.buffered;
    }
}
