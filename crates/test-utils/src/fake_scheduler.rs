use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use vertexman::errors::Result;
use vertexman::sched::{SchedulerBackend, TaskAdmission};

/// A fake scheduler backend that records every admission it receives.
///
/// Tests keep a clone of the shared `admissions` vector and assert on it
/// after the runtime exits.
pub struct FakeScheduler {
    admissions: Arc<Mutex<Vec<TaskAdmission>>>,
}

impl FakeScheduler {
    pub fn new(admissions: Arc<Mutex<Vec<TaskAdmission>>>) -> Self {
        Self { admissions }
    }
}

impl SchedulerBackend for FakeScheduler {
    fn admit_tasks(
        &mut self,
        admission: TaskAdmission,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let admissions = Arc::clone(&self.admissions);

        Box::pin(async move {
            let mut guard = admissions.lock().unwrap();
            guard.push(admission);
            Ok(())
        })
    }
}
