//! Progress reporting for generation runs.
//!
//! A run reports in record attempts: [`ProgressCallback::set_total`] gets
//! the requested count, and every attempt advances the position whether it
//! produced a record or was dropped after placement exhaustion. A halted
//! run finishes below its total.

use std::sync::Arc;

/// Receives progress updates from a generation run.
pub trait ProgressCallback: Send + Sync {
    /// Number of records requested.
    fn set_total(&self, total: u64);

    /// `delta` more attempts finished, written or dropped.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// The run is over; `msg` names how many records were written.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    /// Records what a run reported.
    #[derive(Default)]
    pub(crate) struct RecordingProgress {
        pub total: AtomicU64,
        pub position: AtomicU64,
        pub updates: AtomicU64,
        pub finished: Mutex<Option<String>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn inc(&self, delta: u64) {
            self.position.fetch_add(delta, Ordering::SeqCst);
            self.updates.fetch_add(1, Ordering::SeqCst);
        }

        fn set_message(&self, _msg: String) {}

        fn finish(&self, msg: String) {
            *self.finished.lock().unwrap() = Some(msg);
        }
    }
}
