//! Task/phase/key-value types shared by the pool, dispatcher, and shuffle
//! I/O.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

/// A map or reduce function supplied by the job author.
///
/// Both are `Fn`, not `FnMut`: §5 requires user functions to be callable
/// concurrently across workers without serialization, which rules out
/// interior mutable state captured by a closure unless the caller wraps it
/// itself (and takes on the synchronization that implies).
pub type MapFn = std::sync::Arc<dyn Fn(&str, &str) -> Vec<KeyValue> + Send + Sync>;
pub type ReduceFn = std::sync::Arc<dyn Fn(&str, &[String]) -> String + Send + Sync>;

/// A single emitted key/value pair, pre-serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Which half of a round a [`Task`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

/// One unit of work handed to a worker.
///
/// Carries its own one-shot completion signal (`done`) rather than relying
/// on the pool to track completion some other way, since §3 requires a
/// per-task release, not a whole-batch wait.
pub struct Task {
    pub data_dir: std::path::PathBuf,
    pub job_name: String,
    pub phase: Phase,
    pub task_number: usize,
    pub n_map: usize,
    pub n_reduce: usize,
    /// Present only for `Phase::Map` tasks.
    pub map_file: Option<std::path::PathBuf>,
    pub map_f: MapFn,
    pub reduce_f: ReduceFn,
    done: SyncSender<()>,
}

impl Task {
    /// Builds a task paired with the receiving end of its completion
    /// signal.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        data_dir: std::path::PathBuf,
        job_name: String,
        phase: Phase,
        task_number: usize,
        n_map: usize,
        n_reduce: usize,
        map_file: Option<std::path::PathBuf>,
        map_f: MapFn,
        reduce_f: ReduceFn,
    ) -> (Self, Receiver<()>) {
        let (done, notified) = sync_channel(1);
        (
            Task {
                data_dir,
                job_name,
                phase,
                task_number,
                n_map,
                n_reduce,
                map_file,
                map_f,
                reduce_f,
                done,
            },
            notified,
        )
    }

    /// Releases this task's completion signal. Called exactly once, by
    /// whichever worker claimed the task.
    pub fn mark_done(self) {
        // a closed receiver (caller stopped waiting) is not an engine error
        let _ = self.done.send(());
    }
}
