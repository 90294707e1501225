//! Fixed-size worker pool servicing MapReduce tasks.
//!
//! A generalization of the teacher's `executor::ThreadPool<J: Job>`: same
//! shape (a `SyncSender` submission side, a `Mutex`-shared `Receiver` on
//! the worker side), but the submission channel is a true zero-capacity
//! rendezvous (`sync_channel(0)`, not the teacher's `sync_channel(pool_size)`)
//! and each [`Task`] already carries its own one-shot completion signal, so
//! the pool itself never tracks per-task state.

use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::shuffle;
use super::task::Task;

/// A fixed-size set of long-lived workers consuming [`Task`]s from a
/// rendezvous channel.
///
/// Size is chosen once at construction (`hardware parallelism` per §4.3)
/// and never changes. Dropping the pool's sender (via [`WorkerPool::shutdown`])
/// is the only shutdown signal: every worker exits after finishing its
/// current task, and the pool joins all of them before returning.
pub struct WorkerPool {
    sender: Option<SyncSender<Task>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` long-lived worker threads.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = sync_channel::<Task>(0);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("mr-worker-{id}"))
                    .spawn(move || worker_loop(id, receiver))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        log::debug!("worker pool started with {size} workers");
        WorkerPool {
            sender: Some(sender),
            workers,
        }
    }

    /// Submits a task. Blocks until some worker is ready to claim it
    /// (capacity-0 rendezvous).
    ///
    /// Panics if called after [`WorkerPool::shutdown`].
    pub fn submit(&self, task: Task) {
        self.sender
            .as_ref()
            .expect("submit called after shutdown")
            .send(task)
            .expect("worker pool has no live workers");
    }

    /// Raises the shutdown signal (drops the submission sender, so every
    /// worker's `recv` fails once its queue is empty) and joins every
    /// worker thread.
    pub fn shutdown(mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            worker.join().expect("worker thread panicked");
        }
        log::debug!("worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(id: usize, receiver: Arc<Mutex<std::sync::mpsc::Receiver<Task>>>) {
    loop {
        let task = {
            let guard = receiver.lock().expect("worker pool mutex poisoned");
            guard.recv()
        };
        match task {
            Ok(task) => {
                let task_number = task.task_number;
                shuffle::execute_task(&task);
                log::debug!("worker {id} finished task {task_number}");
                task.mark_done();
            }
            Err(_) => break,
        }
    }
}
