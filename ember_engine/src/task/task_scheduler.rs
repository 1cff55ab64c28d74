/// TaskScheduler - worker thread pool plus a main-thread queue
///
/// Background tasks run on a fixed pool of worker threads. Tasks that
/// must touch the GPU context are queued for the main thread instead
/// and drained by `execute_main_thread_tasks`, which the application
/// calls once per frame from the thread that owns the context.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::Result;
use crate::{engine_err, engine_info, engine_warn};

const SOURCE: &str = "ember::TaskScheduler";

type Task = Box<dyn FnOnce() + Send + 'static>;

pub struct TaskScheduler {
    sender: Option<mpsc::Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    main_queue: Mutex<VecDeque<Task>>,
}

impl TaskScheduler {
    /// Spawn `worker_count` background threads (at least one)
    pub fn new(worker_count: usize) -> Result<Self> {
        let worker_count = worker_count.max(1);
        let (sender, receiver) = mpsc::channel::<Task>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let receiver = receiver.clone();
            let handle = std::thread::Builder::new()
                .name(format!("ember-worker-{}", index))
                .spawn(move || loop {
                    // Hold the lock only while waiting for the next task
                    let task = match receiver.lock() {
                        Ok(guard) => guard.recv(),
                        Err(_) => break,
                    };
                    match task {
                        Ok(task) => task(),
                        Err(_) => break,
                    }
                })
                .map_err(|error| {
                    engine_err!(SOURCE, "failed to spawn worker thread: {}", error)
                })?;
            workers.push(handle);
        }

        engine_info!(SOURCE, "started {} worker threads", worker_count);
        Ok(Self {
            sender: Some(sender),
            workers,
            main_queue: Mutex::new(VecDeque::new()),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Run a task on any background worker
    pub fn schedule(&self, task: impl FnOnce() + Send + 'static) {
        if let Some(sender) = &self.sender {
            if sender.send(Box::new(task)).is_err() {
                engine_warn!(SOURCE, "task dropped: worker pool is shut down");
            }
        }
    }

    /// Queue a task for the thread that owns the GPU context
    pub fn schedule_main_thread(&self, task: impl FnOnce() + Send + 'static) {
        if let Ok(mut queue) = self.main_queue.lock() {
            queue.push_back(Box::new(task));
        }
    }

    /// Number of tasks waiting for the main thread
    pub fn main_thread_task_count(&self) -> usize {
        self.main_queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    /// Drain and run every queued main-thread task, in queue order.
    /// Tasks queued by a running task execute in the same drain.
    pub fn execute_main_thread_tasks(&self) {
        loop {
            let task = match self.main_queue.lock() {
                Ok(mut queue) => queue.pop_front(),
                Err(_) => return,
            };
            match task {
                Some(task) => task(),
                None => return,
            }
        }
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        // Closing the channel wakes every worker with a recv error
        self.sender = None;
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "task_scheduler_tests.rs"]
mod tests;
