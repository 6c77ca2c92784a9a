//! Execution contexts for delivering completions.
//!
//! # Design
//! Network calls finish on a worker thread, but callers usually want their
//! completion to run somewhere specific, typically the application's UI
//! thread. A `Dispatcher` decides where. `InlineDispatcher` runs the
//! completion right away on the worker thread; `main_queue` hands completions
//! to a `MainQueue` that the application drains from the thread of its choice.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// A completion waiting to be run.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Delivers completions to an execution context.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Runs every completion immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// Sending half of a main queue. Install it on an `HttpClient`.
#[derive(Debug, Clone)]
pub struct MainDispatcher {
    sender: Sender<Job>,
}

impl Dispatcher for MainDispatcher {
    fn dispatch(&self, job: Job) {
        if self.sender.send(job).is_err() {
            tracing::warn!("main queue dropped; completion discarded");
        }
    }
}

/// Receiving half of a main queue. Owned by the thread that runs completions.
#[derive(Debug)]
pub struct MainQueue {
    receiver: Receiver<Job>,
}

impl MainQueue {
    /// Run every completion that is already queued. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one completion and run it. Returns `false` if
    /// nothing arrived in time.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

/// Create a connected dispatcher/queue pair.
pub fn main_queue() -> (MainDispatcher, MainQueue) {
    let (sender, receiver) = mpsc::channel();
    (MainDispatcher { sender }, MainQueue { receiver })
}
