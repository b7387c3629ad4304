//! The crawl work queue
//!
//! An unbounded MPMC queue of [`FrontierItem`]s with a pending-work counter.
//! Every pushed item stays pending until the worker that dequeued it calls
//! [`Frontier::task_done`], so [`Frontier::join`] only returns once all work,
//! including work discovered while processing, is finished.

use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

/// A URL waiting to be visited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    pub url: String,
    pub depth: u32,
}

impl FrontierItem {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// What a worker receives from the queue
#[derive(Debug)]
pub enum Job {
    Visit(FrontierItem),
    /// Termination sentinel; the receiving worker exits
    Stop,
}

/// Shared handle to the work queue
#[derive(Clone)]
pub struct Frontier {
    sender: mpsc::UnboundedSender<Job>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
    pending: Arc<watch::Sender<usize>>,
}

impl Frontier {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (pending, _) = watch::channel(0usize);

        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            pending: Arc::new(pending),
        }
    }

    /// Enqueues an item; it counts as pending until acknowledged
    pub fn push(&self, item: FrontierItem) {
        self.pending.send_modify(|n| *n += 1);
        if self.sender.send(Job::Visit(item)).is_err() {
            // The receiver lives as long as self, so this only happens mid-teardown
            self.task_done();
        }
    }

    /// Waits for the next job
    ///
    /// Returns `Job::Stop` if the channel has closed.
    pub async fn next(&self) -> Job {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await.unwrap_or(Job::Stop)
    }

    /// Acknowledges one dequeued item
    pub fn task_done(&self) {
        self.pending.send_modify(|n| *n = n.saturating_sub(1));
    }

    /// Number of items pushed but not yet acknowledged
    #[cfg(test)]
    fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Waits until every pushed item has been acknowledged
    pub async fn join(&self) {
        let mut watcher = self.pending.subscribe();
        // The sender is held by self, so wait_for cannot fail with a closed channel
        let _ = watcher.wait_for(|n| *n == 0).await;
    }

    /// Pushes one termination sentinel per worker
    pub fn stop(&self, workers: usize) {
        for _ in 0..workers {
            let _ = self.sender.send(Job::Stop);
        }
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

/// Acknowledges a dequeued item when dropped
///
/// Holding one across the processing of an item guarantees `task_done` runs
/// on every exit path.
pub struct PendingGuard<'a> {
    frontier: &'a Frontier,
}

impl<'a> PendingGuard<'a> {
    pub fn new(frontier: &'a Frontier) -> Self {
        Self { frontier }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.frontier.task_done();
    }
}
