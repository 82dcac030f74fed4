//! Bounded task pool and stage output streams
//!
//! Every stage of the pipeline (fetch, search, upsert) runs the same way:
//! all work is spawned immediately, each task waits for a permit from a
//! counting gate before doing anything, and a join barrier tracks every
//! task. A stage's output streams close only after the barrier releases.

use crate::error::IngestError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// Counting gate plus join barrier
pub struct BoundedTasks {
    gate: Arc<Semaphore>,
    tasks: JoinSet<()>,
    cancel: CancellationToken,
    spawned: usize,
}

/// Outcome of waiting on a [`BoundedTasks`] barrier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub completed: usize,
    pub panicked: usize,
}

impl BoundedTasks {
    /// # Panics
    /// If `limit` is zero; a zero-permit gate would never admit work.
    pub fn new(limit: usize, cancel: CancellationToken) -> Self {
        assert!(limit >= 1, "concurrency limit must be at least 1");
        Self {
            gate: Arc::new(Semaphore::new(limit)),
            tasks: JoinSet::new(),
            cancel,
            spawned: 0,
        }
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Launch `work` now; it starts once a gate permit is free
    ///
    /// If the run is cancelled before admission, `work` is dropped unpolled
    /// and a `Cancelled` error naming `label` is sent on `errors`.
    pub fn spawn<Fut>(&mut self, label: String, errors: &UnboundedSender<IngestError>, work: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let gate = Arc::clone(&self.gate);
        let cancel = self.cancel.clone();
        let errors = errors.clone();
        self.spawned += 1;

        self.tasks.spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = gate.acquire_owned() => permit.ok(),
            };

            let Some(_permit) = permit else {
                let _ = errors.send(IngestError::Cancelled { task: label });
                return;
            };

            work.await;
        });
    }

    /// Wait for every spawned task to finish
    pub async fn join(mut self) -> JoinReport {
        let mut report = JoinReport::default();

        while let Some(result) = self.tasks.join_next().await {
            report.completed += 1;
            if let Err(e) = result {
                report.panicked += 1;
                tracing::error!(error = %e, "Stage task failed to complete");
            }
        }

        report
    }
}

/// Streams produced by one pipeline stage
///
/// `results` and `errors` are unbounded; both close after every task of the
/// stage has finished, and `completion` then resolves.
pub struct StageOutput<T> {
    pub results: UnboundedReceiver<T>,
    pub errors: UnboundedReceiver<IngestError>,
    pub completion: JoinHandle<JoinReport>,
}

/// Everything a stage produced, gathered after it closed
#[derive(Debug)]
pub struct StageCollected<T> {
    pub results: Vec<T>,
    pub errors: Vec<IngestError>,
    pub report: JoinReport,
}

impl<T: Send + 'static> StageOutput<T> {
    /// Wire a stage: the driver spawns its tasks into `tasks`, then this waits
    /// on the barrier before dropping the stage's own senders.
    pub fn drive<F>(limit: usize, cancel: CancellationToken, spawn_all: F) -> Self
    where
        F: FnOnce(&mut BoundedTasks, &UnboundedSender<T>, &UnboundedSender<IngestError>),
    {
        let (results_tx, results) = mpsc::unbounded_channel();
        let (errors_tx, errors) = mpsc::unbounded_channel();

        let mut tasks = BoundedTasks::new(limit, cancel);
        spawn_all(&mut tasks, &results_tx, &errors_tx);

        let completion = tokio::spawn(async move {
            let report = tasks.join().await;
            // Closing happens strictly after the barrier
            drop(results_tx);
            drop(errors_tx);
            report
        });

        Self {
            results,
            errors,
            completion,
        }
    }

    /// Drain both streams until they close, then wait for the barrier
    pub async fn collect(mut self) -> StageCollected<T> {
        let mut results = Vec::new();
        let mut errors = Vec::new();
        let mut results_open = true;
        let mut errors_open = true;

        while results_open || errors_open {
            tokio::select! {
                item = self.results.recv(), if results_open => match item {
                    Some(item) => results.push(item),
                    None => results_open = false,
                },
                err = self.errors.recv(), if errors_open => match err {
                    Some(err) => errors.push(err),
                    None => errors_open = false,
                },
            }
        }

        let report = await_completion(self.completion).await;

        StageCollected {
            results,
            errors,
            report,
        }
    }
}

/// Wait for a stage driver; a driver that died counts as one panicked task
pub async fn await_completion(completion: JoinHandle<JoinReport>) -> JoinReport {
    match completion.await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Stage driver failed");
            JoinReport {
                completed: 0,
                panicked: 1,
            }
        }
    }
}
