//! Bulk transfer coordination.
//!
//! A bulk call runs its jobs on a fixed set of workers sharing one FIFO
//! queue. Outcomes funnel back over a channel in arrival order and the first
//! error aborts the whole call: remaining outcomes are discarded and jobs
//! already in flight are left to finish on their own. Workers observe the
//! cancellation scope between jobs only; a backend call is never interrupted
//! mid-flight, so one long call can run past the nominal deadline.
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::dest::Destination;
use super::drivers::StoreDriver;
use super::error::{StorageError, StorageResult};
use super::UploadedFile;

/// One unit of work in a bulk call, claimed by exactly one worker.
pub(crate) enum TransferJob {
    Upload { dest: Destination, content: Bytes },
    Delete { key: String },
}

/// Worker-pool sizing and deadline for one bulk call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BulkOptions {
    pub workers: usize,
    pub timeout: Duration,
}

/// Deadline-bound scope shared by the workers of one bulk call.
struct TransferScope {
    cancel: CancellationToken,
    deadline: Instant,
}

impl TransferScope {
    fn expired(&self) -> bool {
        self.cancel.is_cancelled() || Instant::now() >= self.deadline
    }
}

type Outcome = StorageResult<Option<UploadedFile>>;

/// Runs `jobs` against `driver` on `opts.workers` concurrent workers.
///
/// Returns the successful upload results in outcome-arrival order, or the
/// first error any worker reported. On the error path, jobs already
/// dispatched keep running detached and their outcomes are dropped.
pub(crate) async fn run_bulk(
    driver: Arc<dyn StoreDriver>,
    jobs: Vec<TransferJob>,
    opts: BulkOptions,
) -> StorageResult<Vec<UploadedFile>> {
    let total = jobs.len();
    let workers = opts.workers.max(1);

    let cancel = CancellationToken::new();
    // Every return path below cancels the scope.
    let _abort = cancel.clone().drop_guard();
    let scope = Arc::new(TransferScope {
        cancel,
        deadline: Instant::now() + opts.timeout,
    });

    tracing::debug!(jobs = total, workers, "dispatching bulk transfer");

    let queue = Arc::new(Mutex::new(jobs.into_iter().collect::<VecDeque<_>>()));
    let (tx, mut rx) = mpsc::channel::<Outcome>(total.max(1));

    for _ in 0..workers {
        let driver = Arc::clone(&driver);
        let queue = Arc::clone(&queue);
        let scope = Arc::clone(&scope);
        let tx = tx.clone();
        tokio::spawn(async move {
            loop {
                let Some(job) = queue.lock().await.pop_front() else {
                    break;
                };
                let outcome = if scope.expired() {
                    Err(StorageError::Cancelled)
                } else {
                    run_job(driver.as_ref(), job).await
                };
                let failed = outcome.is_err();
                if tx.send(outcome).await.is_err() || failed {
                    // The caller is gone or this worker hit a failure; either
                    // way it stops pulling jobs.
                    break;
                }
            }
        });
    }
    drop(tx);

    let mut results = Vec::with_capacity(total);
    for _ in 0..total {
        match rx.recv().await {
            Some(Ok(Some(uploaded))) => results.push(uploaded),
            Some(Ok(None)) => {}
            Some(Err(err)) => {
                tracing::warn!(error = %err, "bulk transfer aborted");
                return Err(err);
            }
            // All workers exited without draining the queue.
            None => return Err(StorageError::Cancelled),
        }
    }
    Ok(results)
}

async fn run_job(driver: &dyn StoreDriver, job: TransferJob) -> Outcome {
    match job {
        TransferJob::Upload { dest, content } => {
            match driver.upload(&dest.key, &content).await {
                Ok(_) => Ok(Some(dest.into())),
                Err(source) => Err(StorageError::Transfer {
                    key: dest.key,
                    source,
                }),
            }
        }
        TransferJob::Delete { key } => match driver.delete(&key).await {
            Ok(()) => Ok(None),
            Err(source) => Err(StorageError::Transfer { key, source }),
        },
    }
}
