use crate::candidate::CandidateScanner;
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::result::{ClassificationVerdict, ProgressEvent, ScanOutcome};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub type VerdictCallback = Arc<dyn Fn(&ClassificationVerdict) + Send + Sync>;

/// Default worker count: a small multiple of the machine's parallelism.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
        * 4
}

/// Fans candidate scans out over a fixed-size worker pool.
///
/// Workers pull candidates from a shared queue and hand every verdict to a
/// single coordinator loop, which alone owns the outcome and the completed
/// count. Progress events leave the coordinator in completion order, so the
/// counts a reporter sees never go backwards.
pub struct Orchestrator {
    scanner: Arc<CandidateScanner>,
    concurrency: usize,
    progress_tx: Option<mpsc::Sender<ProgressEvent>>,
    verdict_callback: Option<VerdictCallback>,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        Ok(Self::with_scanner(CandidateScanner::new(config)?))
    }

    pub fn with_scanner(scanner: CandidateScanner) -> Self {
        Self {
            scanner: Arc::new(scanner),
            concurrency: default_concurrency(),
            progress_tx: None,
            verdict_callback: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self
    }

    /// Channel that receives one event per completed candidate. It is dropped
    /// once every worker has been joined, which tells the reporter to stop.
    pub fn with_progress_sender(mut self, tx: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_verdict_callback(mut self, callback: VerdictCallback) -> Self {
        self.verdict_callback = Some(callback);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn scan(self, candidates: Vec<String>) -> Result<ScanOutcome> {
        let Orchestrator {
            scanner,
            concurrency,
            progress_tx,
            verdict_callback,
            cancel,
        } = self;

        let total = candidates.len();
        let workers = concurrency.min(total);
        info!("Starting scan of {} candidates with {} workers", total, workers);

        let queue: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(candidates.into()));
        let (done_tx, mut done_rx) = mpsc::channel::<ClassificationVerdict>(concurrency);

        let mut worker_handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let queue = queue.clone();
            let scanner = scanner.clone();
            let cancel = cancel.clone();
            let done_tx = done_tx.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }

                    let next = queue.lock().await.pop_front();
                    let Some(candidate) = next else {
                        break;
                    };

                    match scanner.scan_cancellable(&candidate, &cancel).await {
                        Some(verdict) => {
                            if done_tx.send(verdict).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            debug!("Worker {} abandoned {}", worker_id, candidate);
                            break;
                        }
                    }
                }
                debug!("Worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }
        drop(done_tx);

        let mut outcome = ScanOutcome {
            total,
            ..ScanOutcome::default()
        };

        while let Some(verdict) = done_rx.recv().await {
            outcome.completed += 1;

            if let Some(ref callback) = verdict_callback {
                callback(&verdict);
            }
            if verdict.matched {
                outcome.matched.push(verdict);
            }
            if let Some(ref tx) = progress_tx {
                // A closed reporter must not stall the scan.
                let _ = tx
                    .send(ProgressEvent {
                        completed: outcome.completed,
                        total,
                    })
                    .await;
            }
        }

        for handle in worker_handles {
            handle.await?;
        }
        drop(progress_tx);

        outcome.cancelled = cancel.is_cancelled() && outcome.completed < total;
        info!(
            "Scan finished: {}/{} candidates, {} matched{}",
            outcome.completed,
            total,
            outcome.matched.len(),
            if outcome.cancelled { " (cancelled)" } else { "" }
        );

        Ok(outcome)
    }
}
