//! Bounded, non-blocking snapshot forwarding
//!
//! A fixed pool of workers drains one bounded queue. `dispatch` never waits:
//! when every worker is busy and the queue is full the snapshot is dropped,
//! so a slow collector cannot grow the number of in-flight requests.
//! `shutdown` closes the queue and lets the workers drain it within a grace
//! period, so a bounded run delivers its last snapshots.

use crate::{HttpSink, SnapshotSink};
use perfstat_core::fail_open::fail_open;
use perfstat_core::{KeeperConfig, Result, Snapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Worker pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwarderConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl From<&KeeperConfig> for ForwarderConfig {
    fn from(config: &KeeperConfig) -> Self {
        Self {
            workers: config.workers,
            queue_capacity: config.queue_capacity,
        }
    }
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self::from(&KeeperConfig::default())
    }
}

/// Delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderStats {
    /// Snapshots the sink accepted
    pub sent: u64,
    /// Snapshots the sink rejected or could not reach
    pub failed: u64,
    /// Snapshots discarded because the queue was full
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// Hands snapshots to background workers without blocking the caller
pub struct Forwarder {
    /// `None` once shutdown has begun
    tx: Option<mpsc::Sender<Snapshot>>,
    counters: Arc<Counters>,
    workers: Vec<JoinHandle<()>>,
}

impl Forwarder {
    /// Start the worker pool on the current tokio runtime
    pub fn spawn(sink: Arc<dyn SnapshotSink>, config: ForwarderConfig) -> Self {
        let worker_count = config.workers.max(1);
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = mpsc::channel(queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let counters = Arc::new(Counters::default());

        let workers = (0..worker_count)
            .map(|id| {
                let rx = Arc::clone(&rx);
                let sink = Arc::clone(&sink);
                let counters = Arc::clone(&counters);
                tokio::spawn(async move {
                    Self::worker(id, rx, sink, counters).await;
                })
            })
            .collect();

        debug!(
            "Forwarder started with {} workers, queue capacity {}",
            worker_count, queue_capacity
        );

        Self {
            tx: Some(tx),
            counters,
            workers,
        }
    }

    /// Build an HTTP forwarder when both snapshot and source names are set
    pub fn from_config(config: &KeeperConfig) -> Result<Option<Self>> {
        let Some((snapshot, source)) = config.forwarding() else {
            debug!("Forwarding disabled: snapshot and source names are both required");
            return Ok(None);
        };

        let sink = HttpSink::new(
            &config.address,
            snapshot,
            source,
            Duration::from_secs(config.timeout_secs),
        )?;
        info!("Forwarding samples to {}", sink.url());

        Ok(Some(Self::spawn(Arc::new(sink), ForwarderConfig::from(config))))
    }

    /// Queue a snapshot for delivery; never blocks, never fails
    pub fn dispatch(&self, snapshot: Snapshot) {
        let Some(tx) = &self.tx else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        match tx.try_send(snapshot) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Forwarding queue full, dropping snapshot");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Forwarding workers stopped, dropping snapshot");
            }
        }
    }

    /// Close the queue and wait up to `grace` for queued and in-flight
    /// snapshots; workers still busy after that are aborted
    pub async fn shutdown(mut self, grace: Duration) -> ForwarderStats {
        self.tx = None;
        let workers = std::mem::take(&mut self.workers);
        let aborts: Vec<_> = workers.iter().map(|w| w.abort_handle()).collect();

        let drained = tokio::time::timeout(grace, async {
            for worker in workers {
                let _ = worker.await;
            }
        })
        .await;

        if drained.is_err() {
            warn!("Forwarder did not drain within {:?}, aborting", grace);
            for abort in aborts {
                abort.abort();
            }
        }

        let stats = self.stats();
        debug!(
            "Forwarder stopped: {} sent, {} failed, {} dropped",
            stats.sent, stats.failed, stats.dropped
        );
        stats
    }

    pub fn stats(&self) -> ForwarderStats {
        ForwarderStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    async fn worker(
        id: usize,
        rx: Arc<Mutex<mpsc::Receiver<Snapshot>>>,
        sink: Arc<dyn SnapshotSink>,
        counters: Arc<Counters>,
    ) {
        loop {
            // Hold the lock only while waiting, so other workers can deliver.
            let next = rx.lock().await.recv().await;
            let Some(snapshot) = next else {
                debug!("Forwarder worker {} exiting", id);
                break;
            };

            match fail_open("keeper::store", || sink.store(&snapshot)).await {
                Some(()) => counters.sent.fetch_add(1, Ordering::Relaxed),
                None => counters.failed.fetch_add(1, Ordering::Relaxed),
            };
        }
    }
}

impl Drop for Forwarder {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}
