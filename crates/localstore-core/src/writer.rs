//! Write-back worker
//!
//! `set` pushes onto an unbounded queue and returns; one task drains the queue
//! into the persistent store. A single consumer means writes land in exactly
//! the order they were enqueued. Backend calls go through the blocking pool so
//! slow disks never stall the runtime's worker threads.

use crate::error::{KvError, StoreError};
use crate::event::{EventBus, StoreEvent};
use crate::kv::PersistentKv;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

enum WriteCommand {
    Persist { key: String, value: String },
    /// Answered once everything queued before it has been attempted
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    persisted: AtomicU64,
    failed: AtomicU64,
}

/// Snapshot of write-back activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteBackStats {
    pub enqueued: u64,
    pub persisted: u64,
    pub failed: u64,
}

impl WriteBackStats {
    /// Writes queued but not yet attempted
    pub fn pending(&self) -> u64 {
        self.enqueued
            .saturating_sub(self.persisted)
            .saturating_sub(self.failed)
    }
}

/// Handle to the background writer
pub(crate) struct WriteBack {
    tx: mpsc::UnboundedSender<WriteCommand>,
    counters: Arc<Counters>,
}

impl WriteBack {
    /// Spawn the worker on `handle`. It stops once the handle is dropped.
    pub(crate) fn spawn(kv: Arc<dyn PersistentKv>, events: EventBus, handle: &Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());

        handle.spawn(run(kv, rx, Arc::clone(&counters), events));

        Self { tx, counters }
    }

    pub(crate) fn enqueue(&self, key: String, value: String) -> Result<(), StoreError> {
        self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        self.tx
            .send(WriteCommand::Persist { key, value })
            .map_err(|_| {
                self.counters.enqueued.fetch_sub(1, Ordering::Relaxed);
                StoreError::WriterClosed
            })
    }

    pub(crate) async fn flush(&self) -> Result<(), StoreError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(done_tx))
            .map_err(|_| StoreError::WriterClosed)?;
        done_rx.await.map_err(|_| StoreError::WriterClosed)
    }

    pub(crate) fn stats(&self) -> WriteBackStats {
        WriteBackStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            persisted: self.counters.persisted.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

async fn run(
    kv: Arc<dyn PersistentKv>,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
    counters: Arc<Counters>,
    events: EventBus,
) {
    debug!("Write-back worker started");

    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Persist { key, value } => match persist(&kv, &key, value).await {
                Ok(()) => {
                    counters.persisted.fetch_add(1, Ordering::Relaxed);
                    trace!(key = %key, "Persisted");
                    events.publish(StoreEvent::Persisted { key });
                }
                Err(e) => {
                    // The cache still holds the value; the next set for this key retries
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(key = %key, error = %e, "Failed to persist value, dropping write");
                    events.publish(StoreEvent::PersistFailed {
                        key,
                        error: e.to_string(),
                    });
                }
            },
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    debug!("Write-back worker stopped");
}

/// Backend I/O runs on the blocking pool. Awaited before the next command, so
/// ordering is unchanged.
async fn persist(kv: &Arc<dyn PersistentKv>, key: &str, value: String) -> Result<(), KvError> {
    let kv = Arc::clone(kv);
    let key = key.to_string();
    tokio::task::spawn_blocking(move || kv.set_item(&key, &value))
        .await
        .unwrap_or_else(|e| {
            Err(KvError::Unavailable {
                message: format!("persist task failed: {}", e),
            })
        })
}
