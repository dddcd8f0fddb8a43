//! Background write pipeline.
//!
//! Keys enter a bounded inbox without blocking the caller. A single worker
//! thread runs a current-thread tokio runtime that gathers keys into batches
//! and commits each batch to the [`BitFieldStore`] under one write lock. A
//! batch is committed when it reaches `batch_size` keys or when the flush
//! timer fires, whichever comes first. Shutdown drains the inbox before the
//! worker exits.

use super::storage::BitFieldStore;
use crate::error::Result;
use crate::hash::DoubleHasher;
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU8, AtomicU64, Ordering},
};
use std::thread;
use std::time::Duration;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot,
};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

const DROP_WARN_EVERY: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CoalescerState {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl CoalescerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => CoalescerState::Running,
            1 => CoalescerState::Draining,
            _ => CoalescerState::Stopped,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CoalescerSettings {
    pub queue_capacity: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

struct Worker {
    shutdown: oneshot::Sender<()>,
    handle: thread::JoinHandle<()>,
}

pub struct WriteCoalescer {
    tx: mpsc::Sender<Vec<u8>>,
    worker: Mutex<Option<Worker>>,
    dropped: AtomicU64,
    state: Arc<AtomicU8>,
}

impl WriteCoalescer {
    pub fn spawn(
        store: Arc<BitFieldStore>,
        hasher: DoubleHasher,
        settings: CoalescerSettings,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel(settings.queue_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let state = Arc::new(AtomicU8::new(CoalescerState::Running as u8));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        let committer = BatchCommitter { store, hasher };
        let worker_state = Arc::clone(&state);
        let handle = thread::Builder::new()
            .name("bloom-write-coalescer".into())
            .spawn(move || {
                runtime.block_on(run_loop(
                    rx,
                    shutdown_rx,
                    committer,
                    settings,
                    worker_state,
                ))
            })?;

        debug!(
            queue_capacity = settings.queue_capacity,
            batch_size = settings.batch_size,
            flush_interval = ?settings.flush_interval,
            "write coalescer started"
        );

        Ok(Self {
            tx,
            worker: Mutex::new(Some(Worker {
                shutdown: shutdown_tx,
                handle,
            })),
            dropped: AtomicU64::new(0),
            state,
        })
    }

    /// Offers a key to the inbox without blocking.
    ///
    /// Returns `false` and bumps the dropped counter when the inbox is full
    /// or the coalescer has been closed.
    pub fn enqueue(&self, key: Vec<u8>) -> bool {
        match self.tx.try_send(key) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped == 1 || dropped % DROP_WARN_EVERY == 0 {
                    warn!(dropped, "insert queue full, dropping key");
                }
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("coalescer closed, dropping key");
                false
            }
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Keys accepted into the inbox but not yet picked up by the worker.
    pub fn queued_len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn state(&self) -> CoalescerState {
        CoalescerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Signals shutdown and blocks until every accepted key is committed.
    ///
    /// Later calls are no-ops. A concurrent caller waits for the first one
    /// to finish draining.
    pub fn close(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(Worker { shutdown, handle }) = worker.take() else {
            return;
        };

        let _ = shutdown.send(());
        if handle.join().is_err() {
            error!("write coalescer thread panicked");
            self.state
                .store(CoalescerState::Stopped as u8, Ordering::Release);
        }

        info!(dropped = self.dropped_count(), "write coalescer stopped");
    }
}

impl Drop for WriteCoalescer {
    fn drop(&mut self) {
        self.close();
    }
}

struct BatchCommitter {
    store: Arc<BitFieldStore>,
    hasher: DoubleHasher,
}

impl BatchCommitter {
    /// Hashes outside the lock, then sets every bit under one write lock.
    fn commit(&self, batch: &mut Vec<Vec<u8>>) {
        if batch.is_empty() {
            return;
        }

        let mut positions =
            Vec::with_capacity(batch.len() * self.hasher.num_hashes());
        for key in batch.iter() {
            self.hasher.extend_positions(key, &mut positions);
        }

        self.store.set_many(&positions, batch.len() as u64);
        debug!(keys = batch.len(), "committed batch");
        batch.clear();
    }
}

async fn run_loop(
    mut rx: mpsc::Receiver<Vec<u8>>,
    mut shutdown: oneshot::Receiver<()>,
    committer: BatchCommitter,
    settings: CoalescerSettings,
    state: Arc<AtomicU8>,
) {
    let CoalescerSettings {
        batch_size,
        flush_interval,
        ..
    } = settings;

    let mut batch = Vec::with_capacity(batch_size);
    let timer = tokio::time::sleep(flush_interval);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            key = rx.recv() => match key {
                Some(key) => {
                    batch.push(key);
                    if batch.len() >= batch_size {
                        committer.commit(&mut batch);
                        timer.as_mut().reset(Instant::now() + flush_interval);
                    }
                }
                None => break,
            },
            () = &mut timer => {
                committer.commit(&mut batch);
                timer.as_mut().reset(Instant::now() + flush_interval);
            }
            _ = &mut shutdown => break,
        }
    }

    state.store(CoalescerState::Draining as u8, Ordering::Release);
    debug!(buffered = batch.len(), "write coalescer draining");

    // Refuse new keys, then take everything already accepted.
    rx.close();
    while let Some(key) = rx.recv().await {
        batch.push(key);
        if batch.len() >= batch_size {
            committer.commit(&mut batch);
        }
    }
    committer.commit(&mut batch);

    state.store(CoalescerState::Stopped as u8, Ordering::Release);
}
