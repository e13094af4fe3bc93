//! Process-wide FIFO of change logs awaiting persistence.

use parking_lot::Mutex;
use sandstock_changelog_types::NewChangeLog;
use sandstock_common_log::spans::{flush_span, Timer};
use sandstock_database::{ChangeLogRepository, StoreResult};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, info, Instrument};

#[derive(Default)]
struct Inner {
    items: Mutex<VecDeque<NewChangeLog>>,
    pushed: Notify,
    // Held across drain and commit so batches land in capture order.
    flushing: tokio::sync::Mutex<()>,
}

/// Unbounded, thread-safe FIFO of pending change logs.
///
/// Cloning yields another handle to the same queue. Only [`flush`](Self::flush)
/// removes items.
#[derive(Clone, Default)]
pub struct ChangeLogQueue {
    inner: Arc<Inner>,
}

impl ChangeLogQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn put(&self, record: NewChangeLog) {
        self.inner.items.lock().push_back(record);
        self.inner.pushed.notify_one();
    }

    /// Number of records waiting to be flushed.
    pub fn len(&self) -> usize {
        self.inner.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.lock().is_empty()
    }

    /// Human readable depth, e.g. `ChangeLogQueue(size=3)`.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    /// Atomically take everything queued so far, oldest first.
    fn drain(&self) -> Vec<NewChangeLog> {
        std::mem::take(&mut *self.inner.items.lock()).into()
    }

    /// Put an undelivered batch back ahead of anything queued since.
    fn requeue_front(&self, batch: Vec<NewChangeLog>) {
        let mut items = self.inner.items.lock();
        for record in batch.into_iter().rev() {
            items.push_front(record);
        }
    }

    /// Resolves after the next [`put`](Self::put), or immediately if one
    /// happened since the last wait.
    pub(crate) async fn pushed(&self) {
        self.inner.pushed.notified().await;
    }

    /// Drain the queue and commit the batch in one transaction.
    ///
    /// Concurrent flushes run one at a time, so once this returns every
    /// record put before the call has been committed or requeued. Records
    /// put while the commit is in progress wait for the next flush.
    /// On failure the batch is restored to the front of the queue, in order,
    /// and the error is returned.
    pub async fn flush(&self, repository: &ChangeLogRepository) -> StoreResult<usize> {
        let _flushing = self.inner.flushing.lock().await;
        let batch = self.drain();
        if batch.is_empty() {
            return Ok(0);
        }

        let span = flush_span(batch.len());
        let timer = Timer::start("changelog_flush");

        match repository.insert_all(&batch).instrument(span.clone()).await {
            Ok(ids) => {
                span.record("flushed", ids.len());
                let elapsed = timer.finish();
                info!(
                    count = ids.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Flushed change logs"
                );
                Ok(ids.len())
            }
            Err(e) => {
                let count = batch.len();
                self.requeue_front(batch);
                error!(count, error = %e, "Change log flush failed, batch requeued");
                Err(e)
            }
        }
    }
}

impl fmt::Display for ChangeLogQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeLogQueue(size={})", self.len())
    }
}

impl fmt::Debug for ChangeLogQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
