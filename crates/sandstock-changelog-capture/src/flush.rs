//! Background flushing of the change log queue.

use crate::queue::ChangeLogQueue;
use sandstock_database::ChangeLogRepository;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Configuration for background flushing.
#[derive(Debug, Clone)]
pub struct FlushConfig {
    /// Maximum time a record waits in the queue.
    pub interval: Duration,
    /// Queue depth that triggers an early flush.
    pub threshold: usize,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            threshold: 100,
        }
    }
}

/// Totals reported when the flush loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Flushes that committed at least one record.
    pub flushes: u64,
    pub records: u64,
    pub failures: u64,
}

async fn flush_once(
    queue: &ChangeLogQueue,
    repository: &ChangeLogRepository,
    stats: &mut FlushStats,
    trigger: &'static str,
) {
    match queue.flush(repository).await {
        Ok(0) => {}
        Ok(count) => {
            debug!(trigger, count, "Flushed batch");
            stats.flushes += 1;
            stats.records += count as u64;
        }
        // Logged by the queue; the batch is back at the front.
        Err(_) => stats.failures += 1,
    }
}

/// Flush the queue on an interval, or early when it reaches the threshold,
/// until `shutdown` turns true or its sender is dropped.
///
/// Performs a final flush before returning.
pub async fn flush_loop(
    queue: ChangeLogQueue,
    repository: ChangeLogRepository,
    config: FlushConfig,
    mut shutdown: watch::Receiver<bool>,
) -> FlushStats {
    let mut stats = FlushStats::default();
    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                flush_once(&queue, &repository, &mut stats, "interval").await;
            }
            _ = queue.pushed() => {
                if queue.len() >= config.threshold {
                    flush_once(&queue, &repository, &mut stats, "threshold").await;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    flush_once(&queue, &repository, &mut stats, "shutdown").await;
    info!(
        flushes = stats.flushes,
        records = stats.records,
        failures = stats.failures,
        remaining = queue.len(),
        "Flush loop stopped"
    );
    stats
}
