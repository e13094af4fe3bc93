use proptest::prelude::*;
use sandstock_changelog_capture::{
    flush_loop, CaptureMode, ChangeLogQueue, ChangeRecorder, FlushConfig, NewChangeLog, Operation,
};
use sandstock_database::models::{Product, User};
use sandstock_database::{
    ChangeLogRepository, DatabasePool, Entity, EntityStore, ListenerRegistry, MigrationRunner,
    PoolConfig,
};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::watch;

struct Harness {
    store: EntityStore,
    repo: ChangeLogRepository,
    queue: ChangeLogQueue,
    user_id: i64,
}

async fn harness() -> Harness {
    let pool = DatabasePool::new(PoolConfig::in_memory()).await.unwrap();
    let pool = pool.pool().clone();
    MigrationRunner::with_schema(pool.clone()).run().await.unwrap();

    let queue = ChangeLogQueue::new();
    let recorder = ChangeRecorder::new(CaptureMode::Queued(queue.clone()));
    let mut registry = ListenerRegistry::new();
    recorder.subscribe_models(&mut registry).unwrap();
    let store = EntityStore::new(pool.clone(), registry);

    let mut uow = store.begin().await.unwrap();
    let user = uow.insert(User::new("admin", "admin@example.com", "x")).await.unwrap();
    uow.commit().await.unwrap();
    let repo = ChangeLogRepository::new(pool);

    // The admin insert was captured too; persist it so the queue starts empty.
    queue.flush(&repo).await.unwrap();

    Harness {
        store,
        repo,
        queue,
        user_id: user.id().unwrap(),
    }
}

fn payload_record(n: usize) -> NewChangeLog {
    NewChangeLog::new("dim_product", Operation::Insert, None, Some(n.to_string())).unwrap()
}

#[tokio::test]
async fn test_mutations_queue_until_flushed() {
    let h = harness().await;
    let base = h.repo.count().await.unwrap();

    let mut uow = h.store.begin().await.unwrap();
    let mut product = uow
        .insert(Product::new("Desk", "Furniture", "Oak desk", 5, h.user_id))
        .await
        .unwrap();
    product.quantity_available = 10;
    uow.update(&mut product).await.unwrap();
    uow.delete(product).await.unwrap();
    assert!(uow.staged().is_empty());
    assert_eq!(uow.commit().await.unwrap(), 0);

    assert_eq!(h.queue.len(), 3);
    assert_eq!(h.queue.summary(), "ChangeLogQueue(size=3)");
    assert_eq!(h.repo.count().await.unwrap(), base);

    assert_eq!(h.queue.flush(&h.repo).await.unwrap(), 3);
    assert_eq!(h.queue.len(), 0);
    assert_eq!(h.repo.count().await.unwrap(), base + 3);

    let logs = h.repo.list_for_table("dim_product", 10).await.unwrap();
    let ops: Vec<_> = logs.iter().rev().map(|l| l.operation).collect();
    assert_eq!(ops, vec![Operation::Insert, Operation::Update, Operation::Delete]);

    let update = &logs[1];
    let old = update.old_values().unwrap().unwrap();
    let new = update.new_values().unwrap().unwrap();
    assert_eq!(old.get("quantity_available"), Some(&serde_json::json!(5)));
    assert_eq!(new.get("quantity_available"), Some(&serde_json::json!(10)));

    // Nothing left for a second flush
    assert_eq!(h.queue.flush(&h.repo).await.unwrap(), 0);
}

#[tokio::test]
async fn test_queued_record_survives_rollback() {
    let h = harness().await;
    let base = h.repo.count().await.unwrap();

    {
        let mut uow = h.store.begin().await.unwrap();
        uow.insert(Product::new("Ghost", "Toys", "rolled back", 1, h.user_id))
            .await
            .unwrap();
        uow.rollback().await.unwrap();
    }

    assert_eq!(h.queue.len(), 1);
    h.queue.flush(&h.repo).await.unwrap();
    assert_eq!(h.repo.count().await.unwrap(), base + 1);

    let mut uow = h.store.begin().await.unwrap();
    assert!(uow.list::<Product>(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_flush_requeues_batch() {
    let h = harness().await;
    for n in 0..4 {
        h.queue.put(payload_record(n));
    }

    h.repo.pool().close().await;
    assert!(h.queue.flush(&h.repo).await.is_err());

    assert_eq!(h.queue.len(), 4);
    h.queue.put(payload_record(4));
    assert_eq!(h.queue.len(), 5);
}

#[tokio::test]
async fn test_flush_loop_threshold_and_shutdown() {
    let h = harness().await;
    let base = h.repo.count().await.unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let config = FlushConfig {
        interval: Duration::from_secs(3600),
        threshold: 3,
    };
    let task = tokio::spawn(flush_loop(h.queue.clone(), h.repo.clone(), config, shutdown_rx));

    for n in 0..3 {
        h.queue.put(payload_record(n));
    }

    tokio::time::timeout(Duration::from_secs(5), async {
        while h.repo.count().await.unwrap() < base + 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("threshold flush did not happen");

    // Below threshold: stays queued until shutdown
    h.queue.put(payload_record(3));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.queue.len(), 1);

    shutdown_tx.send(true).unwrap();
    let stats = task.await.unwrap();

    assert!(h.queue.is_empty());
    assert_eq!(stats.records, 4);
    assert_eq!(stats.failures, 0);
    assert_eq!(h.repo.count().await.unwrap(), base + 4);
}

#[tokio::test]
async fn test_flush_loop_interval() {
    let h = harness().await;
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let config = FlushConfig {
        interval: Duration::from_millis(20),
        threshold: usize::MAX,
    };
    tokio::spawn(flush_loop(h.queue.clone(), h.repo.clone(), config, shutdown_rx));

    h.queue.put(payload_record(0));
    tokio::time::timeout(Duration::from_secs(5), async {
        while !h.queue.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("interval flush did not happen");
}

/// Producers on plain threads race repeated flushes; every record must land
/// exactly once.
fn run_concurrent_producers(producers: usize, per_producer: usize) -> BTreeSet<usize> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let h = harness().await;
        let mut handles = Vec::new();
        for p in 0..producers {
            let queue = h.queue.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..per_producer {
                    queue.put(payload_record(p * per_producer + i));
                }
            }));
        }

        while handles.iter().any(|t| !t.is_finished()) {
            h.queue.flush(&h.repo).await.unwrap();
            tokio::task::yield_now().await;
        }
        for handle in handles {
            handle.join().unwrap();
        }
        h.queue.flush(&h.repo).await.unwrap();
        assert!(h.queue.is_empty());

        let logs = h.repo.list_recent(i64::MAX).await.unwrap();
        assert_eq!(logs.len(), producers * per_producer + 1, "user insert plus every record");

        logs.iter()
            .filter(|l| l.table_name == "dim_product")
            .map(|l| l.new_data.as_deref().unwrap().parse::<usize>().unwrap())
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_concurrent_producers_lose_nothing(producers in 1usize..6, per_producer in 1usize..60) {
        let seen = run_concurrent_producers(producers, per_producer);
        let expected: BTreeSet<usize> = (0..producers * per_producer).collect();
        prop_assert_eq!(seen, expected);
    }
}
