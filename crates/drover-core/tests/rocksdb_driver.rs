//! End-to-end driver behaviour on a RocksDB store with the real clock.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use drover_core::{
    Clock, Config, Driver, DriverConfig, DriverError, Message, PriorityQueueConfig, RocksDbStore,
    StopReason, StorageError, Store, SystemClock,
};

fn config() -> DriverConfig {
    DriverConfig {
        refresh_interval_ms: 10,
        priority_queues: vec![PriorityQueueConfig {
            name: "drover:queue:high".to_string(),
            priority: 10,
        }],
        ..Default::default()
    }
}

#[test]
fn queued_and_scheduled_messages_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let now = SystemClock.now();

    {
        let store: Arc<dyn Store> = Arc::new(RocksDbStore::open(dir.path()).unwrap());
        let driver = Driver::new(store, &config);
        driver.send(Message::new(b"queued".to_vec()), Some(10)).unwrap();
        driver
            .send(Message::new(b"scheduled".to_vec()).execute_at(now + 0.2), None)
            .unwrap();
        assert_eq!(driver.schedule().len().unwrap(), 1);
    }

    let store: Arc<dyn Store> = Arc::new(RocksDbStore::open(dir.path()).unwrap());
    let mut cfg = config.clone();
    cfg.max_items = 2;
    let driver = Driver::new(store, &cfg);

    let mut delivered = Vec::new();
    let summary = driver
        .wait(
            |message, priority| delivered.push((message.payload, priority)),
            &[],
        )
        .unwrap();

    assert_eq!(summary.reason, StopReason::MaxItems);
    assert_eq!(
        delivered,
        vec![(b"queued".to_vec(), 10), (b"scheduled".to_vec(), 0)]
    );
    assert!(SystemClock.now() >= now + 0.2, "scheduled message delivered early");
}

#[test]
fn zero_interval_spins_until_signalled() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn Store> = Arc::new(RocksDbStore::open(dir.path()).unwrap());
    let mut cfg = config();
    cfg.refresh_interval_ms = 0;

    let worker = Driver::new(Arc::clone(&store), &cfg);
    let handle = thread::spawn(move || worker.wait(|_, _| {}, &[]).unwrap());

    thread::sleep(Duration::from_millis(50));
    let started = Instant::now();
    let signaller = Driver::new(store, &cfg);
    while !handle.is_finished() {
        signaller.signal_shutdown(SystemClock.now()).unwrap();
        thread::sleep(Duration::from_millis(10));
    }

    let summary = handle.join().unwrap();
    assert_eq!(summary.reason, StopReason::Shutdown);
    assert_eq!(summary.processed, 0);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn configured_store_and_driver_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let toml_str = format!(
        r#"
        [driver]
        max_items = 1

        [[driver.priority_queues]]
        name = "urgent"
        priority = 50

        [storage]
        backend = "rocksdb"
        data_dir = "{}"
        "#,
        dir.path().display()
    );
    let config: Config = toml::from_str(&toml_str).unwrap();
    let store = drover_core::storage::open(&config.storage).unwrap();
    let driver = Driver::new(store, &config.driver);

    driver.send(Message::new(b"u".to_vec()), Some(50)).unwrap();
    let mut got = None;
    driver.wait(|_, priority| got = Some(priority), &[]).unwrap();
    assert_eq!(got, Some(50));
}

#[test]
fn oversized_queue_name_is_reported_by_send() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn Store> = Arc::new(RocksDbStore::open(dir.path()).unwrap());
    let mut driver = Driver::new(store, &config());
    driver.setup_priority_queue("q".repeat(70_000), 5);

    let err = driver
        .send(Message::new(b"too far".to_vec()), Some(5))
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::Storage(StorageError::InvalidKey(_))
    ));
    // The other queues keep working
    assert!(driver.send(Message::new(b"fine".to_vec()), Some(10)).unwrap());
}
