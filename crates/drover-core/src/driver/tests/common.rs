use super::*;

pub(super) const START: f64 = 1_700_000_000.0;

pub(super) fn test_config() -> DriverConfig {
    DriverConfig {
        default_queue: "default".to_string(),
        schedule_key: "scheduled".to_string(),
        shutdown_key: "shutdown".to_string(),
        refresh_interval_ms: 1000,
        max_items: 0,
        priority_queues: vec![
            PriorityQueueConfig {
                name: "high".to_string(),
                priority: 10,
            },
            PriorityQueueConfig {
                name: "low".to_string(),
                priority: 1,
            },
        ],
    }
}

/// Helper: a driver on a fresh memory store with a manual clock at `START`.
pub(super) fn test_setup() -> (Driver, Arc<MemoryStore>, Arc<ManualClock>) {
    test_setup_with_config(test_config())
}

pub(super) fn test_setup_with_config(
    config: DriverConfig,
) -> (Driver, Arc<MemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(START));
    let driver = Driver::new(store.clone(), &config).with_clock(clock.clone());
    (driver, store, clock)
}

pub(super) fn test_message(payload: &str) -> Message {
    Message::new(payload.as_bytes().to_vec())
}

/// Helper: run `wait` to completion, collecting
/// `(payload, priority)` in delivery order.
pub(super) fn drain(driver: &Driver, priorities: &[i32]) -> (Vec<(String, i32)>, WaitSummary) {
    let mut delivered = Vec::new();
    let summary = driver
        .wait(
            |message, priority| {
                delivered.push((String::from_utf8(message.payload).unwrap(), priority));
            },
            priorities,
        )
        .unwrap();
    (delivered, summary)
}
