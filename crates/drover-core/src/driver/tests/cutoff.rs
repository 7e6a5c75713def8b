use super::*;

fn cutoff_setup(max_items: u64) -> (Driver, Arc<MemoryStore>, Arc<ManualClock>) {
    let mut config = test_config();
    config.max_items = max_items;
    test_setup_with_config(config)
}

#[test]
fn stops_after_exactly_max_items() {
    let (driver, store, _clock) = cutoff_setup(3);
    for i in 0..5 {
        driver.send(test_message(&format!("m{i}")), None).unwrap();
    }

    let (delivered, summary) = drain(&driver, &[]);
    assert_eq!(delivered.len(), 3);
    assert_eq!(
        summary,
        WaitSummary {
            reason: StopReason::MaxItems,
            processed: 3
        }
    );
    assert_eq!(store.set_len("default").unwrap(), 2);
}

#[test]
fn counter_resets_on_each_wait() {
    let (driver, store, _clock) = cutoff_setup(3);
    for i in 0..7 {
        driver.send(test_message(&format!("m{i}")), None).unwrap();
    }

    assert_eq!(drain(&driver, &[]).1.processed, 3);
    assert_eq!(drain(&driver, &[]).1.processed, 3);
    assert_eq!(store.set_len("default").unwrap(), 1);
}

#[test]
fn zero_means_unbounded() {
    let (driver, _store, _clock) = cutoff_setup(0);
    for i in 0..5 {
        driver.send(test_message(&format!("m{i}")), None).unwrap();
    }
    driver.signal_shutdown(START + 1.0).unwrap();

    let (delivered, summary) = drain(&driver, &[]);
    assert_eq!(delivered.len(), 5);
    assert_eq!(summary.reason, StopReason::Shutdown);
}

#[test]
fn shutdown_checked_before_cutoff() {
    let (driver, _store, _clock) = cutoff_setup(1);
    driver.send(test_message("m"), None).unwrap();
    driver.signal_shutdown(START).unwrap();

    let (delivered, summary) = drain(&driver, &[]);
    assert!(delivered.is_empty());
    assert_eq!(summary.reason, StopReason::Shutdown);
}
