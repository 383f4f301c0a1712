//! Concurrent `global::init` calls
//!
//! Own test binary: the process-wide handle can only be initialized once.

use localstore_core::{global, Configuration, MemoryKv, PersistentKv, StoreError, RESET_LOCAL_FLAG};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_losing_init_never_touches_backend() {
    let kv = MemoryKv::with_entries([("language", "fr")]);
    let gate_calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [false, true]
        .into_iter()
        .map(|reset| {
            let kv = kv.clone();
            let gate_calls = Arc::clone(&gate_calls);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();
                let _entered = runtime.enter();

                // Slow gate widens the window between check and publish
                let gate = |flag: &str| {
                    gate_calls.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(100));
                    reset && flag == RESET_LOCAL_FLAG
                };

                barrier.wait();
                global::init(Configuration::new("en"), kv, &gate).map(|store| store.was_reset())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners: Vec<bool> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::AlreadyInitialized)))
            .count(),
        1
    );
    assert_eq!(gate_calls.load(Ordering::SeqCst), 1);

    // The backend was cleared only if the winning init asked for it
    let winner_reset = winners[0];
    assert_eq!(global::store().unwrap().was_reset(), winner_reset);
    if winner_reset {
        assert_eq!(kv.get_item("language").unwrap(), None);
        assert_eq!(global::get("language").unwrap(), "en");
    } else {
        assert_eq!(kv.get_item("language").unwrap().as_deref(), Some("fr"));
        assert_eq!(global::get("language").unwrap(), "fr");
    }
}
