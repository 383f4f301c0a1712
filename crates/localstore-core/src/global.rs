//! Process-wide store handle
//!
//! For applications that want one store reachable from anywhere. Calls before
//! `init` fail with `StoreError::NotInitialized` instead of misbehaving.

use crate::config::Configuration;
use crate::error::StoreError;
use crate::gate::FeatureGate;
use crate::kv::PersistentKv;
use crate::store::LocalStore;
use once_cell::sync::OnceCell;
use parking_lot::{const_mutex, Mutex};

static STORE: OnceCell<LocalStore> = OnceCell::new();

/// Held from the initialized check until the store is published, so a losing
/// `init` never reaches the gate or the reset.
static INIT_LOCK: Mutex<()> = const_mutex(());

/// Initialize the process-wide store on the current tokio runtime. Only the
/// first call succeeds; later or concurrent losers leave the backend untouched.
pub fn init<K: PersistentKv>(
    config: Configuration,
    kv: K,
    gate: &dyn FeatureGate,
) -> Result<&'static LocalStore, StoreError> {
    let _guard = INIT_LOCK.lock();
    if STORE.get().is_some() {
        return Err(StoreError::AlreadyInitialized);
    }

    let store = LocalStore::initialize(config, kv, gate)?;
    STORE
        .set(store)
        .map_err(|_| StoreError::AlreadyInitialized)?;
    self::store()
}

pub fn is_initialized() -> bool {
    STORE.get().is_some()
}

pub fn store() -> Result<&'static LocalStore, StoreError> {
    STORE.get().ok_or(StoreError::NotInitialized)
}

pub fn get(key: &str) -> Result<String, StoreError> {
    Ok(store()?.get(key))
}

pub fn set(key: impl Into<String>, value: impl Into<String>) -> Result<(), StoreError> {
    store()?.set(key, value);
    Ok(())
}

pub async fn flush() -> Result<(), StoreError> {
    store()?.flush().await
}
