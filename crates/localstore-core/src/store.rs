//! Write-through settings store
//!
//! Reads resolve cache -> persistent store -> defaults, and whatever wins is
//! cached for the life of the store. Writes update the cache immediately and
//! hand persistence to the write-back worker.

use crate::config::Configuration;
use crate::error::StoreError;
use crate::event::{EventBus, StoreEvent};
use crate::gate::{FeatureGate, RESET_LOCAL_FLAG};
use crate::kv::PersistentKv;
use crate::writer::{WriteBack, WriteBackStats};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Cached view over a persistent key-value store with fallback defaults
///
/// Once a key has been read or written, the cache is authoritative for it:
/// later changes made to the persistent store by someone else are not seen.
pub struct LocalStore {
    /// Fallback values
    config: Configuration,

    /// Last observed or written value per key; never shrinks
    cache: DashMap<String, String>,

    /// Durable backend, read inline and written by the worker
    kv: Arc<dyn PersistentKv>,

    writer: WriteBack,

    event_bus: EventBus,

    /// Persistent store was wiped during initialization
    was_reset: bool,
}

impl LocalStore {
    /// Initialize on the current tokio runtime.
    ///
    /// When `gate` has `resetLocal`, the persistent store is cleared before
    /// this returns. A failed clear is an error.
    pub fn initialize<K: PersistentKv>(
        config: Configuration,
        kv: K,
        gate: &dyn FeatureGate,
    ) -> Result<Self, StoreError> {
        let handle = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        Self::initialize_on(config, kv, gate, &handle)
    }

    /// Initialize with the write-back worker on an explicit runtime
    pub fn initialize_on<K: PersistentKv>(
        config: Configuration,
        kv: K,
        gate: &dyn FeatureGate,
        handle: &Handle,
    ) -> Result<Self, StoreError> {
        Self::start(config, kv, gate, handle, EventBus::default_capacity())
    }

    /// Initialize on the current runtime, publishing on a bus the caller
    /// already subscribed to. Needed to observe `StoreEvent::Cleared`.
    pub fn initialize_with_events<K: PersistentKv>(
        config: Configuration,
        kv: K,
        gate: &dyn FeatureGate,
        event_bus: EventBus,
    ) -> Result<Self, StoreError> {
        let handle = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        Self::start(config, kv, gate, &handle, event_bus)
    }

    fn start<K: PersistentKv>(
        config: Configuration,
        kv: K,
        gate: &dyn FeatureGate,
        handle: &Handle,
        event_bus: EventBus,
    ) -> Result<Self, StoreError> {
        config.validate()?;

        let kv: Arc<dyn PersistentKv> = Arc::new(kv);

        let was_reset = gate.has(RESET_LOCAL_FLAG);
        if was_reset {
            kv.clear()?;
            warn!(flag = RESET_LOCAL_FLAG, "Persistent store cleared");
            event_bus.publish(StoreEvent::Cleared);
        }

        let writer = WriteBack::spawn(Arc::clone(&kv), event_bus.clone(), handle);

        info!(config = ?config, reset = was_reset, "Local store initialized");

        Ok(Self {
            config,
            cache: DashMap::new(),
            kv,
            writer,
            event_bus,
            was_reset,
        })
    }

    /// Value for `key`: cached, else persisted, else the stringified default.
    ///
    /// Keys unknown everywhere yield `"undefined"` rather than an error.
    pub fn get(&self, key: &str) -> String {
        if let Some(value) = self.cache.get(key) {
            return value.value().clone();
        }

        let resolved = self.resolve_uncached(key);

        // A concurrent set may have landed in between; keep it
        self.cache
            .entry(key.to_string())
            .or_insert(resolved)
            .value()
            .clone()
    }

    /// Like `get`, but only for keys the configuration defines
    pub fn get_strict(&self, key: &str) -> Result<String, StoreError> {
        if !self.config.contains_key(key) {
            return Err(StoreError::UnknownKey {
                key: key.to_string(),
            });
        }
        Ok(self.get(key))
    }

    fn resolve_uncached(&self, key: &str) -> String {
        match self.kv.get_item(key) {
            Ok(Some(value)) => {
                debug!(key, "Resolved from persistent store");
                value
            }
            Ok(None) => {
                debug!(key, "Resolved from defaults");
                self.config.default_string(key)
            }
            Err(e) => {
                warn!(key, error = %e, "Persistent read failed, using default");
                self.config.default_string(key)
            }
        }
    }

    /// Overwrite `key` in the cache and schedule persistence.
    ///
    /// Returns before the persistent store is touched. Writes for the same key
    /// reach the store in call order.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        // Hold the shard lock until queued so cache order and persist order agree
        let slot = self.cache.entry(key.clone()).insert(value.clone());
        let queued = self.writer.enqueue(key, value);
        drop(slot);

        if let Err(e) = queued {
            warn!(error = %e, "Value cached but will not be persisted");
        }
    }

    /// Wait until every write issued before this call has been attempted
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.writer.flush().await
    }

    pub fn stats(&self) -> WriteBackStats {
        self.writer.stats()
    }

    /// Subscribe to write-back outcomes
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn was_reset(&self) -> bool {
        self.was_reset
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Number of keys seen so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
