//! Persistent key-value backends
//!
//! `PersistentKv` is the host-provided durable store the cache sits on. All
//! calls are synchronous; the store decides when they run (reads inline, writes
//! from the write-back worker).

pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileKv;
pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

use crate::error::KvError;
use std::sync::Arc;

/// Durable string key-value storage
pub trait PersistentKv: Send + Sync + 'static {
    /// Stored value for `key`, `None` if absent
    fn get_item(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Insert or overwrite `key`
    fn set_item(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Remove every entry
    fn clear(&self) -> Result<(), KvError>;
}

impl<T: PersistentKv + ?Sized> PersistentKv for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set_item(key, value)
    }

    fn clear(&self) -> Result<(), KvError> {
        (**self).clear()
    }
}

impl<T: PersistentKv + ?Sized> PersistentKv for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set_item(key, value)
    }

    fn clear(&self) -> Result<(), KvError> {
        (**self).clear()
    }
}
