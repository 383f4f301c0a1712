//! In-memory backend
//!
//! Clones share the same map, so a test can keep a handle and inspect what the
//! store persisted.

use super::PersistentKv;
use crate::error::KvError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Arc<RwLock<HashMap<String, String>>>,
    /// Every successful `set_item`, in order
    writes: Arc<RwLock<Vec<(String, String)>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated backend
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let kv = Self::new();
        {
            let mut map = kv.entries.write();
            for (k, v) in entries {
                map.insert(k.into(), v.into());
            }
        }
        kv
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Write log since creation, oldest first
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.read().clone()
    }

    /// Change an entry behind the store's back
    pub fn insert_out_of_band(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_string(), value.to_string());
    }
}

impl PersistentKv for MemoryKv {
    fn get_item(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        self.writes
            .write()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<(), KvError> {
        self.entries.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let kv = MemoryKv::new();
        let handle = kv.clone();

        kv.set_item("language", "fr").unwrap();
        assert_eq!(handle.get_item("language").unwrap().as_deref(), Some("fr"));
        assert_eq!(handle.writes(), vec![("language".into(), "fr".into())]);
    }

    #[test]
    fn test_seeded_entries_are_not_logged_as_writes() {
        let kv = MemoryKv::with_entries([("a", "1"), ("b", "2")]);
        assert_eq!(kv.len(), 2);

        kv.clear().unwrap();
        assert!(kv.is_empty());
        assert_eq!(kv.get_item("a").unwrap(), None);
        assert!(kv.writes().is_empty());
    }
}
