//! localstore-core - Write-through settings cache
//!
//! Resolves string settings from an in-memory cache, then a persistent
//! key-value store, then configured defaults. Writes hit the cache at once and
//! reach the persistent store through a background writer.

pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod global;
pub mod kv;
pub mod store;
mod writer;

pub use config::{Configuration, DefaultValue};
pub use error::{KvError, StoreError};
pub use event::{EventBus, StoreEvent};
pub use gate::{FeatureGate, VersionRegistry, RESET_LOCAL_FLAG};
pub use kv::{JsonFileKv, MemoryKv, PersistentKv, SqliteKv};
pub use store::LocalStore;
pub use writer::WriteBackStats;
