//! Persistent store adapter

mod kv;

pub use kv::{KeyValueStore, SqliteStore, StorageKey, StoreError};
