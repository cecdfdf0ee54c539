//! Persistent-tier backends.
//!
//! The offline store keeps its second tier in any [`KeyValueStore`]. Values
//! are opaque bytes; the store owns the encoding. Operations are synchronous
//! and short, so they are called directly from async code.

mod lmdb;
mod memory;

pub use lmdb::LmdbKeyValueStore;
pub use memory::InMemoryKeyValueStore;

use lifeline_core::StorageError;
use std::sync::Arc;

/// Durable string-keyed byte storage.
///
/// # Errors
///
/// Implementations signal an exhausted size budget with
/// [`StorageError::QuotaExceeded`]; the offline store reacts to that variant
/// by purging expired entries and retrying once. Everything else should be
/// [`StorageError::Backend`].
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove a key. Returns whether it was present.
    fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// All keys starting with `prefix`, in no particular order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        (**self).delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        (**self).keys_with_prefix(prefix)
    }
}
