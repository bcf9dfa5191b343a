//! Storage port — durable key-value persistence.

use std::future::Future;

use roomsense_domain::error::SenseError;

/// Byte storage addressed by string keys.
///
/// Implementations decide where the bytes live (a `SQLite` table, memory, …).
/// Reads and writes of a single key are expected to be atomic.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` when the key is absent.
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, SenseError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn save(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> impl Future<Output = Result<(), SenseError>> + Send;

    /// Remove `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), SenseError>> + Send;
}

impl<T: KeyValueStore + Send + Sync> KeyValueStore for std::sync::Arc<T> {
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, SenseError>> + Send {
        (**self).load(key)
    }

    fn save(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> impl Future<Output = Result<(), SenseError>> + Send {
        (**self).save(key, value)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), SenseError>> + Send {
        (**self).delete(key)
    }
}
