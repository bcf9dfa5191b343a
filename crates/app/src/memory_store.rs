//! In-process key-value store backed by a `HashMap`.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::RwLock;

use roomsense_domain::error::SenseError;

use crate::ports::KeyValueStore;

/// Volatile [`KeyValueStore`]; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an initial value.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, SenseError>> + Send {
        async move { Ok(self.entries.read().await.get(key).cloned()) }
    }

    fn save(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> impl Future<Output = Result<(), SenseError>> + Send {
        async move {
            self.entries.write().await.insert(key.to_string(), value);
            Ok(())
        }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), SenseError>> + Send {
        async move {
            self.entries.write().await.remove(key);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_return_none_when_key_missing() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_return_saved_value() {
        let store = InMemoryKeyValueStore::new();
        store.save("key", b"value".to_vec()).await.unwrap();
        assert_eq!(store.load("key").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn should_overwrite_existing_value() {
        let store = InMemoryKeyValueStore::with_entry("key", "old");
        store.save("key", b"new".to_vec()).await.unwrap();
        assert_eq!(store.load("key").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn should_delete_value_and_tolerate_missing_key() {
        let store = InMemoryKeyValueStore::with_entry("key", "value");
        store.delete("key").await.unwrap();
        store.delete("key").await.unwrap();
        assert!(store.load("key").await.unwrap().is_none());
    }
}
