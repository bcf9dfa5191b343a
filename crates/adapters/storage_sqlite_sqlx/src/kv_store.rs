//! `SQLite` implementation of [`KeyValueStore`].

use std::future::Future;

use sqlx::SqlitePool;

use roomsense_app::ports::KeyValueStore;
use roomsense_domain::error::SenseError;
use roomsense_domain::time::now;

use crate::error::StorageError;

const SELECT_VALUE: &str = "SELECT value FROM kv_store WHERE key = ?";
const UPSERT: &str = "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";
const DELETE_BY_KEY: &str = "DELETE FROM kv_store WHERE key = ?";

/// `SQLite`-backed key-value store.
///
/// Each key maps to one row; saving an existing key replaces its value.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, SenseError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_owned();
        async move {
            let row: Option<(Vec<u8>,)> = sqlx::query_as(SELECT_VALUE)
                .bind(key)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|(value,)| value))
        }
    }

    fn save(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> impl Future<Output = Result<(), SenseError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_owned();
        async move {
            sqlx::query(UPSERT)
                .bind(key)
                .bind(value)
                .bind(now().to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), SenseError>> + Send {
        let pool = self.pool.clone();
        let key = key.to_owned();
        async move {
            sqlx::query(DELETE_BY_KEY)
                .bind(key)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
