//! # roomsense-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `KeyValueStore` port defined in `roomsense-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//!
//! ## Dependency rule
//! Depends on `roomsense-app` (for port traits) and `roomsense-domain` (for
//! the error type). The `app` and `domain` crates must never reference this
//! adapter.

pub mod error;
pub mod kv_store;
pub mod pool;

pub use kv_store::SqliteKeyValueStore;
pub use pool::{Config, Database};
