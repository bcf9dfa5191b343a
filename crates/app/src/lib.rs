//! # roomsense-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `KeyValueStore` — durable byte storage under fixed keys
//!   - `ReadingSource` — where the current sensor reading comes from
//! - Define **driving/inbound** use-cases:
//!   - `HistoryService` — time-gated sampling, bounded log, statistics, exports
//!   - `LatestReadingStore` — single-slot holder for the most recent reading
//!   - `Poller` — fixed-period driver feeding readings into the history
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (`InMemoryKeyValueStore`)
//!
//! ## Dependency rule
//! Depends on `roomsense-domain` only (plus `tokio::sync` / `tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod memory_store;
pub mod poller;
pub mod ports;
pub mod services;
