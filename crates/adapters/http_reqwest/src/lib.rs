//! # roomsense-adapter-http-reqwest
//!
//! Reads a sensor device over HTTP using [reqwest](https://docs.rs/reqwest).
//!
//! The device exposes the same endpoints the daemon serves: `GET /api/data`
//! returns the latest reading and `POST /api/toggle-sensor` switches the
//! sensor on or off. This adapter implements the `ReadingSource` port so the
//! poller can drive the history from a remote device.

pub mod client;
pub mod error;

pub use client::HttpReadingSource;
pub use error::ClientError;
