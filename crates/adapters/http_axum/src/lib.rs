//! # roomsense-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept pushes from the sensor device (`POST /api/data`) and serve the
//!   latest reading back (`GET /api/data`)
//! - Serve the history as JSON: listings, daily view, statistics
//! - Serve CSV and JSON exports as file downloads
//! - Report the poller's connection status and the next save time
//!
//! ## Dependency rule
//! Depends on `roomsense-app` (for port traits and services) and
//! `roomsense-domain` (for types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
