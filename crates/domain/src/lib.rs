//! # roomsense-domain
//!
//! Pure domain model for the roomsense climate logger.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Readings** (temperature / humidity samples) and their upstream wire shape
//! - Define **History records** (persisted readings with identity and a timestamp)
//! - Compute **History statistics** over a set of records
//! - Serialize records into the **CSV and JSON export** formats
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod export;
pub mod history;
pub mod reading;
pub mod stats;
