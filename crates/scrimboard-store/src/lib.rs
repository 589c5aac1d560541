//! `scrimboard-store` — SQLite persistence for scrims, the board pointer,
//! the player roster and availability.
//!
//! Timestamps are written as RFC 3339 UTC (`2025-12-23T09:00:00Z`). Reads
//! accept any RFC 3339 offset or naive ISO-8601 so rows written by older
//! tooling keep working; rows that parse as neither are skipped with a
//! warning rather than failing the whole query.

pub mod availability;
pub mod db;
pub mod error;
pub mod store;

pub use availability::{DaySlots, Schedule};
pub use error::{Result, StoreError};
pub use store::{EventSource, ScrimStore};
