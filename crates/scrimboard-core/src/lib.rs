//! `scrimboard-core` — configuration, error taxonomy and domain types shared
//! by every scrimboard crate.

pub mod config;
pub mod error;
pub mod time;
pub mod types;

pub use config::ScrimConfig;
pub use error::{Result, ScrimError};
pub use types::{BoardRefresh, Player, Scrim, ScrimDraft, ScrimId, SlotStatus};
