//! `scrimboard-discord` — Discord surface for the scrim board.
//!
//! [`DiscordChannel`] is the REST-only [`scrimboard_channels::NotificationChannel`]
//! the reminder loop posts through. [`DiscordAdapter`] holds the gateway
//! connection that serves `/scrim_add`, `/list_scrims` and `/edit_scrim`.

pub mod adapter;
pub mod channel;
pub mod commands;
pub mod context;
pub mod embed;
pub mod error;
pub mod handler;

pub use adapter::DiscordAdapter;
pub use channel::DiscordChannel;
pub use context::DiscordAppContext;
pub use error::DiscordError;
