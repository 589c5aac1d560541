//! `scrimboard-scheduler` — the periodic reconciliation loop.
//!
//! # Overview
//!
//! Every tick the [`Reconciler`] prunes ended scrims, re-renders the board
//! and overwrites the live board message, then posts or retracts reminders
//! for each configured threshold. [`ReminderEngine`] runs it on a
//! `tokio::time::interval` and serves out-of-band board refreshes between
//! ticks.
//!
//! # Reminder lifecycle
//!
//! | Condition                            | Action                                |
//! |--------------------------------------|---------------------------------------|
//! | `\|diff - t\| < 0.5`, no record      | send, record, retract larger `t`      |
//! | send fails                           | log; threshold is missed for good     |
//! | `diff <= 0`                          | retract every record for the scrim    |
//! | scrim no longer listed               | retract every record for the scrim    |

pub mod engine;
pub mod error;
pub mod reconcile;
pub mod reminder;
pub mod render;

pub use engine::ReminderEngine;
pub use error::{BoardError, Result, SchedulerError};
pub use reconcile::{Reconciler, TickReport};
pub use reminder::{reminder_text, ReminderState};
pub use render::{placeholder_board, BoardRenderer};
