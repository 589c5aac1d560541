//! `scrimboard-gateway` — HTTP API for the scrim board plus the `scrimboard`
//! binary that wires the store, the reminder loop and the Discord bot together.

use std::path::Path;

use anyhow::Context;

pub mod app;
pub mod http;

/// Create the directory holding the SQLite file, if it has one.
pub fn ensure_parent_dir(path: &str) -> anyhow::Result<()> {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display())),
        _ => Ok(()),
    }
}
