use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info, warn};

use scrimboard_core::config::BOARD_MESSAGE_KEY;
use scrimboard_core::time::{format_timestamp, parse_timestamp};
use scrimboard_core::{Scrim, ScrimDraft, ScrimId};

use crate::db::{configure, init_db};
use crate::error::{Result, StoreError};

/// What the reconciliation loop needs from persistence.
///
/// [`ScrimStore`] is the SQLite implementation; the trait exists so the loop
/// can be driven against other backends in tests.
pub trait EventSource: Send + Sync {
    /// Scrims with `end > now`, ordered by start ascending, ties by id.
    fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Scrim>>;

    /// Delete every scrim with `end <= now`. Committed before returning.
    fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Persisted id of the board message, if one was ever created.
    fn board_identity(&self) -> Result<Option<String>>;

    fn set_board_identity(&self, id: &str) -> Result<()>;
}

/// A row as stored, before timestamp parsing.
struct RawScrim {
    id: i64,
    name: String,
    start: String,
    end: String,
    contact: Option<String>,
    note: Option<String>,
}

impl RawScrim {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            start: row.get(2)?,
            end: row.get(3)?,
            contact: row.get(4)?,
            note: row.get(5)?,
        })
    }

    /// `None` (with a warning) when either timestamp is unreadable.
    fn parse(self) -> Option<Scrim> {
        let (Some(start), Some(end)) = (parse_timestamp(&self.start), parse_timestamp(&self.end))
        else {
            warn!(
                scrim_id = self.id,
                start = %self.start,
                end = %self.end,
                "skipping scrim with malformed timestamp"
            );
            return None;
        };
        Some(Scrim {
            id: ScrimId(self.id),
            name: self.name,
            start,
            end,
            contact: self.contact,
            note: self.note,
        })
    }
}

const SCRIM_COLUMNS: &str = "id, name, start_time_utc, end_time_utc, contact, note";

/// SQLite-backed store for scrims, config, players and availability.
///
/// Thread-safe: wraps the connection in a Mutex. Each public method holds the
/// lock for the duration of one statement or one transaction, so readers
/// never observe a half-written scrim.
pub struct ScrimStore {
    conn: Mutex<Connection>,
}

impl ScrimStore {
    /// Wrap an open connection, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open (or create) the database file at `path` with WAL enabled.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        configure(&conn)?;
        Self::new(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    // --- scrims ------------------------------------------------------------

    pub fn add_scrim(&self, draft: &ScrimDraft) -> Result<Scrim> {
        draft.validate()?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO scrims (name, start_time_utc, end_time_utc, contact, note)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                draft.name,
                format_timestamp(draft.start),
                format_timestamp(draft.end),
                draft.contact,
                draft.note
            ],
        )?;
        let id = ScrimId(conn.last_insert_rowid());
        info!(scrim_id = %id, name = %draft.name, "scrim added");
        Ok(scrim_from_draft(id, draft))
    }

    /// Replace every field of scrim `id`.
    pub fn update_scrim(&self, id: ScrimId, draft: &ScrimDraft) -> Result<Scrim> {
        draft.validate()?;
        let conn = self.conn()?;
        let n = conn.execute(
            "UPDATE scrims
             SET name = ?1, start_time_utc = ?2, end_time_utc = ?3, contact = ?4, note = ?5
             WHERE id = ?6",
            rusqlite::params![
                draft.name,
                format_timestamp(draft.start),
                format_timestamp(draft.end),
                draft.contact,
                draft.note,
                id.0
            ],
        )?;
        if n == 0 {
            return Err(StoreError::ScrimNotFound { id });
        }
        info!(scrim_id = %id, name = %draft.name, "scrim updated");
        Ok(scrim_from_draft(id, draft))
    }

    pub fn delete_scrim(&self, id: ScrimId) -> Result<()> {
        let n = self
            .conn()?
            .execute("DELETE FROM scrims WHERE id = ?1", [id.0])?;
        if n == 0 {
            return Err(StoreError::ScrimNotFound { id });
        }
        info!(scrim_id = %id, "scrim deleted");
        Ok(())
    }

    /// Fetch one scrim. A row with unreadable timestamps reads as `None`.
    pub fn get_scrim(&self, id: ScrimId) -> Result<Option<Scrim>> {
        let raw = self
            .conn()?
            .query_row(
                &format!("SELECT {SCRIM_COLUMNS} FROM scrims WHERE id = ?1"),
                [id.0],
                RawScrim::from_row,
            )
            .optional()?;
        Ok(raw.and_then(RawScrim::parse))
    }

    /// Every readable scrim regardless of end time, ordered by start then id.
    pub fn list_all(&self) -> Result<Vec<Scrim>> {
        let mut scrims: Vec<Scrim> = self
            .raw_scrims()?
            .into_iter()
            .filter_map(RawScrim::parse)
            .collect();
        sort_by_start(&mut scrims);
        Ok(scrims)
    }

    fn raw_scrims(&self) -> Result<Vec<RawScrim>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SCRIM_COLUMNS} FROM scrims ORDER BY start_time_utc, id"
        ))?;
        let rows = stmt
            .query_map([], RawScrim::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // --- config ------------------------------------------------------------

    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()?
            .query_row("SELECT value FROM config WHERE key = ?1", [key], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()?;
        Ok(value.flatten())
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        debug!(key, value, "config updated");
        Ok(())
    }
}

impl EventSource for ScrimStore {
    fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Scrim>> {
        let mut scrims: Vec<Scrim> = self
            .raw_scrims()?
            .into_iter()
            .filter_map(RawScrim::parse)
            .filter(|s| s.end > now)
            .collect();
        sort_by_start(&mut scrims);
        Ok(scrims)
    }

    fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        // Compare parsed instants rather than strings so rows written with a
        // different offset format still expire on time.
        let expired: Vec<i64> = {
            let mut stmt = tx.prepare_cached("SELECT id, end_time_utc FROM scrims")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter()
                .filter(|(_, end)| parse_timestamp(end).is_some_and(|end| end <= now))
                .map(|(id, _)| id)
                .collect()
        };

        for id in &expired {
            tx.execute("DELETE FROM scrims WHERE id = ?1", [id])?;
        }
        tx.commit()?;

        if !expired.is_empty() {
            info!(count = expired.len(), "pruned expired scrims");
        }
        Ok(expired.len())
    }

    fn board_identity(&self) -> Result<Option<String>> {
        self.get_config(BOARD_MESSAGE_KEY)
    }

    fn set_board_identity(&self, id: &str) -> Result<()> {
        self.set_config(BOARD_MESSAGE_KEY, id)
    }
}

fn sort_by_start(scrims: &mut [Scrim]) {
    scrims.sort_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)));
}

fn scrim_from_draft(id: ScrimId, draft: &ScrimDraft) -> Scrim {
    Scrim {
        id,
        name: draft.name.clone(),
        start: draft.start,
        end: draft.end,
        contact: draft.contact.clone(),
        note: draft.note.clone(),
    }
}
