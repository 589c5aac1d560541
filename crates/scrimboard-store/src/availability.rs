//! Roster names and per-slot availability for the web form.

use std::collections::BTreeMap;

use tracing::info;

use scrimboard_core::{Player, SlotStatus};

use crate::db::ROSTER_SIZE;
use crate::error::{Result, StoreError};
use crate::store::ScrimStore;

/// time slot → status, e.g. `"18:00" → "available"`.
pub type DaySlots = BTreeMap<String, String>;
/// day label → slots.
pub type Schedule = BTreeMap<String, DaySlots>;

impl ScrimStore {
    pub fn list_players(&self) -> Result<Vec<Player>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached("SELECT id, name FROM players ORDER BY id ASC")?;
        let players = stmt
            .query_map([], |row| {
                Ok(Player {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }

    pub fn rename_player(&self, id: i64, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let n = self
            .conn()?
            .execute("UPDATE players SET name = ?1 WHERE id = ?2", rusqlite::params![name, id])?;
        if n == 0 {
            return Err(StoreError::PlayerNotFound { id });
        }
        info!(player_id = id, %name, "player renamed");
        Ok(())
    }

    /// Rename the whole roster at once; `names[0]` becomes player 1.
    pub fn set_players(&self, names: &[String]) -> Result<()> {
        if names.len() != ROSTER_SIZE as usize {
            return Err(StoreError::RosterSize {
                expected: ROSTER_SIZE as usize,
                got: names.len(),
            });
        }
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(StoreError::EmptyName);
        }
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for (i, name) in names.iter().enumerate() {
            tx.execute(
                "UPDATE players SET name = ?1 WHERE id = ?2",
                rusqlite::params![name.trim(), i as i64 + 1],
            )?;
        }
        tx.commit()?;
        info!("roster updated");
        Ok(())
    }

    /// Upsert or clear one slot.
    pub fn set_availability(
        &self,
        player_id: i64,
        day: &str,
        time: &str,
        status: &SlotStatus,
    ) -> Result<()> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM players WHERE id = ?1)",
            [player_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::PlayerNotFound { id: player_id });
        }

        match status {
            SlotStatus::Clear => {
                conn.execute(
                    "DELETE FROM availability WHERE player_id = ?1 AND day = ?2 AND time = ?3",
                    rusqlite::params![player_id, day, time],
                )?;
            }
            SlotStatus::Set(value) => {
                conn.execute(
                    "INSERT INTO availability (player_id, day, time, status)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(player_id, day, time) DO UPDATE SET status = excluded.status",
                    rusqlite::params![player_id, day, time, value],
                )?;
            }
        }
        Ok(())
    }

    /// Everything one player has filled in, keyed by day label.
    pub fn availability_for_player(&self, player_id: i64) -> Result<Schedule> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT day, time, status FROM availability WHERE player_id = ?1",
        )?;
        let mut schedule = Schedule::new();
        let rows = stmt.query_map([player_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (day, time, status) = row?;
            schedule.entry(day).or_default().insert(time, status);
        }
        Ok(schedule)
    }

    /// Every player's slots for one day label. Players with nothing filled in
    /// still appear with an empty slot map.
    pub fn availability_for_day(&self, day: &str) -> Result<BTreeMap<i64, DaySlots>> {
        let mut result: BTreeMap<i64, DaySlots> = self
            .list_players()?
            .into_iter()
            .map(|p| (p.id, DaySlots::new()))
            .collect();

        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT player_id, time, status FROM availability WHERE day = ?1",
        )?;
        let rows = stmt.query_map([day], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (player_id, time, status) = row?;
            result.entry(player_id).or_default().insert(time, status);
        }
        Ok(result)
    }
}
