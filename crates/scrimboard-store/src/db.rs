use rusqlite::{Connection, Result};

/// Number of roster slots on the availability form.
pub const ROSTER_SIZE: i64 = 6;

/// Initialise all scrimboard tables. Safe to call on every startup;
/// CREATE IF NOT EXISTS means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_scrims_table(conn)?;
    create_config_table(conn)?;
    create_players_table(conn)?;
    seed_players(conn)?;
    create_availability_table(conn)?;
    Ok(())
}

/// Apply the connection pragmas every handle should run with.
///
/// WAL lets the web API write while the reminder loop reads.
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;")
}

fn create_scrims_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS scrims (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            start_time_utc  TEXT NOT NULL,   -- RFC 3339, UTC
            end_time_utc    TEXT NOT NULL,   -- RFC 3339, UTC
            contact         TEXT,
            note            TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_scrims_start
            ON scrims (start_time_utc);",
    )
}

/// Arbitrary key/value pairs, e.g. the board message id.
fn create_config_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS config (
            key     TEXT PRIMARY KEY,
            value   TEXT
        );",
    )
}

fn create_players_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS players (
            id      INTEGER PRIMARY KEY,   -- 1 to 6
            name    TEXT NOT NULL
        );",
    )
}

fn seed_players(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))?;
    if count == 0 {
        for i in 1..=ROSTER_SIZE {
            conn.execute(
                "INSERT INTO players (id, name) VALUES (?1, ?2)",
                rusqlite::params![i, format!("Player {i}")],
            )?;
        }
    }
    Ok(())
}

fn create_availability_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS availability (
            player_id   INTEGER NOT NULL REFERENCES players(id),
            day         TEXT NOT NULL,   -- 'Monday 30/12/2025'
            time        TEXT NOT NULL,   -- '18:00'
            status      TEXT NOT NULL,
            PRIMARY KEY (player_id, day, time)
        );",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent_and_seeds_once() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn.execute("UPDATE players SET name = 'Dfield' WHERE id = 1", [])
            .unwrap();
        init_db(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, ROSTER_SIZE);
        let name: String = conn
            .query_row("SELECT name FROM players WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "Dfield");
    }
}
