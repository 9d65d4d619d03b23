use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::models::DrawRecord;

/// Durée de validité du cache local avant qu'un nouvel import soit conseillé.
pub const CACHE_MAX_AGE_HOURS: i64 = 24;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    round         INTEGER PRIMARY KEY,
    draw_date     TEXT NOT NULL,
    num_1         INTEGER NOT NULL,
    num_2         INTEGER NOT NULL,
    num_3         INTEGER NOT NULL,
    num_4         INTEGER NOT NULL,
    num_5         INTEGER NOT NULL,
    num_6         INTEGER NOT NULL,
    bonus         INTEGER
);
CREATE TABLE IF NOT EXISTS meta (
    key           TEXT PRIMARY KEY,
    value         TEXT NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotto.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &DrawRecord) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (round, draw_date, num_1, num_2, num_3, num_4, num_5, num_6, bonus)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            draw.round,
            draw.draw_date,
            draw.numbers[0],
            draw.numbers[1],
            draw.numbers[2],
            draw.numbers[3],
            draw.numbers[4],
            draw.numbers[5],
            draw.bonus_number,
        ],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

/// Derniers tirages, du plus récent au plus ancien.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT round, draw_date, num_1, num_2, num_3, num_4, num_5, num_6, bonus
         FROM draws ORDER BY round DESC LIMIT ?1"
    )?;
    let draws = stmt.query_map([limit], |row| {
        Ok(DrawRecord {
            round: row.get(0)?,
            draw_date: row.get(1)?,
            numbers: [
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, u8>(5)?,
                row.get::<_, u8>(6)?,
                row.get::<_, u8>(7)?,
            ],
            bonus_number: row.get::<_, Option<u8>>(8)?,
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn latest_round(conn: &Connection) -> Result<Option<u32>> {
    let round: Option<u32> = conn.query_row("SELECT MAX(round) FROM draws", [], |row| row.get(0))?;
    Ok(round)
}

pub fn touch_last_updated(conn: &Connection, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO meta (key, value) VALUES ('last_updated', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [now.to_rfc3339()],
    ).context("Impossible d'enregistrer la date de mise à jour")?;
    Ok(())
}

pub fn last_updated(conn: &Connection) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM meta WHERE key = 'last_updated'", [], |row| row.get(0))
        .optional()?;
    match raw {
        Some(s) => {
            let parsed = DateTime::parse_from_rfc3339(&s)
                .with_context(|| format!("Date de mise à jour illisible : '{}'", s))?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}

/// Le cache est valide s'il a été mis à jour il y a moins de 24 h.
pub fn is_cache_valid(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_updated {
        Some(updated) => now - updated < Duration::hours(CACHE_MAX_AGE_HOURS),
        None => false,
    }
}
