use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{Goal, NewWeightEntry, WeightEntry};

const GOAL_KEY: &str = "goal_weight";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "database ready");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS weights (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL,
                    pounds REAL NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_weights_date ON weights(date DESC);

                CREATE TABLE IF NOT EXISTS settings (
                    key TEXT PRIMARY KEY NOT NULL,
                    value REAL,
                    updated_at TEXT
                );

                INSERT OR IGNORE INTO settings (key, value, updated_at) VALUES ('goal_weight', NULL, NULL);

                PRAGMA user_version = 1;",
            )?;
            tracing::info!("applied schema migration v1");
        }

        Ok(())
    }

    /// Cheap liveness check used by the health endpoint.
    pub fn ping(&self) -> Result<()> {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .context("database ping failed")?;
        Ok(())
    }

    // --- Weight entries ---

    fn weight_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<WeightEntry> {
        let date_str: String = row.get(1)?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(WeightEntry {
            id: row.get(0)?,
            date,
            pounds: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    pub fn insert_weight(&self, entry: &NewWeightEntry) -> Result<WeightEntry> {
        let now = Utc::now().to_rfc3339();
        let date_str = entry.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO weights (date, pounds, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![date_str, entry.pounds, now, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_weight(id)?
            .context("Weight entry not found after insert")
    }

    pub fn get_weight(&self, id: i64) -> Result<Option<WeightEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, date, pounds, created_at, updated_at FROM weights WHERE id = ?1",
                params![id],
                Self::weight_entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Entries within the inclusive bounds, newest first. Each bound is optional and
    /// applied on its own.
    pub fn list_weights(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<WeightEntry>> {
        let start = start.map(|d| d.format("%Y-%m-%d").to_string());
        let end = end.map(|d| d.format("%Y-%m-%d").to_string());
        let mut stmt = self.conn.prepare(
            "SELECT id, date, pounds, created_at, updated_at FROM weights
             WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2)
             ORDER BY date DESC, id DESC",
        )?;
        let entries = stmt
            .query_map(params![start, end], Self::weight_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Replace date and pounds together. Returns `None` when the id does not exist.
    pub fn update_weight(&self, id: i64, entry: &NewWeightEntry) -> Result<Option<WeightEntry>> {
        let now = Utc::now().to_rfc3339();
        let date_str = entry.date.format("%Y-%m-%d").to_string();
        let rows = self.conn.execute(
            "UPDATE weights SET date = ?1, pounds = ?2, updated_at = ?3 WHERE id = ?4",
            params![date_str, entry.pounds, now, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        self.get_weight(id)
    }

    pub fn delete_weight(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM weights WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Goal ---

    pub fn get_goal(&self) -> Result<Goal> {
        let goal = self
            .conn
            .query_row(
                "SELECT value, updated_at FROM settings WHERE key = ?1",
                params![GOAL_KEY],
                |row| {
                    Ok(Goal {
                        pounds: row.get(0)?,
                        updated_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(goal.unwrap_or_default())
    }

    /// Replace the goal as a whole. `None` clears it; the update time is still recorded.
    pub fn set_goal(&self, pounds: Option<f64>) -> Result<Goal> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![GOAL_KEY, pounds, now],
        )?;
        self.get_goal()
    }
}
