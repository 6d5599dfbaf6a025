// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! One `Database` owns one connection. Archive and restore sessions borrow
//! it (or a transaction opened on it) for their whole pass.

use std::path::Path;

use callvault_config::model::StorageConfig;
use callvault_core::CallvaultError;
use rusqlite::Connection;

use crate::migrations::run_migrations;

/// An open, migrated callvault database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database described by `config`.
    pub fn open(config: &StorageConfig) -> Result<Self, CallvaultError> {
        Self::open_path(Path::new(&config.database_path), config.wal_mode)
    }

    /// Open the database at `path`, creating parent directories.
    pub fn open_path(path: &Path, wal_mode: bool) -> Result<Self, CallvaultError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(CallvaultError::storage)?;
            }
        }

        let conn = Connection::open(path).map_err(CallvaultError::storage)?;
        let db = Self::setup(conn, wal_mode)?;
        tracing::info!(path = %path.display(), wal_mode, "database opened");
        Ok(db)
    }

    /// A migrated in-memory database. WAL does not apply to memory databases.
    pub fn open_in_memory() -> Result<Self, CallvaultError> {
        let conn = Connection::open_in_memory().map_err(CallvaultError::storage)?;
        Self::setup(conn, false)
    }

    fn setup(mut conn: Connection, wal_mode: bool) -> Result<Self, CallvaultError> {
        apply_pragmas(&conn, wal_mode)?;
        run_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Mutable access, needed to open a transaction.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<(), CallvaultError> {
        self.conn
            .close()
            .map_err(|(_, err)| CallvaultError::storage(err))
    }
}

fn apply_pragmas(conn: &Connection, wal_mode: bool) -> Result<(), CallvaultError> {
    if wal_mode {
        let mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(CallvaultError::storage)?;
        tracing::debug!(journal_mode = %mode, "journal mode set");
    }
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )
    .map_err(CallvaultError::storage)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn in_memory_database_is_migrated() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        assert!(table_exists(conn, "threads"));
        assert!(table_exists(conn, "interactions"));
        assert!(table_exists(conn, "call_records"));
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().unwrap();
        let enabled: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);

        let orphan = db.connection().execute(
            "INSERT INTO interactions (thread_row_id, timestamp, kind) VALUES (99, 1, 'group_call')",
            [],
        );
        assert!(orphan.is_err());
    }

    #[test]
    fn file_database_uses_wal_and_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("calls.db");
        let db = Database::open_path(&path, true).unwrap();
        let mode: String = db
            .connection()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        db.close().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn reopening_skips_applied_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("calls.db").display().to_string(),
            wal_mode: false,
        };
        Database::open(&config).unwrap().close().unwrap();
        let db = Database::open(&config).unwrap();
        let applied: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(applied, 1);
    }
}
