// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Where the database lives. File databases also get a write-ahead log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Shared-cache in-memory database.
    Memory,
    /// On-disk database file.
    File,
}

impl StorageMode {
    const fn pragmas(self) -> &'static [&'static str] {
        match self {
            Self::Memory => &["PRAGMA foreign_keys = ON", "PRAGMA busy_timeout = 5000"],
            Self::File => &[
                "PRAGMA foreign_keys = ON",
                "PRAGMA busy_timeout = 5000",
                "PRAGMA journal_mode = WAL",
            ],
        }
    }
}

#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Opens `url`, applies the pragmas for `mode` and brings the schema up to date.
///
/// # Errors
///
/// Returns an error if the connection, a pragma or a migration fails.
pub fn open(url: &str, mode: StorageMode) -> Result<SqliteConnection, PersistenceError> {
    info!(url, ?mode, "Opening SQLite database");

    let mut conn: SqliteConnection = SqliteConnection::establish(url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    for pragma in mode.pragmas() {
        diesel::sql_query(*pragma)
            .execute(&mut conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("{pragma}: {e}")))?;
    }

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    debug!(applied = applied.len(), "Migrations applied");

    Ok(conn)
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn last_insert_id(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}

/// # Errors
///
/// Returns an error if the pragma cannot be read.
pub fn foreign_keys_enforced(conn: &mut SqliteConnection) -> Result<bool, PersistenceError> {
    let row: ForeignKeysPragma = diesel::sql_query("PRAGMA foreign_keys").get_result(conn)?;
    Ok(row.foreign_keys != 0)
}
