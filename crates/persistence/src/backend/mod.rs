// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Connection setup and the statements Diesel has no DSL for.

pub mod sqlite;

use diesel::{Connection, SqliteConnection};

use crate::error::PersistenceError;

/// Connection-level helpers used by queries and mutations.
///
/// Implemented on the raw connection so the same call works inside and
/// outside a transaction.
pub trait PersistenceBackend: Connection {
    /// Id of the row inserted last on this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn last_insert_id(&mut self) -> Result<i64, PersistenceError>;

    /// Fails unless `SQLite` is enforcing foreign keys on this connection.
    ///
    /// # Errors
    ///
    /// Returns `ForeignKeyEnforcementNotEnabled` when enforcement is off.
    fn ensure_foreign_keys(&mut self) -> Result<(), PersistenceError>;
}

impl PersistenceBackend for SqliteConnection {
    fn last_insert_id(&mut self) -> Result<i64, PersistenceError> {
        sqlite::last_insert_id(self)
    }

    fn ensure_foreign_keys(&mut self) -> Result<(), PersistenceError> {
        if sqlite::foreign_keys_enforced(self)? {
            Ok(())
        } else {
            Err(PersistenceError::ForeignKeyEnforcementNotEnabled)
        }
    }
}
