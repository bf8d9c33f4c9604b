// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sync log mutations.
//!
//! An entry is inserted when a sync starts and finished exactly once. A
//! second finish is refused so the stored history cannot be rewritten.

use diesel::SqliteConnection;
use diesel::prelude::*;
use innsync_audit::{SyncLogEntry, SyncStatus};
use std::str::FromStr;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::columns::{count_to_column, format_date, format_timestamp};
use crate::diesel_schema::sync_logs;
use crate::error::PersistenceError;
use crate::queries::sync_logs::get_sync_log_status;

/// Inserts a sync log entry.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_sync_log(
    conn: &mut SqliteConnection,
    entry: &SyncLogEntry,
) -> Result<i64, PersistenceError> {
    let room_ids_json: Option<String> = entry
        .scope
        .room_ids
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    diesel::insert_into(sync_logs::table)
        .values((
            sync_logs::configuration_id.eq(entry.configuration_id),
            sync_logs::tenant_id.eq(entry.tenant_id),
            sync_logs::sync_type.eq(entry.sync_type.as_str()),
            sync_logs::direction.eq(entry.direction.as_str()),
            sync_logs::status.eq(entry.status.as_str()),
            sync_logs::date_from.eq(entry.scope.date_from.map(format_date).transpose()?),
            sync_logs::date_to.eq(entry.scope.date_to.map(format_date).transpose()?),
            sync_logs::room_ids_json.eq(room_ids_json),
            sync_logs::triggered_by.eq(entry.triggered_by.to_label()),
            sync_logs::started_at.eq(format_timestamp(entry.started_at)?),
        ))
        .execute(conn)?;

    let sync_log_id: i64 = conn.last_insert_id()?;
    debug!(
        sync_log_id,
        configuration_id = entry.configuration_id,
        sync_type = entry.sync_type.as_str(),
        direction = entry.direction.as_str(),
        "Inserted sync log"
    );
    Ok(sync_log_id)
}

/// Writes the terminal state of a finished entry.
///
/// # Errors
///
/// Returns `PersistenceError::SyncLogAlreadyFinished` if the stored entry is
/// already terminal, and an error if `entry` itself is not finished.
pub fn finish_sync_log(
    conn: &mut SqliteConnection,
    sync_log_id: i64,
    entry: &SyncLogEntry,
) -> Result<(), PersistenceError> {
    if !entry.is_finished() {
        return Err(PersistenceError::Other(format!(
            "Sync log {sync_log_id} cannot be stored with non-terminal status '{}'",
            entry.status.as_str()
        )));
    }

    conn.transaction(|tx| {
        let stored: String = get_sync_log_status(tx, sync_log_id)?;
        let stored_status: SyncStatus = SyncStatus::from_str(&stored)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        if stored_status.is_terminal() {
            return Err(PersistenceError::SyncLogAlreadyFinished {
                sync_log_id,
                status: stored,
            });
        }

        diesel::update(sync_logs::table.filter(sync_logs::sync_log_id.eq(sync_log_id)))
            .set((
                sync_logs::status.eq(entry.status.as_str()),
                sync_logs::total_items.eq(count_to_column(entry.counters.total_items, "total_items")?),
                sync_logs::success_items.eq(count_to_column(
                    entry.counters.success_items,
                    "success_items",
                )?),
                sync_logs::error_items.eq(count_to_column(entry.counters.error_items, "error_items")?),
                sync_logs::changes_made.eq(count_to_column(
                    entry.counters.changes_made,
                    "changes_made",
                )?),
                sync_logs::error_message.eq(entry.error_message.as_deref()),
                sync_logs::completed_at.eq(entry.completed_at.map(format_timestamp).transpose()?),
                sync_logs::duration_seconds.eq(entry.duration_seconds),
            ))
            .execute(tx)?;
        Ok(())
    })?;

    info!(
        sync_log_id,
        status = entry.status.as_str(),
        total_items = entry.counters.total_items,
        error_items = entry.counters.error_items,
        "Finished sync log"
    );
    Ok(())
}
