// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sync log queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use innsync_audit::{
    Actor, SyncCounters, SyncDirection, SyncLogEntry, SyncScope, SyncStatus, SyncType,
};
use std::str::FromStr;
use tracing::debug;

use crate::columns::{count_from_column, parse_date, parse_optional_timestamp, parse_timestamp};
use crate::diesel_schema::sync_logs;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = sync_logs)]
struct SyncLogRow {
    sync_log_id: i64,
    configuration_id: i64,
    tenant_id: i64,
    sync_type: String,
    direction: String,
    status: String,
    date_from: Option<String>,
    date_to: Option<String>,
    room_ids_json: Option<String>,
    total_items: i64,
    success_items: i64,
    error_items: i64,
    changes_made: i64,
    error_message: Option<String>,
    triggered_by: String,
    started_at: String,
    completed_at: Option<String>,
    duration_seconds: Option<f64>,
}

fn reconstruct(row: SyncLogRow) -> Result<(i64, SyncLogEntry), PersistenceError> {
    let invalid = |e: innsync_audit::AuditError| PersistenceError::ReconstructionError(e.to_string());

    let room_ids: Option<Vec<i64>> = row
        .room_ids_json
        .as_deref()
        .map(serde_json::from_str::<Vec<i64>>)
        .transpose()?;

    let entry: SyncLogEntry = SyncLogEntry {
        configuration_id: row.configuration_id,
        tenant_id: row.tenant_id,
        sync_type: SyncType::from_str(&row.sync_type).map_err(invalid)?,
        direction: SyncDirection::from_str(&row.direction).map_err(invalid)?,
        status: SyncStatus::from_str(&row.status).map_err(invalid)?,
        scope: SyncScope {
            date_from: row.date_from.as_deref().map(parse_date).transpose()?,
            date_to: row.date_to.as_deref().map(parse_date).transpose()?,
            room_ids,
        },
        counters: SyncCounters {
            total_items: count_from_column(row.total_items, "total_items")?,
            success_items: count_from_column(row.success_items, "success_items")?,
            error_items: count_from_column(row.error_items, "error_items")?,
            changes_made: count_from_column(row.changes_made, "changes_made")?,
        },
        error_message: row.error_message,
        triggered_by: Actor::from_label(&row.triggered_by),
        started_at: parse_timestamp(&row.started_at)?,
        completed_at: parse_optional_timestamp(row.completed_at.as_deref())?,
        duration_seconds: row.duration_seconds,
    };

    Ok((row.sync_log_id, entry))
}

/// Retrieves a sync log entry by id.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored value is invalid.
pub fn get_sync_log(
    conn: &mut SqliteConnection,
    sync_log_id: i64,
) -> Result<Option<SyncLogEntry>, PersistenceError> {
    debug!(sync_log_id, "Looking up sync log");

    let row: Option<SyncLogRow> = sync_logs::table
        .filter(sync_logs::sync_log_id.eq(sync_log_id))
        .select(SyncLogRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(reconstruct).transpose()?.map(|(_, entry)| entry))
}

/// Lists the sync log entries of a configuration, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored value is invalid.
pub fn list_sync_logs(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    configuration_id: i64,
) -> Result<Vec<(i64, SyncLogEntry)>, PersistenceError> {
    debug!(tenant_id, configuration_id, "Listing sync logs");

    let rows: Vec<SyncLogRow> = sync_logs::table
        .filter(sync_logs::tenant_id.eq(tenant_id))
        .filter(sync_logs::configuration_id.eq(configuration_id))
        .order(sync_logs::sync_log_id.desc())
        .select(SyncLogRow::as_select())
        .load(conn)?;

    rows.into_iter().map(reconstruct).collect()
}

/// Returns the stored status of a sync log entry.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the entry does not exist.
pub fn get_sync_log_status(
    conn: &mut SqliteConnection,
    sync_log_id: i64,
) -> Result<String, PersistenceError> {
    sync_logs::table
        .filter(sync_logs::sync_log_id.eq(sync_log_id))
        .select(sync_logs::status)
        .first::<String>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Sync log {sync_log_id}")))
}
