// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability cell queries.
//!
//! Every query except the outbound sync selection ignores soft-deleted
//! cells. The sync selection keeps inactive cells that are still pending
//! so that the removal reaches the provider.

use diesel::SqliteConnection;
use diesel::prelude::*;
use innsync_domain::{Amount, CellValues, SyncCounts};
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::columns::{
    count_from_column, format_date, format_timestamp, is_set, nights_from_column, parse_date,
    parse_optional_timestamp, parse_timestamp,
};
use crate::data_models::AvailabilityCellData;
use crate::diesel_schema::availability_cells;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = availability_cells)]
struct CellRow {
    cell_id: i64,
    tenant_id: i64,
    room_id: i64,
    date: String,
    is_available: i32,
    is_blocked: i32,
    rate_override: Option<i64>,
    min_stay: Option<i32>,
    max_stay: Option<i32>,
    closed_to_arrival: i32,
    closed_to_departure: i32,
    reason: Option<String>,
    is_active: i32,
    sync_pending: i32,
    synced: i32,
    last_sync_at: Option<String>,
    sync_error: Option<String>,
    updated_at: String,
}

impl TryFrom<CellRow> for AvailabilityCellData {
    type Error = PersistenceError;

    fn try_from(row: CellRow) -> Result<Self, Self::Error> {
        Ok(Self {
            cell_id: row.cell_id,
            tenant_id: row.tenant_id,
            room_id: row.room_id,
            date: parse_date(&row.date)?,
            values: CellValues {
                is_available: is_set(row.is_available),
                is_blocked: is_set(row.is_blocked),
                rate_override: row.rate_override.map(Amount::from_hundredths),
                min_stay: nights_from_column(row.min_stay)?,
                max_stay: nights_from_column(row.max_stay)?,
                closed_to_arrival: is_set(row.closed_to_arrival),
                closed_to_departure: is_set(row.closed_to_departure),
            },
            reason: row.reason,
            is_active: is_set(row.is_active),
            sync_pending: is_set(row.sync_pending),
            synced: is_set(row.synced),
            last_sync_at: parse_optional_timestamp(row.last_sync_at.as_deref())?,
            sync_error: row.sync_error,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn convert_rows(rows: Vec<CellRow>) -> Result<Vec<AvailabilityCellData>, PersistenceError> {
    rows.into_iter().map(AvailabilityCellData::try_from).collect()
}

/// Retrieves an active cell.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the cell does not exist or is soft-deleted.
pub fn get_cell(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    date: Date,
) -> Result<Option<AvailabilityCellData>, PersistenceError> {
    Ok(find_cell_any(conn, tenant_id, room_id, date)?.filter(|cell| cell.is_active))
}

/// Retrieves a cell whether or not it is soft-deleted.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_cell_any(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    date: Date,
) -> Result<Option<AvailabilityCellData>, PersistenceError> {
    debug!(tenant_id, room_id, %date, "Looking up availability cell");

    availability_cells::table
        .filter(availability_cells::tenant_id.eq(tenant_id))
        .filter(availability_cells::room_id.eq(room_id))
        .filter(availability_cells::date.eq(format_date(date)?))
        .select(CellRow::as_select())
        .first(conn)
        .optional()?
        .map(AvailabilityCellData::try_from)
        .transpose()
}

/// Lists the active cells of the rooms over `[date_from, date_to]`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_cells(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_ids: &[i64],
    date_from: Date,
    date_to: Date,
) -> Result<Vec<AvailabilityCellData>, PersistenceError> {
    debug!(
        tenant_id,
        room_count = room_ids.len(),
        %date_from,
        %date_to,
        "Listing availability cells"
    );

    let rows: Vec<CellRow> = availability_cells::table
        .filter(availability_cells::tenant_id.eq(tenant_id))
        .filter(availability_cells::room_id.eq_any(room_ids))
        .filter(availability_cells::date.ge(format_date(date_from)?))
        .filter(availability_cells::date.le(format_date(date_to)?))
        .filter(availability_cells::is_active.eq(1))
        .order((availability_cells::room_id.asc(), availability_cells::date.asc()))
        .select(CellRow::as_select())
        .load(conn)?;

    convert_rows(rows)
}

/// Selects the cells an outbound sync pushes, ordered by date then room.
///
/// With `pending_only` only cells awaiting push are returned; otherwise every
/// active cell is. Soft-deleted cells are returned only while pending.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn select_cells_for_sync(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_ids: &[i64],
    date_from: Date,
    date_to: Date,
    pending_only: bool,
    limit: Option<i64>,
) -> Result<Vec<AvailabilityCellData>, PersistenceError> {
    debug!(
        tenant_id,
        room_count = room_ids.len(),
        %date_from,
        %date_to,
        pending_only,
        ?limit,
        "Selecting cells for outbound sync"
    );

    let mut query = availability_cells::table
        .filter(availability_cells::tenant_id.eq(tenant_id))
        .filter(availability_cells::room_id.eq_any(room_ids))
        .filter(availability_cells::date.ge(format_date(date_from)?))
        .filter(availability_cells::date.le(format_date(date_to)?))
        .order((availability_cells::date.asc(), availability_cells::room_id.asc()))
        .select(CellRow::as_select())
        .into_boxed();

    query = if pending_only {
        query.filter(availability_cells::sync_pending.eq(1))
    } else {
        query.filter(
            availability_cells::is_active
                .eq(1)
                .or(availability_cells::sync_pending.eq(1)),
        )
    };

    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    convert_rows(query.load(conn)?)
}

/// Counts pending cells of the rooms over `[date_from, date_to]`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_pending_cells(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_ids: &[i64],
    date_from: Date,
    date_to: Date,
) -> Result<u64, PersistenceError> {
    let count: i64 = availability_cells::table
        .filter(availability_cells::tenant_id.eq(tenant_id))
        .filter(availability_cells::room_id.eq_any(room_ids))
        .filter(availability_cells::date.ge(format_date(date_from)?))
        .filter(availability_cells::date.le(format_date(date_to)?))
        .filter(availability_cells::sync_pending.eq(1))
        .count()
        .get_result(conn)?;

    count_from_column(count, "pending count")
}

/// Lists cells of every tenant carrying a sync error recorded since `since`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_recent_sync_errors(
    conn: &mut SqliteConnection,
    since: OffsetDateTime,
) -> Result<Vec<AvailabilityCellData>, PersistenceError> {
    debug!(%since, "Listing cells with recent sync errors");

    let rows: Vec<CellRow> = availability_cells::table
        .filter(availability_cells::sync_error.is_not_null())
        .filter(availability_cells::updated_at.ge(format_timestamp(since)?))
        .order((
            availability_cells::tenant_id.asc(),
            availability_cells::room_id.asc(),
            availability_cells::date.asc(),
        ))
        .select(CellRow::as_select())
        .load(conn)?;

    convert_rows(rows)
}

/// Counts active cells of the tenant over `[date_from, date_to]` by sync state.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_cells_by_sync_state(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    date_from: Date,
    date_to: Date,
) -> Result<SyncCounts, PersistenceError> {
    let from: String = format_date(date_from)?;
    let to: String = format_date(date_to)?;

    let base = || {
        availability_cells::table
            .filter(availability_cells::tenant_id.eq(tenant_id))
            .filter(availability_cells::date.ge(from.clone()))
            .filter(availability_cells::date.le(to.clone()))
            .filter(availability_cells::is_active.eq(1))
    };

    let total: i64 = base().count().get_result(conn)?;
    let synced: i64 = base()
        .filter(availability_cells::synced.eq(1))
        .count()
        .get_result(conn)?;
    let errored: i64 = base()
        .filter(availability_cells::sync_error.is_not_null())
        .count()
        .get_result(conn)?;
    let pending: i64 = base()
        .filter(availability_cells::sync_pending.eq(1))
        .count()
        .get_result(conn)?;

    debug!(tenant_id, total, synced, errored, pending, "Counted cells by sync state");

    Ok(SyncCounts {
        total: count_from_column(total, "total")?,
        synced: count_from_column(synced, "synced")?,
        errored: count_from_column(errored, "errored")?,
        pending: count_from_column(pending, "pending")?,
    })
}
