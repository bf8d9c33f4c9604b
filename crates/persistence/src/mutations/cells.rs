// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability cell mutations.
//!
//! Cells are keyed by `(tenant_id, room_id, date)` under a unique index.
//! Creation paths that must be idempotent rely on `ON CONFLICT` rather than
//! a prior existence check. Cells are never deleted; removal clears
//! `is_active` and marks the cell pending so the provider learns about it.

use diesel::SqliteConnection;
use diesel::prelude::*;
use innsync::CellWrite;
use innsync_domain::{CellValues, InclusiveDateRange};
use time::{Date, OffsetDateTime};
use tracing::{debug, info};

use crate::columns::{flag, format_date, format_timestamp, nights_to_column};
use crate::data_models::{AvailabilityCellData, CellPatch, UpsertCounts};
use crate::diesel_schema::availability_cells;
use crate::error::PersistenceError;
use crate::queries::cells::{find_cell_any, get_cell};

/// Bound parameters in one `IN (...)` list.
const UPDATE_CHUNK_SIZE: usize = 500;

/// The editable columns of a cell plus its audit stamp.
#[derive(AsChangeset)]
#[diesel(table_name = availability_cells, treat_none_as_null = true)]
struct CellValuesChangeset<'a> {
    is_available: i32,
    is_blocked: i32,
    rate_override: Option<i64>,
    min_stay: Option<i32>,
    max_stay: Option<i32>,
    closed_to_arrival: i32,
    closed_to_departure: i32,
    reason: Option<&'a str>,
    is_active: i32,
    updated_at: &'a str,
}

impl<'a> CellValuesChangeset<'a> {
    fn new(values: &CellValues, reason: Option<&'a str>, updated_at: &'a str) -> Self {
        Self {
            is_available: flag(values.is_available),
            is_blocked: flag(values.is_blocked),
            rate_override: values.rate_override.map(|amount| amount.hundredths()),
            min_stay: nights_to_column(values.min_stay),
            max_stay: nights_to_column(values.max_stay),
            closed_to_arrival: flag(values.closed_to_arrival),
            closed_to_departure: flag(values.closed_to_departure),
            reason,
            is_active: 1,
            updated_at,
        }
    }
}

/// A complete cell row for insertion.
#[derive(Insertable)]
#[diesel(table_name = availability_cells, treat_none_as_default_value = false)]
struct NewCellRow<'a> {
    tenant_id: i64,
    room_id: i64,
    date: &'a str,
    is_available: i32,
    is_blocked: i32,
    rate_override: Option<i64>,
    min_stay: Option<i32>,
    max_stay: Option<i32>,
    closed_to_arrival: i32,
    closed_to_departure: i32,
    reason: Option<&'a str>,
    is_active: i32,
    sync_pending: i32,
    synced: i32,
    last_sync_at: Option<&'a str>,
    sync_error: Option<&'a str>,
    updated_at: &'a str,
}

/// Sync state written alongside the values of a new cell.
#[derive(Clone, Copy)]
struct SyncStamp<'a> {
    pending: bool,
    synced_at: Option<&'a str>,
}

impl SyncStamp<'_> {
    const UNTOUCHED: Self = Self {
        pending: false,
        synced_at: None,
    };

    const PENDING: Self = Self {
        pending: true,
        synced_at: None,
    };
}

impl<'a> NewCellRow<'a> {
    #[allow(clippy::too_many_arguments)]
    fn new(
        tenant_id: i64,
        room_id: i64,
        date: &'a str,
        values: &CellValues,
        reason: Option<&'a str>,
        stamp: SyncStamp<'a>,
        updated_at: &'a str,
    ) -> Self {
        Self {
            tenant_id,
            room_id,
            date,
            is_available: flag(values.is_available),
            is_blocked: flag(values.is_blocked),
            rate_override: values.rate_override.map(|amount| amount.hundredths()),
            min_stay: nights_to_column(values.min_stay),
            max_stay: nights_to_column(values.max_stay),
            closed_to_arrival: flag(values.closed_to_arrival),
            closed_to_departure: flag(values.closed_to_departure),
            reason,
            is_active: 1,
            sync_pending: flag(stamp.pending),
            synced: flag(stamp.synced_at.is_some()),
            last_sync_at: stamp.synced_at,
            sync_error: None,
            updated_at,
        }
    }
}

/// Inserts a cell or, if the key exists (possibly soft-deleted), overwrites
/// its values and reactivates it.
///
/// Pending cells stay pending; with `mark_pending` the cell becomes pending.
#[allow(clippy::too_many_arguments)]
fn upsert_cell(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    date: &str,
    values: &CellValues,
    reason: Option<&str>,
    mark_pending: bool,
    updated_at: &str,
) -> Result<(), PersistenceError> {
    let stamp: SyncStamp<'_> = if mark_pending {
        SyncStamp::PENDING
    } else {
        SyncStamp::UNTOUCHED
    };
    let row: NewCellRow<'_> =
        NewCellRow::new(tenant_id, room_id, date, values, reason, stamp, updated_at);
    let changeset: CellValuesChangeset<'_> = CellValuesChangeset::new(values, reason, updated_at);
    let insert = diesel::insert_into(availability_cells::table)
        .values(&row)
        .on_conflict((
            availability_cells::tenant_id,
            availability_cells::room_id,
            availability_cells::date,
        ))
        .do_update();

    if mark_pending {
        insert
            .set((
                &changeset,
                availability_cells::sync_pending.eq(1),
                availability_cells::synced.eq(0),
            ))
            .execute(conn)?;
    } else {
        insert.set(&changeset).execute(conn)?;
    }
    Ok(())
}

/// Overwrites the values of an existing cell identified by its key.
#[allow(clippy::too_many_arguments)]
fn update_cell_values(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    date: &str,
    values: &CellValues,
    reason: Option<&str>,
    mark_pending: bool,
    updated_at: &str,
) -> Result<usize, PersistenceError> {
    let changeset: CellValuesChangeset<'_> = CellValuesChangeset::new(values, reason, updated_at);
    let target = availability_cells::table
        .filter(availability_cells::tenant_id.eq(tenant_id))
        .filter(availability_cells::room_id.eq(room_id))
        .filter(availability_cells::date.eq(date));

    let affected: usize = if mark_pending {
        diesel::update(target)
            .set((
                &changeset,
                availability_cells::sync_pending.eq(1),
                availability_cells::synced.eq(0),
            ))
            .execute(conn)?
    } else {
        diesel::update(target).set(&changeset).execute(conn)?
    };
    Ok(affected)
}

fn fetch_cell(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    date: Date,
) -> Result<AvailabilityCellData, PersistenceError> {
    get_cell(conn, tenant_id, room_id, date)?.ok_or_else(|| {
        PersistenceError::NotFound(format!("Availability cell for room {room_id} on {date}"))
    })
}

/// Creates a cell with default values.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateCell` if the key already exists,
/// including as a soft-deleted cell.
pub fn create_cell(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    date: Date,
    now: OffsetDateTime,
) -> Result<AvailabilityCellData, PersistenceError> {
    let date_text: String = format_date(date)?;
    let updated_at: String = format_timestamp(now)?;
    info!(tenant_id, room_id, %date, "Creating availability cell");

    let row: NewCellRow<'_> = NewCellRow::new(
        tenant_id,
        room_id,
        &date_text,
        &CellValues::default(),
        None,
        SyncStamp::UNTOUCHED,
        &updated_at,
    );
    diesel::insert_into(availability_cells::table)
        .values(&row)
        .execute(conn)
        .map_err(|err| match PersistenceError::from(err) {
            PersistenceError::UniqueViolation(_) => {
                PersistenceError::DuplicateCell { room_id, date }
            }
            other => other,
        })?;

    fetch_cell(conn, tenant_id, room_id, date)
}

/// Returns the active cell, creating it with defaults if absent.
///
/// The insert ignores an existing key, so concurrent callers converge on the
/// same row. A soft-deleted cell is reactivated with default values.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get_or_create_cell(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    date: Date,
    now: OffsetDateTime,
) -> Result<(AvailabilityCellData, bool), PersistenceError> {
    let date_text: String = format_date(date)?;
    let updated_at: String = format_timestamp(now)?;

    let row: NewCellRow<'_> = NewCellRow::new(
        tenant_id,
        room_id,
        &date_text,
        &CellValues::default(),
        None,
        SyncStamp::UNTOUCHED,
        &updated_at,
    );
    let inserted: usize = diesel::insert_into(availability_cells::table)
        .values(&row)
        .on_conflict((
            availability_cells::tenant_id,
            availability_cells::room_id,
            availability_cells::date,
        ))
        .do_nothing()
        .execute(conn)?;

    if inserted == 0 {
        let existing: Option<AvailabilityCellData> =
            find_cell_any(conn, tenant_id, room_id, date)?;
        if existing.is_some_and(|cell| !cell.is_active) {
            debug!(tenant_id, room_id, %date, "Reactivating soft-deleted cell");
            update_cell_values(
                conn,
                tenant_id,
                room_id,
                &date_text,
                &CellValues::default(),
                None,
                false,
                &updated_at,
            )?;
            return Ok((fetch_cell(conn, tenant_id, room_id, date)?, true));
        }
    } else {
        debug!(tenant_id, room_id, %date, "Created availability cell");
    }

    Ok((fetch_cell(conn, tenant_id, room_id, date)?, inserted > 0))
}

/// Applies a patch to a cell, creating it first if needed, and marks it pending.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn update_cell(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    date: Date,
    patch: &CellPatch,
    now: OffsetDateTime,
) -> Result<AvailabilityCellData, PersistenceError> {
    conn.transaction(|tx| {
        let (cell, _) = get_or_create_cell(tx, tenant_id, room_id, date, now)?;
        let mut values: CellValues = cell.values;
        patch.apply_to(&mut values);
        let reason: Option<&str> = patch.reason.as_deref().or(cell.reason.as_deref());
        let date_text: String = format_date(date)?;
        let updated_at: String = format_timestamp(now)?;

        update_cell_values(
            tx,
            tenant_id,
            room_id,
            &date_text,
            &values,
            reason,
            true,
            &updated_at,
        )?;
        info!(tenant_id, room_id, %date, "Updated availability cell");
        fetch_cell(tx, tenant_id, room_id, date)
    })
}

/// Applies a patch to every room and day of the range in one transaction.
///
/// Missing or soft-deleted cells are created from defaults; every touched
/// cell is marked pending.
///
/// # Errors
///
/// Returns an error if any write fails; nothing is persisted in that case.
pub fn bulk_upsert(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_ids: &[i64],
    range: &InclusiveDateRange,
    patch: &CellPatch,
    now: OffsetDateTime,
) -> Result<UpsertCounts, PersistenceError> {
    let updated_at: String = format_timestamp(now)?;

    let counts: UpsertCounts = conn.transaction(|tx| {
        let mut counts: UpsertCounts = UpsertCounts::default();
        for room_id in room_ids {
            for date in range.days() {
                let date_text: String = format_date(date)?;
                let existing: Option<AvailabilityCellData> =
                    get_cell(tx, tenant_id, *room_id, date)?;
                let mut values: CellValues = existing
                    .as_ref()
                    .map_or_else(CellValues::default, |cell| cell.values);
                patch.apply_to(&mut values);
                let reason: Option<&str> = patch
                    .reason
                    .as_deref()
                    .or_else(|| existing.as_ref().and_then(|cell| cell.reason.as_deref()));

                upsert_cell(
                    tx,
                    tenant_id,
                    *room_id,
                    &date_text,
                    &values,
                    reason,
                    true,
                    &updated_at,
                )?;
                if existing.is_some() {
                    counts.updated += 1;
                } else {
                    counts.created += 1;
                }
            }
        }
        Ok::<UpsertCounts, PersistenceError>(counts)
    })?;

    info!(
        tenant_id,
        created = counts.created,
        updated = counts.updated,
        "Bulk upserted availability cells"
    );
    Ok(counts)
}

/// Persists the cell writes of a bulk edit plan in one transaction.
///
/// Returns `(created, updated)`.
///
/// # Errors
///
/// Returns an error if any write fails; nothing is persisted in that case.
pub fn commit_cell_writes(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    writes: &[CellWrite],
    reason: Option<&str>,
    mark_pending: bool,
    now: OffsetDateTime,
) -> Result<(usize, usize), PersistenceError> {
    let updated_at: String = format_timestamp(now)?;

    let counts: (usize, usize) = conn.transaction(|tx| {
        let mut created: usize = 0;
        let mut updated: usize = 0;
        for write in writes {
            let date_text: String = format_date(write.date)?;
            upsert_cell(
                tx,
                tenant_id,
                write.room_id,
                &date_text,
                &write.values,
                reason,
                mark_pending,
                &updated_at,
            )?;
            if write.is_new {
                created += 1;
            } else {
                updated += 1;
            }
        }
        Ok::<(usize, usize), PersistenceError>((created, updated))
    })?;

    info!(
        tenant_id,
        created = counts.0,
        updated = counts.1,
        mark_pending,
        "Committed bulk edit cell writes"
    );
    Ok(counts)
}

/// Writes provider values into the store and marks the cells synced.
///
/// Returns the number of cells whose stored values changed or were created.
///
/// # Errors
///
/// Returns an error if any write fails; nothing is persisted in that case.
pub fn apply_inbound_cells(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    cells: &[(i64, Date, CellValues)],
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let stamp_text: String = format_timestamp(now)?;

    conn.transaction(|tx| {
        let mut changes: usize = 0;
        for (room_id, date, values) in cells {
            let date_text: String = format_date(*date)?;
            let existing: Option<AvailabilityCellData> =
                find_cell_any(tx, tenant_id, *room_id, *date)?;
            let reason: Option<String> = existing.as_ref().and_then(|cell| cell.reason.clone());
            if !existing
                .as_ref()
                .is_some_and(|cell| cell.is_active && cell.values == *values)
            {
                changes += 1;
            }

            let row: NewCellRow<'_> = NewCellRow::new(
                tenant_id,
                *room_id,
                &date_text,
                values,
                reason.as_deref(),
                SyncStamp {
                    pending: false,
                    synced_at: Some(&stamp_text),
                },
                &stamp_text,
            );
            let changeset: CellValuesChangeset<'_> =
                CellValuesChangeset::new(values, reason.as_deref(), &stamp_text);
            diesel::insert_into(availability_cells::table)
                .values(&row)
                .on_conflict((
                    availability_cells::tenant_id,
                    availability_cells::room_id,
                    availability_cells::date,
                ))
                .do_update()
                .set((
                    &changeset,
                    availability_cells::sync_pending.eq(0),
                    availability_cells::synced.eq(1),
                    availability_cells::last_sync_at.eq(Some(stamp_text.as_str())),
                    availability_cells::sync_error.eq(None::<String>),
                ))
                .execute(tx)?;
        }
        debug!(tenant_id, rows = cells.len(), changes, "Applied inbound cells");
        Ok::<usize, PersistenceError>(changes)
    })
}

/// Soft-deletes a cell and marks it pending.
///
/// Returns false if there was no active cell.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn deactivate_cell(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    date: Date,
    now: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    info!(tenant_id, room_id, %date, "Deactivating availability cell");

    let affected: usize = diesel::update(
        availability_cells::table
            .filter(availability_cells::tenant_id.eq(tenant_id))
            .filter(availability_cells::room_id.eq(room_id))
            .filter(availability_cells::date.eq(format_date(date)?))
            .filter(availability_cells::is_active.eq(1)),
    )
    .set((
        availability_cells::is_active.eq(0),
        availability_cells::sync_pending.eq(1),
        availability_cells::synced.eq(0),
        availability_cells::updated_at.eq(format_timestamp(now)?),
    ))
    .execute(conn)?;

    Ok(affected > 0)
}

/// Marks a tenant's cells as awaiting push. Ids of other tenants are ignored.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn mark_pending(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    cell_ids: &[i64],
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let updated_at: String = format_timestamp(now)?;
    let mut affected: usize = 0;
    for chunk in cell_ids.chunks(UPDATE_CHUNK_SIZE) {
        affected += diesel::update(
            availability_cells::table
                .filter(availability_cells::tenant_id.eq(tenant_id))
                .filter(availability_cells::cell_id.eq_any(chunk)),
        )
        .set((
            availability_cells::sync_pending.eq(1),
            availability_cells::synced.eq(0),
            availability_cells::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;
    }
    debug!(tenant_id, cells = cell_ids.len(), affected, "Marked cells pending");
    Ok(affected)
}

/// Marks cells as pushed at `synced_at`, clearing any previous error.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn mark_synced(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    cell_ids: &[i64],
    synced_at: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let stamp: String = format_timestamp(synced_at)?;
    let mut affected: usize = 0;
    for chunk in cell_ids.chunks(UPDATE_CHUNK_SIZE) {
        affected += diesel::update(
            availability_cells::table
                .filter(availability_cells::tenant_id.eq(tenant_id))
                .filter(availability_cells::cell_id.eq_any(chunk)),
        )
        .set((
            availability_cells::sync_pending.eq(0),
            availability_cells::synced.eq(1),
            availability_cells::last_sync_at.eq(Some(stamp.as_str())),
            availability_cells::sync_error.eq(None::<String>),
        ))
        .execute(conn)?;
    }
    debug!(tenant_id, cells = cell_ids.len(), affected, "Marked cells synced");
    Ok(affected)
}

/// Records a push failure on cells; they stay pending for the next pass.
///
/// Idempotent: repeating the call only refreshes the message and timestamp.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn mark_sync_error(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    cell_ids: &[i64],
    message: &str,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let updated_at: String = format_timestamp(now)?;
    let mut affected: usize = 0;
    for chunk in cell_ids.chunks(UPDATE_CHUNK_SIZE) {
        affected += diesel::update(
            availability_cells::table
                .filter(availability_cells::tenant_id.eq(tenant_id))
                .filter(availability_cells::cell_id.eq_any(chunk)),
        )
        .set((
            availability_cells::sync_pending.eq(1),
            availability_cells::synced.eq(0),
            availability_cells::sync_error.eq(Some(message)),
            availability_cells::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;
    }
    debug!(
        tenant_id,
        cells = cell_ids.len(),
        affected,
        message,
        "Marked cells with sync error"
    );
    Ok(affected)
}

/// Clears the sync error of cells and marks them pending again.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn reset_sync_errors(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    cell_ids: &[i64],
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let updated_at: String = format_timestamp(now)?;
    let mut affected: usize = 0;
    for chunk in cell_ids.chunks(UPDATE_CHUNK_SIZE) {
        affected += diesel::update(
            availability_cells::table
                .filter(availability_cells::tenant_id.eq(tenant_id))
                .filter(availability_cells::cell_id.eq_any(chunk)),
        )
        .set((
            availability_cells::sync_pending.eq(1),
            availability_cells::synced.eq(0),
            availability_cells::sync_error.eq(None::<String>),
            availability_cells::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;
    }
    debug!(tenant_id, cells = cell_ids.len(), affected, "Reset sync errors");
    Ok(affected)
}
