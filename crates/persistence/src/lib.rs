// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for InnSync.
//!
//! This crate stores the catalog (properties, room types, rooms), the
//! availability calendar with its per-cell sync state, reservations,
//! restrictions, channel configurations, room mappings, and sync logs. It is
//! built on Diesel over `SQLite` with embedded migrations.
//!
//! ## Tenant Isolation
//!
//! Every row carries a `tenant_id` and every query filters by it. The only
//! exceptions are the scheduler-facing reads (`list_syncable_configurations`,
//! `list_recent_sync_errors`) which span tenants and return the tenant with
//! each row.
//!
//! ## Availability Cells
//!
//! A cell is one room's state on one date, unique per `(tenant, room, date)`.
//! Cells are never hard-deleted; a removed cell is inactive and pending so the
//! outbound sync can propagate the removal.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives every caller an isolated shared-cache
//! in-memory database with migrations applied.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use innsync::{CalendarState, CellWrite};
use innsync_audit::SyncLogEntry;
use innsync_domain::{
    CellValues, InclusiveDateRange, ReservationStatus, Restriction, SyncCounts,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, OffsetDateTime};

mod backend;
mod columns;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    AvailabilityCellData, CellPatch, ChannelConfigurationData, NewChannelConfiguration,
    NewReservation, NewRoomMapping, PropertyData, ReservationData, RoomData, RoomMappingData,
    RoomTypeData, UpsertCounts,
};
pub use error::PersistenceError;

use backend::PersistenceBackend;
use backend::sqlite::StorageMode;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection =
            backend::sqlite::open(&shared_memory_url, StorageMode::Memory)?;
        conn.ensure_foreign_keys()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::open(path_str, StorageMode::File)?;
        conn.ensure_foreign_keys()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.ensure_foreign_keys()
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Creates a property.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_property(
        &mut self,
        tenant_id: i64,
        name: &str,
        parking_spots_total: u32,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_property(&mut self.conn, tenant_id, name, parking_spots_total)
    }

    /// Sets the active flag of a property.
    ///
    /// # Errors
    ///
    /// Returns an error if the property does not exist.
    pub fn set_property_active(
        &mut self,
        tenant_id: i64,
        property_id: i64,
        is_active: bool,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::set_property_active(&mut self.conn, tenant_id, property_id, is_active)
    }

    /// Creates a room type.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_room_type(
        &mut self,
        tenant_id: i64,
        property_id: i64,
        name: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_room_type(&mut self.conn, tenant_id, property_id, name)
    }

    /// Creates a room.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or the room number is taken.
    pub fn create_room(
        &mut self,
        tenant_id: i64,
        property_id: i64,
        room_type_id: i64,
        room_number: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_room(
            &mut self.conn,
            tenant_id,
            property_id,
            room_type_id,
            room_number,
        )
    }

    /// Sets the active flag of a room.
    ///
    /// # Errors
    ///
    /// Returns an error if the room does not exist.
    pub fn set_room_active(
        &mut self,
        tenant_id: i64,
        room_id: i64,
        is_active: bool,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::set_room_active(&mut self.conn, tenant_id, room_id, is_active)
    }

    /// Retrieves a property.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_property(
        &mut self,
        tenant_id: i64,
        property_id: i64,
    ) -> Result<Option<PropertyData>, PersistenceError> {
        queries::catalog::get_property(&mut self.conn, tenant_id, property_id)
    }

    /// Retrieves a room type.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_room_type(
        &mut self,
        tenant_id: i64,
        room_type_id: i64,
    ) -> Result<Option<RoomTypeData>, PersistenceError> {
        queries::catalog::get_room_type(&mut self.conn, tenant_id, room_type_id)
    }

    /// Retrieves a room.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_room(
        &mut self,
        tenant_id: i64,
        room_id: i64,
    ) -> Result<Option<RoomData>, PersistenceError> {
        queries::catalog::get_room(&mut self.conn, tenant_id, room_id)
    }

    /// Lists the active rooms of a property ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_active_rooms(
        &mut self,
        tenant_id: i64,
        property_id: i64,
    ) -> Result<Vec<RoomData>, PersistenceError> {
        queries::catalog::list_active_rooms(&mut self.conn, tenant_id, property_id)
    }

    // ========================================================================
    // Reservations & Restrictions
    // ========================================================================

    /// Creates a reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_reservation(
        &mut self,
        tenant_id: i64,
        reservation: &NewReservation,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_reservation(&mut self.conn, tenant_id, reservation)
    }

    /// Writes a reservation status.
    ///
    /// # Errors
    ///
    /// Returns an error if the reservation does not exist.
    pub fn set_reservation_status(
        &mut self,
        tenant_id: i64,
        reservation_id: i64,
        status: ReservationStatus,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::set_reservation_status(
            &mut self.conn,
            tenant_id,
            reservation_id,
            status,
        )
    }

    /// Lists reservations that may occupy any of `room_ids` within `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_room_reservations(
        &mut self,
        tenant_id: i64,
        room_ids: &[i64],
        start: Date,
        end: Date,
    ) -> Result<Vec<ReservationData>, PersistenceError> {
        queries::reservations::list_room_reservations(&mut self.conn, tenant_id, room_ids, start, end)
    }

    /// Lists parking-requesting reservations that may occupy the property's
    /// pool within `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_parking_reservations(
        &mut self,
        tenant_id: i64,
        property_id: i64,
        start: Date,
        end: Date,
    ) -> Result<Vec<ReservationData>, PersistenceError> {
        queries::reservations::list_parking_reservations(
            &mut self.conn,
            tenant_id,
            property_id,
            start,
            end,
        )
    }

    /// Creates a restriction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_restriction(
        &mut self,
        tenant_id: i64,
        restriction: &Restriction,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_restriction(&mut self.conn, tenant_id, restriction)
    }

    /// Lists active restrictions of a property touching `[date_from, date_to]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_active_restrictions(
        &mut self,
        tenant_id: i64,
        property_id: i64,
        date_from: Date,
        date_to: Date,
    ) -> Result<Vec<Restriction>, PersistenceError> {
        queries::reservations::list_active_restrictions(
            &mut self.conn,
            tenant_id,
            property_id,
            date_from,
            date_to,
        )
    }

    // ========================================================================
    // Availability Cells
    // ========================================================================

    /// Retrieves an active cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_cell(
        &mut self,
        tenant_id: i64,
        room_id: i64,
        date: Date,
    ) -> Result<Option<AvailabilityCellData>, PersistenceError> {
        queries::cells::get_cell(&mut self.conn, tenant_id, room_id, date)
    }

    /// Creates a cell with default values.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateCell` if the cell exists.
    pub fn create_cell(
        &mut self,
        tenant_id: i64,
        room_id: i64,
        date: Date,
        now: OffsetDateTime,
    ) -> Result<AvailabilityCellData, PersistenceError> {
        mutations::cells::create_cell(&mut self.conn, tenant_id, room_id, date, now)
    }

    /// Returns the cell, creating it with defaults if absent. The flag is true
    /// when this call created it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn get_or_create_cell(
        &mut self,
        tenant_id: i64,
        room_id: i64,
        date: Date,
        now: OffsetDateTime,
    ) -> Result<(AvailabilityCellData, bool), PersistenceError> {
        mutations::cells::get_or_create_cell(&mut self.conn, tenant_id, room_id, date, now)
    }

    /// Applies a patch to a cell, creating it if absent, and marks it pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn update_cell(
        &mut self,
        tenant_id: i64,
        room_id: i64,
        date: Date,
        patch: &CellPatch,
        now: OffsetDateTime,
    ) -> Result<AvailabilityCellData, PersistenceError> {
        mutations::cells::update_cell(&mut self.conn, tenant_id, room_id, date, patch, now)
    }

    /// Applies a patch to every `(room, date)` in the range in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is persisted in that case.
    pub fn bulk_upsert(
        &mut self,
        tenant_id: i64,
        room_ids: &[i64],
        range: &InclusiveDateRange,
        patch: &CellPatch,
        now: OffsetDateTime,
    ) -> Result<UpsertCounts, PersistenceError> {
        mutations::cells::bulk_upsert(&mut self.conn, tenant_id, room_ids, range, patch, now)
    }

    /// Persists planned bulk-edit writes in one transaction and returns
    /// `(created, updated)`.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is persisted in that case.
    pub fn commit_cell_writes(
        &mut self,
        tenant_id: i64,
        writes: &[CellWrite],
        reason: Option<&str>,
        mark_pending: bool,
        now: OffsetDateTime,
    ) -> Result<(usize, usize), PersistenceError> {
        mutations::cells::commit_cell_writes(
            &mut self.conn,
            tenant_id,
            writes,
            reason,
            mark_pending,
            now,
        )
    }

    /// Stores values received from the channel manager as synced cells.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is persisted in that case.
    pub fn apply_inbound_cells(
        &mut self,
        tenant_id: i64,
        cells: &[(i64, Date, CellValues)],
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::cells::apply_inbound_cells(&mut self.conn, tenant_id, cells, now)
    }

    /// Soft-deletes a cell and marks it pending. Returns false if there was no
    /// active cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn deactivate_cell(
        &mut self,
        tenant_id: i64,
        room_id: i64,
        date: Date,
        now: OffsetDateTime,
    ) -> Result<bool, PersistenceError> {
        mutations::cells::deactivate_cell(&mut self.conn, tenant_id, room_id, date, now)
    }

    /// Lists active cells of `room_ids` within `[date_from, date_to]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_cells(
        &mut self,
        tenant_id: i64,
        room_ids: &[i64],
        date_from: Date,
        date_to: Date,
    ) -> Result<Vec<AvailabilityCellData>, PersistenceError> {
        queries::cells::list_cells(&mut self.conn, tenant_id, room_ids, date_from, date_to)
    }

    /// Loads the active cells of `room_ids` over `range` as a calendar snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load_calendar_state(
        &mut self,
        tenant_id: i64,
        room_ids: &[i64],
        range: &InclusiveDateRange,
    ) -> Result<CalendarState, PersistenceError> {
        let cells: Vec<AvailabilityCellData> =
            self.list_cells(tenant_id, room_ids, range.start(), range.end())?;
        Ok(cells
            .into_iter()
            .map(|cell| (cell.room_id, cell.date, cell.values))
            .collect())
    }

    // ========================================================================
    // Cell Sync State
    // ========================================================================

    /// Selects cells for an outbound push, ordered by date then room.
    ///
    /// Inactive cells are included while pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn select_cells_for_sync(
        &mut self,
        tenant_id: i64,
        room_ids: &[i64],
        date_from: Date,
        date_to: Date,
        pending_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<AvailabilityCellData>, PersistenceError> {
        queries::cells::select_cells_for_sync(
            &mut self.conn,
            tenant_id,
            room_ids,
            date_from,
            date_to,
            pending_only,
            limit,
        )
    }

    /// Counts pending cells of `room_ids` within `[date_from, date_to]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_pending_cells(
        &mut self,
        tenant_id: i64,
        room_ids: &[i64],
        date_from: Date,
        date_to: Date,
    ) -> Result<u64, PersistenceError> {
        queries::cells::count_pending_cells(&mut self.conn, tenant_id, room_ids, date_from, date_to)
    }

    /// Lists cells of every tenant with a sync error updated since `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_recent_sync_errors(
        &mut self,
        since: OffsetDateTime,
    ) -> Result<Vec<AvailabilityCellData>, PersistenceError> {
        queries::cells::list_recent_sync_errors(&mut self.conn, since)
    }

    /// Counts a tenant's active cells by sync state.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_cells_by_sync_state(
        &mut self,
        tenant_id: i64,
        date_from: Date,
        date_to: Date,
    ) -> Result<SyncCounts, PersistenceError> {
        queries::cells::count_cells_by_sync_state(&mut self.conn, tenant_id, date_from, date_to)
    }

    /// Marks a tenant's cells pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_pending(
        &mut self,
        tenant_id: i64,
        cell_ids: &[i64],
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::cells::mark_pending(&mut self.conn, tenant_id, cell_ids, now)
    }

    /// Marks a tenant's cells synced.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_synced(
        &mut self,
        tenant_id: i64,
        cell_ids: &[i64],
        synced_at: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::cells::mark_synced(&mut self.conn, tenant_id, cell_ids, synced_at)
    }

    /// Records a sync error on a tenant's cells and keeps them pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_sync_error(
        &mut self,
        tenant_id: i64,
        cell_ids: &[i64],
        message: &str,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::cells::mark_sync_error(&mut self.conn, tenant_id, cell_ids, message, now)
    }

    /// Clears sync errors on a tenant's cells and re-marks them pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn reset_sync_errors(
        &mut self,
        tenant_id: i64,
        cell_ids: &[i64],
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::cells::reset_sync_errors(&mut self.conn, tenant_id, cell_ids, now)
    }

    // ========================================================================
    // Channel Configurations & Mappings
    // ========================================================================

    /// Creates a channel configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_channel_configuration(
        &mut self,
        tenant_id: i64,
        configuration: &NewChannelConfiguration,
    ) -> Result<i64, PersistenceError> {
        mutations::channels::create_configuration(&mut self.conn, tenant_id, configuration)
    }

    /// Retrieves a channel configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_channel_configuration(
        &mut self,
        tenant_id: i64,
        configuration_id: i64,
    ) -> Result<Option<ChannelConfigurationData>, PersistenceError> {
        queries::channels::get_configuration(&mut self.conn, tenant_id, configuration_id)
    }

    /// Lists a tenant's active configurations.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_active_configurations(
        &mut self,
        tenant_id: i64,
    ) -> Result<Vec<ChannelConfigurationData>, PersistenceError> {
        queries::channels::list_active_configurations(&mut self.conn, tenant_id)
    }

    /// Lists active connected configurations of every tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_syncable_configurations(
        &mut self,
    ) -> Result<Vec<ChannelConfigurationData>, PersistenceError> {
        queries::channels::list_syncable_configurations(&mut self.conn)
    }

    /// Records the outcome of a connection test.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not exist.
    pub fn set_connection_state(
        &mut self,
        configuration_id: i64,
        is_connected: bool,
        last_error: Option<&str>,
    ) -> Result<(), PersistenceError> {
        mutations::channels::set_connection_state(
            &mut self.conn,
            configuration_id,
            is_connected,
            last_error,
        )
    }

    /// Resets the configuration error counter after a successful sync.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not exist.
    pub fn record_sync_success(
        &mut self,
        configuration_id: i64,
        synced_at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::channels::record_sync_success(&mut self.conn, configuration_id, synced_at)
    }

    /// Increments the configuration error counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not exist.
    pub fn record_sync_failure(
        &mut self,
        configuration_id: i64,
        message: &str,
    ) -> Result<(), PersistenceError> {
        mutations::channels::record_sync_failure(&mut self.conn, configuration_id, message)
    }

    /// Creates a room mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the room or external room is already mapped.
    pub fn create_room_mapping(
        &mut self,
        tenant_id: i64,
        mapping: &NewRoomMapping,
    ) -> Result<i64, PersistenceError> {
        mutations::channels::create_room_mapping(&mut self.conn, tenant_id, mapping)
    }

    /// Lists active availability-syncing mappings of a configuration,
    /// optionally limited to `room_ids`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sync_mappings(
        &mut self,
        tenant_id: i64,
        configuration_id: i64,
        room_ids: Option<&[i64]>,
    ) -> Result<Vec<RoomMappingData>, PersistenceError> {
        queries::channels::list_sync_mappings(&mut self.conn, tenant_id, configuration_id, room_ids)
    }

    /// Lists the active mappings of a room across configurations.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_room_mappings(
        &mut self,
        tenant_id: i64,
        room_id: i64,
    ) -> Result<Vec<RoomMappingData>, PersistenceError> {
        queries::channels::list_room_mappings(&mut self.conn, tenant_id, room_id)
    }

    // ========================================================================
    // Sync Logs
    // ========================================================================

    /// Inserts a sync log entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_sync_log(&mut self, entry: &SyncLogEntry) -> Result<i64, PersistenceError> {
        mutations::sync_logs::insert_sync_log(&mut self.conn, entry)
    }

    /// Stores the terminal state of a sync log entry.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::SyncLogAlreadyFinished` if the stored entry
    /// is already terminal.
    pub fn finish_sync_log(
        &mut self,
        sync_log_id: i64,
        entry: &SyncLogEntry,
    ) -> Result<(), PersistenceError> {
        mutations::sync_logs::finish_sync_log(&mut self.conn, sync_log_id, entry)
    }

    /// Retrieves a sync log entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_sync_log(
        &mut self,
        sync_log_id: i64,
    ) -> Result<Option<SyncLogEntry>, PersistenceError> {
        queries::sync_logs::get_sync_log(&mut self.conn, sync_log_id)
    }

    /// Lists a configuration's sync log entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sync_logs(
        &mut self,
        tenant_id: i64,
        configuration_id: i64,
    ) -> Result<Vec<(i64, SyncLogEntry)>, PersistenceError> {
        queries::sync_logs::list_sync_logs(&mut self.conn, tenant_id, configuration_id)
    }
}
