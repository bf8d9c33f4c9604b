// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod auth;
mod availability;
mod bulk_edit;
mod channel_sync;
mod error;
mod jobs;
mod parking;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate_stub};
pub use availability::{check_room_availability, get_availability_calendar};
pub use bulk_edit::{BULK_EDIT_SYNC_BATCH_SIZE, MAX_SAMPLE_ERRORS, execute_bulk_edit};
pub use channel_sync::{
    DEFAULT_SYNC_WINDOW_DAYS, PendingSyncOptions, drain_configuration, manual_sync,
    process_pending_sync, resolve_window, reverse_translate_row, sync_bidirectional,
    sync_from_external, sync_to_external, test_connection, translate_cell,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use jobs::{
    FULL_DAYS_AHEAD, FULL_DAYS_BACK, HEALTH_DAYS_AHEAD, INCREMENTAL_DAYS_AHEAD,
    INCREMENTAL_DAYS_BACK, JobSequence, SyncJobConfig, run_error_recovery, run_full_sync,
    run_incremental_sync, run_room_sync, sync_health,
};
pub use parking::check_parking_availability;
pub use request_response::{
    AvailabilityCalendar, BulkEditItemResult, BulkEditResult, CalendarDay, CalendarRequest,
    ConfigurationJobResult, ConnectionTestResult, JobResult, JobTotals,
    ParkingAvailabilityRequest, ParkingAvailabilityResponse, RoomAvailabilityRequest,
    RoomAvailabilityResponse, RoomCalendar, RoomSyncRequest, SyncRequest, SyncResponse,
    SyncResult, SyncTriggerResult, TargetSummary,
};
