// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response data transfer objects.
//!
//! These types are distinct from domain types and represent the API
//! contract. Responses serialise to plain JSON: dates as ISO strings and
//! cell values as booleans, numbers or null.

use innsync::{ItemOutcome, PlannedItem};
use innsync_audit::{SyncDirection, SyncStatus, SyncType};
use innsync_domain::{
    CellValue, CellValues, EditOp, EditTarget, ParkingAlternative, ParkingAvailability,
    ParkingPolicy, ParkingValidation, RestrictionViolation, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{Date, OffsetDateTime};

// ============================================================================
// Bulk edit
// ============================================================================

/// The flattened result of one (room, date, operation) item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkEditItemResult {
    /// The room.
    pub room_id: i64,
    /// The day.
    pub date: Date,
    /// The edited attribute.
    pub target: EditTarget,
    /// The operation.
    pub operation: EditOp,
    /// The operation was applied.
    pub success: bool,
    /// The operation was not attempted.
    pub skipped: bool,
    /// Value before the operation.
    pub old_value: Option<CellValue>,
    /// Value after the operation.
    pub new_value: Option<CellValue>,
    /// The cell did not exist and was (or would be) created.
    pub created_record: bool,
    /// Failure or skip reason.
    pub error_message: Option<String>,
}

impl From<&PlannedItem> for BulkEditItemResult {
    fn from(item: &PlannedItem) -> Self {
        let mut result: Self = Self {
            room_id: item.room_id,
            date: item.date,
            target: item.target,
            operation: item.operation,
            success: false,
            skipped: false,
            old_value: None,
            new_value: None,
            created_record: false,
            error_message: None,
        };
        match &item.outcome {
            ItemOutcome::Applied {
                old_value,
                new_value,
                created_record,
            } => {
                result.success = true;
                result.old_value = Some(*old_value);
                result.new_value = Some(*new_value);
                result.created_record = *created_record;
            }
            ItemOutcome::Skipped { reason } => {
                result.skipped = true;
                result.error_message = Some(reason.clone());
            }
            ItemOutcome::Failed { error_message } => {
                result.error_message = Some(error_message.clone());
            }
        }
        result
    }
}

/// Per-target aggregation of item outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    /// Items targeting this attribute.
    pub total: usize,
    /// Applied items.
    pub successful: usize,
    /// Failed items.
    pub failed: usize,
    /// Skipped items.
    pub skipped: usize,
    /// Applied items on cells that did not exist.
    pub created: usize,
    /// Applied items on existing cells.
    pub updated: usize,
}

/// Outcome of the sync triggered after a bulk edit commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncTriggerResult {
    /// `success`, `partial_success` or `error`.
    pub status: SyncStatus,
    /// Cells pushed.
    pub total_items: u64,
    /// Cells accepted by the provider.
    pub success_items: u64,
    /// Cells that failed.
    pub error_items: u64,
    /// Up to three error messages.
    pub sample_errors: Vec<String>,
}

/// The result of a bulk edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkEditResult {
    /// Nothing was persisted.
    pub dry_run: bool,
    /// Rooms × dates × operations.
    pub total_operations_targeted: usize,
    /// Items that were attempted (applied or failed).
    pub total_operations_executed: usize,
    /// Applied items.
    pub successful_operations: usize,
    /// Failed items.
    pub failed_operations: usize,
    /// Skipped items.
    pub skipped_operations: usize,
    /// Cells created (or that would be created).
    pub records_created: usize,
    /// Existing cells updated (or that would be updated).
    pub records_updated: usize,
    /// One entry per item.
    pub detailed_results: Vec<BulkEditItemResult>,
    /// Aggregation by edited attribute.
    pub results_by_target: BTreeMap<EditTarget, TargetSummary>,
    /// Problems that stopped the request before execution.
    pub validation_errors: Vec<ValidationError>,
    /// Problems raised while persisting.
    pub processing_errors: Vec<String>,
    /// A post-commit sync ran.
    pub sync_triggered: bool,
    /// Its outcome.
    pub sync_result: Option<SyncTriggerResult>,
    /// Start time.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Completion time.
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
    /// Elapsed milliseconds.
    pub duration_ms: u64,
}

impl BulkEditResult {
    /// Creates an empty result for a request.
    #[must_use]
    pub fn empty(dry_run: bool, started_at: OffsetDateTime) -> Self {
        Self {
            dry_run,
            total_operations_targeted: 0,
            total_operations_executed: 0,
            successful_operations: 0,
            failed_operations: 0,
            skipped_operations: 0,
            records_created: 0,
            records_updated: 0,
            detailed_results: Vec::new(),
            results_by_target: BTreeMap::new(),
            validation_errors: Vec::new(),
            processing_errors: Vec::new(),
            sync_triggered: false,
            sync_result: None,
            started_at,
            completed_at: started_at,
            duration_ms: 0,
        }
    }

    /// Returns true if the request passed validation and nothing failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.validation_errors.is_empty()
            && self.processing_errors.is_empty()
            && self.failed_operations == 0
    }
}

// ============================================================================
// Availability
// ============================================================================

/// Request for a property calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRequest {
    /// The property.
    pub property_id: i64,
    /// First day shown.
    pub date_from: Date,
    /// Last day shown (included).
    pub date_to: Date,
    /// Limits the calendar to these rooms.
    #[serde(default)]
    pub room_ids: Option<Vec<i64>>,
}

/// One room on one day of the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    /// The day.
    pub date: Date,
    /// Effective values (stored, or defaults when nothing is stored).
    #[serde(flatten)]
    pub values: CellValues,
    /// A cell is stored for this day.
    pub has_record: bool,
    /// Reservation number occupying the room on this night.
    pub reservation_number: Option<String>,
    /// Open, unblocked and unoccupied.
    pub sellable: bool,
    /// Cell changes not yet pushed to the channel manager.
    pub sync_pending: bool,
}

/// One room of the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomCalendar {
    /// The room.
    pub room_id: i64,
    /// Its number.
    pub room_number: String,
    /// Its room type.
    pub room_type_id: i64,
    /// One entry per day.
    pub days: Vec<CalendarDay>,
}

/// A property calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityCalendar {
    /// The property.
    pub property_id: i64,
    /// First day shown.
    pub date_from: Date,
    /// Last day shown.
    pub date_to: Date,
    /// Rooms in room number order.
    pub rooms: Vec<RoomCalendar>,
}

/// Request to check a stay in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAvailabilityRequest {
    /// The room.
    pub room_id: i64,
    /// Arrival day.
    pub check_in: Date,
    /// Departure day.
    pub check_out: Date,
    /// Reservation being modified; ignored in the occupancy check.
    #[serde(default)]
    pub exclude_reservation_id: Option<i64>,
}

/// Result of a room availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomAvailabilityResponse {
    /// The room.
    pub room_id: i64,
    /// Arrival day.
    pub check_in: Date,
    /// Departure day.
    pub check_out: Date,
    /// Nights requested.
    pub nights: i64,
    /// Nothing blocks the stay.
    pub is_available: bool,
    /// Reservation numbers overlapping the stay.
    pub conflicting_reservations: Vec<String>,
    /// Cell and restriction rules blocking the stay.
    pub violations: Vec<RestrictionViolation>,
    /// Human-readable reasons.
    pub messages: Vec<String>,
}

// ============================================================================
// Parking
// ============================================================================

/// Request for parking availability over a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingAvailabilityRequest {
    /// The property.
    pub property_id: i64,
    /// Arrival day.
    pub check_in: Date,
    /// Departure day.
    pub check_out: Date,
    /// Reservation being modified; ignored in the count.
    #[serde(default)]
    pub exclude_reservation_id: Option<i64>,
    /// Defaults to integral.
    #[serde(default)]
    pub policy: Option<ParkingPolicy>,
}

/// Parking availability with validation and alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkingAvailabilityResponse {
    /// The property.
    pub property_id: i64,
    /// Arrival day.
    pub check_in: Date,
    /// Departure day.
    pub check_out: Date,
    /// The policy applied.
    pub policy: ParkingPolicy,
    /// Per-night counts.
    #[serde(flatten)]
    pub availability: ParkingAvailability,
    /// Verdict under the policy.
    pub validation: ParkingValidation,
    /// Shifted windows that satisfy the policy, when the stay does not.
    pub alternatives: Vec<ParkingAlternative>,
}

// ============================================================================
// Channel sync
// ============================================================================

const fn default_direction() -> SyncDirection {
    SyncDirection::Outbound
}

const fn default_sync_type() -> SyncType {
    SyncType::Manual
}

/// Request for one sync against a channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    /// The channel configuration.
    pub configuration_id: i64,
    /// Direction; outbound unless stated.
    #[serde(default = "default_direction")]
    pub direction: SyncDirection,
    /// First day synced; defaults to today.
    #[serde(default)]
    pub date_from: Option<Date>,
    /// Last day synced; defaults to thirty days after `date_from`.
    #[serde(default)]
    pub date_to: Option<Date>,
    /// Limits the sync to these rooms.
    #[serde(default)]
    pub room_ids: Option<Vec<i64>>,
    /// Push every cell in range, not only pending ones.
    #[serde(default)]
    pub force_all: bool,
    /// Maximum cells pushed in one call.
    #[serde(default)]
    pub limit: Option<usize>,
    /// What initiated the sync, for the log.
    #[serde(skip, default = "default_sync_type")]
    pub sync_type: SyncType,
}

impl SyncRequest {
    /// Creates a manual outbound request over the default window.
    #[must_use]
    pub const fn new(configuration_id: i64) -> Self {
        Self {
            configuration_id,
            direction: SyncDirection::Outbound,
            date_from: None,
            date_to: None,
            room_ids: None,
            force_all: false,
            limit: None,
            sync_type: SyncType::Manual,
        }
    }
}

/// Result of one sync direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// The provider accepted the batch (or there was nothing to do).
    pub success: bool,
    /// The channel configuration.
    pub configuration_id: i64,
    /// Direction.
    pub direction: SyncDirection,
    /// Stored log entry, when one was written.
    pub sync_log_id: Option<i64>,
    /// Cells or rows handled.
    pub total_items: u64,
    /// Items that succeeded.
    pub success_items: u64,
    /// Items that failed.
    pub error_items: u64,
    /// Cells whose stored values changed (inbound) or were pushed (outbound).
    pub changes_made: u64,
    /// Failure or informational message.
    pub message: Option<String>,
}

impl SyncResult {
    pub(crate) const fn empty(configuration_id: i64, direction: SyncDirection) -> Self {
        Self {
            success: true,
            configuration_id,
            direction,
            sync_log_id: None,
            total_items: 0,
            success_items: 0,
            error_items: 0,
            changes_made: 0,
            message: None,
        }
    }

    pub(crate) fn failed(
        configuration_id: i64,
        direction: SyncDirection,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::empty(configuration_id, direction)
        }
    }
}

/// Results of every pass of a sync request.
///
/// Outbound and inbound requests carry one pass; bidirectional requests carry
/// the inbound pass followed by the outbound pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResponse {
    /// Every pass succeeded.
    pub success: bool,
    /// The passes, in execution order.
    pub results: Vec<SyncResult>,
}

impl SyncResponse {
    /// Wraps the passes of one request.
    #[must_use]
    pub fn from_results(results: Vec<SyncResult>) -> Self {
        Self {
            success: results.iter().all(|result| result.success),
            results,
        }
    }
}

/// Outbound batches run against one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationJobResult {
    /// The channel configuration.
    pub configuration_id: i64,
    /// Its tenant.
    pub tenant_id: i64,
    /// No batch failed.
    pub success: bool,
    /// Sync calls made.
    pub batches: usize,
    /// Cells or rows handled.
    pub total_items: u64,
    /// Items that succeeded.
    pub success_items: u64,
    /// Items that failed.
    pub error_items: u64,
    /// Cells changed.
    pub changes_made: u64,
    /// Failure messages, in order.
    pub errors: Vec<String>,
}

impl ConfigurationJobResult {
    /// Creates an empty result for a configuration.
    #[must_use]
    pub const fn new(configuration_id: i64, tenant_id: i64) -> Self {
        Self {
            configuration_id,
            tenant_id,
            success: true,
            batches: 0,
            total_items: 0,
            success_items: 0,
            error_items: 0,
            changes_made: 0,
            errors: Vec::new(),
        }
    }

    /// Adds one sync pass.
    pub fn absorb(&mut self, result: &SyncResult) {
        self.batches += 1;
        self.total_items += result.total_items;
        self.success_items += result.success_items;
        self.error_items += result.error_items;
        self.changes_made += result.changes_made;
        if !result.success {
            self.success = false;
            self.errors.push(
                result
                    .message
                    .clone()
                    .unwrap_or_else(|| String::from("Sync failed without a message")),
            );
        }
    }

    /// Records a failure that prevented a pass from running.
    pub fn record_failure(&mut self, message: String) {
        self.success = false;
        self.errors.push(message);
    }
}

/// Result of a connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTestResult {
    /// The channel configuration.
    pub configuration_id: i64,
    /// The provider answered.
    pub is_connected: bool,
    /// External rooms reported by the provider.
    pub rooms_found: usize,
    /// Failure description.
    pub message: Option<String>,
}

// ============================================================================
// Jobs
// ============================================================================

/// Request to re-sync an explicit set of rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSyncRequest {
    /// The rooms.
    pub room_ids: Vec<i64>,
    /// Direction; outbound unless stated.
    #[serde(default = "default_direction")]
    pub direction: SyncDirection,
    /// First day synced; defaults to today.
    #[serde(default)]
    pub date_from: Option<Date>,
    /// Last day synced; defaults to thirty days after `date_from`.
    #[serde(default)]
    pub date_to: Option<Date>,
}

/// Aggregate counters of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobTotals {
    /// Configurations processed.
    pub configurations: usize,
    /// Configurations with a failure.
    pub failed_configurations: usize,
    /// Cells or rows handled.
    pub total_items: u64,
    /// Items that succeeded.
    pub success_items: u64,
    /// Items that failed.
    pub error_items: u64,
    /// Cells changed.
    pub changes_made: u64,
}

/// The result of one job run.
///
/// Jobs never fail to their caller; failures are reported here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobResult {
    /// Unique run identifier.
    pub job_id: String,
    /// The job.
    pub job_type: SyncType,
    /// Nothing failed.
    pub success: bool,
    /// Failure that stopped the job.
    pub error: Option<String>,
    /// Start time.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Completion time.
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
    /// Per-configuration breakdown.
    pub configurations: Vec<ConfigurationJobResult>,
    /// Aggregate counters.
    pub totals: JobTotals,
}
