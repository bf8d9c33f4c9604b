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

mod bulk_edit;
mod dates;
mod error;
mod money;
mod occupancy;
mod parking;
mod restriction;
mod sync_health;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use bulk_edit::{
    BulkEditOperation, BulkEditRequest, BulkEditScope, CellValue, CellValues, DEFAULT_MAX_STAY,
    DEFAULT_MIN_STAY, EditOp, EditTarget, OperationValue, apply_operation, compute_new_value,
};
pub use dates::{HalfOpenInterval, InclusiveDateRange, shift_date};
pub use occupancy::{
    StayInterval, count_occupied, find_conflicts, has_overlap, occupied_days_in_range,
    occupying_intervals,
};
pub use parking::{
    ALTERNATIVE_SHIFTS, DailyParkingAvailability, MAX_ALTERNATIVES, ParkingAlternative,
    ParkingAvailability, ParkingPolicy, ParkingValidation, compute_parking_availability,
    suggest_parking_alternatives, validate_parking,
};
pub use restriction::{
    Restriction, RestrictionViolation, evaluate_cell_rules, evaluate_stay_restrictions,
};
pub use sync_health::{HealthStatus, SyncCounts, SyncHealth, classify_sync_health};

// Re-export public types
pub use error::DomainError;
pub use money::{Amount, add_amount_to_whole, scale_whole_by_percent};
pub use types::ReservationStatus;
pub use validation::{
    MAX_BULK_EDIT_DAYS, MAX_STAY_LIMIT, MIN_STAY_LIMIT, ValidationError,
    validate_bulk_edit_request,
};
