// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::bulk_edit::{BulkEditOperation, BulkEditRequest, BulkEditScope, EditOp, OperationValue};
use serde::Serialize;
use std::collections::HashSet;

/// Longest permitted bulk-edit range, counting both endpoints.
pub const MAX_BULK_EDIT_DAYS: i64 = 366;
/// Smallest stay length a bulk edit may set.
pub const MIN_STAY_LIMIT: i64 = 1;
/// Largest stay length a bulk edit may set.
pub const MAX_STAY_LIMIT: i64 = 30;

/// One structural or per-operation problem with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The offending field, e.g. `operations[2].value`.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validates the shape and values of a bulk-edit request.
///
/// Referential checks (property, room type) need storage and are done by the
/// caller. Every problem is collected; an empty list means the request is
/// structurally valid.
#[must_use]
pub fn validate_bulk_edit_request(request: &BulkEditRequest) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = Vec::new();
    validate_scope(request, &mut errors);
    validate_dates(request, &mut errors);
    validate_days_of_week(request, &mut errors);

    if request.operations.is_empty() {
        errors.push(ValidationError::new(
            "operations",
            "At least one operation is required",
        ));
    }
    for (index, operation) in request.operations.iter().enumerate() {
        validate_operation(index, operation, &mut errors);
    }
    errors
}

fn validate_scope(request: &BulkEditRequest, errors: &mut Vec<ValidationError>) {
    match request.scope {
        BulkEditScope::Property => {}
        BulkEditScope::RoomType => {
            if request.room_type_id.is_none() {
                errors.push(ValidationError::new(
                    "room_type_id",
                    "room_type_id is required for the room_type scope",
                ));
            }
        }
        BulkEditScope::SpecificRooms => {
            if request.room_ids.as_ref().is_none_or(Vec::is_empty) {
                errors.push(ValidationError::new(
                    "room_ids",
                    "room_ids must not be empty for the specific_rooms scope",
                ));
            }
        }
    }

    if let Some(room_ids) = &request.room_ids {
        let mut seen: HashSet<i64> = HashSet::new();
        if !room_ids.iter().all(|id| seen.insert(*id)) {
            errors.push(ValidationError::new("room_ids", "room_ids must be unique"));
        }
    }
}

fn validate_dates(request: &BulkEditRequest, errors: &mut Vec<ValidationError>) {
    if request.date_to <= request.date_from {
        errors.push(ValidationError::new(
            "date_to",
            format!(
                "date_to ({}) must be after date_from ({})",
                request.date_to, request.date_from
            ),
        ));
        return;
    }
    let span: i64 = (request.date_to - request.date_from).whole_days() + 1;
    if span > MAX_BULK_EDIT_DAYS {
        errors.push(ValidationError::new(
            "date_to",
            format!("Date range spans {span} days; the maximum is {MAX_BULK_EDIT_DAYS}"),
        ));
    }
}

fn validate_days_of_week(request: &BulkEditRequest, errors: &mut Vec<ValidationError>) {
    let Some(days) = &request.days_of_week else {
        return;
    };
    if days.iter().any(|day| *day > 6) {
        errors.push(ValidationError::new(
            "days_of_week",
            "days_of_week values must be between 0 (Monday) and 6 (Sunday)",
        ));
    }
    let unique: HashSet<u8> = days.iter().copied().collect();
    if unique.len() != days.len() {
        errors.push(ValidationError::new(
            "days_of_week",
            "days_of_week must be unique",
        ));
    }
}

fn validate_operation(
    index: usize,
    operation: &BulkEditOperation,
    errors: &mut Vec<ValidationError>,
) {
    let field: String = format!("operations[{index}]");
    let target: &str = operation.target.as_str();
    let op: &str = operation.op.as_str();

    if !operation.op.requires_value() {
        if operation.op == EditOp::Toggle && !operation.target.is_boolean() {
            errors.push(ValidationError::new(
                format!("{field}.operation"),
                format!("toggle is only valid for boolean targets, not '{target}'"),
            ));
        }
        return;
    }

    let Some(value) = operation.value else {
        errors.push(ValidationError::new(
            format!("{field}.value"),
            format!("'{op}' on '{target}' requires a value"),
        ));
        return;
    };

    if operation.target.is_boolean() {
        if operation.op.is_arithmetic() {
            errors.push(ValidationError::new(
                format!("{field}.operation"),
                format!("'{op}' cannot be applied to boolean target '{target}'"),
            ));
        } else if !matches!(value, OperationValue::Bool(_)) {
            errors.push(ValidationError::new(
                format!("{field}.value"),
                format!("'{target}' requires a boolean value"),
            ));
        }
        return;
    }

    let OperationValue::Number(amount) = value else {
        errors.push(ValidationError::new(
            format!("{field}.value"),
            format!("'{target}' requires a numeric value"),
        ));
        return;
    };

    if amount.is_negative() {
        errors.push(ValidationError::new(
            format!("{field}.value"),
            "Value must not be negative",
        ));
        return;
    }

    if !operation.target.is_stay_length() {
        return;
    }
    let nights: i64 = amount.truncated_units();
    match operation.op {
        EditOp::Set if !(MIN_STAY_LIMIT..=MAX_STAY_LIMIT).contains(&nights) => {
            errors.push(ValidationError::new(
                format!("{field}.value"),
                format!(
                    "'{target}' must be between {MIN_STAY_LIMIT} and {MAX_STAY_LIMIT} nights, got {amount}"
                ),
            ));
        }
        EditOp::IncreaseAmount | EditOp::DecreaseAmount if nights > MAX_STAY_LIMIT => {
            errors.push(ValidationError::new(
                format!("{field}.value"),
                format!(
                    "'{op}' on '{target}' cannot exceed {MAX_STAY_LIMIT} nights, got {amount}"
                ),
            ));
        }
        _ => {}
    }
}
