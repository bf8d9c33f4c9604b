// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::bulk_edit::{EditOp, EditTarget};
use time::Date;

/// Errors that can occur during domain validation and computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An inclusive date range ends before it starts.
    InvalidDateRange {
        /// The first day of the range.
        start: Date,
        /// The last day of the range.
        end: Date,
    },
    /// A half-open stay interval is empty or reversed.
    InvalidInterval {
        /// The interval start (check-in).
        start: Date,
        /// The interval end (check-out).
        end: Date,
    },
    /// A date range exceeds the maximum permitted span.
    DateRangeTooLong {
        /// The requested span in days.
        days: i64,
        /// The maximum permitted span in days.
        max: i64,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// An operation requires a value but none was supplied.
    MissingOperationValue {
        /// The edited attribute.
        target: EditTarget,
        /// The operation.
        op: EditOp,
    },
    /// A value has the wrong type for the edited attribute.
    ValueTypeMismatch {
        /// The edited attribute.
        target: EditTarget,
        /// The expected value kind.
        expected: &'static str,
    },
    /// Toggle was applied to a value that is not boolean.
    ToggleRequiresBoolean {
        /// The edited attribute.
        target: EditTarget,
    },
    /// An arithmetic operation was applied to a boolean attribute.
    NumericOperationOnBoolean {
        /// The edited attribute.
        target: EditTarget,
        /// The operation.
        op: EditOp,
    },
    /// An arithmetic edit pushed a stay length past the allowed maximum.
    StayLengthOutOfRange {
        /// The edited attribute.
        target: EditTarget,
        /// The computed number of nights.
        nights: i64,
        /// The largest permitted number of nights.
        max: i64,
    },
    /// Failed to parse a reservation status.
    InvalidReservationStatus(String),
    /// A reservation status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// Failed to parse a parking policy.
    InvalidParkingPolicy(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDateRange { start, end } => {
                write!(f, "Invalid date range: {end} is before {start}")
            }
            Self::InvalidInterval { start, end } => {
                write!(
                    f,
                    "Invalid stay interval: check-out {end} must be after check-in {start}"
                )
            }
            Self::DateRangeTooLong { days, max } => {
                write!(f, "Date range spans {days} days; the maximum is {max}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::MissingOperationValue { target, op } => {
                write!(
                    f,
                    "Operation '{}' on '{}' requires a value",
                    op.as_str(),
                    target.as_str()
                )
            }
            Self::ValueTypeMismatch { target, expected } => {
                write!(f, "Value for '{}' must be {expected}", target.as_str())
            }
            Self::ToggleRequiresBoolean { target } => {
                write!(
                    f,
                    "Toggle is only valid for boolean fields, '{}' is not boolean",
                    target.as_str()
                )
            }
            Self::NumericOperationOnBoolean { target, op } => {
                write!(
                    f,
                    "Operation '{}' cannot be applied to boolean field '{}'",
                    op.as_str(),
                    target.as_str()
                )
            }
            Self::StayLengthOutOfRange {
                target,
                nights,
                max,
            } => {
                write!(
                    f,
                    "'{}' would become {nights} nights; the maximum is {max}",
                    target.as_str()
                )
            }
            Self::InvalidReservationStatus(status) => {
                write!(f, "Invalid reservation status: {status}")
            }
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "Reservation cannot move from '{from}' to '{to}'")
            }
            Self::InvalidParkingPolicy(policy) => {
                write!(
                    f,
                    "Invalid parking policy: '{policy}'. Must be 'integral' or 'flexible'"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
