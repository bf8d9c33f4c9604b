// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API error types and translation from lower layers.

use innsync::CoreError;
use innsync_domain::DomainError;
use innsync_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// contract the HTTP layer maps to status codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request conflicts with stored state.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// Date and value problems are input errors; status and policy problems are
/// rule violations.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidDateRange { start, end } => ApiError::InvalidInput {
            field: String::from("date_to"),
            message: format!("Date range end {end} is before its start {start}"),
        },
        DomainError::InvalidInterval { start, end } => ApiError::InvalidInput {
            field: String::from("check_out"),
            message: format!("Check-out {end} must be after check-in {start}"),
        },
        DomainError::DateRangeTooLong { days, max } => ApiError::InvalidInput {
            field: String::from("date_to"),
            message: format!("Date range spans {days} days; the maximum is {max}"),
        },
        DomainError::DateArithmeticOverflow { operation } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Date out of range while {operation}"),
        },
        err @ (DomainError::MissingOperationValue { .. }
        | DomainError::ValueTypeMismatch { .. }
        | DomainError::ToggleRequiresBoolean { .. }
        | DomainError::NumericOperationOnBoolean { .. }
        | DomainError::StayLengthOutOfRange { .. }) => ApiError::InvalidInput {
            field: String::from("operations"),
            message: err.to_string(),
        },
        DomainError::InvalidReservationStatus(status) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown reservation status '{status}'"),
        },
        DomainError::InvalidStatusTransition { from, to } => ApiError::DomainRuleViolation {
            rule: String::from("reservation_status_transition"),
            message: format!("Cannot move a reservation from {from} to {to}"),
        },
        DomainError::InvalidParkingPolicy(policy) => ApiError::InvalidInput {
            field: String::from("policy"),
            message: format!("Unknown parking policy '{policy}'"),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// `context` describes the attempted action and prefixes internal messages.
#[must_use]
pub fn translate_persistence_error(context: &str, err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::DuplicateCell { room_id, date } => ApiError::Conflict {
            message: format!("An availability record already exists for room {room_id} on {date}"),
        },
        PersistenceError::UniqueViolation(message) => ApiError::Conflict { message },
        PersistenceError::SyncLogAlreadyFinished {
            sync_log_id,
            status,
        } => ApiError::Conflict {
            message: format!("Sync log {sync_log_id} is already finished with status {status}"),
        },
        other => ApiError::Internal {
            message: format!("Failed to {context}: {other}"),
        },
    }
}
