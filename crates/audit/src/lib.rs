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
    clippy::all
)]

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
/// This could be a user, a system process, or an automated trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "user", "system", "scheduler").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The actor used by scheduled jobs.
    #[must_use]
    pub fn scheduler() -> Self {
        Self::new(String::from("scheduler"), String::from("system"))
    }

    /// Returns the `type:id` form stored alongside sync logs.
    #[must_use]
    pub fn to_label(&self) -> String {
        format!("{}:{}", self.actor_type, self.id)
    }

    /// Parses the `type:id` form; a label without a colon is a user id.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.split_once(':') {
            Some((actor_type, id)) => Self::new(id.to_string(), actor_type.to_string()),
            None => Self::new(label.to_string(), String::from("user")),
        }
    }
}

/// Errors raised by sync log lifecycle violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// The entry already reached a terminal status and is immutable.
    AlreadyFinished {
        /// The terminal status.
        status: SyncStatus,
    },
    /// A non-terminal status was supplied where a terminal one is required.
    NotTerminal(SyncStatus),
    /// An unknown enum value was read back.
    InvalidValue {
        /// The field.
        field: &'static str,
        /// The value.
        value: String,
    },
}

impl std::fmt::Display for AuditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyFinished { status } => {
                write!(
                    f,
                    "Sync log is already finished with status '{}'",
                    status.as_str()
                )
            }
            Self::NotTerminal(status) => {
                write!(f, "Status '{}' is not a terminal status", status.as_str())
            }
            Self::InvalidValue { field, value } => {
                write!(f, "Invalid {field}: '{value}'")
            }
        }
    }
}

impl std::error::Error for AuditError {}

/// Direction of a sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// Provider to local.
    Inbound,
    /// Local to provider.
    Outbound,
    /// Inbound then outbound.
    Bidirectional,
}

impl SyncDirection {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Bidirectional => "bidirectional",
        }
    }
}

impl FromStr for SyncDirection {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Self::Inbound),
            "outbound" => Ok(Self::Outbound),
            "bidirectional" => Ok(Self::Bidirectional),
            _ => Err(AuditError::InvalidValue {
                field: "sync direction",
                value: s.to_string(),
            }),
        }
    }
}

/// What initiated a sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    /// On-demand from an operator.
    Manual,
    /// Triggered after a bulk edit commit.
    BulkEdit,
    /// Periodic pending-cell push.
    Incremental,
    /// Periodic bidirectional reconciliation.
    Full,
    /// On-demand for an explicit room list.
    RoomSpecific,
    /// Retry of cells in error.
    ErrorRecovery,
}

impl SyncType {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::BulkEdit => "bulk_edit",
            Self::Incremental => "incremental",
            Self::Full => "full",
            Self::RoomSpecific => "room_specific",
            Self::ErrorRecovery => "error_recovery",
        }
    }
}

impl FromStr for SyncType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "bulk_edit" => Ok(Self::BulkEdit),
            "incremental" => Ok(Self::Incremental),
            "full" => Ok(Self::Full),
            "room_specific" => Ok(Self::RoomSpecific),
            "error_recovery" => Ok(Self::ErrorRecovery),
            _ => Err(AuditError::InvalidValue {
                field: "sync type",
                value: s.to_string(),
            }),
        }
    }
}

/// Status of a sync attempt.
///
/// `Started` and `InProgress` are transient; the others are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// The entry was created.
    Started,
    /// Items are being processed.
    InProgress,
    /// Every item succeeded.
    Success,
    /// Some items failed.
    PartialSuccess,
    /// The attempt failed.
    Error,
}

impl SyncStatus {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::PartialSuccess => "partial_success",
            Self::Error => "error",
        }
    }

    /// Returns true for statuses after which the entry is immutable.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::PartialSuccess | Self::Error)
    }

    /// Derives the terminal status from item counts.
    ///
    /// No failures is a success, failures alongside successes a partial
    /// success, and anything else an error.
    #[must_use]
    pub const fn from_counts(success_items: u64, error_items: u64) -> Self {
        if error_items == 0 {
            Self::Success
        } else if success_items > 0 {
            Self::PartialSuccess
        } else {
            Self::Error
        }
    }
}

impl FromStr for SyncStatus {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "in_progress" => Ok(Self::InProgress),
            "success" => Ok(Self::Success),
            "partial_success" => Ok(Self::PartialSuccess),
            "error" => Ok(Self::Error),
            _ => Err(AuditError::InvalidValue {
                field: "sync status",
                value: s.to_string(),
            }),
        }
    }
}

/// The calendar scope of a sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncScope {
    /// First day synced.
    pub date_from: Option<Date>,
    /// Last day synced.
    pub date_to: Option<Date>,
    /// Limits the sync to these rooms.
    pub room_ids: Option<Vec<i64>>,
}

/// Item counters recorded when a sync attempt finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncCounters {
    /// Items selected.
    pub total_items: u64,
    /// Items that succeeded.
    pub success_items: u64,
    /// Items that failed.
    pub error_items: u64,
    /// Cells whose stored values changed.
    pub changes_made: u64,
}

/// One sync attempt against a channel configuration.
///
/// Created at start, moved once to a terminal status at completion, and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncLogEntry {
    /// The channel configuration.
    pub configuration_id: i64,
    /// The tenant.
    pub tenant_id: i64,
    /// What initiated the attempt.
    pub sync_type: SyncType,
    /// Direction.
    pub direction: SyncDirection,
    /// Current status.
    pub status: SyncStatus,
    /// Calendar scope.
    pub scope: SyncScope,
    /// Item counters, set when finished.
    pub counters: SyncCounters,
    /// Failure description.
    pub error_message: Option<String>,
    /// Who triggered the attempt.
    pub triggered_by: Actor,
    /// Start time.
    pub started_at: OffsetDateTime,
    /// Completion time.
    pub completed_at: Option<OffsetDateTime>,
    /// Elapsed seconds between start and completion.
    pub duration_seconds: Option<f64>,
}

impl SyncLogEntry {
    /// Creates a new entry in the `Started` status.
    #[must_use]
    pub const fn start(
        configuration_id: i64,
        tenant_id: i64,
        sync_type: SyncType,
        direction: SyncDirection,
        scope: SyncScope,
        triggered_by: Actor,
        started_at: OffsetDateTime,
    ) -> Self {
        Self {
            configuration_id,
            tenant_id,
            sync_type,
            direction,
            status: SyncStatus::Started,
            scope,
            counters: SyncCounters {
                total_items: 0,
                success_items: 0,
                error_items: 0,
                changes_made: 0,
            },
            error_message: None,
            triggered_by,
            started_at,
            completed_at: None,
            duration_seconds: None,
        }
    }

    /// Moves a started entry to `InProgress`.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::AlreadyFinished` if the entry is terminal.
    pub const fn mark_in_progress(&mut self) -> Result<(), AuditError> {
        if self.status.is_terminal() {
            return Err(AuditError::AlreadyFinished {
                status: self.status,
            });
        }
        self.status = SyncStatus::InProgress;
        Ok(())
    }

    /// Moves the entry to a terminal status.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is already terminal or if `status` is
    /// not terminal.
    pub fn finish(
        &mut self,
        status: SyncStatus,
        counters: SyncCounters,
        error_message: Option<String>,
        completed_at: OffsetDateTime,
    ) -> Result<(), AuditError> {
        if self.status.is_terminal() {
            return Err(AuditError::AlreadyFinished {
                status: self.status,
            });
        }
        if !status.is_terminal() {
            return Err(AuditError::NotTerminal(status));
        }
        self.status = status;
        self.counters = counters;
        self.error_message = error_message;
        self.completed_at = Some(completed_at);
        self.duration_seconds = Some((completed_at - self.started_at).as_seconds_f64().max(0.0));
        Ok(())
    }

    /// Returns true once the entry is immutable.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests;
