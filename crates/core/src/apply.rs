// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::state::CalendarState;
use innsync_domain::{
    BulkEditOperation, CellValue, CellValues, DomainError, EditOp, EditTarget, apply_operation,
};
use serde::Serialize;
use time::Date;

/// Reason reported for cells skipped because they do not exist.
pub const SKIPPED_MISSING_RECORD: &str =
    "No availability record exists and create_missing_records is false";

/// The outcome of one operation on one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// The new value was computed (and, on commit, written).
    Applied {
        /// Value before the operation.
        old_value: CellValue,
        /// Value after the operation.
        new_value: CellValue,
        /// The cell did not exist and is (or would be) created.
        created_record: bool,
    },
    /// The operation was not attempted.
    Skipped {
        /// Why.
        reason: String,
    },
    /// The operation could not be applied.
    Failed {
        /// What went wrong.
        error_message: String,
    },
}

impl ItemOutcome {
    /// Returns true for `Applied`.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Returns true for `Skipped`.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Returns true for `Failed`.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One operation applied to one (room, date) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedItem {
    /// The room.
    pub room_id: i64,
    /// The day.
    pub date: Date,
    /// The edited attribute.
    pub target: EditTarget,
    /// The operation.
    pub operation: EditOp,
    /// What happened.
    pub outcome: ItemOutcome,
}

/// The final values of a cell touched by the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellWrite {
    /// The room.
    pub room_id: i64,
    /// The day.
    pub date: Date,
    /// Values after every operation.
    pub values: CellValues,
    /// The cell must be inserted rather than updated.
    pub is_new: bool,
}

/// The complete effect of a bulk edit on a calendar snapshot.
///
/// A plan is computed identically for dry runs and commits; only a commit
/// persists `writes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkEditPlan {
    /// One entry per (room, date, operation), in room, date, operation order.
    pub items: Vec<PlannedItem>,
    /// One entry per cell with at least one applied operation.
    pub writes: Vec<CellWrite>,
}

impl BulkEditPlan {
    /// Number of cells to insert.
    #[must_use]
    pub fn records_created(&self) -> usize {
        self.writes.iter().filter(|write| write.is_new).count()
    }

    /// Number of existing cells to update.
    #[must_use]
    pub fn records_updated(&self) -> usize {
        self.writes.iter().filter(|write| !write.is_new).count()
    }

    /// Number of applied items.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.outcome.is_applied())
            .count()
    }
}

fn plan_cell(
    room_id: i64,
    date: Date,
    existing: Option<&CellValues>,
    operations: &[BulkEditOperation],
    create_missing_records: bool,
    plan: &mut BulkEditPlan,
) {
    let is_new: bool = existing.is_none();
    if is_new && !create_missing_records {
        plan.items.extend(operations.iter().map(|operation| PlannedItem {
            room_id,
            date,
            target: operation.target,
            operation: operation.op,
            outcome: ItemOutcome::Skipped {
                reason: String::from(SKIPPED_MISSING_RECORD),
            },
        }));
        return;
    }

    let mut values: CellValues = existing.copied().unwrap_or_default();
    let mut touched: bool = false;
    for operation in operations {
        let outcome: ItemOutcome = match apply_operation(&mut values, operation) {
            Ok((old_value, new_value)) => {
                touched = true;
                ItemOutcome::Applied {
                    old_value,
                    new_value,
                    created_record: is_new,
                }
            }
            Err(err) => failed(&err),
        };
        plan.items.push(PlannedItem {
            room_id,
            date,
            target: operation.target,
            operation: operation.op,
            outcome,
        });
    }

    if touched {
        plan.writes.push(CellWrite {
            room_id,
            date,
            values,
            is_new,
        });
    }
}

fn failed(err: &DomainError) -> ItemOutcome {
    ItemOutcome::Failed {
        error_message: err.to_string(),
    }
}

/// Plans a bulk edit over a snapshot of the calendar.
///
/// Operations compose in order on each cell. Cells missing from `state` are
/// synthesized from defaults when `create_missing_records` is set and
/// skipped otherwise. An operation that cannot be computed is reported as
/// failed and leaves the cell as it was; the remaining operations proceed.
///
/// # Arguments
///
/// * `state` - The stored cells of the selection
/// * `room_ids` - The resolved rooms
/// * `dates` - The resolved days
/// * `operations` - The operations, in request order
/// * `create_missing_records` - Whether absent cells are created
#[must_use]
pub fn plan_bulk_edit(
    state: &CalendarState,
    room_ids: &[i64],
    dates: &[Date],
    operations: &[BulkEditOperation],
    create_missing_records: bool,
) -> BulkEditPlan {
    let mut plan: BulkEditPlan = BulkEditPlan::default();
    for room_id in room_ids {
        for date in dates {
            plan_cell(
                *room_id,
                *date,
                state.get(*room_id, *date),
                operations,
                create_missing_records,
                &mut plan,
            );
        }
    }
    plan
}
