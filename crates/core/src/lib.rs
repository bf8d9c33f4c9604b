// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk-edit planning.
//!
//! Turns a validated bulk edit request into per-cell writes against a
//! snapshot of the calendar. Nothing here touches storage; the caller loads
//! a [`CalendarState`], asks for a [`BulkEditPlan`], and persists its writes.

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

mod apply;
mod error;
mod selection;
mod state;

#[cfg(test)]
mod tests;

pub use apply::{
    BulkEditPlan, CellWrite, ItemOutcome, PlannedItem, SKIPPED_MISSING_RECORD, plan_bulk_edit,
};
pub use error::CoreError;
pub use selection::{RoomRef, resolve_rooms, select_dates};
pub use state::{CalendarState, CellKey};
