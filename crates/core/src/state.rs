// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use innsync_domain::CellValues;
use std::collections::BTreeMap;
use time::Date;

/// Identifies one availability cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    /// The room.
    pub room_id: i64,
    /// The calendar day.
    pub date: Date,
}

impl CellKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(room_id: i64, date: Date) -> Self {
        Self { room_id, date }
    }
}

/// A snapshot of the stored, active availability cells of a selection.
///
/// Cells absent from the snapshot do not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarState {
    cells: BTreeMap<CellKey, CellValues>,
}

impl CalendarState {
    /// Creates an empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }

    /// Records a stored cell.
    pub fn insert(&mut self, room_id: i64, date: Date, values: CellValues) {
        self.cells.insert(CellKey::new(room_id, date), values);
    }

    /// Returns the stored values of a cell.
    #[must_use]
    pub fn get(&self, room_id: i64, date: Date) -> Option<&CellValues> {
        self.cells.get(&CellKey::new(room_id, date))
    }

    /// Number of stored cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no cell is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Converts the state to a short description for logs.
    #[must_use]
    pub fn to_snapshot(&self) -> String {
        let rooms: std::collections::BTreeSet<i64> =
            self.cells.keys().map(|key| key.room_id).collect();
        format!("cells_count={},rooms_count={}", self.cells.len(), rooms.len())
    }
}

impl FromIterator<(i64, Date, CellValues)> for CalendarState {
    fn from_iter<T: IntoIterator<Item = (i64, Date, CellValues)>>(iter: T) -> Self {
        let mut state: Self = Self::new();
        for (room_id, date, values) in iter {
            state.insert(room_id, date, values);
        }
        state
    }
}
