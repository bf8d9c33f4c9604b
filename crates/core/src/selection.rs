// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use innsync_domain::{BulkEditRequest, BulkEditScope, InclusiveDateRange};
use std::collections::HashSet;
use time::Date;

/// The minimum a room needs to expose for scope resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomRef {
    /// The room.
    pub room_id: i64,
    /// Its room type.
    pub room_type_id: i64,
}

/// Expands a request's scope into concrete room ids.
///
/// `active_rooms` are the active rooms of the request's property. An explicit
/// room list is intersected with them; ids outside the property are dropped.
/// The result keeps the order of `active_rooms` for property and room type
/// scopes, and the request's order for explicit lists.
#[must_use]
pub fn resolve_rooms(request: &BulkEditRequest, active_rooms: &[RoomRef]) -> Vec<i64> {
    match request.scope {
        BulkEditScope::Property => active_rooms.iter().map(|room| room.room_id).collect(),
        BulkEditScope::RoomType => active_rooms
            .iter()
            .filter(|room| Some(room.room_type_id) == request.room_type_id)
            .map(|room| room.room_id)
            .collect(),
        BulkEditScope::SpecificRooms => {
            let active: HashSet<i64> = active_rooms.iter().map(|room| room.room_id).collect();
            request
                .room_ids
                .iter()
                .flatten()
                .copied()
                .filter(|room_id| active.contains(room_id))
                .collect()
        }
    }
}

/// Expands `[date_from, date_to]` into the edited days.
///
/// Both endpoints are included; `days_of_week` (0 = Monday) filters the days
/// when present.
///
/// # Errors
///
/// Returns an error if the range is reversed.
pub fn select_dates(request: &BulkEditRequest) -> Result<Vec<Date>, CoreError> {
    let range: InclusiveDateRange = InclusiveDateRange::new(request.date_from, request.date_to)?;
    let dates: Vec<Date> = match &request.days_of_week {
        Some(days) => range.days_matching(days).collect(),
        None => range.days().collect(),
    };
    Ok(dates)
}
