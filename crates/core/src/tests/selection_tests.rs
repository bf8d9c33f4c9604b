// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_request;
use crate::{CoreError, RoomRef, resolve_rooms, select_dates};
use innsync_domain::{BulkEditScope, DomainError};
use time::macros::date;

fn rooms() -> Vec<RoomRef> {
    vec![
        RoomRef {
            room_id: 10,
            room_type_id: 1,
        },
        RoomRef {
            room_id: 11,
            room_type_id: 1,
        },
        RoomRef {
            room_id: 20,
            room_type_id: 2,
        },
    ]
}

#[test]
fn test_property_scope_selects_every_active_room() {
    let request = create_test_request(BulkEditScope::Property);
    assert_eq!(resolve_rooms(&request, &rooms()), vec![10, 11, 20]);
}

#[test]
fn test_room_type_scope_filters_by_type() {
    let mut request = create_test_request(BulkEditScope::RoomType);
    request.room_type_id = Some(2);
    assert_eq!(resolve_rooms(&request, &rooms()), vec![20]);
}

#[test]
fn test_specific_rooms_intersect_with_active_rooms() {
    let mut request = create_test_request(BulkEditScope::SpecificRooms);
    request.room_ids = Some(vec![20, 99, 10]);
    assert_eq!(resolve_rooms(&request, &rooms()), vec![20, 10]);
}

#[test]
fn test_dates_include_both_endpoints() {
    let request = create_test_request(BulkEditScope::Property);
    let dates = select_dates(&request).unwrap();
    assert_eq!(
        dates,
        vec![
            date!(2026 - 05 - 01),
            date!(2026 - 05 - 02),
            date!(2026 - 05 - 03)
        ]
    );
}

#[test]
fn test_days_of_week_filter() {
    let mut request = create_test_request(BulkEditScope::Property);
    // 2026-05-01 is a Friday.
    request.date_to = date!(2026 - 05 - 10);
    request.days_of_week = Some(vec![4]);
    let dates = select_dates(&request).unwrap();
    assert_eq!(dates, vec![date!(2026 - 05 - 01), date!(2026 - 05 - 08)]);
}

#[test]
fn test_reversed_range_is_a_domain_violation() {
    let mut request = create_test_request(BulkEditScope::Property);
    request.date_to = date!(2026 - 04 - 01);
    assert!(matches!(
        select_dates(&request),
        Err(CoreError::DomainViolation(
            DomainError::InvalidDateRange { .. }
        ))
    ));
}
