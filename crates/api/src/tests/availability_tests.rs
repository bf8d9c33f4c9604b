// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use innsync::CellWrite;
use innsync_domain::{
    CellValues, InclusiveDateRange, ReservationStatus, Restriction, RestrictionViolation,
};
use time::Date;
use time::macros::date;

use crate::{
    ApiError, AvailabilityCalendar, CalendarDay, CalendarRequest, RoomAvailabilityRequest,
    RoomAvailabilityResponse, check_room_availability, get_availability_calendar,
};

use super::helpers::{
    Fixture, TENANT, create_reservation, create_test_now, create_test_today, setup_fixture,
};

fn check(
    fixture: &mut Fixture,
    room_id: i64,
    check_in: Date,
    check_out: Date,
    exclude_reservation_id: Option<i64>,
) -> RoomAvailabilityResponse {
    check_room_availability(
        &mut fixture.persistence,
        TENANT,
        &RoomAvailabilityRequest {
            room_id,
            check_in,
            check_out,
            exclude_reservation_id,
        },
        create_test_today(),
    )
    .unwrap()
}

fn store_cell(fixture: &mut Fixture, room_id: i64, date: Date, values: CellValues) {
    fixture
        .persistence
        .commit_cell_writes(
            TENANT,
            &[CellWrite {
                room_id,
                date,
                values,
                is_new: true,
            }],
            None,
            true,
            create_test_now(),
        )
        .unwrap();
}

#[test]
fn test_back_to_back_stays_do_not_conflict() {
    let mut fixture: Fixture = setup_fixture();
    let room_id: i64 = fixture.room_ids[0];
    create_reservation(
        &mut fixture,
        room_id,
        "R-100",
        date!(2026 - 05 - 10),
        date!(2026 - 05 - 12),
        false,
    );

    let after: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 05 - 12), date!(2026 - 05 - 14), None);
    assert!(after.is_available);

    let before: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 05 - 08), date!(2026 - 05 - 10), None);
    assert!(before.is_available);

    let overlapping: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 05 - 11), date!(2026 - 05 - 13), None);
    assert!(!overlapping.is_available);
    assert_eq!(overlapping.conflicting_reservations, vec![String::from("R-100")]);
    assert_eq!(overlapping.nights, 2);
}

#[test]
fn test_excluded_reservation_does_not_conflict_with_itself() {
    let mut fixture: Fixture = setup_fixture();
    let room_id: i64 = fixture.room_ids[0];
    let reservation_id: i64 = create_reservation(
        &mut fixture,
        room_id,
        "R-100",
        date!(2026 - 05 - 10),
        date!(2026 - 05 - 12),
        false,
    );

    let response: RoomAvailabilityResponse = check(
        &mut fixture,
        room_id,
        date!(2026 - 05 - 10),
        date!(2026 - 05 - 13),
        Some(reservation_id),
    );

    assert!(response.is_available);
}

#[test]
fn test_cancelled_reservations_free_the_room() {
    let mut fixture: Fixture = setup_fixture();
    let room_id: i64 = fixture.room_ids[0];
    let reservation_id: i64 = create_reservation(
        &mut fixture,
        room_id,
        "R-100",
        date!(2026 - 05 - 10),
        date!(2026 - 05 - 12),
        false,
    );
    fixture
        .persistence
        .set_reservation_status(TENANT, reservation_id, ReservationStatus::Cancelled)
        .unwrap();

    let response: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 05 - 10), date!(2026 - 05 - 12), None);

    assert!(response.is_available);
}

#[test]
fn test_overdue_checked_in_guest_keeps_the_room() {
    let mut fixture: Fixture = setup_fixture();
    let room_id: i64 = fixture.room_ids[0];
    let reservation_id: i64 = create_reservation(
        &mut fixture,
        room_id,
        "R-200",
        date!(2026 - 04 - 27),
        date!(2026 - 04 - 30),
        false,
    );
    fixture
        .persistence
        .set_reservation_status(TENANT, reservation_id, ReservationStatus::CheckedIn)
        .unwrap();

    let tonight: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 05 - 01), date!(2026 - 05 - 02), None);
    assert!(!tonight.is_available);
    assert_eq!(tonight.conflicting_reservations, vec![String::from("R-200")]);

    let tomorrow: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 05 - 02), date!(2026 - 05 - 04), None);
    assert!(!tomorrow.is_available);
    assert_eq!(tomorrow.conflicting_reservations, vec![String::from("R-200")]);

    let next_month: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 06 - 01), date!(2026 - 06 - 03), None);
    assert!(!next_month.is_available);
}

#[test]
fn test_stored_cell_rules_are_reported() {
    let mut fixture: Fixture = setup_fixture();
    let room_id: i64 = fixture.room_ids[0];
    store_cell(
        &mut fixture,
        room_id,
        date!(2026 - 05 - 20),
        CellValues {
            closed_to_arrival: true,
            min_stay: Some(3),
            ..CellValues::default()
        },
    );
    store_cell(
        &mut fixture,
        room_id,
        date!(2026 - 05 - 21),
        CellValues {
            is_available: false,
            is_blocked: true,
            ..CellValues::default()
        },
    );

    let response: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 05 - 20), date!(2026 - 05 - 22), None);

    assert!(!response.is_available);
    assert!(response.violations.contains(&RestrictionViolation::ClosedToArrival {
        date: date!(2026 - 05 - 20)
    }));
    assert!(response.violations.contains(&RestrictionViolation::StopSell {
        date: date!(2026 - 05 - 21)
    }));
    assert!(response.violations.contains(&RestrictionViolation::MinStay {
        required: 3,
        requested: 2
    }));
    assert_eq!(response.messages.len(), response.violations.len());
}

#[test]
fn test_property_restrictions_are_reported() {
    let mut fixture: Fixture = setup_fixture();
    let room_id: i64 = fixture.room_ids[0];
    fixture
        .persistence
        .create_restriction(
            TENANT,
            &Restriction {
                restriction_id: 0,
                property_id: fixture.property_id,
                room_type_id: Some(fixture.room_type_id),
                room_id: None,
                range: InclusiveDateRange::new(date!(2026 - 05 - 15), date!(2026 - 05 - 16))
                    .unwrap(),
                closed_to_arrival: false,
                closed_to_departure: false,
                min_stay: None,
                max_stay: None,
                stop_sell: true,
                is_active: true,
            },
        )
        .unwrap();

    let blocked: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 05 - 14), date!(2026 - 05 - 16), None);
    assert_eq!(
        blocked.violations,
        vec![RestrictionViolation::StopSell {
            date: date!(2026 - 05 - 15)
        }]
    );

    let clear: RoomAvailabilityResponse =
        check(&mut fixture, room_id, date!(2026 - 05 - 17), date!(2026 - 05 - 19), None);
    assert!(clear.is_available);
}

#[test]
fn test_unknown_room_is_not_found() {
    let mut fixture: Fixture = setup_fixture();
    let result = check_room_availability(
        &mut fixture.persistence,
        TENANT,
        &RoomAvailabilityRequest {
            room_id: 9999,
            check_in: date!(2026 - 05 - 10),
            check_out: date!(2026 - 05 - 11),
            exclude_reservation_id: None,
        },
        create_test_today(),
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_empty_stay_is_invalid_input() {
    let mut fixture: Fixture = setup_fixture();
    let room_id: i64 = fixture.room_ids[0];
    let result = check_room_availability(
        &mut fixture.persistence,
        TENANT,
        &RoomAvailabilityRequest {
            room_id,
            check_in: date!(2026 - 05 - 10),
            check_out: date!(2026 - 05 - 10),
            exclude_reservation_id: None,
        },
        create_test_today(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_calendar_shows_cells_and_occupancy() {
    let mut fixture: Fixture = setup_fixture();
    let (first, second) = (fixture.room_ids[0], fixture.room_ids[1]);
    create_reservation(
        &mut fixture,
        first,
        "R-300",
        date!(2026 - 05 - 10),
        date!(2026 - 05 - 12),
        false,
    );
    store_cell(
        &mut fixture,
        second,
        date!(2026 - 05 - 11),
        CellValues {
            is_available: false,
            ..CellValues::default()
        },
    );

    let calendar: AvailabilityCalendar = get_availability_calendar(
        &mut fixture.persistence,
        TENANT,
        &CalendarRequest {
            property_id: fixture.property_id,
            date_from: date!(2026 - 05 - 10),
            date_to: date!(2026 - 05 - 12),
            room_ids: None,
        },
        create_test_today(),
    )
    .unwrap();

    assert_eq!(calendar.rooms.len(), 2);
    let first_days: &[CalendarDay] = &calendar.rooms[0].days;
    assert_eq!(first_days.len(), 3);
    assert_eq!(first_days[0].reservation_number.as_deref(), Some("R-300"));
    assert_eq!(first_days[1].reservation_number.as_deref(), Some("R-300"));
    assert!(first_days[2].reservation_number.is_none());
    assert!(!first_days[0].sellable);
    assert!(first_days[2].sellable);
    assert!(!first_days[0].has_record);

    let second_days: &[CalendarDay] = &calendar.rooms[1].days;
    assert!(second_days[1].has_record);
    assert!(second_days[1].sync_pending);
    assert!(!second_days[1].sellable);
    assert!(second_days[0].sellable);
}

#[test]
fn test_calendar_filters_rooms() {
    let mut fixture: Fixture = setup_fixture();
    let second: i64 = fixture.room_ids[1];

    let calendar: AvailabilityCalendar = get_availability_calendar(
        &mut fixture.persistence,
        TENANT,
        &CalendarRequest {
            property_id: fixture.property_id,
            date_from: date!(2026 - 05 - 10),
            date_to: date!(2026 - 05 - 10),
            room_ids: Some(vec![second]),
        },
        create_test_today(),
    )
    .unwrap();

    assert_eq!(calendar.rooms.len(), 1);
    assert_eq!(calendar.rooms[0].room_id, second);
    assert_eq!(calendar.rooms[0].room_number, "102");
}

#[test]
fn test_calendar_rejects_ranges_over_a_year() {
    let mut fixture: Fixture = setup_fixture();

    let result = get_availability_calendar(
        &mut fixture.persistence,
        TENANT,
        &CalendarRequest {
            property_id: fixture.property_id,
            date_from: date!(2026 - 01 - 01),
            date_to: date!(2027 - 01 - 02),
            room_ids: None,
        },
        create_test_today(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}
