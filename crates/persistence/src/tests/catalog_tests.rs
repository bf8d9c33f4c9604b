// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use innsync_domain::{InclusiveDateRange, ReservationStatus, Restriction};
use time::macros::date;

use super::{OTHER_TENANT, TENANT, seed_property};
use crate::{NewReservation, Persistence, PersistenceError, ReservationData};

fn reservation(seed: &super::Seed, number: &str, status: ReservationStatus) -> NewReservation {
    NewReservation {
        property_id: seed.property_id,
        room_id: seed.room_ids[0],
        reservation_number: String::from(number),
        guest_name: String::from("Ada Lovelace"),
        check_in_date: date!(2026 - 05 - 10),
        check_out_date: date!(2026 - 05 - 13),
        status,
        requires_parking: true,
    }
}

#[test]
fn test_queries_are_tenant_scoped() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);

    assert!(persistence.get_property(TENANT, seed.property_id).unwrap().is_some());
    assert!(
        persistence
            .get_property(OTHER_TENANT, seed.property_id)
            .unwrap()
            .is_none()
    );
    assert!(
        persistence
            .list_active_rooms(OTHER_TENANT, seed.property_id)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_list_active_rooms_skips_inactive_rooms() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);

    persistence
        .set_room_active(TENANT, seed.room_ids[1], false)
        .unwrap();

    let rooms = persistence.list_active_rooms(TENANT, seed.property_id).unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].room_id, seed.room_ids[0]);
    assert_eq!(rooms[0].room_type_id, seed.room_type_id);
}

#[test]
fn test_duplicate_room_number_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);

    let result = persistence.create_room(TENANT, seed.property_id, seed.room_type_id, "101");

    assert!(matches!(result, Err(PersistenceError::UniqueViolation(_))));
}

#[test]
fn test_set_active_on_missing_property_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result = persistence.set_property_active(TENANT, 999, false);

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_room_reservations_exclude_inactive_statuses() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);

    persistence
        .create_reservation(TENANT, &reservation(&seed, "R-1", ReservationStatus::Confirmed))
        .unwrap();
    persistence
        .create_reservation(TENANT, &reservation(&seed, "R-2", ReservationStatus::Cancelled))
        .unwrap();

    let found: Vec<ReservationData> = persistence
        .list_room_reservations(
            TENANT,
            &seed.room_ids,
            date!(2026 - 05 - 01),
            date!(2026 - 05 - 31),
        )
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].reservation_number, "R-1");
}

#[test]
fn test_checked_in_reservation_past_checkout_is_still_listed() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);

    persistence
        .create_reservation(TENANT, &reservation(&seed, "R-1", ReservationStatus::CheckedIn))
        .unwrap();

    let found: Vec<ReservationData> = persistence
        .list_parking_reservations(
            TENANT,
            seed.property_id,
            date!(2026 - 05 - 20),
            date!(2026 - 05 - 21),
        )
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].status, ReservationStatus::CheckedIn);
}

#[test]
fn test_reservation_status_update_round_trips() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);
    let reservation_id: i64 = persistence
        .create_reservation(TENANT, &reservation(&seed, "R-1", ReservationStatus::Pending))
        .unwrap();

    persistence
        .set_reservation_status(TENANT, reservation_id, ReservationStatus::Cancelled)
        .unwrap();

    let found: Vec<ReservationData> = persistence
        .list_room_reservations(
            TENANT,
            &seed.room_ids,
            date!(2026 - 05 - 01),
            date!(2026 - 05 - 31),
        )
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_restrictions_are_filtered_by_range() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);

    let restriction: Restriction = Restriction {
        restriction_id: 0,
        property_id: seed.property_id,
        room_type_id: None,
        room_id: Some(seed.room_ids[0]),
        range: InclusiveDateRange::new(date!(2026 - 05 - 10), date!(2026 - 05 - 12)).unwrap(),
        closed_to_arrival: true,
        closed_to_departure: false,
        min_stay: Some(2),
        max_stay: None,
        stop_sell: false,
        is_active: true,
    };
    let restriction_id: i64 = persistence.create_restriction(TENANT, &restriction).unwrap();

    let inside: Vec<Restriction> = persistence
        .list_active_restrictions(
            TENANT,
            seed.property_id,
            date!(2026 - 05 - 12),
            date!(2026 - 05 - 15),
        )
        .unwrap();
    let outside: Vec<Restriction> = persistence
        .list_active_restrictions(
            TENANT,
            seed.property_id,
            date!(2026 - 05 - 13),
            date!(2026 - 05 - 15),
        )
        .unwrap();

    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].restriction_id, restriction_id);
    assert_eq!(inside[0].min_stay, Some(2));
    assert!(inside[0].closed_to_arrival);
    assert!(outside.is_empty());
}
