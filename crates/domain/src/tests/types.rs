// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, ParkingPolicy, ReservationStatus};
use std::str::FromStr;

#[test]
fn test_reservation_status_round_trips_through_str() {
    for status in [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::CheckedIn,
        ReservationStatus::CheckedOut,
        ReservationStatus::Cancelled,
        ReservationStatus::NoShow,
    ] {
        assert_eq!(ReservationStatus::from_str(status.as_str()), Ok(status));
    }
}

#[test]
fn test_unknown_status_is_rejected() {
    assert_eq!(
        ReservationStatus::from_str("archived"),
        Err(DomainError::InvalidReservationStatus(String::from(
            "archived"
        )))
    );
}

#[test]
fn test_active_statuses() {
    assert!(ReservationStatus::Pending.is_active());
    assert!(ReservationStatus::Confirmed.is_active());
    assert!(ReservationStatus::CheckedIn.is_active());
    assert!(!ReservationStatus::CheckedOut.is_active());
    assert!(!ReservationStatus::Cancelled.is_active());
    assert!(!ReservationStatus::NoShow.is_active());
    assert!(ReservationStatus::ACTIVE.iter().all(ReservationStatus::is_active));
}

#[test]
fn test_status_transitions() {
    assert!(
        ReservationStatus::Pending
            .validate_transition(ReservationStatus::Confirmed)
            .is_ok()
    );
    assert!(
        ReservationStatus::Confirmed
            .validate_transition(ReservationStatus::CheckedIn)
            .is_ok()
    );
    assert!(
        ReservationStatus::CheckedIn
            .validate_transition(ReservationStatus::CheckedOut)
            .is_ok()
    );
    assert!(
        ReservationStatus::CheckedIn
            .validate_transition(ReservationStatus::Cancelled)
            .is_err()
    );
    assert!(
        ReservationStatus::CheckedOut
            .validate_transition(ReservationStatus::Pending)
            .is_err()
    );
}

#[test]
fn test_parking_policy_parsing() {
    assert_eq!(ParkingPolicy::from_str("integral"), Ok(ParkingPolicy::Integral));
    assert_eq!(ParkingPolicy::from_str("flexible"), Ok(ParkingPolicy::Flexible));
    assert!(ParkingPolicy::from_str("strict").is_err());
    assert_eq!(ParkingPolicy::default(), ParkingPolicy::Integral);
}
