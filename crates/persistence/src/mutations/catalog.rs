// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Property, room, reservation, and restriction mutations.
//!
//! These cover the minimal inserts needed to seed a tenant; full CRUD for
//! these entities lives outside this crate.

use diesel::SqliteConnection;
use diesel::prelude::*;
use innsync_domain::{ReservationStatus, Restriction};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::columns::{flag, format_date, nights_to_column};
use crate::data_models::NewReservation;
use crate::diesel_schema::{properties, reservations, restrictions, room_types, rooms};
use crate::error::PersistenceError;

/// Creates a property.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_property(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    name: &str,
    parking_spots_total: u32,
) -> Result<i64, PersistenceError> {
    let spots: i32 = i32::try_from(parking_spots_total).map_err(|_| {
        PersistenceError::SerializationError(format!(
            "parking_spots_total out of range: {parking_spots_total}"
        ))
    })?;

    diesel::insert_into(properties::table)
        .values((
            properties::tenant_id.eq(tenant_id),
            properties::name.eq(name),
            properties::parking_spots_total.eq(spots),
            properties::is_active.eq(1),
        ))
        .execute(conn)?;

    let property_id: i64 = conn.last_insert_id()?;
    info!(tenant_id, property_id, name, "Created property");
    Ok(property_id)
}

/// Sets the active flag of a property.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the property does not exist.
pub fn set_property_active(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    property_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        properties::table
            .filter(properties::tenant_id.eq(tenant_id))
            .filter(properties::property_id.eq(property_id)),
    )
    .set(properties::is_active.eq(flag(is_active)))
    .execute(conn)?;

    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("Property {property_id}")));
    }
    info!(tenant_id, property_id, is_active, "Updated property active flag");
    Ok(())
}

/// Creates a room type.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_room_type(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    property_id: i64,
    name: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(room_types::table)
        .values((
            room_types::tenant_id.eq(tenant_id),
            room_types::property_id.eq(property_id),
            room_types::name.eq(name),
            room_types::is_active.eq(1),
        ))
        .execute(conn)?;

    let room_type_id: i64 = conn.last_insert_id()?;
    info!(tenant_id, property_id, room_type_id, name, "Created room type");
    Ok(room_type_id)
}

/// Creates a room.
///
/// # Errors
///
/// Returns an error if the insert fails or the room number is taken.
pub fn create_room(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    property_id: i64,
    room_type_id: i64,
    room_number: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(rooms::table)
        .values((
            rooms::tenant_id.eq(tenant_id),
            rooms::property_id.eq(property_id),
            rooms::room_type_id.eq(room_type_id),
            rooms::room_number.eq(room_number),
            rooms::is_active.eq(1),
        ))
        .execute(conn)?;

    let room_id: i64 = conn.last_insert_id()?;
    info!(tenant_id, property_id, room_id, room_number, "Created room");
    Ok(room_id)
}

/// Sets the active flag of a room.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the room does not exist.
pub fn set_room_active(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        rooms::table
            .filter(rooms::tenant_id.eq(tenant_id))
            .filter(rooms::room_id.eq(room_id)),
    )
    .set(rooms::is_active.eq(flag(is_active)))
    .execute(conn)?;

    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("Room {room_id}")));
    }
    Ok(())
}

/// Creates a reservation.
///
/// # Errors
///
/// Returns an error if the insert fails or the reservation number is taken.
pub fn create_reservation(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    reservation: &NewReservation,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(reservations::table)
        .values((
            reservations::tenant_id.eq(tenant_id),
            reservations::property_id.eq(reservation.property_id),
            reservations::room_id.eq(reservation.room_id),
            reservations::reservation_number.eq(&reservation.reservation_number),
            reservations::guest_name.eq(&reservation.guest_name),
            reservations::check_in_date.eq(format_date(reservation.check_in_date)?),
            reservations::check_out_date.eq(format_date(reservation.check_out_date)?),
            reservations::status.eq(reservation.status.as_str()),
            reservations::requires_parking.eq(flag(reservation.requires_parking)),
        ))
        .execute(conn)?;

    let reservation_id: i64 = conn.last_insert_id()?;
    info!(
        tenant_id,
        reservation_id,
        reservation_number = %reservation.reservation_number,
        "Created reservation"
    );
    Ok(reservation_id)
}

/// Moves a reservation to a new status.
///
/// The caller validates the transition; this only writes it.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the reservation does not exist.
pub fn set_reservation_status(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    reservation_id: i64,
    status: ReservationStatus,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        reservations::table
            .filter(reservations::tenant_id.eq(tenant_id))
            .filter(reservations::reservation_id.eq(reservation_id)),
    )
    .set(reservations::status.eq(status.as_str()))
    .execute(conn)?;

    if affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Reservation {reservation_id}"
        )));
    }
    info!(tenant_id, reservation_id, status = status.as_str(), "Updated reservation status");
    Ok(())
}

/// Creates a restriction; its `restriction_id` is ignored.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_restriction(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    restriction: &Restriction,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(restrictions::table)
        .values((
            restrictions::tenant_id.eq(tenant_id),
            restrictions::property_id.eq(restriction.property_id),
            restrictions::room_type_id.eq(restriction.room_type_id),
            restrictions::room_id.eq(restriction.room_id),
            restrictions::date_from.eq(format_date(restriction.range.start())?),
            restrictions::date_to.eq(format_date(restriction.range.end())?),
            restrictions::closed_to_arrival.eq(flag(restriction.closed_to_arrival)),
            restrictions::closed_to_departure.eq(flag(restriction.closed_to_departure)),
            restrictions::min_stay.eq(nights_to_column(restriction.min_stay)),
            restrictions::max_stay.eq(nights_to_column(restriction.max_stay)),
            restrictions::stop_sell.eq(flag(restriction.stop_sell)),
            restrictions::is_active.eq(flag(restriction.is_active)),
        ))
        .execute(conn)?;

    let restriction_id: i64 = conn.last_insert_id()?;
    info!(tenant_id, restriction_id, "Created restriction");
    Ok(restriction_id)
}
