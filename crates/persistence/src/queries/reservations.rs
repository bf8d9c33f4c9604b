// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation and restriction queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use innsync_domain::{InclusiveDateRange, ReservationStatus, Restriction};
use std::str::FromStr;
use time::Date;
use tracing::debug;

use crate::columns::{format_date, is_set, nights_from_column, parse_date};
use crate::data_models::ReservationData;
use crate::diesel_schema::{reservations, restrictions};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = reservations)]
struct ReservationRow {
    reservation_id: i64,
    tenant_id: i64,
    property_id: i64,
    room_id: i64,
    reservation_number: String,
    guest_name: String,
    check_in_date: String,
    check_out_date: String,
    status: String,
    requires_parking: i32,
}

impl TryFrom<ReservationRow> for ReservationData {
    type Error = PersistenceError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status: ReservationStatus = ReservationStatus::from_str(&row.status)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        Ok(Self {
            reservation_id: row.reservation_id,
            tenant_id: row.tenant_id,
            property_id: row.property_id,
            room_id: row.room_id,
            reservation_number: row.reservation_number,
            guest_name: row.guest_name,
            check_in_date: parse_date(&row.check_in_date)?,
            check_out_date: parse_date(&row.check_out_date)?,
            status,
            requires_parking: is_set(row.requires_parking),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = restrictions)]
struct RestrictionRow {
    restriction_id: i64,
    property_id: i64,
    room_type_id: Option<i64>,
    room_id: Option<i64>,
    date_from: String,
    date_to: String,
    closed_to_arrival: i32,
    closed_to_departure: i32,
    min_stay: Option<i32>,
    max_stay: Option<i32>,
    stop_sell: i32,
    is_active: i32,
}

impl TryFrom<RestrictionRow> for Restriction {
    type Error = PersistenceError;

    fn try_from(row: RestrictionRow) -> Result<Self, Self::Error> {
        let range: InclusiveDateRange =
            InclusiveDateRange::new(parse_date(&row.date_from)?, parse_date(&row.date_to)?)
                .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        Ok(Self {
            restriction_id: row.restriction_id,
            property_id: row.property_id,
            room_type_id: row.room_type_id,
            room_id: row.room_id,
            range,
            closed_to_arrival: is_set(row.closed_to_arrival),
            closed_to_departure: is_set(row.closed_to_departure),
            min_stay: nights_from_column(row.min_stay)?,
            max_stay: nights_from_column(row.max_stay)?,
            stop_sell: is_set(row.stop_sell),
            is_active: is_set(row.is_active),
        })
    }
}

fn active_statuses() -> Vec<&'static str> {
    ReservationStatus::ACTIVE
        .iter()
        .map(ReservationStatus::as_str)
        .collect()
}

/// Lists the occupying reservations of the rooms that can touch `[start, end)`.
///
/// Checked-in reservations are returned regardless of their check-out date;
/// the occupancy evaluator decides how far they extend.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_room_reservations(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_ids: &[i64],
    start: Date,
    end: Date,
) -> Result<Vec<ReservationData>, PersistenceError> {
    debug!(
        tenant_id,
        room_count = room_ids.len(),
        %start,
        %end,
        "Listing room reservations"
    );

    let rows: Vec<ReservationRow> = reservations::table
        .filter(reservations::tenant_id.eq(tenant_id))
        .filter(reservations::room_id.eq_any(room_ids))
        .filter(reservations::status.eq_any(active_statuses()))
        .filter(reservations::check_in_date.lt(format_date(end)?))
        .filter(
            reservations::check_out_date
                .gt(format_date(start)?)
                .or(reservations::status.eq(ReservationStatus::CheckedIn.as_str())),
        )
        .order(reservations::check_in_date.asc())
        .select(ReservationRow::as_select())
        .load(conn)?;

    rows.into_iter().map(ReservationData::try_from).collect()
}

/// Lists the occupying parking-requesting reservations of a property that
/// can touch `[start, end)`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_parking_reservations(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    property_id: i64,
    start: Date,
    end: Date,
) -> Result<Vec<ReservationData>, PersistenceError> {
    debug!(tenant_id, property_id, %start, %end, "Listing parking reservations");

    let rows: Vec<ReservationRow> = reservations::table
        .filter(reservations::tenant_id.eq(tenant_id))
        .filter(reservations::property_id.eq(property_id))
        .filter(reservations::requires_parking.eq(1))
        .filter(reservations::status.eq_any(active_statuses()))
        .filter(reservations::check_in_date.lt(format_date(end)?))
        .filter(
            reservations::check_out_date
                .gt(format_date(start)?)
                .or(reservations::status.eq(ReservationStatus::CheckedIn.as_str())),
        )
        .order(reservations::check_in_date.asc())
        .select(ReservationRow::as_select())
        .load(conn)?;

    rows.into_iter().map(ReservationData::try_from).collect()
}

/// Lists the active restrictions of a property overlapping `[date_from, date_to]`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_active_restrictions(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    property_id: i64,
    date_from: Date,
    date_to: Date,
) -> Result<Vec<Restriction>, PersistenceError> {
    debug!(tenant_id, property_id, %date_from, %date_to, "Listing restrictions");

    let rows: Vec<RestrictionRow> = restrictions::table
        .filter(restrictions::tenant_id.eq(tenant_id))
        .filter(restrictions::property_id.eq(property_id))
        .filter(restrictions::is_active.eq(1))
        .filter(restrictions::date_from.le(format_date(date_to)?))
        .filter(restrictions::date_to.ge(format_date(date_from)?))
        .order(restrictions::restriction_id.asc())
        .select(RestrictionRow::as_select())
        .load(conn)?;

    rows.into_iter().map(Restriction::try_from).collect()
}
