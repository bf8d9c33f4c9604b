// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability calendar and room availability checks.

use innsync_domain::{
    CellValues, DomainError, HalfOpenInterval, InclusiveDateRange, MAX_BULK_EDIT_DAYS,
    RestrictionViolation, Restriction, StayInterval, evaluate_cell_rules,
    evaluate_stay_restrictions, find_conflicts, occupying_intervals, shift_date,
};
use innsync_persistence::{
    AvailabilityCellData, Persistence, PropertyData, ReservationData, RoomData,
};
use std::collections::{BTreeMap, HashMap};
use time::Date;
use tracing::{debug, info};

use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    AvailabilityCalendar, CalendarDay, CalendarRequest, RoomAvailabilityRequest,
    RoomAvailabilityResponse, RoomCalendar,
};

fn stored_stay(reservation: &ReservationData) -> Result<StayInterval, ApiError> {
    reservation.room_stay().map_err(|e| ApiError::Internal {
        message: format!(
            "Reservation {} has invalid stored dates: {e}",
            reservation.reservation_number
        ),
    })
}

fn load_property(
    persistence: &mut Persistence,
    tenant_id: i64,
    property_id: i64,
) -> Result<PropertyData, ApiError> {
    persistence
        .get_property(tenant_id, property_id)
        .map_err(|e| translate_persistence_error("load property", e))?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Property"),
            message: format!("Property {property_id} does not exist"),
        })
}

/// Builds the calendar of a property.
///
/// Each day shows the stored cell (or the defaults when nothing is stored),
/// the reservation occupying the room that night, and whether the room can
/// be sold.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `tenant_id` - The tenant
/// * `request` - Property, days and optional room filter
/// * `today` - The evaluation day for checked-in stays
///
/// # Errors
///
/// Returns an error if the property does not exist, the range is invalid or
/// longer than a year, or stored data cannot be read.
pub fn get_availability_calendar(
    persistence: &mut Persistence,
    tenant_id: i64,
    request: &CalendarRequest,
    today: Date,
) -> Result<AvailabilityCalendar, ApiError> {
    load_property(persistence, tenant_id, request.property_id)?;
    let range: InclusiveDateRange =
        InclusiveDateRange::new(request.date_from, request.date_to).map_err(translate_domain_error)?;
    if range.num_days() > MAX_BULK_EDIT_DAYS {
        return Err(translate_domain_error(DomainError::DateRangeTooLong {
            days: range.num_days(),
            max: MAX_BULK_EDIT_DAYS,
        }));
    }

    let rooms: Vec<RoomData> = persistence
        .list_active_rooms(tenant_id, request.property_id)
        .map_err(|e| translate_persistence_error("list active rooms", e))?
        .into_iter()
        .filter(|room| {
            request
                .room_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&room.room_id))
        })
        .collect();
    let room_ids: Vec<i64> = rooms.iter().map(|room| room.room_id).collect();

    let cells: HashMap<(i64, Date), AvailabilityCellData> = persistence
        .list_cells(tenant_id, &room_ids, range.start(), range.end())
        .map_err(|e| translate_persistence_error("list availability cells", e))?
        .into_iter()
        .map(|cell| ((cell.room_id, cell.date), cell))
        .collect();

    let night_after: Date = shift_date(range.end(), 1).map_err(translate_domain_error)?;
    let stays: Vec<StayInterval> = persistence
        .list_room_reservations(tenant_id, &room_ids, range.start(), night_after)
        .map_err(|e| translate_persistence_error("list reservations", e))?
        .iter()
        .map(stored_stay)
        .collect::<Result<_, _>>()?;
    let occupying = occupying_intervals(&stays, today, None);

    let calendar_rooms: Vec<RoomCalendar> = rooms
        .iter()
        .map(|room| {
            let days: Vec<CalendarDay> = range
                .days()
                .map(|date| {
                    let stored: Option<&AvailabilityCellData> = cells.get(&(room.room_id, date));
                    let values: CellValues = stored.map(|cell| cell.values).unwrap_or_default();
                    let reservation_number: Option<String> = occupying
                        .iter()
                        .find(|(stay, effective)| {
                            stay.resource_id == room.room_id && effective.contains(date)
                        })
                        .map(|(stay, _)| stay.reference.clone());
                    CalendarDay {
                        date,
                        values,
                        has_record: stored.is_some(),
                        sellable: values.is_sellable() && reservation_number.is_none(),
                        reservation_number,
                        sync_pending: stored.is_some_and(|cell| cell.sync_pending),
                    }
                })
                .collect();
            RoomCalendar {
                room_id: room.room_id,
                room_number: room.room_number.clone(),
                room_type_id: room.room_type_id,
                days,
            }
        })
        .collect();

    debug!(
        tenant_id,
        property_id = request.property_id,
        rooms = calendar_rooms.len(),
        days = range.num_days(),
        "Built availability calendar"
    );

    Ok(AvailabilityCalendar {
        property_id: request.property_id,
        date_from: range.start(),
        date_to: range.end(),
        rooms: calendar_rooms,
    })
}

/// Checks whether a stay can be booked in one room.
///
/// Reports overlapping reservations, stored cell rules (closed, blocked,
/// arrival and departure closures, stay lengths) and property restrictions.
///
/// # Errors
///
/// Returns an error if the room does not exist, the stay is empty or
/// reversed, or stored data cannot be read.
pub fn check_room_availability(
    persistence: &mut Persistence,
    tenant_id: i64,
    request: &RoomAvailabilityRequest,
    today: Date,
) -> Result<RoomAvailabilityResponse, ApiError> {
    let room: RoomData = persistence
        .get_room(tenant_id, request.room_id)
        .map_err(|e| translate_persistence_error("load room", e))?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Room"),
            message: format!("Room {} does not exist", request.room_id),
        })?;
    let stay: HalfOpenInterval =
        HalfOpenInterval::new(request.check_in, request.check_out).map_err(translate_domain_error)?;

    let stays: Vec<StayInterval> = persistence
        .list_room_reservations(tenant_id, &[room.room_id], stay.start(), stay.end())
        .map_err(|e| translate_persistence_error("list reservations", e))?
        .iter()
        .map(stored_stay)
        .collect::<Result<_, _>>()?;
    let conflicting_reservations: Vec<String> =
        find_conflicts(&stays, &stay, today, request.exclude_reservation_id)
            .into_iter()
            .map(|conflict| conflict.reference.clone())
            .collect();

    let cells: BTreeMap<Date, CellValues> = persistence
        .list_cells(tenant_id, &[room.room_id], stay.start(), stay.end())
        .map_err(|e| translate_persistence_error("list availability cells", e))?
        .into_iter()
        .map(|cell| (cell.date, cell.values))
        .collect();
    let restrictions: Vec<Restriction> = persistence
        .list_active_restrictions(tenant_id, room.property_id, stay.start(), stay.end())
        .map_err(|e| translate_persistence_error("list restrictions", e))?;

    let mut violations: Vec<RestrictionViolation> = evaluate_cell_rules(&stay, &cells);
    for violation in
        evaluate_stay_restrictions(&stay, room.room_id, room.room_type_id, &restrictions)
    {
        if !violations.contains(&violation) {
            violations.push(violation);
        }
    }

    let messages: Vec<String> = conflicting_reservations
        .iter()
        .map(|reference| format!("Room is booked by reservation {reference}"))
        .chain(violations.iter().map(ToString::to_string))
        .collect();
    let is_available: bool = conflicting_reservations.is_empty() && violations.is_empty();

    info!(
        tenant_id,
        room_id = room.room_id,
        check_in = %stay.start(),
        check_out = %stay.end(),
        is_available,
        conflicts = conflicting_reservations.len(),
        violations = violations.len(),
        "Checked room availability"
    );

    Ok(RoomAvailabilityResponse {
        room_id: room.room_id,
        check_in: stay.start(),
        check_out: stay.end(),
        nights: stay.nights(),
        is_available,
        conflicting_reservations,
        violations,
        messages,
    })
}
