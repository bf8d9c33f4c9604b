// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Parking availability checks.

use innsync_domain::{
    HalfOpenInterval, ParkingAlternative, ParkingAvailability, ParkingPolicy, ParkingValidation,
    StayInterval, compute_parking_availability, suggest_parking_alternatives, validate_parking,
};
use innsync_persistence::{Persistence, PropertyData, ReservationData};
use time::Date;
use tracing::info;

use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{ParkingAvailabilityRequest, ParkingAvailabilityResponse};

/// Days searched on each side of a stay for alternatives.
const ALTERNATIVE_SEARCH_DAYS: i64 = 14;

fn parking_stays(reservations: &[ReservationData]) -> Result<Vec<StayInterval>, ApiError> {
    reservations
        .iter()
        .map(|reservation| {
            reservation.parking_stay().map_err(|e| ApiError::Internal {
                message: format!(
                    "Reservation {} has invalid stored dates: {e}",
                    reservation.reservation_number
                ),
            })
        })
        .collect()
}

/// Computes parking availability for a stay and validates it under a policy.
///
/// When the stay is infeasible under the policy, shifted windows of the same
/// length are suggested. Reservations are loaded wide enough to evaluate
/// every candidate window.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `tenant_id` - The tenant
/// * `request` - Property, stay, excluded reservation and policy
/// * `today` - The evaluation day; alternatives never start before it
///
/// # Errors
///
/// Returns an error if the property does not exist, the stay is empty or
/// reversed, or stored data cannot be read.
pub fn check_parking_availability(
    persistence: &mut Persistence,
    tenant_id: i64,
    request: &ParkingAvailabilityRequest,
    today: Date,
) -> Result<ParkingAvailabilityResponse, ApiError> {
    let property: PropertyData = persistence
        .get_property(tenant_id, request.property_id)
        .map_err(|e| translate_persistence_error("load property", e))?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Property"),
            message: format!("Property {} does not exist", request.property_id),
        })?;
    let stay: HalfOpenInterval =
        HalfOpenInterval::new(request.check_in, request.check_out).map_err(translate_domain_error)?;
    let policy: ParkingPolicy = request.policy.unwrap_or_default();

    let search: HalfOpenInterval = stay
        .shifted(-ALTERNATIVE_SEARCH_DAYS)
        .and_then(|earliest| {
            stay.shifted(ALTERNATIVE_SEARCH_DAYS)
                .map(|latest| earliest.extended_to(latest.end()))
        })
        .map_err(translate_domain_error)?;
    let reservations: Vec<ReservationData> = persistence
        .list_parking_reservations(tenant_id, property.property_id, search.start(), search.end())
        .map_err(|e| translate_persistence_error("list parking reservations", e))?;
    let stays: Vec<StayInterval> = parking_stays(&reservations)?;

    let availability: ParkingAvailability = compute_parking_availability(
        property.parking_spots_total,
        &stay,
        &stays,
        today,
        request.exclude_reservation_id,
    );
    let validation: ParkingValidation = validate_parking(policy, &availability);
    let alternatives: Vec<ParkingAlternative> = if availability.is_feasible(policy) {
        Vec::new()
    } else {
        suggest_parking_alternatives(
            property.parking_spots_total,
            &stay,
            &stays,
            policy,
            today,
            request.exclude_reservation_id,
        )
        .map_err(translate_domain_error)?
    };

    info!(
        tenant_id,
        property_id = property.property_id,
        check_in = %stay.start(),
        check_out = %stay.end(),
        policy = policy.as_str(),
        spots_available_all_days = availability.spots_available_all_days,
        is_valid = validation.is_valid,
        alternatives = alternatives.len(),
        "Checked parking availability"
    );

    Ok(ParkingAvailabilityResponse {
        property_id: property.property_id,
        check_in: stay.start(),
        check_out: stay.end(),
        policy,
        availability,
        validation,
        alternatives,
    })
}
