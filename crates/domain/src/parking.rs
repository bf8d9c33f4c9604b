// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Parking availability over a property's shared spot pool.
//!
//! Occupancy is derived per request from the live set of parking-requesting
//! reservations; nothing here is persisted.

use crate::dates::HalfOpenInterval;
use crate::error::DomainError;
use crate::occupancy::{StayInterval, occupying_intervals};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Day shifts tried, in order, when searching for alternative windows.
pub const ALTERNATIVE_SHIFTS: [i64; 10] = [1, -1, 2, -2, 3, -3, 7, -7, 14, -14];

/// Maximum number of alternative windows proposed.
pub const MAX_ALTERNATIVES: usize = 3;

/// How strictly a stay needs a parking spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParkingPolicy {
    /// A spot is required on every night of the stay.
    #[default]
    Integral,
    /// A spot is required on at least one night.
    Flexible,
}

impl ParkingPolicy {
    /// Returns the wire name of the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integral => "integral",
            Self::Flexible => "flexible",
        }
    }
}

impl FromStr for ParkingPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integral" => Ok(Self::Integral),
            "flexible" => Ok(Self::Flexible),
            _ => Err(DomainError::InvalidParkingPolicy(s.to_string())),
        }
    }
}

/// Spot usage on one night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyParkingAvailability {
    /// The night.
    pub date: Date,
    /// Spots taken by other reservations.
    pub occupied: u32,
    /// Spots left, never negative.
    pub available: u32,
    /// Reservation numbers holding a spot that night.
    pub conflicts: Vec<String>,
}

/// Parking availability for one candidate stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingAvailability {
    /// Size of the property's pool.
    pub spots_total: u32,
    /// One entry per night, departure day excluded.
    pub daily_availability: Vec<DailyParkingAvailability>,
    /// Free spots on the worst night.
    pub spots_available_all_days: u32,
    /// Free spots on the best night.
    pub spots_available_partial: u32,
    /// A spot is free on every night.
    pub can_reserve_integral: bool,
    /// A spot is free on at least one night.
    pub can_reserve_flexible: bool,
}

impl ParkingAvailability {
    /// Returns true if the stay can be booked under the policy.
    #[must_use]
    pub const fn is_feasible(&self, policy: ParkingPolicy) -> bool {
        match policy {
            ParkingPolicy::Integral => self.can_reserve_integral,
            ParkingPolicy::Flexible => self.can_reserve_flexible,
        }
    }

    /// Nights with no free spot.
    pub fn full_nights(&self) -> impl Iterator<Item = Date> + '_ {
        self.daily_availability
            .iter()
            .filter(|day| day.available == 0)
            .map(|day| day.date)
    }
}

/// A shifted stay window that would be feasible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingAlternative {
    /// Shifted check-in.
    pub check_in: Date,
    /// Shifted check-out.
    pub check_out: Date,
    /// Shift applied, in days.
    pub shift_days: i64,
    /// Free spots on the worst night of the window.
    pub spots_available_all_days: u32,
    /// Free spots on the best night of the window.
    pub spots_available_partial: u32,
}

/// Outcome of validating a parking request against a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingValidation {
    /// False blocks the reservation.
    pub is_valid: bool,
    /// Blocking reason, or an advisory when valid.
    pub message: Option<String>,
}

fn count_to_u32(count: usize) -> u32 {
    count.to_u32().unwrap_or(u32::MAX)
}

/// Computes per-night parking availability for a candidate stay.
///
/// `reservations` are the property's parking-requesting stays. Terminal
/// statuses and `exclude` (the reservation being updated) are ignored, and
/// checked-in stays count as of `as_of` even past their nominal check-out.
#[must_use]
pub fn compute_parking_availability(
    spots_total: u32,
    stay: &HalfOpenInterval,
    reservations: &[StayInterval],
    as_of: Date,
    exclude: Option<i64>,
) -> ParkingAvailability {
    let occupying = occupying_intervals(reservations, as_of, exclude);

    let daily_availability: Vec<DailyParkingAvailability> = stay
        .nights_iter()
        .map(|date| {
            let conflicts: Vec<String> = occupying
                .iter()
                .filter(|(_, effective)| effective.contains(date))
                .map(|(reservation, _)| reservation.reference.clone())
                .collect();
            let occupied: u32 = count_to_u32(conflicts.len());
            DailyParkingAvailability {
                date,
                occupied,
                available: spots_total.saturating_sub(occupied),
                conflicts,
            }
        })
        .collect();

    let spots_available_all_days: u32 = daily_availability
        .iter()
        .map(|day| day.available)
        .min()
        .unwrap_or(0);
    let spots_available_partial: u32 = daily_availability
        .iter()
        .map(|day| day.available)
        .max()
        .unwrap_or(0);

    ParkingAvailability {
        spots_total,
        daily_availability,
        spots_available_all_days,
        spots_available_partial,
        can_reserve_integral: spots_available_all_days > 0,
        can_reserve_flexible: spots_available_partial > 0,
    }
}

/// Searches shifted windows of the same length that satisfy the policy.
///
/// Shifts are tried in [`ALTERNATIVE_SHIFTS`] order, windows starting before
/// `today` are discarded, and the search stops after [`MAX_ALTERNATIVES`].
///
/// # Errors
///
/// Returns an error on calendar overflow.
pub fn suggest_parking_alternatives(
    spots_total: u32,
    stay: &HalfOpenInterval,
    reservations: &[StayInterval],
    policy: ParkingPolicy,
    today: Date,
    exclude: Option<i64>,
) -> Result<Vec<ParkingAlternative>, DomainError> {
    let mut alternatives: Vec<ParkingAlternative> = Vec::new();
    for shift in ALTERNATIVE_SHIFTS {
        if alternatives.len() >= MAX_ALTERNATIVES {
            break;
        }
        let candidate: HalfOpenInterval = stay.shifted(shift)?;
        if candidate.start() < today {
            continue;
        }
        let availability: ParkingAvailability =
            compute_parking_availability(spots_total, &candidate, reservations, today, exclude);
        if availability.is_feasible(policy) {
            alternatives.push(ParkingAlternative {
                check_in: candidate.start(),
                check_out: candidate.end(),
                shift_days: shift,
                spots_available_all_days: availability.spots_available_all_days,
                spots_available_partial: availability.spots_available_partial,
            });
        }
    }
    Ok(alternatives)
}

/// Validates a parking request against a policy.
///
/// `integral` blocks unless a spot is free every night. `flexible` blocks only
/// when no night has a free spot, and otherwise returns an advisory when some
/// nights are full.
#[must_use]
pub fn validate_parking(policy: ParkingPolicy, availability: &ParkingAvailability) -> ParkingValidation {
    let full_nights: Vec<String> = availability
        .full_nights()
        .map(|date| date.to_string())
        .collect();

    match policy {
        ParkingPolicy::Integral if availability.can_reserve_integral => ParkingValidation {
            is_valid: true,
            message: None,
        },
        ParkingPolicy::Integral => ParkingValidation {
            is_valid: false,
            message: Some(format!(
                "No parking spot is available for the whole stay; full on {}",
                full_nights.join(", ")
            )),
        },
        ParkingPolicy::Flexible if !availability.can_reserve_flexible => ParkingValidation {
            is_valid: false,
            message: Some(String::from(
                "No parking spot is available on any night of the stay",
            )),
        },
        ParkingPolicy::Flexible if !availability.can_reserve_integral => ParkingValidation {
            is_valid: true,
            message: Some(format!(
                "Parking is only available on some nights; full on {}",
                full_nights.join(", ")
            )),
        },
        ParkingPolicy::Flexible => ParkingValidation {
            is_valid: true,
            message: None,
        },
    }
}
