// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stay rules from restrictions and availability cells.

use crate::bulk_edit::CellValues;
use crate::dates::{HalfOpenInterval, InclusiveDateRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;

/// A rate restriction over a calendar range.
///
/// A restriction with neither `room_type_id` nor `room_id` applies to the
/// whole property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// Identifier.
    pub restriction_id: i64,
    /// Owning property.
    pub property_id: i64,
    /// Limits the restriction to one room type.
    pub room_type_id: Option<i64>,
    /// Limits the restriction to one room.
    pub room_id: Option<i64>,
    /// Days covered, both endpoints included.
    pub range: InclusiveDateRange,
    /// Arrivals refused.
    pub closed_to_arrival: bool,
    /// Departures refused.
    pub closed_to_departure: bool,
    /// Minimum nights for stays arriving in the range.
    pub min_stay: Option<u16>,
    /// Maximum nights for stays arriving in the range.
    pub max_stay: Option<u16>,
    /// No sales at all.
    pub stop_sell: bool,
    /// Soft-delete flag.
    pub is_active: bool,
}

impl Restriction {
    /// Returns true if the restriction covers the room on the date.
    #[must_use]
    pub fn applies_to(&self, room_id: i64, room_type_id: i64, date: Date) -> bool {
        self.is_active
            && self.range.contains(date)
            && self.room_id.is_none_or(|id| id == room_id)
            && self.room_type_id.is_none_or(|id| id == room_type_id)
    }
}

/// A rule that blocks a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RestrictionViolation {
    /// Sales are stopped on a night of the stay.
    StopSell {
        /// The night.
        date: Date,
    },
    /// The arrival day is closed to arrival.
    ClosedToArrival {
        /// The arrival day.
        date: Date,
    },
    /// The departure day is closed to departure.
    ClosedToDeparture {
        /// The departure day.
        date: Date,
    },
    /// The stay is shorter than the minimum.
    MinStay {
        /// Required nights.
        required: u16,
        /// Requested nights.
        requested: i64,
    },
    /// The stay is longer than the maximum.
    MaxStay {
        /// Allowed nights.
        allowed: u16,
        /// Requested nights.
        requested: i64,
    },
    /// The room is not available on a night.
    Unavailable {
        /// The night.
        date: Date,
    },
    /// The room is blocked on a night.
    Blocked {
        /// The night.
        date: Date,
    },
}

impl std::fmt::Display for RestrictionViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StopSell { date } => write!(f, "Sales are stopped on {date}"),
            Self::ClosedToArrival { date } => write!(f, "Closed to arrival on {date}"),
            Self::ClosedToDeparture { date } => write!(f, "Closed to departure on {date}"),
            Self::MinStay {
                required,
                requested,
            } => write!(
                f,
                "Minimum stay is {required} nights, {requested} requested"
            ),
            Self::MaxStay { allowed, requested } => {
                write!(f, "Maximum stay is {allowed} nights, {requested} requested")
            }
            Self::Unavailable { date } => write!(f, "Room is not available on {date}"),
            Self::Blocked { date } => write!(f, "Room is blocked on {date}"),
        }
    }
}

fn push_unique(violations: &mut Vec<RestrictionViolation>, violation: RestrictionViolation) {
    if !violations.contains(&violation) {
        violations.push(violation);
    }
}

fn check_stay_length(
    violations: &mut Vec<RestrictionViolation>,
    nights: i64,
    min_stay: Option<u16>,
    max_stay: Option<u16>,
) {
    if let Some(required) = min_stay
        && nights < i64::from(required)
    {
        push_unique(
            violations,
            RestrictionViolation::MinStay {
                required,
                requested: nights,
            },
        );
    }
    if let Some(allowed) = max_stay
        && nights > i64::from(allowed)
    {
        push_unique(
            violations,
            RestrictionViolation::MaxStay {
                allowed,
                requested: nights,
            },
        );
    }
}

/// Evaluates restrictions for a stay in one room.
///
/// Stop-sell is checked on every night, closures on the arrival and
/// departure days, and stay lengths against the strictest restriction
/// covering the arrival day.
#[must_use]
pub fn evaluate_stay_restrictions(
    stay: &HalfOpenInterval,
    room_id: i64,
    room_type_id: i64,
    restrictions: &[Restriction],
) -> Vec<RestrictionViolation> {
    let mut violations: Vec<RestrictionViolation> = Vec::new();
    let applicable = |date: Date| {
        restrictions
            .iter()
            .filter(move |r| r.applies_to(room_id, room_type_id, date))
    };

    for night in stay.nights_iter() {
        if applicable(night).any(|r| r.stop_sell) {
            push_unique(&mut violations, RestrictionViolation::StopSell { date: night });
        }
    }

    let arrival: Date = stay.start();
    if applicable(arrival).any(|r| r.closed_to_arrival) {
        push_unique(
            &mut violations,
            RestrictionViolation::ClosedToArrival { date: arrival },
        );
    }
    let departure: Date = stay.end();
    if applicable(departure).any(|r| r.closed_to_departure) {
        push_unique(
            &mut violations,
            RestrictionViolation::ClosedToDeparture { date: departure },
        );
    }

    let min_stay: Option<u16> = applicable(arrival).filter_map(|r| r.min_stay).max();
    let max_stay: Option<u16> = applicable(arrival).filter_map(|r| r.max_stay).min();
    check_stay_length(&mut violations, stay.nights(), min_stay, max_stay);

    violations
}

/// Evaluates the stored availability cells of one room for a stay.
///
/// Days without a stored cell carry no rules.
#[must_use]
pub fn evaluate_cell_rules(
    stay: &HalfOpenInterval,
    cells: &BTreeMap<Date, CellValues>,
) -> Vec<RestrictionViolation> {
    let mut violations: Vec<RestrictionViolation> = Vec::new();

    for night in stay.nights_iter() {
        let Some(cell) = cells.get(&night) else {
            continue;
        };
        match (cell.is_available, cell.is_blocked) {
            (false, true) => push_unique(&mut violations, RestrictionViolation::StopSell { date: night }),
            (false, false) => {
                push_unique(&mut violations, RestrictionViolation::Unavailable { date: night });
            }
            (true, true) => push_unique(&mut violations, RestrictionViolation::Blocked { date: night }),
            (true, false) => {}
        }
    }

    if let Some(cell) = cells.get(&stay.start()) {
        if cell.closed_to_arrival {
            push_unique(
                &mut violations,
                RestrictionViolation::ClosedToArrival { date: stay.start() },
            );
        }
        check_stay_length(&mut violations, stay.nights(), cell.min_stay, cell.max_stay);
    }
    if let Some(cell) = cells.get(&stay.end())
        && cell.closed_to_departure
    {
        push_unique(
            &mut violations,
            RestrictionViolation::ClosedToDeparture { date: stay.end() },
        );
    }

    violations
}
