// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Occupancy and overlap evaluation over stay intervals.
//!
//! These functions are pure: callers fetch the candidate intervals and pass
//! them in. Occupancy is always recomputed from the live interval set; there
//! is no maintained counter.

use crate::dates::HalfOpenInterval;
use crate::types::ReservationStatus;
use serde::{Deserialize, Serialize};
use time::Date;

/// Anything occupying a resource over `[check_in, check_out)`.
///
/// Reservations occupy rooms; parking-requesting reservations occupy a spot
/// from the property's parking pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayInterval {
    /// The reservation identifier.
    pub id: i64,
    /// Human-facing reservation number, used in conflict diagnostics.
    pub reference: String,
    /// The occupied resource (room id, or property id for parking).
    pub resource_id: i64,
    /// The nominal stay.
    pub interval: HalfOpenInterval,
    /// The reservation status.
    pub status: ReservationStatus,
}

impl StayInterval {
    /// Returns the interval this stay effectively occupies as of a given day.
    ///
    /// A checked-in guest whose nominal check-out is on or before `as_of` has
    /// not left yet, so the stay stays open-ended until the guest checks out.
    #[must_use]
    pub fn effective_interval(&self, as_of: Date) -> HalfOpenInterval {
        if self.is_overdue(as_of) {
            self.interval.extended_to(Date::MAX)
        } else {
            self.interval
        }
    }

    /// Returns true for a checked-in stay past its nominal check-out.
    #[must_use]
    pub fn is_overdue(&self, as_of: Date) -> bool {
        self.status == ReservationStatus::CheckedIn && self.interval.end() <= as_of
    }

    /// Returns true if the stay's status occupies inventory.
    #[must_use]
    pub const fn is_occupying(&self) -> bool {
        self.status.is_active()
    }
}

/// Half-open overlap test: back-to-back stays do not overlap.
#[must_use]
pub fn has_overlap(a: &HalfOpenInterval, b: &HalfOpenInterval) -> bool {
    a.overlaps(b)
}

/// Counts intervals with `start <= target < end`.
#[must_use]
pub fn count_occupied<'a, I>(intervals: I, target: Date) -> usize
where
    I: IntoIterator<Item = &'a HalfOpenInterval>,
{
    intervals
        .into_iter()
        .filter(|interval| interval.contains(target))
        .count()
}

/// Sums, per interval, the nights shared with `[range_start, range_end)`.
#[must_use]
pub fn occupied_days_in_range<'a, I>(intervals: I, range_start: Date, range_end: Date) -> i64
where
    I: IntoIterator<Item = &'a HalfOpenInterval>,
{
    intervals
        .into_iter()
        .map(|interval| interval.intersection_nights(range_start, range_end))
        .sum()
}

/// Returns the effective intervals of the occupying stays.
///
/// Stays in terminal statuses are dropped, `exclude` (the reservation being
/// edited) is skipped, and checked-in stays are extended per
/// [`StayInterval::effective_interval`].
#[must_use]
pub fn occupying_intervals(
    stays: &[StayInterval],
    as_of: Date,
    exclude: Option<i64>,
) -> Vec<(&StayInterval, HalfOpenInterval)> {
    stays
        .iter()
        .filter(|stay| stay.is_occupying())
        .filter(|stay| exclude != Some(stay.id))
        .map(|stay| (stay, stay.effective_interval(as_of)))
        .collect()
}

/// Returns the occupying stays that overlap a candidate stay.
#[must_use]
pub fn find_conflicts<'a>(
    stays: &'a [StayInterval],
    candidate: &HalfOpenInterval,
    as_of: Date,
    exclude: Option<i64>,
) -> Vec<&'a StayInterval> {
    occupying_intervals(stays, as_of, exclude)
        .into_iter()
        .filter(|(_, effective)| has_overlap(effective, candidate))
        .map(|(stay, _)| stay)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dates::shift_date;
    use time::macros::date;

    fn interval(start: Date, end: Date) -> HalfOpenInterval {
        HalfOpenInterval::new(start, end).unwrap()
    }

    fn stay(id: i64, start: Date, end: Date, status: ReservationStatus) -> StayInterval {
        StayInterval {
            id,
            reference: format!("RES-{id}"),
            resource_id: 1,
            interval: interval(start, end),
            status,
        }
    }

    #[test]
    fn test_back_to_back_stays_do_not_overlap() {
        let a = interval(date!(2026 - 05 - 01), date!(2026 - 05 - 03));
        let b = interval(date!(2026 - 05 - 03), date!(2026 - 05 - 05));
        assert!(!has_overlap(&a, &b));
        assert!(!has_overlap(&b, &a));
    }

    #[test]
    fn test_intersecting_stays_overlap() {
        let a = interval(date!(2026 - 05 - 01), date!(2026 - 05 - 04));
        let b = interval(date!(2026 - 05 - 03), date!(2026 - 05 - 05));
        assert!(has_overlap(&a, &b));
        assert!(has_overlap(&b, &a));
    }

    #[test]
    fn test_overlap_holds_for_every_pair_in_a_grid() {
        let base = date!(2026 - 05 - 01);
        for a_start in 0..6_i64 {
            for a_len in 1..4_i64 {
                for b_start in 0..6_i64 {
                    for b_len in 1..4_i64 {
                        let a = interval(
                            shift_date(base, a_start).unwrap(),
                            shift_date(base, a_start + a_len).unwrap(),
                        );
                        let b = interval(
                            shift_date(base, b_start).unwrap(),
                            shift_date(base, b_start + b_len).unwrap(),
                        );
                        let expected = a.start() < b.end() && b.start() < a.end();
                        assert_eq!(has_overlap(&a, &b), expected, "{a:?} vs {b:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_count_occupied_excludes_departure_day() {
        let intervals = [
            interval(date!(2026 - 05 - 01), date!(2026 - 05 - 03)),
            interval(date!(2026 - 05 - 02), date!(2026 - 05 - 04)),
        ];
        assert_eq!(count_occupied(&intervals, date!(2026 - 05 - 02)), 2);
        assert_eq!(count_occupied(&intervals, date!(2026 - 05 - 03)), 1);
        assert_eq!(count_occupied(&intervals, date!(2026 - 05 - 04)), 0);
    }

    #[test]
    fn test_occupied_days_is_additive_for_disjoint_intervals() {
        let intervals = [
            interval(date!(2026 - 04 - 28), date!(2026 - 05 - 02)),
            interval(date!(2026 - 05 - 05), date!(2026 - 05 - 08)),
            interval(date!(2026 - 05 - 29), date!(2026 - 06 - 03)),
        ];
        let start = date!(2026 - 05 - 01);
        let end = date!(2026 - 06 - 01);
        let total = occupied_days_in_range(&intervals, start, end);
        let individual: i64 = intervals
            .iter()
            .map(|i| occupied_days_in_range(std::iter::once(i), start, end))
            .sum();
        assert_eq!(total, individual);
        assert_eq!(total, 1 + 3 + 3);
    }

    #[test]
    fn test_overdue_checked_in_guest_occupies_every_later_day() {
        let overdue = stay(
            1,
            date!(2026 - 05 - 01),
            date!(2026 - 05 - 03),
            ReservationStatus::CheckedIn,
        );
        let today = date!(2026 - 05 - 05);
        assert!(overdue.is_overdue(today));

        let effective = overdue.effective_interval(today);
        assert!(effective.contains(today));
        assert!(effective.contains(date!(2026 - 05 - 06)));
        assert!(effective.contains(date!(2027 - 01 - 01)));

        let next_month = HalfOpenInterval::new(date!(2026 - 06 - 01), date!(2026 - 06 - 04)).unwrap();
        assert!(has_overlap(&effective, &next_month));
    }

    #[test]
    fn test_checked_in_guest_before_checkout_keeps_nominal_interval() {
        let staying = stay(
            1,
            date!(2026 - 05 - 01),
            date!(2026 - 05 - 08),
            ReservationStatus::CheckedIn,
        );
        let today = date!(2026 - 05 - 05);
        assert!(!staying.is_overdue(today));
        assert_eq!(staying.effective_interval(today), staying.interval);
    }

    #[test]
    fn test_confirmed_stay_is_not_extended() {
        let past = stay(
            1,
            date!(2026 - 05 - 01),
            date!(2026 - 05 - 03),
            ReservationStatus::Confirmed,
        );
        let effective = past.effective_interval(date!(2026 - 05 - 05));
        assert_eq!(effective, past.interval);
    }

    #[test]
    fn test_find_conflicts_skips_terminal_and_excluded() {
        let stays = vec![
            stay(
                1,
                date!(2026 - 05 - 01),
                date!(2026 - 05 - 04),
                ReservationStatus::Confirmed,
            ),
            stay(
                2,
                date!(2026 - 05 - 01),
                date!(2026 - 05 - 04),
                ReservationStatus::Cancelled,
            ),
            stay(
                3,
                date!(2026 - 05 - 02),
                date!(2026 - 05 - 03),
                ReservationStatus::Pending,
            ),
        ];
        let candidate = interval(date!(2026 - 05 - 02), date!(2026 - 05 - 05));
        let conflicts = find_conflicts(&stays, &candidate, date!(2026 - 04 - 01), Some(3));
        let ids: Vec<i64> = conflicts.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
