// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The bulk-edit operation model and its value computation.
//!
//! A bulk edit is a list of declarative operations applied to every
//! (room, date) cell selected by a scope and a calendar range. The value
//! computation in this module is shared by dry runs and commits so that a
//! preview always reports exactly what a commit would write.

use crate::error::DomainError;
use crate::money::{Amount, add_amount_to_whole, scale_whole_by_percent};
use crate::validation::MAX_STAY_LIMIT;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Minimum stay assumed for a cell that has none.
pub const DEFAULT_MIN_STAY: u16 = 1;
/// Maximum stay assumed for a cell that has none.
pub const DEFAULT_MAX_STAY: u16 = 30;

/// The cell attribute an operation edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditTarget {
    /// The rate override.
    Price,
    /// The `is_available` flag.
    Availability,
    /// The `is_blocked` flag.
    Blocked,
    /// Minimum length of stay.
    MinStay,
    /// Maximum length of stay.
    MaxStay,
    /// Closed to arrival.
    ClosedToArrival,
    /// Closed to departure.
    ClosedToDeparture,
    /// Composite of availability and blocked.
    StopSell,
}

impl EditTarget {
    /// Every target, in reporting order.
    pub const ALL: [Self; 8] = [
        Self::Price,
        Self::Availability,
        Self::Blocked,
        Self::MinStay,
        Self::MaxStay,
        Self::ClosedToArrival,
        Self::ClosedToDeparture,
        Self::StopSell,
    ];

    /// Returns the wire name of the target.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Availability => "availability",
            Self::Blocked => "blocked",
            Self::MinStay => "min_stay",
            Self::MaxStay => "max_stay",
            Self::ClosedToArrival => "closed_to_arrival",
            Self::ClosedToDeparture => "closed_to_departure",
            Self::StopSell => "stop_sell",
        }
    }

    /// Returns true for flag targets.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(
            self,
            Self::Availability
                | Self::Blocked
                | Self::ClosedToArrival
                | Self::ClosedToDeparture
                | Self::StopSell
        )
    }

    /// Returns true for length-of-stay targets.
    #[must_use]
    pub const fn is_stay_length(&self) -> bool {
        matches!(self, Self::MinStay | Self::MaxStay)
    }

    /// The value `clear` resets a flag target to.
    const fn cleared_flag(self) -> bool {
        matches!(self, Self::Availability)
    }
}

impl FromStr for EditTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| format!("Unknown edit target: {s}"))
    }
}

/// The transformation an operation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOp {
    /// Replace with the literal value.
    Set,
    /// Add the value.
    IncreaseAmount,
    /// Subtract the value.
    DecreaseAmount,
    /// Multiply by `1 + value / 100`.
    IncreasePercent,
    /// Multiply by `1 - value / 100`.
    DecreasePercent,
    /// Negate a flag.
    Toggle,
    /// Reset to null (or the default for flags).
    Clear,
}

impl EditOp {
    /// Returns the wire name of the operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::IncreaseAmount => "increase_amount",
            Self::DecreaseAmount => "decrease_amount",
            Self::IncreasePercent => "increase_percent",
            Self::DecreasePercent => "decrease_percent",
            Self::Toggle => "toggle",
            Self::Clear => "clear",
        }
    }

    /// Returns true if the operation needs a value.
    #[must_use]
    pub const fn requires_value(&self) -> bool {
        !matches!(self, Self::Toggle | Self::Clear)
    }

    /// Returns true for the increase / decrease family.
    #[must_use]
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::IncreaseAmount
                | Self::DecreaseAmount
                | Self::IncreasePercent
                | Self::DecreasePercent
        )
    }
}

/// The value carried by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationValue {
    /// A flag value.
    Bool(bool),
    /// A numeric value (price, nights, amount or percent).
    Number(Amount),
}

/// One declarative mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkEditOperation {
    /// The edited attribute.
    pub target: EditTarget,
    /// The transformation.
    #[serde(rename = "operation", alias = "op")]
    pub op: EditOp,
    /// The operand, if the operation takes one.
    #[serde(default)]
    pub value: Option<OperationValue>,
}

impl BulkEditOperation {
    /// Creates a new operation.
    #[must_use]
    pub const fn new(target: EditTarget, op: EditOp, value: Option<OperationValue>) -> Self {
        Self { target, op, value }
    }
}

/// How the rooms of a bulk edit are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkEditScope {
    /// Every active room of the property.
    Property,
    /// Every active room of one room type.
    RoomType,
    /// An explicit room list.
    SpecificRooms,
}

const fn default_true() -> bool {
    true
}

/// A bulk edit across a room × date matrix.
///
/// `date_from` and `date_to` are calendar-inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkEditRequest {
    /// Room selection mode.
    pub scope: BulkEditScope,
    /// The property being edited.
    pub property_id: i64,
    /// Required for the `room_type` scope.
    #[serde(default)]
    pub room_type_id: Option<i64>,
    /// Required for the `specific_rooms` scope.
    #[serde(default)]
    pub room_ids: Option<Vec<i64>>,
    /// First day edited.
    pub date_from: Date,
    /// Last day edited (included).
    pub date_to: Date,
    /// Weekday filter, `0` = Monday.
    #[serde(default)]
    pub days_of_week: Option<Vec<u8>>,
    /// The operations, applied in order to every selected cell.
    pub operations: Vec<BulkEditOperation>,
    /// Compute and report without persisting.
    #[serde(default)]
    pub dry_run: bool,
    /// Create cells that do not exist yet; otherwise skip them.
    #[serde(default = "default_true")]
    pub create_missing_records: bool,
    /// Mark edited cells pending and push them to the channel manager.
    #[serde(default = "default_true")]
    pub sync_immediately: bool,
    /// Free text stamped on every edited cell.
    #[serde(default)]
    pub reason: Option<String>,
}

/// The editable state of one availability cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellValues {
    /// Open for sale.
    pub is_available: bool,
    /// Blocked (out of order, owner use, stop sell).
    pub is_blocked: bool,
    /// Overrides the rate plan price.
    pub rate_override: Option<Amount>,
    /// Minimum length of stay.
    pub min_stay: Option<u16>,
    /// Maximum length of stay.
    pub max_stay: Option<u16>,
    /// Arrivals not accepted on this day.
    pub closed_to_arrival: bool,
    /// Departures not accepted on this day.
    pub closed_to_departure: bool,
}

impl Default for CellValues {
    fn default() -> Self {
        Self {
            is_available: true,
            is_blocked: false,
            rate_override: None,
            min_stay: Some(DEFAULT_MIN_STAY),
            max_stay: Some(DEFAULT_MAX_STAY),
            closed_to_arrival: false,
            closed_to_departure: false,
        }
    }
}

impl CellValues {
    /// Returns true if the cell can be sold.
    #[must_use]
    pub const fn is_sellable(&self) -> bool {
        self.is_available && !self.is_blocked
    }

    /// Reads the current value of a target.
    #[must_use]
    pub fn get(&self, target: EditTarget) -> CellValue {
        match target {
            EditTarget::Price => self.rate_override.map_or(CellValue::Null, CellValue::Amount),
            EditTarget::Availability => CellValue::Bool(self.is_available),
            EditTarget::Blocked => CellValue::Bool(self.is_blocked),
            EditTarget::MinStay => self.min_stay.map_or(CellValue::Null, CellValue::Nights),
            EditTarget::MaxStay => self.max_stay.map_or(CellValue::Null, CellValue::Nights),
            EditTarget::ClosedToArrival => CellValue::Bool(self.closed_to_arrival),
            EditTarget::ClosedToDeparture => CellValue::Bool(self.closed_to_departure),
            EditTarget::StopSell => CellValue::Bool(!self.is_available && self.is_blocked),
        }
    }

    /// Writes a computed value to a target.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValueTypeMismatch` if the value kind does not
    /// fit the target.
    pub fn set(&mut self, target: EditTarget, value: CellValue) -> Result<(), DomainError> {
        match (target, value) {
            (EditTarget::Price, CellValue::Amount(amount)) => self.rate_override = Some(amount),
            (EditTarget::Price, CellValue::Null) => self.rate_override = None,
            (EditTarget::MinStay, CellValue::Nights(nights)) => self.min_stay = Some(nights),
            (EditTarget::MinStay, CellValue::Null) => self.min_stay = None,
            (EditTarget::MaxStay, CellValue::Nights(nights)) => self.max_stay = Some(nights),
            (EditTarget::MaxStay, CellValue::Null) => self.max_stay = None,
            (EditTarget::Availability, CellValue::Bool(flag)) => self.is_available = flag,
            (EditTarget::Blocked, CellValue::Bool(flag)) => self.is_blocked = flag,
            (EditTarget::ClosedToArrival, CellValue::Bool(flag)) => self.closed_to_arrival = flag,
            (EditTarget::ClosedToDeparture, CellValue::Bool(flag)) => {
                self.closed_to_departure = flag;
            }
            (EditTarget::StopSell, CellValue::Bool(stop)) => {
                self.is_available = !stop;
                self.is_blocked = stop;
            }
            (target, _) => {
                return Err(DomainError::ValueTypeMismatch {
                    target,
                    expected: expected_kind(target),
                });
            }
        }
        Ok(())
    }
}

/// A typed old or new value reported for one cell edit.
///
/// Serialises to a plain JSON boolean, number or null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A flag.
    Bool(bool),
    /// A price.
    Amount(Amount),
    /// A length of stay.
    Nights(u16),
    /// No value.
    Null,
}

const fn expected_kind(target: EditTarget) -> &'static str {
    match target {
        EditTarget::Price => "a price",
        EditTarget::MinStay | EditTarget::MaxStay => "a number of nights",
        EditTarget::Availability
        | EditTarget::Blocked
        | EditTarget::ClosedToArrival
        | EditTarget::ClosedToDeparture
        | EditTarget::StopSell => "a boolean",
    }
}

fn nights_from_whole(value: i64) -> u16 {
    value.max(0).to_u16().unwrap_or(u16::MAX)
}

fn require_number(
    target: EditTarget,
    op: EditOp,
    value: Option<OperationValue>,
) -> Result<Amount, DomainError> {
    match value {
        Some(OperationValue::Number(amount)) => Ok(amount),
        Some(OperationValue::Bool(_)) => Err(DomainError::ValueTypeMismatch {
            target,
            expected: expected_kind(target),
        }),
        None => Err(DomainError::MissingOperationValue { target, op }),
    }
}

fn apply_to_price(op: EditOp, operand: Amount, price: Amount) -> Amount {
    let raw: Amount = match op {
        EditOp::IncreaseAmount => price.saturating_add(operand),
        EditOp::DecreaseAmount => price.saturating_sub(operand),
        EditOp::IncreasePercent => price.scale_by_percent(operand),
        EditOp::DecreasePercent => price.scale_by_percent(operand.negated()),
        EditOp::Set | EditOp::Toggle | EditOp::Clear => price,
    };
    raw.floored_at_zero()
}

fn apply_to_nights(op: EditOp, operand: Amount, nights: u16) -> u16 {
    let current: i64 = i64::from(nights);
    let raw: i64 = match op {
        EditOp::IncreaseAmount => add_amount_to_whole(current, operand),
        EditOp::DecreaseAmount => add_amount_to_whole(current, operand.negated()),
        EditOp::IncreasePercent => scale_whole_by_percent(current, operand),
        EditOp::DecreasePercent => scale_whole_by_percent(current, operand.negated()),
        EditOp::Set | EditOp::Toggle | EditOp::Clear => current,
    };
    nights_from_whole(raw)
}

fn within_stay_limit(target: EditTarget, nights: u16) -> Result<CellValue, DomainError> {
    let whole: i64 = i64::from(nights);
    if whole > MAX_STAY_LIMIT {
        return Err(DomainError::StayLengthOutOfRange {
            target,
            nights: whole,
            max: MAX_STAY_LIMIT,
        });
    }
    Ok(CellValue::Nights(nights))
}

/// Computes the new value of a target from its current value.
///
/// - `clear` yields null for price and stay lengths, and the default for flags.
/// - `set` yields the literal value.
/// - `toggle` negates a flag.
/// - Arithmetic on a null stay length starts from its default
///   (`min_stay` 1, `max_stay` 30); arithmetic on a null price stays null.
/// - Numeric results are floored at zero; stay lengths are truncated to whole
///   nights and prices are rounded half-up to the cent.
/// - Arithmetic that takes a stay length past [`MAX_STAY_LIMIT`] fails.
///
/// # Errors
///
/// Returns an error if a required value is missing, if the value kind does
/// not fit the target, if `toggle` / arithmetic is applied to the wrong
/// kind of target, or if a stay length would exceed the maximum.
pub fn compute_new_value(
    target: EditTarget,
    op: EditOp,
    value: Option<OperationValue>,
    current: CellValue,
) -> Result<CellValue, DomainError> {
    match op {
        EditOp::Clear => {
            if target.is_boolean() {
                Ok(CellValue::Bool(target.cleared_flag()))
            } else {
                Ok(CellValue::Null)
            }
        }
        EditOp::Toggle => match current {
            CellValue::Bool(flag) if target.is_boolean() => Ok(CellValue::Bool(!flag)),
            _ => Err(DomainError::ToggleRequiresBoolean { target }),
        },
        EditOp::Set => {
            if target.is_boolean() {
                return match value {
                    Some(OperationValue::Bool(flag)) => Ok(CellValue::Bool(flag)),
                    Some(OperationValue::Number(_)) => Err(DomainError::ValueTypeMismatch {
                        target,
                        expected: expected_kind(target),
                    }),
                    None => Err(DomainError::MissingOperationValue { target, op }),
                };
            }
            let literal: Amount = require_number(target, op, value)?;
            if target.is_stay_length() {
                Ok(CellValue::Nights(nights_from_whole(literal.truncated_units())))
            } else {
                Ok(CellValue::Amount(literal.floored_at_zero()))
            }
        }
        EditOp::IncreaseAmount
        | EditOp::DecreaseAmount
        | EditOp::IncreasePercent
        | EditOp::DecreasePercent => {
            if target.is_boolean() {
                return Err(DomainError::NumericOperationOnBoolean { target, op });
            }
            let operand: Amount = require_number(target, op, value)?;
            match (target, current) {
                (EditTarget::Price, CellValue::Null) => Ok(CellValue::Null),
                (EditTarget::Price, CellValue::Amount(price)) => {
                    Ok(CellValue::Amount(apply_to_price(op, operand, price)))
                }
                (EditTarget::MinStay, CellValue::Null) => {
                    within_stay_limit(target, apply_to_nights(op, operand, DEFAULT_MIN_STAY))
                }
                (EditTarget::MaxStay, CellValue::Null) => {
                    within_stay_limit(target, apply_to_nights(op, operand, DEFAULT_MAX_STAY))
                }
                (EditTarget::MinStay | EditTarget::MaxStay, CellValue::Nights(nights)) => {
                    within_stay_limit(target, apply_to_nights(op, operand, nights))
                }
                (target, _) => Err(DomainError::ValueTypeMismatch {
                    target,
                    expected: expected_kind(target),
                }),
            }
        }
    }
}

/// Applies one operation to a cell in place.
///
/// Returns the `(old, new)` pair for reporting.
///
/// # Errors
///
/// Returns an error if the value cannot be computed; the cell is untouched.
pub fn apply_operation(
    cell: &mut CellValues,
    operation: &BulkEditOperation,
) -> Result<(CellValue, CellValue), DomainError> {
    let old_value: CellValue = cell.get(operation.target);
    let new_value: CellValue =
        compute_new_value(operation.target, operation.op, operation.value, old_value)?;
    cell.set(operation.target, new_value)?;
    Ok((old_value, new_value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn number(hundredths: i64) -> Option<OperationValue> {
        Some(OperationValue::Number(Amount::from_hundredths(hundredths)))
    }

    #[test]
    fn test_stop_sell_true_closes_cell() {
        let mut cell = CellValues::default();
        let operation = BulkEditOperation::new(
            EditTarget::StopSell,
            EditOp::Set,
            Some(OperationValue::Bool(true)),
        );
        let (old, new) = apply_operation(&mut cell, &operation).unwrap();
        assert_eq!(old, CellValue::Bool(false));
        assert_eq!(new, CellValue::Bool(true));
        assert!(!cell.is_available);
        assert!(cell.is_blocked);
    }

    #[test]
    fn test_stop_sell_false_reopens_cell() {
        let mut cell = CellValues {
            is_available: false,
            is_blocked: true,
            ..CellValues::default()
        };
        let operation = BulkEditOperation::new(
            EditTarget::StopSell,
            EditOp::Set,
            Some(OperationValue::Bool(false)),
        );
        apply_operation(&mut cell, &operation).unwrap();
        assert!(cell.is_available);
        assert!(!cell.is_blocked);
    }

    #[test]
    fn test_arithmetic_on_null_price_stays_null() {
        let result = compute_new_value(
            EditTarget::Price,
            EditOp::IncreaseAmount,
            number(1000),
            CellValue::Null,
        )
        .unwrap();
        assert_eq!(result, CellValue::Null);
    }

    #[test]
    fn test_arithmetic_on_null_stay_uses_default() {
        let min = compute_new_value(
            EditTarget::MinStay,
            EditOp::IncreaseAmount,
            number(200),
            CellValue::Null,
        )
        .unwrap();
        assert_eq!(min, CellValue::Nights(3));

        let max = compute_new_value(
            EditTarget::MaxStay,
            EditOp::DecreasePercent,
            number(1000),
            CellValue::Null,
        )
        .unwrap();
        assert_eq!(max, CellValue::Nights(27));
    }

    #[test]
    fn test_toggle_rejects_numeric_target() {
        let result = compute_new_value(
            EditTarget::Price,
            EditOp::Toggle,
            None,
            CellValue::Amount(Amount::from_units(100)),
        );
        assert!(matches!(
            result,
            Err(DomainError::ToggleRequiresBoolean {
                target: EditTarget::Price
            })
        ));
    }

    #[test]
    fn test_clear_resets_flags_to_default() {
        assert_eq!(
            compute_new_value(
                EditTarget::Availability,
                EditOp::Clear,
                None,
                CellValue::Bool(false)
            )
            .unwrap(),
            CellValue::Bool(true)
        );
        assert_eq!(
            compute_new_value(
                EditTarget::Blocked,
                EditOp::Clear,
                None,
                CellValue::Bool(true)
            )
            .unwrap(),
            CellValue::Bool(false)
        );
        assert_eq!(
            compute_new_value(
                EditTarget::MinStay,
                EditOp::Clear,
                None,
                CellValue::Nights(4)
            )
            .unwrap(),
            CellValue::Null
        );
    }

    #[test]
    fn test_operation_deserializes_from_wire_names() {
        let json = r#"{"target":"price","operation":"increase_percent","value":12.5}"#;
        let operation: BulkEditOperation = serde_json::from_str(json).unwrap();
        assert_eq!(operation.target, EditTarget::Price);
        assert_eq!(operation.op, EditOp::IncreasePercent);
        assert_eq!(operation.value, number(1250));

        let json = r#"{"target":"blocked","op":"set","value":true}"#;
        let operation: BulkEditOperation = serde_json::from_str(json).unwrap();
        assert_eq!(operation.value, Some(OperationValue::Bool(true)));
    }

    #[test]
    fn test_request_defaults() {
        let json = r#"{
            "scope": "property",
            "property_id": 1,
            "date_from": "2026-05-01",
            "date_to": "2026-05-03",
            "operations": []
        }"#;
        let request: BulkEditRequest = serde_json::from_str(json).unwrap();
        assert!(!request.dry_run);
        assert!(request.create_missing_records);
        assert!(request.sync_immediately);
        assert_eq!(request.days_of_week, None);
    }
}
