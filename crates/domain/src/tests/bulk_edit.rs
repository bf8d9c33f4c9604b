// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Amount, BulkEditOperation, CellValue, CellValues, DomainError, EditOp, EditTarget,
    OperationValue, apply_operation, compute_new_value,
};

fn number(hundredths: i64) -> Option<OperationValue> {
    Some(OperationValue::Number(Amount::from_hundredths(hundredths)))
}

#[test]
fn test_set_price_writes_literal() {
    let mut cell: CellValues = CellValues::default();
    let operation = BulkEditOperation::new(EditTarget::Price, EditOp::Set, number(15000));
    let (old, new) = apply_operation(&mut cell, &operation).unwrap();
    assert_eq!(old, CellValue::Null);
    assert_eq!(new, CellValue::Amount(Amount::from_units(150)));
    assert_eq!(cell.rate_override, Some(Amount::from_units(150)));
}

#[test]
fn test_percent_increase_then_decrease_does_not_restore_price() {
    let mut cell = CellValues {
        rate_override: Some(Amount::from_units(100)),
        ..CellValues::default()
    };
    apply_operation(
        &mut cell,
        &BulkEditOperation::new(EditTarget::Price, EditOp::IncreasePercent, number(1000)),
    )
    .unwrap();
    assert_eq!(cell.rate_override, Some(Amount::from_units(110)));

    apply_operation(
        &mut cell,
        &BulkEditOperation::new(EditTarget::Price, EditOp::DecreasePercent, number(1000)),
    )
    .unwrap();
    assert_eq!(cell.rate_override, Some(Amount::from_units(99)));
}

#[test]
fn test_price_percent_rounds_half_up_to_cents() {
    // 19.99 * 1.125 = 22.48875 -> 22.49
    let result = compute_new_value(
        EditTarget::Price,
        EditOp::IncreasePercent,
        number(1250),
        CellValue::Amount(Amount::from_hundredths(1999)),
    )
    .unwrap();
    assert_eq!(result, CellValue::Amount(Amount::from_hundredths(2249)));
}

#[test]
fn test_decreases_never_go_negative() {
    let mut cell = CellValues {
        rate_override: Some(Amount::from_units(20)),
        min_stay: Some(2),
        max_stay: Some(5),
        ..CellValues::default()
    };
    let decreases = [
        BulkEditOperation::new(EditTarget::Price, EditOp::DecreaseAmount, number(1500)),
        BulkEditOperation::new(EditTarget::Price, EditOp::DecreaseAmount, number(1500)),
        BulkEditOperation::new(EditTarget::Price, EditOp::DecreasePercent, number(25000)),
        BulkEditOperation::new(EditTarget::MinStay, EditOp::DecreaseAmount, number(700)),
        BulkEditOperation::new(EditTarget::MaxStay, EditOp::DecreasePercent, number(20000)),
        BulkEditOperation::new(EditTarget::MaxStay, EditOp::DecreaseAmount, number(100)),
    ];
    for operation in &decreases {
        apply_operation(&mut cell, operation).unwrap();
        assert!(!cell.rate_override.unwrap().is_negative());
    }
    assert_eq!(cell.rate_override, Some(Amount::ZERO));
    assert_eq!(cell.min_stay, Some(0));
    assert_eq!(cell.max_stay, Some(0));
}

#[test]
fn test_stay_increase_truncates_fraction() {
    let result = compute_new_value(
        EditTarget::MinStay,
        EditOp::IncreaseAmount,
        number(150),
        CellValue::Nights(2),
    )
    .unwrap();
    assert_eq!(result, CellValue::Nights(3));
}

#[test]
fn test_stay_arithmetic_past_the_maximum_fails() {
    let err = compute_new_value(
        EditTarget::MinStay,
        EditOp::IncreaseAmount,
        number(2000),
        CellValue::Nights(20),
    )
    .unwrap_err();
    assert_eq!(
        err,
        DomainError::StayLengthOutOfRange {
            target: EditTarget::MinStay,
            nights: 40,
            max: 30,
        }
    );

    let mut cell: CellValues = CellValues::default();
    let grow = BulkEditOperation::new(EditTarget::MaxStay, EditOp::IncreasePercent, number(1000));
    assert!(apply_operation(&mut cell, &grow).is_err());
    assert_eq!(cell, CellValues::default());

    let at_limit = compute_new_value(
        EditTarget::MaxStay,
        EditOp::IncreaseAmount,
        number(1000),
        CellValue::Nights(20),
    )
    .unwrap();
    assert_eq!(at_limit, CellValue::Nights(30));
}

#[test]
fn test_toggle_negates_flags() {
    let mut cell: CellValues = CellValues::default();
    let toggle = BulkEditOperation::new(EditTarget::ClosedToArrival, EditOp::Toggle, None);
    apply_operation(&mut cell, &toggle).unwrap();
    assert!(cell.closed_to_arrival);
    apply_operation(&mut cell, &toggle).unwrap();
    assert!(!cell.closed_to_arrival);
}

#[test]
fn test_numeric_operation_on_flag_is_rejected() {
    let result = compute_new_value(
        EditTarget::Availability,
        EditOp::IncreaseAmount,
        number(100),
        CellValue::Bool(true),
    );
    assert!(matches!(
        result,
        Err(DomainError::NumericOperationOnBoolean { .. })
    ));
}

#[test]
fn test_set_without_value_is_rejected() {
    let result = compute_new_value(EditTarget::MaxStay, EditOp::Set, None, CellValue::Null);
    assert_eq!(
        result,
        Err(DomainError::MissingOperationValue {
            target: EditTarget::MaxStay,
            op: EditOp::Set
        })
    );
}

#[test]
fn test_failed_operation_leaves_cell_untouched() {
    let mut cell: CellValues = CellValues::default();
    let before: CellValues = cell;
    let bad = BulkEditOperation::new(
        EditTarget::Blocked,
        EditOp::Set,
        number(100),
    );
    assert!(apply_operation(&mut cell, &bad).is_err());
    assert_eq!(cell, before);
}

#[test]
fn test_cell_values_serialize_as_plain_json() {
    assert_eq!(
        serde_json::to_string(&CellValue::Amount(Amount::from_units(150))).unwrap(),
        "150.0"
    );
    assert_eq!(serde_json::to_string(&CellValue::Nights(3)).unwrap(), "3");
    assert_eq!(serde_json::to_string(&CellValue::Bool(true)).unwrap(), "true");
    assert_eq!(serde_json::to_string(&CellValue::Null).unwrap(), "null");
}
