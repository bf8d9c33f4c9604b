// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use innsync_domain::{
    Amount, BulkEditOperation, BulkEditRequest, BulkEditScope, EditOp, EditTarget,
    OperationValue,
};
use time::Date;
use time::macros::date;

pub fn create_test_dates() -> Vec<Date> {
    vec![
        date!(2026 - 05 - 01),
        date!(2026 - 05 - 02),
        date!(2026 - 05 - 03),
    ]
}

pub fn set_price(units: i64) -> BulkEditOperation {
    BulkEditOperation::new(
        EditTarget::Price,
        EditOp::Set,
        Some(OperationValue::Number(Amount::from_units(units))),
    )
}

pub fn create_test_request(scope: BulkEditScope) -> BulkEditRequest {
    BulkEditRequest {
        scope,
        property_id: 1,
        room_type_id: None,
        room_ids: None,
        date_from: date!(2026 - 05 - 01),
        date_to: date!(2026 - 05 - 03),
        days_of_week: None,
        operations: vec![set_price(150)],
        dry_run: false,
        create_missing_records: true,
        sync_immediately: true,
        reason: None,
    }
}
