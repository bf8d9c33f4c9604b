// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversions between domain values and their stored column forms.
//!
//! Dates are stored as `YYYY-MM-DD` text and timestamps as UTC
//! `YYYY-MM-DDTHH:MM:SSZ` text so that both compare correctly as strings.
//! Booleans are stored as `0`/`1` integers.

use num_traits::ToPrimitive;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::PersistenceError;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

pub fn format_date(date: Date) -> Result<String, PersistenceError> {
    date.format(DATE_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("date {date}: {e}")))
}

pub fn parse_date(value: &str) -> Result<Date, PersistenceError> {
    Date::parse(value, DATE_FORMAT).map_err(|e| {
        PersistenceError::ReconstructionError(format!("Failed to parse date '{value}': {e}"))
    })
}

pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, PersistenceError> {
    timestamp
        .to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("timestamp: {e}")))
}

pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| {
            PersistenceError::ReconstructionError(format!(
                "Failed to parse timestamp '{value}': {e}"
            ))
        })
}

pub fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(parse_timestamp).transpose()
}

pub fn flag(value: bool) -> i32 {
    i32::from(value)
}

pub const fn is_set(value: i32) -> bool {
    value != 0
}

pub fn nights_to_column(value: Option<u16>) -> Option<i32> {
    value.map(i32::from)
}

pub fn nights_from_column(value: Option<i32>) -> Result<Option<u16>, PersistenceError> {
    value
        .map(|nights| {
            u16::try_from(nights).map_err(|_| {
                PersistenceError::ReconstructionError(format!("Invalid stay length: {nights}"))
            })
        })
        .transpose()
}

pub fn count_from_column(value: i64, field: &str) -> Result<u64, PersistenceError> {
    value
        .to_u64()
        .ok_or_else(|| PersistenceError::ReconstructionError(format!("Invalid {field}: {value}")))
}

pub fn count_to_column(value: u64, field: &str) -> Result<i64, PersistenceError> {
    value
        .to_i64()
        .ok_or_else(|| PersistenceError::SerializationError(format!("{field} out of range: {value}")))
}
