// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Gateway payloads.
//!
//! Dates travel as `YYYY-MM-DD` strings and rates as decimal numbers.

use innsync_domain::Amount;
use serde::{Deserialize, Serialize};
use time::Date;

/// A room as known to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRoom {
    /// Provider room identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// One room-day of availability in provider terms.
///
/// Restriction attributes are omitted when the mapping does not sync them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRow {
    /// Provider room identifier.
    pub room_id: String,
    /// The day.
    pub date: Date,
    /// Whether the room can be sold.
    pub available: bool,
    /// Nightly rate in provider terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Amount>,
    /// Minimum nights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stay: Option<u16>,
    /// Maximum nights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stay: Option<u16>,
    /// Arrival closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_to_arrival: Option<bool>,
    /// Departure closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_to_departure: Option<bool>,
}

/// The provider's answer to an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    /// True if the provider stored every row.
    pub success: bool,
    /// Provider message, usually set on failure.
    #[serde(default)]
    pub message: Option<String>,
}

impl UpdateOutcome {
    /// A successful outcome without a message.
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// A refused outcome.
    #[must_use]
    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct CredentialsBody<'a> {
    pub token: &'a str,
    pub lcode: &'a str,
}

#[derive(Serialize)]
pub(crate) struct FetchAvailabilityBody<'a> {
    #[serde(flatten)]
    pub credentials: CredentialsBody<'a>,
    pub dfrom: Date,
    pub dto: Date,
    pub rooms: &'a [String],
}

#[derive(Serialize)]
pub(crate) struct UpdateAvailabilityBody<'a> {
    #[serde(flatten)]
    pub credentials: CredentialsBody<'a>,
    pub rows: &'a [AvailabilityRow],
}

#[derive(Deserialize)]
pub(crate) struct RoomsResponse {
    pub rooms: Vec<ExternalRoom>,
}

#[derive(Deserialize)]
pub(crate) struct AvailabilityResponse {
    pub rows: Vec<AvailabilityRow>,
}
