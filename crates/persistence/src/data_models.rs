// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use innsync_domain::{
    Amount, CellValues, DomainError, HalfOpenInterval, ReservationStatus, StayInterval,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// A stored property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyData {
    pub property_id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub parking_spots_total: u32,
    pub is_active: bool,
}

/// A stored room type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTypeData {
    pub room_type_id: i64,
    pub tenant_id: i64,
    pub property_id: i64,
    pub name: String,
    pub is_active: bool,
}

/// A stored room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomData {
    pub room_id: i64,
    pub tenant_id: i64,
    pub property_id: i64,
    pub room_type_id: i64,
    pub room_number: String,
    pub is_active: bool,
}

/// A stored availability cell with its sync state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityCellData {
    pub cell_id: i64,
    pub tenant_id: i64,
    pub room_id: i64,
    pub date: Date,
    pub values: CellValues,
    pub reason: Option<String>,
    pub is_active: bool,
    pub sync_pending: bool,
    pub synced: bool,
    pub last_sync_at: Option<OffsetDateTime>,
    pub sync_error: Option<String>,
    pub updated_at: OffsetDateTime,
}

/// A partial update of a cell. `None` leaves the attribute unchanged.
///
/// The nullable attributes use a nested option: `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPatch {
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub is_blocked: Option<bool>,
    #[serde(default)]
    pub rate_override: Option<Option<Amount>>,
    #[serde(default)]
    pub min_stay: Option<Option<u16>>,
    #[serde(default)]
    pub max_stay: Option<Option<u16>>,
    #[serde(default)]
    pub closed_to_arrival: Option<bool>,
    #[serde(default)]
    pub closed_to_departure: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl CellPatch {
    /// Writes the set attributes onto `values`.
    pub const fn apply_to(&self, values: &mut CellValues) {
        if let Some(is_available) = self.is_available {
            values.is_available = is_available;
        }
        if let Some(is_blocked) = self.is_blocked {
            values.is_blocked = is_blocked;
        }
        if let Some(rate_override) = self.rate_override {
            values.rate_override = rate_override;
        }
        if let Some(min_stay) = self.min_stay {
            values.min_stay = min_stay;
        }
        if let Some(max_stay) = self.max_stay {
            values.max_stay = max_stay;
        }
        if let Some(closed_to_arrival) = self.closed_to_arrival {
            values.closed_to_arrival = closed_to_arrival;
        }
        if let Some(closed_to_departure) = self.closed_to_departure {
            values.closed_to_departure = closed_to_departure;
        }
    }
}

/// Counts returned by a bulk upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertCounts {
    pub created: usize,
    pub updated: usize,
}

/// A reservation to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub property_id: i64,
    pub room_id: i64,
    pub reservation_number: String,
    pub guest_name: String,
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub status: ReservationStatus,
    pub requires_parking: bool,
}

/// A stored reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationData {
    pub reservation_id: i64,
    pub tenant_id: i64,
    pub property_id: i64,
    pub room_id: i64,
    pub reservation_number: String,
    pub guest_name: String,
    pub check_in_date: Date,
    pub check_out_date: Date,
    pub status: ReservationStatus,
    pub requires_parking: bool,
}

impl ReservationData {
    /// The reservation as an interval occupying its room.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored dates do not form a valid stay.
    pub fn room_stay(&self) -> Result<StayInterval, DomainError> {
        self.stay_on(self.room_id)
    }

    /// The reservation as an interval occupying the property's parking pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored dates do not form a valid stay.
    pub fn parking_stay(&self) -> Result<StayInterval, DomainError> {
        self.stay_on(self.property_id)
    }

    fn stay_on(&self, resource_id: i64) -> Result<StayInterval, DomainError> {
        Ok(StayInterval {
            id: self.reservation_id,
            reference: self.reservation_number.clone(),
            resource_id,
            interval: HalfOpenInterval::new(self.check_in_date, self.check_out_date)?,
            status: self.status,
        })
    }
}

/// A channel configuration to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannelConfiguration {
    pub property_id: i64,
    pub provider: String,
    pub token: String,
    pub location_code: String,
    pub is_connected: bool,
}

/// A stored channel-manager configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelConfigurationData {
    pub configuration_id: i64,
    pub tenant_id: i64,
    pub property_id: i64,
    pub provider: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub location_code: String,
    pub is_active: bool,
    pub is_connected: bool,
    pub error_count: u32,
    pub last_error: Option<String>,
    pub last_sync_at: Option<OffsetDateTime>,
}

/// A room mapping to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoomMapping {
    pub configuration_id: i64,
    pub room_id: i64,
    pub external_room_id: String,
    pub sync_availability: bool,
    pub sync_rates: bool,
    pub sync_restrictions: bool,
    pub rate_multiplier: f64,
}

/// A stored association between a local room and a provider room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomMappingData {
    pub mapping_id: i64,
    pub tenant_id: i64,
    pub configuration_id: i64,
    pub room_id: i64,
    pub external_room_id: String,
    pub sync_availability: bool,
    pub sync_rates: bool,
    pub sync_restrictions: bool,
    pub rate_multiplier: f64,
    pub is_active: bool,
}
