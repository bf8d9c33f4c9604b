// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Date;

use crate::error::ChannelError;
use crate::wire::{AvailabilityRow, ExternalRoom, UpdateOutcome};

/// Credentials of one channel configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ChannelCredentials {
    /// Provider access token.
    pub token: String,
    /// Provider property (location) code.
    pub location_code: String,
}

impl std::fmt::Debug for ChannelCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelCredentials")
            .field("token", &"<redacted>")
            .field("location_code", &self.location_code)
            .finish()
    }
}

/// Operations the sync pipeline needs from a channel manager.
pub trait ChannelManagerClient {
    /// Lists the provider's rooms for this property.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or rejects the
    /// credentials.
    fn fetch_rooms(&self) -> Result<Vec<ExternalRoom>, ChannelError>;

    /// Fetches availability for `external_room_ids` over `[date_from, date_to]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn fetch_availability(
        &self,
        date_from: Date,
        date_to: Date,
        external_room_ids: &[String],
    ) -> Result<Vec<AvailabilityRow>, ChannelError>;

    /// Pushes availability rows in a single call.
    ///
    /// A delivered request the provider refuses returns an outcome with
    /// `success == false` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be delivered.
    fn update_availability(&self, rows: &[AvailabilityRow]) -> Result<UpdateOutcome, ChannelError>;
}

/// Builds a client for a configuration.
pub trait ChannelClientFactory: Send + Sync {
    /// Creates a client bound to `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed.
    fn create(
        &self,
        credentials: &ChannelCredentials,
    ) -> Result<Box<dyn ChannelManagerClient>, ChannelError>;
}
