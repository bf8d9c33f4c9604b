// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Channel configuration and room mapping mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::backend::PersistenceBackend;
use crate::columns::{flag, format_timestamp};
use crate::data_models::{NewChannelConfiguration, NewRoomMapping};
use crate::diesel_schema::{channel_configurations, room_mappings};
use crate::error::PersistenceError;

fn ensure_affected(affected: usize, configuration_id: i64) -> Result<(), PersistenceError> {
    if affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Channel configuration {configuration_id}"
        )));
    }
    Ok(())
}

/// Creates a channel configuration.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_configuration(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    configuration: &NewChannelConfiguration,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(channel_configurations::table)
        .values((
            channel_configurations::tenant_id.eq(tenant_id),
            channel_configurations::property_id.eq(configuration.property_id),
            channel_configurations::provider.eq(&configuration.provider),
            channel_configurations::token.eq(&configuration.token),
            channel_configurations::location_code.eq(&configuration.location_code),
            channel_configurations::is_active.eq(1),
            channel_configurations::is_connected.eq(flag(configuration.is_connected)),
            channel_configurations::error_count.eq(0),
        ))
        .execute(conn)?;

    let configuration_id: i64 = conn.last_insert_id()?;
    info!(
        tenant_id,
        configuration_id,
        provider = %configuration.provider,
        "Created channel configuration"
    );
    Ok(configuration_id)
}

/// Records the outcome of a connection test.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the configuration does not exist.
pub fn set_connection_state(
    conn: &mut SqliteConnection,
    configuration_id: i64,
    is_connected: bool,
    last_error: Option<&str>,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        channel_configurations::table
            .filter(channel_configurations::configuration_id.eq(configuration_id)),
    )
    .set((
        channel_configurations::is_connected.eq(flag(is_connected)),
        channel_configurations::last_error.eq(last_error),
    ))
    .execute(conn)?;

    ensure_affected(affected, configuration_id)?;
    info!(configuration_id, is_connected, "Updated channel connection state");
    Ok(())
}

/// Resets the error counter after a successful sync and stamps the sync time.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the configuration does not exist.
pub fn record_sync_success(
    conn: &mut SqliteConnection,
    configuration_id: i64,
    synced_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        channel_configurations::table
            .filter(channel_configurations::configuration_id.eq(configuration_id)),
    )
    .set((
        channel_configurations::error_count.eq(0),
        channel_configurations::last_error.eq(None::<String>),
        channel_configurations::last_sync_at.eq(Some(format_timestamp(synced_at)?)),
    ))
    .execute(conn)?;

    ensure_affected(affected, configuration_id)
}

/// Increments the error counter and records the failure message.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the configuration does not exist.
pub fn record_sync_failure(
    conn: &mut SqliteConnection,
    configuration_id: i64,
    message: &str,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        channel_configurations::table
            .filter(channel_configurations::configuration_id.eq(configuration_id)),
    )
    .set((
        channel_configurations::error_count.eq(channel_configurations::error_count + 1),
        channel_configurations::last_error.eq(Some(message)),
    ))
    .execute(conn)?;

    ensure_affected(affected, configuration_id)?;
    warn!(configuration_id, message, "Recorded channel sync failure");
    Ok(())
}

/// Creates a room mapping.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the room or the external
/// room is already mapped in the configuration.
pub fn create_room_mapping(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    mapping: &NewRoomMapping,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(room_mappings::table)
        .values((
            room_mappings::tenant_id.eq(tenant_id),
            room_mappings::configuration_id.eq(mapping.configuration_id),
            room_mappings::room_id.eq(mapping.room_id),
            room_mappings::external_room_id.eq(&mapping.external_room_id),
            room_mappings::sync_availability.eq(flag(mapping.sync_availability)),
            room_mappings::sync_rates.eq(flag(mapping.sync_rates)),
            room_mappings::sync_restrictions.eq(flag(mapping.sync_restrictions)),
            room_mappings::rate_multiplier.eq(mapping.rate_multiplier),
            room_mappings::is_active.eq(1),
        ))
        .execute(conn)?;

    let mapping_id: i64 = conn.last_insert_id()?;
    info!(
        tenant_id,
        mapping_id,
        room_id = mapping.room_id,
        external_room_id = %mapping.external_room_id,
        "Created room mapping"
    );
    Ok(mapping_id)
}
