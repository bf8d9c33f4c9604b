// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Channel configuration and room mapping queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::columns::{is_set, parse_optional_timestamp};
use crate::data_models::{ChannelConfigurationData, RoomMappingData};
use crate::diesel_schema::{channel_configurations, room_mappings};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = channel_configurations)]
struct ConfigurationRow {
    configuration_id: i64,
    tenant_id: i64,
    property_id: i64,
    provider: String,
    token: String,
    location_code: String,
    is_active: i32,
    is_connected: i32,
    error_count: i32,
    last_error: Option<String>,
    last_sync_at: Option<String>,
}

impl TryFrom<ConfigurationRow> for ChannelConfigurationData {
    type Error = PersistenceError;

    fn try_from(row: ConfigurationRow) -> Result<Self, Self::Error> {
        let error_count: u32 = u32::try_from(row.error_count).map_err(|_| {
            PersistenceError::ReconstructionError(format!(
                "Invalid error_count: {}",
                row.error_count
            ))
        })?;
        Ok(Self {
            configuration_id: row.configuration_id,
            tenant_id: row.tenant_id,
            property_id: row.property_id,
            provider: row.provider,
            token: row.token,
            location_code: row.location_code,
            is_active: is_set(row.is_active),
            is_connected: is_set(row.is_connected),
            error_count,
            last_error: row.last_error,
            last_sync_at: parse_optional_timestamp(row.last_sync_at.as_deref())?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = room_mappings)]
struct MappingRow {
    mapping_id: i64,
    tenant_id: i64,
    configuration_id: i64,
    room_id: i64,
    external_room_id: String,
    sync_availability: i32,
    sync_rates: i32,
    sync_restrictions: i32,
    rate_multiplier: f64,
    is_active: i32,
}

impl From<MappingRow> for RoomMappingData {
    fn from(row: MappingRow) -> Self {
        Self {
            mapping_id: row.mapping_id,
            tenant_id: row.tenant_id,
            configuration_id: row.configuration_id,
            room_id: row.room_id,
            external_room_id: row.external_room_id,
            sync_availability: is_set(row.sync_availability),
            sync_rates: is_set(row.sync_rates),
            sync_restrictions: is_set(row.sync_restrictions),
            rate_multiplier: row.rate_multiplier,
            is_active: is_set(row.is_active),
        }
    }
}

fn convert_configurations(
    rows: Vec<ConfigurationRow>,
) -> Result<Vec<ChannelConfigurationData>, PersistenceError> {
    rows.into_iter()
        .map(ChannelConfigurationData::try_from)
        .collect()
}

/// Retrieves a configuration of the tenant, active or not.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_configuration(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    configuration_id: i64,
) -> Result<Option<ChannelConfigurationData>, PersistenceError> {
    debug!(tenant_id, configuration_id, "Looking up channel configuration");

    channel_configurations::table
        .filter(channel_configurations::tenant_id.eq(tenant_id))
        .filter(channel_configurations::configuration_id.eq(configuration_id))
        .select(ConfigurationRow::as_select())
        .first(conn)
        .optional()?
        .map(ChannelConfigurationData::try_from)
        .transpose()
}

/// Lists the active configurations of the tenant, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_active_configurations(
    conn: &mut SqliteConnection,
    tenant_id: i64,
) -> Result<Vec<ChannelConfigurationData>, PersistenceError> {
    debug!(tenant_id, "Listing active channel configurations");

    let rows: Vec<ConfigurationRow> = channel_configurations::table
        .filter(channel_configurations::tenant_id.eq(tenant_id))
        .filter(channel_configurations::is_active.eq(1))
        .order(channel_configurations::configuration_id.asc())
        .select(ConfigurationRow::as_select())
        .load(conn)?;

    convert_configurations(rows)
}

/// Lists the active and connected configurations of every tenant.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_syncable_configurations(
    conn: &mut SqliteConnection,
) -> Result<Vec<ChannelConfigurationData>, PersistenceError> {
    debug!("Listing syncable channel configurations");

    let rows: Vec<ConfigurationRow> = channel_configurations::table
        .filter(channel_configurations::is_active.eq(1))
        .filter(channel_configurations::is_connected.eq(1))
        .order((
            channel_configurations::tenant_id.asc(),
            channel_configurations::configuration_id.asc(),
        ))
        .select(ConfigurationRow::as_select())
        .load(conn)?;

    convert_configurations(rows)
}

/// Lists the active mappings of a configuration with availability sync
/// enabled, optionally limited to some rooms.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_sync_mappings(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    configuration_id: i64,
    room_ids: Option<&[i64]>,
) -> Result<Vec<RoomMappingData>, PersistenceError> {
    debug!(tenant_id, configuration_id, ?room_ids, "Listing room mappings");

    let mut query = room_mappings::table
        .filter(room_mappings::tenant_id.eq(tenant_id))
        .filter(room_mappings::configuration_id.eq(configuration_id))
        .filter(room_mappings::is_active.eq(1))
        .filter(room_mappings::sync_availability.eq(1))
        .order(room_mappings::room_id.asc())
        .select(MappingRow::as_select())
        .into_boxed();

    if let Some(room_ids) = room_ids {
        query = query.filter(room_mappings::room_id.eq_any(room_ids.to_vec()));
    }

    let rows: Vec<MappingRow> = query.load(conn)?;
    Ok(rows.into_iter().map(RoomMappingData::from).collect())
}

/// Lists the active mappings of a room across the tenant's configurations.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_room_mappings(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
) -> Result<Vec<RoomMappingData>, PersistenceError> {
    let rows: Vec<MappingRow> = room_mappings::table
        .filter(room_mappings::tenant_id.eq(tenant_id))
        .filter(room_mappings::room_id.eq(room_id))
        .filter(room_mappings::is_active.eq(1))
        .order(room_mappings::configuration_id.asc())
        .select(MappingRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(RoomMappingData::from).collect())
}
