// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Property, room type, and room queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::columns::is_set;
use crate::data_models::{PropertyData, RoomData, RoomTypeData};
use crate::diesel_schema::{properties, room_types, rooms};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = properties)]
struct PropertyRow {
    property_id: i64,
    tenant_id: i64,
    name: String,
    parking_spots_total: i32,
    is_active: i32,
}

impl TryFrom<PropertyRow> for PropertyData {
    type Error = PersistenceError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let parking_spots_total: u32 = u32::try_from(row.parking_spots_total).map_err(|_| {
            PersistenceError::ReconstructionError(format!(
                "Invalid parking_spots_total: {}",
                row.parking_spots_total
            ))
        })?;
        Ok(Self {
            property_id: row.property_id,
            tenant_id: row.tenant_id,
            name: row.name,
            parking_spots_total,
            is_active: is_set(row.is_active),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = room_types)]
struct RoomTypeRow {
    room_type_id: i64,
    tenant_id: i64,
    property_id: i64,
    name: String,
    is_active: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = rooms)]
struct RoomRow {
    room_id: i64,
    tenant_id: i64,
    property_id: i64,
    room_type_id: i64,
    room_number: String,
    is_active: i32,
}

impl From<RoomRow> for RoomData {
    fn from(row: RoomRow) -> Self {
        Self {
            room_id: row.room_id,
            tenant_id: row.tenant_id,
            property_id: row.property_id,
            room_type_id: row.room_type_id,
            room_number: row.room_number,
            is_active: is_set(row.is_active),
        }
    }
}

/// Retrieves a property of the tenant, active or not.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the property does not exist for the tenant.
pub fn get_property(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    property_id: i64,
) -> Result<Option<PropertyData>, PersistenceError> {
    debug!(tenant_id, property_id, "Looking up property");

    properties::table
        .filter(properties::tenant_id.eq(tenant_id))
        .filter(properties::property_id.eq(property_id))
        .select(PropertyRow::as_select())
        .first(conn)
        .optional()?
        .map(PropertyData::try_from)
        .transpose()
}

/// Retrieves a room type of the tenant, active or not.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_room_type(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_type_id: i64,
) -> Result<Option<RoomTypeData>, PersistenceError> {
    debug!(tenant_id, room_type_id, "Looking up room type");

    let row: Option<RoomTypeRow> = room_types::table
        .filter(room_types::tenant_id.eq(tenant_id))
        .filter(room_types::room_type_id.eq(room_type_id))
        .select(RoomTypeRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(|row| RoomTypeData {
        room_type_id: row.room_type_id,
        tenant_id: row.tenant_id,
        property_id: row.property_id,
        name: row.name,
        is_active: is_set(row.is_active),
    }))
}

/// Retrieves a room of the tenant, active or not.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_room(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    room_id: i64,
) -> Result<Option<RoomData>, PersistenceError> {
    debug!(tenant_id, room_id, "Looking up room");

    let row: Option<RoomRow> = rooms::table
        .filter(rooms::tenant_id.eq(tenant_id))
        .filter(rooms::room_id.eq(room_id))
        .select(RoomRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(RoomData::from))
}

/// Lists the active rooms of a property, ordered by room id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_active_rooms(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    property_id: i64,
) -> Result<Vec<RoomData>, PersistenceError> {
    debug!(tenant_id, property_id, "Listing active rooms");

    let rows: Vec<RoomRow> = rooms::table
        .filter(rooms::tenant_id.eq(tenant_id))
        .filter(rooms::property_id.eq(property_id))
        .filter(rooms::is_active.eq(1))
        .order(rooms::room_id.asc())
        .select(RoomRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(RoomData::from).collect())
}
