// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod catalog_tests;
mod channel_tests;

use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

use crate::{NewChannelConfiguration, NewRoomMapping, Persistence};

pub const TENANT: i64 = 1;
pub const OTHER_TENANT: i64 = 2;

/// A seeded property with one room type and two rooms.
pub struct Seed {
    pub property_id: i64,
    pub room_type_id: i64,
    pub room_ids: Vec<i64>,
}

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-05-01 12:00:00 UTC)
}

pub fn create_test_date() -> Date {
    date!(2026 - 05 - 10)
}

pub fn seed_property(persistence: &mut Persistence, tenant_id: i64) -> Seed {
    let property_id: i64 = persistence
        .create_property(tenant_id, "Harbour View", 4)
        .unwrap();
    let room_type_id: i64 = persistence
        .create_room_type(tenant_id, property_id, "Double")
        .unwrap();
    let room_ids: Vec<i64> = ["101", "102"]
        .iter()
        .map(|number| {
            persistence
                .create_room(tenant_id, property_id, room_type_id, number)
                .unwrap()
        })
        .collect();

    Seed {
        property_id,
        room_type_id,
        room_ids,
    }
}

/// Creates a connected configuration mapping every seeded room.
pub fn seed_channel(persistence: &mut Persistence, tenant_id: i64, seed: &Seed) -> i64 {
    let configuration_id: i64 = persistence
        .create_channel_configuration(
            tenant_id,
            &NewChannelConfiguration {
                property_id: seed.property_id,
                provider: String::from("wubook"),
                token: String::from("secret-token"),
                location_code: String::from("1234"),
                is_connected: true,
            },
        )
        .unwrap();

    for room_id in &seed.room_ids {
        persistence
            .create_room_mapping(
                tenant_id,
                &NewRoomMapping {
                    configuration_id,
                    room_id: *room_id,
                    external_room_id: format!("ext-{room_id}"),
                    sync_availability: true,
                    sync_rates: true,
                    sync_restrictions: true,
                    rate_multiplier: 1.0,
                },
            )
            .unwrap();
    }

    configuration_id
}
