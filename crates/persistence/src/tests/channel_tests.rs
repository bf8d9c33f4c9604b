// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{OTHER_TENANT, TENANT, create_test_now, seed_channel, seed_property};
use crate::{
    ChannelConfigurationData, NewRoomMapping, Persistence, PersistenceError, RoomMappingData,
};

#[test]
fn test_failures_increment_and_success_resets_error_count() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);
    let configuration_id: i64 = seed_channel(&mut persistence, TENANT, &seed);

    persistence
        .record_sync_failure(configuration_id, "timeout")
        .unwrap();
    persistence
        .record_sync_failure(configuration_id, "timeout")
        .unwrap();
    let failing: ChannelConfigurationData = persistence
        .get_channel_configuration(TENANT, configuration_id)
        .unwrap()
        .unwrap();
    assert_eq!(failing.error_count, 2);
    assert_eq!(failing.last_error.as_deref(), Some("timeout"));

    persistence
        .record_sync_success(configuration_id, create_test_now())
        .unwrap();
    let healthy: ChannelConfigurationData = persistence
        .get_channel_configuration(TENANT, configuration_id)
        .unwrap()
        .unwrap();
    assert_eq!(healthy.error_count, 0);
    assert_eq!(healthy.last_error, None);
    assert_eq!(healthy.last_sync_at, Some(create_test_now()));
}

#[test]
fn test_disconnected_configuration_is_not_syncable() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);
    let configuration_id: i64 = seed_channel(&mut persistence, TENANT, &seed);
    assert_eq!(persistence.list_syncable_configurations().unwrap().len(), 1);

    persistence
        .set_connection_state(configuration_id, false, Some("invalid token"))
        .unwrap();

    assert!(persistence.list_syncable_configurations().unwrap().is_empty());
    assert_eq!(persistence.list_active_configurations(TENANT).unwrap().len(), 1);
}

#[test]
fn test_mapping_uniqueness_per_configuration() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);
    let configuration_id: i64 = seed_channel(&mut persistence, TENANT, &seed);

    let result = persistence.create_room_mapping(
        TENANT,
        &NewRoomMapping {
            configuration_id,
            room_id: seed.room_ids[0],
            external_room_id: String::from("ext-other"),
            sync_availability: true,
            sync_rates: false,
            sync_restrictions: false,
            rate_multiplier: 1.0,
        },
    );

    assert!(matches!(result, Err(PersistenceError::UniqueViolation(_))));
}

#[test]
fn test_sync_mappings_filter_by_room() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let seed = seed_property(&mut persistence, TENANT);
    let configuration_id: i64 = seed_channel(&mut persistence, TENANT, &seed);

    let all: Vec<RoomMappingData> = persistence
        .list_sync_mappings(TENANT, configuration_id, None)
        .unwrap();
    let one: Vec<RoomMappingData> = persistence
        .list_sync_mappings(TENANT, configuration_id, Some(&seed.room_ids[..1]))
        .unwrap();
    let foreign: Vec<RoomMappingData> = persistence
        .list_sync_mappings(OTHER_TENANT, configuration_id, None)
        .unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].external_room_id, format!("ext-{}", seed.room_ids[0]));
    assert!(foreign.is_empty());
    assert_eq!(
        persistence
            .list_room_mappings(TENANT, seed.room_ids[1])
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_missing_configuration_updates_are_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert!(matches!(
        persistence.record_sync_failure(42, "boom"),
        Err(PersistenceError::NotFound(_))
    ));
}
