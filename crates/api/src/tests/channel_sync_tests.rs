// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use innsync::CellWrite;
use innsync_audit::{Actor, SyncDirection, SyncLogEntry, SyncStatus};
use innsync_channel::{AvailabilityRow, ExternalRoom};
use innsync_domain::{Amount, CellValues};
use innsync_persistence::{
    AvailabilityCellData, ChannelConfigurationData, NewChannelConfiguration,
};
use time::Date;
use time::macros::date;

use crate::{
    ApiError, SyncRequest, SyncResponse, SyncResult, manual_sync, sync_from_external,
    sync_to_external, test_connection,
};

use super::helpers::{
    FakeChannel, Fixture, TENANT, connect_channel, create_test_front_desk, create_test_manager,
    create_test_now, external_id, seed_pending_cells, setup_fixture,
};

const FIVE_DAYS: [Date; 5] = [
    date!(2026 - 05 - 02),
    date!(2026 - 05 - 03),
    date!(2026 - 05 - 04),
    date!(2026 - 05 - 05),
    date!(2026 - 05 - 06),
];

fn push(fixture: &mut Fixture, channel: &FakeChannel, request: &SyncRequest) -> SyncResult {
    sync_to_external(
        &mut fixture.persistence,
        channel,
        TENANT,
        request,
        &Actor::scheduler(),
        create_test_now(),
    )
    .unwrap()
}

fn pull(fixture: &mut Fixture, channel: &FakeChannel, request: &SyncRequest) -> SyncResult {
    sync_from_external(
        &mut fixture.persistence,
        channel,
        TENANT,
        request,
        &Actor::scheduler(),
        create_test_now(),
    )
    .unwrap()
}

fn all_cells(fixture: &mut Fixture) -> Vec<AvailabilityCellData> {
    let room_ids: Vec<i64> = fixture.room_ids.clone();
    fixture
        .persistence
        .list_cells(TENANT, &room_ids, date!(2026 - 05 - 01), date!(2026 - 05 - 31))
        .unwrap()
}

fn configuration(fixture: &mut Fixture, configuration_id: i64) -> ChannelConfigurationData {
    fixture
        .persistence
        .get_channel_configuration(TENANT, configuration_id)
        .unwrap()
        .unwrap()
}

fn sync_log(fixture: &mut Fixture, result: &SyncResult) -> SyncLogEntry {
    fixture
        .persistence
        .get_sync_log(result.sync_log_id.unwrap())
        .unwrap()
        .unwrap()
}

fn inbound_row(room_id: String, date: Date, rate: Option<Amount>) -> AvailabilityRow {
    AvailabilityRow {
        room_id,
        date,
        available: false,
        rate,
        min_stay: Some(2),
        max_stay: None,
        closed_to_arrival: Some(true),
        closed_to_departure: None,
    }
}

#[test]
fn test_refused_batch_marks_every_cell_erred() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let channel: FakeChannel = FakeChannel::refusing("Room ext-1 unknown");

    let result: SyncResult = push(&mut fixture, &channel, &SyncRequest::new(configuration_id));

    assert!(!result.success);
    assert_eq!(result.total_items, 10);
    assert_eq!(result.error_items, 10);
    assert_eq!(result.message.as_deref(), Some("Room ext-1 unknown"));
    assert_eq!(channel.update_call_count(), 1);

    let cells: Vec<AvailabilityCellData> = all_cells(&mut fixture);
    assert_eq!(cells.len(), 10);
    for cell in &cells {
        assert!(cell.sync_pending);
        assert!(!cell.synced);
        assert_eq!(cell.sync_error.as_deref(), Some("Room ext-1 unknown"));
    }

    let entry: SyncLogEntry = sync_log(&mut fixture, &result);
    assert_eq!(entry.status, SyncStatus::Error);
    assert_eq!(entry.counters.error_items, 10);
    assert_eq!(configuration(&mut fixture, configuration_id).error_count, 1);
}

#[test]
fn test_accepted_batch_marks_cells_synced() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let channel: FakeChannel = FakeChannel::new();

    let result: SyncResult = push(&mut fixture, &channel, &SyncRequest::new(configuration_id));

    assert!(result.success);
    assert_eq!(result.success_items, 10);
    assert!(all_cells(&mut fixture).iter().all(|cell| cell.synced && !cell.sync_pending));
    assert_eq!(sync_log(&mut fixture, &result).status, SyncStatus::Success);
    let stored: ChannelConfigurationData = configuration(&mut fixture, configuration_id);
    assert_eq!(stored.error_count, 0);
    assert_eq!(stored.last_sync_at, Some(create_test_now()));
}

#[test]
fn test_nothing_pending_makes_no_call_and_no_log() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let channel: FakeChannel = FakeChannel::new();
    push(&mut fixture, &channel, &SyncRequest::new(configuration_id));

    let again: SyncResult = push(&mut fixture, &channel, &SyncRequest::new(configuration_id));

    assert!(again.success);
    assert_eq!(again.total_items, 0);
    assert!(again.sync_log_id.is_none());
    assert_eq!(channel.update_call_count(), 1);

    let forced: SyncResult = push(
        &mut fixture,
        &channel,
        &SyncRequest {
            force_all: true,
            ..SyncRequest::new(configuration_id)
        },
    );
    assert_eq!(forced.total_items, 10);
    assert_eq!(channel.update_call_count(), 2);
}

#[test]
fn test_outbound_rows_apply_the_rate_multiplier() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.2);
    let room_id: i64 = fixture.room_ids[0];
    let writes: Vec<CellWrite> = vec![CellWrite {
        room_id,
        date: date!(2026 - 05 - 10),
        values: CellValues {
            rate_override: Some(Amount::from_units(100)),
            is_blocked: true,
            ..CellValues::default()
        },
        is_new: true,
    }];
    fixture
        .persistence
        .commit_cell_writes(TENANT, &writes, None, true, create_test_now())
        .unwrap();
    let channel: FakeChannel = FakeChannel::new();

    push(&mut fixture, &channel, &SyncRequest::new(configuration_id));

    let rows: Vec<AvailabilityRow> = channel.pushed_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].room_id, external_id(room_id));
    assert_eq!(rows[0].rate, Some(Amount::from_units(120)));
    assert!(!rows[0].available);
    assert_eq!(rows[0].closed_to_arrival, Some(false));
}

#[test]
fn test_limit_caps_the_batch() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let channel: FakeChannel = FakeChannel::new();

    let result: SyncResult = push(
        &mut fixture,
        &channel,
        &SyncRequest {
            limit: Some(4),
            ..SyncRequest::new(configuration_id)
        },
    );

    assert_eq!(result.total_items, 4);
    let pending: usize = all_cells(&mut fixture)
        .iter()
        .filter(|cell| cell.sync_pending)
        .count();
    assert_eq!(pending, 6);
}

#[test]
fn test_disconnected_configuration_is_refused_with_a_log() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = fixture
        .persistence
        .create_channel_configuration(
            TENANT,
            &NewChannelConfiguration {
                property_id: fixture.property_id,
                provider: String::from("wubook"),
                token: String::from("token"),
                location_code: String::from("1"),
                is_connected: false,
            },
        )
        .unwrap();
    let channel: FakeChannel = FakeChannel::new();

    let result: SyncResult = push(&mut fixture, &channel, &SyncRequest::new(configuration_id));

    assert!(!result.success);
    assert!(result.message.unwrap().contains("not connected"));
    let entry: SyncLogEntry = fixture
        .persistence
        .list_sync_logs(TENANT, configuration_id)
        .unwrap()
        .remove(0)
        .1;
    assert_eq!(entry.status, SyncStatus::Error);
    assert_eq!(channel.update_call_count(), 0);
}

#[test]
fn test_missing_configuration_is_refused_without_a_log() {
    let mut fixture: Fixture = setup_fixture();
    let result: SyncResult = push(&mut fixture, &FakeChannel::new(), &SyncRequest::new(999));

    assert!(!result.success);
    assert!(result.sync_log_id.is_none());
}

#[test]
fn test_inbound_rates_are_divided_by_the_multiplier() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.25);
    let room_id: i64 = fixture.room_ids[0];
    let channel: FakeChannel = FakeChannel::new();
    channel.state().inbound_rows = vec![
        inbound_row(
            external_id(room_id),
            date!(2026 - 05 - 10),
            Some(Amount::from_units(125)),
        ),
        inbound_row(String::from("unmapped-9"), date!(2026 - 05 - 10), None),
    ];

    let result: SyncResult = pull(
        &mut fixture,
        &channel,
        &SyncRequest {
            direction: SyncDirection::Inbound,
            ..SyncRequest::new(configuration_id)
        },
    );

    assert!(result.success);
    assert_eq!(result.total_items, 2);
    assert_eq!(result.success_items, 1);
    assert_eq!(result.changes_made, 1);

    let cell: AvailabilityCellData = fixture
        .persistence
        .get_cell(TENANT, room_id, date!(2026 - 05 - 10))
        .unwrap()
        .unwrap();
    assert_eq!(cell.values.rate_override, Some(Amount::from_units(100)));
    assert!(!cell.values.is_available);
    assert_eq!(cell.values.min_stay, Some(2));
    assert!(cell.values.closed_to_arrival);
    assert!(cell.synced);
    assert!(!cell.sync_pending);
}

#[test]
fn test_inbound_keeps_unpushed_local_edits() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &[date!(2026 - 05 - 10)]);
    let room_id: i64 = fixture.room_ids[0];
    let channel: FakeChannel = FakeChannel::new();
    channel.state().inbound_rows = vec![inbound_row(
        external_id(room_id),
        date!(2026 - 05 - 10),
        Some(Amount::from_units(80)),
    )];

    let result: SyncResult = pull(&mut fixture, &channel, &SyncRequest::new(configuration_id));

    assert_eq!(result.success_items, 0);
    let cell: AvailabilityCellData = fixture
        .persistence
        .get_cell(TENANT, room_id, date!(2026 - 05 - 10))
        .unwrap()
        .unwrap();
    assert!(cell.values.is_available);
    assert!(cell.sync_pending);
}

#[test]
fn test_inbound_transport_failure_is_logged() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    let channel: FakeChannel = FakeChannel::new();
    channel.state().fail_transport = true;

    let result: SyncResult = pull(&mut fixture, &channel, &SyncRequest::new(configuration_id));

    assert!(!result.success);
    assert_eq!(sync_log(&mut fixture, &result).status, SyncStatus::Error);
    assert_eq!(configuration(&mut fixture, configuration_id).error_count, 1);
}

#[test]
fn test_bidirectional_pulls_then_pushes() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let channel: FakeChannel = FakeChannel::new();

    let response: SyncResponse = manual_sync(
        &mut fixture.persistence,
        &channel,
        TENANT,
        &SyncRequest {
            direction: SyncDirection::Bidirectional,
            ..SyncRequest::new(configuration_id)
        },
        &create_test_manager(),
        create_test_now(),
    )
    .unwrap();

    assert!(response.success);
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].direction, SyncDirection::Inbound);
    assert_eq!(response.results[1].direction, SyncDirection::Outbound);
    assert_eq!(response.results[1].total_items, 10);
    assert_eq!(channel.state().fetch_calls, 1);
}

#[test]
fn test_manual_sync_requires_manager() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);

    let result = manual_sync(
        &mut fixture.persistence,
        &FakeChannel::new(),
        TENANT,
        &SyncRequest::new(configuration_id),
        &create_test_front_desk(),
        create_test_now(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_connection_test_stores_the_outcome() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    let channel: FakeChannel = FakeChannel::new();
    channel.state().fail_transport = true;

    let failed = test_connection(
        &mut fixture.persistence,
        &channel,
        TENANT,
        configuration_id,
        &create_test_manager(),
    )
    .unwrap();
    assert!(!failed.is_connected);
    assert!(!configuration(&mut fixture, configuration_id).is_connected);

    {
        let mut state = channel.state();
        state.fail_transport = false;
        state.rooms = vec![ExternalRoom {
            id: String::from("ext-1"),
            name: String::from("Double"),
        }];
    }
    let verified = test_connection(
        &mut fixture.persistence,
        &channel,
        TENANT,
        configuration_id,
        &create_test_manager(),
    )
    .unwrap();
    assert!(verified.is_connected);
    assert_eq!(verified.rooms_found, 1);
    assert!(configuration(&mut fixture, configuration_id).is_connected);
}
