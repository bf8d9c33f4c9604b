// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

use innsync_audit::{Actor, SyncDirection, SyncType};
use innsync_domain::{HealthStatus, SyncHealth};
use innsync_persistence::AvailabilityCellData;
use time::macros::date;
use time::{Date, OffsetDateTime};

use crate::{
    JobResult, JobSequence, RoomSyncRequest, SyncJobConfig, SyncRequest, run_error_recovery,
    run_full_sync, run_incremental_sync, run_room_sync, sync_health, sync_to_external,
};

use super::helpers::{
    FakeChannel, Fixture, TENANT, connect_channel, create_test_now, create_test_today,
    external_id, seed_pending_cells, setup_fixture,
};

const FIVE_DAYS: [Date; 5] = [
    date!(2026 - 05 - 02),
    date!(2026 - 05 - 03),
    date!(2026 - 05 - 04),
    date!(2026 - 05 - 05),
    date!(2026 - 05 - 06),
];

fn fast_config() -> SyncJobConfig {
    SyncJobConfig {
        batch_pause: Duration::ZERO,
        ..SyncJobConfig::default()
    }
}

fn all_cells(fixture: &mut Fixture) -> Vec<AvailabilityCellData> {
    let room_ids: Vec<i64> = fixture.room_ids.clone();
    fixture
        .persistence
        .list_cells(TENANT, &room_ids, date!(2026 - 05 - 01), date!(2026 - 05 - 31))
        .unwrap()
}

fn fail_once(fixture: &mut Fixture, configuration_id: i64) {
    sync_to_external(
        &mut fixture.persistence,
        &FakeChannel::refusing("Provider unavailable"),
        TENANT,
        &SyncRequest::new(configuration_id),
        &Actor::scheduler(),
        create_test_now(),
    )
    .unwrap();
}

#[test]
fn test_default_job_config() {
    let config: SyncJobConfig = SyncJobConfig::default();
    assert_eq!(config.incremental_interval, Duration::from_secs(300));
    assert_eq!(config.max_pending_per_run, 500);
    assert_eq!(config.batch_size, 50);
    assert_eq!(config.recovery_window, time::Duration::hours(24));
}

#[test]
fn test_incremental_sync_is_capped_per_run() {
    let mut fixture: Fixture = setup_fixture();
    connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let channel: FakeChannel = FakeChannel::new();
    let config: SyncJobConfig = SyncJobConfig {
        max_pending_per_run: 4,
        batch_size: 3,
        ..fast_config()
    };

    let job: JobResult =
        run_incremental_sync(&mut fixture.persistence, &channel, &config, create_test_now());

    assert!(job.success);
    assert_eq!(job.job_type, SyncType::Incremental);
    assert_eq!(job.totals.configurations, 1);
    assert_eq!(job.totals.total_items, 4);
    assert_eq!(job.configurations[0].batches, 2);
    assert_eq!(channel.update_call_count(), 2);
    let pending: usize = all_cells(&mut fixture)
        .iter()
        .filter(|cell| cell.sync_pending)
        .count();
    assert_eq!(pending, 6);
}

#[test]
fn test_incremental_sync_skips_configurations_without_pending_cells() {
    let mut fixture: Fixture = setup_fixture();
    connect_channel(&mut fixture, 1.0);
    let channel: FakeChannel = FakeChannel::new();

    let job: JobResult =
        run_incremental_sync(&mut fixture.persistence, &channel, &fast_config(), create_test_now());

    assert!(job.success);
    assert!(job.configurations.is_empty());
    assert_eq!(channel.update_call_count(), 0);
}

#[test]
fn test_incremental_sync_reports_refused_batches() {
    let mut fixture: Fixture = setup_fixture();
    connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let channel: FakeChannel = FakeChannel::refusing("Rate plan closed");

    let job: JobResult =
        run_incremental_sync(&mut fixture.persistence, &channel, &fast_config(), create_test_now());

    assert!(!job.success);
    assert!(job.error.is_none());
    assert_eq!(job.totals.failed_configurations, 1);
    assert_eq!(job.totals.error_items, 10);
    assert_eq!(job.configurations[0].errors, vec![String::from("Rate plan closed")]);
    assert_eq!(channel.update_call_count(), 1);
}

#[test]
fn test_full_sync_runs_both_directions() {
    let mut fixture: Fixture = setup_fixture();
    connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let channel: FakeChannel = FakeChannel::new();

    let job: JobResult = run_full_sync(
        &mut fixture.persistence,
        &channel,
        &fast_config(),
        create_test_now(),
    );

    assert!(job.success);
    assert_eq!(job.job_type, SyncType::Full);
    assert_eq!(job.configurations[0].batches, 2);
    assert_eq!(channel.state().fetch_calls, 1);
    assert_eq!(channel.pushed_rows().len(), 10);
}

#[test]
fn test_room_sync_pushes_every_cell_of_the_rooms() {
    let mut fixture: Fixture = setup_fixture();
    connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let channel: FakeChannel = FakeChannel::new();
    run_incremental_sync(&mut fixture.persistence, &channel, &fast_config(), create_test_now());
    let room_id: i64 = fixture.room_ids[0];

    let job: JobResult = run_room_sync(
        &mut fixture.persistence,
        &channel,
        &fast_config(),
        TENANT,
        &RoomSyncRequest {
            room_ids: vec![room_id],
            direction: SyncDirection::Outbound,
            date_from: Some(date!(2026 - 05 - 01)),
            date_to: Some(date!(2026 - 05 - 10)),
        },
        &Actor::scheduler(),
        create_test_now(),
    );

    assert!(job.success);
    assert_eq!(job.totals.total_items, 5);
    assert_eq!(channel.state().update_calls.last().unwrap().len(), 5);
}

#[test]
fn test_room_sync_without_rooms_fails() {
    let mut fixture: Fixture = setup_fixture();

    let job: JobResult = run_room_sync(
        &mut fixture.persistence,
        &FakeChannel::new(),
        &fast_config(),
        TENANT,
        &RoomSyncRequest {
            room_ids: Vec::new(),
            direction: SyncDirection::Outbound,
            date_from: None,
            date_to: None,
        },
        &Actor::scheduler(),
        create_test_now(),
    );

    assert!(!job.success);
    assert!(job.error.is_some());
}

#[test]
fn test_error_recovery_re_pushes_failed_cells() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    fail_once(&mut fixture, configuration_id);
    assert!(all_cells(&mut fixture).iter().all(|cell| cell.sync_error.is_some()));

    let channel: FakeChannel = FakeChannel::new();
    let later: OffsetDateTime = create_test_now() + time::Duration::hours(1);
    let job: JobResult =
        run_error_recovery(&mut fixture.persistence, &channel, &fast_config(), later);

    assert!(job.success);
    assert_eq!(job.job_type, SyncType::ErrorRecovery);
    assert_eq!(job.totals.success_items, 10);
    for cell in all_cells(&mut fixture) {
        assert!(cell.synced);
        assert!(!cell.sync_pending);
        assert!(cell.sync_error.is_none());
    }
}

#[test]
fn test_error_recovery_pushes_only_the_failed_cells() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    sync_to_external(
        &mut fixture.persistence,
        &FakeChannel::new(),
        TENANT,
        &SyncRequest::new(configuration_id),
        &Actor::scheduler(),
        create_test_now(),
    )
    .unwrap();

    let (first_room, second_room): (i64, i64) = (fixture.room_ids[0], fixture.room_ids[1]);
    let failed: Vec<(i64, Date)> = vec![
        (first_room, date!(2026 - 05 - 02)),
        (first_room, date!(2026 - 05 - 04)),
        (second_room, date!(2026 - 05 - 04)),
    ];
    let failed_ids: Vec<i64> = all_cells(&mut fixture)
        .iter()
        .filter(|cell| failed.contains(&(cell.room_id, cell.date)))
        .map(|cell| cell.cell_id)
        .collect();
    fixture
        .persistence
        .mark_sync_error(TENANT, &failed_ids, "Rate plan closed", create_test_now())
        .unwrap();

    let channel: FakeChannel = FakeChannel::new();
    let later: OffsetDateTime = create_test_now() + time::Duration::hours(1);
    let job: JobResult =
        run_error_recovery(&mut fixture.persistence, &channel, &fast_config(), later);

    assert!(job.success);
    assert_eq!(job.totals.success_items, 3);
    assert_eq!(channel.update_call_count(), 2);
    let mut pushed: Vec<(String, Date)> = channel
        .pushed_rows()
        .into_iter()
        .map(|row| (row.room_id, row.date))
        .collect();
    pushed.sort();
    let mut expected: Vec<(String, Date)> = failed
        .iter()
        .map(|(room_id, date)| (external_id(*room_id), *date))
        .collect();
    expected.sort();
    assert_eq!(pushed, expected);
}

#[test]
fn test_error_recovery_ignores_old_errors() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);
    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    fail_once(&mut fixture, configuration_id);

    let channel: FakeChannel = FakeChannel::new();
    let much_later: OffsetDateTime = create_test_now() + time::Duration::days(3);
    let job: JobResult =
        run_error_recovery(&mut fixture.persistence, &channel, &fast_config(), much_later);

    assert!(job.success);
    assert!(job.configurations.is_empty());
    assert_eq!(channel.update_call_count(), 0);
}

#[test]
fn test_job_ids_are_unique() {
    let mut fixture: Fixture = setup_fixture();
    let channel: FakeChannel = FakeChannel::new();
    let config: SyncJobConfig = fast_config();

    let first: JobResult =
        run_full_sync(&mut fixture.persistence, &channel, &config, create_test_now());
    let second: JobResult =
        run_full_sync(&mut fixture.persistence, &channel, &config, create_test_now());

    assert_ne!(first.job_id, second.job_id);
    assert!(first.job_id.starts_with("full-"));
}

#[test]
fn test_job_ids_follow_the_configured_sequence() {
    let mut fixture: Fixture = setup_fixture();
    let channel: FakeChannel = FakeChannel::new();
    let config: SyncJobConfig = SyncJobConfig {
        job_ids: JobSequence::starting_at(41),
        ..fast_config()
    };
    let shared: SyncJobConfig = config.clone();
    let now: OffsetDateTime = create_test_now();

    let first: JobResult = run_full_sync(&mut fixture.persistence, &channel, &config, now);
    let second: JobResult =
        run_incremental_sync(&mut fixture.persistence, &channel, &shared, now);
    let fresh: JobResult =
        run_full_sync(&mut fixture.persistence, &channel, &fast_config(), now);

    let stamp: i64 = now.unix_timestamp();
    assert_eq!(first.job_id, format!("full-{stamp}-41"));
    assert_eq!(second.job_id, format!("incremental-{stamp}-42"));
    assert_eq!(fresh.job_id, format!("full-{stamp}-1"));
}

#[test]
fn test_health_follows_sync_state() {
    let mut fixture: Fixture = setup_fixture();
    let configuration_id: i64 = connect_channel(&mut fixture, 1.0);

    let empty: SyncHealth =
        sync_health(&mut fixture.persistence, TENANT, create_test_today()).unwrap();
    assert_eq!(empty.status, HealthStatus::Healthy);

    seed_pending_cells(&mut fixture, &FIVE_DAYS);
    let backlog: SyncHealth =
        sync_health(&mut fixture.persistence, TENANT, create_test_today()).unwrap();
    assert_eq!(backlog.status, HealthStatus::Warning);
    assert!(!backlog.recommendations.is_empty());

    fail_once(&mut fixture, configuration_id);
    let failing: SyncHealth =
        sync_health(&mut fixture.persistence, TENANT, create_test_today()).unwrap();
    assert_eq!(failing.status, HealthStatus::Critical);

    run_error_recovery(
        &mut fixture.persistence,
        &FakeChannel::new(),
        &fast_config(),
        create_test_now(),
    );
    let recovered: SyncHealth =
        sync_health(&mut fixture.persistence, TENANT, create_test_today()).unwrap();
    assert_eq!(recovered.status, HealthStatus::Healthy);
    assert_eq!(recovered.counts.synced, 10);
}
