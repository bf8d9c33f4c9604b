// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

use innsync_api::{JobResult, SyncJobConfig};
use innsync_audit::SyncType;
use time::OffsetDateTime;

use crate::AppState;
use crate::scheduler::{ScheduledJob, spawn_jobs};

use super::helpers::{TestServer, create_test_server, fast_job_config};

#[test]
fn test_each_job_uses_its_own_period() {
    let config: SyncJobConfig = SyncJobConfig {
        incremental_interval: Duration::from_secs(1),
        full_interval: Duration::from_secs(2),
        recovery_interval: Duration::from_secs(3),
        ..fast_job_config()
    };

    let periods: Vec<Duration> = ScheduledJob::ALL
        .iter()
        .map(|job| job.period(&config))
        .collect();

    assert_eq!(
        periods,
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(3)
        ]
    );
}

#[tokio::test]
async fn test_jobs_with_zero_period_are_not_started() {
    let server: TestServer = create_test_server();
    let mut app_state: AppState = server.app_state.clone();
    app_state.job_config.full_interval = Duration::ZERO;
    app_state.job_config.recovery_interval = Duration::ZERO;

    let handles = spawn_jobs(&app_state);

    assert_eq!(handles.len(), 1);
    for handle in handles {
        handle.abort();
    }
}

#[tokio::test]
async fn test_scheduled_run_reports_job_type() {
    let server: TestServer = create_test_server();

    let result: JobResult = server
        .app_state
        .run_blocking(|persistence, factory, config| {
            ScheduledJob::Incremental.run(persistence, factory, config, OffsetDateTime::now_utc())
        })
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.job_type, SyncType::Incremental);
    assert!(server.channel.pushed_batches().is_empty());
}
