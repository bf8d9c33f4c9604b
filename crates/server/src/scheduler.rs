// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Periodic sync jobs.
//!
//! Each job ticks on its own interval. Ticks missed while a run is in progress
//! are skipped rather than queued.

use innsync_api::{
    JobResult, SyncJobConfig, run_error_recovery, run_full_sync, run_incremental_sync,
};
use innsync_channel::ChannelClientFactory;
use innsync_persistence::Persistence;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::AppState;

/// The scheduled jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledJob {
    /// Pushes pending cells.
    Incremental,
    /// Inbound then outbound over the full window.
    Full,
    /// Re-pushes recently failed cells.
    ErrorRecovery,
}

impl ScheduledJob {
    pub const ALL: [Self; 3] = [Self::Incremental, Self::Full, Self::ErrorRecovery];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Incremental => "incremental",
            Self::Full => "full",
            Self::ErrorRecovery => "error_recovery",
        }
    }

    #[must_use]
    pub const fn period(self, config: &SyncJobConfig) -> Duration {
        match self {
            Self::Incremental => config.incremental_interval,
            Self::Full => config.full_interval,
            Self::ErrorRecovery => config.recovery_interval,
        }
    }

    #[must_use]
    pub fn run(
        self,
        persistence: &mut Persistence,
        factory: &dyn ChannelClientFactory,
        config: &SyncJobConfig,
        now: OffsetDateTime,
    ) -> JobResult {
        match self {
            Self::Incremental => run_incremental_sync(persistence, factory, config, now),
            Self::Full => run_full_sync(persistence, factory, config, now),
            Self::ErrorRecovery => run_error_recovery(persistence, factory, config, now),
        }
    }
}

/// Logs the outcome of one run.
pub fn report(job: ScheduledJob, result: &JobResult) {
    if result.success {
        info!(
            job = job.name(),
            job_id = %result.job_id,
            configurations = result.totals.configurations,
            items = result.totals.total_items,
            changes = result.totals.changes_made,
            "Scheduled job completed"
        );
    } else if let Some(err) = &result.error {
        error!(job = job.name(), job_id = %result.job_id, error = %err, "Scheduled job failed");
    } else {
        warn!(
            job = job.name(),
            job_id = %result.job_id,
            failed_configurations = result.totals.failed_configurations,
            error_items = result.totals.error_items,
            "Scheduled job completed with failures"
        );
    }
}

fn spawn_job(app_state: AppState, job: ScheduledJob) -> JoinHandle<()> {
    let period: Duration = job.period(&app_state.job_config);
    info!(job = job.name(), period_secs = period.as_secs(), "Scheduling sync job");

    tokio::spawn(async move {
        let mut ticker: Interval = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; jobs start one period after boot.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let outcome = app_state
                .run_blocking(move |persistence, factory, config| {
                    job.run(persistence, factory, config, OffsetDateTime::now_utc())
                })
                .await;
            match outcome {
                Ok(result) => report(job, &result),
                Err(err) => error!(job = job.name(), error = %err.message, "Scheduled job aborted"),
            }
        }
    })
}

/// Starts every scheduled job on its own timer.
///
/// Jobs with a zero period are not started.
#[must_use]
pub fn spawn_jobs(app_state: &AppState) -> Vec<JoinHandle<()>> {
    ScheduledJob::ALL
        .iter()
        .filter(|job| !job.period(&app_state.job_config).is_zero())
        .map(|job| spawn_job(app_state.clone(), *job))
        .collect()
}
