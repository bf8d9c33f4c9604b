// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scheduled sync jobs.
//!
//! Jobs walk every eligible channel configuration and never fail to their
//! caller: provider and database failures are isolated per configuration and
//! reported in the [`JobResult`].

use innsync_audit::{Actor, SyncDirection, SyncType};
use innsync_channel::ChannelClientFactory;
use innsync_domain::{InclusiveDateRange, SyncCounts, SyncHealth, classify_sync_health, shift_date};
use innsync_persistence::{AvailabilityCellData, ChannelConfigurationData, Persistence};
use num_traits::ToPrimitive;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::channel_sync::{
    PendingSyncOptions, drain_configuration, sync_bidirectional, sync_from_external,
    sync_to_external,
};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    ConfigurationJobResult, JobResult, JobTotals, RoomSyncRequest, SyncRequest, SyncResponse,
    SyncResult,
};

/// Days before today covered by the incremental job.
pub const INCREMENTAL_DAYS_BACK: i64 = 1;

/// Days after today covered by the incremental job.
pub const INCREMENTAL_DAYS_AHEAD: i64 = 60;

/// Days before today covered by the full job.
pub const FULL_DAYS_BACK: i64 = 1;

/// Days after today covered by the full job.
pub const FULL_DAYS_AHEAD: i64 = 30;

/// Days after today covered by the health report.
pub const HEALTH_DAYS_AHEAD: i64 = 30;

/// Source of the sequence numbers in job ids.
///
/// Clones share one counter, so every copy of a [`SyncJobConfig`] hands out
/// distinct ids.
#[derive(Debug, Clone)]
pub struct JobSequence {
    next: Arc<AtomicU64>,
}

impl JobSequence {
    /// Creates a sequence whose first value is `first`.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(first)),
        }
    }

    /// Returns the current value and advances the sequence.
    pub fn advance(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for JobSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

/// Tunables for the scheduled jobs.
#[derive(Debug, Clone)]
pub struct SyncJobConfig {
    /// Period of the incremental job.
    pub incremental_interval: Duration,
    /// Period of the full job.
    pub full_interval: Duration,
    /// Period of the error recovery job.
    pub recovery_interval: Duration,
    /// Cap on cells pushed per configuration by one incremental run.
    pub max_pending_per_run: usize,
    /// Cells per provider call.
    pub batch_size: usize,
    /// Sleep between batches.
    pub batch_pause: Duration,
    /// How far back error recovery looks for failed cells.
    pub recovery_window: time::Duration,
    /// Numbers the job ids.
    pub job_ids: JobSequence,
}

impl Default for SyncJobConfig {
    fn default() -> Self {
        Self {
            incremental_interval: Duration::from_secs(5 * 60),
            full_interval: Duration::from_secs(24 * 60 * 60),
            recovery_interval: Duration::from_secs(60 * 60),
            max_pending_per_run: 500,
            batch_size: 50,
            batch_pause: Duration::from_millis(500),
            recovery_window: time::Duration::hours(24),
            job_ids: JobSequence::default(),
        }
    }
}

struct JobRun {
    job_id: String,
    job_type: SyncType,
    started_at: OffsetDateTime,
    timer: Instant,
    error: Option<String>,
    configurations: Vec<ConfigurationJobResult>,
}

impl JobRun {
    fn start(job_type: SyncType, job_ids: &JobSequence, now: OffsetDateTime) -> Self {
        let sequence: u64 = job_ids.advance();
        let job_id: String = format!(
            "{}-{}-{sequence}",
            job_type.as_str(),
            now.unix_timestamp()
        );
        info!(job_id = %job_id, job_type = job_type.as_str(), "Sync job started");
        Self {
            job_id,
            job_type,
            started_at: now,
            timer: Instant::now(),
            error: None,
            configurations: Vec::new(),
        }
    }

    fn push(&mut self, result: ConfigurationJobResult) {
        self.configurations.push(result);
    }

    fn fail(&mut self, message: String) {
        warn!(job_id = %self.job_id, error = %message, "Sync job stopped");
        self.error = Some(message);
    }

    fn finish(self) -> JobResult {
        let mut totals: JobTotals = JobTotals::default();
        for configuration in &self.configurations {
            totals.configurations += 1;
            if !configuration.success {
                totals.failed_configurations += 1;
            }
            totals.total_items += configuration.total_items;
            totals.success_items += configuration.success_items;
            totals.error_items += configuration.error_items;
            totals.changes_made += configuration.changes_made;
        }
        let completed_at: OffsetDateTime = time::Duration::try_from(self.timer.elapsed())
            .ok()
            .and_then(|elapsed| self.started_at.checked_add(elapsed))
            .unwrap_or(self.started_at);
        let success: bool = self.error.is_none() && totals.failed_configurations == 0;

        info!(
            job_id = %self.job_id,
            job_type = self.job_type.as_str(),
            success,
            configurations = totals.configurations,
            failed_configurations = totals.failed_configurations,
            total_items = totals.total_items,
            error_items = totals.error_items,
            "Sync job finished"
        );

        JobResult {
            job_id: self.job_id,
            job_type: self.job_type,
            success,
            error: self.error,
            started_at: self.started_at,
            completed_at,
            configurations: self.configurations,
            totals,
        }
    }
}

fn window_around(
    today: Date,
    days_back: i64,
    days_ahead: i64,
) -> Result<InclusiveDateRange, ApiError> {
    let start: Date = shift_date(today, -days_back).map_err(translate_domain_error)?;
    let end: Date = shift_date(today, days_ahead).map_err(translate_domain_error)?;
    InclusiveDateRange::new(start, end).map_err(translate_domain_error)
}

fn failed_configuration(configuration: &ChannelConfigurationData, err: &ApiError) -> ConfigurationJobResult {
    warn!(
        tenant_id = configuration.tenant_id,
        configuration_id = configuration.configuration_id,
        error = %err,
        "Sync job failed for configuration"
    );
    let mut result: ConfigurationJobResult =
        ConfigurationJobResult::new(configuration.configuration_id, configuration.tenant_id);
    result.record_failure(err.to_string());
    result
}

fn response_summary(
    configuration: &ChannelConfigurationData,
    response: &SyncResponse,
) -> ConfigurationJobResult {
    let mut summary: ConfigurationJobResult =
        ConfigurationJobResult::new(configuration.configuration_id, configuration.tenant_id);
    for result in &response.results {
        summary.absorb(result);
    }
    summary
}

fn incremental_for(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    configuration: &ChannelConfigurationData,
    config: &SyncJobConfig,
    window: InclusiveDateRange,
    now: OffsetDateTime,
) -> Result<Option<ConfigurationJobResult>, ApiError> {
    let room_ids: Vec<i64> = persistence
        .list_sync_mappings(configuration.tenant_id, configuration.configuration_id, None)
        .map_err(|e| translate_persistence_error("load room mappings", e))?
        .iter()
        .map(|mapping| mapping.room_id)
        .collect();
    if room_ids.is_empty() {
        return Ok(None);
    }
    let pending: u64 = persistence
        .count_pending_cells(configuration.tenant_id, &room_ids, window.start(), window.end())
        .map_err(|e| translate_persistence_error("count pending cells", e))?;
    if pending == 0 {
        debug!(
            configuration_id = configuration.configuration_id,
            "Nothing pending for configuration"
        );
        return Ok(None);
    }

    let cap: usize = pending
        .to_usize()
        .unwrap_or(usize::MAX)
        .min(config.max_pending_per_run);
    let options: PendingSyncOptions = PendingSyncOptions {
        window,
        batch_size: config.batch_size,
        max_items: Some(cap),
        batch_pause: config.batch_pause,
        sync_type: SyncType::Incremental,
    };
    drain_configuration(
        persistence,
        factory,
        configuration,
        &options,
        &Actor::scheduler(),
        now,
    )
    .map(Some)
}

/// Pushes pending cells of every eligible configuration.
///
/// Each configuration is capped at `max_pending_per_run` cells per run.
#[must_use]
pub fn run_incremental_sync(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    config: &SyncJobConfig,
    now: OffsetDateTime,
) -> JobResult {
    let mut run: JobRun = JobRun::start(SyncType::Incremental, &config.job_ids, now);
    let window: InclusiveDateRange =
        match window_around(now.date(), INCREMENTAL_DAYS_BACK, INCREMENTAL_DAYS_AHEAD) {
            Ok(window) => window,
            Err(err) => {
                run.fail(err.to_string());
                return run.finish();
            }
        };
    let configurations: Vec<ChannelConfigurationData> =
        match persistence.list_syncable_configurations() {
            Ok(configurations) => configurations,
            Err(err) => {
                run.fail(format!("Failed to list channel configurations: {err}"));
                return run.finish();
            }
        };

    for configuration in &configurations {
        match incremental_for(persistence, factory, configuration, config, window, now) {
            Ok(Some(result)) => run.push(result),
            Ok(None) => {}
            Err(err) => run.push(failed_configuration(configuration, &err)),
        }
    }
    run.finish()
}

/// Runs a bidirectional sync for every eligible configuration.
#[must_use]
pub fn run_full_sync(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    config: &SyncJobConfig,
    now: OffsetDateTime,
) -> JobResult {
    let mut run: JobRun = JobRun::start(SyncType::Full, &config.job_ids, now);
    let window: InclusiveDateRange =
        match window_around(now.date(), FULL_DAYS_BACK, FULL_DAYS_AHEAD) {
            Ok(window) => window,
            Err(err) => {
                run.fail(err.to_string());
                return run.finish();
            }
        };
    let configurations: Vec<ChannelConfigurationData> =
        match persistence.list_syncable_configurations() {
            Ok(configurations) => configurations,
            Err(err) => {
                run.fail(format!("Failed to list channel configurations: {err}"));
                return run.finish();
            }
        };

    let actor: Actor = Actor::scheduler();
    for configuration in &configurations {
        let request: SyncRequest = SyncRequest {
            direction: SyncDirection::Bidirectional,
            date_from: Some(window.start()),
            date_to: Some(window.end()),
            sync_type: SyncType::Full,
            ..SyncRequest::new(configuration.configuration_id)
        };
        match sync_bidirectional(
            persistence,
            factory,
            configuration.tenant_id,
            &request,
            &actor,
            now,
        ) {
            Ok(response) => run.push(response_summary(configuration, &response)),
            Err(err) => run.push(failed_configuration(configuration, &err)),
        }
    }
    run.finish()
}

/// Re-syncs explicit rooms through every connected configuration of a tenant.
///
/// Every cell of the rooms in the window is pushed, pending or not.
#[must_use]
pub fn run_room_sync(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    config: &SyncJobConfig,
    tenant_id: i64,
    request: &RoomSyncRequest,
    actor: &Actor,
    now: OffsetDateTime,
) -> JobResult {
    let mut run: JobRun = JobRun::start(SyncType::RoomSpecific, &config.job_ids, now);
    if request.room_ids.is_empty() {
        run.fail(String::from("No rooms requested"));
        return run.finish();
    }
    let configurations: Vec<ChannelConfigurationData> =
        match persistence.list_active_configurations(tenant_id) {
            Ok(configurations) => configurations,
            Err(err) => {
                run.fail(format!("Failed to list channel configurations: {err}"));
                return run.finish();
            }
        };

    for configuration in configurations.iter().filter(|c| c.is_connected) {
        let sync_request: SyncRequest = SyncRequest {
            direction: request.direction,
            date_from: request.date_from,
            date_to: request.date_to,
            room_ids: Some(request.room_ids.clone()),
            force_all: true,
            sync_type: SyncType::RoomSpecific,
            ..SyncRequest::new(configuration.configuration_id)
        };
        let outcome: Result<SyncResponse, ApiError> = match request.direction {
            SyncDirection::Outbound => {
                sync_to_external(persistence, factory, tenant_id, &sync_request, actor, now)
                    .map(|result: SyncResult| SyncResponse::from_results(vec![result]))
            }
            SyncDirection::Inbound => {
                sync_from_external(persistence, factory, tenant_id, &sync_request, actor, now)
                    .map(|result: SyncResult| SyncResponse::from_results(vec![result]))
            }
            SyncDirection::Bidirectional => {
                sync_bidirectional(persistence, factory, tenant_id, &sync_request, actor, now)
            }
        };
        match outcome {
            Ok(response) => run.push(response_summary(configuration, &response)),
            Err(err) => run.push(failed_configuration(configuration, &err)),
        }
    }
    run.finish()
}

/// Failed cells to re-push through one configuration, by room.
#[derive(Debug, Default)]
struct RecoveryTarget {
    days_by_room: BTreeMap<i64, BTreeSet<Date>>,
}

impl RecoveryTarget {
    fn add(&mut self, room_id: i64, date: Date) {
        self.days_by_room.entry(room_id).or_default().insert(date);
    }

    /// Splits each room's days into runs of consecutive days and groups the
    /// rooms that share a run, so each pass covers exactly the failed cells.
    fn passes(&self) -> BTreeMap<(Date, Date), BTreeSet<i64>> {
        let mut passes: BTreeMap<(Date, Date), BTreeSet<i64>> = BTreeMap::new();
        for (room_id, days) in &self.days_by_room {
            let mut run: Option<(Date, Date)> = None;
            for day in days {
                run = match run {
                    Some((first, last)) if last.next_day() == Some(*day) => Some((first, *day)),
                    Some(finished) => {
                        passes.entry(finished).or_default().insert(*room_id);
                        Some((*day, *day))
                    }
                    None => Some((*day, *day)),
                };
            }
            if let Some(finished) = run {
                passes.entry(finished).or_default().insert(*room_id);
            }
        }
        passes
    }
}

fn recovery_targets(
    persistence: &mut Persistence,
    cells: &[AvailabilityCellData],
) -> Result<BTreeMap<(i64, i64), RecoveryTarget>, ApiError> {
    let mut configurations_by_room: HashMap<(i64, i64), Vec<i64>> = HashMap::new();
    let mut targets: BTreeMap<(i64, i64), RecoveryTarget> = BTreeMap::new();

    for cell in cells {
        let key: (i64, i64) = (cell.tenant_id, cell.room_id);
        if !configurations_by_room.contains_key(&key) {
            let configuration_ids: Vec<i64> = persistence
                .list_room_mappings(cell.tenant_id, cell.room_id)
                .map_err(|e| translate_persistence_error("load room mappings", e))?
                .iter()
                .filter(|mapping| mapping.sync_availability)
                .map(|mapping| mapping.configuration_id)
                .collect();
            configurations_by_room.insert(key, configuration_ids);
        }
        for configuration_id in configurations_by_room.get(&key).into_iter().flatten() {
            targets
                .entry((cell.tenant_id, *configuration_id))
                .or_default()
                .add(cell.room_id, cell.date);
        }
    }
    Ok(targets)
}

/// Retries cells whose push failed within the recovery window.
///
/// Clears their errors, re-marks them pending and pushes exactly those cells
/// through each mapped configuration, one pass per run of consecutive days.
#[must_use]
pub fn run_error_recovery(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    config: &SyncJobConfig,
    now: OffsetDateTime,
) -> JobResult {
    let mut run: JobRun = JobRun::start(SyncType::ErrorRecovery, &config.job_ids, now);
    let since: OffsetDateTime = now.checked_sub(config.recovery_window).unwrap_or(now);

    let cells: Vec<AvailabilityCellData> = match persistence.list_recent_sync_errors(since) {
        Ok(cells) => cells,
        Err(err) => {
            run.fail(format!("Failed to list sync errors: {err}"));
            return run.finish();
        }
    };
    if cells.is_empty() {
        debug!("No sync errors to recover");
        return run.finish();
    }

    let mut cells_by_tenant: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for cell in &cells {
        cells_by_tenant
            .entry(cell.tenant_id)
            .or_default()
            .push(cell.cell_id);
    }
    for (tenant_id, cell_ids) in &cells_by_tenant {
        if let Err(err) = persistence.reset_sync_errors(*tenant_id, cell_ids, now) {
            run.fail(format!("Failed to reset sync errors for tenant {tenant_id}: {err}"));
            return run.finish();
        }
    }
    info!(cells = cells.len(), "Re-marked failed cells pending");

    let targets: BTreeMap<(i64, i64), RecoveryTarget> =
        match recovery_targets(persistence, &cells) {
            Ok(targets) => targets,
            Err(err) => {
                run.fail(err.to_string());
                return run.finish();
            }
        };

    let actor: Actor = Actor::scheduler();
    for ((tenant_id, configuration_id), target) in targets {
        let mut summary: ConfigurationJobResult =
            ConfigurationJobResult::new(configuration_id, tenant_id);
        for ((date_from, date_to), room_ids) in target.passes() {
            let request: SyncRequest = SyncRequest {
                date_from: Some(date_from),
                date_to: Some(date_to),
                room_ids: Some(room_ids.into_iter().collect()),
                force_all: true,
                sync_type: SyncType::ErrorRecovery,
                ..SyncRequest::new(configuration_id)
            };
            match sync_to_external(persistence, factory, tenant_id, &request, &actor, now) {
                Ok(result) => summary.absorb(&result),
                Err(err) => {
                    warn!(
                        tenant_id,
                        configuration_id,
                        error = %err,
                        "Error recovery failed for configuration"
                    );
                    summary.record_failure(err.to_string());
                }
            }
        }
        run.push(summary);
    }
    run.finish()
}

/// Reports the sync health of a tenant's cells from today onwards.
///
/// # Errors
///
/// Returns an error if the cells cannot be counted.
pub fn sync_health(
    persistence: &mut Persistence,
    tenant_id: i64,
    today: Date,
) -> Result<SyncHealth, ApiError> {
    let window: InclusiveDateRange = window_around(today, 0, HEALTH_DAYS_AHEAD)?;
    let counts: SyncCounts = persistence
        .count_cells_by_sync_state(tenant_id, window.start(), window.end())
        .map_err(|e| translate_persistence_error("count cells by sync state", e))?;
    let health: SyncHealth = classify_sync_health(counts);
    debug!(
        tenant_id,
        status = health.status.as_str(),
        total = counts.total,
        "Computed sync health"
    );
    Ok(health)
}
