// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Channel sync service.
//!
//! Outbound syncs push pending cells to the channel manager in a single
//! call per batch. A refused or undeliverable batch marks every cell in it
//! as erred; the cells stay pending and are retried by the jobs. Inbound
//! syncs pull provider availability and write it back through the room
//! mappings.

use innsync::CalendarState;
use innsync_audit::{
    Actor, SyncCounters, SyncDirection, SyncLogEntry, SyncScope, SyncStatus, SyncType,
};
use innsync_channel::{
    AvailabilityRow, ChannelClientFactory, ChannelCredentials, ChannelManagerClient, ExternalRoom,
};
use innsync_domain::{CellValues, InclusiveDateRange, shift_date};
use innsync_persistence::{
    AvailabilityCellData, ChannelConfigurationData, Persistence, RoomMappingData,
};
use num_traits::ToPrimitive;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use time::{Date, OffsetDateTime};
use tracing::{debug, error, info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    ConfigurationJobResult, ConnectionTestResult, SyncRequest, SyncResponse, SyncResult,
};

/// Days covered by a sync request that names no end date.
pub const DEFAULT_SYNC_WINDOW_DAYS: i64 = 30;

/// Options for draining pending cells in batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSyncOptions {
    /// Days considered.
    pub window: InclusiveDateRange,
    /// Cells per provider call.
    pub batch_size: usize,
    /// Cap on cells pushed per configuration.
    pub max_items: Option<usize>,
    /// Sleep between batches.
    pub batch_pause: Duration,
    /// What initiated the sync, for the log.
    pub sync_type: SyncType,
}

enum Resolution {
    Ready(ChannelConfigurationData),
    Refused(SyncResult),
}

fn to_count(value: usize) -> u64 {
    value.to_u64().unwrap_or(u64::MAX)
}

fn completed_at(started_at: OffsetDateTime, timer: Instant) -> OffsetDateTime {
    time::Duration::try_from(timer.elapsed())
        .ok()
        .and_then(|elapsed| started_at.checked_add(elapsed))
        .unwrap_or(started_at)
}

/// Resolves the calendar window of a request.
///
/// Defaults to today through thirty days later.
///
/// # Errors
///
/// Returns an error if the window ends before it starts.
pub fn resolve_window(request: &SyncRequest, today: Date) -> Result<InclusiveDateRange, ApiError> {
    let date_from: Date = request.date_from.unwrap_or(today);
    let date_to: Date = match request.date_to {
        Some(date_to) => date_to,
        None => shift_date(date_from, DEFAULT_SYNC_WINDOW_DAYS).map_err(translate_domain_error)?,
    };
    InclusiveDateRange::new(date_from, date_to).map_err(translate_domain_error)
}

fn credentials(configuration: &ChannelConfigurationData) -> ChannelCredentials {
    ChannelCredentials {
        token: configuration.token.clone(),
        location_code: configuration.location_code.clone(),
    }
}

fn start_entry(
    configuration: &ChannelConfigurationData,
    sync_type: SyncType,
    direction: SyncDirection,
    window: &InclusiveDateRange,
    room_ids: Option<&[i64]>,
    actor: &Actor,
    now: OffsetDateTime,
) -> SyncLogEntry {
    SyncLogEntry::start(
        configuration.configuration_id,
        configuration.tenant_id,
        sync_type,
        direction,
        SyncScope {
            date_from: Some(window.start()),
            date_to: Some(window.end()),
            room_ids: room_ids.map(<[i64]>::to_vec),
        },
        actor.clone(),
        now,
    )
}

fn finish_entry(
    persistence: &mut Persistence,
    sync_log_id: i64,
    entry: &mut SyncLogEntry,
    status: SyncStatus,
    counters: SyncCounters,
    error_message: Option<String>,
    completed: OffsetDateTime,
) -> Result<(), ApiError> {
    entry
        .finish(status, counters, error_message, completed)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to finish sync log {sync_log_id}: {e}"),
        })?;
    persistence
        .finish_sync_log(sync_log_id, entry)
        .map_err(|e| translate_persistence_error("finish sync log", e))
}

/// Looks up a configuration and checks it can sync.
///
/// A missing or inactive configuration is refused without a log entry; a
/// disconnected one is refused with an `error` entry.
fn resolve_configuration(
    persistence: &mut Persistence,
    tenant_id: i64,
    request: &SyncRequest,
    direction: SyncDirection,
    window: &InclusiveDateRange,
    actor: &Actor,
    now: OffsetDateTime,
) -> Result<Resolution, ApiError> {
    let configuration_id: i64 = request.configuration_id;
    let Some(configuration) = persistence
        .get_channel_configuration(tenant_id, configuration_id)
        .map_err(|e| translate_persistence_error("load channel configuration", e))?
    else {
        warn!(tenant_id, configuration_id, "Channel configuration not found");
        return Ok(Resolution::Refused(SyncResult::failed(
            configuration_id,
            direction,
            format!("Channel configuration {configuration_id} not found"),
        )));
    };

    if !configuration.is_active {
        warn!(tenant_id, configuration_id, "Channel configuration is inactive");
        return Ok(Resolution::Refused(SyncResult::failed(
            configuration_id,
            direction,
            format!("Channel configuration {configuration_id} is not active"),
        )));
    }

    if !configuration.is_connected {
        let message: String = format!("Channel configuration {configuration_id} is not connected");
        warn!(tenant_id, configuration_id, "Refusing sync on disconnected configuration");
        let mut entry: SyncLogEntry = start_entry(
            &configuration,
            request.sync_type,
            direction,
            window,
            request.room_ids.as_deref(),
            actor,
            now,
        );
        let sync_log_id: i64 = persistence
            .insert_sync_log(&entry)
            .map_err(|e| translate_persistence_error("insert sync log", e))?;
        finish_entry(
            persistence,
            sync_log_id,
            &mut entry,
            SyncStatus::Error,
            SyncCounters::default(),
            Some(message.clone()),
            now,
        )?;
        let mut result: SyncResult = SyncResult::failed(configuration_id, direction, message);
        result.sync_log_id = Some(sync_log_id);
        return Ok(Resolution::Refused(result));
    }

    Ok(Resolution::Ready(configuration))
}

fn load_mappings(
    persistence: &mut Persistence,
    configuration: &ChannelConfigurationData,
    room_ids: Option<&[i64]>,
) -> Result<Vec<RoomMappingData>, ApiError> {
    persistence
        .list_sync_mappings(
            configuration.tenant_id,
            configuration.configuration_id,
            room_ids,
        )
        .map_err(|e| translate_persistence_error("load room mappings", e))
}

/// Translates a stored cell into a provider row.
///
/// Inactive cells are pushed as unavailable. Rates are scaled by the mapping
/// multiplier when rates sync; stay rules are sent when restrictions sync.
#[must_use]
pub fn translate_cell(cell: &AvailabilityCellData, mapping: &RoomMappingData) -> AvailabilityRow {
    let values: CellValues = cell.values;
    let rate = if mapping.sync_rates {
        values
            .rate_override
            .and_then(|rate| rate.multiplied_by(mapping.rate_multiplier))
    } else {
        None
    };
    let restrictions: bool = mapping.sync_restrictions;

    AvailabilityRow {
        room_id: mapping.external_room_id.clone(),
        date: cell.date,
        available: cell.is_active && values.is_sellable(),
        rate,
        min_stay: if restrictions { values.min_stay } else { None },
        max_stay: if restrictions { values.max_stay } else { None },
        closed_to_arrival: restrictions.then_some(values.closed_to_arrival),
        closed_to_departure: restrictions.then_some(values.closed_to_departure),
    }
}

/// Translates a provider row into cell values on top of the stored ones.
///
/// Rates are divided by the mapping multiplier. Fields the mapping does not
/// sync keep their stored value.
#[must_use]
pub fn reverse_translate_row(
    row: &AvailabilityRow,
    mapping: &RoomMappingData,
    current: CellValues,
) -> CellValues {
    let mut values: CellValues = current;
    values.is_available = row.available;
    if mapping.sync_rates
        && let Some(rate) = row.rate
    {
        values.rate_override = rate.divided_by(mapping.rate_multiplier).or(values.rate_override);
    }
    if mapping.sync_restrictions {
        if row.min_stay.is_some() {
            values.min_stay = row.min_stay;
        }
        if row.max_stay.is_some() {
            values.max_stay = row.max_stay;
        }
        if let Some(closed) = row.closed_to_arrival {
            values.closed_to_arrival = closed;
        }
        if let Some(closed) = row.closed_to_departure {
            values.closed_to_departure = closed;
        }
    }
    values
}

/// Pushes local cells to the channel manager.
///
/// Selects pending cells (every cell with `force_all`) of the mapped rooms
/// in the window, including inactive pending cells, and sends them in one
/// call. The whole batch is marked synced on success or erred on failure.
/// Nothing selected means no provider call and no log entry.
///
/// # Errors
///
/// Returns an error only if the database fails; provider failures are
/// reported in the result.
pub fn sync_to_external(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    tenant_id: i64,
    request: &SyncRequest,
    actor: &Actor,
    now: OffsetDateTime,
) -> Result<SyncResult, ApiError> {
    let direction: SyncDirection = SyncDirection::Outbound;
    let timer: Instant = Instant::now();
    let window: InclusiveDateRange = resolve_window(request, now.date())?;
    let configuration: ChannelConfigurationData = match resolve_configuration(
        persistence,
        tenant_id,
        request,
        direction,
        &window,
        actor,
        now,
    )? {
        Resolution::Ready(configuration) => configuration,
        Resolution::Refused(result) => return Ok(result),
    };
    let configuration_id: i64 = configuration.configuration_id;

    let mappings: Vec<RoomMappingData> =
        load_mappings(persistence, &configuration, request.room_ids.as_deref())?;
    if mappings.is_empty() {
        debug!(tenant_id, configuration_id, "No room mappings to sync");
        return Ok(SyncResult::empty(configuration_id, direction));
    }
    let by_room: HashMap<i64, &RoomMappingData> = mappings
        .iter()
        .map(|mapping| (mapping.room_id, mapping))
        .collect();
    let room_ids: Vec<i64> = mappings.iter().map(|mapping| mapping.room_id).collect();

    let limit: Option<i64> = request.limit.map(|limit| limit.to_i64().unwrap_or(i64::MAX));
    let cells: Vec<AvailabilityCellData> = persistence
        .select_cells_for_sync(
            tenant_id,
            &room_ids,
            window.start(),
            window.end(),
            !request.force_all,
            limit,
        )
        .map_err(|e| translate_persistence_error("select cells for sync", e))?;
    if cells.is_empty() {
        debug!(tenant_id, configuration_id, "No cells to push");
        return Ok(SyncResult::empty(configuration_id, direction));
    }

    let rows: Vec<AvailabilityRow> = cells
        .iter()
        .filter_map(|cell| {
            by_room
                .get(&cell.room_id)
                .map(|mapping| translate_cell(cell, mapping))
        })
        .collect();
    let cell_ids: Vec<i64> = cells.iter().map(|cell| cell.cell_id).collect();
    let total_items: u64 = to_count(cells.len());

    let mut entry: SyncLogEntry = start_entry(
        &configuration,
        request.sync_type,
        direction,
        &window,
        request.room_ids.as_deref(),
        actor,
        now,
    );
    let sync_log_id: i64 = persistence
        .insert_sync_log(&entry)
        .map_err(|e| translate_persistence_error("insert sync log", e))?;
    entry.mark_in_progress().map_err(|e| ApiError::Internal {
        message: format!("Failed to start sync log {sync_log_id}: {e}"),
    })?;

    info!(
        tenant_id,
        configuration_id,
        sync_log_id,
        cells = cells.len(),
        force_all = request.force_all,
        "Pushing availability to channel manager"
    );

    let pushed: Result<(), String> = factory
        .create(&credentials(&configuration))
        .and_then(|client| client.update_availability(&rows))
        .map_err(|e| e.to_string())
        .and_then(|outcome| {
            if outcome.success {
                Ok(())
            } else {
                Err(outcome
                    .message
                    .unwrap_or_else(|| String::from("Provider refused the update")))
            }
        });

    let mut result: SyncResult = SyncResult::empty(configuration_id, direction);
    result.sync_log_id = Some(sync_log_id);
    result.total_items = total_items;

    match pushed {
        Ok(()) => {
            persistence
                .mark_synced(tenant_id, &cell_ids, now)
                .map_err(|e| translate_persistence_error("mark cells synced", e))?;
            persistence
                .record_sync_success(configuration_id, now)
                .map_err(|e| translate_persistence_error("record sync success", e))?;
            result.success_items = total_items;
            result.changes_made = total_items;
            finish_entry(
                persistence,
                sync_log_id,
                &mut entry,
                SyncStatus::Success,
                SyncCounters {
                    total_items,
                    success_items: total_items,
                    error_items: 0,
                    changes_made: total_items,
                },
                None,
                completed_at(now, timer),
            )?;
            info!(tenant_id, configuration_id, sync_log_id, total_items, "Outbound sync succeeded");
        }
        Err(message) => {
            error!(
                tenant_id,
                configuration_id,
                sync_log_id,
                total_items,
                error = %message,
                "Outbound sync batch failed"
            );
            persistence
                .mark_sync_error(tenant_id, &cell_ids, &message, now)
                .map_err(|e| translate_persistence_error("mark cells erred", e))?;
            persistence
                .record_sync_failure(configuration_id, &message)
                .map_err(|e| translate_persistence_error("record sync failure", e))?;
            result.success = false;
            result.error_items = total_items;
            result.message = Some(message.clone());
            finish_entry(
                persistence,
                sync_log_id,
                &mut entry,
                SyncStatus::Error,
                SyncCounters {
                    total_items,
                    success_items: 0,
                    error_items: total_items,
                    changes_made: 0,
                },
                Some(message),
                completed_at(now, timer),
            )?;
        }
    }

    Ok(result)
}

/// Pulls provider availability into the local store.
///
/// Rows for unmapped external rooms, days outside the window, and cells with
/// local changes not yet pushed are skipped. Converted cells are stored as
/// synced.
///
/// # Errors
///
/// Returns an error only if the database fails; provider failures are
/// reported in the result.
pub fn sync_from_external(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    tenant_id: i64,
    request: &SyncRequest,
    actor: &Actor,
    now: OffsetDateTime,
) -> Result<SyncResult, ApiError> {
    let direction: SyncDirection = SyncDirection::Inbound;
    let timer: Instant = Instant::now();
    let window: InclusiveDateRange = resolve_window(request, now.date())?;
    let configuration: ChannelConfigurationData = match resolve_configuration(
        persistence,
        tenant_id,
        request,
        direction,
        &window,
        actor,
        now,
    )? {
        Resolution::Ready(configuration) => configuration,
        Resolution::Refused(result) => return Ok(result),
    };
    let configuration_id: i64 = configuration.configuration_id;

    let mappings: Vec<RoomMappingData> =
        load_mappings(persistence, &configuration, request.room_ids.as_deref())?;
    if mappings.is_empty() {
        debug!(tenant_id, configuration_id, "No room mappings to pull");
        return Ok(SyncResult::empty(configuration_id, direction));
    }
    let by_external: HashMap<&str, &RoomMappingData> = mappings
        .iter()
        .map(|mapping| (mapping.external_room_id.as_str(), mapping))
        .collect();
    let external_ids: Vec<String> = mappings
        .iter()
        .map(|mapping| mapping.external_room_id.clone())
        .collect();
    let room_ids: Vec<i64> = mappings.iter().map(|mapping| mapping.room_id).collect();

    let mut entry: SyncLogEntry = start_entry(
        &configuration,
        request.sync_type,
        direction,
        &window,
        request.room_ids.as_deref(),
        actor,
        now,
    );
    let sync_log_id: i64 = persistence
        .insert_sync_log(&entry)
        .map_err(|e| translate_persistence_error("insert sync log", e))?;
    entry.mark_in_progress().map_err(|e| ApiError::Internal {
        message: format!("Failed to start sync log {sync_log_id}: {e}"),
    })?;

    info!(
        tenant_id,
        configuration_id,
        sync_log_id,
        rooms = external_ids.len(),
        "Pulling availability from channel manager"
    );

    let fetched: Result<Vec<AvailabilityRow>, String> = factory
        .create(&credentials(&configuration))
        .and_then(|client| client.fetch_availability(window.start(), window.end(), &external_ids))
        .map_err(|e| e.to_string());

    let mut result: SyncResult = SyncResult::empty(configuration_id, direction);
    result.sync_log_id = Some(sync_log_id);

    let rows: Vec<AvailabilityRow> = match fetched {
        Ok(rows) => rows,
        Err(message) => {
            error!(tenant_id, configuration_id, sync_log_id, error = %message, "Inbound sync failed");
            persistence
                .record_sync_failure(configuration_id, &message)
                .map_err(|e| translate_persistence_error("record sync failure", e))?;
            result.success = false;
            result.message = Some(message.clone());
            finish_entry(
                persistence,
                sync_log_id,
                &mut entry,
                SyncStatus::Error,
                SyncCounters::default(),
                Some(message),
                completed_at(now, timer),
            )?;
            return Ok(result);
        }
    };

    let state: CalendarState = persistence
        .load_calendar_state(tenant_id, &room_ids, &window)
        .map_err(|e| translate_persistence_error("load calendar state", e))?;
    let unpushed: HashSet<(i64, Date)> = persistence
        .select_cells_for_sync(tenant_id, &room_ids, window.start(), window.end(), true, None)
        .map_err(|e| translate_persistence_error("select pending cells", e))?
        .iter()
        .map(|cell| (cell.room_id, cell.date))
        .collect();
    let mut skipped: usize = 0;
    let cells: Vec<(i64, Date, CellValues)> = rows
        .iter()
        .filter_map(|row| {
            let Some(mapping) = by_external.get(row.room_id.as_str()) else {
                skipped += 1;
                return None;
            };
            if !window.contains(row.date) || unpushed.contains(&(mapping.room_id, row.date)) {
                skipped += 1;
                return None;
            }
            let current: CellValues = state
                .get(mapping.room_id, row.date)
                .copied()
                .unwrap_or_default();
            Some((
                mapping.room_id,
                row.date,
                reverse_translate_row(row, mapping, current),
            ))
        })
        .collect();
    if skipped > 0 {
        debug!(tenant_id, configuration_id, skipped, "Skipped inbound rows");
    }

    let changes: usize = persistence
        .apply_inbound_cells(tenant_id, &cells, now)
        .map_err(|e| translate_persistence_error("apply inbound cells", e))?;
    persistence
        .record_sync_success(configuration_id, now)
        .map_err(|e| translate_persistence_error("record sync success", e))?;

    result.total_items = to_count(rows.len());
    result.success_items = to_count(cells.len());
    result.changes_made = to_count(changes);
    finish_entry(
        persistence,
        sync_log_id,
        &mut entry,
        SyncStatus::Success,
        SyncCounters {
            total_items: result.total_items,
            success_items: result.success_items,
            error_items: 0,
            changes_made: result.changes_made,
        },
        None,
        completed_at(now, timer),
    )?;
    info!(
        tenant_id,
        configuration_id,
        sync_log_id,
        rows = rows.len(),
        changes,
        "Inbound sync succeeded"
    );

    Ok(result)
}

/// Runs an inbound pass, then an outbound pass.
///
/// The outbound pass runs even if the inbound pass fails.
///
/// # Errors
///
/// Returns an error only if the database fails.
pub fn sync_bidirectional(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    tenant_id: i64,
    request: &SyncRequest,
    actor: &Actor,
    now: OffsetDateTime,
) -> Result<SyncResponse, ApiError> {
    let inbound: SyncResult = sync_from_external(persistence, factory, tenant_id, request, actor, now)?;
    let outbound: SyncResult = sync_to_external(persistence, factory, tenant_id, request, actor, now)?;
    Ok(SyncResponse::from_results(vec![inbound, outbound]))
}

/// Runs an operator-triggered sync in the requested direction.
///
/// # Errors
///
/// Returns an error if the actor may not sync or the database fails.
pub fn manual_sync(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    tenant_id: i64,
    request: &SyncRequest,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<SyncResponse, ApiError> {
    AuthorizationService::authorize_sync(actor)?;
    let audit_actor: Actor = actor.to_audit_actor();
    info!(
        tenant_id,
        configuration_id = request.configuration_id,
        direction = request.direction.as_str(),
        actor = %actor.id,
        "Manual sync requested"
    );

    match request.direction {
        SyncDirection::Outbound => {
            let result: SyncResult =
                sync_to_external(persistence, factory, tenant_id, request, &audit_actor, now)?;
            Ok(SyncResponse::from_results(vec![result]))
        }
        SyncDirection::Inbound => {
            let result: SyncResult =
                sync_from_external(persistence, factory, tenant_id, request, &audit_actor, now)?;
            Ok(SyncResponse::from_results(vec![result]))
        }
        SyncDirection::Bidirectional => {
            sync_bidirectional(persistence, factory, tenant_id, request, &audit_actor, now)
        }
    }
}

/// Pushes the pending cells of one configuration in batches.
///
/// Stops when nothing is pending, when `max_items` is reached, or after the
/// first failed batch.
///
/// # Errors
///
/// Returns an error if the database fails.
pub fn drain_configuration(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    configuration: &ChannelConfigurationData,
    options: &PendingSyncOptions,
    actor: &Actor,
    now: OffsetDateTime,
) -> Result<ConfigurationJobResult, ApiError> {
    let mut summary: ConfigurationJobResult =
        ConfigurationJobResult::new(configuration.configuration_id, configuration.tenant_id);
    let mut remaining: Option<usize> = options.max_items;

    loop {
        let limit: usize = remaining.map_or(options.batch_size, |left| left.min(options.batch_size));
        if limit == 0 {
            break;
        }
        let request: SyncRequest = SyncRequest {
            date_from: Some(options.window.start()),
            date_to: Some(options.window.end()),
            limit: Some(limit),
            sync_type: options.sync_type,
            ..SyncRequest::new(configuration.configuration_id)
        };
        let result: SyncResult = sync_to_external(
            persistence,
            factory,
            configuration.tenant_id,
            &request,
            actor,
            now,
        )?;
        if result.total_items == 0 && result.success {
            break;
        }
        summary.absorb(&result);
        if !result.success {
            break;
        }

        let pushed: usize = result.total_items.to_usize().unwrap_or(usize::MAX);
        if let Some(left) = remaining.as_mut() {
            *left = left.saturating_sub(pushed);
        }
        if pushed < limit {
            break;
        }
        if !options.batch_pause.is_zero() {
            std::thread::sleep(options.batch_pause);
        }
    }

    debug!(
        configuration_id = configuration.configuration_id,
        batches = summary.batches,
        total_items = summary.total_items,
        "Drained pending cells"
    );
    Ok(summary)
}

/// Pushes the tenant's pending cells through every connected configuration.
///
/// A configuration that fails does not stop the others.
///
/// # Errors
///
/// Returns an error if the configurations cannot be listed.
pub fn process_pending_sync(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    tenant_id: i64,
    options: &PendingSyncOptions,
    actor: &Actor,
    now: OffsetDateTime,
) -> Result<Vec<ConfigurationJobResult>, ApiError> {
    let configurations: Vec<ChannelConfigurationData> = persistence
        .list_active_configurations(tenant_id)
        .map_err(|e| translate_persistence_error("list channel configurations", e))?;

    let mut results: Vec<ConfigurationJobResult> = Vec::new();
    for configuration in configurations.iter().filter(|c| c.is_connected) {
        match drain_configuration(persistence, factory, configuration, options, actor, now) {
            Ok(summary) => results.push(summary),
            Err(err) => {
                warn!(
                    tenant_id,
                    configuration_id = configuration.configuration_id,
                    error = %err,
                    "Pending sync failed for configuration"
                );
                let mut summary: ConfigurationJobResult = ConfigurationJobResult::new(
                    configuration.configuration_id,
                    configuration.tenant_id,
                );
                summary.record_failure(err.to_string());
                results.push(summary);
            }
        }
    }
    Ok(results)
}

/// Verifies a configuration's credentials by listing the provider's rooms.
///
/// Stores the outcome in the configuration's connection state.
///
/// # Errors
///
/// Returns an error if the configuration does not exist, the actor may not
/// sync, or the database fails.
pub fn test_connection(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    tenant_id: i64,
    configuration_id: i64,
    actor: &AuthenticatedActor,
) -> Result<ConnectionTestResult, ApiError> {
    AuthorizationService::authorize_sync(actor)?;
    let configuration: ChannelConfigurationData = persistence
        .get_channel_configuration(tenant_id, configuration_id)
        .map_err(|e| translate_persistence_error("load channel configuration", e))?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Channel configuration"),
            message: format!("Channel configuration {configuration_id} does not exist"),
        })?;

    let fetched: Result<Vec<ExternalRoom>, String> = factory
        .create(&credentials(&configuration))
        .and_then(|client: Box<dyn ChannelManagerClient>| client.fetch_rooms())
        .map_err(|e| e.to_string());

    let result: ConnectionTestResult = match fetched {
        Ok(rooms) => {
            persistence
                .set_connection_state(configuration_id, true, None)
                .map_err(|e| translate_persistence_error("store connection state", e))?;
            info!(tenant_id, configuration_id, rooms = rooms.len(), "Channel connection verified");
            ConnectionTestResult {
                configuration_id,
                is_connected: true,
                rooms_found: rooms.len(),
                message: None,
            }
        }
        Err(message) => {
            persistence
                .set_connection_state(configuration_id, false, Some(&message))
                .map_err(|e| translate_persistence_error("store connection state", e))?;
            warn!(tenant_id, configuration_id, error = %message, "Channel connection failed");
            ConnectionTestResult {
                configuration_id,
                is_connected: false,
                rooms_found: 0,
                message: Some(message),
            }
        }
    };
    Ok(result)
}
