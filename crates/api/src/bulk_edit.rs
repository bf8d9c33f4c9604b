// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk edit execution.
//!
//! A request is validated, resolved to a room × date matrix, planned against
//! a snapshot of the stored cells and, unless it is a dry run, committed in
//! one transaction. A committed edit that asks for it is then pushed to the
//! channel manager; a failed push is reported but never undoes the edit.

use innsync::{
    BulkEditPlan, CalendarState, ItemOutcome, RoomRef, plan_bulk_edit, resolve_rooms,
    select_dates,
};
use innsync_audit::{SyncStatus, SyncType};
use innsync_channel::ChannelClientFactory;
use innsync_domain::{
    BulkEditRequest, BulkEditScope, InclusiveDateRange, ValidationError,
    validate_bulk_edit_request,
};
use innsync_persistence::{Persistence, PropertyData, RoomData, RoomTypeData};
use num_traits::ToPrimitive;
use std::time::{Duration, Instant};
use time::{Date, OffsetDateTime};
use tracing::{error, info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::channel_sync::{PendingSyncOptions, process_pending_sync};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    BulkEditItemResult, BulkEditResult, ConfigurationJobResult, SyncTriggerResult, TargetSummary,
};

/// Cells per provider call when a bulk edit triggers a sync.
pub const BULK_EDIT_SYNC_BATCH_SIZE: usize = 100;

/// Error messages kept in a triggered sync's outcome.
pub const MAX_SAMPLE_ERRORS: usize = 3;

fn check_references(
    persistence: &mut Persistence,
    tenant_id: i64,
    request: &BulkEditRequest,
) -> Result<Vec<ValidationError>, ApiError> {
    let mut errors: Vec<ValidationError> = Vec::new();

    let property: Option<PropertyData> = persistence
        .get_property(tenant_id, request.property_id)
        .map_err(|e| translate_persistence_error("load property", e))?;
    match property {
        None => errors.push(ValidationError::new(
            "property_id",
            format!("Property {} does not exist", request.property_id),
        )),
        Some(property) if !property.is_active => errors.push(ValidationError::new(
            "property_id",
            format!("Property {} is not active", request.property_id),
        )),
        Some(_) => {}
    }

    if request.scope == BulkEditScope::RoomType
        && let Some(room_type_id) = request.room_type_id
    {
        let room_type: Option<RoomTypeData> = persistence
            .get_room_type(tenant_id, room_type_id)
            .map_err(|e| translate_persistence_error("load room type", e))?;
        match room_type {
            None => errors.push(ValidationError::new(
                "room_type_id",
                format!("Room type {room_type_id} does not exist"),
            )),
            Some(room_type) if room_type.property_id != request.property_id => {
                errors.push(ValidationError::new(
                    "room_type_id",
                    format!(
                        "Room type {room_type_id} does not belong to property {}",
                        request.property_id
                    ),
                ));
            }
            Some(room_type) if !room_type.is_active => errors.push(ValidationError::new(
                "room_type_id",
                format!("Room type {room_type_id} is not active"),
            )),
            Some(_) => {}
        }
    }

    Ok(errors)
}

fn fail_applied_items(plan: &mut BulkEditPlan, message: &str) {
    for item in &mut plan.items {
        if item.outcome.is_applied() {
            item.outcome = ItemOutcome::Failed {
                error_message: String::from(message),
            };
        }
    }
}

fn summarize(result: &mut BulkEditResult, plan: &BulkEditPlan) {
    for item in &plan.items {
        let summary: &mut TargetSummary = result.results_by_target.entry(item.target).or_default();
        summary.total += 1;
        match &item.outcome {
            ItemOutcome::Applied { created_record, .. } => {
                summary.successful += 1;
                if *created_record {
                    summary.created += 1;
                } else {
                    summary.updated += 1;
                }
                result.successful_operations += 1;
            }
            ItemOutcome::Skipped { .. } => {
                summary.skipped += 1;
                result.skipped_operations += 1;
            }
            ItemOutcome::Failed { .. } => {
                summary.failed += 1;
                result.failed_operations += 1;
            }
        }
    }
    result.total_operations_executed = result.successful_operations + result.failed_operations;
    result.detailed_results = plan.items.iter().map(BulkEditItemResult::from).collect();
}

fn trigger_result(configurations: &[ConfigurationJobResult]) -> SyncTriggerResult {
    let total_items: u64 = configurations.iter().map(|c| c.total_items).sum();
    let success_items: u64 = configurations.iter().map(|c| c.success_items).sum();
    let error_items: u64 = configurations.iter().map(|c| c.error_items).sum();
    let sample_errors: Vec<String> = configurations
        .iter()
        .flat_map(|c| c.errors.iter().cloned())
        .take(MAX_SAMPLE_ERRORS)
        .collect();

    let status: SyncStatus = if sample_errors.is_empty() {
        SyncStatus::Success
    } else if success_items > 0 {
        SyncStatus::PartialSuccess
    } else {
        SyncStatus::Error
    };

    SyncTriggerResult {
        status,
        total_items,
        success_items,
        error_items,
        sample_errors,
    }
}

fn trigger_sync(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    tenant_id: i64,
    window: InclusiveDateRange,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> SyncTriggerResult {
    let options: PendingSyncOptions = PendingSyncOptions {
        window,
        batch_size: BULK_EDIT_SYNC_BATCH_SIZE,
        max_items: None,
        batch_pause: Duration::ZERO,
        sync_type: SyncType::BulkEdit,
    };

    match process_pending_sync(
        persistence,
        factory,
        tenant_id,
        &options,
        &actor.to_audit_actor(),
        now,
    ) {
        Ok(configurations) => {
            let result: SyncTriggerResult = trigger_result(&configurations);
            if result.status != SyncStatus::Success {
                warn!(
                    tenant_id,
                    status = result.status.as_str(),
                    error_items = result.error_items,
                    "Post-edit sync did not fully succeed"
                );
            }
            result
        }
        Err(err) => {
            warn!(tenant_id, error = %err, "Post-edit sync failed");
            SyncTriggerResult {
                status: SyncStatus::Error,
                total_items: 0,
                success_items: 0,
                error_items: 0,
                sample_errors: vec![err.to_string()],
            }
        }
    }
}

fn finished(mut result: BulkEditResult, timer: Instant) -> BulkEditResult {
    let elapsed: Duration = timer.elapsed();
    result.duration_ms = elapsed.as_millis().to_u64().unwrap_or(u64::MAX);
    result.completed_at = time::Duration::try_from(elapsed)
        .ok()
        .and_then(|elapsed| result.started_at.checked_add(elapsed))
        .unwrap_or(result.started_at);
    result
}

/// Executes a bulk edit.
///
/// Invalid requests return a result carrying `validation_errors` and no
/// effects. Dry runs compute exactly what a commit would write without
/// persisting. Commits write every touched cell in one transaction; if that
/// transaction fails, every applied item is reported failed and the error is
/// listed in `processing_errors`.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `factory` - Builds channel manager clients for the post-commit sync
/// * `request` - The bulk edit
/// * `tenant_id` - The tenant
/// * `actor` - The authenticated actor
/// * `now` - The request time, stamped on written cells
///
/// # Errors
///
/// Returns an error if the actor may not commit edits or if stored data
/// cannot be read.
pub fn execute_bulk_edit(
    persistence: &mut Persistence,
    factory: &dyn ChannelClientFactory,
    request: &BulkEditRequest,
    tenant_id: i64,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<BulkEditResult, ApiError> {
    AuthorizationService::authorize_bulk_edit(actor, request.dry_run)?;
    let timer: Instant = Instant::now();
    let mut result: BulkEditResult = BulkEditResult::empty(request.dry_run, now);

    info!(
        tenant_id,
        property_id = request.property_id,
        scope = ?request.scope,
        operations = request.operations.len(),
        dry_run = request.dry_run,
        actor = %actor.id,
        "Executing bulk edit"
    );

    let mut validation_errors: Vec<ValidationError> = validate_bulk_edit_request(request);
    if validation_errors.is_empty() {
        validation_errors.extend(check_references(persistence, tenant_id, request)?);
    }
    if !validation_errors.is_empty() {
        warn!(
            tenant_id,
            errors = validation_errors.len(),
            "Bulk edit rejected by validation"
        );
        result.validation_errors = validation_errors;
        return Ok(finished(result, timer));
    }

    let active_rooms: Vec<RoomRef> = persistence
        .list_active_rooms(tenant_id, request.property_id)
        .map_err(|e| translate_persistence_error("list active rooms", e))?
        .iter()
        .map(|room: &RoomData| RoomRef {
            room_id: room.room_id,
            room_type_id: room.room_type_id,
        })
        .collect();
    let room_ids: Vec<i64> = resolve_rooms(request, &active_rooms);
    let dates: Vec<Date> = select_dates(request).map_err(translate_core_error)?;
    let range: InclusiveDateRange =
        InclusiveDateRange::new(request.date_from, request.date_to).map_err(translate_domain_error)?;

    let state: CalendarState = persistence
        .load_calendar_state(tenant_id, &room_ids, &range)
        .map_err(|e| translate_persistence_error("load calendar state", e))?;
    let mut plan: BulkEditPlan = plan_bulk_edit(
        &state,
        &room_ids,
        &dates,
        &request.operations,
        request.create_missing_records,
    );
    result.total_operations_targeted = room_ids.len() * dates.len() * request.operations.len();

    if request.dry_run {
        result.records_created = plan.records_created();
        result.records_updated = plan.records_updated();
    } else if !plan.writes.is_empty() {
        match persistence.commit_cell_writes(
            tenant_id,
            &plan.writes,
            request.reason.as_deref(),
            request.sync_immediately,
            now,
        ) {
            Ok((created, updated)) => {
                result.records_created = created;
                result.records_updated = updated;
            }
            Err(err) => {
                error!(tenant_id, error = %err, "Bulk edit commit rolled back");
                let message: String = format!("Failed to commit bulk edit: {err}");
                fail_applied_items(&mut plan, &message);
                result.processing_errors.push(message);
            }
        }
    }

    summarize(&mut result, &plan);

    if !request.dry_run && request.sync_immediately && result.successful_operations > 0 {
        result.sync_triggered = true;
        result.sync_result = Some(trigger_sync(persistence, factory, tenant_id, range, actor, now));
    }

    info!(
        tenant_id,
        rooms = room_ids.len(),
        dates = dates.len(),
        successful = result.successful_operations,
        failed = result.failed_operations,
        skipped = result.skipped_operations,
        records_created = result.records_created,
        records_updated = result.records_updated,
        dry_run = request.dry_run,
        "Bulk edit finished"
    );
    Ok(finished(result, timer))
}
