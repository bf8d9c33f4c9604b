// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP handlers.
//!
//! Every request names its tenant and actor explicitly. Handlers authenticate
//! the actor, then run the synchronous service call on the blocking pool.

use axum::{
    Json,
    extract::{Query, State as AxumState},
    http::StatusCode,
};
use innsync_api::{
    ApiError, AuthenticatedActor, AuthorizationService, AvailabilityCalendar, BulkEditResult,
    CalendarRequest, ConnectionTestResult, JobResult, ParkingAvailabilityRequest,
    ParkingAvailabilityResponse, Role, RoomAvailabilityRequest, RoomAvailabilityResponse,
    RoomSyncRequest, SyncJobConfig, SyncRequest, SyncResponse, authenticate_stub,
    check_parking_availability, check_room_availability, execute_bulk_edit,
    get_availability_calendar, manual_sync, run_error_recovery, run_room_sync, sync_health,
    test_connection,
};
use innsync_audit::Actor;
use innsync_domain::{BulkEditRequest, SyncHealth};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};
use tracing::info;

use crate::{AppState, HttpError};

/// A request body carrying tenant and actor alongside the operation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEnvelope<T> {
    /// The tenant the request runs against.
    pub tenant_id: i64,
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The role of the actor.
    pub actor_role: String,
    /// The operation payload.
    #[serde(flatten)]
    pub request: T,
}

/// API request for an error recovery run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecoveryApiRequest {
    /// The actor ID performing this action.
    pub actor_id: String,
    /// The role of the actor.
    pub actor_role: String,
    /// Overrides how far back failed cells are collected.
    #[serde(default)]
    pub window_hours: Option<i64>,
}

/// API request for testing a channel connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionTestApiRequest {
    /// The channel configuration.
    pub configuration_id: i64,
}

/// Query parameters for the availability calendar.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// The tenant.
    tenant_id: i64,
    /// The actor ID.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The property.
    property_id: i64,
    /// First day shown.
    date_from: Date,
    /// Last day shown.
    date_to: Date,
    /// Comma separated room IDs.
    room_ids: Option<String>,
}

/// Query parameters for the sync health report.
#[derive(Debug, Deserialize)]
pub struct HealthQuery {
    /// The tenant.
    tenant_id: i64,
    /// The actor ID.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
}

/// Parses a role string into a Role enum.
fn parse_role(role_str: &str) -> Result<Role, HttpError> {
    Role::from_str(&role_str.to_lowercase()).map_err(|_| HttpError {
        status: StatusCode::BAD_REQUEST,
        message: format!("Invalid role: '{role_str}'. Must be 'manager' or 'front_desk'"),
    })
}

fn authenticate(actor_id: &str, actor_role: &str) -> Result<AuthenticatedActor, HttpError> {
    let role: Role = parse_role(actor_role)?;
    Ok(authenticate_stub(actor_id.to_string(), role).map_err(ApiError::from)?)
}

fn parse_room_ids(raw: Option<&str>) -> Result<Option<Vec<i64>>, HttpError> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(None);
    };
    raw.split(',')
        .map(|part| {
            part.trim().parse::<i64>().map_err(|_| HttpError {
                status: StatusCode::BAD_REQUEST,
                message: format!("Invalid room id: '{part}'"),
            })
        })
        .collect::<Result<Vec<i64>, HttpError>>()
        .map(Some)
}

/// Handler for POST `/bulk_edit` endpoint.
///
/// Applies or previews a bulk edit of availability cells.
pub async fn handle_bulk_edit(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ApiEnvelope<BulkEditRequest>>,
) -> Result<Json<BulkEditResult>, HttpError> {
    info!(
        tenant_id = req.tenant_id,
        actor_id = %req.actor_id,
        property_id = req.request.property_id,
        dry_run = req.request.dry_run,
        "Handling bulk_edit request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let ApiEnvelope {
        tenant_id, request, ..
    } = req;

    let result: BulkEditResult = app_state
        .run_blocking(move |persistence, factory, _| {
            execute_bulk_edit(
                persistence,
                factory,
                &request,
                tenant_id,
                &actor,
                OffsetDateTime::now_utc(),
            )
        })
        .await??;

    info!(
        successful = result.successful_operations,
        failed = result.failed_operations,
        sync_triggered = result.sync_triggered,
        "Bulk edit finished"
    );

    Ok(Json(result))
}

/// Handler for GET `/availability/calendar` endpoint.
pub async fn handle_availability_calendar(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<AvailabilityCalendar>, HttpError> {
    info!(
        tenant_id = query.tenant_id,
        property_id = query.property_id,
        "Handling availability calendar request"
    );

    authenticate(&query.actor_id, &query.actor_role)?;
    let request: CalendarRequest = CalendarRequest {
        property_id: query.property_id,
        date_from: query.date_from,
        date_to: query.date_to,
        room_ids: parse_room_ids(query.room_ids.as_deref())?,
    };
    let tenant_id: i64 = query.tenant_id;

    let calendar: AvailabilityCalendar = app_state
        .run_blocking(move |persistence, _, _| {
            get_availability_calendar(
                persistence,
                tenant_id,
                &request,
                OffsetDateTime::now_utc().date(),
            )
        })
        .await??;

    Ok(Json(calendar))
}

/// Handler for POST `/availability/check` endpoint.
pub async fn handle_availability_check(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ApiEnvelope<RoomAvailabilityRequest>>,
) -> Result<Json<RoomAvailabilityResponse>, HttpError> {
    info!(
        tenant_id = req.tenant_id,
        room_id = req.request.room_id,
        "Handling availability check request"
    );

    authenticate(&req.actor_id, &req.actor_role)?;
    let ApiEnvelope {
        tenant_id, request, ..
    } = req;

    let response: RoomAvailabilityResponse = app_state
        .run_blocking(move |persistence, _, _| {
            check_room_availability(
                persistence,
                tenant_id,
                &request,
                OffsetDateTime::now_utc().date(),
            )
        })
        .await??;

    Ok(Json(response))
}

/// Handler for POST `/parking/availability` endpoint.
pub async fn handle_parking_availability(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ApiEnvelope<ParkingAvailabilityRequest>>,
) -> Result<Json<ParkingAvailabilityResponse>, HttpError> {
    info!(
        tenant_id = req.tenant_id,
        property_id = req.request.property_id,
        "Handling parking availability request"
    );

    authenticate(&req.actor_id, &req.actor_role)?;
    let ApiEnvelope {
        tenant_id, request, ..
    } = req;

    let response: ParkingAvailabilityResponse = app_state
        .run_blocking(move |persistence, _, _| {
            check_parking_availability(
                persistence,
                tenant_id,
                &request,
                OffsetDateTime::now_utc().date(),
            )
        })
        .await??;

    Ok(Json(response))
}

/// Handler for POST `/sync/manual` endpoint.
///
/// Runs one sync against a channel configuration in the requested direction.
pub async fn handle_manual_sync(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ApiEnvelope<SyncRequest>>,
) -> Result<Json<SyncResponse>, HttpError> {
    info!(
        tenant_id = req.tenant_id,
        actor_id = %req.actor_id,
        configuration_id = req.request.configuration_id,
        direction = req.request.direction.as_str(),
        "Handling manual sync request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let ApiEnvelope {
        tenant_id, request, ..
    } = req;

    let response: SyncResponse = app_state
        .run_blocking(move |persistence, factory, _| {
            manual_sync(
                persistence,
                factory,
                tenant_id,
                &request,
                &actor,
                OffsetDateTime::now_utc(),
            )
        })
        .await??;

    Ok(Json(response))
}

/// Handler for POST `/sync/test_connection` endpoint.
pub async fn handle_test_connection(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ApiEnvelope<ConnectionTestApiRequest>>,
) -> Result<Json<ConnectionTestResult>, HttpError> {
    info!(
        tenant_id = req.tenant_id,
        configuration_id = req.request.configuration_id,
        "Handling connection test request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    let tenant_id: i64 = req.tenant_id;
    let configuration_id: i64 = req.request.configuration_id;

    let result: ConnectionTestResult = app_state
        .run_blocking(move |persistence, factory, _| {
            test_connection(persistence, factory, tenant_id, configuration_id, &actor)
        })
        .await??;

    Ok(Json(result))
}

/// Handler for POST `/sync/rooms` endpoint.
///
/// Re-syncs every cell of the listed rooms, pending or not.
pub async fn handle_room_sync(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ApiEnvelope<RoomSyncRequest>>,
) -> Result<Json<JobResult>, HttpError> {
    info!(
        tenant_id = req.tenant_id,
        actor_id = %req.actor_id,
        rooms = req.request.room_ids.len(),
        "Handling room sync request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    AuthorizationService::authorize_sync(&actor).map_err(ApiError::from)?;
    let audit_actor: Actor = actor.to_audit_actor();
    let ApiEnvelope {
        tenant_id, request, ..
    } = req;

    let result: JobResult = app_state
        .run_blocking(move |persistence, factory, job_config| {
            run_room_sync(
                persistence,
                factory,
                job_config,
                tenant_id,
                &request,
                &audit_actor,
                OffsetDateTime::now_utc(),
            )
        })
        .await?;

    Ok(Json(result))
}

/// Handler for POST `/sync/recover` endpoint.
///
/// Runs the error recovery job immediately, across all tenants.
pub async fn handle_error_recovery(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RecoveryApiRequest>,
) -> Result<Json<JobResult>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        window_hours = ?req.window_hours,
        "Handling error recovery request"
    );

    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;
    AuthorizationService::authorize_sync(&actor).map_err(ApiError::from)?;
    let window_hours: Option<i64> = req.window_hours;
    if window_hours.is_some_and(|hours| hours <= 0) {
        return Err(ApiError::InvalidInput {
            field: String::from("window_hours"),
            message: String::from("Recovery window must be positive"),
        }
        .into());
    }

    let result: JobResult = app_state
        .run_blocking(move |persistence, factory, job_config| {
            let config: SyncJobConfig = SyncJobConfig {
                recovery_window: window_hours
                    .map_or(job_config.recovery_window, time::Duration::hours),
                ..job_config.clone()
            };
            run_error_recovery(persistence, factory, &config, OffsetDateTime::now_utc())
        })
        .await?;

    Ok(Json(result))
}

/// Handler for GET `/sync/health` endpoint.
pub async fn handle_sync_health(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<HealthQuery>,
) -> Result<Json<SyncHealth>, HttpError> {
    info!(tenant_id = query.tenant_id, "Handling sync health request");

    authenticate(&query.actor_id, &query.actor_role)?;
    let tenant_id: i64 = query.tenant_id;

    let health: SyncHealth = app_state
        .run_blocking(move |persistence, _, _| {
            sync_health(persistence, tenant_id, OffsetDateTime::now_utc().date())
        })
        .await??;

    Ok(Json(health))
}
