// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared fixtures for router and scheduler tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use innsync_api::SyncJobConfig;
use innsync_channel::{
    AvailabilityRow, ChannelClientFactory, ChannelCredentials, ChannelError,
    ChannelManagerClient, ExternalRoom, UpdateOutcome,
};
use innsync_persistence::{NewChannelConfiguration, NewRoomMapping, Persistence};
use time::{Date, OffsetDateTime};
use tower::ServiceExt;

use crate::{AppState, build_router};

pub const TENANT: i64 = 1;

/// Records the size of every pushed batch.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    pushed: Arc<Mutex<Vec<usize>>>,
}

impl RecordingChannel {
    pub fn pushed_batches(&self) -> Vec<usize> {
        self.pushed.lock().unwrap().clone()
    }
}

impl ChannelManagerClient for RecordingChannel {
    fn fetch_rooms(&self) -> Result<Vec<ExternalRoom>, ChannelError> {
        Ok(vec![ExternalRoom {
            id: String::from("ext-1"),
            name: String::from("Double"),
        }])
    }

    fn fetch_availability(
        &self,
        _date_from: Date,
        _date_to: Date,
        _external_room_ids: &[String],
    ) -> Result<Vec<AvailabilityRow>, ChannelError> {
        Ok(Vec::new())
    }

    fn update_availability(&self, rows: &[AvailabilityRow]) -> Result<UpdateOutcome, ChannelError> {
        self.pushed.lock().unwrap().push(rows.len());
        Ok(UpdateOutcome::accepted())
    }
}

impl ChannelClientFactory for RecordingChannel {
    fn create(
        &self,
        _credentials: &ChannelCredentials,
    ) -> Result<Box<dyn ChannelManagerClient>, ChannelError> {
        Ok(Box::new(self.clone()))
    }
}

/// A server over one property with two rooms, both mapped to a connected
/// channel configuration.
pub struct TestServer {
    pub app: Router,
    pub app_state: AppState,
    pub channel: RecordingChannel,
    pub property_id: i64,
    pub room_ids: Vec<i64>,
    pub configuration_id: i64,
}

pub fn fast_job_config() -> SyncJobConfig {
    SyncJobConfig {
        batch_pause: Duration::ZERO,
        ..SyncJobConfig::default()
    }
}

pub fn days_from_today(days: i64) -> Date {
    OffsetDateTime::now_utc().date() + time::Duration::days(days)
}

pub fn create_test_server() -> TestServer {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let property_id: i64 = persistence
        .create_property(TENANT, "Harbour View", 2)
        .unwrap();
    let room_type_id: i64 = persistence
        .create_room_type(TENANT, property_id, "Double")
        .unwrap();
    let room_ids: Vec<i64> = ["101", "102"]
        .iter()
        .map(|number| {
            persistence
                .create_room(TENANT, property_id, room_type_id, number)
                .unwrap()
        })
        .collect();
    let configuration_id: i64 = persistence
        .create_channel_configuration(
            TENANT,
            &NewChannelConfiguration {
                property_id,
                provider: String::from("wubook"),
                token: String::from("token-abc"),
                location_code: String::from("4242"),
                is_connected: true,
            },
        )
        .unwrap();
    for room_id in &room_ids {
        persistence
            .create_room_mapping(
                TENANT,
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

    let channel: RecordingChannel = RecordingChannel::default();
    let app_state: AppState =
        AppState::new(persistence, Arc::new(channel.clone()), fast_job_config());
    TestServer {
        app: build_router(app_state.clone()),
        app_state,
        channel,
        property_id,
        room_ids,
        configuration_id,
    }
}

pub async fn post_json(app: &Router, uri: &str, body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_response(response).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_response(response).await
}

async fn read_response(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status: StatusCode = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}
