// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::{Arc, Mutex, MutexGuard};

use innsync::CellWrite;
use innsync_channel::{
    AvailabilityRow, ChannelClientFactory, ChannelCredentials, ChannelError,
    ChannelManagerClient, ExternalRoom, UpdateOutcome,
};
use innsync_domain::{
    Amount, BulkEditOperation, BulkEditRequest, BulkEditScope, CellValues, EditOp, EditTarget,
    OperationValue, ReservationStatus,
};
use innsync_persistence::{NewChannelConfiguration, NewReservation, NewRoomMapping, Persistence};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

use crate::{AuthenticatedActor, Role};

pub const TENANT: i64 = 1;

/// A property with one room type, two rooms and two parking spots.
pub struct Fixture {
    pub persistence: Persistence,
    pub property_id: i64,
    pub room_type_id: i64,
    pub room_ids: Vec<i64>,
}

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-05-01 09:00:00 UTC)
}

pub fn create_test_today() -> Date {
    date!(2026 - 05 - 01)
}

pub fn create_test_manager() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("manager-1"), Role::Manager)
}

pub fn create_test_front_desk() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("desk-1"), Role::FrontDesk)
}

pub fn setup_fixture() -> Fixture {
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

    Fixture {
        persistence,
        property_id,
        room_type_id,
        room_ids,
    }
}

/// Creates a connected configuration mapping every fixture room to
/// `ext-{room_id}` with the given rate multiplier.
pub fn connect_channel(fixture: &mut Fixture, rate_multiplier: f64) -> i64 {
    let configuration_id: i64 = fixture
        .persistence
        .create_channel_configuration(
            TENANT,
            &NewChannelConfiguration {
                property_id: fixture.property_id,
                provider: String::from("wubook"),
                token: String::from("token-abc"),
                location_code: String::from("4242"),
                is_connected: true,
            },
        )
        .unwrap();
    for room_id in &fixture.room_ids {
        fixture
            .persistence
            .create_room_mapping(
                TENANT,
                &NewRoomMapping {
                    configuration_id,
                    room_id: *room_id,
                    external_room_id: external_id(*room_id),
                    sync_availability: true,
                    sync_rates: true,
                    sync_restrictions: true,
                    rate_multiplier,
                },
            )
            .unwrap();
    }
    configuration_id
}

pub fn external_id(room_id: i64) -> String {
    format!("ext-{room_id}")
}

/// Stores default cells for every `(room, date)` and marks them pending.
pub fn seed_pending_cells(fixture: &mut Fixture, dates: &[Date]) {
    let writes: Vec<CellWrite> = fixture
        .room_ids
        .iter()
        .flat_map(|room_id| {
            dates.iter().map(move |date| CellWrite {
                room_id: *room_id,
                date: *date,
                values: CellValues::default(),
                is_new: true,
            })
        })
        .collect();
    fixture
        .persistence
        .commit_cell_writes(TENANT, &writes, None, true, create_test_now())
        .unwrap();
}

pub fn create_reservation(
    fixture: &mut Fixture,
    room_id: i64,
    number: &str,
    check_in: Date,
    check_out: Date,
    requires_parking: bool,
) -> i64 {
    fixture
        .persistence
        .create_reservation(
            TENANT,
            &NewReservation {
                property_id: fixture.property_id,
                room_id,
                reservation_number: String::from(number),
                guest_name: String::from("Guest"),
                check_in_date: check_in,
                check_out_date: check_out,
                status: ReservationStatus::Confirmed,
                requires_parking,
            },
        )
        .unwrap()
}

pub fn price_operation(op: EditOp, hundredths: i64) -> BulkEditOperation {
    BulkEditOperation::new(
        EditTarget::Price,
        op,
        Some(OperationValue::Number(Amount::from_hundredths(hundredths))),
    )
}

/// A committed edit of both fixture rooms over June 1st to 3rd.
pub fn create_bulk_edit_request(
    fixture: &Fixture,
    operations: Vec<BulkEditOperation>,
) -> BulkEditRequest {
    BulkEditRequest {
        scope: BulkEditScope::SpecificRooms,
        property_id: fixture.property_id,
        room_type_id: None,
        room_ids: Some(fixture.room_ids.clone()),
        date_from: date!(2026 - 06 - 01),
        date_to: date!(2026 - 06 - 03),
        days_of_week: None,
        operations,
        dry_run: false,
        create_missing_records: true,
        sync_immediately: false,
        reason: Some(String::from("Summer pricing")),
    }
}

/// What the fake channel manager saw and how it answers.
#[derive(Debug, Default)]
pub struct FakeChannelState {
    pub update_calls: Vec<Vec<AvailabilityRow>>,
    pub fetch_calls: usize,
    pub refuse_updates: Option<String>,
    pub fail_transport: bool,
    pub inbound_rows: Vec<AvailabilityRow>,
    pub rooms: Vec<ExternalRoom>,
}

/// A channel manager double that records calls.
#[derive(Debug, Clone, Default)]
pub struct FakeChannel {
    state: Arc<Mutex<FakeChannelState>>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing(message: &str) -> Self {
        let channel: Self = Self::new();
        channel.state().refuse_updates = Some(String::from(message));
        channel
    }

    pub fn state(&self) -> MutexGuard<'_, FakeChannelState> {
        self.state.lock().unwrap()
    }

    pub fn pushed_rows(&self) -> Vec<AvailabilityRow> {
        self.state().update_calls.iter().flatten().cloned().collect()
    }

    pub fn update_call_count(&self) -> usize {
        self.state().update_calls.len()
    }
}

impl ChannelManagerClient for FakeChannel {
    fn fetch_rooms(&self) -> Result<Vec<ExternalRoom>, ChannelError> {
        let state = self.state();
        if state.fail_transport {
            return Err(ChannelError::Transport(String::from("connection refused")));
        }
        Ok(state.rooms.clone())
    }

    fn fetch_availability(
        &self,
        _date_from: Date,
        _date_to: Date,
        external_room_ids: &[String],
    ) -> Result<Vec<AvailabilityRow>, ChannelError> {
        let mut state = self.state();
        state.fetch_calls += 1;
        if state.fail_transport {
            return Err(ChannelError::Transport(String::from("connection refused")));
        }
        Ok(state
            .inbound_rows
            .iter()
            .filter(|row| {
                external_room_ids.contains(&row.room_id) || row.room_id.starts_with("unmapped")
            })
            .cloned()
            .collect())
    }

    fn update_availability(&self, rows: &[AvailabilityRow]) -> Result<UpdateOutcome, ChannelError> {
        let mut state = self.state();
        state.update_calls.push(rows.to_vec());
        if state.fail_transport {
            return Err(ChannelError::Transport(String::from("connection refused")));
        }
        Ok(state
            .refuse_updates
            .as_ref()
            .map_or_else(UpdateOutcome::accepted, UpdateOutcome::refused))
    }
}

impl ChannelClientFactory for FakeChannel {
    fn create(
        &self,
        _credentials: &ChannelCredentials,
    ) -> Result<Box<dyn ChannelManagerClient>, ChannelError> {
        Ok(Box::new(self.clone()))
    }
}
