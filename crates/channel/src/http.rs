// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Blocking JSON gateway client.
//!
//! Every call is a `POST` carrying the configuration credentials. Callers run
//! on blocking threads, never directly on an async executor.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use time::Date;
use tracing::{debug, warn};

use crate::client::{ChannelClientFactory, ChannelCredentials, ChannelManagerClient};
use crate::error::ChannelError;
use crate::wire::{
    AvailabilityResponse, AvailabilityRow, CredentialsBody, ExternalRoom,
    FetchAvailabilityBody, RoomsResponse, UpdateAvailabilityBody, UpdateOutcome,
};

/// Provider request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A channel manager client over HTTP.
#[derive(Debug)]
pub struct HttpChannelClient {
    base_url: String,
    credentials: ChannelCredentials,
    timeout: Duration,
    http: Client,
}

impl HttpChannelClient {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidConfiguration` if the base URL is empty
    /// or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        credentials: ChannelCredentials,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let trimmed: &str = base_url.trim();
        if trimmed.is_empty() {
            return Err(ChannelError::InvalidConfiguration(String::from(
                "base URL is empty",
            )));
        }
        let http: Client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
            credentials,
            timeout,
            http,
        })
    }

    /// The normalised base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn credentials_body(&self) -> CredentialsBody<'_> {
        CredentialsBody {
            token: &self.credentials.token,
            lcode: &self.credentials.location_code,
        }
    }

    fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ChannelError> {
        let url: String = self.url(path);
        debug!(%url, "Sending channel request");

        let response: Response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| self.transport_error(&e))?;

        let status: StatusCode = response.status();
        let text: String = response.text().map_err(|e| self.transport_error(&e))?;
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Channel request failed");
            return Err(ChannelError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ChannelError::Decode(e.to_string()))
    }

    fn transport_error(&self, error: &reqwest::Error) -> ChannelError {
        if error.is_timeout() {
            ChannelError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            ChannelError::Transport(error.to_string())
        }
    }
}

impl ChannelManagerClient for HttpChannelClient {
    fn fetch_rooms(&self) -> Result<Vec<ExternalRoom>, ChannelError> {
        let response: RoomsResponse = self.post("rooms", &self.credentials_body())?;
        Ok(response.rooms)
    }

    fn fetch_availability(
        &self,
        date_from: Date,
        date_to: Date,
        external_room_ids: &[String],
    ) -> Result<Vec<AvailabilityRow>, ChannelError> {
        let body: FetchAvailabilityBody<'_> = FetchAvailabilityBody {
            credentials: self.credentials_body(),
            dfrom: date_from,
            dto: date_to,
            rooms: external_room_ids,
        };
        let response: AvailabilityResponse = self.post("availability/fetch", &body)?;
        Ok(response.rows)
    }

    fn update_availability(&self, rows: &[AvailabilityRow]) -> Result<UpdateOutcome, ChannelError> {
        let body: UpdateAvailabilityBody<'_> = UpdateAvailabilityBody {
            credentials: self.credentials_body(),
            rows,
        };
        self.post("availability/update", &body)
    }
}

/// Builds `HttpChannelClient`s against one gateway.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    base_url: String,
    timeout: Duration,
}

impl HttpClientFactory {
    /// Creates a factory for `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl ChannelClientFactory for HttpClientFactory {
    fn create(
        &self,
        credentials: &ChannelCredentials,
    ) -> Result<Box<dyn ChannelManagerClient>, ChannelError> {
        let client: HttpChannelClient =
            HttpChannelClient::new(&self.base_url, credentials.clone(), self.timeout)?;
        Ok(Box::new(client))
    }
}
