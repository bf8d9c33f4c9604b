// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Channel manager boundary.
//!
//! The sync service talks to the external provider only through the
//! `ChannelManagerClient` trait. A `ChannelClientFactory` builds one client
//! per configuration from its credentials. `HttpChannelClient` is the
//! production implementation against a JSON gateway.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod client;
mod error;
mod http;
mod wire;

#[cfg(test)]
mod tests;

pub use client::{ChannelClientFactory, ChannelCredentials, ChannelManagerClient};
pub use error::ChannelError;
pub use http::{DEFAULT_TIMEOUT, HttpChannelClient, HttpClientFactory};
pub use wire::{AvailabilityRow, ExternalRoom, UpdateOutcome};
