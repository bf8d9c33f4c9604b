// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Failures talking to a channel manager.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The client could not be configured.
    #[error("Invalid channel client configuration: {0}")]
    InvalidConfiguration(String),
    /// The request could not be delivered.
    #[error("Channel transport error: {0}")]
    Transport(String),
    /// The provider did not answer in time.
    #[error("Channel request timed out after {seconds}s")]
    Timeout {
        /// The configured timeout.
        seconds: u64,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("Channel returned HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// The response body, possibly empty.
        body: String,
    },
    /// The response body could not be decoded.
    #[error("Failed to decode channel response: {0}")]
    Decode(String),
    /// The provider refused the request.
    #[error("Channel rejected the request: {0}")]
    Rejected(String),
}
