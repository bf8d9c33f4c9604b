// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

use super::create_test_credentials;
use crate::{ChannelClientFactory, ChannelError, HttpChannelClient, HttpClientFactory};

#[test]
fn test_empty_base_url_is_rejected() {
    let result = HttpChannelClient::new("   ", create_test_credentials(), Duration::from_secs(1));

    assert!(matches!(result, Err(ChannelError::InvalidConfiguration(_))));
}

#[test]
fn test_base_url_is_normalised() {
    let client: HttpChannelClient = HttpChannelClient::new(
        " https://gateway.example.test/api/ ",
        create_test_credentials(),
        Duration::from_secs(1),
    )
    .unwrap();

    assert_eq!(client.base_url(), "https://gateway.example.test/api");
}

#[test]
fn test_factory_propagates_configuration_errors() {
    let factory: HttpClientFactory = HttpClientFactory::new("", Duration::from_secs(1));

    assert!(factory.create(&create_test_credentials()).is_err());
}

#[test]
fn test_credentials_debug_redacts_token() {
    let rendered: String = format!("{:?}", create_test_credentials());

    assert!(!rendered.contains("secret-token"));
    assert!(rendered.contains("1234"));
}

#[test]
fn test_error_messages() {
    assert_eq!(
        ChannelError::Timeout { seconds: 10 }.to_string(),
        "Channel request timed out after 10s"
    );
    assert_eq!(
        ChannelError::HttpStatus {
            status: 401,
            body: String::from("bad token"),
        }
        .to_string(),
        "Channel returned HTTP 401: bad token"
    );
}
