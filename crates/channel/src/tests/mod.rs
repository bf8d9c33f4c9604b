// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod http_tests;

use crate::ChannelCredentials;

pub fn create_test_credentials() -> ChannelCredentials {
    ChannelCredentials {
        token: String::from("secret-token"),
        location_code: String::from("1234"),
    }
}
