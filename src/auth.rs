// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rolling password derivation for the local toggle endpoint.
//!
//! The device does not accept the account's MQTT password directly. Each
//! `POST /toggle` carries a digest derived from that password and the current
//! UTC minute, so captured payloads expire quickly. The device accepts the
//! digest for the minute window in which it was generated.

use chrono::Utc;
use sha2::{Digest, Sha256};

/// Derives the toggle password for the current minute window.
///
/// # Examples
///
/// ```
/// use tinxy_local::auth::rolling_password;
///
/// let digest = rolling_password("my-mqtt-pass");
/// assert_eq!(digest.len(), 64);
/// ```
#[must_use]
pub fn rolling_password(mqtt_pass: &str) -> String {
    password_for_window(mqtt_pass, current_window())
}

/// Derives the toggle password for an explicit minute window.
#[must_use]
pub fn password_for_window(mqtt_pass: &str, window: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(mqtt_pass.as_bytes());
    hasher.update(window.to_string().as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Returns the current UTC minute window.
#[must_use]
pub fn current_window() -> i64 {
    Utc::now().timestamp() / 60
}
