// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud backend access: token authentication and device listing.
//!
//! The backend is consumed as a black box with two operations: confirm that
//! a bearer token is accepted, and return the devices registered to the
//! account. Both go through `GET /v2/devices`.
//!
//! # Examples
//!
//! ```no_run
//! use tinxy_local::cloud::{CloudClient, PairingSession};
//!
//! # async fn example() -> tinxy_local::Result<()> {
//! let session = PairingSession::new("my-bearer-token");
//! let client = CloudClient::new()?;
//!
//! client.authenticate(&session).await?;
//! let devices = client.list_devices(&session).await?;
//!
//! for device in &devices {
//!     println!("{}", device.display_label());
//! }
//! # Ok(())
//! # }
//! ```

mod model;

use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::{Error, ParseError, ProtocolError};

pub use model::{CloudDevice, FAN_MODELS, Node, SUPPORTED_MODELS, TypeInfo, UuidRef};

/// Default cloud backend.
pub const DEFAULT_BACKEND: &str = "https://ha-backend.tinxy.in";

/// Path listing the account's devices.
const DEVICES_PATH: &str = "/v2/devices";

/// An authenticated pairing session.
///
/// Holds the bearer token for the lifetime of the process. The token is
/// passed explicitly to each cloud call and never persisted; `Debug` output
/// redacts it.
#[derive(Clone)]
pub struct PairingSession {
    token: String,
}

impl PairingSession {
    /// Creates a session around a bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Returns the bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for PairingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairingSession")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Configuration for the cloud backend client.
///
/// # Examples
///
/// ```
/// use tinxy_local::cloud::CloudConfig;
/// use std::time::Duration;
///
/// let config = CloudConfig::new()
///     .with_base_url("https://ha-backend.tinxy.in")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct CloudConfig {
    base_url: String,
    timeout: Duration,
}

impl CloudConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration pointing at the default backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom backend base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the cloud backend.
#[derive(Debug, Clone)]
pub struct CloudClient {
    base_url: String,
    client: Client,
}

impl CloudClient {
    /// Creates a client for the default backend.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, ProtocolError> {
        Self::with_config(CloudConfig::default())
    }

    /// Creates a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn with_config(config: CloudConfig) -> Result<Self, ProtocolError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self { base_url, client })
    }

    /// Confirms the session's token is accepted by the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Unauthorized`] when the token is rejected,
    /// or a network error when the backend is unreachable.
    pub async fn authenticate(&self, session: &PairingSession) -> Result<(), Error> {
        tracing::debug!(backend = %self.base_url, "Validating bearer token");
        self.fetch_devices(session).await?;
        tracing::info!("Bearer token accepted");
        Ok(())
    }

    /// Returns the devices registered to the account, in backend order.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Unauthorized`] when the token is rejected,
    /// a network error when the backend is unreachable, or a parse error
    /// when the payload is not the expected device array.
    pub async fn list_devices(&self, session: &PairingSession) -> Result<Vec<CloudDevice>, Error> {
        let body = self.fetch_devices(session).await?;

        let devices: Vec<CloudDevice> =
            serde_json::from_value(body).map_err(ParseError::Json)?;

        tracing::info!(count = devices.len(), "Fetched device list");

        Ok(devices)
    }

    async fn fetch_devices(&self, session: &PairingSession) -> Result<serde_json::Value, Error> {
        let url = format!("{}{DEVICES_PATH}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    #[allow(clippy::cast_possible_truncation)]
                    ProtocolError::Timeout(CloudConfig::DEFAULT_TIMEOUT.as_millis() as u64)
                } else if e.is_connect() {
                    ProtocolError::ConnectionFailed(e.to_string())
                } else {
                    ProtocolError::Http(e)
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::warn!("Bearer token rejected by backend");
                Err(ProtocolError::Unauthorized.into())
            }
            status if !status.is_success() => {
                Err(ProtocolError::UnexpectedStatus(status.as_u16()).into())
            }
            _ => {
                let body = response
                    .json::<serde_json::Value>()
                    .await
                    .map_err(ProtocolError::Http)?;
                Ok(body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_debug_redacts_token() {
        let session = PairingSession::new("abc123");
        let debug = format!("{session:?}");
        assert!(!debug.contains("abc123"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn config_default_backend() {
        let config = CloudConfig::new();
        assert_eq!(config.base_url(), "https://ha-backend.tinxy.in");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = CloudClient::with_config(
            CloudConfig::new().with_base_url("https://example.com/"),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://example.com");
    }
}
