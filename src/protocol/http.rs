// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the device's local API.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::error::ProtocolError;

/// Configuration for a device's local HTTP endpoint.
///
/// Tinxy devices expose a plain-HTTP API on port 80. Requests must be kept
/// short: a device whose local API is switched off still accepts the TCP
/// connection, so the timeout is what separates a slow device from a dead
/// address.
///
/// # Examples
///
/// ```
/// use tinxy_local::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.50");
///
/// let config = HttpConfig::new("192.168.1.50")
///     .with_port(8080)
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Creates a new configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the device
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.clone();
        }
        if self.port == Self::DEFAULT_PORT {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Creates an [`HttpClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] for an empty host, or an
    /// error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress(self.host));
        }

        let timeout = self.timeout;
        let base_url = self.base_url();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url,
            client,
            timeout,
        })
    }
}

/// HTTP client for communicating with a single device.
///
/// Each request is independent; there is no persistent connection state.
///
/// # Examples
///
/// ```no_run
/// use tinxy_local::protocol::HttpClient;
///
/// # async fn example() -> tinxy_local::Result<()> {
/// let client = HttpClient::new("192.168.1.50")?;
/// let info = client.get_json("/info").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new client for the specified host with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, ProtocolError> {
        HttpConfig::new(host).into_client()
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a GET request and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] when the device does not answer in
    /// time, [`ProtocolError::UnexpectedStatus`] on a non-2xx answer, and
    /// [`ProtocolError::Http`] for other transport failures.
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value, ProtocolError> {
        let url = format!("{}{path}", self.base_url);

        tracing::debug!(url = %url, "Sending GET request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.decode(response).await
    }

    /// Sends a POST request with a JSON payload and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`get_json`](Self::get_json).
    pub async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, ProtocolError> {
        let url = format!("{}{path}", self.base_url);

        tracing::debug!(url = %url, "Sending POST request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.decode(response).await
    }

    fn map_send_error(&self, error: reqwest::Error) -> ProtocolError {
        if error.is_timeout() {
            #[allow(clippy::cast_possible_truncation)]
            return ProtocolError::Timeout(self.timeout.as_millis() as u64);
        }
        if error.is_connect() {
            return ProtocolError::ConnectionFailed(error.to_string());
        }
        ProtocolError::Http(error)
    }

    async fn decode(&self, response: reqwest::Response) -> Result<serde_json::Value, ProtocolError> {
        let status = response.status();

        if !status.is_success() {
            return Err(ProtocolError::UnexpectedStatus(status.as_u16()));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(ProtocolError::Http)?;

        tracing::debug!(body = %body, "Received response");

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = HttpConfig::new("192.168.1.50");
        assert_eq!(config.host(), "192.168.1.50");
        assert_eq!(config.port(), 80);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn base_url_default_port() {
        let config = HttpConfig::new("192.168.1.50");
        assert_eq!(config.base_url(), "http://192.168.1.50");
    }

    #[test]
    fn base_url_custom_port() {
        let config = HttpConfig::new("192.168.1.50").with_port(8080);
        assert_eq!(config.base_url(), "http://192.168.1.50:8080");
    }

    #[test]
    fn base_url_keeps_explicit_scheme() {
        let config = HttpConfig::new("http://192.168.1.50");
        assert_eq!(config.base_url(), "http://192.168.1.50");
    }

    #[test]
    fn empty_host_is_rejected() {
        let result = HttpConfig::new("").into_client();
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn config_into_client() {
        let client = HttpConfig::new("192.168.1.50")
            .with_timeout(Duration::from_secs(5))
            .into_client()
            .unwrap();
        assert_eq!(client.base_url(), "http://192.168.1.50");
    }
}
