// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local control of a single Tinxy device.
//!
//! A [`Hub`] wraps the device's local HTTP API: reading `/info` and posting
//! toggle/brightness commands. Commands authenticate with a rolling password
//! derived from the account's MQTT password, see [`crate::auth`].
//!
//! Direct [`Hub`] calls are unpaced. Anything that can fire commands in
//! quick succession should go through [`CommandQueue`], because rapid
//! toggling freezes the device's local API.
//!
//! # Examples
//!
//! ```no_run
//! use tinxy_local::device::Hub;
//! use tinxy_local::types::{RelayAction, RelayIndex};
//!
//! # async fn example() -> tinxy_local::Result<()> {
//! let hub = Hub::new("192.168.1.50", "64a1", "mqtt-pass")?;
//!
//! let info = hub.info().await?;
//! println!("chip {} rssi {}", info.chip_id, info.rssi);
//!
//! hub.toggle(RelayIndex::one(), RelayAction::On).await?;
//! # Ok(())
//! # }
//! ```

mod queue;
mod status;

use serde::Serialize;

use crate::auth;
use crate::cloud::Node;
use crate::error::{DeviceError, Error, ParseError, ProtocolError};
use crate::protocol::{HttpClient, HttpConfig};
use crate::types::{Brightness, RelayAction, RelayIndex};

pub use queue::{CommandQueue, QueuePolicy};
pub use status::{DeviceInfo, NodeStatus, StatusReport};

/// Toggle payload for `POST /toggle`.
#[derive(Debug, Serialize)]
struct ToggleRequest<'a> {
    password: String,
    #[serde(rename = "relayNumber")]
    relay_number: u8,
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    brightness: Option<u8>,
}

/// Handle for one device on the local network.
#[derive(Debug, Clone)]
pub struct Hub {
    client: HttpClient,
    device_id: String,
    mqtt_pass: String,
}

impl Hub {
    /// Creates a hub for a device at `host`.
    ///
    /// # Arguments
    ///
    /// * `host` - IP address or hostname of the device
    /// * `device_id` - The cloud identifier of the device
    /// * `mqtt_pass` - The account's MQTT password for this device
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        host: impl Into<String>,
        device_id: impl Into<String>,
        mqtt_pass: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::with_config(HttpConfig::new(host), device_id, mqtt_pass)
    }

    /// Creates a hub from an explicit HTTP configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn with_config(
        config: HttpConfig,
        device_id: impl Into<String>,
        mqtt_pass: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            client: config.into_client().map_err(Error::Protocol)?,
            device_id: device_id.into(),
            mqtt_pass: mqtt_pass.into(),
        })
    }

    /// Returns the cloud identifier of the device.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the device's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Reads the device's `/info` endpoint.
    ///
    /// # Errors
    ///
    /// Returns a protocol error when the device is unreachable or answers
    /// with a non-success status, or a parse error when the payload does not
    /// match the info schema.
    pub async fn info(&self) -> Result<DeviceInfo, Error> {
        let body = self.client.get_json("/info").await?;
        let info: DeviceInfo = serde_json::from_value(body).map_err(ParseError::Json)?;

        tracing::debug!(
            device_id = %self.device_id,
            chip_id = %info.chip_id,
            rssi = info.rssi,
            "Read device info"
        );

        Ok(info)
    }

    /// Reads `/info` and decodes it against the device's known nodes.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`info`](Self::info).
    pub async fn status_report(&self, nodes: &[Node]) -> Result<StatusReport, Error> {
        let info = self.info().await?;
        Ok(StatusReport::decode(&info, nodes))
    }

    /// Switches a relay on or off.
    ///
    /// # Errors
    ///
    /// Returns a protocol error when the device is unreachable, or
    /// [`DeviceError::CommandRejected`] when the device refuses the command.
    pub async fn toggle(&self, relay: RelayIndex, action: RelayAction) -> Result<(), Error> {
        let request = ToggleRequest {
            password: auth::rolling_password(&self.mqtt_pass),
            relay_number: relay.value(),
            action: action.as_wire_str(),
            brightness: None,
        };

        self.send_toggle(&request).await?;

        tracing::info!(
            device_id = %self.device_id,
            relay = relay.value(),
            action = %action,
            "Toggled relay"
        );

        Ok(())
    }

    /// Sets the brightness of a dimmable node, switching it on.
    ///
    /// When the device refuses the brightness payload (older firmware), the
    /// call falls back to a plain ON toggle.
    ///
    /// # Errors
    ///
    /// Returns a protocol error when the device is unreachable, or the
    /// fallback toggle's error when both attempts are refused.
    pub async fn set_brightness(
        &self,
        relay: RelayIndex,
        brightness: Brightness,
    ) -> Result<(), Error> {
        let request = ToggleRequest {
            password: auth::rolling_password(&self.mqtt_pass),
            relay_number: relay.value(),
            action: RelayAction::On.as_wire_str(),
            brightness: Some(brightness.value()),
        };

        match self.send_toggle(&request).await {
            Ok(()) => {
                tracing::info!(
                    device_id = %self.device_id,
                    relay = relay.value(),
                    brightness = brightness.value(),
                    "Set brightness"
                );
                Ok(())
            }
            Err(Error::Device(DeviceError::CommandRejected(reason))) => {
                tracing::warn!(
                    device_id = %self.device_id,
                    relay = relay.value(),
                    reason = %reason,
                    "Brightness refused, falling back to toggle"
                );
                self.toggle(relay, RelayAction::On).await
            }
            Err(e) => Err(e),
        }
    }

    async fn send_toggle(&self, request: &ToggleRequest<'_>) -> Result<(), Error> {
        match self.client.post_json("/toggle", request).await {
            Ok(_) => Ok(()),
            Err(ProtocolError::UnexpectedStatus(status)) => Err(DeviceError::CommandRejected(
                format!("device answered HTTP {status}"),
            )
            .into()),
            Err(e) => Err(e.into()),
        }
    }
}
