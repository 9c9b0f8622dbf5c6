// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `/info` payload and its decoding into per-node status.

use serde::Deserialize;

use crate::cloud::Node;
use crate::types::DeviceKind;

/// Raw payload of `GET /info`.
///
/// # Examples
///
/// ```
/// use tinxy_local::device::DeviceInfo;
///
/// let json = r#"{
///     "rssi": -67,
///     "ip": "192.168.1.100",
///     "version": 75,
///     "status": 1,
///     "state": "11",
///     "chip_id": "777777",
///     "ssid": "WiFi",
///     "firmware": 75,
///     "model": "WIFI_2SWITCH_V1"
/// }"#;
/// let info: DeviceInfo = serde_json::from_str(json).unwrap();
/// assert_eq!(info.chip_id, "777777");
/// assert_eq!(info.state, "11");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    /// WiFi signal strength in dBm.
    pub rssi: i32,

    /// IP the device believes it has.
    pub ip: String,

    /// Firmware version number.
    #[serde(default)]
    pub version: Option<i64>,

    /// Overall device status flag.
    #[serde(default)]
    pub status: Option<i64>,

    /// One digit per relay: `'1'` on, `'0'` off.
    pub state: String,

    /// Chip identity, matches the cloud record's `uuidRef.uuid`.
    pub chip_id: String,

    /// SSID the device is connected to.
    #[serde(default)]
    pub ssid: Option<String>,

    /// Firmware build number.
    #[serde(default)]
    pub firmware: Option<i64>,

    /// Hardware model name.
    #[serde(default)]
    pub model: Option<String>,

    /// Concatenated 3-digit brightness groups, one per relay.
    #[serde(default)]
    pub bright: Option<String>,

    /// Door sensor state, present on lock models only.
    #[serde(default)]
    pub door: Option<serde_json::Value>,
}

/// Decoded per-node view of an `/info` payload.
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// Chip identity of the reporting device.
    pub chip_id: String,
    /// Signal strength in dBm.
    pub rssi: i32,
    /// Hardware model name, when reported.
    pub model: Option<String>,
    /// One entry per relay, in relay order.
    pub nodes: Vec<NodeStatus>,
}

/// Status of a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    /// Node name, falling back to `"Device {n}"` when unknown.
    pub name: String,
    /// Appliance classification.
    pub kind: DeviceKind,
    /// Whether the relay is on.
    pub is_on: bool,
    /// Brightness 0-100, for dimmable nodes when the device reports it.
    pub brightness: Option<u8>,
}

impl StatusReport {
    /// Decodes an `/info` payload against the known nodes of the device.
    ///
    /// The `state` string has one digit per relay. When the payload carries
    /// a `bright` string, it is split into fixed-width 3-digit groups that
    /// line up with the relays; only dimmable nodes get a brightness value.
    /// Relays beyond the known node list are reported with placeholder
    /// names.
    #[must_use]
    pub fn decode(info: &DeviceInfo, nodes: &[Node]) -> Self {
        let brightness_groups: Vec<Option<u8>> = info
            .bright
            .as_deref()
            .map(split_brightness)
            .unwrap_or_default();

        let node_statuses = info
            .state
            .chars()
            .enumerate()
            .map(|(idx, digit)| {
                let (name, kind) = nodes.get(idx).map_or_else(
                    || (format!("Device {}", idx + 1), DeviceKind::Socket),
                    |node| (node.name.clone(), node.kind),
                );

                let brightness = if kind.is_dimmable() {
                    brightness_groups.get(idx).copied().flatten()
                } else {
                    None
                };

                NodeStatus {
                    name,
                    kind,
                    is_on: digit == '1',
                    brightness,
                }
            })
            .collect();

        Self {
            chip_id: info.chip_id.clone(),
            rssi: info.rssi,
            model: info.model.clone(),
            nodes: node_statuses,
        }
    }
}

/// Splits a concatenated brightness string into per-relay values.
fn split_brightness(bright: &str) -> Vec<Option<u8>> {
    bright
        .as_bytes()
        .chunks(3)
        .map(|group| std::str::from_utf8(group).ok()?.parse::<u8>().ok())
        .collect()
}
