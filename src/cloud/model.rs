// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud device records and their flattening into controllable nodes.
//!
//! The backend returns one record per physical unit. Multi-switch panels
//! carry a list of node labels; each label maps to one relay. This module
//! mirrors that wire shape and flattens records into per-relay [`Node`]s.

use serde::Deserialize;

use crate::types::{DeviceKind, PairingStatus, RelayIndex};

/// Models whose local control is known to work.
pub const SUPPORTED_MODELS: &[&str] = &[
    "Dimmable Light",
    "EM_DOOR_LOCK",
    "EVA_BULB",
    "Fan",
    "WIFI_2SWITCH_V1",
    "WIFI_2SWITCH_V3",
    "WIFI_3SWITCH_1FAN",
    "WIFI_3SWITCH_1FAN_V3",
    "WIFI_4DIMMER",
    "WIFI_4SWITCH",
    "WIFI_4SWITCH_V2",
    "WIFI_4SWITCH_V3",
    "WIFI_6SWITCH_V1",
    "WIFI_6SWITCH_V3",
    "WIFI_BULB_WHITE_V1",
    "WIFI_SWITCH",
    "WIFI_SWITCH_1FAN_V1",
    "WIFI_SWITCH_V2",
    "WIFI_SWITCH_V3",
    "WIRED_DOOR_LOCK",
    "WIRED_DOOR_LOCK_V2",
    "WIRED_DOOR_LOCK_V3",
];

/// Models that carry a fan on one of their relays.
pub const FAN_MODELS: &[&str] = &[
    "WIFI_3SWITCH_1FAN",
    "Fan",
    "WIFI_SWITCH_1FAN_V1",
    "WIFI_3SWITCH_1FAN_V3",
];

/// A device record as returned by `GET /v2/devices`.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudDevice {
    /// Opaque identifier assigned by the backend.
    #[serde(rename = "_id")]
    pub id: String,

    /// User-facing device name.
    pub name: String,

    /// Node labels for multi-switch panels; empty for single-node devices.
    #[serde(default)]
    pub devices: Vec<String>,

    /// Per-node appliance type labels (`"Socket"`, `"Fan"`, ...).
    #[serde(default, rename = "deviceTypes")]
    pub device_types: Vec<String>,

    /// Hardware model descriptor.
    #[serde(rename = "typeId")]
    pub type_id: Option<TypeInfo>,

    /// MQTT password, required to derive the local toggle password.
    #[serde(rename = "mqttPassword")]
    pub mqtt_password: Option<String>,

    /// Chip identity reference.
    #[serde(rename = "uuidRef")]
    pub uuid_ref: Option<UuidRef>,
}

/// Hardware model descriptor embedded in a device record.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeInfo {
    /// Model name (`"WIFI_4SWITCH_V3"`, `"EVA_BULB"`, ...).
    pub name: String,

    /// Google-style device type URI.
    #[serde(default)]
    pub gtype: Option<String>,

    /// Marketing name of the model.
    #[serde(default)]
    pub long_name: Option<String>,

    /// Supported trait URIs.
    #[serde(default)]
    pub traits: Vec<String>,
}

/// Chip identity reference embedded in a device record.
#[derive(Debug, Clone, Deserialize)]
pub struct UuidRef {
    /// Chip id reported by the device's `/info` endpoint.
    pub uuid: String,
}

impl CloudDevice {
    /// Returns the chip id, if the record carries one.
    #[must_use]
    pub fn chip_id(&self) -> Option<&str> {
        self.uuid_ref.as_ref().map(|r| r.uuid.as_str())
    }

    /// Returns the hardware model name, if known.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.type_id.as_ref().map(|t| t.name.as_str())
    }

    /// Returns true if local control of this model is supported.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.model().is_some_and(|m| SUPPORTED_MODELS.contains(&m))
    }

    /// Returns true if the record has everything needed for local pairing.
    ///
    /// Pairing needs the MQTT password (to derive the toggle password) and
    /// the chip id (to confirm the probed IP belongs to this unit).
    #[must_use]
    pub fn is_pairable(&self) -> bool {
        self.mqtt_password.is_some() && self.chip_id().is_some()
    }

    /// Returns the label shown in selection lists.
    #[must_use]
    pub fn display_label(&self) -> String {
        match self.chip_id() {
            Some(chip_id) => format!("{} ({chip_id})", self.name),
            None => self.name.clone(),
        }
    }

    /// Flattens this record into per-relay nodes.
    ///
    /// Multi-switch panels become one node per relay, named
    /// `"{device} {node label}"`. A record with no node labels but a single
    /// type label is treated as a one-relay device, as the backend encodes
    /// bulbs and plugs that way.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        let labels: &[String] = if self.devices.is_empty() {
            if self.device_types.len() == 1 {
                &self.device_types
            } else {
                &[]
            }
        } else {
            &self.devices
        };

        if labels.is_empty() {
            // Single-node device with no labels at all (EVA_BULB style).
            return vec![Node {
                id: format!("{}-1", self.id),
                device_id: self.id.clone(),
                name: self.name.clone(),
                relay: RelayIndex::one(),
                kind: self.node_kind(0),
                local_ip: None,
                pairing: PairingStatus::Unpaired,
            }];
        }

        labels
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| {
                #[allow(clippy::cast_possible_truncation)]
                let relay = RelayIndex::new(idx as u8 + 1).ok()?;
                let name = if self.devices.is_empty() {
                    self.name.clone()
                } else {
                    format!("{} {label}", self.name)
                };
                Some(Node {
                    id: format!("{}-{}", self.id, relay.value()),
                    device_id: self.id.clone(),
                    name,
                    relay,
                    kind: self.node_kind(idx),
                    local_ip: None,
                    pairing: PairingStatus::Unpaired,
                })
            })
            .collect()
    }

    fn node_kind(&self, idx: usize) -> DeviceKind {
        if let Some(label) = self.device_types.get(idx) {
            return DeviceKind::from_label(label);
        }
        match self.model() {
            Some("EVA_BULB" | "WIFI_BULB_WHITE_V1" | "Dimmable Light" | "WIFI_4DIMMER") => {
                DeviceKind::Light
            }
            Some(m) if FAN_MODELS.contains(&m) => DeviceKind::Fan,
            Some(m) if m.contains("DOOR_LOCK") => DeviceKind::Lock,
            _ => DeviceKind::Socket,
        }
    }
}

/// A single controllable node: one relay of one physical device.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node identifier, `"{device id}-{relay}"`.
    pub id: String,
    /// Identifier of the physical device this node belongs to.
    pub device_id: String,
    /// User-facing node name.
    pub name: String,
    /// Relay this node drives.
    pub relay: RelayIndex,
    /// Appliance classification.
    pub kind: DeviceKind,
    /// Local IP, once assigned by the operator.
    pub local_ip: Option<String>,
    /// Pairing lifecycle state.
    pub pairing: PairingStatus,
}

impl Node {
    /// Assigns a local IP. Resets the pairing state until validated.
    pub fn assign_ip(&mut self, ip: impl Into<String>) {
        self.local_ip = Some(ip.into());
        self.pairing = PairingStatus::Unpaired;
    }

    /// Marks the node validated. Requires an assigned IP.
    ///
    /// Without an IP the node stays in its current state; a record with no
    /// assigned IP is never validated.
    pub fn mark_validated(&mut self) {
        if self.local_ip.is_some() {
            self.pairing = PairingStatus::Validated;
        }
    }

    /// Marks the node's pairing as failed.
    pub fn mark_failed(&mut self) {
        self.pairing = PairingStatus::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi_switch_record() -> CloudDevice {
        serde_json::from_value(serde_json::json!({
            "_id": "64a1",
            "name": "Hall",
            "devices": ["Light", "Fan", "Socket"],
            "deviceTypes": ["Tubelight", "Fan", "Socket"],
            "typeId": {
                "name": "WIFI_3SWITCH_1FAN",
                "gtype": "action.devices.types.SWITCH",
                "long_name": "Wifi 3 Switch 1 Fan",
                "traits": []
            },
            "mqttPassword": "mq-pass",
            "uuidRef": { "uuid": "777777" }
        }))
        .unwrap()
    }

    #[test]
    fn parses_record_fields() {
        let device = multi_switch_record();
        assert_eq!(device.id, "64a1");
        assert_eq!(device.chip_id(), Some("777777"));
        assert_eq!(device.model(), Some("WIFI_3SWITCH_1FAN"));
        assert!(device.is_supported());
        assert!(device.is_pairable());
    }

    #[test]
    fn display_label_includes_chip_id() {
        assert_eq!(multi_switch_record().display_label(), "Hall (777777)");
    }

    #[test]
    fn flattens_multi_switch_into_nodes() {
        let nodes = multi_switch_record().nodes();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].id, "64a1-1");
        assert_eq!(nodes[0].name, "Hall Light");
        assert_eq!(nodes[0].kind, DeviceKind::Light);
        assert_eq!(nodes[1].relay.value(), 2);
        assert_eq!(nodes[1].kind, DeviceKind::Fan);
        assert_eq!(nodes[2].kind, DeviceKind::Socket);
    }

    #[test]
    fn single_node_uses_type_labels() {
        let device: CloudDevice = serde_json::from_value(serde_json::json!({
            "_id": "64b2",
            "name": "Geyser",
            "devices": [],
            "deviceTypes": ["Heater"],
            "typeId": { "name": "WIFI_SWITCH_V3" },
            "mqttPassword": "mq",
            "uuidRef": { "uuid": "123456" }
        }))
        .unwrap();

        let nodes = device.nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "Geyser");
        assert_eq!(nodes[0].relay.value(), 1);
        assert_eq!(nodes[0].kind, DeviceKind::Heater);
    }

    #[test]
    fn bulb_without_labels_is_a_light() {
        let device: CloudDevice = serde_json::from_value(serde_json::json!({
            "_id": "64c3",
            "name": "Bedside",
            "typeId": { "name": "EVA_BULB" }
        }))
        .unwrap();

        let nodes = device.nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].kind, DeviceKind::Light);
        assert!(!device.is_pairable());
    }

    #[test]
    fn unsupported_model_detected() {
        let device: CloudDevice = serde_json::from_value(serde_json::json!({
            "_id": "64d4",
            "name": "Hub",
            "typeId": { "name": "EVA_HUB" }
        }))
        .unwrap();
        assert!(!device.is_supported());
    }

    #[test]
    fn node_validation_requires_ip() {
        let mut node = multi_switch_record().nodes().remove(0);
        node.mark_validated();
        assert_eq!(node.pairing, PairingStatus::Unpaired);

        node.assign_ip("192.168.1.50");
        node.mark_validated();
        assert_eq!(node.pairing, PairingStatus::Validated);
    }

    #[test]
    fn assigning_new_ip_resets_validation() {
        let mut node = multi_switch_record().nodes().remove(0);
        node.assign_ip("192.168.1.50");
        node.mark_validated();
        node.assign_ip("192.168.1.60");
        assert_eq!(node.pairing, PairingStatus::Unpaired);
    }
}
