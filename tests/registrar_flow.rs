// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests for the interactive registrar, driven by a scripted
//! console and stubbed cloud/probe backends. No network, no terminal.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use tinxy_local::cloud::{CloudDevice, PairingSession};
use tinxy_local::error::{Error, ProtocolError};
use tinxy_local::probe::ProbeOutcome;
use tinxy_local::registrar::{Console, DeviceSource, LocalValidator, Registrar};
use tinxy_local::types::PairingStatus;

// ============================================================================
// Test doubles
// ============================================================================

/// Console that replays canned answers and records everything said to it.
struct ScriptedConsole {
    inputs: VecDeque<String>,
    secrets: VecDeque<String>,
    confirms: VecDeque<bool>,
    transcript: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConsole {
    fn new() -> Self {
        Self {
            inputs: VecDeque::new(),
            secrets: VecDeque::new(),
            confirms: VecDeque::new(),
            transcript: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_inputs(mut self, inputs: &[&str]) -> Self {
        self.inputs = inputs.iter().map(ToString::to_string).collect();
        self
    }

    fn with_secrets(mut self, secrets: &[&str]) -> Self {
        self.secrets = secrets.iter().map(ToString::to_string).collect();
        self
    }

    fn with_confirms(mut self, confirms: &[bool]) -> Self {
        self.confirms = confirms.iter().copied().collect();
        self
    }

    fn transcript_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.transcript)
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, message: &str) {
        self.transcript.lock().push(message.to_string());
    }

    fn prompt(&mut self, _message: &str) -> Result<String, Error> {
        self.inputs.pop_front().ok_or(Error::Cancelled)
    }

    fn prompt_secret(&mut self, _message: &str) -> Result<String, Error> {
        self.secrets.pop_front().ok_or(Error::Cancelled)
    }

    fn confirm(&mut self, _message: &str, _default: bool) -> Result<bool, Error> {
        self.confirms.pop_front().ok_or(Error::Cancelled)
    }
}

/// Cloud stub: accepts one token, serves a fixed device list, counts calls.
struct StubSource {
    valid_token: String,
    devices: Vec<serde_json::Value>,
    list_calls: Arc<AtomicUsize>,
}

impl StubSource {
    fn new(valid_token: &str, devices: Vec<serde_json::Value>) -> Self {
        Self {
            valid_token: valid_token.to_string(),
            devices,
            list_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn list_calls_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.list_calls)
    }
}

impl DeviceSource for StubSource {
    async fn authenticate(&self, session: &PairingSession) -> Result<(), Error> {
        if session.token() == self.valid_token {
            Ok(())
        } else {
            Err(ProtocolError::Unauthorized.into())
        }
    }

    async fn list_devices(&self, _session: &PairingSession) -> Result<Vec<CloudDevice>, Error> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .devices
            .iter()
            .map(|value| serde_json::from_value(value.clone()).unwrap())
            .collect())
    }
}

/// Validator stub: maps IPs to fixed probe outcomes, anything else is
/// unreachable.
struct StubValidator {
    outcomes: HashMap<String, ProbeOutcome>,
}

impl StubValidator {
    fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
        }
    }

    fn reachable(mut self, ip: &str, chip_id: &str) -> Self {
        let info = serde_json::from_value(serde_json::json!({
            "rssi": -60,
            "ip": ip,
            "state": "1",
            "chip_id": chip_id
        }))
        .unwrap();
        self.outcomes
            .insert(ip.to_string(), ProbeOutcome::LocalApiEnabled(Box::new(info)));
        self
    }

    fn disabled(mut self, ip: &str) -> Self {
        self.outcomes
            .insert(ip.to_string(), ProbeOutcome::LocalApiDisabled);
        self
    }
}

impl LocalValidator for StubValidator {
    async fn validate(
        &self,
        host: &str,
        _expected_chip_id: Option<&str>,
    ) -> Result<ProbeOutcome, Error> {
        Ok(self
            .outcomes
            .get(host)
            .cloned()
            .unwrap_or(ProbeOutcome::Unreachable))
    }
}

fn lamp_device() -> serde_json::Value {
    serde_json::json!({
        "_id": "d1",
        "name": "Lamp",
        "devices": [],
        "deviceTypes": ["LED Bulb"],
        "typeId": { "name": "EVA_BULB" },
        "mqttPassword": "mq-pass",
        "uuidRef": { "uuid": "777777" }
    })
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn full_flow_pairs_a_device() {
    let console = ScriptedConsole::new()
        .with_secrets(&["abc123"])
        .with_inputs(&["0", "192.168.1.50"])
        .with_confirms(&[false]); // no more devices

    let source = StubSource::new("abc123", vec![lamp_device()]);
    let validator = StubValidator::new().reachable("192.168.1.50", "777777");

    let mut registrar = Registrar::new(console, source, validator);
    let pairings = registrar.run().await.unwrap();

    assert_eq!(pairings.len(), 1);
    assert_eq!(pairings[0].device_id, "d1");
    assert_eq!(pairings[0].device_name, "Lamp");
    assert_eq!(pairings[0].local_ip, "192.168.1.50");
    assert_eq!(pairings[0].chip_id.as_deref(), Some("777777"));
    assert_eq!(pairings[0].mqtt_password.as_deref(), Some("mq-pass"));

    // The device's nodes come back with the IP assigned and validated.
    assert_eq!(pairings[0].nodes.len(), 1);
    assert_eq!(pairings[0].nodes[0].local_ip.as_deref(), Some("192.168.1.50"));
    assert_eq!(pairings[0].nodes[0].pairing, PairingStatus::Validated);
}

#[tokio::test]
async fn unreachable_ip_fails_and_names_the_address() {
    let console = ScriptedConsole::new()
        .with_secrets(&["abc123"])
        .with_inputs(&["0", "192.168.1.99"])
        .with_confirms(&[false, false]); // no retry, no more devices
    let transcript = console.transcript_handle();

    let source = StubSource::new("abc123", vec![lamp_device()]);
    let validator = StubValidator::new(); // nothing reachable

    let mut registrar = Registrar::new(console, source, validator);
    let pairings = registrar.run().await.unwrap();

    assert!(pairings.is_empty());

    let transcript = transcript.lock();
    let failure = transcript
        .iter()
        .find(|line| line.starts_with("Could not validate"))
        .expect("failure message missing");
    assert!(failure.contains("Lamp"));
    assert!(failure.contains("192.168.1.99"));
}

#[tokio::test]
async fn rejected_token_never_reaches_the_device_list() {
    let console = ScriptedConsole::new().with_secrets(&["bad", "bad", "bad"]);

    let source = StubSource::new("abc123", vec![lamp_device()]);
    let list_calls = source.list_calls_handle();

    let mut registrar = Registrar::new(console, source, StubValidator::new());
    let result = registrar.run().await;

    assert!(matches!(
        result,
        Err(Error::Protocol(ProtocolError::Unauthorized))
    ));
    assert_eq!(list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn token_reprompt_succeeds_within_budget() {
    let console = ScriptedConsole::new()
        .with_secrets(&["wrong", "abc123"])
        .with_inputs(&["0", "192.168.1.50"])
        .with_confirms(&[false]);

    let source = StubSource::new("abc123", vec![lamp_device()]);
    let validator = StubValidator::new().reachable("192.168.1.50", "777777");

    let mut registrar = Registrar::new(console, source, validator);
    let pairings = registrar.run().await.unwrap();

    assert_eq!(pairings.len(), 1);
}

#[tokio::test]
async fn invalid_selection_is_reprompted() {
    let console = ScriptedConsole::new()
        .with_secrets(&["abc123"])
        .with_inputs(&["two", "9", "0", "192.168.1.50"])
        .with_confirms(&[false]);
    let transcript = console.transcript_handle();

    let source = StubSource::new("abc123", vec![lamp_device()]);
    let validator = StubValidator::new().reachable("192.168.1.50", "777777");

    let mut registrar = Registrar::new(console, source, validator);
    let pairings = registrar.run().await.unwrap();

    assert_eq!(pairings.len(), 1);

    // Both bad entries produced a complaint before the flow moved on.
    let transcript = transcript.lock();
    assert!(transcript.iter().any(|line| line.contains("two")));
    assert!(transcript.iter().any(|line| line.contains('9')));
}

#[tokio::test]
async fn retrying_a_different_ip_recovers() {
    let console = ScriptedConsole::new()
        .with_secrets(&["abc123"])
        .with_inputs(&["0", "192.168.1.99", "192.168.1.50"])
        .with_confirms(&[true, false]); // retry with new IP, then stop

    let source = StubSource::new("abc123", vec![lamp_device()]);
    let validator = StubValidator::new()
        .disabled("192.168.1.99")
        .reachable("192.168.1.50", "777777");

    let mut registrar = Registrar::new(console, source, validator);
    let pairings = registrar.run().await.unwrap();

    assert_eq!(pairings.len(), 1);
    assert_eq!(pairings[0].local_ip, "192.168.1.50");
    // The nodes carry the IP that finally validated, not the first attempt.
    assert_eq!(pairings[0].nodes[0].local_ip.as_deref(), Some("192.168.1.50"));
    assert_eq!(pairings[0].nodes[0].pairing, PairingStatus::Validated);
}

#[tokio::test]
async fn cancelling_the_token_prompt_aborts_the_run() {
    let console = ScriptedConsole::new(); // no scripted secrets

    let source = StubSource::new("abc123", vec![lamp_device()]);

    let mut registrar = Registrar::new(console, source, StubValidator::new());
    let result = registrar.run().await;

    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn cancelling_mid_selection_keeps_earlier_pairings() {
    // First device pairs, then the operator says yes to another but
    // aborts at the selection prompt.
    let console = ScriptedConsole::new()
        .with_secrets(&["abc123"])
        .with_inputs(&["0", "192.168.1.50"])
        .with_confirms(&[true]);

    let source = StubSource::new("abc123", vec![lamp_device()]);
    let validator = StubValidator::new().reachable("192.168.1.50", "777777");

    let mut registrar = Registrar::new(console, source, validator);
    let pairings = registrar.run().await.unwrap();

    assert_eq!(pairings.len(), 1);
}

#[tokio::test]
async fn empty_account_reports_no_devices() {
    let console = ScriptedConsole::new().with_secrets(&["abc123"]);

    let source = StubSource::new("abc123", Vec::new());

    let mut registrar = Registrar::new(console, source, StubValidator::new());
    let result = registrar.run().await;

    assert!(matches!(result, Err(Error::NoDevices)));
}

#[tokio::test]
async fn unpairable_devices_are_filtered_out() {
    // A record without an MQTT password cannot be controlled locally.
    let unpairable = serde_json::json!({
        "_id": "d9",
        "name": "Ghost",
        "devices": [],
        "deviceTypes": ["Socket"],
        "typeId": { "name": "WIFI_1SWITCH_V1" },
        "uuidRef": { "uuid": "999999" }
    });

    let console = ScriptedConsole::new()
        .with_secrets(&["abc123"])
        .with_inputs(&["0", "192.168.1.50"])
        .with_confirms(&[false]);
    let transcript = console.transcript_handle();

    let source = StubSource::new("abc123", vec![unpairable, lamp_device()]);
    let validator = StubValidator::new().reachable("192.168.1.50", "777777");

    let mut registrar = Registrar::new(console, source, validator);
    let pairings = registrar.run().await.unwrap();

    // Index 0 resolves to the only pairable device.
    assert_eq!(pairings[0].device_id, "d1");

    let transcript = transcript.lock();
    assert!(!transcript.iter().any(|line| line.contains("Ghost")));
}
