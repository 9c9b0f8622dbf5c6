// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interactive pairing flow.
//!
//! The registrar walks the operator through assembling `(device, local IP)`
//! pairings: request the bearer token, list the account's devices, take a
//! selection, take an IP, and validate it by probing the device's local API.
//! The flow is an explicit state machine; cloud access and probing sit
//! behind traits so the machine is testable without a network or terminal.
//!
//! # Examples
//!
//! ```no_run
//! use tinxy_local::cloud::CloudClient;
//! use tinxy_local::probe::Prober;
//! use tinxy_local::registrar::{Registrar, StdConsole};
//!
//! # async fn example() -> tinxy_local::Result<()> {
//! let mut registrar = Registrar::new(StdConsole::new(), CloudClient::new()?, Prober::new());
//! let pairings = registrar.run().await?;
//!
//! for pairing in &pairings {
//!     println!("{} -> {}", pairing.device_id, pairing.local_ip);
//! }
//! # Ok(())
//! # }
//! ```

mod console;

use crate::cloud::{CloudClient, CloudDevice, Node, PairingSession};
use crate::error::{Error, ProtocolError, ValueError};
use crate::probe::{ProbeOutcome, Prober};

pub use console::{Console, StdConsole};

/// Remote side of the pairing flow: token check and device listing.
pub trait DeviceSource {
    /// Confirms the session's token is accepted.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the token is rejected, or a network
    /// error when the backend is unreachable.
    async fn authenticate(&self, session: &PairingSession) -> Result<(), Error>;

    /// Returns the account's devices, in backend order.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`authenticate`](Self::authenticate).
    async fn list_devices(&self, session: &PairingSession) -> Result<Vec<CloudDevice>, Error>;
}

impl DeviceSource for CloudClient {
    async fn authenticate(&self, session: &PairingSession) -> Result<(), Error> {
        CloudClient::authenticate(self, session).await
    }

    async fn list_devices(&self, session: &PairingSession) -> Result<Vec<CloudDevice>, Error> {
        CloudClient::list_devices(self, session).await
    }
}

/// Local side of the pairing flow: probing a candidate IP.
pub trait LocalValidator {
    /// Probes `host`, applying the validator's retry budget.
    ///
    /// # Errors
    ///
    /// Returns error when the probe cannot be set up at all; network
    /// failures are classified into the outcome instead.
    async fn validate(
        &self,
        host: &str,
        expected_chip_id: Option<&str>,
    ) -> Result<ProbeOutcome, Error>;
}

impl LocalValidator for Prober {
    async fn validate(
        &self,
        host: &str,
        expected_chip_id: Option<&str>,
    ) -> Result<ProbeOutcome, Error> {
        self.probe(host, expected_chip_id).await
    }
}

/// A completed association between a cloud device and a local IP.
#[derive(Debug, Clone)]
pub struct Pairing {
    /// Cloud identifier of the device.
    pub device_id: String,
    /// User-facing device name.
    pub device_name: String,
    /// Chip id of the device, when the record carries one.
    pub chip_id: Option<String>,
    /// MQTT password, needed to control the device locally.
    pub mqtt_password: Option<String>,
    /// The validated local IP address.
    pub local_ip: String,
    /// The device's nodes, carrying the assigned IP and their
    /// [`PairingStatus`](crate::types::PairingStatus).
    pub nodes: Vec<Node>,
}

/// Per-device states of the pairing flow.
enum PairState<'a> {
    AwaitSelection,
    AwaitLocalIp { device: &'a CloudDevice },
    Validating { device: &'a CloudDevice, ip: String },
}

/// Interactive pairing state machine.
pub struct Registrar<C, S, V> {
    console: C,
    source: S,
    validator: V,
    max_token_attempts: u32,
}

impl<C, S, V> Registrar<C, S, V>
where
    C: Console,
    S: DeviceSource,
    V: LocalValidator,
{
    /// Default number of token entries before giving up.
    pub const DEFAULT_MAX_TOKEN_ATTEMPTS: u32 = 3;

    /// Creates a registrar.
    pub fn new(console: C, source: S, validator: V) -> Self {
        Self {
            console,
            source,
            validator,
            max_token_attempts: Self::DEFAULT_MAX_TOKEN_ATTEMPTS,
        }
    }

    /// Sets how many rejected tokens end the run. Clamped to at least one.
    #[must_use]
    pub fn with_max_token_attempts(mut self, attempts: u32) -> Self {
        self.max_token_attempts = attempts.max(1);
        self
    }

    /// Runs the full flow: token, listing, then one pairing per iteration
    /// until the operator stops.
    ///
    /// Cancelling a prompt ends the loop; pairings completed up to that
    /// point are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Unauthorized`] when the token keeps being
    /// rejected, a network error when the device listing fails, or
    /// [`Error::NoDevices`] when the account has nothing pairable.
    pub async fn run(&mut self) -> Result<Vec<Pairing>, Error> {
        let session = self.acquire_session().await?;

        // Listing errors are fatal for the run; the operator is told to
        // re-run the tool.
        let devices = self.source.list_devices(&session).await?;
        let selectable: Vec<CloudDevice> =
            devices.into_iter().filter(CloudDevice::is_pairable).collect();

        if selectable.is_empty() {
            self.console
                .say("No pairable devices found on this account.");
            return Err(Error::NoDevices);
        }

        let mut pairings = Vec::new();

        loop {
            match self.pair_one(&selectable).await {
                Ok(pairing) => {
                    self.console.say(&format!(
                        "Paired {} -> {}",
                        pairing.device_name, pairing.local_ip
                    ));
                    pairings.push(pairing);
                }
                Err(Error::Cancelled) => break,
                Err(e) => {
                    self.console.say(&format!("Pairing failed: {e}"));
                }
            }

            match self.console.confirm("Add another device?", false) {
                Ok(true) => {}
                Ok(false) | Err(Error::Cancelled) => break,
                Err(e) => return Err(e),
            }
        }

        Ok(pairings)
    }

    /// Prompts for a bearer token until the backend accepts one.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Unauthorized`] once the attempt budget is
    /// spent, [`Error::Cancelled`] when the prompt is aborted, or any
    /// network error immediately (those are not retried here).
    pub async fn acquire_session(&mut self) -> Result<PairingSession, Error> {
        let mut attempt = 1;
        loop {
            let token = self.console.prompt_secret("Please enter your Bearer token")?;
            let session = PairingSession::new(token);

            match self.source.authenticate(&session).await {
                Ok(()) => {
                    self.console.say("Token accepted.");
                    return Ok(session);
                }
                Err(Error::Protocol(ProtocolError::Unauthorized)) => {
                    if attempt >= self.max_token_attempts {
                        self.console
                            .say("Bearer token rejected. Re-run the tool with a valid token.");
                        return Err(ProtocolError::Unauthorized.into());
                    }
                    self.console.say("Bearer token rejected, try again.");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Pairs a single device: selection, IP entry, validation.
    ///
    /// # Errors
    ///
    /// Returns the validation error when the chosen IP cannot be confirmed
    /// and the operator declines to retry, or [`Error::Cancelled`] when a
    /// prompt is aborted.
    pub async fn pair_one(&mut self, devices: &[CloudDevice]) -> Result<Pairing, Error> {
        let mut state = PairState::AwaitSelection;

        loop {
            state = match state {
                PairState::AwaitSelection => {
                    self.show_devices(devices);
                    let input = self
                        .console
                        .prompt(&format!("Select a device [0-{}]", devices.len() - 1))?;

                    match parse_selection(&input, devices.len()) {
                        Ok(index) => PairState::AwaitLocalIp {
                            device: &devices[index],
                        },
                        Err(e) => {
                            self.console.say(&e.to_string());
                            PairState::AwaitSelection
                        }
                    }
                }

                PairState::AwaitLocalIp { device } => {
                    let ip = self.console.prompt(&format!(
                        "Enter the local IP address for {}",
                        device.name
                    ))?;

                    if ip.trim().is_empty() {
                        self.console.say("An IP address is required.");
                        PairState::AwaitLocalIp { device }
                    } else {
                        PairState::Validating {
                            device,
                            ip: ip.trim().to_string(),
                        }
                    }
                }

                PairState::Validating { device, ip } => {
                    self.console
                        .say(&format!("Probing {} at {ip}...", device.name));

                    let mut nodes = device.nodes();
                    for node in &mut nodes {
                        node.assign_ip(ip.clone());
                    }

                    let outcome = self.validator.validate(&ip, device.chip_id()).await?;

                    match outcome.into_result(&ip, device.chip_id()) {
                        Ok(_) => {
                            for node in &mut nodes {
                                node.mark_validated();
                            }
                            tracing::info!(
                                device_id = %device.id,
                                ip = %ip,
                                nodes = nodes.len(),
                                "Device validated"
                            );
                            return Ok(Pairing {
                                device_id: device.id.clone(),
                                device_name: device.name.clone(),
                                chip_id: device.chip_id().map(str::to_string),
                                mqtt_password: device.mqtt_password.clone(),
                                local_ip: ip,
                                nodes,
                            });
                        }
                        Err(err) => {
                            for node in &mut nodes {
                                node.mark_failed();
                            }
                            tracing::warn!(
                                device_id = %device.id,
                                ip = %ip,
                                "Device validation failed"
                            );
                            self.console
                                .say(&format!("Could not validate {}: {err}", device.name));
                            match self.console.confirm("Try a different IP address?", false) {
                                Ok(true) => PairState::AwaitLocalIp { device },
                                Ok(false) => return Err(err),
                                Err(_) => return Err(err),
                            }
                        }
                    }
                }
            };
        }
    }

    fn show_devices(&mut self, devices: &[CloudDevice]) {
        self.console.say("Devices on this account:");
        for (index, device) in devices.iter().enumerate() {
            self.console
                .say(&format!("  [{index}] {}", device.display_label()));
        }
    }
}

/// Parses a device selection, accepting only indices in `[0, len)`.
fn parse_selection(input: &str, len: usize) -> Result<usize, ValueError> {
    let index: usize = input
        .trim()
        .parse()
        .map_err(|_| ValueError::InvalidSelection(input.trim().to_string()))?;

    if index < len {
        Ok(index)
    } else {
        Err(ValueError::SelectionOutOfRange { len, actual: index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_accepts_valid_indices() {
        assert_eq!(parse_selection("0", 3).unwrap(), 0);
        assert_eq!(parse_selection("2", 3).unwrap(), 2);
        assert_eq!(parse_selection(" 1 ", 3).unwrap(), 1);
    }

    #[test]
    fn selection_rejects_out_of_range() {
        assert_eq!(
            parse_selection("3", 3),
            Err(ValueError::SelectionOutOfRange { len: 3, actual: 3 })
        );
    }

    #[test]
    fn selection_rejects_non_numeric() {
        assert!(matches!(
            parse_selection("two", 3),
            Err(ValueError::InvalidSelection(_))
        ));
        assert!(matches!(
            parse_selection("-1", 3),
            Err(ValueError::InvalidSelection(_))
        ));
        assert!(matches!(
            parse_selection("", 3),
            Err(ValueError::InvalidSelection(_))
        ));
    }
}
