// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tinxy Local - A Rust library to control Tinxy devices on the local network.
//!
//! This library provides async APIs for pairing Tinxy devices with their
//! local IP addresses and controlling them through the device's local HTTP
//! API, without going through the cloud for every command.
//!
//! # Supported Features
//!
//! - **Pairing**: interactive flow that lists the account's devices, takes a
//!   local IP per device, and validates it by probing `/info`
//! - **Probing**: classify an address as local-API-enabled, disabled, the
//!   wrong unit, or unreachable, with a bounded retry budget
//! - **Relay control**: toggle relays and set brightness on dimmable nodes
//! - **Rate limiting**: per-device command queue that spaces commands out,
//!   since rapid toggling freezes the device's local API
//! - **Status**: decode the `/info` payload into per-node on/off and
//!   brightness readings
//!
//! # Quick Start
//!
//! ## Pairing devices interactively
//!
//! ```no_run
//! use tinxy_local::cloud::CloudClient;
//! use tinxy_local::probe::Prober;
//! use tinxy_local::registrar::{Registrar, StdConsole};
//!
//! #[tokio::main]
//! async fn main() -> tinxy_local::Result<()> {
//!     let mut registrar =
//!         Registrar::new(StdConsole::new(), CloudClient::new()?, Prober::new());
//!
//!     for pairing in registrar.run().await? {
//!         println!("{} -> {}", pairing.device_id, pairing.local_ip);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Controlling a paired device
//!
//! ```no_run
//! use tinxy_local::device::{CommandQueue, Hub};
//! use tinxy_local::types::{RelayAction, RelayIndex};
//!
//! #[tokio::main]
//! async fn main() -> tinxy_local::Result<()> {
//!     let hub = Hub::new("192.168.1.50", "64a1", "mqtt-pass")?;
//!
//!     // Commands go through a queue so they are never fired too fast.
//!     let queue = CommandQueue::new(hub);
//!     queue.toggle(RelayIndex::one(), RelayAction::On).await?;
//!
//!     queue.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cloud;
pub mod device;
pub mod error;
pub mod probe;
pub mod protocol;
pub mod registrar;
pub mod types;

pub use cloud::{CloudClient, CloudConfig, CloudDevice, Node, PairingSession};
pub use device::{CommandQueue, DeviceInfo, Hub, QueuePolicy, StatusReport};
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use probe::{ProbeOutcome, Prober, RetryPolicy};
pub use protocol::{HttpClient, HttpConfig};
pub use registrar::{Console, DeviceSource, LocalValidator, Pairing, Registrar, StdConsole};
pub use types::{Brightness, DeviceKind, PairingStatus, RelayAction, RelayIndex};
