// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interactive pairing tool for Tinxy devices.
//!
//! Prompts for the account's bearer token, lists the registered devices,
//! and validates a local IP per selected device. The resulting
//! `(device, IP)` pairings are printed at the end; feed them to whatever
//! consumes local control, e.g. a Home Assistant configuration.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use tinxy_local::cloud::{CloudClient, CloudConfig};
use tinxy_local::probe::{Prober, RetryPolicy};
use tinxy_local::registrar::{Registrar, StdConsole};

#[tokio::main]
async fn main() -> tinxy_local::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = CloudConfig::new();
    if let Ok(backend) = std::env::var("TINXY_BACKEND") {
        config = config.with_base_url(backend);
    }

    let cloud = CloudClient::with_config(config)?;
    let prober = Prober::new().with_policy(
        RetryPolicy::new()
            .with_max_attempts(3)
            .with_interval(Duration::from_secs(2)),
    );

    let mut registrar = Registrar::new(StdConsole::new(), cloud, prober);

    let pairings = registrar.run().await?;

    if pairings.is_empty() {
        println!("No devices were paired.");
        return Ok(());
    }

    println!("\nPaired devices:");
    for pairing in &pairings {
        println!(
            "  {} ({}) -> {}",
            pairing.device_name, pairing.device_id, pairing.local_ip
        );
    }

    Ok(())
}
