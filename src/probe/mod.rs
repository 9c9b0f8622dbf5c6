// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Probing a device's local API.
//!
//! A probe is a read-only `GET /info` that classifies the address: local API
//! enabled, local API disabled, a different unit than expected, or no device
//! at all. Probing never changes device state, so it is safe to repeat, but
//! attempts are still paced by a [`RetryPolicy`] and bounded rather than
//! retried forever.
//!
//! # Examples
//!
//! ```no_run
//! use tinxy_local::probe::{ProbeOutcome, Prober, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn example() -> tinxy_local::Result<()> {
//! let prober = Prober::new().with_policy(
//!     RetryPolicy::new()
//!         .with_max_attempts(3)
//!         .with_interval(Duration::from_secs(2)),
//! );
//!
//! match prober.probe("192.168.1.50", Some("777777")).await? {
//!     ProbeOutcome::LocalApiEnabled(info) => println!("ok, rssi {}", info.rssi),
//!     other => println!("not usable: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use crate::device::DeviceInfo;
use crate::error::{DeviceError, Error, ProtocolError};
use crate::protocol::HttpConfig;

/// Bounded retry settings for probing.
///
/// A permanently unreachable address terminates after exactly
/// `max_attempts` attempts, spaced no closer than `interval` apart.
///
/// # Examples
///
/// ```
/// use tinxy_local::probe::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_attempts(5)
///     .with_interval(Duration::from_secs(1));
/// assert_eq!(policy.max_attempts(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl RetryPolicy {
    /// Default number of attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Default spacing between attempts.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt budget. Clamped to at least one attempt.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the minimum spacing between attempts.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns the attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the spacing between attempts.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

/// Classification of a probed address.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    /// The device answered `/info` and its local API is usable.
    LocalApiEnabled(Box<DeviceInfo>),
    /// The device answered, but the local API is switched off.
    LocalApiDisabled,
    /// The device answered with a chip id other than the expected one.
    WrongChipId {
        /// Chip id the device reported.
        actual: String,
    },
    /// No device answered at this address.
    Unreachable,
}

impl ProbeOutcome {
    /// Returns true if this outcome validates a pairing.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::LocalApiEnabled(_))
    }

    /// Converts a non-usable outcome into the matching error for `host`.
    ///
    /// # Errors
    ///
    /// Always errors except for [`ProbeOutcome::LocalApiEnabled`].
    pub fn into_result(self, host: &str, expected_chip_id: Option<&str>) -> Result<DeviceInfo, Error> {
        match self {
            Self::LocalApiEnabled(info) => Ok(*info),
            Self::LocalApiDisabled => Err(DeviceError::LocalApiDisabled {
                host: host.to_string(),
            }
            .into()),
            Self::WrongChipId { actual } => Err(DeviceError::WrongChipId {
                host: host.to_string(),
                actual,
                expected: expected_chip_id.unwrap_or_default().to_string(),
            }
            .into()),
            Self::Unreachable => Err(ProtocolError::ConnectionFailed(format!(
                "no device answered at {host}; verify the device and your network"
            ))
            .into()),
        }
    }
}

/// Read-only prober for device local APIs.
#[derive(Debug, Clone)]
pub struct Prober {
    policy: RetryPolicy,
    timeout: Duration,
}

impl Prober {
    /// Creates a prober with the default retry policy and timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Probes `host` once.
    ///
    /// # Errors
    ///
    /// Returns error only when the HTTP client cannot be created; network
    /// failures are classified, not propagated.
    pub async fn probe_once(
        &self,
        host: &str,
        expected_chip_id: Option<&str>,
    ) -> Result<ProbeOutcome, Error> {
        let client = HttpConfig::new(host)
            .with_timeout(self.timeout)
            .into_client()
            .map_err(Error::Protocol)?;

        let outcome = match client.get_json("/info").await {
            Ok(body) => match serde_json::from_value::<DeviceInfo>(body) {
                Ok(info) => match expected_chip_id {
                    Some(expected) if info.chip_id != expected => ProbeOutcome::WrongChipId {
                        actual: info.chip_id,
                    },
                    _ => ProbeOutcome::LocalApiEnabled(Box::new(info)),
                },
                // Something answered, but not with the info payload.
                Err(_) => ProbeOutcome::LocalApiDisabled,
            },
            Err(ProtocolError::UnexpectedStatus(400)) => ProbeOutcome::LocalApiDisabled,
            Err(_) => ProbeOutcome::Unreachable,
        };

        tracing::debug!(host = %host, outcome = ?outcome_label(&outcome), "Probed device");

        Ok(outcome)
    }

    /// Probes `host`, retrying unreachable addresses within the policy.
    ///
    /// Conclusive answers (enabled, disabled, wrong chip id) are returned
    /// immediately; only [`ProbeOutcome::Unreachable`] is retried, up to
    /// `max_attempts` total attempts spaced `interval` apart.
    ///
    /// # Errors
    ///
    /// Returns error only when the HTTP client cannot be created.
    pub async fn probe(
        &self,
        host: &str,
        expected_chip_id: Option<&str>,
    ) -> Result<ProbeOutcome, Error> {
        let mut attempt = 1;
        loop {
            let outcome = self.probe_once(host, expected_chip_id).await?;

            if !matches!(outcome, ProbeOutcome::Unreachable) {
                return Ok(outcome);
            }

            if attempt >= self.policy.max_attempts {
                tracing::warn!(
                    host = %host,
                    attempts = attempt,
                    "Device unreachable after retry budget"
                );
                return Ok(ProbeOutcome::Unreachable);
            }

            tracing::debug!(
                host = %host,
                attempt,
                max_attempts = self.policy.max_attempts,
                "Device unreachable, retrying"
            );

            tokio::time::sleep(self.policy.interval).await;
            attempt += 1;
        }
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            timeout: HttpConfig::DEFAULT_TIMEOUT,
        }
    }
}

fn outcome_label(outcome: &ProbeOutcome) -> &'static str {
    match outcome {
        ProbeOutcome::LocalApiEnabled(_) => "local_api_enabled",
        ProbeOutcome::LocalApiDisabled => "local_api_disabled",
        ProbeOutcome::WrongChipId { .. } => "wrong_chip_id",
        ProbeOutcome::Unreachable => "unreachable",
    }
}
