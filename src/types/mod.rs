// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core value types for Tinxy devices.
//!
//! This module provides validated types for addressing relays, setting
//! brightness, and classifying device nodes.

mod brightness;
mod kind;
mod relay;

pub use brightness::Brightness;
pub use kind::DeviceKind;
pub use relay::{RelayAction, RelayIndex};

/// Pairing lifecycle of a device record.
///
/// A record becomes [`Validated`](PairingStatus::Validated) only after a
/// successful probe of its assigned IP address. A record with no assigned IP
/// is never `Validated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingStatus {
    /// No local IP has been confirmed for this device.
    #[default]
    Unpaired,
    /// The assigned IP answered the probe with its local API enabled.
    Validated,
    /// Probing the assigned IP failed after the retry budget was exhausted.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_status_defaults_to_unpaired() {
        assert_eq!(PairingStatus::default(), PairingStatus::Unpaired);
    }
}
