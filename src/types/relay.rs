// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay-related types for Tinxy devices.
//!
//! This module provides types for addressing specific relays on multi-switch
//! devices and for describing the action to apply to a relay.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// The action to apply to a relay.
///
/// The local API encodes actions as the strings `"0"` (off) and `"1"` (on)
/// inside the toggle payload.
///
/// # Examples
///
/// ```
/// use tinxy_local::types::RelayAction;
///
/// assert_eq!(RelayAction::On.as_wire_str(), "1");
/// assert_eq!(RelayAction::Off.as_wire_str(), "0");
/// assert_eq!(RelayAction::from(true), RelayAction::On);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayAction {
    /// Switch the relay off.
    Off,
    /// Switch the relay on.
    On,
}

impl RelayAction {
    /// Returns the string the local API expects in the toggle payload.
    #[must_use]
    pub const fn as_wire_str(&self) -> &'static str {
        match self {
            Self::Off => "0",
            Self::On => "1",
        }
    }

    /// Returns a human-readable name for the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }
}

impl fmt::Display for RelayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelayAction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "0" | "false" => Ok(Self::Off),
            "on" | "1" | "true" => Ok(Self::On),
            _ => Err(ValueError::InvalidAction(s.to_string())),
        }
    }
}

impl From<bool> for RelayAction {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Index of a relay on a multi-switch device.
///
/// Tinxy panels expose up to 8 relays, numbered from 1.
///
/// # Examples
///
/// ```
/// use tinxy_local::types::RelayIndex;
///
/// let idx = RelayIndex::new(2).unwrap();
/// assert_eq!(idx.value(), 2);
///
/// assert!(RelayIndex::new(0).is_err());
/// assert!(RelayIndex::new(9).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelayIndex(u8);

impl RelayIndex {
    /// Maximum relay number on any supported panel.
    pub const MAX: u8 = 8;

    /// Creates a relay index.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::OutOfRange`] if `value` is not in `1..=8`.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if (1..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValueError::OutOfRange {
                min: 1,
                max: u16::from(Self::MAX),
                actual: u16::from(value),
            })
        }
    }

    /// Returns the index for the first relay.
    #[must_use]
    pub const fn one() -> Self {
        Self(1)
    }

    /// Returns the relay number.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl Default for RelayIndex {
    fn default() -> Self {
        Self::one()
    }
}

impl fmt::Display for RelayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_action_wire_strings() {
        assert_eq!(RelayAction::On.as_wire_str(), "1");
        assert_eq!(RelayAction::Off.as_wire_str(), "0");
    }

    #[test]
    fn relay_action_from_str() {
        assert_eq!("on".parse::<RelayAction>().unwrap(), RelayAction::On);
        assert_eq!("OFF".parse::<RelayAction>().unwrap(), RelayAction::Off);
        assert_eq!("1".parse::<RelayAction>().unwrap(), RelayAction::On);
        assert!("dim".parse::<RelayAction>().is_err());
    }

    #[test]
    fn relay_action_from_bool() {
        assert_eq!(RelayAction::from(true), RelayAction::On);
        assert_eq!(RelayAction::from(false), RelayAction::Off);
    }

    #[test]
    fn relay_index_valid_range() {
        assert_eq!(RelayIndex::new(1).unwrap().value(), 1);
        assert_eq!(RelayIndex::new(8).unwrap().value(), 8);
    }

    #[test]
    fn relay_index_rejects_zero_and_nine() {
        assert!(RelayIndex::new(0).is_err());
        assert!(RelayIndex::new(9).is_err());
    }

    #[test]
    fn relay_index_default_is_one() {
        assert_eq!(RelayIndex::default(), RelayIndex::one());
    }
}
