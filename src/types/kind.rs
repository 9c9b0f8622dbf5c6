// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device node classification.

use std::fmt;

/// What kind of appliance a device node controls.
///
/// The cloud record labels each node with a user-facing type string
/// (`"Socket"`, `"Fan"`, `"Tubelight"`, ...). Unknown labels fall back to
/// [`DeviceKind::Socket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceKind {
    /// A plain on/off socket or switch.
    #[default]
    Socket,
    /// A dimmable or plain light.
    Light,
    /// A fan with speed control.
    Fan,
    /// A door lock.
    Lock,
    /// A heater or geyser.
    Heater,
    /// A television.
    Tv,
    /// A music system.
    MusicSystem,
}

impl DeviceKind {
    /// Classifies a node from its cloud type label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "Fan" => Self::Fan,
            "Heater" => Self::Heater,
            "TV" => Self::Tv,
            "Music System" => Self::MusicSystem,
            "Lock" => Self::Lock,
            "Tubelight" | "LED Bulb" | "Dimmable Light" | "LED Dimmable Bulb" => Self::Light,
            _ => Self::Socket,
        }
    }

    /// Returns true if nodes of this kind accept a brightness value.
    #[must_use]
    pub const fn is_dimmable(&self) -> bool {
        matches!(self, Self::Light | Self::Fan)
    }

    /// Returns the Material Design icon name for this kind.
    ///
    /// Mirrors the icon set the cloud integration shows for each appliance.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Socket => "mdi:power-socket-eu",
            Self::Light => "mdi:lightbulb",
            Self::Fan => "mdi:fan",
            Self::Lock => "mdi:lock",
            Self::Heater => "mdi:radiator",
            Self::Tv => "mdi:television",
            Self::MusicSystem => "mdi:music",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Socket => "Socket",
            Self::Light => "Light",
            Self::Fan => "Fan",
            Self::Lock => "Lock",
            Self::Heater => "Heater",
            Self::Tv => "TV",
            Self::MusicSystem => "Music System",
        };
        write!(f, "{name}")
    }
}
