// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness level for dimmable nodes.

use std::fmt;

use crate::error::ValueError;

/// Brightness level for a dimmable light or fan node (1-100).
///
/// The device reports brightness in the `/info` payload as fixed-width
/// 3-digit groups, one per node.
///
/// # Examples
///
/// ```
/// use tinxy_local::types::Brightness;
///
/// let b = Brightness::new(75).unwrap();
/// assert_eq!(b.value(), 75);
///
/// assert!(Brightness::new(0).is_err());
/// assert!(Brightness::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Minimum brightness.
    pub const MIN: u8 = 1;
    /// Maximum brightness.
    pub const MAX: u8 = 100;

    /// Creates a brightness level.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::OutOfRange`] if `value` is not in `1..=100`.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX),
                actual: u16::from(value),
            })
        }
    }

    /// Returns the brightness value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns full brightness.
    #[must_use]
    pub const fn full() -> Self {
        Self(Self::MAX)
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
