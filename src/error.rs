// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Tinxy local-control library.
//!
//! This module provides a comprehensive error hierarchy for handling failures
//! across the library: value validation, HTTP communication with the cloud
//! backend and the device's local API, JSON parsing, and device operations.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when pairing or
/// controlling Tinxy devices.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during HTTP communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The account has no devices registered.
    #[error("no devices registered to this account")]
    NoDevices,

    /// The operator cancelled an interactive prompt.
    #[error("cancelled at prompt")]
    Cancelled,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values, or when user input cannot be interpreted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid relay action string was provided.
    #[error("invalid relay action: {0}")]
    InvalidAction(String),

    /// A device selection could not be interpreted as an index.
    #[error("invalid selection: {0:?} is not a number")]
    InvalidSelection(String),

    /// A device selection index is outside the listed devices.
    #[error("selection {actual} is out of range: expected an index in [0, {len})")]
    SelectionOutOfRange {
        /// Number of listed devices.
        len: usize,
        /// The index that was requested.
        actual: usize,
    },
}

/// Errors related to HTTP communication with the cloud backend or a device.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the remote endpoint failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The endpoint answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// The bearer token was rejected by the cloud backend.
    #[error("unauthorized: bearer token rejected")]
    Unauthorized,
}

/// Errors related to parsing cloud or device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device answered but its local API is switched off.
    #[error("local API is not enabled on {host}")]
    LocalApiDisabled {
        /// Host or IP that was probed.
        host: String,
    },

    /// The device at the probed address is a different unit.
    #[error("device at {host} reports chip id {actual}, expected {expected}")]
    WrongChipId {
        /// Host or IP that was probed.
        host: String,
        /// Chip id the device reported.
        actual: String,
        /// Chip id that was expected.
        expected: String,
    },

    /// Command was rejected by the device.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// The per-device command queue is full.
    #[error("command queue full ({limit} pending)")]
    QueueFull {
        /// Queue capacity.
        limit: usize,
    },

    /// A queued command was replaced by a newer one for the same relay.
    #[error("superseded by a newer command for the same relay")]
    Superseded,

    /// A queued command waited too long before execution.
    #[error("command timed out in queue after {0} ms")]
    QueueTimeout(u64),

    /// The hub is shutting down and no longer accepts commands.
    #[error("hub is shutting down")]
    ShuttingDown,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 1,
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [1, 100]");
    }

    #[test]
    fn selection_error_display() {
        let err = ValueError::SelectionOutOfRange { len: 3, actual: 7 };
        assert_eq!(
            err.to_string(),
            "selection 7 is out of range: expected an index in [0, 3)"
        );
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidSelection("abc".to_string());
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::InvalidSelection(_))));
    }

    #[test]
    fn device_error_display() {
        let err = DeviceError::LocalApiDisabled {
            host: "192.168.1.50".to_string(),
        };
        assert_eq!(err.to_string(), "local API is not enabled on 192.168.1.50");
    }

    #[test]
    fn wrong_chip_id_display() {
        let err = DeviceError::WrongChipId {
            host: "192.168.1.50".to_string(),
            actual: "111111".to_string(),
            expected: "777777".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "device at 192.168.1.50 reports chip id 111111, expected 777777"
        );
    }
}
