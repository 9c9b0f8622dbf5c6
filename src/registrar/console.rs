// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Console abstraction for the interactive registrar.

use dialoguer::{Confirm, Input, Password};

use crate::error::Error;

/// Sequential prompt interface the registrar drives.
///
/// Implementations return [`Error::Cancelled`] when the operator aborts a
/// prompt; the registrar treats that as the cancellation path out of any
/// state.
pub trait Console {
    /// Prints a line of output.
    fn say(&mut self, message: &str);

    /// Prompts for a line of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when the prompt is aborted.
    fn prompt(&mut self, message: &str) -> Result<String, Error>;

    /// Prompts for sensitive input without echoing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when the prompt is aborted.
    fn prompt_secret(&mut self, message: &str) -> Result<String, Error>;

    /// Asks a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when the prompt is aborted.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, Error>;
}

/// Terminal console backed by `dialoguer`.
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    /// Creates a terminal console.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdConsole {
    fn say(&mut self, message: &str) {
        println!("{message}");
    }

    fn prompt(&mut self, message: &str) -> Result<String, Error> {
        Input::<String>::new()
            .with_prompt(message)
            .interact_text()
            .map_err(|_| Error::Cancelled)
    }

    fn prompt_secret(&mut self, message: &str) -> Result<String, Error> {
        Password::new()
            .with_prompt(message)
            .interact()
            .map_err(|_| Error::Cancelled)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, Error> {
        Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(|_| Error::Cancelled)
    }
}
