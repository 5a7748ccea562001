//! Indian postal (PIN) code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PinCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PinCodeError {
    /// The input string is empty.
    #[error("PIN code cannot be empty")]
    Empty,
    /// The input is not a valid 6-digit PIN code.
    #[error("PIN code must be 6 digits and cannot start with 0")]
    Invalid,
}

/// An Indian postal (PIN) code: exactly six digits, the first in `1-9`.
///
/// ## Examples
///
/// ```
/// use spice_pantry_core::PinCode;
///
/// assert!(PinCode::parse("600001").is_ok());
/// assert!(PinCode::parse("060001").is_err()); // leading zero
/// assert!(PinCode::parse("60001").is_err());  // too short
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PinCode(String);

impl PinCode {
    /// Parse a `PinCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`PinCodeError::Empty`] for blank input, [`PinCodeError::Invalid`]
    /// for anything that is not six digits starting with `1-9`.
    pub fn parse(s: &str) -> Result<Self, PinCodeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PinCodeError::Empty);
        }

        if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(PinCodeError::Invalid);
        }

        if !matches!(trimmed.chars().next(), Some('1'..='9')) {
            return Err(PinCodeError::Invalid);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the PIN code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PinCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PinCode {
    type Err = PinCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
