//! Indian mobile phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not a valid Indian mobile number.
    #[error("phone number must be a 10-digit Indian mobile number, optionally prefixed with +91 or 91")]
    Invalid,
}

/// An Indian mobile phone number.
///
/// Accepts an optional `+91`/`91` country-code prefix followed by a digit in
/// `6-9` and nine further digits. Internal whitespace is stripped before
/// validation. The number is stored normalized to its bare 10 digits.
///
/// ## Examples
///
/// ```
/// use spice_pantry_core::Phone;
///
/// assert_eq!(Phone::parse("+91 98765 43210").unwrap().as_str(), "9876543210");
/// assert_eq!(Phone::parse("919876543210").unwrap().as_str(), "9876543210");
/// assert!(Phone::parse("12345").is_err());
/// assert!(Phone::parse("5876543210").is_err()); // must start with 6-9
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from a string, stripping internal whitespace and an
    /// optional `+91`/`91` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::Empty`] for blank input, [`PhoneError::Invalid`]
    /// for anything that is not an Indian mobile number.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(PhoneError::Empty);
        }

        // A leading '+' is only valid as part of the +91 country code.
        let digits = if let Some(rest) = compact.strip_prefix('+') {
            rest.strip_prefix("91").ok_or(PhoneError::Invalid)?
        } else if compact.len() == 12 {
            compact.strip_prefix("91").ok_or(PhoneError::Invalid)?
        } else {
            compact.as_str()
        };

        if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::Invalid);
        }

        if !matches!(digits.chars().next(), Some('6'..='9')) {
            return Err(PhoneError::Invalid);
        }

        Ok(Self(digits.to_owned()))
    }

    /// Returns the normalized 10-digit number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns the normalized digits.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
