//! Delivery-form field validation.
//!
//! One canonical pure rule set per field, shared by on-change revalidation
//! and the exhaustive check guarding the Delivery → Payment transition.
//! Email, phone, and PIN-code rules delegate to the core parse types so
//! there is exactly one source of truth per field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use spice_pantry_core::{Email, Phone, PinCode};

/// Letters and whitespace only (names, cities).
static LETTERS_AND_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("letters-and-spaces pattern is valid"));

/// Minimum trimmed length of a deliverable street address.
const MIN_ADDRESS_LEN: usize = 10;
/// Minimum trimmed length of a city name.
const MIN_CITY_LEN: usize = 2;
/// Minimum trimmed length of a state name.
const MIN_STATE_LEN: usize = 3;

/// A delivery-form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FullName,
    Email,
    Phone,
    Address,
    City,
    State,
    Zip,
}

impl Field {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FullName => "Full name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Address => "Address",
            Self::City => "City",
            Self::State => "State",
            Self::Zip => "PIN code",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-field validation errors, ordered by field for stable rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// Whether every field passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The error message for one field, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Record an error for a field.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Clear one field's error (editing a field clears only that field).
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    /// Iterate failing fields in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// The delivery form as entered, prior to validation. Never persisted
/// beyond the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Validate a single field value. Returns `None` when valid.
#[must_use]
pub fn validate_field(field: Field, value: &str) -> Option<String> {
    let trimmed = value.trim();
    match field {
        Field::FullName => {
            if trimmed.is_empty() {
                Some("Full name is required".to_string())
            } else if !LETTERS_AND_SPACES.is_match(trimmed) {
                Some("Full name should only contain letters and spaces".to_string())
            } else {
                None
            }
        }
        Field::Email => {
            if trimmed.is_empty() {
                Some("Email is required".to_string())
            } else if Email::parse(trimmed).is_err() {
                Some("Please enter a valid email address".to_string())
            } else {
                None
            }
        }
        Field::Phone => {
            if trimmed.is_empty() {
                Some("Phone number is required".to_string())
            } else if Phone::parse(trimmed).is_err() {
                Some("Please enter a valid Indian phone number".to_string())
            } else {
                None
            }
        }
        Field::Address => {
            if trimmed.is_empty() {
                Some("Address is required".to_string())
            } else if trimmed.len() < MIN_ADDRESS_LEN {
                Some("Please provide a complete address".to_string())
            } else {
                None
            }
        }
        Field::City => {
            if trimmed.is_empty() {
                Some("City is required".to_string())
            } else if !LETTERS_AND_SPACES.is_match(trimmed) || trimmed.len() < MIN_CITY_LEN {
                Some("Please enter a valid city name".to_string())
            } else {
                None
            }
        }
        Field::State => {
            if trimmed.is_empty() {
                Some("State is required".to_string())
            } else if trimmed.len() < MIN_STATE_LEN {
                Some("Please enter a valid state name".to_string())
            } else {
                None
            }
        }
        Field::Zip => {
            if trimmed.is_empty() {
                Some("PIN code is required".to_string())
            } else if PinCode::parse(trimmed).is_err() {
                Some("Please enter a valid 6-digit PIN code".to_string())
            } else {
                None
            }
        }
    }
}

/// Run every field rule over the form, collecting all failures at once.
#[must_use]
pub fn validate_delivery(details: &DeliveryDetails) -> FieldErrors {
    let mut errors = FieldErrors::default();
    let fields = [
        (Field::FullName, details.full_name.as_str()),
        (Field::Email, details.email.as_str()),
        (Field::Phone, details.phone.as_str()),
        (Field::Address, details.address.as_str()),
        (Field::City, details.city.as_str()),
        (Field::State, details.state.as_str()),
        (Field::Zip, details.zip.as_str()),
    ];
    for (field, value) in fields {
        if let Some(message) = validate_field(field, value) {
            errors.insert(field, message);
        }
    }
    errors
}
