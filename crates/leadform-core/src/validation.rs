//! Field validation for a single form submission.
//!
//! Every rule runs independently and every violation is reported, in a fixed
//! order, so the form can show all problems at once. Validation is pure: the
//! same input always yields the same [`ValidationResult`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum trimmed length of the full name.
pub const MIN_FULL_NAME_CHARS: usize = 2;

/// Minimum trimmed length of the personality/story text.
pub const MIN_PERSONALITY_CHARS: usize = 50;

/// Substring every LinkedIn profile URL must contain.
const LINKEDIN_MARKER: &str = "linkedin.com/";

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern; compilation cannot fail.
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[allow(clippy::expect_used)]
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII digits only; `\d` would admit any Unicode digit.
    Regex::new(r"^[+0-9\s\-()]{10,}$").expect("phone pattern is valid")
});

/// Raw, untrimmed form values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFormInput {
    pub linkedin_url: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub personality: String,
}

impl RawFormInput {
    /// Mutable access to one field's value.
    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::LinkedinUrl => &mut self.linkedin_url,
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Personality => &mut self.personality,
        }
    }

    /// Read one field's value.
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::LinkedinUrl => &self.linkedin_url,
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Personality => &self.personality,
        }
    }
}

/// The form's input fields, identified by their element ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    LinkedinUrl,
    FullName,
    Email,
    Phone,
    Personality,
}

impl Field {
    /// All fields in display order.
    pub const ALL: [Self; 5] = [
        Self::LinkedinUrl,
        Self::FullName,
        Self::Email,
        Self::Phone,
        Self::Personality,
    ];

    /// Element id used by the form markup.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinkedinUrl => "linkedinUrl",
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Personality => "personality",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_owned()))
    }
}

/// An element id that does not name a form field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field: {0}")]
pub struct UnknownField(pub String);

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Outcome of validating one submission.
///
/// Validity is derived from the error list, so a result can never claim to be
/// valid while carrying errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations in rule order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// User-facing messages in rule order.
    pub fn messages(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.message).collect()
    }

    /// Violations for a single field.
    pub fn errors_for(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }
}

/// Validate a form submission against the format and length rules.
pub fn validate(input: &RawFormInput) -> ValidationResult {
    let mut result = ValidationResult::default();

    if !input.linkedin_url.contains(LINKEDIN_MARKER) {
        result.push(Field::LinkedinUrl, "Please enter a valid LinkedIn URL");
    }

    if !EMAIL_PATTERN.is_match(&input.email) {
        result.push(Field::Email, "Please enter a valid email address");
    }

    if input.full_name.trim().chars().count() < MIN_FULL_NAME_CHARS {
        result.push(Field::FullName, "Please enter your full name");
    }

    // Optional: only checked when something was typed.
    if !input.phone.is_empty() && !PHONE_PATTERN.is_match(&input.phone) {
        result.push(
            Field::Phone,
            "Please enter a valid phone number or leave it empty",
        );
    }

    if input.personality.trim().chars().count() < MIN_PERSONALITY_CHARS {
        result.push(
            Field::Personality,
            "Please provide more details about your personality and story (minimum 50 characters)",
        );
    }

    result
}
