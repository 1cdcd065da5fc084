//! Field rules every stored user satisfies.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::error::{UserError, UserResult};

/// Exactly ten ASCII digits, no separators or country code.
static PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

/// Word characters optionally joined by single `.` or `-`, an `@`, a domain in
/// the same shape, then one or more 2-3 character suffixes.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$",
    )
    .unwrap()
});

/// Order in which failures are reported.
const FIELD_ORDER: [&str; 5] = [
    "first_name",
    "last_name",
    "phone_number",
    "email",
    "address",
];

fn rule_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rule_error("required", "Phone Number is required"));
    }
    if !PHONE_NUMBER.is_match(value) {
        return Err(rule_error(
            "phone_number",
            format!("{value} is not a valid phone number!"),
        ));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rule_error("required", "Email ID is required"));
    }
    if !EMAIL.is_match(value) {
        return Err(rule_error("email", format!("{value} is not a valid email!")));
    }
    Ok(())
}

/// The five user-supplied fields after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct UserFields {
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last Name is required"))]
    pub last_name: String,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

impl UserFields {
    /// Trims names, email and address, and lowercases the email.
    /// The phone number is kept verbatim.
    pub fn normalize(mut self) -> Self {
        for field in [&mut self.first_name, &mut self.last_name, &mut self.address] {
            *field = field.trim().to_string();
        }
        self.email = self.email.trim().to_lowercase();
        self
    }

    /// Runs every rule and returns all failure messages at once.
    pub fn ensure_valid(&self) -> UserResult<()> {
        let errors = match self.validate() {
            Ok(()) => return Ok(()),
            Err(errors) => errors,
        };

        let by_field = errors.field_errors();
        let messages = FIELD_ORDER
            .iter()
            .filter_map(|field| by_field.get(*field))
            .flat_map(|errors| errors.iter())
            .map(|error| match &error.message {
                Some(message) => message.to_string(),
                None => error.code.to_string(),
            })
            .collect();

        Err(UserError::Validation(messages))
    }
}
