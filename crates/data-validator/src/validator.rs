//! Field Validator for Range and Format Checking

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Odometer and part lifetime range (km)
    pub mileage_range: (i64, i64),
    /// Model year range
    pub year_range: (i64, i64),
    /// Prediction horizon range (days)
    pub horizon_range: (i64, i64),
    /// Minimum password length in characters
    pub password_min_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mileage_range: (0, 10_000_000),
            year_range: (1886, 2100),
            horizon_range: (1, 365),
            password_min_len: 8,
        }
    }
}

/// Validator for account, vehicle, part and mileage input
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: i64,
        range: (i64, i64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate an odometer reading or a part mileage figure
    pub fn validate_mileage(&self, field: &'static str, value: i64) -> Result<(), ValidationError> {
        self.validate_range(field, value, self.config.mileage_range)
    }

    /// Validate an optional model year
    pub fn validate_year(&self, year: Option<i32>) -> Result<(), ValidationError> {
        match year {
            Some(year) => self.validate_range("year", i64::from(year), self.config.year_range),
            None => Ok(()),
        }
    }

    /// Validate a prediction horizon in days
    pub fn validate_horizon(&self, days: i64) -> Result<(), ValidationError> {
        self.validate_range("days", days, self.config.horizon_range)
    }

    /// Validate an email address: `local@domain.tld`, no whitespace, one `@`
    pub fn validate_email(&self, email: &str) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "email",
            reason: reason.to_string(),
        };

        if email.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }
        let (local, domain) = email.split_once('@').ok_or_else(|| invalid("missing @"))?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid("expected exactly one @ after a non-empty name"));
        }
        let has_inner_dot = domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
        if !has_inner_dot {
            return Err(invalid("domain needs a dot"));
        }
        Ok(())
    }

    /// Validate a password: minimum length, at least one digit and one symbol
    pub fn validate_password(&self, password: &str) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidFormat {
            field: "password",
            reason,
        };

        if password.contains(['\n', '\r']) {
            return Err(invalid("must be a single line".to_string()));
        }
        if password.chars().count() < self.config.password_min_len {
            return Err(invalid(format!(
                "must be at least {} characters",
                self.config.password_min_len
            )));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(invalid("must contain a digit".to_string()));
        }
        if password.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("must contain a symbol".to_string()));
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

/// Trimmed value of a required text field; blank counts as missing
pub fn required<'a>(
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}
