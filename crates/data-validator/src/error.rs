//! Validation Error Types

use chrono::NaiveDate;
use thiserror::Error;

/// Errors during request validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Invalid data format
    #[error("Invalid {field}: {reason}")]
    InvalidFormat { field: &'static str, reason: String },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A reading already exists for the date
    #[error("Mileage for {0} is already stored")]
    DuplicateReading(NaiveDate),

    /// Reading is lower than one taken on an earlier date
    #[error("Mileage {mileage} on {date} is lower than {previous} recorded on {previous_date}")]
    BelowPrevious {
        date: NaiveDate,
        mileage: i64,
        previous_date: NaiveDate,
        previous: i64,
    },

    /// Reading is higher than one taken on a later date
    #[error("Mileage {mileage} on {date} is higher than {next} recorded on {next_date}")]
    AboveNext {
        date: NaiveDate,
        mileage: i64,
        next_date: NaiveDate,
        next: i64,
    },
}
