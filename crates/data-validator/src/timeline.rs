//! Mileage Timeline Rules
//!
//! Odometer readings for a vehicle never go backwards: one reading per date,
//! no reading lower than an earlier one, none higher than a later one.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ValidationError;

/// A dated odometer reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub date: NaiveDate,
    pub mileage: i64,
}

impl Reading {
    pub fn new(date: NaiveDate, mileage: i64) -> Self {
        Self { date, mileage }
    }
}

/// Check that `candidate` fits among `existing` readings.
///
/// When updating a stored reading, leave it out of `existing`.
pub fn check_reading<I>(existing: I, candidate: Reading) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = Reading>,
{
    let existing: Vec<Reading> = existing.into_iter().collect();

    if existing.iter().any(|r| r.date == candidate.date) {
        debug!("Rejected reading: {} already has a mileage", candidate.date);
        return Err(ValidationError::DuplicateReading(candidate.date));
    }

    if let Some(previous) = existing
        .iter()
        .filter(|r| r.date < candidate.date && r.mileage > candidate.mileage)
        .max_by_key(|r| r.mileage)
    {
        debug!("Rejected reading: {:?} below {:?}", candidate, previous);
        return Err(ValidationError::BelowPrevious {
            date: candidate.date,
            mileage: candidate.mileage,
            previous_date: previous.date,
            previous: previous.mileage,
        });
    }

    if let Some(next) = existing
        .iter()
        .filter(|r| r.date > candidate.date && r.mileage < candidate.mileage)
        .min_by_key(|r| r.mileage)
    {
        debug!("Rejected reading: {:?} above {:?}", candidate, next);
        return Err(ValidationError::AboveNext {
            date: candidate.date,
            mileage: candidate.mileage,
            next_date: next.date,
            next: next.mileage,
        });
    }

    Ok(())
}
