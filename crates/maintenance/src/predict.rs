//! Mileage Prediction

use chrono::NaiveDate;
use serde::Serialize;
use storage::Mileage;

/// Linear mileage trend between the earliest and latest readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MileageTrend {
    /// Date of the latest reading
    pub latest_date: NaiveDate,
    /// Odometer at the latest reading
    pub latest_mileage: i64,
    /// Average distance per day
    pub daily_rate: f64,
}

impl MileageTrend {
    /// Fit a trend to readings in any order.
    ///
    /// Needs at least two readings on different dates.
    pub fn from_readings(readings: &[Mileage]) -> Option<Self> {
        if readings.len() < 2 {
            return None;
        }

        let earliest = readings.iter().min_by_key(|m| (m.date, m.mileage))?;
        let latest = readings.iter().max_by_key(|m| (m.date, m.mileage))?;

        let span_days = (latest.date - earliest.date).num_days();
        if span_days <= 0 {
            return None;
        }

        let delta = (latest.mileage - earliest.mileage) as f64;
        Some(Self {
            latest_date: latest.date,
            latest_mileage: latest.mileage,
            // odometers never run backwards
            daily_rate: (delta / span_days as f64).max(0.0),
        })
    }

    /// Odometer expected `days` after the latest reading
    pub fn project(&self, days: u32) -> i64 {
        let distance = (self.daily_rate * f64::from(days)).floor() as i64;
        self.latest_mileage.saturating_add(distance)
    }
}

/// Mileage of the most recent reading
pub fn current_mileage(readings: &[Mileage]) -> Option<i64> {
    readings
        .iter()
        .max_by_key(|m| (m.date, m.mileage))
        .map(|m| m.mileage)
}

/// Predict the odometer `days` after the latest reading.
///
/// Returns `None` when there is no usable trend; callers fall back to
/// [`current_mileage`].
pub fn predict_vehicle_mileage(readings: &[Mileage], days: u32) -> Option<i64> {
    MileageTrend::from_readings(readings).map(|trend| trend.project(days))
}
