//! Entity Records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maintenance status shared by parts and vehicles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    #[default]
    Good,
    MaintenanceDue,
    MaintenanceOverdue,
    Maintained,
}

/// Stored status text did not name a known status
#[derive(Debug, Clone, Error)]
#[error("unknown maintenance status: {0}")]
pub struct UnknownStatus(pub String);

impl MaintenanceStatus {
    /// Column representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Good => "GOOD",
            MaintenanceStatus::MaintenanceDue => "MAINTENANCE_DUE",
            MaintenanceStatus::MaintenanceOverdue => "MAINTENANCE_OVERDUE",
            MaintenanceStatus::Maintained => "MAINTAINED",
        }
    }

    /// Ordering used to roll part statuses up into a vehicle status.
    /// A maintained part is as healthy as a good one.
    pub fn severity(&self) -> u8 {
        match self {
            MaintenanceStatus::Good | MaintenanceStatus::Maintained => 0,
            MaintenanceStatus::MaintenanceDue => 1,
            MaintenanceStatus::MaintenanceOverdue => 2,
        }
    }

    /// Whether the owner should hear about this status
    pub fn needs_attention(&self) -> bool {
        self.severity() > 0
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GOOD" => Ok(MaintenanceStatus::Good),
            "MAINTENANCE_DUE" => Ok(MaintenanceStatus::MaintenanceDue),
            "MAINTENANCE_OVERDUE" => Ok(MaintenanceStatus::MaintenanceOverdue),
            // older rows were written with the combined label
            "MAINTAINED" | "MAINTAINED/REPLACED" => Ok(MaintenanceStatus::Maintained),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for MaintenanceStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Account record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Replacement fields for an existing account
#[derive(Debug, Clone)]
pub struct AccountChanges {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Vehicle record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: MaintenanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub owner_id: i64,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct VehicleChanges {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
}

/// Part record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Part {
    pub id: i64,
    pub vehicle_id: i64,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub install_mileage: i64,
    pub lifetime_mileage: i64,
    #[sqlx(try_from = "String")]
    pub status: MaintenanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    /// Odometer reading at which the part is worn out
    pub fn replacement_mileage(&self) -> i64 {
        self.install_mileage.saturating_add(self.lifetime_mileage)
    }
}

#[derive(Debug, Clone)]
pub struct NewPart {
    pub vehicle_id: i64,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub install_mileage: i64,
    pub lifetime_mileage: i64,
}

#[derive(Debug, Clone)]
pub struct PartChanges {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub install_mileage: i64,
    pub lifetime_mileage: i64,
}

/// Odometer reading
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Mileage {
    pub id: i64,
    pub vehicle_id: i64,
    pub mileage: i64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMileage {
    pub vehicle_id: i64,
    pub mileage: i64,
    pub date: NaiveDate,
}
