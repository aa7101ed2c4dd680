//! Maintenance Status
//!
//! Predicts vehicle mileage from odometer history, assesses part wear against
//! lifetime mileage, and reminds owners when a part becomes due or overdue.

mod assess;
mod checker;
mod predict;

pub use assess::{assess_part, vehicle_status};
pub use checker::{MileageForecast, PartTransition, StatusChecker, StatusReport};
pub use predict::{current_mileage, predict_vehicle_mileage, MileageTrend};

use serde::{Deserialize, Serialize};
use storage::StorageError;
use thiserror::Error;

/// Maintenance errors
#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Part {0} not found")]
    PartNotFound(i64),

    #[error("Vehicle {0} not found")]
    VehicleNotFound(i64),
}

/// Maintenance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// How far ahead mileage is predicted when deciding a part is due (days)
    pub horizon_days: u32,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self { horizon_days: 7 }
    }
}
