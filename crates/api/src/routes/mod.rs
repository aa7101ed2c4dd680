//! Route handlers

pub mod account;
pub mod health;
pub mod mileage;
pub mod part;
pub mod vehicle;

use storage::Vehicle;

use crate::error::ApiError;
use crate::extract::AuthAccount;
use crate::state::AppState;

/// Load a vehicle the caller owns: 404 when missing, 403 when foreign
pub(crate) async fn owned_vehicle(
    state: &AppState,
    auth: &AuthAccount,
    vehicle_id: i64,
) -> Result<Vehicle, ApiError> {
    let vehicle = state
        .repo
        .vehicle_by_id(vehicle_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Vehicle not found"))?;
    auth.ensure_account(vehicle.owner_id)?;
    Ok(vehicle)
}
