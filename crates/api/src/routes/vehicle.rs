//! Vehicle endpoints

use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use data_validator::required;
use maintenance::StatusReport;
use serde::Deserialize;
use storage::{NewVehicle, Vehicle, VehicleChanges};
use tracing::info;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthAccount};
use crate::response::ApiResponse;
use crate::routes::owned_vehicle;
use crate::state::{AppState, SharedState};

const MISSING_FIELDS: &str = "Missing name, brand, or model";

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_vehicle))
        .route("/id/:id", get(get_vehicle))
        .route("/account/:account_id", get(list_vehicles))
        .route("/check/:id", post(check_vehicle))
        .route("/:id", put(update_vehicle).delete(delete_vehicle))
}

#[derive(Debug, Deserialize)]
pub struct VehicleBody {
    /// Defaults to the caller
    pub owner_id: Option<i64>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
}

fn vehicle_input(state: &AppState, body: &VehicleBody) -> Result<VehicleChanges, ApiError> {
    let missing = |_| ApiError::bad_request(MISSING_FIELDS);
    let name = required("name", body.name.as_deref()).map_err(missing)?;
    let brand = required("brand", body.brand.as_deref()).map_err(missing)?;
    let model = required("model", body.model.as_deref()).map_err(missing)?;
    state.validator.validate_year(body.year)?;

    Ok(VehicleChanges {
        name: name.to_string(),
        brand: brand.to_string(),
        model: model.to_string(),
        year: body.year,
    })
}

async fn get_vehicle(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Vehicle>, ApiError> {
    let vehicle = owned_vehicle(&state, &auth, id).await?;
    Ok(ApiResponse::ok("Vehicle found", vehicle))
}

async fn list_vehicles(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(account_id): ApiPath<i64>,
) -> Result<ApiResponse<Vec<Vehicle>>, ApiError> {
    auth.ensure_account(account_id)?;
    let vehicles = state.repo.vehicles_by_owner(account_id).await?;
    Ok(ApiResponse::ok("Vehicles found", vehicles))
}

async fn create_vehicle(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiJson(body): ApiJson<VehicleBody>,
) -> Result<ApiResponse<Vehicle>, ApiError> {
    let input = vehicle_input(&state, &body)?;
    let owner_id = body.owner_id.unwrap_or(auth.id());

    if state.repo.account_by_id(owner_id).await?.is_none() {
        return Err(ApiError::bad_request("Account not found"));
    }
    auth.ensure_account(owner_id)?;

    let vehicle = state
        .repo
        .create_vehicle(NewVehicle {
            owner_id,
            name: input.name,
            brand: input.brand,
            model: input.model,
            year: input.year,
        })
        .await?;
    info!("Vehicle {} created for account {}", vehicle.id, owner_id);
    Ok(ApiResponse::created("Vehicle created", vehicle))
}

async fn update_vehicle(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<VehicleBody>,
) -> Result<ApiResponse<Vehicle>, ApiError> {
    let changes = vehicle_input(&state, &body)?;
    owned_vehicle(&state, &auth, id).await?;

    let vehicle = state
        .repo
        .update_vehicle(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Vehicle not found"))?;
    info!("Vehicle {} updated", id);
    Ok(ApiResponse::ok("Vehicle updated", vehicle))
}

async fn delete_vehicle(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Vehicle>, ApiError> {
    owned_vehicle(&state, &auth, id).await?;
    let vehicle = state
        .repo
        .delete_vehicle(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Vehicle not found"))?;
    info!("Vehicle {} deleted", id);
    Ok(ApiResponse::ok("Vehicle deleted", vehicle))
}

async fn check_vehicle(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<StatusReport>, ApiError> {
    owned_vehicle(&state, &auth, id).await?;
    let report = state.checker.check_vehicle(id).await?;
    Ok(ApiResponse::ok("Vehicle status checked", report))
}
