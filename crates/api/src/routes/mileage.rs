//! Mileage endpoints
//!
//! Readings are checked against the vehicle's timeline before they are
//! stored, and every change re-runs the vehicle's status check.

use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use data_validator::{check_reading, Reading};
use maintenance::MileageForecast;
use serde::Deserialize;
use storage::{Mileage, NewMileage, StorageError};
use tracing::info;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthAccount};
use crate::response::ApiResponse;
use crate::routes::owned_vehicle;
use crate::state::{AppState, SharedState};

const MISSING_FIELDS: &str = "Missing mileage or date";
const NEGATIVE_MILEAGE: &str = "Mileage cannot be negative";
const MILEAGE_NOT_FOUND: &str = "Mileage not found";

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_mileage))
        .route("/id/:id", get(get_mileage))
        .route("/vehicle/:vehicle_id", get(list_mileages))
        .route("/predict/:vehicle_id", get(predict_mileage))
        .route("/:id", put(update_mileage).delete(delete_mileage))
}

#[derive(Debug, Deserialize)]
pub struct MileageBody {
    pub vehicle_id: Option<i64>,
    pub mileage: Option<i64>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MileageUpdateBody {
    pub mileage: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub days: Option<i64>,
}

fn checked_mileage(state: &AppState, mileage: Option<i64>) -> Result<i64, ApiError> {
    let mileage = mileage.ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;
    if mileage < 0 {
        return Err(ApiError::bad_request(NEGATIVE_MILEAGE));
    }
    state.validator.validate_mileage("mileage", mileage)?;
    Ok(mileage)
}

fn parse_date(date: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid date, expected YYYY-MM-DD"))
}

async fn stored_mileage(state: &AppState, id: i64) -> Result<Mileage, ApiError> {
    state
        .repo
        .mileage_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(MILEAGE_NOT_FOUND))
}

/// Readings of a vehicle other than `skip_id`
async fn timeline(
    state: &AppState,
    vehicle_id: i64,
    skip_id: Option<i64>,
) -> Result<Vec<Reading>, ApiError> {
    let readings = state.repo.mileages_by_vehicle(vehicle_id).await?;
    Ok(readings
        .into_iter()
        .filter(|m| Some(m.id) != skip_id)
        .map(|m| Reading::new(m.date, m.mileage))
        .collect())
}

async fn get_mileage(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Mileage>, ApiError> {
    let mileage = stored_mileage(&state, id).await?;
    owned_vehicle(&state, &auth, mileage.vehicle_id).await?;
    Ok(ApiResponse::ok("Mileage found", mileage))
}

async fn list_mileages(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(vehicle_id): ApiPath<i64>,
) -> Result<ApiResponse<Vec<Mileage>>, ApiError> {
    owned_vehicle(&state, &auth, vehicle_id).await?;
    let mileages = state.repo.mileages_by_vehicle(vehicle_id).await?;
    Ok(ApiResponse::ok("Mileages found", mileages))
}

async fn create_mileage(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiJson(body): ApiJson<MileageBody>,
) -> Result<ApiResponse<Mileage>, ApiError> {
    let (Some(vehicle_id), Some(date)) = (body.vehicle_id, body.date.as_deref()) else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };
    let mileage = checked_mileage(&state, body.mileage)?;
    let date = parse_date(date)?;
    owned_vehicle(&state, &auth, vehicle_id).await?;

    check_reading(
        timeline(&state, vehicle_id, None).await?,
        Reading::new(date, mileage),
    )?;

    let record = state
        .repo
        .create_mileage(NewMileage {
            vehicle_id,
            mileage,
            date,
        })
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent insert for the same date
            StorageError::Conflict(_) => {
                ApiError::bad_request("Mileage data for the date is already stored")
            }
            other => other.into(),
        })?;
    info!(
        "Mileage {} km on {} recorded for vehicle {}",
        mileage, date, vehicle_id
    );

    state.checker.check_vehicle(vehicle_id).await?;
    Ok(ApiResponse::created("Mileage created", record))
}

async fn update_mileage(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<MileageUpdateBody>,
) -> Result<ApiResponse<Mileage>, ApiError> {
    let mileage = checked_mileage(&state, body.mileage)?;
    let existing = stored_mileage(&state, id).await?;
    owned_vehicle(&state, &auth, existing.vehicle_id).await?;

    check_reading(
        timeline(&state, existing.vehicle_id, Some(id)).await?,
        Reading::new(existing.date, mileage),
    )?;

    let record = state
        .repo
        .update_mileage(id, mileage)
        .await?
        .ok_or_else(|| ApiError::not_found(MILEAGE_NOT_FOUND))?;
    info!("Mileage {} updated to {} km", id, mileage);

    state.checker.check_vehicle(record.vehicle_id).await?;
    Ok(ApiResponse::ok("Mileage updated", record))
}

async fn delete_mileage(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Mileage>, ApiError> {
    let existing = stored_mileage(&state, id).await?;
    owned_vehicle(&state, &auth, existing.vehicle_id).await?;

    let record = state
        .repo
        .delete_mileage(id)
        .await?
        .ok_or_else(|| ApiError::not_found(MILEAGE_NOT_FOUND))?;
    info!("Mileage {} deleted", id);

    state.checker.check_vehicle(record.vehicle_id).await?;
    Ok(ApiResponse::ok("Mileage deleted", record))
}

async fn predict_mileage(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(vehicle_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PredictQuery>,
) -> Result<ApiResponse<MileageForecast>, ApiError> {
    let days = query
        .days
        .unwrap_or_else(|| i64::from(state.checker.config().horizon_days));
    state.validator.validate_horizon(days)?;
    let days = u32::try_from(days).map_err(|_| ApiError::bad_request("Invalid days"))?;

    owned_vehicle(&state, &auth, vehicle_id).await?;
    let forecast = state.checker.forecast(vehicle_id, days).await?;
    Ok(ApiResponse::ok("Mileage predicted", forecast))
}
