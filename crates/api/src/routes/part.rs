//! Part endpoints
//!
//! Every write re-runs the status check so stored part and vehicle statuses
//! follow the latest figures.

use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use data_validator::required;
use serde::Deserialize;
use storage::{NewPart, Part, PartChanges};
use tracing::info;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthAccount};
use crate::response::ApiResponse;
use crate::routes::owned_vehicle;
use crate::state::{AppState, SharedState};

const MISSING_FIELDS: &str = "Missing name, brand, model, install_mileage, or lifetime_mileage";
const NEGATIVE_MILEAGE: &str = "Install mileage or lifetime mileage cannot be negative";
const PART_NOT_FOUND: &str = "Part not found";

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_part))
        .route("/id/:id", get(get_part))
        .route("/vehicle/:vehicle_id", get(list_parts))
        .route("/maintain/:id", post(maintain_part))
        .route("/:id", put(update_part).delete(delete_part))
}

#[derive(Debug, Deserialize)]
pub struct PartBody {
    pub vehicle_id: Option<i64>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub install_mileage: Option<i64>,
    pub lifetime_mileage: Option<i64>,
}

fn part_input(state: &AppState, body: &PartBody) -> Result<PartChanges, ApiError> {
    let missing = |_| ApiError::bad_request(MISSING_FIELDS);
    let name = required("name", body.name.as_deref()).map_err(missing)?;
    let brand = required("brand", body.brand.as_deref()).map_err(missing)?;
    let model = required("model", body.model.as_deref()).map_err(missing)?;
    let (Some(install_mileage), Some(lifetime_mileage)) =
        (body.install_mileage, body.lifetime_mileage)
    else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };

    if install_mileage < 0 || lifetime_mileage < 0 {
        return Err(ApiError::bad_request(NEGATIVE_MILEAGE));
    }
    state
        .validator
        .validate_mileage("install_mileage", install_mileage)?;
    state
        .validator
        .validate_mileage("lifetime_mileage", lifetime_mileage)?;
    state.validator.validate_year(body.year)?;

    Ok(PartChanges {
        name: name.to_string(),
        brand: brand.to_string(),
        model: model.to_string(),
        year: body.year,
        install_mileage,
        lifetime_mileage,
    })
}

async fn stored_part(state: &AppState, id: i64) -> Result<Part, ApiError> {
    state
        .repo
        .part_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(PART_NOT_FOUND))
}

async fn get_part(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Part>, ApiError> {
    let part = stored_part(&state, id).await?;
    owned_vehicle(&state, &auth, part.vehicle_id).await?;
    Ok(ApiResponse::ok("Part found", part))
}

async fn list_parts(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(vehicle_id): ApiPath<i64>,
) -> Result<ApiResponse<Vec<Part>>, ApiError> {
    owned_vehicle(&state, &auth, vehicle_id).await?;
    let parts = state.repo.parts_by_vehicle(vehicle_id).await?;
    Ok(ApiResponse::ok("Parts found", parts))
}

async fn create_part(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiJson(body): ApiJson<PartBody>,
) -> Result<ApiResponse<Part>, ApiError> {
    let vehicle_id = body
        .vehicle_id
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;
    let input = part_input(&state, &body)?;
    owned_vehicle(&state, &auth, vehicle_id).await?;

    let part = state
        .repo
        .create_part(NewPart {
            vehicle_id,
            name: input.name,
            brand: input.brand,
            model: input.model,
            year: input.year,
            install_mileage: input.install_mileage,
            lifetime_mileage: input.lifetime_mileage,
        })
        .await?;
    info!("Part {} created on vehicle {}", part.id, vehicle_id);

    state.checker.check_part(part.id).await?;
    let part = stored_part(&state, part.id).await?;
    Ok(ApiResponse::created("Part created", part))
}

async fn maintain_part(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Part>, ApiError> {
    let part = stored_part(&state, id).await?;
    owned_vehicle(&state, &auth, part.vehicle_id).await?;

    let part = state.checker.maintain_part(id).await?;
    Ok(ApiResponse::ok("Part maintained", part))
}

async fn update_part(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<PartBody>,
) -> Result<ApiResponse<Part>, ApiError> {
    let changes = part_input(&state, &body)?;
    let part = stored_part(&state, id).await?;
    owned_vehicle(&state, &auth, part.vehicle_id).await?;

    state
        .repo
        .update_part(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(PART_NOT_FOUND))?;
    info!("Part {} updated", id);

    state.checker.check_part(id).await?;
    let part = stored_part(&state, id).await?;
    Ok(ApiResponse::ok("Part updated", part))
}

async fn delete_part(
    State(state): State<SharedState>,
    auth: AuthAccount,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse<Part>, ApiError> {
    let part = stored_part(&state, id).await?;
    owned_vehicle(&state, &auth, part.vehicle_id).await?;

    let part = state
        .repo
        .delete_part(id)
        .await?
        .ok_or_else(|| ApiError::not_found(PART_NOT_FOUND))?;
    state.checker.refresh_vehicle_status(part.vehicle_id).await?;
    info!("Part {} deleted", id);
    Ok(ApiResponse::ok("Part deleted", part))
}
