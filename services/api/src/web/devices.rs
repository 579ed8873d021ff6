//! services/api/src/web/devices.rs
//!
//! Handlers for the device catalog.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use responsive_core::{Device, DeviceType, NewDevice};
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::protocol::{ApiJson, DeviceListQuery};
use crate::web::state::AppState;

fn parse_device_type(raw: &str) -> Result<DeviceType, ApiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "phone" => Ok(DeviceType::Phone),
        "tablet" => Ok(DeviceType::Tablet),
        "laptop" => Ok(DeviceType::Laptop),
        other => Err(ApiError::invalid_field(
            "type",
            format!("unknown device type '{}', expected phone, tablet or laptop", other),
        )),
    }
}

/// List the device profiles, optionally filtered by type.
#[utoipa::path(
    get,
    path = "/api/devices",
    params(DeviceListQuery),
    responses(
        (status = 200, description = "Device profiles"),
        (status = 400, description = "Unknown device type")
    )
)]
pub async fn list_devices_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<DeviceListQuery>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let filter = query
        .device_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(parse_device_type)
        .transpose()?;
    Ok(Json(app_state.devices.list(filter).await?))
}

/// Fetch one device profile.
#[utoipa::path(
    get,
    path = "/api/devices/{id}",
    params(("id" = String, Path, description = "The device id, e.g. `iphone-14`.")),
    responses(
        (status = 200, description = "The device profile"),
        (status = 404, description = "No such device")
    )
)]
pub async fn get_device_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Device>, ApiError> {
    Ok(Json(app_state.devices.get(&id).await?))
}

/// Add a custom device profile to the catalog.
#[utoipa::path(
    post,
    path = "/api/devices",
    responses(
        (status = 201, description = "Device added"),
        (status = 400, description = "Invalid device or duplicate id")
    )
)]
pub async fn create_device_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(device): ApiJson<NewDevice>,
) -> Result<impl IntoResponse, ApiError> {
    let created = app_state.devices.insert(device).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
