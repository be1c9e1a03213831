use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::extractor::CurrentActor;

use crate::models::{AvailabilityListResponse, CreateAvailabilityRequest, DateRangeQuery};
use crate::services::AvailabilityService;

#[axum::debug_handler]
pub async fn list_availability(
    State(service): State<Arc<AvailabilityService>>,
    CurrentActor(actor): CurrentActor,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<AvailabilityListResponse>, AppError> {
    let range = query.resolve(service.upcoming_range(Utc::now().date_naive()))?;
    let windows = service.list_windows(&actor, doctor_id, range).await?;

    Ok(Json(AvailabilityListResponse {
        doctor_id,
        range,
        windows,
    }))
}

#[axum::debug_handler]
pub async fn create_availability(
    State(service): State<Arc<AvailabilityService>>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let window = service
        .add_window(&actor, request, Utc::now().date_naive())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "window": window,
            "message": "Availability added successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(service): State<Arc<AvailabilityService>>,
    CurrentActor(actor): CurrentActor,
    Path(window_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    service.delete_window(&actor, window_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability window deleted"
    })))
}
