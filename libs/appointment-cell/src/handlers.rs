// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use doctor_cell::models::DateRangeQuery;
use doctor_cell::services::into_day_slots;
use shared_models::error::AppError;
use shared_utils::extractor::CurrentActor;

use crate::models::{
    AdminListQuery, Appointment, AppointmentRecord, AvailableSlotsResponse, BookAppointmentRequest,
    CompletedAppointment, CreateRecordRequest, DeleteRecordRequest, DoctorSchedule, HistoryEntry,
    PatientDashboard, StatusCounts, Treatment, TreatmentRequest, UpdateRecordRequest, WeekdayLoad,
};
use crate::services::{AppointmentBookingService, AppointmentDashboardService};

#[derive(Clone)]
pub struct AppointmentCellState {
    pub booking: Arc<AppointmentBookingService>,
    pub dashboard: Arc<AppointmentDashboardService>,
}

impl AppointmentCellState {
    pub fn new(booking: AppointmentBookingService) -> Self {
        let dashboard = AppointmentDashboardService::new(booking.store());
        Self {
            booking: Arc::new(booking),
            dashboard: Arc::new(dashboard),
        }
    }
}

// ==============================================================================
// SLOTS AND BOOKING
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<AppointmentCellState>,
    CurrentActor(_actor): CurrentActor,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let range = query.resolve(state.booking.default_range(Utc::now().date_naive()))?;
    let slots = state.booking.get_available_slots(doctor_id, range).await?;

    Ok(Json(AvailableSlotsResponse {
        doctor_id,
        range,
        slot_length_minutes: state.booking.slot_length().minutes(),
        days: into_day_slots(slots),
    }))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state
        .booking
        .book_slot(&actor, request, Utc::now().naive_utc())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment booked successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.booking.get_appointment(&actor, appointment_id).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.cancel(&actor, appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled"
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<TreatmentRequest>,
) -> Result<Json<CompletedAppointment>, AppError> {
    let completed = state
        .booking
        .complete_with_treatment(&actor, appointment_id, request)
        .await?;

    Ok(Json(completed))
}

#[axum::debug_handler]
pub async fn get_treatment(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Treatment>, AppError> {
    let treatment = state.booking.get_treatment(&actor, appointment_id).await?;
    Ok(Json(treatment))
}

// ==============================================================================
// DASHBOARDS
// ==============================================================================

#[axum::debug_handler]
pub async fn doctor_schedule(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<DoctorSchedule>, AppError> {
    Ok(Json(state.dashboard.doctor_schedule(&actor).await?))
}

#[axum::debug_handler]
pub async fn doctor_weekly_load(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<WeekdayLoad>>, AppError> {
    Ok(Json(state.dashboard.doctor_weekly_load(&actor).await?))
}

#[axum::debug_handler]
pub async fn patient_dashboard(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<PatientDashboard>, AppError> {
    let dashboard = state
        .dashboard
        .patient_dashboard(&actor, Utc::now().naive_utc())
        .await?;

    Ok(Json(dashboard))
}

#[axum::debug_handler]
pub async fn patient_history(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    Ok(Json(state.dashboard.patient_history(&actor, patient_id).await?))
}

#[axum::debug_handler]
pub async fn admin_appointments(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(state.dashboard.admin_listing(&actor, query.status).await?))
}

#[axum::debug_handler]
pub async fn admin_status_counts(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<StatusCounts>, AppError> {
    Ok(Json(state.dashboard.admin_status_counts(&actor).await?))
}

// ==============================================================================
// JSON RECORD SURFACE
// ==============================================================================

#[axum::debug_handler]
pub async fn list_records(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<AppointmentRecord>>, AppError> {
    let appointments = state.booking.list_for_actor(&actor).await?;
    Ok(Json(appointments.iter().map(AppointmentRecord::from).collect()))
}

#[axum::debug_handler]
pub async fn create_record(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let booking = BookAppointmentRequest {
        doctor_id: request.doctor_id,
        patient_id: Some(request.patient_id),
        datetime: request.datetime,
        reason: None,
    };
    let appointment = state
        .booking
        .book_slot(&actor, booking, Utc::now().naive_utc())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Appointment created successfully",
            "appointment": AppointmentRecord::from(&appointment)
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_record(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<UpdateRecordRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = match request.status {
        Some(status) => state.booking.update_status(&actor, request.id, status).await?,
        None => state.booking.get_appointment(&actor, request.id).await?,
    };

    Ok(Json(json!({
        "message": "Appointment updated",
        "appointment": AppointmentRecord::from(&appointment)
    })))
}

#[axum::debug_handler]
pub async fn delete_record(
    State(state): State<AppointmentCellState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<DeleteRecordRequest>,
) -> Result<Json<Value>, AppError> {
    state.booking.delete_appointment(&actor, request.id).await?;

    Ok(Json(json!({
        "message": "Appointment deleted"
    })))
}
