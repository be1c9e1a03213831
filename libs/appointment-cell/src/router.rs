// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, AppointmentCellState};

pub fn appointment_routes(config: Arc<AppConfig>, state: AppointmentCellState) -> Router {
    // All appointment operations require authentication
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/slots/{doctor_id}", get(handlers::get_available_slots))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/treatment", get(handlers::get_treatment))

        // Dashboards
        .route("/doctor/schedule", get(handlers::doctor_schedule))
        .route("/doctor/weekly-load", get(handlers::doctor_weekly_load))
        .route("/patient/dashboard", get(handlers::patient_dashboard))
        .route("/patients/{patient_id}/history", get(handlers::patient_history))
        .route("/admin", get(handlers::admin_appointments))
        .route("/admin/stats", get(handlers::admin_status_counts))

        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}

/// Flat JSON records under `/appointments`. PUT and DELETE carry the id in the body.
pub fn record_routes(config: Arc<AppConfig>, state: AppointmentCellState) -> Router {
    Router::new()
        .route(
            "/appointments",
            get(handlers::list_records)
                .post(handlers::create_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
