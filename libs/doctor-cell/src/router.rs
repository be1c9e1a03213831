use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::AvailabilityService;

pub fn doctor_routes(config: Arc<AppConfig>, service: Arc<AvailabilityService>) -> Router {
    Router::new()
        .route("/availability", post(handlers::create_availability))
        .route("/availability/{window_id}", delete(handlers::delete_availability))
        .route("/{doctor_id}/availability", get(handlers::list_availability))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(service)
}
