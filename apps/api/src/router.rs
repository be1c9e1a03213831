use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};
use tracing::{info, warn};

use appointment_cell::handlers::AppointmentCellState;
use appointment_cell::router::{appointment_routes, record_routes};
use appointment_cell::services::AppointmentBookingService;
use appointment_cell::store::{BookingStore, InMemoryBookingStore, SupabaseBookingStore};
use doctor_cell::models::SlotLength;
use doctor_cell::router::doctor_routes;
use doctor_cell::services::AvailabilityService;
use doctor_cell::store::{AvailabilityStore, InMemoryAvailabilityStore, SupabaseAvailabilityStore};
use shared_config::AppConfig;

/// Services shared by the cell routers.
pub struct Services {
    pub availability: Arc<AvailabilityService>,
    pub appointments: AppointmentCellState,
}

/// Picks Supabase-backed stores when the service key is configured, in-memory ones otherwise.
pub fn build_services(config: &AppConfig) -> anyhow::Result<Services> {
    let (availability_store, booking_store): (Arc<dyn AvailabilityStore>, Arc<dyn BookingStore>) =
        if config.uses_remote_store() {
            info!("Using Supabase stores at {}", config.supabase_url);
            (
                Arc::new(SupabaseAvailabilityStore::new(config)),
                Arc::new(SupabaseBookingStore::new(config)),
            )
        } else {
            warn!("Supabase not configured, using in-memory stores; data is lost on restart");
            (
                Arc::new(InMemoryAvailabilityStore::new()),
                Arc::new(InMemoryBookingStore::new()),
            )
        };

    let slot_length = SlotLength::from_minutes(config.slot_length_minutes)?;

    let availability = AvailabilityService::with_horizon(availability_store.clone(), config.booking_horizon_days);
    let booking = AppointmentBookingService::new(booking_store, availability_store)
        .with_slot_length(slot_length)
        .with_horizon(config.booking_horizon_days);

    Ok(Services {
        availability: Arc::new(availability),
        appointments: AppointmentCellState::new(booking),
    })
}

pub fn create_router(config: Arc<AppConfig>, services: Services) -> Router {
    Router::new()
        .route("/", get(|| async { "Hospital scheduling API is running!" }))
        .nest("/doctors", doctor_routes(config.clone(), services.availability))
        .nest("/appointments", appointment_routes(config.clone(), services.appointments.clone()))
        .nest("/api", record_routes(config, services.appointments))
}
