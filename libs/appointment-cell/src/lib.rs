pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use error::AppointmentError;
pub use models::{Appointment, AppointmentRecord, AppointmentStatus, NewAppointment, Treatment};
pub use services::{AppointmentBookingService, AppointmentDashboardService, AppointmentLifecycleService};
pub use store::{BookingStore, InMemoryBookingStore, SupabaseBookingStore};
