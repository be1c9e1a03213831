pub mod booking;
pub mod dashboard;
pub mod lifecycle;

pub use booking::{require_party, AppointmentBookingService};
pub use dashboard::{weekly_load, AppointmentDashboardService};
pub use lifecycle::AppointmentLifecycleService;
