pub mod availability;
pub mod slots;

pub use availability::{validate_window, AvailabilityService};
pub use slots::{candidate_starts, generate_slots, into_day_slots};
