pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use error::AvailabilityError;
pub use models::{
    AvailabilityWindow, CreateAvailabilityRequest, DateRange, DaySlots, NewAvailabilityWindow,
    SlotLength,
};
pub use services::{generate_slots, validate_window, AvailabilityService};
pub use store::{AvailabilityStore, InMemoryAvailabilityStore, SupabaseAvailabilityStore};
