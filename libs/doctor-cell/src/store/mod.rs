// libs/doctor-cell/src/store/mod.rs
mod memory;
mod supabase;

pub use memory::InMemoryAvailabilityStore;
pub use supabase::SupabaseAvailabilityStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AvailabilityError;
use crate::models::{AvailabilityWindow, DateRange, NewAvailabilityWindow};

/// Persistence for doctor-submitted availability windows.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Windows of `doctor_id` whose date falls in `range`, ordered by date then start time.
    async fn list_windows(
        &self,
        doctor_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityError>;

    async fn insert_window(
        &self,
        window: NewAvailabilityWindow,
    ) -> Result<AvailabilityWindow, AvailabilityError>;

    async fn get_window(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, AvailabilityError>;

    /// Returns false when no window had this id.
    async fn delete_window(&self, id: Uuid) -> Result<bool, AvailabilityError>;
}
