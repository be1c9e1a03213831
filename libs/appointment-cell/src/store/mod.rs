// libs/appointment-cell/src/store/mod.rs
mod memory;
mod supabase;

pub use memory::InMemoryBookingStore;
pub use supabase::SupabaseBookingStore;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use doctor_cell::models::DateRange;

use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment, NewTreatment, Treatment};

/// Persistence for appointments and their treatments.
///
/// Every write that depends on current state is decided by the store itself, so two
/// request handlers racing on the same slot or appointment cannot both succeed.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Start times of the doctor's Booked appointments on dates inside `range`.
    async fn list_booked_timestamps(
        &self,
        doctor_id: Uuid,
        range: DateRange,
    ) -> Result<HashSet<NaiveDateTime>, AppointmentError>;

    /// Inserts a Booked appointment unless the doctor already holds a Booked one at the
    /// same timestamp, in which case `Conflict` is returned and nothing is written.
    async fn insert_if_absent(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError>;

    /// Moves a Booked appointment to `new_status`. Fails with `InvalidState` when the stored
    /// appointment is no longer Booked.
    async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError>;

    /// Marks a Booked appointment Completed and records its treatment in one step.
    async fn complete_with_treatment(
        &self,
        appointment_id: Uuid,
        treatment: NewTreatment,
    ) -> Result<(Appointment, Treatment), AppointmentError>;

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError>;

    /// Matching appointments ordered by timestamp ascending.
    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError>;

    /// Removes the appointment and its treatment. Returns false when no appointment had this id.
    async fn delete_appointment(&self, appointment_id: Uuid) -> Result<bool, AppointmentError>;

    async fn get_treatment(&self, appointment_id: Uuid) -> Result<Option<Treatment>, AppointmentError>;

    async fn list_treatments(&self, appointment_ids: &[Uuid]) -> Result<Vec<Treatment>, AppointmentError>;
}
