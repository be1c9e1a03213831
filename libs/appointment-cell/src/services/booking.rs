// libs/appointment-cell/src/services/booking.rs
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::{DateRange, SlotLength};
use doctor_cell::services::generate_slots;
use doctor_cell::store::AvailabilityStore;
use shared_models::auth::{AccessDenied, Actor, Role};
use shared_utils::access::{require_owner_or_role, require_role};

use crate::error::AppointmentError;
use crate::models::{
    non_blank, Appointment, AppointmentFilter, AppointmentStatus, BookAppointmentRequest,
    CompletedAppointment, NewAppointment, Treatment, TreatmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::store::BookingStore;

/// Admits the appointment's patient, its doctor, and admins.
pub fn require_party(actor: &Actor, appointment: &Appointment) -> Result<(), AccessDenied> {
    match actor.role {
        Role::Doctor => require_owner_or_role(actor, appointment.doctor_id, &[Role::Admin]),
        Role::Patient | Role::Admin => require_owner_or_role(actor, appointment.patient_id, &[Role::Admin]),
    }
}

/// Slot lookup, booking and the appointment lifecycle, on top of the two stores.
#[derive(Clone)]
pub struct AppointmentBookingService {
    bookings: Arc<dyn BookingStore>,
    availability: Arc<dyn AvailabilityStore>,
    lifecycle: AppointmentLifecycleService,
    slot_length: SlotLength,
    horizon_days: i64,
}

impl AppointmentBookingService {
    pub fn new(bookings: Arc<dyn BookingStore>, availability: Arc<dyn AvailabilityStore>) -> Self {
        Self {
            bookings,
            availability,
            lifecycle: AppointmentLifecycleService::new(),
            slot_length: SlotLength::default(),
            horizon_days: shared_config::DEFAULT_BOOKING_HORIZON_DAYS,
        }
    }

    pub fn with_slot_length(mut self, slot_length: SlotLength) -> Self {
        self.slot_length = slot_length;
        self
    }

    pub fn with_horizon(mut self, horizon_days: i64) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn slot_length(&self) -> SlotLength {
        self.slot_length
    }

    pub fn store(&self) -> Arc<dyn BookingStore> {
        Arc::clone(&self.bookings)
    }

    /// Range used when the caller gives none: today through the booking horizon.
    pub fn default_range(&self, today: NaiveDate) -> DateRange {
        DateRange::upcoming(today, self.horizon_days)
    }

    /// Bookable slots of `doctor_id` per date inside `range`.
    ///
    /// The result may be stale by the time a booking arrives; `book_slot` re-checks
    /// through the store's atomic insert.
    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        range: DateRange,
    ) -> Result<BTreeMap<NaiveDate, Vec<NaiveDateTime>>, AppointmentError> {
        let windows = self.availability.list_windows(doctor_id, range).await?;
        let booked: HashSet<(Uuid, NaiveDateTime)> = self
            .bookings
            .list_booked_timestamps(doctor_id, range)
            .await?
            .into_iter()
            .map(|at| (doctor_id, at))
            .collect();

        debug!(
            "Doctor {} has {} windows and {} booked slots between {} and {}",
            doctor_id,
            windows.len(),
            booked.len(),
            range.from,
            range.to
        );

        Ok(generate_slots(&windows, &booked, self.slot_length))
    }

    /// Books a slot. Patients book for themselves; admins book on behalf of a named patient.
    pub async fn book_slot(
        &self,
        actor: &Actor,
        request: BookAppointmentRequest,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        require_role(actor, &[Role::Patient, Role::Admin])?;

        let patient_id = match actor.role {
            Role::Admin => request.patient_id.ok_or_else(|| {
                AppointmentError::Validation("patient_id is required when booking for a patient".to_string())
            })?,
            _ => {
                let patient_id = request.patient_id.unwrap_or(actor.id);
                require_owner_or_role(actor, patient_id, &[])?;
                patient_id
            }
        };

        if request.datetime < now {
            warn!("Rejected booking in the past at {} for doctor {}", request.datetime, request.doctor_id);
            return Err(AppointmentError::Validation(
                "Cannot book an appointment in the past".to_string(),
            ));
        }

        let appointment = self
            .bookings
            .insert_if_absent(NewAppointment {
                doctor_id: request.doctor_id,
                patient_id,
                appointment_datetime: request.datetime,
                reason: non_blank(request.reason),
            })
            .await?;

        info!(
            "Appointment {} booked for patient {} with doctor {} at {}",
            appointment.id, appointment.patient_id, appointment.doctor_id, appointment.appointment_datetime
        );
        Ok(appointment)
    }

    /// Cancels a Booked appointment on behalf of its patient, its doctor, or an admin.
    pub async fn cancel(&self, actor: &Actor, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(actor, appointment_id).await?;

        self.lifecycle
            .validate_status_transition(current.status, AppointmentStatus::Cancelled)?;

        let cancelled = self
            .bookings
            .update_status(appointment_id, AppointmentStatus::Cancelled)
            .await?;

        info!("Appointment {} cancelled by {} {}", appointment_id, actor.role, actor.id);
        Ok(cancelled)
    }

    /// Completes a Booked appointment and records its treatment. Only the appointment's
    /// doctor may do this, and the diagnosis must not be blank.
    pub async fn complete_with_treatment(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        request: TreatmentRequest,
    ) -> Result<CompletedAppointment, AppointmentError> {
        require_role(actor, &[Role::Doctor])?;

        let current = self
            .bookings
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;
        require_owner_or_role(actor, current.doctor_id, &[])?;

        self.lifecycle
            .validate_status_transition(current.status, AppointmentStatus::Completed)?;
        let treatment = request.validate()?;

        let (appointment, treatment) = self
            .bookings
            .complete_with_treatment(appointment_id, treatment)
            .await?;

        info!("Appointment {} completed by doctor {}", appointment_id, actor.id);
        Ok(CompletedAppointment { appointment, treatment })
    }

    /// Status change without a payload. Completion needs a treatment and is refused here.
    pub async fn update_status(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        match new_status {
            AppointmentStatus::Cancelled => self.cancel(actor, appointment_id).await,
            AppointmentStatus::Completed => Err(AppointmentError::Validation(
                "Completing an appointment requires a treatment record".to_string(),
            )),
            AppointmentStatus::Booked => {
                let current = self.get_appointment(actor, appointment_id).await?;
                self.lifecycle
                    .validate_status_transition(current.status, new_status)?;
                Ok(current)
            }
        }
    }

    pub async fn get_appointment(&self, actor: &Actor, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .bookings
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        require_party(actor, &appointment)?;
        Ok(appointment)
    }

    /// Appointments visible to the actor: admins see all, others only their own.
    pub async fn list_for_actor(&self, actor: &Actor) -> Result<Vec<Appointment>, AppointmentError> {
        let filter = match actor.role {
            Role::Admin => AppointmentFilter::default(),
            Role::Doctor => AppointmentFilter::for_doctor(actor.id),
            Role::Patient => AppointmentFilter::for_patient(actor.id),
        };

        self.bookings.list_appointments(&filter).await
    }

    pub async fn get_treatment(&self, actor: &Actor, appointment_id: Uuid) -> Result<Treatment, AppointmentError> {
        self.get_appointment(actor, appointment_id).await?;

        self.bookings
            .get_treatment(appointment_id)
            .await?
            .ok_or(AppointmentError::TreatmentNotFound)
    }

    pub async fn delete_appointment(&self, actor: &Actor, appointment_id: Uuid) -> Result<(), AppointmentError> {
        require_role(actor, &[Role::Admin])?;

        if !self.bookings.delete_appointment(appointment_id).await? {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} deleted by admin {}", appointment_id, actor.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn appointment(doctor_id: Uuid, patient_id: Uuid) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id,
            appointment_datetime: Utc::now().naive_utc(),
            status: AppointmentStatus::Booked,
            reason: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_party() {
        let doctor = Actor::doctor(Uuid::new_v4());
        let patient = Actor::patient(Uuid::new_v4());
        let appt = appointment(doctor.id, patient.id);

        assert!(require_party(&doctor, &appt).is_ok());
        assert!(require_party(&patient, &appt).is_ok());
        assert!(require_party(&Actor::admin(Uuid::new_v4()), &appt).is_ok());
        assert_eq!(
            require_party(&Actor::doctor(Uuid::new_v4()), &appt),
            Err(AccessDenied::NotOwner)
        );
        assert_eq!(
            require_party(&Actor::patient(Uuid::new_v4()), &appt),
            Err(AccessDenied::NotOwner)
        );
        // A doctor is not admitted through the patient column.
        assert_eq!(
            require_party(&Actor::doctor(patient.id), &appt),
            Err(AccessDenied::NotOwner)
        );
    }
}
