use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use doctor_cell::models::DateRange;

use super::BookingStore;
use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment, NewTreatment, Treatment};

#[derive(Debug, Default)]
struct BookingTables {
    appointments: HashMap<Uuid, Appointment>,
    /// Keyed by appointment id.
    treatments: HashMap<Uuid, Treatment>,
    /// `(doctor_id, timestamp)` of every Booked appointment.
    booked: HashMap<(Uuid, NaiveDateTime), Uuid>,
}

impl BookingTables {
    /// Takes a Booked appointment out of the slot index and sets its new status.
    fn finish(&mut self, appointment_id: Uuid, new_status: AppointmentStatus) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .appointments
            .get_mut(&appointment_id)
            .ok_or(AppointmentError::NotFound)?;

        if !appointment.is_booked() {
            return Err(AppointmentError::InvalidState(appointment.status));
        }

        appointment.status = new_status;
        let key = appointment.slot_key();
        let updated = appointment.clone();
        self.booked.remove(&key);

        Ok(updated)
    }
}

/// Process-local booking store. All tables sit behind one lock, so each check-then-write
/// runs without interleaving.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    tables: RwLock<BookingTables>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn appointment_count(&self) -> usize {
        self.tables.read().await.appointments.len()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn list_booked_timestamps(
        &self,
        doctor_id: Uuid,
        range: DateRange,
    ) -> Result<HashSet<NaiveDateTime>, AppointmentError> {
        let tables = self.tables.read().await;

        let booked: HashSet<NaiveDateTime> = tables
            .booked
            .keys()
            .filter(|(doctor, at)| *doctor == doctor_id && range.contains_timestamp(*at))
            .map(|(_, at)| *at)
            .collect();

        debug!("Doctor {} has {} booked slots in range", doctor_id, booked.len());
        Ok(booked)
    }

    async fn insert_if_absent(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        let mut tables = self.tables.write().await;
        let key = (appointment.doctor_id, appointment.appointment_datetime);

        if tables.booked.contains_key(&key) {
            warn!("Slot {} already booked for doctor {}", key.1, key.0);
            return Err(AppointmentError::Conflict {
                doctor_id: key.0,
                start: key.1,
            });
        }

        let stored = Appointment {
            id: Uuid::new_v4(),
            doctor_id: appointment.doctor_id,
            patient_id: appointment.patient_id,
            appointment_datetime: appointment.appointment_datetime,
            status: AppointmentStatus::Booked,
            reason: appointment.reason,
            created_at: Utc::now(),
        };

        tables.booked.insert(key, stored.id);
        tables.appointments.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        self.tables.write().await.finish(appointment_id, new_status)
    }

    async fn complete_with_treatment(
        &self,
        appointment_id: Uuid,
        treatment: NewTreatment,
    ) -> Result<(Appointment, Treatment), AppointmentError> {
        let mut tables = self.tables.write().await;

        let appointment = tables.finish(appointment_id, AppointmentStatus::Completed)?;
        let stored = Treatment {
            id: Uuid::new_v4(),
            appointment_id,
            diagnosis: treatment.diagnosis,
            prescription: treatment.prescription,
            notes: treatment.notes,
            created_at: Utc::now(),
        };
        tables.treatments.insert(appointment_id, stored.clone());

        Ok((appointment, stored))
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.tables.read().await.appointments.get(&appointment_id).cloned())
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matching.sort_by_key(|a| (a.appointment_datetime, a.created_at));

        Ok(matching)
    }

    async fn delete_appointment(&self, appointment_id: Uuid) -> Result<bool, AppointmentError> {
        let mut tables = self.tables.write().await;

        let Some(removed) = tables.appointments.remove(&appointment_id) else {
            return Ok(false);
        };

        tables.treatments.remove(&appointment_id);
        if tables.booked.get(&removed.slot_key()) == Some(&appointment_id) {
            tables.booked.remove(&removed.slot_key());
        }

        Ok(true)
    }

    async fn get_treatment(&self, appointment_id: Uuid) -> Result<Option<Treatment>, AppointmentError> {
        Ok(self.tables.read().await.treatments.get(&appointment_id).cloned())
    }

    async fn list_treatments(&self, appointment_ids: &[Uuid]) -> Result<Vec<Treatment>, AppointmentError> {
        let tables = self.tables.read().await;

        Ok(appointment_ids
            .iter()
            .filter_map(|id| tables.treatments.get(id).cloned())
            .collect())
    }
}
