use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use doctor_cell::models::DateRange;
use shared_config::AppConfig;
use shared_database::supabase::{ApiError, SupabaseClient};

use super::BookingStore;
use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment, NewTreatment, Treatment};

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";
const TREATMENTS_PATH: &str = "/rest/v1/treatments";
const COMPLETE_RPC_PATH: &str = "/rest/v1/rpc/complete_appointment";

/// PostgREST timestamp literal for a `timestamp without time zone` column.
fn timestamp_param(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn db_error(err: anyhow::Error) -> AppointmentError {
    AppointmentError::Database(err.to_string())
}

#[derive(Debug, Deserialize)]
struct BookedRow {
    appointment_datetime: NaiveDateTime,
}

/// Booking store over Supabase.
///
/// Double booking is prevented by the partial unique index
/// `appointments (doctor_id, appointment_datetime) WHERE status = 'Booked'`; a losing insert
/// comes back as HTTP 409. Status changes are PATCHes filtered on `status=eq.Booked`, and
/// completion goes through the `complete_appointment` function so the treatment row and the
/// status change commit together.
pub struct SupabaseBookingStore {
    supabase: SupabaseClient,
}

impl SupabaseBookingStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Explains an empty conditional write: either the row is gone or it left `Booked`.
    async fn explain_missed_write(&self, appointment_id: Uuid) -> AppointmentError {
        match self.get_appointment(appointment_id).await {
            Ok(Some(current)) => AppointmentError::InvalidState(current.status),
            Ok(None) => AppointmentError::NotFound,
            Err(e) => e,
        }
    }
}

#[async_trait]
impl BookingStore for SupabaseBookingStore {
    async fn list_booked_timestamps(
        &self,
        doctor_id: Uuid,
        range: DateRange,
    ) -> Result<HashSet<NaiveDateTime>, AppointmentError> {
        let path = format!(
            "{}?select=appointment_datetime&doctor_id=eq.{}&status=eq.{}&appointment_datetime=gte.{}&appointment_datetime=lt.{}",
            APPOINTMENTS_PATH,
            doctor_id,
            AppointmentStatus::Booked,
            timestamp_param(range.start()),
            timestamp_param(range.end_exclusive()),
        );

        let rows: Vec<BookedRow> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(db_error)?;

        debug!("Doctor {} has {} booked slots in range", doctor_id, rows.len());
        Ok(rows.into_iter().map(|row| row.appointment_datetime).collect())
    }

    async fn insert_if_absent(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        let row = json!({
            "doctor_id": appointment.doctor_id,
            "patient_id": appointment.patient_id,
            "appointment_datetime": timestamp_param(appointment.appointment_datetime),
            "status": AppointmentStatus::Booked,
            "reason": appointment.reason,
        });

        let result: anyhow::Result<Vec<Appointment>> = self
            .supabase
            .request_with_headers(
                Method::POST,
                APPOINTMENTS_PATH,
                None,
                Some(row),
                Some(SupabaseClient::return_representation()),
            )
            .await;

        let created = match result {
            Ok(rows) => rows,
            Err(e) if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_conflict) => {
                warn!(
                    "Slot {} already booked for doctor {}",
                    appointment.appointment_datetime, appointment.doctor_id
                );
                return Err(AppointmentError::Conflict {
                    doctor_id: appointment.doctor_id,
                    start: appointment.appointment_datetime,
                });
            }
            Err(e) => return Err(db_error(e)),
        };

        created
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Database("Failed to create appointment".to_string()))
    }

    async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!(
            "{}?id=eq.{}&status=eq.{}",
            APPOINTMENTS_PATH,
            appointment_id,
            AppointmentStatus::Booked
        );

        let updated: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                None,
                Some(json!({ "status": new_status })),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(db_error)?;

        match updated.into_iter().next() {
            Some(appointment) => Ok(appointment),
            None => Err(self.explain_missed_write(appointment_id).await),
        }
    }

    async fn complete_with_treatment(
        &self,
        appointment_id: Uuid,
        treatment: NewTreatment,
    ) -> Result<(Appointment, Treatment), AppointmentError> {
        let params = json!({
            "p_appointment_id": appointment_id,
            "p_diagnosis": treatment.diagnosis,
            "p_prescription": treatment.prescription,
            "p_notes": treatment.notes,
        });

        // Returns no rows when the appointment is not Booked.
        let created: Vec<Treatment> = self
            .supabase
            .request(Method::POST, COMPLETE_RPC_PATH, None, Some(params))
            .await
            .map_err(db_error)?;

        let Some(treatment) = created.into_iter().next() else {
            return Err(self.explain_missed_write(appointment_id).await);
        };

        let appointment = self
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        Ok((appointment, treatment))
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, appointment_id);

        let rows: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().next())
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        let mut query_parts = Vec::new();

        if let Some(doctor_id) = filter.doctor_id {
            query_parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(patient_id) = filter.patient_id {
            query_parts.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(status) = filter.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(from) = filter.from {
            query_parts.push(format!("appointment_datetime=gte.{}", timestamp_param(from)));
        }
        if let Some(to) = filter.to {
            query_parts.push(format!("appointment_datetime=lt.{}", timestamp_param(to)));
        }
        query_parts.push("order=appointment_datetime.asc".to_string());

        let path = format!("{}?{}", APPOINTMENTS_PATH, query_parts.join("&"));
        debug!("Listing appointments: {}", path);

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(db_error)
    }

    async fn delete_appointment(&self, appointment_id: Uuid) -> Result<bool, AppointmentError> {
        // Treatments go with the appointment through ON DELETE CASCADE.
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, appointment_id);

        let deleted: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(db_error)?;

        Ok(!deleted.is_empty())
    }

    async fn get_treatment(&self, appointment_id: Uuid) -> Result<Option<Treatment>, AppointmentError> {
        let path = format!("{}?appointment_id=eq.{}", TREATMENTS_PATH, appointment_id);

        let rows: Vec<Treatment> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().next())
    }

    async fn list_treatments(&self, appointment_ids: &[Uuid]) -> Result<Vec<Treatment>, AppointmentError> {
        if appointment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = appointment_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let path = format!("{}?appointment_id=in.({})", TREATMENTS_PATH, ids);

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(db_error)
    }
}
