// libs/appointment-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use doctor_cell::models::{DateRange, DaySlots};

use crate::error::AppointmentError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_datetime: NaiveDateTime,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// The key a Booked appointment holds exclusively.
    pub fn slot_key(&self) -> (Uuid, NaiveDateTime) {
        (self.doctor_id, self.appointment_datetime)
    }

    pub fn is_booked(&self) -> bool {
        self.status == AppointmentStatus::Booked
    }
}

/// Appointment lifecycle. `Booked` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Booked,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Booked,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Booked)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "Booked"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "booked" => Ok(AppointmentStatus::Booked),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(AppointmentError::Validation(format!("Unknown appointment status: {}", other))),
        }
    }
}

/// A booking that passed validation and has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_datetime: NaiveDateTime,
    pub reason: Option<String>,
}

// ==============================================================================
// TREATMENT MODELS
// ==============================================================================

/// Outcome recorded when a doctor completes an appointment. At most one per appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreatmentRequest {
    #[serde(default)]
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub notes: Option<String>,
}

/// Treatment fields after trimming; `diagnosis` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTreatment {
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub notes: Option<String>,
}

impl TreatmentRequest {
    pub fn validate(self) -> Result<NewTreatment, AppointmentError> {
        let diagnosis = self.diagnosis.trim();
        if diagnosis.is_empty() {
            return Err(AppointmentError::Validation("Diagnosis is required".to_string()));
        }

        Ok(NewTreatment {
            diagnosis: diagnosis.to_string(),
            prescription: non_blank(self.prescription),
            notes: non_blank(self.notes),
        })
    }
}

/// Trims optional free text; blank input is stored as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedAppointment {
    pub appointment: Appointment,
    pub treatment: Treatment,
}

// ==============================================================================
// REQUEST / QUERY DTOs
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    /// Required when an admin books on behalf of a patient; patients may omit it.
    pub patient_id: Option<Uuid>,
    pub datetime: NaiveDateTime,
    pub reason: Option<String>,
}

/// `?status=` accepts any casing; an unrecognised value lists everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminListQuery {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<AppointmentStatus>,
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<AppointmentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// Store-side selection. Every set field must match; `to` is exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl AppointmentFilter {
    pub fn for_doctor(doctor_id: Uuid) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            ..Self::default()
        }
    }

    pub fn for_patient(patient_id: Uuid) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.doctor_id.map_or(true, |id| appointment.doctor_id == id)
            && self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.status.map_or(true, |s| appointment.status == s)
            && self.from.map_or(true, |from| appointment.appointment_datetime >= from)
            && self.to.map_or(true, |to| appointment.appointment_datetime < to)
    }
}

// ==============================================================================
// JSON RECORD SURFACE
// ==============================================================================

/// Flat appointment shape served under `/api/appointments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub datetime: NaiveDateTime,
    pub status: AppointmentStatus,
}

impl From<&Appointment> for AppointmentRecord {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            doctor_id: appointment.doctor_id,
            patient_id: appointment.patient_id,
            datetime: appointment.appointment_datetime,
            status: appointment.status,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub datetime: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRecordRequest {
    pub id: Uuid,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRecordRequest {
    pub id: Uuid,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub doctor_id: Uuid,
    pub range: DateRange,
    pub slot_length_minutes: i64,
    pub days: Vec<DaySlots>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub upcoming: Vec<Appointment>,
    pub past: Vec<Appointment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub booked: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn tally<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        appointments
            .into_iter()
            .fold(Self::default(), |mut counts, appointment| {
                match appointment.status {
                    AppointmentStatus::Booked => counts.booked += 1,
                    AppointmentStatus::Completed => counts.completed += 1,
                    AppointmentStatus::Cancelled => counts.cancelled += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.booked + self.completed + self.cancelled
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientDashboard {
    pub upcoming: Vec<Appointment>,
    pub past: Vec<Appointment>,
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayLoad {
    pub weekday: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub appointment: Appointment,
    pub treatment: Option<Treatment>,
}
