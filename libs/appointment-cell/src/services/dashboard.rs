// libs/appointment-cell/src/services/dashboard.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Weekday};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::{Actor, Role};
use shared_utils::access::require_role;

use crate::error::AppointmentError;
use crate::models::{
    Appointment, AppointmentFilter, AppointmentStatus, DoctorSchedule, HistoryEntry, PatientDashboard,
    StatusCounts, WeekdayLoad,
};
use crate::store::BookingStore;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Appointments per weekday, Monday first. Days without appointments report zero.
pub fn weekly_load(appointments: &[Appointment]) -> Vec<WeekdayLoad> {
    let mut counts: HashMap<Weekday, usize> = HashMap::new();
    for appointment in appointments {
        *counts.entry(appointment.appointment_datetime.weekday()).or_default() += 1;
    }

    WEEK.iter()
        .map(|day| WeekdayLoad {
            weekday: weekday_name(*day).to_string(),
            count: counts.get(day).copied().unwrap_or(0),
        })
        .collect()
}

/// Read-only views over a user's appointments.
#[derive(Clone)]
pub struct AppointmentDashboardService {
    bookings: Arc<dyn BookingStore>,
}

impl AppointmentDashboardService {
    pub fn new(bookings: Arc<dyn BookingStore>) -> Self {
        Self { bookings }
    }

    /// Booked appointments soonest first, then everything else latest first.
    pub async fn doctor_schedule(&self, actor: &Actor) -> Result<DoctorSchedule, AppointmentError> {
        require_role(actor, &[Role::Doctor])?;

        let (upcoming, mut past): (Vec<_>, Vec<_>) = self
            .bookings
            .list_appointments(&AppointmentFilter::for_doctor(actor.id))
            .await?
            .into_iter()
            .partition(Appointment::is_booked);
        past.reverse();

        Ok(DoctorSchedule { upcoming, past })
    }

    pub async fn doctor_weekly_load(&self, actor: &Actor) -> Result<Vec<WeekdayLoad>, AppointmentError> {
        require_role(actor, &[Role::Doctor])?;

        let appointments = self
            .bookings
            .list_appointments(&AppointmentFilter::for_doctor(actor.id))
            .await?;

        Ok(weekly_load(&appointments))
    }

    /// Upcoming holds Booked appointments not yet started; past holds finished ones.
    /// A Booked appointment whose time has passed is counted but listed in neither.
    pub async fn patient_dashboard(
        &self,
        actor: &Actor,
        now: NaiveDateTime,
    ) -> Result<PatientDashboard, AppointmentError> {
        require_role(actor, &[Role::Patient])?;

        let appointments = self
            .bookings
            .list_appointments(&AppointmentFilter::for_patient(actor.id))
            .await?;

        let counts = StatusCounts::tally(&appointments);
        let upcoming = appointments
            .iter()
            .filter(|a| a.is_booked() && a.appointment_datetime >= now)
            .cloned()
            .collect();
        let past = appointments
            .iter()
            .rev()
            .filter(|a| a.status.is_terminal())
            .cloned()
            .collect();

        debug!("Dashboard for patient {}: {} appointments", actor.id, counts.total());
        Ok(PatientDashboard { upcoming, past, counts })
    }

    /// Completed visits of a patient with their treatments, most recent first.
    pub async fn patient_history(
        &self,
        actor: &Actor,
        patient_id: Uuid,
    ) -> Result<Vec<HistoryEntry>, AppointmentError> {
        require_role(actor, &[Role::Doctor, Role::Admin])?;

        let completed = self
            .bookings
            .list_appointments(&AppointmentFilter::for_patient(patient_id).with_status(AppointmentStatus::Completed))
            .await?;

        let ids: Vec<Uuid> = completed.iter().map(|a| a.id).collect();
        let mut treatments: HashMap<Uuid, _> = self
            .bookings
            .list_treatments(&ids)
            .await?
            .into_iter()
            .map(|t| (t.appointment_id, t))
            .collect();

        Ok(completed
            .into_iter()
            .rev()
            .map(|appointment| HistoryEntry {
                treatment: treatments.remove(&appointment.id),
                appointment,
            })
            .collect())
    }

    /// Every appointment, optionally narrowed to one status, latest first.
    pub async fn admin_listing(
        &self,
        actor: &Actor,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        require_role(actor, &[Role::Admin])?;

        let filter = AppointmentFilter {
            status,
            ..AppointmentFilter::default()
        };
        let mut appointments = self.bookings.list_appointments(&filter).await?;
        appointments.reverse();

        Ok(appointments)
    }

    /// System-wide appointment count per status.
    pub async fn admin_status_counts(&self, actor: &Actor) -> Result<StatusCounts, AppointmentError> {
        require_role(actor, &[Role::Admin])?;

        let appointments = self
            .bookings
            .list_appointments(&AppointmentFilter::default())
            .await?;

        Ok(StatusCounts::tally(&appointments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn at(d: &str, h: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn appointment(when: NaiveDateTime) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            appointment_datetime: when,
            status: AppointmentStatus::Booked,
            reason: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_weekly_load_counts_by_weekday() {
        // 2024-06-10 is a Monday.
        let appts = vec![
            appointment(at("2024-06-10", 9)),
            appointment(at("2024-06-10", 10)),
            appointment(at("2024-06-17", 9)),
            appointment(at("2024-06-14", 9)),
        ];

        let load = weekly_load(&appts);

        assert_eq!(load.len(), 7);
        assert_eq!(load[0], WeekdayLoad { weekday: "Monday".to_string(), count: 3 });
        assert_eq!(load[4], WeekdayLoad { weekday: "Friday".to_string(), count: 1 });
        assert_eq!(load[6].count, 0);
    }
}
