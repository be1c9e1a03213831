// libs/doctor-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::{AccessDenied, Actor, Role};
use shared_utils::access::{require_owner_or_role, require_role};

use crate::error::AvailabilityError;
use crate::models::{AvailabilityWindow, CreateAvailabilityRequest, DateRange, NewAvailabilityWindow};
use crate::store::AvailabilityStore;

/// Checks a proposed window. Overlap with the doctor's other windows is allowed.
pub fn validate_window(
    doctor_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    today: NaiveDate,
) -> Result<NewAvailabilityWindow, AvailabilityError> {
    if start_time >= end_time {
        return Err(AvailabilityError::EmptyOrInvertedRange);
    }
    if date < today {
        return Err(AvailabilityError::PastDate(date));
    }

    Ok(NewAvailabilityWindow {
        doctor_id,
        date,
        start_time,
        end_time,
    })
}

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn AvailabilityStore>,
    horizon_days: i64,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn AvailabilityStore>) -> Self {
        Self::with_horizon(store, shared_config::DEFAULT_BOOKING_HORIZON_DAYS)
    }

    pub fn with_horizon(store: Arc<dyn AvailabilityStore>, horizon_days: i64) -> Self {
        Self { store, horizon_days }
    }

    pub fn store(&self) -> Arc<dyn AvailabilityStore> {
        Arc::clone(&self.store)
    }

    /// Default listing range: today through the booking horizon.
    pub fn upcoming_range(&self, today: NaiveDate) -> DateRange {
        DateRange::upcoming(today, self.horizon_days)
    }

    /// Adds a window owned by the calling doctor. Nothing is stored on rejection.
    pub async fn add_window(
        &self,
        actor: &Actor,
        request: CreateAvailabilityRequest,
        today: NaiveDate,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        require_role(actor, &[Role::Doctor])?;

        let window = validate_window(actor.id, request.date, request.start_time, request.end_time, today)
            .inspect_err(|e| warn!("Rejected availability for doctor {}: {}", actor.id, e))?;

        let created = self.store.insert_window(window).await?;
        info!(
            "Availability {} added for doctor {} on {} {}-{}",
            created.id, created.doctor_id, created.date, created.start_time, created.end_time
        );

        Ok(created)
    }

    /// A doctor's windows in `range`. Visible to that doctor and to admins.
    pub async fn list_windows(
        &self,
        actor: &Actor,
        doctor_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityError> {
        require_owner_or_role(actor, doctor_id, &[Role::Admin])?;

        debug!("Listing availability for doctor {} from {} to {}", doctor_id, range.from, range.to);
        self.store.list_windows(doctor_id, range).await
    }

    /// Deletes a window. Only the doctor who owns it may do so.
    pub async fn delete_window(&self, actor: &Actor, window_id: Uuid) -> Result<(), AvailabilityError> {
        require_role(actor, &[Role::Doctor])?;

        let window = self
            .store
            .get_window(window_id)
            .await?
            .ok_or(AvailabilityError::NotFound)?;

        if window.doctor_id != actor.id {
            warn!("Doctor {} tried to delete availability {} owned by {}", actor.id, window_id, window.doctor_id);
            return Err(AccessDenied::NotOwner.into());
        }

        if !self.store.delete_window(window_id).await? {
            return Err(AvailabilityError::NotFound);
        }

        info!("Availability {} deleted by doctor {}", window_id, actor.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    #[test]
    fn test_validate_window_rules() {
        let doctor = Uuid::new_v4();
        let today = date("2024-06-10");

        assert!(validate_window(doctor, today, time("09:00"), time("10:00"), today).is_ok());
        assert_eq!(
            validate_window(doctor, today, time("10:00"), time("10:00"), today),
            Err(AvailabilityError::EmptyOrInvertedRange)
        );
        assert_eq!(
            validate_window(doctor, today, time("11:00"), time("10:00"), today),
            Err(AvailabilityError::EmptyOrInvertedRange)
        );
        assert_eq!(
            validate_window(doctor, date("2024-06-09"), time("09:00"), time("10:00"), today),
            Err(AvailabilityError::PastDate(date("2024-06-09")))
        );
    }
}
