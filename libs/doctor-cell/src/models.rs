// libs/doctor-cell/src/models.rs
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AvailabilityError;

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// A doctor-declared interval on one date during which slots may be offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    #[serde(alias = "available_date")]
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityWindow {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }
}

/// A window that passed validation and has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAvailabilityWindow {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
}

// ==============================================================================
// RANGES AND SLOT LENGTH
// ==============================================================================

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, AvailabilityError> {
        if from > to {
            return Err(AvailabilityError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    /// `today` through `today + days`, both ends included.
    pub fn upcoming(today: NaiveDate, days: i64) -> Self {
        Self {
            from: today,
            to: today
                .checked_add_signed(Duration::days(days.max(0)))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn contains_timestamp(&self, timestamp: NaiveDateTime) -> bool {
        self.contains(timestamp.date())
    }

    /// First instant of the range.
    pub fn start(&self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    /// First instant after the range, saturating at the last representable instant.
    pub fn end_exclusive(&self) -> NaiveDateTime {
        self.to
            .succ_opt()
            .map_or(NaiveDateTime::MAX, |next| next.and_time(NaiveTime::MIN))
    }
}

/// Length of one bookable slot. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLength(Duration);

impl SlotLength {
    pub fn from_minutes(minutes: i64) -> Result<Self, AvailabilityError> {
        if minutes <= 0 || minutes > 24 * 60 {
            return Err(AvailabilityError::InvalidSlotLength(minutes));
        }
        Ok(Self(Duration::minutes(minutes)))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn minutes(&self) -> i64 {
        self.0.num_minutes()
    }
}

impl Default for SlotLength {
    fn default() -> Self {
        Self(Duration::minutes(30))
    }
}

/// Slots offered on one date, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<NaiveDateTime>,
}

// ==============================================================================
// QUERY DTOs
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRangeQuery {
    /// Missing bounds fall back to `default`.
    pub fn resolve(&self, default: DateRange) -> Result<DateRange, AvailabilityError> {
        DateRange::new(
            self.from.unwrap_or(default.from),
            self.to.unwrap_or(default.to),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityListResponse {
    pub doctor_id: Uuid,
    pub range: DateRange,
    pub windows: Vec<AvailabilityWindow>,
}

/// Accepts both `HH:MM` (as typed into a time input) and `HH:MM:SS`.
pub mod clock_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M:%S"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(|_| de::Error::custom(format!("invalid time of day: {}", raw)))
    }
}
