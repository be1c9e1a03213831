// libs/doctor-cell/src/services/slots.rs
use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::models::{AvailabilityWindow, DaySlots, SlotLength};

/// Start times of every slot that fits entirely inside `window`.
///
/// The interval is right-open: a slot starting at `t` is offered only when
/// `t + slot_length <= end`, so a window shorter than one slot yields nothing.
pub fn candidate_starts(
    window: &AvailabilityWindow,
    slot_length: SlotLength,
) -> impl Iterator<Item = NaiveDateTime> {
    let step = slot_length.as_duration();
    let end = window.ends_at();

    // Stepping stops at the end of the calendar instead of overflowing.
    std::iter::successors(Some(window.starts_at()), move |t| t.checked_add_signed(step))
        .take_while(move |t| t.checked_add_signed(step).is_some_and(|next| next <= end))
}

/// Bookable slots per date: every candidate start of every window, minus the
/// `(doctor_id, timestamp)` pairs already booked.
///
/// Exclusion is exact timestamp equality. A booking that merely overlaps a slot
/// without sharing its start does not remove it. Overlapping windows of the same
/// doctor collapse onto the same timestamps. Dates left with no slot are omitted.
pub fn generate_slots(
    windows: &[AvailabilityWindow],
    booked: &HashSet<(Uuid, NaiveDateTime)>,
    slot_length: SlotLength,
) -> BTreeMap<NaiveDate, Vec<NaiveDateTime>> {
    let mut by_date: BTreeMap<NaiveDate, BTreeSet<NaiveDateTime>> = BTreeMap::new();

    for window in windows {
        for start in candidate_starts(window, slot_length) {
            if booked.contains(&(window.doctor_id, start)) {
                continue;
            }
            by_date.entry(window.date).or_default().insert(start);
        }
    }

    debug!(
        "Generated slots on {} dates from {} windows",
        by_date.len(),
        windows.len()
    );

    by_date
        .into_iter()
        .map(|(date, slots)| (date, slots.into_iter().collect()))
        .collect()
}

/// Flattens the generator output into an ordered list for JSON responses.
pub fn into_day_slots(slots: BTreeMap<NaiveDate, Vec<NaiveDateTime>>) -> Vec<DaySlots> {
    slots
        .into_iter()
        .map(|(date, slots)| DaySlots { date, slots })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime, Utc};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn at(d: &str, t: &str) -> NaiveDateTime {
        date(d).and_time(time(t))
    }

    fn window(doctor_id: Uuid, d: &str, start: &str, end: &str) -> AvailabilityWindow {
        AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id,
            date: date(d),
            start_time: time(start),
            end_time: time(end),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_one_hour_window_yields_two_slots() {
        let doctor = Uuid::new_v4();
        let windows = vec![window(doctor, "2024-06-10", "09:00", "10:00")];

        let slots = generate_slots(&windows, &HashSet::new(), SlotLength::default());

        assert_eq!(slots.len(), 1);
        assert_eq!(
            slots[&date("2024-06-10")],
            vec![at("2024-06-10", "09:00"), at("2024-06-10", "09:30")]
        );
    }

    #[test]
    fn test_booked_slot_is_excluded() {
        let doctor = Uuid::new_v4();
        let windows = vec![window(doctor, "2024-06-10", "09:00", "10:00")];
        let booked = HashSet::from([(doctor, at("2024-06-10", "09:30"))]);

        let slots = generate_slots(&windows, &booked, SlotLength::default());

        assert_eq!(slots[&date("2024-06-10")], vec![at("2024-06-10", "09:00")]);
    }

    #[test]
    fn test_booking_for_other_doctor_does_not_block() {
        let doctor = Uuid::new_v4();
        let windows = vec![window(doctor, "2024-06-10", "09:00", "10:00")];
        let booked = HashSet::from([(Uuid::new_v4(), at("2024-06-10", "09:30"))]);

        let slots = generate_slots(&windows, &booked, SlotLength::default());

        assert_eq!(slots[&date("2024-06-10")].len(), 2);
    }

    #[test]
    fn test_misaligned_booking_does_not_block_adjacent_slots() {
        let doctor = Uuid::new_v4();
        let windows = vec![window(doctor, "2024-06-10", "09:00", "10:00")];
        let booked = HashSet::from([(doctor, at("2024-06-10", "09:15"))]);

        let slots = generate_slots(&windows, &booked, SlotLength::default());

        assert_eq!(
            slots[&date("2024-06-10")],
            vec![at("2024-06-10", "09:00"), at("2024-06-10", "09:30")]
        );
    }

    #[test]
    fn test_window_shorter_than_slot_yields_nothing() {
        let doctor = Uuid::new_v4();
        let windows = vec![window(doctor, "2024-06-10", "09:00", "09:20")];

        let slots = generate_slots(&windows, &HashSet::new(), SlotLength::default());

        assert!(slots.is_empty());
    }

    #[test]
    fn test_partial_trailing_slot_is_not_offered() {
        let doctor = Uuid::new_v4();
        let windows = vec![window(doctor, "2024-06-10", "09:00", "09:55")];

        let slots = generate_slots(&windows, &HashSet::new(), SlotLength::default());

        assert_eq!(slots[&date("2024-06-10")], vec![at("2024-06-10", "09:00")]);
    }

    #[test]
    fn test_candidate_count_matches_window_length() {
        let doctor = Uuid::new_v4();
        let slot = SlotLength::default();

        for (start, end) in [("08:00", "08:30"), ("08:00", "12:00"), ("13:10", "17:45"), ("00:00", "23:59")] {
            let w = window(doctor, "2024-06-10", start, end);
            let starts: Vec<_> = candidate_starts(&w, slot).collect();

            let expected = (w.ends_at() - w.starts_at()).num_minutes() / 30;
            assert_eq!(starts.len() as i64, expected, "window {}-{}", start, end);
            assert_eq!(starts.first().copied(), Some(w.starts_at()));
            assert!(starts.windows(2).all(|pair| pair[1] - pair[0] == Duration::minutes(30)));
        }
    }

    #[test]
    fn test_dates_ordered_and_fully_booked_dates_omitted() {
        let doctor = Uuid::new_v4();
        let windows = vec![
            window(doctor, "2024-06-12", "14:00", "15:00"),
            window(doctor, "2024-06-10", "09:00", "09:30"),
            window(doctor, "2024-06-11", "09:00", "10:00"),
        ];
        let booked = HashSet::from([(doctor, at("2024-06-10", "09:00"))]);

        let slots = generate_slots(&windows, &booked, SlotLength::default());

        assert_eq!(slots.keys().copied().collect::<Vec<_>>(), vec![date("2024-06-11"), date("2024-06-12")]);
    }

    #[test]
    fn test_overlapping_windows_are_deduplicated_and_sorted() {
        let doctor = Uuid::new_v4();
        let windows = vec![
            window(doctor, "2024-06-10", "10:00", "11:00"),
            window(doctor, "2024-06-10", "09:00", "10:30"),
        ];

        let slots = generate_slots(&windows, &HashSet::new(), SlotLength::default());

        assert_eq!(
            slots[&date("2024-06-10")],
            vec![
                at("2024-06-10", "09:00"),
                at("2024-06-10", "09:30"),
                at("2024-06-10", "10:00"),
                at("2024-06-10", "10:30"),
            ]
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let doctor = Uuid::new_v4();
        let windows = vec![
            window(doctor, "2024-06-11", "09:00", "12:00"),
            window(doctor, "2024-06-10", "13:00", "15:00"),
        ];
        let booked = HashSet::from([(doctor, at("2024-06-11", "10:00"))]);

        let first = generate_slots(&windows, &booked, SlotLength::default());
        let second = generate_slots(&windows, &booked, SlotLength::default());
        assert_eq!(first, second);

        let days = into_day_slots(first);
        assert_eq!(days[0].date, date("2024-06-10"));
        assert_eq!(days[1].slots.len(), 5);
    }

    #[test]
    fn test_window_on_last_representable_date() {
        let doctor = Uuid::new_v4();
        let windows = vec![AvailabilityWindow {
            date: NaiveDate::MAX,
            ..window(doctor, "2024-06-10", "23:00", "23:59")
        }];

        let slots = generate_slots(&windows, &HashSet::new(), SlotLength::default());

        assert_eq!(
            slots[&NaiveDate::MAX],
            vec![NaiveDate::MAX.and_time(time("23:00"))]
        );
    }

    #[test]
    fn test_custom_slot_length() {
        let doctor = Uuid::new_v4();
        let windows = vec![window(doctor, "2024-06-10", "09:00", "10:00")];

        let slots = generate_slots(&windows, &HashSet::new(), SlotLength::from_minutes(20).unwrap());

        assert_eq!(
            slots[&date("2024-06-10")],
            vec![at("2024-06-10", "09:00"), at("2024-06-10", "09:20"), at("2024-06-10", "09:40")]
        );
    }
}
