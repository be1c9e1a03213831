// libs/appointment-cell/tests/dashboard_test.rs

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use appointment_cell::models::{AppointmentStatus, NewAppointment, NewTreatment, StatusCounts};
use appointment_cell::services::AppointmentDashboardService;
use appointment_cell::store::{BookingStore, InMemoryBookingStore};
use appointment_cell::AppointmentError;
use shared_models::auth::{AccessDenied, Actor, Role};

fn at(d: &str, h: u32) -> NaiveDateTime {
    NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap().and_hms_opt(h, 0, 0).unwrap()
}

async fn book(store: &InMemoryBookingStore, doctor: &Actor, patient: &Actor, when: NaiveDateTime) -> Uuid {
    store
        .insert_if_absent(NewAppointment {
            doctor_id: doctor.id,
            patient_id: patient.id,
            appointment_datetime: when,
            reason: None,
        })
        .await
        .unwrap()
        .id
}

async fn complete(store: &InMemoryBookingStore, id: Uuid, diagnosis: &str) {
    store
        .complete_with_treatment(
            id,
            NewTreatment {
                diagnosis: diagnosis.to_string(),
                prescription: None,
                notes: None,
            },
        )
        .await
        .unwrap();
}

struct Fixture {
    store: Arc<InMemoryBookingStore>,
    service: AppointmentDashboardService,
    doctor: Actor,
    patient: Actor,
    ids: Vec<Uuid>,
}

/// Five appointments for one doctor and patient:
/// two past completed, one past cancelled, one past still booked, one upcoming.
async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryBookingStore::new());
    let doctor = Actor::doctor(Uuid::new_v4());
    let patient = Actor::patient(Uuid::new_v4());

    let mut ids = Vec::new();
    for when in [
        at("2024-06-03", 9),
        at("2024-06-04", 9),
        at("2024-06-05", 9),
        at("2024-06-06", 9),
        at("2024-06-20", 9),
    ] {
        ids.push(book(&store, &doctor, &patient, when).await);
    }
    complete(&store, ids[0], "Migraine").await;
    complete(&store, ids[1], "Follow-up").await;
    store.update_status(ids[2], AppointmentStatus::Cancelled).await.unwrap();

    Fixture {
        service: AppointmentDashboardService::new(store.clone()),
        store,
        doctor,
        patient,
        ids,
    }
}

#[tokio::test]
async fn test_doctor_schedule_orders_both_lists() {
    let f = fixture().await;

    let schedule = f.service.doctor_schedule(&f.doctor).await.unwrap();

    let upcoming: Vec<Uuid> = schedule.upcoming.iter().map(|a| a.id).collect();
    let past: Vec<Uuid> = schedule.past.iter().map(|a| a.id).collect();
    assert_eq!(upcoming, vec![f.ids[3], f.ids[4]]);
    assert_eq!(past, vec![f.ids[2], f.ids[1], f.ids[0]]);
}

#[tokio::test]
async fn test_patient_dashboard() {
    let f = fixture().await;

    let dashboard = f.service.patient_dashboard(&f.patient, at("2024-06-10", 0)).await.unwrap();

    assert_eq!(dashboard.upcoming.iter().map(|a| a.id).collect::<Vec<_>>(), vec![f.ids[4]]);
    assert_eq!(
        dashboard.past.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![f.ids[2], f.ids[1], f.ids[0]]
    );
    assert_eq!(dashboard.counts, StatusCounts { booked: 2, completed: 2, cancelled: 1 });
}

#[tokio::test]
async fn test_weekly_load() {
    let f = fixture().await;
    // One more on a Monday (2024-06-03 and 2024-06-17 are Mondays).
    book(&f.store, &f.doctor, &f.patient, at("2024-06-17", 11)).await;

    let load = f.service.doctor_weekly_load(&f.doctor).await.unwrap();

    let counts: Vec<usize> = load.iter().map(|d| d.count).collect();
    assert_eq!(counts, vec![2, 1, 1, 2, 0, 0, 0]);
    assert_eq!(load[3].weekday, "Thursday");
}

#[tokio::test]
async fn test_patient_history_joins_treatments() {
    let f = fixture().await;

    let history = f.service.patient_history(&f.doctor, f.patient.id).await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].appointment.id, f.ids[1]);
    assert_eq!(history[0].treatment.as_ref().unwrap().diagnosis, "Follow-up");
    assert_eq!(history[1].treatment.as_ref().unwrap().diagnosis, "Migraine");

    assert_eq!(
        f.service.patient_history(&f.patient, f.patient.id).await,
        Err(AppointmentError::Unauthorized(AccessDenied::RoleNotPermitted { role: Role::Patient }))
    );
}

#[tokio::test]
async fn test_admin_listing_filters_by_status() {
    let f = fixture().await;
    let admin = Actor::admin(Uuid::new_v4());

    let all = f.service.admin_listing(&admin, None).await.unwrap();
    assert_eq!(all.first().map(|a| a.id), Some(f.ids[4]));
    assert_eq!(all.len(), 5);

    let booked = f.service.admin_listing(&admin, Some(AppointmentStatus::Booked)).await.unwrap();
    assert_eq!(booked.iter().map(|a| a.id).collect::<Vec<_>>(), vec![f.ids[4], f.ids[3]]);

    assert_matches!(
        f.service.admin_listing(&f.doctor, None).await,
        Err(AppointmentError::Unauthorized(_))
    );
}

#[tokio::test]
async fn test_admin_status_counts_cover_every_patient() {
    let f = fixture().await;
    let admin = Actor::admin(Uuid::new_v4());
    let other = Actor::patient(Uuid::new_v4());
    book(&f.store, &f.doctor, &other, at("2024-06-21", 9)).await;

    let counts = f.service.admin_status_counts(&admin).await.unwrap();

    assert_eq!(counts, StatusCounts { booked: 3, completed: 2, cancelled: 1 });
    assert_matches!(
        f.service.admin_status_counts(&f.doctor).await,
        Err(AppointmentError::Unauthorized(_))
    );
}

#[tokio::test]
async fn test_views_are_role_gated() {
    let f = fixture().await;

    assert_matches!(f.service.doctor_schedule(&f.patient).await, Err(AppointmentError::Unauthorized(_)));
    assert_matches!(f.service.doctor_weekly_load(&f.patient).await, Err(AppointmentError::Unauthorized(_)));
    assert_matches!(
        f.service.patient_dashboard(&f.doctor, at("2024-06-10", 0)).await,
        Err(AppointmentError::Unauthorized(_))
    );
}
