// libs/doctor-cell/tests/availability_service_test.rs

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use doctor_cell::models::{CreateAvailabilityRequest, DateRange};
use doctor_cell::services::AvailabilityService;
use doctor_cell::store::{AvailabilityStore, InMemoryAvailabilityStore};
use doctor_cell::AvailabilityError;
use shared_models::auth::{AccessDenied, Actor, Role};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn request(d: &str, start: &str, end: &str) -> CreateAvailabilityRequest {
    CreateAvailabilityRequest {
        date: date(d),
        start_time: time(start),
        end_time: time(end),
    }
}

fn setup() -> (Arc<InMemoryAvailabilityStore>, AvailabilityService) {
    let store = Arc::new(InMemoryAvailabilityStore::new());
    let service = AvailabilityService::new(store.clone());
    (store, service)
}

const TODAY: &str = "2024-06-10";

#[tokio::test]
async fn test_doctor_adds_window_for_themselves() {
    let (_store, service) = setup();
    let doctor = Actor::doctor(Uuid::new_v4());

    let window = service
        .add_window(&doctor, request("2024-06-10", "09:00", "10:00"), date(TODAY))
        .await
        .unwrap();

    assert_eq!(window.doctor_id, doctor.id);
    assert_eq!(window.start_time, time("09:00"));

    let listed = service
        .list_windows(&doctor, doctor.id, DateRange::single(date("2024-06-10")))
        .await
        .unwrap();
    assert_eq!(listed, vec![window]);
}

#[tokio::test]
async fn test_past_date_rejected_and_store_unmodified() {
    let (store, service) = setup();
    let doctor = Actor::doctor(Uuid::new_v4());

    let result = service
        .add_window(&doctor, request("2024-06-09", "09:00", "10:00"), date(TODAY))
        .await;

    assert_eq!(result, Err(AvailabilityError::PastDate(date("2024-06-09"))));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_inverted_range_rejected() {
    let (store, service) = setup();
    let doctor = Actor::doctor(Uuid::new_v4());

    let result = service
        .add_window(&doctor, request("2024-06-11", "10:00", "09:00"), date(TODAY))
        .await;

    assert_eq!(result, Err(AvailabilityError::EmptyOrInvertedRange));
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_overlapping_windows_are_permitted() {
    let (store, service) = setup();
    let doctor = Actor::doctor(Uuid::new_v4());

    service.add_window(&doctor, request("2024-06-11", "09:00", "11:00"), date(TODAY)).await.unwrap();
    service.add_window(&doctor, request("2024-06-11", "10:00", "12:00"), date(TODAY)).await.unwrap();

    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_only_doctors_add_windows() {
    let (_store, service) = setup();
    let patient = Actor::patient(Uuid::new_v4());

    let result = service
        .add_window(&patient, request("2024-06-11", "09:00", "10:00"), date(TODAY))
        .await;

    assert_matches!(
        result,
        Err(AvailabilityError::Unauthorized(AccessDenied::RoleNotPermitted { role: Role::Patient }))
    );
}

#[tokio::test]
async fn test_list_is_scoped_and_ordered() {
    let (_store, service) = setup();
    let doctor = Actor::doctor(Uuid::new_v4());
    let other = Actor::doctor(Uuid::new_v4());

    service.add_window(&doctor, request("2024-06-12", "09:00", "10:00"), date(TODAY)).await.unwrap();
    service.add_window(&doctor, request("2024-06-11", "14:00", "15:00"), date(TODAY)).await.unwrap();
    service.add_window(&doctor, request("2024-06-11", "08:00", "09:00"), date(TODAY)).await.unwrap();
    service.add_window(&doctor, request("2024-06-30", "08:00", "09:00"), date(TODAY)).await.unwrap();
    service.add_window(&other, request("2024-06-11", "08:00", "09:00"), date(TODAY)).await.unwrap();

    let listed = service
        .list_windows(&doctor, doctor.id, service.upcoming_range(date(TODAY)))
        .await
        .unwrap();

    let keys: Vec<_> = listed.iter().map(|w| (w.date, w.start_time)).collect();
    assert_eq!(
        keys,
        vec![
            (date("2024-06-11"), time("08:00")),
            (date("2024-06-11"), time("14:00")),
            (date("2024-06-12"), time("09:00")),
        ]
    );
}

#[tokio::test]
async fn test_delete_by_owner() {
    let (store, service) = setup();
    let doctor = Actor::doctor(Uuid::new_v4());
    let window = service
        .add_window(&doctor, request("2024-06-11", "09:00", "10:00"), date(TODAY))
        .await
        .unwrap();

    service.delete_window(&doctor, window.id).await.unwrap();

    assert_eq!(store.get_window(window.id).await.unwrap(), None);
    assert_eq!(service.delete_window(&doctor, window.id).await, Err(AvailabilityError::NotFound));
}

#[tokio::test]
async fn test_delete_by_other_doctor_is_unauthorized() {
    let (store, service) = setup();
    let owner = Actor::doctor(Uuid::new_v4());
    let intruder = Actor::doctor(Uuid::new_v4());
    let window = service
        .add_window(&owner, request("2024-06-11", "09:00", "10:00"), date(TODAY))
        .await
        .unwrap();

    let result = service.delete_window(&intruder, window.id).await;

    assert_eq!(result, Err(AvailabilityError::Unauthorized(AccessDenied::NotOwner)));
    assert!(store.get_window(window.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_windows_visible_to_owner_and_admin_only() {
    let (_store, service) = setup();
    let doctor = Actor::doctor(Uuid::new_v4());
    service.add_window(&doctor, request("2024-06-11", "09:00", "10:00"), date(TODAY)).await.unwrap();
    let range = service.upcoming_range(date(TODAY));

    let admin = Actor::admin(Uuid::new_v4());
    assert_eq!(service.list_windows(&admin, doctor.id, range).await.unwrap().len(), 1);

    let other = Actor::doctor(Uuid::new_v4());
    assert_eq!(
        service.list_windows(&other, doctor.id, range).await,
        Err(AvailabilityError::Unauthorized(AccessDenied::NotOwner))
    );
}
