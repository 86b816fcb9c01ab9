use assert_matches::assert_matches;

use appointment_cell::models::{AppointmentError, BookAppointmentRequest};
use appointment_cell::services::{AppointmentBookingService, AppointmentQueryService};
use shared_models::appointment::AppointmentStatus;
use shared_utils::test_utils::{at, TestClinic};

/// Pat has two upcoming appointments (Grey late, Shepherd early) and one
/// completed appointment with Grey; Sam has one with Shepherd.
async fn clinic_with_history() -> TestClinic {
    let clinic = TestClinic::seeded().await;
    let booking_service = AppointmentBookingService::new(&clinic.state);

    let book = |doctor_id: i64, day: &str, clock: &str| BookAppointmentRequest {
        doctor_id,
        appointment_time: at(day, clock),
    };

    booking_service.book(clinic.patient.id, book(clinic.doctor.id, "2030-06-12", "10:00")).await.unwrap();
    booking_service.book(clinic.patient.id, book(clinic.other_doctor.id, "2030-06-11", "14:00")).await.unwrap();
    let done = booking_service.book(clinic.patient.id, book(clinic.doctor.id, "2030-06-10", "09:00")).await.unwrap();
    booking_service.book(clinic.other_patient.id, book(clinic.other_doctor.id, "2030-06-10", "16:00")).await.unwrap();

    booking_service.change_status(done.id, AppointmentStatus::Completed, clinic.doctor.id).await.unwrap();
    clinic
}

#[tokio::test]
async fn test_unknown_condition_is_rejected() {
    let clinic = clinic_with_history().await;
    let query_service = AppointmentQueryService::new(&clinic.state);

    let result = query_service.filter(clinic.patient.id, Some("urgent"), None).await;
    assert_matches!(result, Err(AppointmentError::InvalidCondition(value)) if value == "urgent");

    let with_name = query_service.filter(clinic.patient.id, Some("urgent"), Some("grey")).await;
    assert_matches!(with_name, Err(AppointmentError::InvalidCondition(_)));
}

#[tokio::test]
async fn test_no_filters_lists_only_own_appointments_in_time_order() {
    let clinic = clinic_with_history().await;
    let query_service = AppointmentQueryService::new(&clinic.state);

    let rows = query_service.filter(clinic.patient.id, None, None).await.unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.patient_id == clinic.patient.id));
    assert!(rows.windows(2).all(|pair| pair[0].appointment_time <= pair[1].appointment_time));
}

#[tokio::test]
async fn test_condition_maps_to_status() {
    let clinic = clinic_with_history().await;
    let query_service = AppointmentQueryService::new(&clinic.state);

    let past = query_service.filter(clinic.patient.id, Some("past"), None).await.unwrap();
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].status, AppointmentStatus::Completed);

    let upcoming = query_service.filter(clinic.patient.id, Some("UPCOMING"), None).await.unwrap();
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0].doctor_name, "Dr. Derek Shepherd");
    assert_eq!(upcoming[1].doctor_name, "Dr. Meredith Grey");
}

#[tokio::test]
async fn test_doctor_name_is_a_case_insensitive_substring() {
    let clinic = clinic_with_history().await;
    let query_service = AppointmentQueryService::new(&clinic.state);

    let grey = query_service.filter(clinic.patient.id, None, Some("GREY")).await.unwrap();
    assert_eq!(grey.len(), 2);

    let grey_upcoming = query_service.filter(clinic.patient.id, Some("upcoming"), Some("mered")).await.unwrap();
    assert_eq!(grey_upcoming.len(), 1);
    assert_eq!(grey_upcoming[0].appointment_time, at("2030-06-12", "10:00"));

    // Sam's Shepherd appointment never leaks into Pat's results.
    let shepherd = query_service.filter(clinic.patient.id, None, Some("shepherd")).await.unwrap();
    assert_eq!(shepherd.len(), 1);
    assert_eq!(shepherd[0].patient_id, clinic.patient.id);
}

#[tokio::test]
async fn test_blank_and_null_parameters_are_ignored() {
    let clinic = clinic_with_history().await;
    let query_service = AppointmentQueryService::new(&clinic.state);

    let rows = query_service.filter(clinic.patient.id, Some("null"), Some("")).await.unwrap();
    assert_eq!(rows.len(), 3);
}
