use assert_matches::assert_matches;

use appointment_cell::models::BookAppointmentRequest;
use appointment_cell::services::AppointmentBookingService;
use doctor_cell::models::{CreateDoctorRequest, DoctorError, DoctorFilterQuery, UpdateDoctorRequest};
use doctor_cell::services::DoctorService;
use shared_database::{AppointmentStore, Directory};
use shared_utils::password::verify_password;
use shared_utils::test_utils::{at, TestClinic};

fn new_doctor(email: &str) -> CreateDoctorRequest {
    CreateDoctorRequest {
        name: "Dr. Miranda Bailey".to_string(),
        specialty: "General Surgery".to_string(),
        email: email.to_string(),
        password: "pager-code".to_string(),
        phone: "5550000003".to_string(),
        available_times: vec!["08:00-09:00".to_string(), "13:00-14:00".to_string()],
    }
}

fn filter(name: Option<&str>, specialty: Option<&str>, time: Option<&str>) -> DoctorFilterQuery {
    DoctorFilterQuery {
        name: name.map(str::to_string),
        specialty: specialty.map(str::to_string),
        time: time.map(str::to_string),
    }
}

#[tokio::test]
async fn test_register_hashes_password_and_parses_windows() {
    let clinic = TestClinic::seeded().await;
    let service = DoctorService::new(&clinic.state);

    let doctor = service.register(new_doctor("bailey@clinic.test")).await.unwrap();

    assert_eq!(doctor.available_times.len(), 2);
    assert_eq!(doctor.available_times[1].to_string(), "13:00-14:00");
    assert_ne!(doctor.password_hash, "pager-code");
    assert!(verify_password("pager-code", &doctor.password_hash).unwrap());
}

#[tokio::test]
async fn test_register_rejects_duplicate_email_and_bad_windows() {
    let clinic = TestClinic::seeded().await;
    let service = DoctorService::new(&clinic.state);

    assert_matches!(
        service.register(new_doctor(&clinic.doctor.email)).await,
        Err(DoctorError::EmailTaken(_))
    );

    let mut broken = new_doctor("broken@clinic.test");
    broken.available_times = vec!["10:00-09:00".to_string()];
    assert_matches!(service.register(broken).await, Err(DoctorError::InvalidWindow(_)));
}

#[tokio::test]
async fn test_update_requires_existing_doctor_and_unique_email() {
    let clinic = TestClinic::seeded().await;
    let service = DoctorService::new(&clinic.state);

    let request = UpdateDoctorRequest {
        name: clinic.doctor.name.clone(),
        specialty: "Cardiothoracic Surgery".to_string(),
        email: clinic.other_doctor.email.clone(),
        phone: clinic.doctor.phone.clone(),
        available_times: vec!["07:00-08:00".to_string()],
        password: None,
    };

    assert_matches!(service.update(999, request.clone()).await, Err(DoctorError::NotFound));
    assert_matches!(service.update(clinic.doctor.id, request.clone()).await, Err(DoctorError::EmailTaken(_)));

    let keep_email = UpdateDoctorRequest { email: clinic.doctor.email.clone(), ..request };
    let updated = service.update(clinic.doctor.id, keep_email).await.unwrap();

    assert_eq!(updated.specialty, "Cardiothoracic Surgery");
    assert_eq!(updated.available_times[0].to_string(), "07:00-08:00");
    assert_eq!(updated.password_hash, clinic.doctor.password_hash);
}

#[tokio::test]
async fn test_delete_removes_doctor_and_appointments() {
    let clinic = TestClinic::seeded().await;
    let service = DoctorService::new(&clinic.state);
    let booking_service = AppointmentBookingService::new(&clinic.state);

    let booked = booking_service.book(
        clinic.patient.id,
        BookAppointmentRequest { doctor_id: clinic.doctor.id, appointment_time: at("2030-06-10", "09:00") },
    ).await.unwrap();

    service.delete(clinic.doctor.id).await.unwrap();

    assert!(clinic.store.find_doctor_by_id(clinic.doctor.id).await.unwrap().is_none());
    assert!(clinic.store.find_by_id(booked.id).await.unwrap().is_none());
    assert_matches!(service.delete(clinic.doctor.id).await, Err(DoctorError::NotFound));
}

#[tokio::test]
async fn test_filter_by_name_specialty_and_period() {
    let clinic = TestClinic::seeded().await;
    let service = DoctorService::new(&clinic.state);

    assert_eq!(service.list().await.unwrap().len(), 2);

    let by_name = service.filter(&filter(Some("GREY"), None, None)).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, clinic.doctor.id);

    let by_specialty = service.filter(&filter(None, Some("neurology"), None)).await.unwrap();
    assert_eq!(by_specialty.len(), 1);
    assert_eq!(by_specialty[0].id, clinic.other_doctor.id);

    // Specialty is an exact match, not a substring.
    assert!(service.filter(&filter(None, Some("neuro"), None)).await.unwrap().is_empty());

    let mornings = service.filter(&filter(None, None, Some("AM"))).await.unwrap();
    assert_eq!(mornings.iter().map(|d| d.id).collect::<Vec<_>>(), vec![clinic.doctor.id]);

    let afternoons = service.filter(&filter(Some("dr."), None, Some("pm"))).await.unwrap();
    assert_eq!(afternoons.iter().map(|d| d.id).collect::<Vec<_>>(), vec![clinic.other_doctor.id]);

    let all = service.filter(&filter(Some("null"), Some(""), None)).await.unwrap();
    assert_eq!(all.len(), 2);

    assert_matches!(
        service.filter(&filter(None, None, Some("noon"))).await,
        Err(DoctorError::InvalidPeriod(_))
    );
}
