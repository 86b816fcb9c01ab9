use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use shared_config::{AppConfig, StorageBackend};
use shared_database::{InMemoryClinic, Registry};
use shared_models::auth::Role;
use shared_models::directory::{Admin, Doctor, NewDoctor, NewPatient, Patient, TimeWindow};

use crate::jwt::{TokenSigner, TOKEN_LIFETIME_DAYS};
use crate::password::hash_password;
use crate::state::AppState;

/// Plain-text password shared by every seeded account.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            storage_backend: StorageBackend::Memory,
            server_port: 0,
        }
    }

    pub fn signer(&self) -> TokenSigner {
        TokenSigner::with_secret(&self.jwt_secret)
    }
}

pub fn windows(raw: &[&str]) -> Vec<TimeWindow> {
    raw.iter().map(|w| w.parse().expect("fixture window")).collect()
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("fixture date")
}

pub fn time(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M").expect("fixture time")
}

pub fn at(day: &str, clock: &str) -> NaiveDateTime {
    date(day).and_time(time(clock))
}

/// An in-memory clinic with one admin, two doctors and two patients.
///
/// Dr. Grey works mornings (`09:00-10:00`, `10:00-11:00`), Dr. Shepherd
/// works afternoons (`14:00-15:00`, `16:00-17:00`).
pub struct TestClinic {
    pub store: Arc<InMemoryClinic>,
    pub state: Arc<AppState>,
    pub password_hash: String,
    pub admin: Admin,
    pub doctor: Doctor,
    pub other_doctor: Doctor,
    pub patient: Patient,
    pub other_patient: Patient,
}

impl TestClinic {
    pub async fn seeded() -> Self {
        let config = TestConfig::default().to_app_config();
        let store = Arc::new(InMemoryClinic::new());
        let state = Arc::new(AppState::with_stores(
            config,
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let password_hash = hash_password(TEST_PASSWORD).expect("hash fixture password");

        let admin = store.insert_admin("admin", &password_hash).await.expect("seed admin");

        let doctor = store.insert_doctor(NewDoctor {
            name: "Dr. Meredith Grey".to_string(),
            specialty: "Surgery".to_string(),
            email: "grey@clinic.test".to_string(),
            password_hash: password_hash.clone(),
            phone: "5550000001".to_string(),
            available_times: windows(&["09:00-10:00", "10:00-11:00"]),
        }).await.expect("seed doctor");

        let other_doctor = store.insert_doctor(NewDoctor {
            name: "Dr. Derek Shepherd".to_string(),
            specialty: "Neurology".to_string(),
            email: "shepherd@clinic.test".to_string(),
            password_hash: password_hash.clone(),
            phone: "5550000002".to_string(),
            available_times: windows(&["14:00-15:00", "16:00-17:00"]),
        }).await.expect("seed doctor");

        let patient = store.insert_patient(NewPatient {
            name: "Pat Doe".to_string(),
            email: "pat@clinic.test".to_string(),
            phone: "5551110001".to_string(),
            address: "1 Main St".to_string(),
            password_hash: password_hash.clone(),
        }).await.expect("seed patient");

        let other_patient = store.insert_patient(NewPatient {
            name: "Sam Roe".to_string(),
            email: "sam@clinic.test".to_string(),
            phone: "5551110002".to_string(),
            address: "2 Side St".to_string(),
            password_hash: password_hash.clone(),
        }).await.expect("seed patient");

        Self {
            store,
            state,
            password_hash,
            admin,
            doctor,
            other_doctor,
            patient,
            other_patient,
        }
    }

    pub async fn add_doctor(&self, name: &str, email: &str, available: &[&str]) -> Doctor {
        self.store.insert_doctor(NewDoctor {
            name: name.to_string(),
            specialty: "General Practice".to_string(),
            email: email.to_string(),
            password_hash: self.password_hash.clone(),
            phone: format!("555{}", email.len()),
            available_times: windows(available),
        }).await.expect("add doctor")
    }

    pub fn token_for(&self, subject: &str, role: Role) -> String {
        self.state.signer.issue(subject, role).expect("issue fixture token")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(&self.admin.username, Role::Admin)
    }

    pub fn doctor_token(&self) -> String {
        self.token_for(&self.doctor.email, Role::Doctor)
    }

    pub fn patient_token(&self) -> String {
        self.token_for(&self.patient.email, Role::Patient)
    }

    pub fn other_patient_token(&self) -> String {
        self.token_for(&self.other_patient.email, Role::Patient)
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Issued long enough ago that its week of validity has run out.
    pub fn create_expired_token(signer: &TokenSigner, subject: &str, role: Role) -> String {
        let issued_at = Utc::now() - Duration::days(TOKEN_LIFETIME_DAYS + 1);
        signer.issue_at(subject, role, issued_at).expect("issue expired token")
    }

    pub fn create_invalid_signature_token(subject: &str, role: Role) -> String {
        TokenSigner::with_secret("wrong-secret").issue(subject, role).expect("issue token")
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}
