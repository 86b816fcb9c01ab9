use std::sync::Arc;

use tracing::{info, warn};

use shared_database::Directory;
use shared_models::auth::Role;
use shared_utils::jwt::TokenSigner;
use shared_utils::password::verify_password;
use shared_utils::AppState;

use crate::models::{AdminLoginRequest, AuthError, LoginRequest, LoginResponse};

pub struct LoginService {
    signer: TokenSigner,
    directory: Arc<dyn Directory>,
}

impl LoginService {
    pub fn new(state: &AppState) -> Self {
        Self {
            signer: state.signer.clone(),
            directory: state.directory.clone(),
        }
    }

    pub async fn admin_login(&self, request: &AdminLoginRequest) -> Result<LoginResponse, AuthError> {
        let hash = self.directory
            .find_admin_by_username(&request.username)
            .await?
            .map(|admin| admin.password_hash);

        self.issue(&request.username, Role::Admin, hash, &request.password)
    }

    pub async fn doctor_login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let hash = self.directory
            .find_doctor_by_email(&request.email)
            .await?
            .map(|doctor| doctor.password_hash);

        self.issue(&request.email, Role::Doctor, hash, &request.password)
    }

    pub async fn patient_login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let hash = self.directory
            .find_patient_by_email(&request.email)
            .await?
            .map(|patient| patient.password_hash);

        self.issue(&request.email, Role::Patient, hash, &request.password)
    }

    fn issue(
        &self,
        subject: &str,
        role: Role,
        stored_hash: Option<String>,
        password: &str,
    ) -> Result<LoginResponse, AuthError> {
        let Some(hash) = stored_hash else {
            warn!("Login attempt for unknown {} {}", role, subject);
            return Err(AuthError::InvalidCredentials);
        };

        let matches = verify_password(password, &hash).map_err(|e| {
            warn!("Stored credential for {} {} is unusable: {}", role, subject, e);
            AuthError::Internal("stored credential is unusable".to_string())
        })?;

        if !matches {
            warn!("Wrong password for {} {}", role, subject);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer
            .issue(subject, role)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!("{} {} logged in", role, subject);
        Ok(LoginResponse {
            token,
            subject: subject.to_string(),
            role,
        })
    }
}
