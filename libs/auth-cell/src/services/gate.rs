use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use shared_database::Directory;
use shared_models::auth::{AuthenticatedUser, Role, TokenClaims};
use shared_utils::jwt::{TokenError, TokenSigner};
use shared_utils::AppState;

use crate::models::AuthError;

/// Confirms a bearer token is signed, unexpired, and that its subject still
/// exists in the directory under the role it claims.
pub struct AuthorizationGate {
    signer: TokenSigner,
    directory: Arc<dyn Directory>,
}

impl AuthorizationGate {
    pub fn new(state: &AppState) -> Self {
        Self::with_directory(state.signer.clone(), state.directory.clone())
    }

    pub fn with_directory(signer: TokenSigner, directory: Arc<dyn Directory>) -> Self {
        Self { signer, directory }
    }

    pub async fn authorize(&self, token: &str, required: Role) -> Result<AuthenticatedUser, AuthError> {
        self.authorize_at(token, required, Utc::now()).await
    }

    pub async fn authorize_at(
        &self,
        token: &str,
        required: Role,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.verify(token, now)?;

        if claims.role != required {
            warn!("Token for {} carries role {}, {} required", claims.sub, claims.role, required);
            return Err(AuthError::RoleMismatch);
        }

        self.resolve(claims).await
    }

    /// Accepts any role, resolving the subject under the role the token claims.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.verify(token, Utc::now())?;
        self.resolve(claims).await
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let claims = self.signer.verify(token).map_err(|e| match e {
            TokenError::MissingSecret => AuthError::Internal(e.to_string()),
            other => AuthError::Malformed(other.to_string()),
        })?;

        if claims.exp <= now.timestamp() {
            debug!("Token for {} expired at {}", claims.sub, claims.exp);
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    async fn resolve(&self, claims: TokenClaims) -> Result<AuthenticatedUser, AuthError> {
        let id = match claims.role {
            Role::Admin => self.directory.find_admin_by_username(&claims.sub).await?.map(|a| a.id),
            Role::Doctor => self.directory.find_doctor_by_email(&claims.sub).await?.map(|d| d.id),
            Role::Patient => self.directory.find_patient_by_email(&claims.sub).await?.map(|p| p.id),
        };

        match id {
            Some(id) => {
                debug!("Authorized {} {} (id {})", claims.role, claims.sub, id);
                Ok(AuthenticatedUser {
                    id,
                    subject: claims.sub,
                    role: claims.role,
                })
            }
            None => {
                warn!("No {} record for token subject {}", claims.role, claims.sub);
                Err(AuthError::RoleMismatch)
            }
        }
    }
}
