use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{JwtHeader, Role, TokenClaims};

type HmacSha256 = Hmac<Sha256>;

/// Tokens are valid for a fixed week from issuance.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("JWT secret is not set")]
    MissingSecret,

    #[error("Invalid token format")]
    Format,

    #[error("Invalid token signature")]
    Signature,

    #[error("Invalid claims: {0}")]
    Claims(String),
}

/// HS256 signer and verifier keyed with the configured secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
}

impl TokenSigner {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_secret(&config.jwt_secret)
    }

    pub fn with_secret(secret: &str) -> Self {
        Self { secret: secret.to_string() }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|_| TokenError::MissingSecret)
    }

    pub fn issue(&self, subject: &str, role: Role) -> Result<String, TokenError> {
        self.issue_at(subject, role, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, role: Role, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let header = JwtHeader {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let claims = TokenClaims {
            sub: subject.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        };

        let header_b64 = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&header).map_err(|e| TokenError::Claims(e.to_string()))?,
        );
        let claims_b64 = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims).map_err(|e| TokenError::Claims(e.to_string()))?,
        );
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Checks structure, algorithm and signature, then decodes the claims.
    /// Expiry is left to the caller.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut mac = self.mac()?;

        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(TokenError::Format);
        }

        let header_b64 = parts[0];
        let claims_b64 = parts[1];
        let signature_b64 = parts[2];

        let header: JwtHeader = decode_segment(header_b64).map_err(|_| TokenError::Format)?;
        if header.alg != "HS256" {
            debug!("Rejecting token signed with {}", header.alg);
            return Err(TokenError::Format);
        }

        let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
            debug!("Failed to decode signature: {}", e);
            TokenError::Signature
        })?;

        mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());
        if mac.verify_slice(&signature).is_err() {
            debug!("Token signature verification failed");
            return Err(TokenError::Signature);
        }

        decode_segment(claims_b64)
    }
}

fn decode_segment<T>(segment: &str) -> Result<T, TokenError>
where T: serde::de::DeserializeOwned {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|_| TokenError::Format)?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))
}
