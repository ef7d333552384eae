use std::time::Duration;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use super::model::{SessionClaims, TokenKind};
use crate::core::error::AppError;

/// Verifies HS256 session tokens issued by [`TokenService`](super::services::TokenService)
pub struct JwtValidator {
    decoding_key: DecodingKey,
    issuer: String,
    leeway: u64,
}

impl JwtValidator {
    pub fn new(secret: &str, issuer: String, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str, expected: TokenKind) -> Result<SessionClaims, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        // Validate algorithm from header
        if header.alg != Algorithm::HS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = self.leeway;

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        if claims.kind != expected {
            return Err(AppError::Auth(match expected {
                TokenKind::Access => "Token is not an access token".to_string(),
                TokenKind::Refresh => "Token is not a refresh token".to_string(),
            }));
        }

        Ok(claims)
    }
}
