use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{SessionClaims, SessionTokens, TokenKind};

/// Signs access/refresh token pairs for a session
pub struct TokenService {
    config: AuthConfig,
    encoding_key: EncodingKey,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            config,
            encoding_key,
        }
    }

    /// Issue a fresh pair for `session_id`
    pub fn issue(&self, identity_id: Uuid, session_id: Uuid) -> Result<SessionTokens> {
        let now = Utc::now();
        let access_ttl = self.config.access_token_ttl.as_secs() as i64;
        let refresh_ttl = self.config.refresh_token_ttl.as_secs() as i64;

        let access = self.sign(identity_id, session_id, TokenKind::Access, now, access_ttl)?;
        let refresh = self.sign(identity_id, session_id, TokenKind::Refresh, now, refresh_ttl)?;

        Ok(SessionTokens {
            access,
            refresh,
            token_type: "Bearer".to_string(),
            expires_in: access_ttl,
        })
    }

    /// Latest moment any token issued now for a session could still be valid
    pub fn session_horizon(&self) -> DateTime<Utc> {
        let longest = self
            .config
            .refresh_token_ttl
            .max(self.config.access_token_ttl)
            + self.config.jwt_leeway;
        Utc::now() + chrono::Duration::seconds(longest.as_secs() as i64)
    }

    fn sign(
        &self,
        identity_id: Uuid,
        session_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
        ttl_secs: i64,
    ) -> Result<String> {
        let claims = SessionClaims {
            sub: identity_id,
            sid: session_id,
            jti: Uuid::new_v4(),
            kind,
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign {:?} token: {}", kind, e);
            AppError::Internal("Failed to sign token".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::JwtValidator;
    use crate::shared::test_helpers::test_auth_config;

    #[test]
    fn test_issued_pair_validates_by_kind() {
        let config = test_auth_config();
        let validator = JwtValidator::new(&config.jwt_secret, config.issuer.clone(), config.jwt_leeway);
        let tokens = TokenService::new(config);

        let identity_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let pair = tokens.issue(identity_id, session_id).unwrap();

        let access = validator.validate_token(&pair.access, TokenKind::Access).unwrap();
        assert_eq!(access.sub, identity_id);
        assert_eq!(access.sid, session_id);

        let refresh = validator.validate_token(&pair.refresh, TokenKind::Refresh).unwrap();
        assert_eq!(refresh.sid, session_id);
        assert_ne!(refresh.jti, access.jti);

        assert!(validator.validate_token(&pair.refresh, TokenKind::Access).is_err());
        assert!(validator.validate_token(&pair.access, TokenKind::Refresh).is_err());
        assert_eq!(pair.token_type, "Bearer");
    }

    #[test]
    fn test_foreign_secret_or_issuer_rejected() {
        let config = test_auth_config();
        let pair = TokenService::new(config.clone())
            .issue(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();

        let wrong_secret = JwtValidator::new(
            "another-secret-that-is-long-enough-0123456789",
            config.issuer.clone(),
            config.jwt_leeway,
        );
        assert!(wrong_secret.validate_token(&pair.access, TokenKind::Access).is_err());

        let wrong_issuer =
            JwtValidator::new(&config.jwt_secret, "someone-else".to_string(), config.jwt_leeway);
        assert!(wrong_issuer.validate_token(&pair.access, TokenKind::Access).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let config = test_auth_config();
        let validator = JwtValidator::new(&config.jwt_secret, config.issuer, config.jwt_leeway);
        assert!(matches!(
            validator.validate_token("not.a.token", TokenKind::Access),
            Err(AppError::Auth(_))
        ));
    }
}
