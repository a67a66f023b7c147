//! JWT issue and validation
//!
//! HS256 tokens with issuer, audience, and expiry all enforced. Every
//! issued token carries a fresh `jti`; there is no revocation list, so a
//! token stays valid until it expires (logout is a stateless acknowledgment).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use speechops_core::AppError;
use uuid::Uuid;

use crate::auth::models::JwtClaims;

/// A signed token plus the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    expiry_days: i64,
}

impl JwtService {
    pub fn new(
        secret: &str,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiry_days: i64,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
            expiry_days,
        }
    }

    /// Sign a token for an authenticated operator.
    pub fn issue(&self, username: &str, roles: &[String]) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::days(self.expiry_days);
        let claims = JwtClaims {
            sub: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            roles: roles.to_vec(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AppError::Internal(format!("Failed to sign token: {}", err)))?;

        Ok(IssuedToken { token, expiration })
    }

    /// Validate signature, expiry, issuer, and audience. Any failure is an
    /// authorization error, not an internal one.
    pub fn validate(&self, token: &str) -> Result<JwtClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service() -> JwtService {
        JwtService::new(SECRET, "speechops", "speechops-web", 7)
    }

    #[test]
    fn test_issue_then_validate_round_trip() {
        let issued = service()
            .issue("admin", &["Admin".to_string()])
            .expect("issue");
        let claims = service().validate(&issued.token).expect("validate");
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.roles, vec!["Admin".to_string()]);
        assert_eq!(claims.iss, "speechops");
        assert_eq!(claims.aud, "speechops-web");
        assert_eq!(claims.exp, issued.expiration.timestamp());
    }

    #[test]
    fn test_fresh_jti_per_token() {
        let svc = service();
        let first = svc.issue("admin", &[]).expect("issue");
        let second = svc.issue("admin", &[]).expect("issue");
        let a = svc.validate(&first.token).expect("validate");
        let b = svc.validate(&second.token).expect("validate");
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let issued = service().issue("admin", &[]).expect("issue");
        let other = JwtService::new(
            "ffffffffffffffffffffffffffffffff",
            "speechops",
            "speechops-web",
            7,
        );
        assert!(matches!(
            other.validate(&issued.token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_issuer_and_audience() {
        let issued = service().issue("admin", &[]).expect("issue");
        let wrong_issuer = JwtService::new(SECRET, "someone-else", "speechops-web", 7);
        assert!(wrong_issuer.validate(&issued.token).is_err());
        let wrong_audience = JwtService::new(SECRET, "speechops", "other-client", 7);
        assert!(wrong_audience.validate(&issued.token).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let expired = JwtService::new(SECRET, "speechops", "speechops-web", -1);
        let issued = expired.issue("admin", &[]).expect("issue");
        let err = service().validate(&issued.token).expect_err("rejected");
        match err {
            AppError::Unauthorized(msg) => assert_eq!(msg, "Token has expired"),
            _ => panic!("Expected Unauthorized variant"),
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(service().validate("not-a-token").is_err());
    }
}
