//! Credential validation
//!
//! Exact username lookup, constant-time secret comparison, and token issue
//! on success. Authentication failure is a `None`, never an error; the
//! handler maps it to 401.

use std::sync::Arc;

use speechops_core::models::LoginResponse;
use speechops_core::AppError;
use speechops_services::IdentityStore;
use subtle::ConstantTimeEq;

use crate::auth::jwt::JwtService;
use crate::auth::models::JwtClaims;

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityStore>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityStore>, jwt: JwtService) -> Self {
        Self { identity, jwt }
    }

    /// Validate a username/secret pair and issue a token on success.
    /// No side effects; nothing is recorded about failed attempts.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<LoginResponse>, AppError> {
        let record = match self.identity.lookup(username) {
            Some(record) => record,
            None => return Ok(None),
        };
        if !secure_compare(password, &record.secret) {
            return Ok(None);
        }

        let issued = self.jwt.issue(&record.username, &record.roles)?;
        Ok(Some(LoginResponse {
            token: issued.token,
            username: record.username,
            expiration: issued.expiration,
        }))
    }

    /// Validate a bearer token presented by the session guard.
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        self.jwt.validate(token)
    }
}
