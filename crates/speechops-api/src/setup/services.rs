//! Upstream client and service construction

use crate::auth::jwt::JwtService;
use crate::auth::service::AuthService;
use crate::state::AppState;
use anyhow::Result;
use speechops_core::Config;
use speechops_services::{IdentityRecord, InMemoryIdentityStore, SpeechClient, TableClient};
use std::sync::Arc;
use std::time::Duration;

/// Build the shared HTTP client, both upstream clients, and the credential
/// validator. Timeouts live on the HTTP client; the proxies never retry.
pub fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let speech = SpeechClient::new(
        http_client.clone(),
        config.speech_endpoint.clone(),
        config.speech_subscription_key.clone(),
    );
    let tables = TableClient::new(
        http_client,
        config.table_account_url.clone(),
        config.table_sas_token.clone(),
    );

    // Single configured operator record; see IdentityStore for the stub note
    let identity = InMemoryIdentityStore::single(IdentityRecord {
        username: config.admin_username.clone(),
        secret: config.admin_password.clone(),
        roles: vec!["Admin".to_string()],
    });
    let jwt = JwtService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
        config.jwt_audience.clone(),
        config.jwt_expiry_days,
    );
    let auth = AuthService::new(Arc::new(identity), jwt);

    Ok(Arc::new(AppState {
        config: config.clone(),
        speech,
        tables,
        auth,
    }))
}
