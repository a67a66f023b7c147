//! Configuration module
//!
//! This module provides the application configuration, loaded from the
//! environment: server and CORS settings, JWT signing parameters, the
//! operator identity placeholder, and the two upstream service endpoints.

use std::env;

const JWT_EXPIRY_DAYS: i64 = 7;
const HTTP_TIMEOUT_SECS: u64 = 30;
const SPEECH_API_HOST_SUFFIX: &str = ".api.cognitive.microsoft.com";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    // JWT settings
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiry_days: i64,
    // Operator identity (placeholder single-user store, see IdentityStore)
    pub admin_username: String,
    pub admin_password: String,
    // Speech batch-transcription upstream
    pub speech_subscription_key: String,
    pub speech_endpoint: String,
    // Table store upstream
    pub table_account_url: String,
    pub table_sas_token: String,
    // Shared HTTP client settings
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        // The speech endpoint is normally derived from the region; an explicit
        // SPEECH_ENDPOINT overrides it (used for tests and sovereign clouds).
        let speech_endpoint = match env::var("SPEECH_ENDPOINT") {
            Ok(endpoint) => endpoint.trim_end_matches('/').to_string(),
            Err(_) => {
                let region = env::var("SPEECH_REGION").map_err(|_| {
                    anyhow::anyhow!("SPEECH_REGION or SPEECH_ENDPOINT must be set")
                })?;
                format!("https://{}{}/speechtotext", region, SPEECH_API_HOST_SUFFIX)
            }
        };

        let config = Config {
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            cors_origins,
            environment,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "speechops".to_string()),
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "speechops-web".to_string()),
            jwt_expiry_days: env::var("JWT_EXPIRY_DAYS")
                .unwrap_or_else(|_| JWT_EXPIRY_DAYS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_DAYS),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD")
                .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD must be set"))?,
            speech_subscription_key: env::var("SPEECH_SUBSCRIPTION_KEY")
                .map_err(|_| anyhow::anyhow!("SPEECH_SUBSCRIPTION_KEY must be set"))?,
            speech_endpoint,
            table_account_url: env::var("TABLE_ACCOUNT_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .map_err(|_| anyhow::anyhow!("TABLE_ACCOUNT_URL must be set"))?,
            table_sas_token: env::var("TABLE_SAS_TOKEN")
                .map(|s| s.trim_start_matches('?').to_string())
                .unwrap_or_default(),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Fail-fast validation of values that would otherwise only surface at
    /// request time.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }
        if self.jwt_expiry_days <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_DAYS must be positive"));
        }
        if self.admin_password.is_empty() {
            return Err(anyhow::anyhow!("ADMIN_PASSWORD cannot be empty"));
        }
        if !self.table_account_url.starts_with("http") {
            return Err(anyhow::anyhow!("TABLE_ACCOUNT_URL must be an http(s) URL"));
        }
        Ok(())
    }
}
