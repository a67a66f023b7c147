//! Shared application state
//!
//! Everything here is either read-only after startup or internally
//! synchronized (the reqwest-backed clients reuse connections and are cheap
//! to share).

use speechops_core::Config;
use speechops_services::{SpeechClient, TableClient};

use crate::auth::service::AuthService;

pub struct AppState {
    pub config: Config,
    pub speech: SpeechClient,
    pub tables: TableClient,
    pub auth: AuthService,
}
