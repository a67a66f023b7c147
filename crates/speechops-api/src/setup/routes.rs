//! Route configuration and setup

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use speechops_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Public routes (no authentication required)
    let public_routes = public_routes(state.clone());

    // Protected routes behind the session guard
    let protected_routes = protected_routes(state.clone()).layer(
        axum::middleware::from_fn_with_state(state, crate::auth::middleware::auth_middleware),
    );

    let app = public_routes
        .merge(protected_routes)
        .merge(
            utoipa_rapidoc::RapiDoc::new(format!("{}/openapi.json", API_PREFIX)).path("/docs"),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .route(
            &format!("{}/auth/login", API_PREFIX),
            post(handlers::auth::login),
        )
        .route(
            &format!("{}/auth/logout", API_PREFIX),
            post(handlers::auth::logout),
        )
        .with_state(state)
}

/// Proxy routes gated by the session guard
fn protected_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            &format!("{}/transcription", API_PREFIX),
            get(handlers::transcriptions::list_transcriptions)
                .post(handlers::transcriptions::submit_transcription),
        )
        .route(
            &format!("{}/transcription/{{id}}", API_PREFIX),
            get(handlers::transcriptions::get_transcription)
                .delete(handlers::transcriptions::delete_transcription),
        )
        .route(
            &format!("{}/transcription/{{id}}/output", API_PREFIX),
            delete(handlers::transcriptions::delete_transcription_output),
        )
        .route(
            &format!("{}/tablestorage/tables", API_PREFIX),
            get(handlers::tables::list_tables),
        )
        .route(
            &format!("{}/tablestorage/tables/{{name}}", API_PREFIX),
            post(handlers::tables::create_table).delete(handlers::tables::delete_table),
        )
        .route(
            &format!("{}/tablestorage/tables/{{name}}/entities", API_PREFIX),
            get(handlers::tables::list_entities).post(handlers::tables::upsert_entity),
        )
        .route(
            &format!("{}/tablestorage/tables/{{name}}/query", API_PREFIX),
            get(handlers::tables::query_entities),
        )
        .route(
            &format!(
                "{}/tablestorage/tables/{{name}}/entities/{{partition_key}}/{{row_key}}",
                API_PREFIX
            ),
            get(handlers::tables::get_entity).delete(handlers::tables::delete_entity),
        )
        .with_state(state)
}
