//! OpenAPI documentation, served at `/api/openapi.json` and browsable at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use speechops_core::models;

/// Returns the assembled OpenAPI spec.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Speechops API",
        version = "0.1.0",
        description = "Management backend proxying batch transcription and table storage behind an authorized REST surface. All proxy endpoints require a bearer token obtained from /api/auth/login."
    ),
    paths(
        handlers::health::health_check,
        // Auth
        handlers::auth::login,
        handlers::auth::logout,
        // Transcription
        handlers::transcriptions::submit_transcription,
        handlers::transcriptions::list_transcriptions,
        handlers::transcriptions::get_transcription,
        handlers::transcriptions::delete_transcription,
        handlers::transcriptions::delete_transcription_output,
        // Table storage
        handlers::tables::list_tables,
        handlers::tables::create_table,
        handlers::tables::delete_table,
        handlers::tables::list_entities,
        handlers::tables::query_entities,
        handlers::tables::get_entity,
        handlers::tables::upsert_entity,
        handlers::tables::delete_entity,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::health::HealthResponse,
        models::LoginRequest,
        models::LoginResponse,
        models::MessageResponse,
        models::TranscriptionJob,
        models::TranscriptionJobRequest,
        models::TranscriptionProperties,
        models::DiarizationProperties,
        models::TranscriptionError,
        models::TranscriptionLinks,
        models::EntityReference,
        models::TableListResponse,
        models::TableEntityResponse,
        models::TableEntitiesResponse,
        models::UpsertEntityRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Operator authentication"),
        (name = "transcription", description = "Batch-transcription job proxy"),
        (name = "tablestorage", description = "Table storage proxy"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_contains_bearer_scheme_and_paths() {
        let spec = get_openapi_spec();
        let components = spec.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key("bearer_token"));
        assert!(spec.paths.paths.contains_key("/api/auth/login"));
        assert!(spec.paths.paths.contains_key("/api/transcription"));
        assert!(spec
            .paths
            .paths
            .contains_key("/api/tablestorage/tables/{name}/entities/{partitionKey}/{rowKey}"));
    }
}
