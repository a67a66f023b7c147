use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use speechops_core::models::{MessageResponse, TableEntitiesResponse, TableListResponse, UpsertEntityRequest};
use speechops_core::AppError;
use speechops_services::{entity_to_wire, wire_to_entity};
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListEntitiesQuery {
    /// OData filter expression, passed through verbatim
    pub filter: Option<String>,
    pub page_size: Option<u32>,
    /// Opaque token from a previous page
    pub continuation_token: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntityFilterQuery {
    pub filter: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/tablestorage/tables",
    tag = "tablestorage",
    responses(
        (status = 200, description = "All table names", body = TableListResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn list_tables(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tables = state.tables.list_tables().await?;
    Ok(Json(TableListResponse { tables }))
}

#[utoipa::path(
    post,
    path = "/api/tablestorage/tables/{name}",
    tag = "tablestorage",
    params(("name" = String, Path, description = "Table name")),
    responses(
        (status = 200, description = "Table exists (created or already present)", body = MessageResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn create_table(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.tables.create_table(&name).await?;
    tracing::info!(table = %name, "Table created");
    Ok(Json(MessageResponse {
        message: format!("Table '{}' created", name),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/tablestorage/tables/{name}",
    tag = "tablestorage",
    params(("name" = String, Path, description = "Table name")),
    responses(
        (status = 200, description = "Table deleted", body = MessageResponse),
        (status = 404, description = "Table not found", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_table(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.tables.delete_table(&name).await?;
    tracing::info!(table = %name, "Table deleted");
    Ok(Json(MessageResponse {
        message: format!("Table '{}' deleted", name),
    }))
}

#[utoipa::path(
    get,
    path = "/api/tablestorage/tables/{name}/entities",
    tag = "tablestorage",
    params(
        ("name" = String, Path, description = "Table name"),
        ListEntitiesQuery
    ),
    responses(
        (status = 200, description = "One page of entities", body = TableEntitiesResponse),
        (status = 400, description = "Malformed continuation token", body = ErrorResponse),
        (status = 404, description = "Table not found", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn list_entities(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<ListEntitiesQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .tables
        .list_entities(
            &name,
            query.filter.as_deref(),
            query.page_size,
            query.continuation_token.as_deref(),
        )
        .await?;
    Ok(Json(TableEntitiesResponse {
        entities: page.entities.iter().map(entity_to_wire).collect(),
        continuation_token: page.continuation_token,
    }))
}

/// Drains every page upstream; the response never carries a continuation
/// token.
#[utoipa::path(
    get,
    path = "/api/tablestorage/tables/{name}/query",
    tag = "tablestorage",
    params(
        ("name" = String, Path, description = "Table name"),
        EntityFilterQuery
    ),
    responses(
        (status = 200, description = "All matching entities", body = TableEntitiesResponse),
        (status = 404, description = "Table not found", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn query_entities(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<EntityFilterQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let entities = state
        .tables
        .query_entities(&name, query.filter.as_deref())
        .await?;
    Ok(Json(TableEntitiesResponse {
        entities: entities.iter().map(entity_to_wire).collect(),
        continuation_token: None,
    }))
}

#[utoipa::path(
    get,
    path = "/api/tablestorage/tables/{name}/entities/{partitionKey}/{rowKey}",
    tag = "tablestorage",
    params(
        ("name" = String, Path, description = "Table name"),
        ("partitionKey" = String, Path, description = "Partition key"),
        ("rowKey" = String, Path, description = "Row key")
    ),
    responses(
        (status = 200, description = "Entity found", body = speechops_core::models::TableEntityResponse),
        (status = 404, description = "Entity not found", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn get_entity(
    State(state): State<Arc<AppState>>,
    Path((name, partition_key, row_key)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let entity = state
        .tables
        .get_entity(&name, &partition_key, &row_key)
        .await?
        .ok_or_else(|| AppError::NotFound("Entity not found".to_string()))?;
    Ok(Json(entity_to_wire(&entity)))
}

#[utoipa::path(
    post,
    path = "/api/tablestorage/tables/{name}/entities",
    tag = "tablestorage",
    params(("name" = String, Path, description = "Table name")),
    request_body = UpsertEntityRequest,
    responses(
        (status = 200, description = "Entity inserted or replaced", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn upsert_entity(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    ValidatedJson(body): ValidatedJson<UpsertEntityRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if body.partition_key.is_empty() || body.row_key.is_empty() {
        return Err(
            AppError::InvalidInput("partitionKey and rowKey are required".to_string()).into(),
        );
    }
    let entity = wire_to_entity(&body);
    state
        .tables
        .upsert_entity(&name, &body.partition_key, &body.row_key, &entity)
        .await?;
    Ok(Json(MessageResponse {
        message: "Entity upserted".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/tablestorage/tables/{name}/entities/{partitionKey}/{rowKey}",
    tag = "tablestorage",
    params(
        ("name" = String, Path, description = "Table name"),
        ("partitionKey" = String, Path, description = "Partition key"),
        ("rowKey" = String, Path, description = "Row key")
    ),
    responses(
        (status = 204, description = "Entity deleted"),
        (status = 404, description = "Entity not found", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_entity(
    State(state): State<Arc<AppState>>,
    Path((name, partition_key, row_key)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .tables
        .delete_entity(&name, &partition_key, &row_key)
        .await?;
    tracing::info!(table = %name, "Entity deleted");
    Ok(StatusCode::NO_CONTENT)
}
