//! Wire models for the table-storage surface.
//!
//! A table entity is a partition key, a row key, and an open property bag.
//! The reserved system columns never appear in `properties`; stripping them
//! is the mapper's job (`speechops-services::entity`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TableListResponse {
    pub tables: Vec<String>,
}

/// A single entity as exposed to the browser client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableEntityResponse {
    pub partition_key: String,
    pub row_key: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub properties: Map<String, Value>,
}

/// Page of entities; `continuation_token` resumes the listing when present.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableEntitiesResponse {
    pub entities: Vec<TableEntityResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

/// Insert-or-replace request; the property bag replaces the stored one
/// wholesale (no merge).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertEntityRequest {
    pub partition_key: String,
    pub row_key: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub properties: Map<String, Value>,
}
