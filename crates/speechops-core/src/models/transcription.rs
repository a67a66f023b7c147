//! Wire models for the speech batch-transcription upstream.
//!
//! Field names mirror the upstream camelCase protocol. Deserialization is
//! deliberately tolerant (`#[serde(default)]`) because listings omit fields
//! that single-job reads include; anything the models do not know is dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A batch-transcription job as the upstream reports it.
///
/// The upstream listing does not carry `id` directly; after `list()` the
/// proxy fills it in from the trailing path segment of `links.files`
/// (`.../transcriptions/{id}/files`). A job without a files link keeps
/// whatever identifier the upstream supplied, possibly none.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    #[serde(default)]
    pub display_name: String,
    /// Upstream-defined lifecycle state (e.g. Running, Succeeded, Failed);
    /// treated as opaque by the proxy.
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<EntityReference>,
    #[serde(default)]
    pub properties: TranscriptionProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<TranscriptionLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TranscriptionError>,
}

/// Reference to another upstream resource by its URL
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntityReference {
    #[serde(rename = "self")]
    pub self_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionProperties {
    #[serde(default)]
    pub word_level_timestamps_enabled: bool,
    #[serde(default)]
    pub display_form_word_level_timestamps_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<i32>>,
    #[serde(default = "default_punctuation_mode")]
    pub punctuation_mode: String,
    #[serde(default = "default_profanity_filter_mode")]
    pub profanity_filter_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_container_url: Option<String>,
    #[serde(default = "default_time_to_live_hours")]
    pub time_to_live_hours: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diarization: Option<DiarizationProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TranscriptionError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_ticks: Option<i64>,
}

impl Default for TranscriptionProperties {
    fn default() -> Self {
        Self {
            word_level_timestamps_enabled: false,
            display_form_word_level_timestamps_enabled: false,
            channels: None,
            punctuation_mode: default_punctuation_mode(),
            profanity_filter_mode: default_profanity_filter_mode(),
            destination_container_url: None,
            time_to_live_hours: default_time_to_live_hours(),
            diarization: None,
            error: None,
            duration_in_ticks: None,
        }
    }
}

fn default_punctuation_mode() -> String {
    "DictatedAndAutomatic".to_string()
}

fn default_profanity_filter_mode() -> String {
    "Masked".to_string()
}

fn default_time_to_live_hours() -> i32 {
    48
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiarizationProperties {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speakers: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionLinks {
    /// URL of the job's output files collection. Also the only place the
    /// upstream listing exposes the job identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,
}

/// Job submission request from the browser client
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionJobRequest {
    pub display_name: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    pub audio_url: String,
    #[serde(default)]
    pub enable_diarization: bool,
    #[serde(default)]
    pub enable_word_level_timestamps: bool,
    #[serde(default)]
    pub enable_display_form_word_level_timestamps: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_live_hours: Option<i32>,
}

fn default_locale() -> String {
    "en-US".to_string()
}
