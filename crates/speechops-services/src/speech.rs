//! Speech batch-transcription client
//!
//! Proxies job lifecycle operations against the upstream speech-to-text
//! batch API. Every operation is a single upstream call sequence; failures
//! are surfaced, never retried here. The one exception is
//! `delete_output`, a two-step lookup-then-delete with no atomicity
//! guarantee between the steps.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use speechops_core::models::{TranscriptionJob, TranscriptionJobRequest};

use crate::error::{UpstreamError, UpstreamResult};

const API_VERSION: &str = "2024-11-15";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const DEFAULT_TIME_TO_LIVE_HOURS: i32 = 48;

static FILES_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/transcriptions/([^/]+)/files").expect("files link pattern is valid")
});

/// Derives a job identifier from the trailing path segment of a files link
/// (`.../transcriptions/{id}/files`).
///
/// Returns `None` when the URL does not match the pattern; callers must then
/// leave the identifier untouched.
pub fn derive_job_id(files_url: &str) -> Option<String> {
    FILES_LINK_RE
        .captures(files_url)
        .map(|captures| captures[1].to_string())
}

/// Client for the upstream speech batch-transcription API.
///
/// The base URL is region-scoped and every request carries the subscription
/// key header plus the pinned `api-version`.
#[derive(Clone)]
pub struct SpeechClient {
    http_client: Client,
    base_url: String,
    subscription_key: String,
}

#[derive(Debug, Deserialize)]
struct PaginatedTranscriptions {
    #[serde(default)]
    values: Vec<TranscriptionJob>,
}

impl SpeechClient {
    pub fn new(http_client: Client, base_url: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            subscription_key: subscription_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}?api-version={}", self.base_url, path, API_VERSION)
    }

    /// Submit a new transcription job. Returns the upstream's accepted-job
    /// representation unchanged in shape.
    pub async fn submit(&self, request: &TranscriptionJobRequest) -> UpstreamResult<TranscriptionJob> {
        let mut properties = json!({
            "wordLevelTimestampsEnabled": request.enable_word_level_timestamps,
            "displayFormWordLevelTimestampsEnabled": request.enable_display_form_word_level_timestamps,
            "punctuationMode": "DictatedAndAutomatic",
            "profanityFilterMode": "Masked",
            "timeToLiveHours": request.time_to_live_hours.unwrap_or(DEFAULT_TIME_TO_LIVE_HOURS),
        });
        if request.enable_diarization {
            properties["diarization"] = json!({ "enabled": true });
        }

        let mut body = json!({
            "contentUrls": [request.audio_url],
            "properties": properties,
            "locale": request.locale,
            "displayName": request.display_name,
        });
        if let Some(model_id) = request.model_id.as_deref().filter(|id| !id.is_empty()) {
            body["model"] = json!({ "self": model_id });
        }

        let response = self
            .http_client
            .post(self.url("transcriptions:submit"))
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .json(&body)
            .send()
            .await?;

        let response = check_status("submit transcription", response).await?;
        read_json(response).await
    }

    /// Fetch one job by identifier.
    pub async fn get(&self, job_id: &str) -> UpstreamResult<TranscriptionJob> {
        let response = self
            .http_client
            .get(self.url(&format!("transcriptions/{}", job_id)))
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .send()
            .await?;

        let response = check_status("get transcription", response).await?;
        read_json(response).await
    }

    /// List all jobs, recovering the identifier of every item that carries a
    /// files link. Upstream ordering is preserved.
    pub async fn list(&self) -> UpstreamResult<Vec<TranscriptionJob>> {
        let response = self
            .http_client
            .get(self.url("transcriptions"))
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .send()
            .await?;

        let response = check_status("list transcriptions", response).await?;
        let page: PaginatedTranscriptions = read_json(response).await?;

        let mut jobs = page.values;
        for job in &mut jobs {
            let files = job.links.as_ref().and_then(|links| links.files.as_deref());
            if let Some(id) = files.and_then(derive_job_id) {
                job.id = Some(id);
            }
        }
        Ok(jobs)
    }

    /// Delete a job. Success yields no content.
    pub async fn delete(&self, job_id: &str) -> UpstreamResult<()> {
        let response = self
            .http_client
            .delete(self.url(&format!("transcriptions/{}", job_id)))
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .send()
            .await?;

        check_status("delete transcription", response).await?;
        Ok(())
    }

    /// Delete a job's output files.
    ///
    /// Two-step and non-transactional: the job is fetched to discover its
    /// files link, then that exact URL is deleted. A job without a files
    /// link is reported as `NotFound`. If the outputs disappear between the
    /// two steps the delete call fails and that failure is surfaced, not
    /// swallowed.
    pub async fn delete_output(&self, job_id: &str) -> UpstreamResult<()> {
        let job = self.get(job_id).await?;
        let files_url = job
            .links
            .and_then(|links| links.files)
            .ok_or_else(|| {
                UpstreamError::NotFound(format!("Transcription '{}' has no output files", job_id))
            })?;

        let response = self
            .http_client
            .delete(&files_url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .send()
            .await?;

        check_status("delete transcription output", response).await?;
        Ok(())
    }
}

/// Turn a non-success upstream response into a `Status` error carrying the
/// operation context and whatever body the upstream sent.
async fn check_status(operation: &'static str, response: Response) -> UpstreamResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    tracing::error!(operation, status = status.as_u16(), body = %body, "Upstream call failed");
    Err(UpstreamError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

/// Deserialize a response body, mapping shape mismatches to a distinct
/// `Deserialize` failure instead of a transport error.
async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> UpstreamResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| UpstreamError::Deserialize(err.to_string()))
}
