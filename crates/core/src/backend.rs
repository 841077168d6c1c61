//! HTTP client for the video processing service.
//!
//! The service extracts audio, transcribes it and translates the transcript.
//! This crate only sends requests and reads the segment arrays it returns.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::{Result, VidtransError},
    types::{Language, ProcessVideoRequest, ProcessVideoResponse},
};

/// Anything that can turn a video URL into transcripts and translations.
#[async_trait]
pub trait VideoProcessor: Send + Sync {
    async fn process_video(&self, request: &ProcessVideoRequest) -> Result<ProcessVideoResponse>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn health(&self) -> Result<bool> {
        let response = self.http.get(self.endpoint("/health")).send().await?;
        let body: HealthBody = check_status(response).await?.json().await?;
        Ok(body.status == "healthy")
    }

    pub async fn languages(&self) -> Result<Vec<Language>> {
        let response = self.http.get(self.endpoint("/api/languages")).send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl VideoProcessor for BackendClient {
    async fn process_video(&self, request: &ProcessVideoRequest) -> Result<ProcessVideoResponse> {
        info!(
            url = %request.video_url,
            languages = ?request.target_languages,
            "requesting video processing"
        );
        let response = self
            .http
            .post(self.endpoint("/api/process-video"))
            .json(request)
            .send()
            .await?;

        let body: ProcessVideoResponse = check_status(response).await?.json().await?;
        if !body.success {
            return Err(VidtransError::UnexpectedResponse {
                reason: "backend reported success: false".to_string(),
            });
        }
        debug!(
            segments = body.original.len(),
            languages = body.translations.len(),
            "video processed"
        );
        Ok(body)
    }
}

/// Turn non-2xx responses into [`VidtransError::Backend`], preferring the body's `error` field.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(VidtransError::Backend {
        status: status.as_u16(),
        message: error_message(&text, status.canonical_reason()),
    })
}

fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| reason.unwrap_or("Failed to process video").to_string())
}
