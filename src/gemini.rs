//! REST adapter for the Gemini media and generation endpoints.
//!
//! Speaks the v1beta surface: raw media upload, file state lookup,
//! `generateContent`, and the model listing. Everything above this module
//! sees only [`LectureService`] and typed errors.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;
use tracing::debug;

use crate::config::{Config, ServiceConfig};
use crate::service::{LectureService, MediaFile, MediaState, ServiceError};

pub struct GeminiService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiService {
    pub fn new(config: &ServiceConfig, api_key: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Map an unsuccessful response to a typed error, salvaging the
    /// service's message when the body parses as its error envelope.
    async fn error_for(&self, response: reqwest::Response) -> ServiceError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(body);
        if status == 429 {
            ServiceError::RateLimited { message }
        } else {
            ServiceError::Api { status, message }
        }
    }
}

#[async_trait::async_trait]
impl LectureService for GeminiService {
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<MediaFile, ServiceError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ServiceError::Io(e.to_string()))?;
        debug!(bytes = bytes.len(), mime_type, "uploading media");

        let response = self
            .http
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        let envelope: FileEnvelope = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        Ok(envelope.file.into_media_file())
    }

    async fn media_state(&self, name: &str) -> Result<MediaState, ServiceError> {
        let response = self
            .http
            .get(format!("{}/v1beta/{}", self.base_url, name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        let payload: FilePayload = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        Ok(state_from_wire(&payload.state))
    }

    async fn generate(
        &self,
        file: &MediaFile,
        prompt: &str,
        model: &str,
    ) -> Result<String, ServiceError> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {"file_data": {"file_uri": file.uri, "mime_type": file.mime_type}},
                    {"text": prompt},
                ],
            }],
        });

        let response = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        if response.status().as_u16() == 404 {
            // Drain the body so the connection can be reused.
            let _ = response.text().await;
            return Err(ServiceError::ModelNotFound {
                model: model.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        let candidate = payload
            .candidates
            .first()
            .ok_or_else(|| ServiceError::Malformed("response carried no candidates".to_string()))?;
        Ok(candidate
            .content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect())
    }

    async fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        let response = self
            .http
            .get(format!("{}/v1beta/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        let payload: ModelsResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        Ok(payload
            .models
            .into_iter()
            .map(|model| {
                model
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&model.name)
                    .to_string()
            })
            .collect())
    }
}

/// List the models the configured service advertises, one per line.
pub async fn run_models(config: &Config) -> anyhow::Result<()> {
    let api_key = config.service.resolve_api_key()?;
    let service = GeminiService::new(&config.service, api_key)?;
    let names = service.list_models().await?;
    if names.is_empty() {
        println!("No models advertised by the service");
        return Ok(());
    }
    for name in &names {
        println!("{name}");
    }
    Ok(())
}

// PROCESSING and anything unrecognized count as still pending.
fn state_from_wire(state: &str) -> MediaState {
    match state {
        "ACTIVE" => MediaState::Ready,
        "FAILED" => MediaState::Failed,
        _ => MediaState::Pending,
    }
}

#[derive(Deserialize)]
struct FileEnvelope {
    file: FilePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilePayload {
    name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    state: String,
}

impl FilePayload {
    fn into_media_file(self) -> MediaFile {
        let state = state_from_wire(&self.state);
        MediaFile {
            name: self.name,
            uri: self.uri,
            mime_type: self.mime_type,
            state,
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<CandidatePayload>,
}

#[derive(Deserialize)]
struct CandidatePayload {
    #[serde(default)]
    content: ContentPayload,
}

#[derive(Deserialize, Default)]
struct ContentPayload {
    #[serde(default)]
    parts: Vec<PartPayload>,
}

#[derive(Deserialize)]
struct PartPayload {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelPayload>,
}

#[derive(Deserialize)]
struct ModelPayload {
    name: String,
}
