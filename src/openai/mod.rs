//! Minimal client for an OpenAI-compatible HTTP API.
//!
//! Only the two endpoints the pipeline needs are covered: audio transcription
//! and chat completion. The client never retries; callers decide what a
//! failure means for their stage.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::config::{Credentials, OpenAiConfig};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response contained no result")]
    EmptyResponse,

    #[error("could not read media file: {0}")]
    Io(#[from] std::io::Error),
}

/// Chat message in a completion request or response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub n: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_base: String,
    credentials: Credentials,
}

impl OpenAiClient {
    pub fn new(settings: &OpenAiConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    /// Upload a media file for speech recognition and return the recognized text
    pub async fn transcribe_file(&self, model: &str, path: &Path) -> Result<String, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "media".to_string());

        tracing::debug!(model, bytes = bytes.len(), "Uploading {} for transcription", file_name);

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("model", model.to_string())
            .text("response_format", "json");

        let response = self
            .http
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(self.credentials.api_key())
            .multipart(form)
            .send()
            .await?;

        let body: TranscriptionResponse = Self::parse(response).await?;
        body.text.ok_or(ApiError::EmptyResponse)
    }

    /// Run a chat completion and return the first choice's content
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, ApiError> {
        tracing::debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            "Requesting completion"
        );

        let response = self
            .http
            .post(self.endpoint("chat/completions"))
            .bearer_auth(self.credentials.api_key())
            .json(request)
            .send()
            .await?;

        let body: CompletionResponse = Self::parse(response).await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .ok_or(ApiError::EmptyResponse)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
