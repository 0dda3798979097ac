//! Remote collaborators: the translation and vocabulary detail services.

use crate::model::{DetailFields, Sentence};
use crate::request::DetailRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TARGET_LANG: &str = "zh-TW";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} - {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Unavailable(String),
}

/// The two remote calls the lookup flow depends on.
#[async_trait]
pub trait NoteService: Send + Sync {
    async fn translate(&self, request: &TranslateRequest) -> Result<Vec<Sentence>, ClientError>;

    async fn vocab_detail(&self, request: &DetailRequest) -> Result<DetailFields, ClientError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    #[default]
    Normal,
    /// Keeps sentence structure explicit for learners.
    Learner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
    #[serde(default)]
    pub mode: TranslationMode,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_lang: default_target_lang(),
            mode: TranslationMode::default(),
        }
    }
}

fn default_target_lang() -> String {
    DEFAULT_TARGET_LANG.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub sentences: Vec<Sentence>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// reqwest-backed [`NoteService`]. Single attempt per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    api_base: String,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.api_base, path);
        debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "remote call failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl NoteService for HttpClient {
    async fn translate(&self, request: &TranslateRequest) -> Result<Vec<Sentence>, ClientError> {
        let payload: TranslateResponse = self.post_json("/api/translate", request).await?;
        Ok(payload.sentences)
    }

    async fn vocab_detail(&self, request: &DetailRequest) -> Result<DetailFields, ClientError> {
        self.post_json("/api/vocab/detail", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_request_defaults() {
        let request: TranslateRequest = serde_json::from_str(r#"{"text":"Hi."}"#).unwrap();
        assert_eq!(request, TranslateRequest::new("Hi."));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"text": "Hi.", "target_lang": "zh-TW", "mode": "normal"})
        );
    }

    #[test]
    fn api_base_loses_trailing_slash() {
        let client = HttpClient::new(ClientConfig {
            api_base: "http://localhost:8000/".into(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.api_base(), "http://localhost:8000");
    }

    #[test]
    fn status_error_reads_like_the_ui_message() {
        let err = ClientError::Status {
            status: 502,
            body: "Gemini API request failed".into(),
        };
        assert_eq!(err.to_string(), "HTTP 502 - Gemini API request failed");
    }
}
