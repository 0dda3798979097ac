//! Language model seam for the backend, with a Gemini implementation.

use crate::client::TranslationMode;
use crate::model::{DetailCategory, DetailFields, DetailFlags};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("language model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("language model returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse language model output: {reason}. Output preview: {preview}")]
    Parse { reason: String, preview: String },
    #[error("language model API key is not configured")]
    MissingApiKey,
}

impl ModelError {
    fn parse(reason: impl ToString, output: &str) -> Self {
        ModelError::Parse {
            reason: reason.to_string(),
            preview: output.chars().take(300).collect(),
        }
    }
}

/// What the backend needs from a language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Translates each sentence, returning exactly one string per input.
    async fn translate_list(
        &self,
        sentences: &[String],
        target_lang: &str,
        mode: TranslationMode,
    ) -> Result<Vec<String>, ModelError>;

    /// Fills the requested detail fields for a lemma.
    async fn fill_vocab_fields(
        &self,
        lemma: &str,
        part_of_speech: &str,
        options: DetailFlags,
    ) -> Result<DetailFields, ModelError>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ModelError> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey);
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    async fn generate_json(&self, prompt: String, temperature: Option<f32>) -> Result<String, ModelError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature,
            },
        };
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.config.model);
        debug!(model = %self.config.model, "sending Gemini request");
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!(status = status.as_u16(), "Gemini API error");
            return Err(ModelError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|err| ModelError::parse(err, &text))?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| ModelError::parse("no candidates in response", &text))
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn translate_list(
        &self,
        sentences: &[String],
        target_lang: &str,
        mode: TranslationMode,
    ) -> Result<Vec<String>, ModelError> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }
        let output = self
            .generate_json(translation_prompt(sentences, target_lang, mode), None)
            .await?;
        parse_translations(&output, sentences.len())
    }

    async fn fill_vocab_fields(
        &self,
        lemma: &str,
        part_of_speech: &str,
        options: DetailFlags,
    ) -> Result<DetailFields, ModelError> {
        let output = self
            .generate_json(vocab_prompt(lemma, part_of_speech, options), Some(0.2))
            .await?;
        serde_json::from_str(&output).map_err(|err| ModelError::parse(err, &output))
    }
}

pub fn translation_prompt(sentences: &[String], target_lang: &str, mode: TranslationMode) -> String {
    let style = match mode {
        TranslationMode::Normal => "Use natural, fluent wording.",
        TranslationMode::Learner => {
            "Write for language learners: keep the sentence structure explicit and do not drop subjects or connectors."
        }
    };
    let mut prompt = format!(
        "Translate every sentence below into {target_lang}. {style} \
         Reply with a JSON array of strings only, one per sentence, in the same order. \
         No commentary and no markdown.\n\n"
    );
    for (i, sentence) in sentences.iter().enumerate() {
        prompt.push_str(&format!("{i}. {sentence}\n"));
    }
    prompt
}

pub fn vocab_prompt(lemma: &str, part_of_speech: &str, options: DetailFlags) -> String {
    let tasks: Vec<&str> = DetailCategory::ALL
        .iter()
        .filter(|category| options.wants(**category))
        .map(|category| match category {
            DetailCategory::Translation => "translation: the meaning in Traditional Chinese (zh-TW).",
            DetailCategory::Definition => "definition: one clear English definition.",
            DetailCategory::Example => "example: one natural example sentence.",
            DetailCategory::Level => "level: the CEFR level, one of A1, A2, B1, B2, C1, C2.",
        })
        .collect();
    let task_list = if tasks.is_empty() {
        "- none".to_string()
    } else {
        tasks
            .iter()
            .map(|task| format!("- {task}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "You are an English dictionary for intermediate and advanced learners.\n\n\
         Word: \"{lemma}\"\nPart of speech: {part_of_speech}\n\n\
         Return a JSON object with exactly the keys translation, definition, example and level.\n\n\
         Fields to fill:\n{task_list}\n\n\
         Use only the given part of speech. Any field not listed above must be an empty string. \
         Return valid JSON only."
    )
}

/// Parses a JSON array of translations and pads or truncates it to `expected`.
pub fn parse_translations(output: &str, expected: usize) -> Result<Vec<String>, ModelError> {
    let value: serde_json::Value =
        serde_json::from_str(output).map_err(|err| ModelError::parse(err, output))?;
    let items = value
        .as_array()
        .ok_or_else(|| ModelError::parse("output is not a JSON array", output))?;
    Ok((0..expected)
        .map(|i| {
            items
                .get(i)
                .and_then(|item| item.as_str())
                .unwrap_or_default()
                .to_string()
        })
        .collect())
}
