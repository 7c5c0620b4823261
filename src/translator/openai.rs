//! Chat-completions translator for OpenAI-compatible endpoints.

use super::Translator;
use crate::error::{Error, Result};
use crate::language::TargetLanguage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// Sampling temperature for translation requests.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for [`OpenAiTranslator`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    /// Bearer token
    pub api_key: String,
    /// API root, without a trailing `/chat/completions`
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Settings with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read `OPENAI_API_KEY` (required), `OPENAI_BASE_URL` and `OPENAI_MODEL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;
        let mut config = Self::new(api_key);
        if let Some(url) = lookup("OPENAI_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }
        Ok(config)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatContent>,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: Option<String>,
}

/// System prompt for one target language.
pub fn system_prompt(target: &TargetLanguage) -> String {
    format!(
        "You are a professional translator. Translate all content into {}, preserving formatting and meaning.",
        target.display_name()
    )
}

/// Blocking chat-completions client.
pub struct OpenAiTranslator {
    config: OpenAiConfig,
    client: reqwest::blocking::Client,
}

impl OpenAiTranslator {
    /// Build a client for the given settings.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Build a client from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// Settings in use.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn request_body<'a>(&'a self, prompt: &'a str, text: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.config.temperature,
        }
    }
}

impl Translator for OpenAiTranslator {
    fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String> {
        let prompt = system_prompt(target);
        let body = self.request_body(&prompt, text);
        log::debug!("POST {} ({}, {} chars)", self.config.endpoint(), self.config.model, text.len());

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| Error::TranslationFailure(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(Error::TranslationFailure(format!(
                "translation service returned {}: {}",
                status,
                detail.trim()
            )));
        }

        let payload: ChatResponse = response
            .json()
            .map_err(|e| Error::TranslationFailure(format!("malformed response: {}", e)))?;
        extract_content(payload)
    }
}

fn extract_content(payload: ChatResponse) -> Result<String> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| Error::TranslationFailure("response has no choices[0].message.content".to_string()))
}
