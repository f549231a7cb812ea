//! Gemini API key client (Generative Language API).

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use super::sse::GeminiSseParser;
use super::{build_generate_request, classify_reqwest_error};
use crate::providers::shared::{USER_AGENT, resolve_api_key, resolve_base_url};
use crate::providers::{PromptPart, ProviderError, ProviderStream};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: Option<u32>,
}

impl GeminiConfig {
    /// Creates a new config from config-file values and the environment.
    ///
    /// Authentication resolution order:
    /// 1. `config_api_key` parameter (from config file)
    /// 2. `GEMINI_API_KEY` environment variable
    ///
    /// Base URL resolution order: `GEMINI_BASE_URL`, config, built-in default.
    ///
    /// # Errors
    /// Returns an error when no API key is available or a base URL override
    /// is malformed.
    pub fn from_env(
        model: String,
        max_output_tokens: Option<u32>,
        config_base_url: Option<&str>,
        config_api_key: Option<&str>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(config_api_key, "GEMINI_API_KEY", "gemini")?;
        let base_url = resolve_base_url(
            config_base_url,
            "GEMINI_BASE_URL",
            DEFAULT_BASE_URL,
            "Gemini",
        )?;

        Ok(Self {
            api_key,
            base_url,
            model,
            max_output_tokens,
        })
    }
}

/// Gemini client.
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Submits prompt parts and returns the reply as an event stream.
    ///
    /// # Errors
    /// Returns an error if the request fails or the API answers with a
    /// non-success status.
    pub async fn generate_stream(&self, parts: &[PromptPart]) -> Result<ProviderStream> {
        let request = build_generate_request(parts, self.config.max_output_tokens);
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url, self.config.model
        );

        let response = self
            .http
            .post(&url)
            .headers(build_headers(&self.config.api_key, true))
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::http_status(status.as_u16(), &error_body).into());
        }

        let parser = GeminiSseParser::new(response.bytes_stream());
        Ok(Box::pin(parser))
    }

    /// Submits prompt parts and returns one completed reply string.
    ///
    /// # Errors
    /// Returns an error if the request fails, the API answers with a
    /// non-success status, or the response carries no text.
    pub async fn generate(&self, parts: &[PromptPart]) -> Result<String> {
        let request = build_generate_request(parts, self.config.max_output_tokens);
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let response = self
            .http
            .post(&url)
            .headers(build_headers(&self.config.api_key, false))
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ProviderError::http_status(status.as_u16(), &body).into());
        }

        let value: Value = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse Gemini response JSON: {body}"))?;
        parse_generate_response(&value)
    }
}

/// Pulls the reply text out of a non-streaming `generateContent` response.
fn parse_generate_response(value: &Value) -> Result<String> {
    let mut text = String::new();

    let parts = value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array);

    if let Some(parts) = parts {
        for part in parts {
            if let Some(t) = part.get("text").and_then(Value::as_str) {
                text.push_str(t);
            }
        }
    }

    if text.is_empty() {
        anyhow::bail!("Gemini response contained no reply text");
    }
    Ok(text)
}

fn build_headers(api_key: &str, streaming: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-goog-api-key",
        HeaderValue::from_str(api_key).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    let accept = if streaming {
        "text/event-stream"
    } else {
        "application/json"
    };
    headers.insert("accept", HeaderValue::from_static(accept));
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers.insert("user-agent", HeaderValue::from_static(USER_AGENT));
    headers
}
