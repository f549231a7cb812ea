//! Gemini provider (Generative Language API).

mod api;
mod sse;

pub use api::{GeminiClient, GeminiConfig};
pub use sse::GeminiSseParser;

use serde_json::{Value, json};

use crate::providers::{PromptPart, ProviderError, ProviderErrorKind};

/// Classifies a reqwest error into a `ProviderError`.
pub fn classify_reqwest_error(e: &reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ProviderError::timeout(format!("Connection failed: {e}"))
    } else if e.is_request() {
        ProviderError::new(ProviderErrorKind::HttpStatus, format!("Request error: {e}"))
    } else {
        ProviderError::new(ProviderErrorKind::HttpStatus, format!("Network error: {e}"))
    }
}

/// Builds a Gemini `generateContent` request body from prompt parts.
///
/// All parts belong to a single user turn.
pub fn build_generate_request(parts: &[PromptPart], max_output_tokens: Option<u32>) -> Value {
    let parts: Vec<Value> = parts
        .iter()
        .map(|part| match part {
            PromptPart::Text(text) => text_part(text),
            PromptPart::InlineImage { mime_type, data } => inline_data_part(mime_type, data),
        })
        .collect();

    let mut request = json!({
        "contents": [{
            "role": "user",
            "parts": parts,
        }],
    });

    if let Some(tokens) = max_output_tokens
        && tokens > 0
    {
        request["generationConfig"] = json!({ "maxOutputTokens": tokens });
    }

    request
}

fn text_part(text: &str) -> Value {
    json!({ "text": text })
}

fn inline_data_part(mime_type: &str, data: &str) -> Value {
    json!({
        "inlineData": {
            "mimeType": mime_type,
            "data": data
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only_request_has_single_user_turn() {
        let request = build_generate_request(&[PromptPart::text("Hello")], None);
        assert_eq!(request["contents"][0]["role"], "user");
        assert_eq!(request["contents"][0]["parts"][0]["text"], "Hello");
        assert!(request.get("generationConfig").is_none());
    }

    #[test]
    fn image_part_becomes_inline_data() {
        let request = build_generate_request(
            &[
                PromptPart::text("What is this?"),
                PromptPart::InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "AQID".to_string(),
                },
            ],
            Some(1024),
        );
        let parts = request["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
        assert_eq!(request["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn extracted_text_travels_as_second_text_part() {
        let request = build_generate_request(
            &[
                PromptPart::text("Summarize"),
                PromptPart::text("Page1 text Page2 text"),
            ],
            None,
        );
        let parts = request["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts[1]["text"], "Page1 text Page2 text");
    }

    #[test]
    fn zero_max_tokens_is_treated_as_unset() {
        let request = build_generate_request(&[PromptPart::text("hi")], Some(0));
        assert!(request.get("generationConfig").is_none());
    }
}
