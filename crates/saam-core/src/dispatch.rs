//! Dispatch loop: one user submission in, one transcript update out.
//!
//! The submission's user message lands in the transcript before the model
//! call, so the thread reflects what was asked even when the call fails.
//! Failures of any kind (decode, extraction, model call, mid-stream error)
//! append a single readable error message instead of a partial reply.

use anyhow::{Context, Result};
use base64::Engine as _;
use futures_util::StreamExt;

use crate::attachments::{
    Attachment, AttachmentKind, decode_image_to_png, extract_docx_text, extract_pdf_text,
};
use crate::config::Config;
use crate::providers::gemini::GeminiClient;
use crate::providers::{PromptPart, ProviderError, StreamEvent};
use crate::session::{Role, SessionStore};

/// How one submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Assistant reply appended.
    Success,
    /// Error message appended in place of a reply.
    Failure,
}

/// Per-dispatch policy, lifted from [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    /// Consume the reply as a fragment stream (single policy for every
    /// input shape). `false` requests one completed reply instead.
    pub stream: bool,
    /// Downscale cap for image attachments.
    pub image_max_dims: (u32, u32),
}

impl From<&Config> for DispatchOptions {
    fn from(config: &Config) -> Self {
        Self {
            stream: config.stream,
            image_max_dims: (config.image.max_width, config.image.max_height),
        }
    }
}

/// Turns one user submission into a model call and a transcript update.
///
/// Submissions are strictly sequential per session: this runs start to
/// finish (including full streaming consumption) before the caller handles
/// the next user action. `on_fragment` is invoked once per received
/// fragment so the caller can render the in-progress reply.
///
/// The outcome is always recorded in the thread; this function does not
/// return an error for a failed model call.
pub async fn dispatch_submission(
    store: &mut SessionStore,
    thread_id: u64,
    prompt: &str,
    attachment: Option<Attachment>,
    client: &GeminiClient,
    options: DispatchOptions,
    on_fragment: &mut dyn FnMut(&str),
) -> DispatchOutcome {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return DispatchOutcome::Failure;
    }

    // The user message goes in before the call, unconditionally.
    store.append_message(thread_id, Role::User, prompt);

    match run_model_call(prompt, attachment, client, options, on_fragment).await {
        Ok(reply) => {
            store.append_message(thread_id, Role::Assistant, reply);
            DispatchOutcome::Success
        }
        Err(err) => {
            tracing::warn!(error = %err, thread_id, "dispatch failed");
            store.append_message(
                thread_id,
                Role::Assistant,
                format!("An error occurred: {err:#}"),
            );
            DispatchOutcome::Failure
        }
    }
}

async fn run_model_call(
    prompt: &str,
    attachment: Option<Attachment>,
    client: &GeminiClient,
    options: DispatchOptions,
    on_fragment: &mut dyn FnMut(&str),
) -> Result<String> {
    let parts = build_prompt_parts(prompt, attachment, options.image_max_dims)?;

    if options.stream {
        let stream = client.generate_stream(&parts).await?;
        consume_stream(stream, on_fragment).await
    } else {
        let reply = client.generate(&parts).await?;
        on_fragment(&reply);
        Ok(reply)
    }
}

/// Builds the prompt parts for one submission.
///
/// Unsupported attachment kinds are silently dropped (permissive default);
/// extraction and decode failures propagate.
fn build_prompt_parts(
    prompt: &str,
    attachment: Option<Attachment>,
    image_max_dims: (u32, u32),
) -> Result<Vec<PromptPart>> {
    let Some(attachment) = attachment else {
        return Ok(vec![PromptPart::text(prompt)]);
    };

    match attachment.kind() {
        AttachmentKind::Image => {
            let decoded = decode_image_to_png(&attachment.data, image_max_dims)
                .context("decode image attachment")?;
            let data = base64::engine::general_purpose::STANDARD.encode(decoded.png_bytes);
            Ok(vec![
                PromptPart::text(prompt),
                PromptPart::InlineImage {
                    mime_type: "image/png".to_string(),
                    data,
                },
            ])
        }
        AttachmentKind::Pdf => {
            let text =
                extract_pdf_text(&attachment.data).context("extract PDF attachment text")?;
            Ok(vec![PromptPart::text(prompt), PromptPart::text(text)])
        }
        AttachmentKind::Docx => {
            let text =
                extract_docx_text(&attachment.data).context("extract Word attachment text")?;
            Ok(vec![PromptPart::text(prompt), PromptPart::text(text)])
        }
        AttachmentKind::Unsupported => {
            tracing::debug!(
                media_type = %attachment.media_type,
                "ignoring attachment with unrecognized media type"
            );
            Ok(vec![PromptPart::text(prompt)])
        }
    }
}

/// Folds the fragment stream into the final reply text.
///
/// Each fragment extends the accumulator and fires the progress callback.
/// A mid-stream error event discards nothing visible — the accumulated
/// text is dropped by the caller and never reaches the transcript.
async fn consume_stream(
    mut stream: crate::providers::ProviderStream,
    on_fragment: &mut dyn FnMut(&str),
) -> Result<String> {
    let mut reply = String::new();

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::TextDelta { text } => {
                reply.push_str(&text);
                on_fragment(&text);
            }
            StreamEvent::MessageCompleted { usage } => {
                tracing::debug!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "reply completed"
                );
            }
            StreamEvent::Error {
                error_type,
                message,
            } => {
                return Err(ProviderError::api_error(&error_type, &message).into());
            }
        }
    }

    if reply.is_empty() {
        anyhow::bail!("Gemini reply contained no text");
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_attachment_is_a_single_text_part() {
        let parts = build_prompt_parts("Hello", None, (64, 64)).unwrap();
        assert_eq!(parts, vec![PromptPart::text("Hello")]);
    }

    #[test]
    fn unsupported_attachment_is_silently_ignored() {
        let attachment = Attachment::new(b"some bytes".to_vec(), "text/x-unknown");
        let parts = build_prompt_parts("Hello", Some(attachment), (64, 64)).unwrap();
        assert_eq!(parts, vec![PromptPart::text("Hello")]);
    }

    #[test]
    fn malformed_image_attachment_is_an_error() {
        let attachment = Attachment::new(b"not an image".to_vec(), "image/png");
        let err = build_prompt_parts("Hello", Some(attachment), (64, 64));
        assert!(err.is_err());
    }

    #[test]
    fn malformed_pdf_attachment_is_an_error() {
        let attachment = Attachment::new(b"not a pdf".to_vec(), "application/pdf");
        assert!(build_prompt_parts("Hello", Some(attachment), (64, 64)).is_err());
    }

    #[test]
    fn image_attachment_becomes_inline_png_part() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            2,
            2,
            image::Rgb([1, 2, 3]),
        ));
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let attachment = Attachment::new(png, "image/png");
        let parts = build_prompt_parts("What is this?", Some(attachment), (64, 64)).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], PromptPart::text("What is this?"));
        assert!(matches!(
            &parts[1],
            PromptPart::InlineImage { mime_type, data }
                if mime_type == "image/png" && !data.is_empty()
        ));
    }
}
