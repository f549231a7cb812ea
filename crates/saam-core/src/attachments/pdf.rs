//! PDF plain-text extraction.

use anyhow::{Context, Result};

/// Extracts concatenated plain text from every page of a PDF.
///
/// Page order is preserved and page texts are joined with a single space.
///
/// # Errors
/// Returns an error if the bytes are not a parseable PDF or a page's text
/// cannot be extracted.
pub fn extract_pdf_text(data: &[u8]) -> Result<String> {
    let doc = lopdf::Document::load_mem(data).context("parse PDF document")?;

    // get_pages is keyed by page number, so iteration is page order.
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut texts = Vec::with_capacity(pages.len());
    for page in pages {
        let text = doc
            .extract_text(&[page])
            .with_context(|| format!("extract text from PDF page {page}"))?;
        texts.push(text.trim().to_string());
    }

    Ok(texts.join(" "))
}
