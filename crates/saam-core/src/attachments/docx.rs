//! Word (.docx) plain-text extraction.
//!
//! A .docx file is a zip container; the body lives in `word/document.xml`.
//! Paragraph text is collected in document order and joined with newlines.

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Extracts paragraph text from a Word document.
///
/// # Errors
/// Returns an error if the bytes are not a zip container, the document part
/// is missing, or the XML cannot be parsed.
pub fn extract_docx_text(data: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).context("open DOCX container")?;
    let mut part = archive
        .by_name("word/document.xml")
        .context("DOCX is missing word/document.xml")?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .context("read word/document.xml")?;

    parse_document_xml(&xml)
}

/// Walks the WordprocessingML body: text runs (`w:t`) accumulate into the
/// current paragraph, paragraph ends (`w:p`) emit it.
fn parse_document_xml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event().context("parse DOCX XML")? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                current.push_str(&t.unescape().context("decode DOCX text run")?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{body}</w:body>
</w:document>"#
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn paragraphs_join_with_newline() {
        let docx = docx_with_paragraphs(&["A", "B"]);
        assert_eq!(extract_docx_text(&docx).unwrap(), "A\nB");
    }

    #[test]
    fn split_runs_within_a_paragraph_concatenate() {
        let document = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body><w:p><w:r><w:t>Hel</w:t></w:r><w:r><w:t>lo</w:t></w:r></w:p></w:body>
</w:document>"#;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        let docx = writer.finish().unwrap().into_inner();

        assert_eq!(extract_docx_text(&docx).unwrap(), "Hello");
    }

    #[test]
    fn entities_are_unescaped() {
        let docx = docx_with_paragraphs(&["a &amp; b"]);
        assert_eq!(extract_docx_text(&docx).unwrap(), "a & b");
    }

    #[test]
    fn not_a_zip_is_an_extraction_error() {
        assert!(extract_docx_text(b"plain bytes").is_err());
    }

    #[test]
    fn zip_without_document_part_is_an_error() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hi").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(extract_docx_text(&bytes).is_err());
    }
}
