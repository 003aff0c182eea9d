//! Text extraction from uploaded legal documents
//!
//! Converts raw bytes of a supported format into normalized plain text.
//! Stateless: nothing is retained across calls.

use std::path::Path;

/// Minimum accepted document length in characters, after trimming
pub const MIN_DOCUMENT_CHARS: usize = 10;
/// Maximum accepted document length in characters
pub const MAX_DOCUMENT_CHARS: usize = 100_000;

const DOC_GUIDANCE: &str =
    "Legacy .doc files are not supported. Convert the document to .docx or paste the text directly.";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Empty document upload")]
    EmptyInput,

    #[error("Failed to extract text: {0}")]
    ExtractionFailed(String),

    #[error("Document text must be between 10 and 100000 characters, got {0}")]
    LengthOutOfBounds(usize),
}

/// Supported input formats for text extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    WordProcessorXml,
    LegacyWordBinary,
    Pdf,
}

impl DocumentFormat {
    /// Map a file extension (without dot, case-insensitive) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(DocumentFormat::PlainText),
            "docx" => Some(DocumentFormat::WordProcessorXml),
            "doc" => Some(DocumentFormat::LegacyWordBinary),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    /// Determine the format from a file name
    pub fn from_filename(name: &str) -> Result<Self, ExtractError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ExtractError::UnsupportedFormat(name.to_string()))?;

        Self::from_extension(ext).ok_or_else(|| {
            ExtractError::UnsupportedFormat(format!(
                ".{} (supported formats: .txt, .docx, .pdf)",
                ext.to_lowercase()
            ))
        })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "txt",
            DocumentFormat::WordProcessorXml => "docx",
            DocumentFormat::LegacyWordBinary => "doc",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

/// Extract normalized plain text from raw document bytes.
///
/// The returned text is trimmed and guaranteed to be within the accepted
/// length bounds.
pub fn extract(raw_bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError> {
    if raw_bytes.is_empty() {
        return Err(ExtractError::EmptyInput);
    }

    let text = match format {
        DocumentFormat::PlainText => extract_plain_text(raw_bytes)?,
        DocumentFormat::WordProcessorXml => extract_docx(raw_bytes)?,
        DocumentFormat::LegacyWordBinary => {
            return Err(ExtractError::UnsupportedFormat(DOC_GUIDANCE.to_string()));
        }
        DocumentFormat::Pdf => extract_pdf(raw_bytes)?,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractError::ExtractionFailed(
            "no text content found in document".to_string(),
        ));
    }

    validate_length(&text)?;

    tracing::debug!(
        format = format.extension(),
        chars = text.len(),
        "Extracted document text"
    );

    Ok(text)
}

/// Check the caller-facing document length contract
pub fn validate_length(text: &str) -> Result<(), ExtractError> {
    let chars = text.chars().count();
    if !(MIN_DOCUMENT_CHARS..=MAX_DOCUMENT_CHARS).contains(&chars) {
        return Err(ExtractError::LengthOutOfBounds(chars));
    }
    Ok(())
}

/// Decode plain text as UTF-8, retrying as Latin-1
fn extract_plain_text(raw_bytes: &[u8]) -> Result<String, ExtractError> {
    match std::str::from_utf8(raw_bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => {
            // Latin-1 maps every byte to the code point of the same value
            tracing::debug!("Text file is not valid UTF-8, decoding as Latin-1");
            Ok(raw_bytes.iter().map(|&b| b as char).collect())
        }
    }
}

/// Extract text from a DOCX package.
///
/// A whole-document pull over top-level paragraphs is tried first; when that
/// yields nothing, a structural walk over paragraphs and tables joins each
/// non-empty paragraph with newlines.
fn extract_docx(raw_bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(raw_bytes)
        .map_err(|e| ExtractError::ExtractionFailed(format!("failed to parse DOCX: {}", e)))?;

    let text = docx_full_text(&docx);
    if !text.trim().is_empty() {
        return Ok(text);
    }

    let paragraphs = docx_paragraph_texts(&docx);
    if paragraphs.is_empty() {
        return Err(ExtractError::ExtractionFailed(
            "DOCX document contains no text".to_string(),
        ));
    }

    Ok(paragraphs.join("\n"))
}

/// Fast whole-document pull: concatenate the runs of top-level paragraphs
fn docx_full_text(docx: &docx_rs::Docx) -> String {
    let mut out = String::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(para) = child {
            append_paragraph_text(para, &mut out);
            out.push('\n');
        }
    }
    out
}

/// Structural walk: one string per paragraph, including table cells
fn docx_paragraph_texts(docx: &docx_rs::Docx) -> Vec<String> {
    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let mut text = String::new();
                append_paragraph_text(para, &mut text);
                push_non_empty(&mut paragraphs, text);
            }
            docx_rs::DocumentChild::Table(table) => {
                for row in &table.rows {
                    let docx_rs::TableChild::TableRow(tr) = row;
                    for cell in &tr.cells {
                        let docx_rs::TableRowChild::TableCell(tc) = cell;
                        for content in &tc.children {
                            if let docx_rs::TableCellContent::Paragraph(para) = content {
                                let mut text = String::new();
                                append_paragraph_text(para, &mut text);
                                push_non_empty(&mut paragraphs, text);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    paragraphs
}

fn append_paragraph_text(para: &docx_rs::Paragraph, output: &mut String) {
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => append_run_text(run, output),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for nested in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = nested {
                        append_run_text(run, output);
                    }
                }
            }
            _ => {}
        }
    }
}

fn append_run_text(run: &docx_rs::Run, output: &mut String) {
    for child in &run.children {
        if let docx_rs::RunChild::Text(text) = child {
            output.push_str(&text.text);
        }
    }
}

fn push_non_empty(paragraphs: &mut Vec<String>, text: String) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        paragraphs.push(trimmed.to_string());
    }
}

/// Extract text from a PDF page by page, skipping empty pages.
///
/// The extraction runs under `catch_unwind`: pdf-extract can panic on
/// malformed fonts and glyph tables.
fn extract_pdf(raw_bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(raw_bytes)
    })) {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            return Err(ExtractError::ExtractionFailed(format!(
                "failed to parse PDF: {}",
                e
            )));
        }
        Err(_) => {
            tracing::warn!("PDF extraction panicked, document likely contains malformed fonts");
            return Err(ExtractError::ExtractionFailed(
                "failed to parse PDF: malformed document".to_string(),
            ));
        }
    };

    let kept: Vec<String> = pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .map(str::to_string)
        .collect();

    if kept.is_empty() {
        return Err(ExtractError::ExtractionFailed(
            "no page in the PDF contains extractable text".to_string(),
        ));
    }

    Ok(kept.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for p in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
        }
        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn plain_text_utf8() {
        let text = extract(
            "This Agreement is made between two parties.".as_bytes(),
            DocumentFormat::PlainText,
        )
        .unwrap();
        assert_eq!(text, "This Agreement is made between two parties.");
    }

    #[test]
    fn plain_text_latin1_fallback() {
        // "Se\xf1or agreement terms apply here" is not valid UTF-8
        let mut bytes = b"Se".to_vec();
        bytes.push(0xF1);
        bytes.extend_from_slice(b"or agreement terms apply here");

        let text = extract(&bytes, DocumentFormat::PlainText).unwrap();
        assert_eq!(text, "Señor agreement terms apply here");
    }

    #[test]
    fn plain_text_trims_whitespace() {
        let text = extract(
            b"   The parties agree as follows.   \n",
            DocumentFormat::PlainText,
        )
        .unwrap();
        assert_eq!(text, "The parties agree as follows.");
    }

    #[test]
    fn empty_input_rejected_for_every_format() {
        for format in [
            DocumentFormat::PlainText,
            DocumentFormat::WordProcessorXml,
            DocumentFormat::LegacyWordBinary,
            DocumentFormat::Pdf,
        ] {
            let err = extract(b"", format).unwrap_err();
            assert!(matches!(err, ExtractError::EmptyInput), "{:?}", format);
        }
    }

    #[test]
    fn legacy_doc_always_rejected_with_guidance() {
        let err = extract(b"arbitrary binary content", DocumentFormat::LegacyWordBinary)
            .unwrap_err();
        match err {
            ExtractError::UnsupportedFormat(msg) => {
                assert!(msg.contains(".docx"));
            }
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn docx_round_trip() {
        let bytes = docx_bytes(&[
            "EMPLOYMENT AGREEMENT",
            "This Agreement is made between the parties named below.",
        ]);

        let text = extract(&bytes, DocumentFormat::WordProcessorXml).unwrap();
        assert!(text.contains("EMPLOYMENT AGREEMENT"));
        assert!(text.contains("between the parties"));
    }

    #[test]
    fn docx_invalid_bytes_fail() {
        let err = extract(b"not a zip archive at all", DocumentFormat::WordProcessorXml)
            .unwrap_err();
        assert!(matches!(err, ExtractError::ExtractionFailed(_)));
    }

    #[test]
    fn pdf_invalid_bytes_fail() {
        let err = extract(b"definitely not a pdf document", DocumentFormat::Pdf).unwrap_err();
        assert!(matches!(err, ExtractError::ExtractionFailed(_)));
    }

    #[test]
    fn too_short_text_rejected() {
        let err = extract(b"too short", DocumentFormat::PlainText).unwrap_err();
        assert!(matches!(err, ExtractError::LengthOutOfBounds(9)));
    }

    #[test]
    fn format_from_filename() {
        assert_eq!(
            DocumentFormat::from_filename("contract.PDF").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_filename("contract.docx").unwrap(),
            DocumentFormat::WordProcessorXml
        );
        assert!(DocumentFormat::from_filename("contract.xlsx").is_err());
        assert!(DocumentFormat::from_filename("contract").is_err());
    }
}
