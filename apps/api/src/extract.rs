//! Document text extraction: turns uploaded resume bytes into plain text.
//!
//! Supports the two formats the upload endpoint accepts: PDF (via
//! `pdf-extract`) and DOCX (the `word/document.xml` part of the OOXML zip,
//! walked with `quick-xml`). Dispatch follows the declared content type,
//! falling back to the filename extension for clients that send
//! `application/octet-stream`.

use std::io::Read;

use thiserror::Error;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Decompressed-byte cap for the DOCX document part (zip-bomb guard).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    #[error("failed to parse DOCX: {0}")]
    Docx(String),

    #[error("document contained no extractable text")]
    EmptyDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Docx,
}

/// Extracts the plain text of an uploaded document.
pub fn extract_text(
    bytes: &[u8],
    content_type: Option<&str>,
    file_name: &str,
) -> Result<String, ExtractError> {
    let text = match detect_kind(content_type, file_name)? {
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Docx => extract_docx(bytes)?,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    Ok(text)
}

fn detect_kind(content_type: Option<&str>, file_name: &str) -> Result<DocumentKind, ExtractError> {
    if let Some(declared) = content_type {
        // Parameters like "; charset=utf-8" do not affect dispatch.
        let mime = declared
            .split(';')
            .next()
            .unwrap_or(declared)
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            MIME_PDF => return Ok(DocumentKind::Pdf),
            MIME_DOCX => return Ok(DocumentKind::Docx),
            // Generic types defer to the filename extension.
            "application/octet-stream" | "" => {}
            other => return Err(ExtractError::UnsupportedType(other.to_string())),
        }
    }

    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Ok(DocumentKind::Pdf)
    } else if lower.ends_with(".docx") {
        Ok(DocumentKind::Docx)
    } else {
        Err(ExtractError::UnsupportedType(file_name.to_string()))
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(format!("not a zip archive: {e}")))?;

    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(format!("missing word/document.xml: {e}")))?;

    let mut xml = String::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(format!("unreadable document part: {e}")))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(
            "document part exceeds the size cap".to_string(),
        ));
    }

    Ok(docx_xml_to_text(&xml))
}

/// Collects the `w:t` text runs of a DOCX document part, with a line break
/// at the end of each paragraph.
fn docx_xml_to_text(xml: &str) -> String {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = String::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"p" {
                    out.push('\n');
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    out
}
