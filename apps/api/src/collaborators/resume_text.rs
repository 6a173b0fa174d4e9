use std::io::{Cursor, Read};

use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::errors::MatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn detect_kind(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> Option<DocumentKind> {
    if bytes.starts_with(b"%PDF-") {
        return Some(DocumentKind::Pdf);
    }
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match (ext.as_str(), content_type.unwrap_or_default()) {
        ("pdf", _) | (_, "application/pdf") => Some(DocumentKind::Pdf),
        ("docx", _) | (_, DOCX_CONTENT_TYPE) => Some(DocumentKind::Docx),
        ("txt" | "md" | "markdown", _) | (_, "text/plain" | "text/markdown") => {
            Some(DocumentKind::PlainText)
        }
        _ => None,
    }
}

/// Extracts plain text from an uploaded resume. PDFs go through `pdf-extract`, `.docx`
/// paragraphs are read from `word/document.xml`, and `.txt`/`.md` must be UTF-8.
/// Everything else (legacy `.doc` included) is `UnsupportedFormat`.
///
/// PDF and DOCX parsing are CPU-bound and run on the blocking pool.
pub async fn extract_resume_text(
    file_name: &str,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<String, MatchError> {
    let kind = detect_kind(file_name, content_type, &bytes)
        .ok_or_else(|| MatchError::UnsupportedFormat(file_name.to_string()))?;

    let text = match kind {
        DocumentKind::PlainText => String::from_utf8(bytes.to_vec())
            .map_err(|_| MatchError::UnsupportedFormat(format!("{file_name}: not valid UTF-8")))?,
        DocumentKind::Pdf => {
            let name = file_name.to_string();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|_| MatchError::UnsupportedFormat(format!("{name}: unreadable PDF")))?
                .map_err(|e| MatchError::UnsupportedFormat(format!("{name}: {e}")))?
        }
        DocumentKind::Docx => {
            let name = file_name.to_string();
            tokio::task::spawn_blocking(move || docx_text(&bytes))
                .await
                .map_err(|_| MatchError::UnsupportedFormat(format!("{name}: unreadable DOCX")))?
                .map_err(|e| MatchError::UnsupportedFormat(format!("{name}: {e}")))?
        }
    };

    debug!(file_name, chars = text.len(), "Extracted resume text");
    Ok(text)
}

/// Paragraph text of a Word document, one line per `<w:p>`.
fn docx_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| e.to_string())?
        .read_to_string(&mut xml)
        .map_err(|e| e.to_string())?;
    document_xml_text(&xml).map_err(|e| e.to_string())
}

fn document_xml_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(e) if e.local_name().as_ref() == b"t" => in_text = false,
            Event::End(e) if e.local_name().as_ref() == b"p" => out.push('\n'),
            Event::Empty(e) if e.local_name().as_ref() == b"tab" => out.push('\t'),
            Event::Empty(e) if e.local_name().as_ref() == b"br" => out.push('\n'),
            Event::Text(t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out.trim_end().to_string())
}
