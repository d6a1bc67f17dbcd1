//! DOCX reading: bytes → paragraph sequence.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;
use zip::ZipArchive;

use policydiff_shared::{Paragraph, PolicyDiffError, Result};

/// Load DOCX bytes into the document's flat paragraph sequence.
///
/// Every `w:p` element becomes one [`Paragraph`] (empty ones included) with
/// its position equal to its rank in the document. Malformed input is a
/// fatal document error — the caller does not recover from it.
pub fn load(bytes: &[u8]) -> Result<Vec<Paragraph>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PolicyDiffError::document(format!("not a DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| PolicyDiffError::document(format!("word/document.xml missing: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| PolicyDiffError::document(format!("word/document.xml unreadable: {e}")))?;

    let paragraphs = parse_document_xml(&xml)?;
    debug!(count = paragraphs.len(), "document loaded");
    Ok(paragraphs)
}

/// Join a paragraph sequence into comparison text: trimmed non-empty
/// paragraph texts, one per line.
pub fn full_text(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Walk `word/document.xml`, accumulating `w:t` runs per `w:p`.
fn parse_document_xml(xml: &str) -> Result<Vec<Paragraph>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<Paragraph> = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => {
                    if current.is_none() {
                        current = Some(String::new());
                    }
                }
                b"w:t" => in_text = current.is_some(),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    let text = e.unescape().map_err(|err| {
                        PolicyDiffError::document(format!("bad text node: {err}"))
                    })?;
                    if let Some(buffer) = current.as_mut() {
                        buffer.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:p" => {
                    if let Some(text) = current.take() {
                        paragraphs.push(Paragraph {
                            text,
                            position: paragraphs.len(),
                        });
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                // A self-closing <w:p/> is still a (blank) paragraph.
                if e.name().as_ref() == b"w:p" && current.is_none() {
                    paragraphs.push(Paragraph {
                        text: String::new(),
                        position: paragraphs.len(),
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PolicyDiffError::document(format!(
                    "XML parse error at offset {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
