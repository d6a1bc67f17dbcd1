//! DOCX writing: paragraph sequence with highlight flags → bytes.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};
use tracing::debug;

use policydiff_shared::{PatchedParagraph, PolicyDiffError, Result};

/// Highlight color applied to machine-inserted paragraphs.
const INSERTION_HIGHLIGHT: &str = "yellow";

/// Serialize a patched paragraph sequence to DOCX bytes.
///
/// Each entry becomes one paragraph with a single run; highlighted entries
/// get a yellow highlight so a reviewer can locate every insertion at a
/// glance.
pub fn serialize(paragraphs: &[PatchedParagraph]) -> Result<Vec<u8>> {
    let mut docx = Docx::new();

    for paragraph in paragraphs {
        let mut run = Run::new().add_text(paragraph.text.as_str());
        if paragraph.highlighted {
            run = run.highlight(INSERTION_HIGHLIGHT);
        }
        docx = docx.add_paragraph(Paragraph::new().add_run(run));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| PolicyDiffError::Serialize(e.to_string()))?;

    let bytes = buffer.into_inner();
    debug!(
        paragraphs = paragraphs.len(),
        bytes = bytes.len(),
        "document serialized"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_a_zip_archive() {
        let bytes = serialize(&[PatchedParagraph {
            text: "Single paragraph".into(),
            highlighted: false,
        }])
        .expect("serialize");

        // ZIP local file header magic.
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }
}
