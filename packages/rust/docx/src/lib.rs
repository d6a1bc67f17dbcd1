//! DOCX document I/O.
//!
//! Reading goes through manual ZIP + XML parsing (docx-rs is writer-only):
//! a DOCX file is a ZIP archive whose `word/document.xml` holds the
//! paragraph sequence. Writing uses `docx-rs`, which supports the yellow
//! highlight marker applied to machine-inserted paragraphs.

mod reader;
mod writer;

pub use reader::{full_text, load};
pub use writer::serialize;

#[cfg(test)]
mod tests {
    use policydiff_shared::PatchedParagraph;

    use super::*;

    fn patched(texts: &[(&str, bool)]) -> Vec<PatchedParagraph> {
        texts
            .iter()
            .map(|(text, highlighted)| PatchedParagraph {
                text: text.to_string(),
                highlighted: *highlighted,
            })
            .collect()
    }

    #[test]
    fn write_then_read_roundtrip() {
        let bytes = serialize(&patched(&[
            ("Scope of services", false),
            ("All invoices are payable within 30 days.", true),
            ("Termination", false),
        ]))
        .expect("serialize");

        let paragraphs = load(&bytes).expect("load");
        let texts: Vec<&str> = paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Scope of services",
                "All invoices are payable within 30 days.",
                "Termination"
            ]
        );
        let positions: Vec<usize> = paragraphs.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn roundtrip_preserves_xml_special_characters() {
        let bytes = serialize(&patched(&[("Fees & charges < 100", false)])).expect("serialize");
        let paragraphs = load(&bytes).expect("load");
        assert_eq!(paragraphs[0].text, "Fees & charges < 100");
    }

    #[test]
    fn highlighted_paragraphs_carry_the_marker() {
        use std::io::Read;

        let bytes = serialize(&patched(&[
            ("Plain paragraph", false),
            ("Inserted clause", true),
        ]))
        .expect("serialize");

        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(&bytes)).expect("open archive");
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .expect("document.xml")
            .read_to_string(&mut xml)
            .expect("read document.xml");

        assert!(xml.contains("w:highlight"));
        assert!(xml.contains("yellow"));
    }

    #[test]
    fn empty_sequence_roundtrips() {
        let bytes = serialize(&[]).expect("serialize");
        let paragraphs = load(&bytes).expect("load");
        assert!(paragraphs.is_empty());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let result = load(b"this is not a zip archive");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("document error"));
    }
}
