//! Document patcher.
//!
//! Splices each missing key point back into the client document's paragraph
//! sequence as a highlighted insertion. Every insertion locus is resolved
//! against the original, immutable sequence, then all insertions are
//! materialized in one pass — later key points never observe earlier
//! insertions.

use tracing::debug;

use policydiff_shared::{KeyPoint, Paragraph, PatchedParagraph};

/// Where one key point gets inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Locus {
    /// Immediately after the paragraph at this original index.
    After(usize),
    /// Appended at the end of the document.
    AtEnd,
}

/// Derive a new paragraph sequence with every key point inserted and
/// highlighted.
///
/// The output length equals the input length plus one per key point; the
/// original paragraphs are preserved verbatim and in order, unhighlighted.
pub fn patch(paragraphs: &[Paragraph], key_points: &[KeyPoint]) -> Vec<PatchedParagraph> {
    let loci: Vec<Locus> = key_points
        .iter()
        .map(|kp| resolve_locus(paragraphs, kp))
        .collect();

    let mut out: Vec<PatchedParagraph> = Vec::with_capacity(paragraphs.len() + key_points.len());

    for (index, paragraph) in paragraphs.iter().enumerate() {
        out.push(PatchedParagraph {
            text: paragraph.text.clone(),
            highlighted: false,
        });
        for (kp, locus) in key_points.iter().zip(&loci) {
            if *locus == Locus::After(index) {
                out.push(PatchedParagraph {
                    text: kp.text.clone(),
                    highlighted: true,
                });
            }
        }
    }

    for (kp, locus) in key_points.iter().zip(&loci) {
        if *locus == Locus::AtEnd {
            out.push(PatchedParagraph {
                text: kp.text.clone(),
                highlighted: true,
            });
        }
    }

    debug!(
        original = paragraphs.len(),
        inserted = key_points.len(),
        "patch materialized"
    );
    out
}

/// Resolve the insertion locus for one key point.
///
/// 1. First paragraph containing the source chunk's trimmed text.
/// 2. Otherwise, among paragraphs not already containing the point's trimmed
///    text, the one whose character length is closest to the chunk's.
/// 3. Otherwise, the end of the document.
fn resolve_locus(paragraphs: &[Paragraph], kp: &KeyPoint) -> Locus {
    let chunk_text = kp.source_chunk.text.trim();
    if let Some(index) = paragraphs.iter().position(|p| p.text.contains(chunk_text)) {
        return Locus::After(index);
    }

    // The whole chunk is absent; fall back to the closest paragraph by
    // character-length distance.
    let point_text = kp.text.trim();
    let chunk_len = kp.source_chunk.text.chars().count();
    let mut closest: Option<(usize, usize)> = None;

    for (index, paragraph) in paragraphs.iter().enumerate() {
        if paragraph.text.contains(point_text) {
            continue;
        }
        let distance = paragraph.text.chars().count().abs_diff(chunk_len);
        if closest.is_none_or(|(_, best)| distance < best) {
            closest = Some((index, distance));
        }
    }

    match closest {
        Some((index, _)) => Locus::After(index),
        None => Locus::AtEnd,
    }
}
