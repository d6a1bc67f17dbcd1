//! Core domain types for PolicyDiff comparisons.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard cap on the number of missing key points per comparison.
pub const MAX_KEY_POINTS: usize = 20;

/// Hard cap on the number of suggestion lines per comparison.
pub const MAX_SUGGESTIONS: usize = 20;

/// Default word budget for a single chunk.
pub const DEFAULT_MAX_CHUNK_WORDS: usize = 1000;

// ---------------------------------------------------------------------------
// ComparisonId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for comparison-run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonId(pub Uuid);

impl ComparisonId {
    /// Generate a new time-sortable comparison identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ComparisonId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ComparisonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ComparisonId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Paragraphs
// ---------------------------------------------------------------------------

/// One paragraph of a loaded document.
///
/// `position` is the paragraph's rank in the original sequence and stays
/// stable while insertion loci are computed against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph text, verbatim as read from the document.
    pub text: String,
    /// Rank in the original paragraph sequence (0-based).
    pub position: usize,
}

/// One paragraph of a patched output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchedParagraph {
    /// Paragraph text.
    pub text: String,
    /// True for machine-inserted paragraphs; they must be visually marked.
    pub highlighted: bool,
}

// ---------------------------------------------------------------------------
// Chunks
// ---------------------------------------------------------------------------

/// Which document a chunk was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkRole {
    /// The reference document whose clauses are the comparison baseline.
    Master,
    /// The document being checked and patched.
    Client,
}

impl ChunkRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Client => "client",
        }
    }
}

/// A bounded-size contiguous slice of a document's text.
///
/// Lines joined by `'\n'`; the cumulative word count stays within the budget
/// unless a single line is itself over budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub role: ChunkRole,
}

// ---------------------------------------------------------------------------
// KeyPoint
// ---------------------------------------------------------------------------

/// One clause judged present in the master and absent from a client chunk.
///
/// `source_chunk` is the client chunk the clause was compared against; the
/// patcher uses it to locate an insertion point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    /// The clause text, as returned by the completion service (raw line).
    pub text: String,
    /// The client chunk this point was paired with.
    pub source_chunk: Chunk,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_id_roundtrip() {
        let id = ComparisonId::new();
        let s = id.to_string();
        let parsed: ComparisonId = s.parse().expect("parse ComparisonId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn key_point_serialization() {
        let point = KeyPoint {
            text: "All invoices are payable within 30 days.".into(),
            source_chunk: Chunk {
                text: "Payment terms\nInvoices are issued monthly.".into(),
                role: ChunkRole::Client,
            },
        };

        let json = serde_json::to_string(&point).expect("serialize");
        let parsed: KeyPoint = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, point);
        assert_eq!(parsed.source_chunk.role, ChunkRole::Client);
    }

    #[test]
    fn chunk_role_labels() {
        assert_eq!(ChunkRole::Master.as_str(), "master");
        assert_eq!(ChunkRole::Client.as_str(), "client");
    }
}
