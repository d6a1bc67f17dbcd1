//! End-to-end comparison pipeline: load → diff → suggest → patch → serialize.

use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use policydiff_shared::{CompareConfig, ComparisonId, KeyPoint, Result};

use crate::completion::CompletionClient;
use crate::{differ, patcher, suggest};

/// Result of comparing one client document against the master.
#[derive(Debug)]
pub struct ComparisonOutcome {
    /// Comparison run identifier.
    pub id: ComparisonId,
    /// Clauses present in the master but missing from the client (≤ 20).
    pub missing_key_points: Vec<KeyPoint>,
    /// Advisory suggestion block (≤ 20 lines, possibly empty).
    pub suggestions: String,
    /// The patched client document, serialized.
    pub patched_bytes: Vec<u8>,
    /// SHA-256 of the raw master input bytes.
    pub master_hash: String,
    /// SHA-256 of the raw client input bytes.
    pub client_hash: String,
    /// Paragraph count of the original client document.
    pub paragraph_count: usize,
    /// Number of highlighted paragraphs inserted.
    pub inserted_count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &ComparisonOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &ComparisonOutcome) {}
}

/// Compare one client document against the master and produce a patched copy.
///
/// The client's paragraph sequence is loaded once; the patcher works against
/// that original sequence, never a partially patched one. Each client
/// document is independent — nothing is shared or cached between calls.
#[instrument(skip_all, fields(max_words = config.max_chunk_words))]
pub async fn compare_and_patch(
    master_bytes: &[u8],
    client_bytes: &[u8],
    completion: &dyn CompletionClient,
    config: &CompareConfig,
    progress: &dyn ProgressReporter,
) -> Result<ComparisonOutcome> {
    let start = Instant::now();
    let id = ComparisonId::new();

    info!(%id, "starting comparison");

    // --- Phase 1: Load ---
    progress.phase("Loading documents");
    let master_paragraphs = policydiff_docx::load(master_bytes)?;
    let client_paragraphs = policydiff_docx::load(client_bytes)?;

    let master_text = policydiff_docx::full_text(&master_paragraphs);
    let client_text = policydiff_docx::full_text(&client_paragraphs);

    let master_hash = sha256_hex(master_bytes);
    let client_hash = sha256_hex(client_bytes);

    // --- Phase 2: Key-point diff ---
    progress.phase("Comparing key points");
    let missing_key_points = differ::compare_key_points(
        &master_text,
        &client_text,
        config.max_chunk_words,
        completion,
    )
    .await;

    // --- Phase 3: Suggestions ---
    progress.phase("Generating suggestions");
    let suggestions = suggest::generate_suggestions(
        &master_text,
        &client_text,
        config.max_chunk_words,
        completion,
    )
    .await;

    // --- Phase 4: Patch & serialize ---
    progress.phase("Patching client document");
    let patched = patcher::patch(&client_paragraphs, &missing_key_points);
    let patched_bytes = policydiff_docx::serialize(&patched)?;

    let outcome = ComparisonOutcome {
        id,
        inserted_count: missing_key_points.len(),
        missing_key_points,
        suggestions,
        patched_bytes,
        master_hash,
        client_hash,
        paragraph_count: client_paragraphs.len(),
        elapsed: start.elapsed(),
    };

    progress.done(&outcome);

    info!(
        id = %outcome.id,
        missing = outcome.missing_key_points.len(),
        paragraphs = outcome.paragraph_count,
        elapsed_ms = outcome.elapsed.as_millis(),
        "comparison complete"
    );

    Ok(outcome)
}

/// SHA-256 hex digest of a byte slice.
fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
