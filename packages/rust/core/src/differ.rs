//! Key-point differ.
//!
//! Pairs every master chunk against every client chunk (full cross product),
//! asks the completion service which clauses the client chunk lacks, and
//! collects the accepted lines as [`KeyPoint`]s — at most
//! [`MAX_KEY_POINTS`], deduplicated, in discovery order.

use std::collections::HashSet;

use tracing::{debug, warn};

use policydiff_shared::{Chunk, ChunkRole, KeyPoint, MAX_KEY_POINTS};

use crate::chunker;
use crate::completion::CompletionClient;

/// Find clauses present in `master_text` but missing from `client_text`.
///
/// Identical texts short-circuit to an empty result without any completion
/// calls. A failed completion for one chunk pair is skipped; the comparison
/// continues with the next pair. Prompting stops as soon as the cap is
/// reached, since the number of calls otherwise grows with the product of
/// the two chunk counts.
pub async fn compare_key_points(
    master_text: &str,
    client_text: &str,
    max_words: usize,
    client: &dyn CompletionClient,
) -> Vec<KeyPoint> {
    if master_text == client_text {
        debug!("documents are identical, skipping comparison");
        return Vec::new();
    }

    let master_chunks = chunker::chunk(master_text, max_words, ChunkRole::Master);
    let client_chunks = chunker::chunk(client_text, max_words, ChunkRole::Client);

    let mut points: Vec<KeyPoint> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    'pairs: for master_chunk in &master_chunks {
        for client_chunk in &client_chunks {
            if points.len() >= MAX_KEY_POINTS {
                break 'pairs;
            }

            let prompt = build_prompt(master_chunk, client_chunk);
            let response = match client.complete(&prompt).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "completion failed for chunk pair, skipping");
                    continue;
                }
            };

            for line in response.split('\n') {
                let trimmed = line.trim();
                // Skip blanks and lines the model merely echoed back from
                // the client document.
                if trimmed.is_empty() || client_text.contains(line) {
                    continue;
                }
                if !seen.insert(trimmed.to_string()) {
                    continue;
                }
                points.push(KeyPoint {
                    text: line.to_string(),
                    source_chunk: client_chunk.clone(),
                });
            }
        }
    }

    points.truncate(MAX_KEY_POINTS);
    debug!(count = points.len(), "key-point comparison complete");
    points
}

/// Build the comparison prompt for one master/client chunk pair.
fn build_prompt(master_chunk: &Chunk, client_chunk: &Chunk) -> String {
    format!(
        "The following text is from a master policy document:\n\n\
         {master}\n\n\
         The following text is from a client policy document:\n\n\
         {client}\n\n\
         Identify the key points that are present in the master policy \
         document but missing in the client policy document. Focus only on \
         the differences where the master document contains essential \
         clauses or sections that are not present in the client document. \
         List one key point per line. Limit the output to the top 20 key \
         points.",
        master = master_chunk.text,
        client = client_chunk.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::testing::{FailingClient, ScriptedClient};

    #[tokio::test]
    async fn identical_texts_short_circuit() {
        // The scripted response would produce points if any call were made.
        let client = ScriptedClient::new(vec!["Spurious point"]);
        let text = "Clause A\nClause B";
        let points = compare_key_points(text, text, 1000, &client).await;
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn finds_missing_clause() {
        let master = "Clause A\nClause B\nClause C";
        let client_text = "Clause A\nClause C";
        let client = ScriptedClient::new(vec!["Clause B"]);

        let points = compare_key_points(master, client_text, 1000, &client).await;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].text, "Clause B");
        assert_eq!(points[0].source_chunk.role, ChunkRole::Client);
        assert_eq!(points[0].source_chunk.text, client_text);
    }

    #[tokio::test]
    async fn echoed_client_content_is_filtered() {
        let master = "Clause A\nClause B";
        let client_text = "Clause A";
        // The model echoes back a clause the client already has.
        let client = ScriptedClient::new(vec!["Clause A\nClause B"]);

        let points = compare_key_points(master, client_text, 1000, &client).await;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].text, "Clause B");
    }

    #[tokio::test]
    async fn duplicate_lines_are_deduplicated() {
        let master = "Clause A\nClause B";
        let client_text = "Clause A";
        let client = ScriptedClient::new(vec!["Clause B\nClause B\n  Clause B  "]);

        let points = compare_key_points(master, client_text, 1000, &client).await;
        assert_eq!(points.len(), 1);
    }

    #[tokio::test]
    async fn cap_is_enforced_in_first_seen_order() {
        // 25 distinct lines never present in the client text.
        let lines: Vec<String> = (1..=25).map(|i| format!("Missing clause {i}")).collect();
        let response = lines.join("\n");
        let client = ScriptedClient::new(vec![response.as_str()]);

        let points =
            compare_key_points("master content here", "client content here", 1000, &client).await;
        assert_eq!(points.len(), MAX_KEY_POINTS);
        assert_eq!(points[0].text, "Missing clause 1");
        assert_eq!(points[19].text, "Missing clause 20");
    }

    #[tokio::test]
    async fn failed_pairs_are_skipped() {
        let points =
            compare_key_points("master text", "client text", 1000, &FailingClient).await;
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn empty_inputs_produce_empty_result() {
        let client = ScriptedClient::new(vec!["Should never be used"]);
        let points = compare_key_points("", "client text", 1000, &client).await;
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn cross_product_stops_at_cap() {
        // Two master chunks x one client chunk. The first pair already
        // saturates the cap, so the second pair must not contribute.
        let master = "m1 m2 m3\nm4 m5 m6"; // budget 3 -> two chunks
        let client_text = "client line";
        let first: Vec<String> = (1..=20).map(|i| format!("Point {i}")).collect();
        let first_response = first.join("\n");
        let client =
            ScriptedClient::new(vec![first_response.as_str(), "Point from second pair"]);

        let points = compare_key_points(master, client_text, 3, &client).await;
        assert_eq!(points.len(), MAX_KEY_POINTS);
        assert!(points.iter().all(|p| !p.text.contains("second pair")));
    }
}
