//! Suggestion generator.
//!
//! Pairs master and client chunks positionally (zipped by index, not the
//! cross product the differ uses — suggestions aim at "this section maps to
//! that section", a linear alignment rather than a quadratic gap search) and
//! collects advisory text for the client side only.

use tracing::{debug, warn};

use policydiff_shared::{Chunk, ChunkRole, MAX_SUGGESTIONS};

use crate::chunker;
use crate::completion::CompletionClient;

/// Generate an advisory block suggesting client-side updates.
///
/// At most [`MAX_SUGGESTIONS`] lines, joined by a blank line. Failed pairs
/// are skipped. An empty block is a valid result.
pub async fn generate_suggestions(
    master_text: &str,
    client_text: &str,
    max_words: usize,
    client: &dyn CompletionClient,
) -> String {
    let master_chunks = chunker::chunk(master_text, max_words, ChunkRole::Master);
    let client_chunks = chunker::chunk(client_text, max_words, ChunkRole::Client);

    let mut suggestions: Vec<String> = Vec::new();

    for (master_chunk, client_chunk) in master_chunks.iter().zip(client_chunks.iter()) {
        if suggestions.len() >= MAX_SUGGESTIONS {
            break;
        }

        let prompt = build_prompt(master_chunk, client_chunk);
        let response = match client.complete(&prompt).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "completion failed for chunk pair, skipping");
                continue;
            }
        };

        suggestions.extend(response.split('\n').map(String::from));
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    debug!(lines = suggestions.len(), "suggestion generation complete");
    suggestions.join("\n\n")
}

/// Build the alignment prompt for one positional chunk pair.
fn build_prompt(master_chunk: &Chunk, client_chunk: &Chunk) -> String {
    format!(
        "The following text is from a master policy document:\n\n\
         {master}\n\n\
         The following text is from a client policy document:\n\n\
         {client}\n\n\
         Compare the two documents and provide detailed suggestions for \
         updating the client policy document to better align with the master \
         policy document. Focus on missing clauses, differences in wording, \
         and contextual deviations. Only suggest changes to the client \
         document. Do not suggest changes to the master document. Focus only \
         on identifying any differences between the two documents. Limit the \
         suggestions to the top 20 points and highlight the key points \
         clearly.",
        master = master_chunk.text,
        client = client_chunk.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::testing::{FailingClient, ScriptedClient};

    #[tokio::test]
    async fn single_pair_suggestions() {
        let client = ScriptedClient::new(vec!["Add clause B\nReword section 2"]);
        let out = generate_suggestions("master text", "client text", 1000, &client).await;
        assert_eq!(out, "Add clause B\n\nReword section 2");
    }

    #[tokio::test]
    async fn output_never_exceeds_twenty_lines() {
        let lines: Vec<String> = (1..=30).map(|i| format!("Suggestion {i}")).collect();
        let response = lines.join("\n");
        let client = ScriptedClient::new(vec![response.as_str()]);

        let out = generate_suggestions("master text", "client text", 1000, &client).await;
        let parts: Vec<&str> = out.split("\n\n").collect();
        assert_eq!(parts.len(), MAX_SUGGESTIONS);
        assert_eq!(parts[0], "Suggestion 1");
        assert_eq!(parts[19], "Suggestion 20");
    }

    #[tokio::test]
    async fn pairs_positionally_up_to_shorter_list() {
        // Master splits into three chunks, client into two: only two prompts.
        let master = "m1 m2 m3\nm4 m5 m6\nm7 m8 m9";
        let client_text = "c1 c2 c3\nc4 c5 c6";
        let client = ScriptedClient::new(vec!["first pair", "second pair", "third pair"]);

        let out = generate_suggestions(master, client_text, 3, &client).await;
        assert_eq!(out, "first pair\n\nsecond pair");
    }

    #[tokio::test]
    async fn stable_for_identical_inputs() {
        let a = {
            let client = ScriptedClient::new(vec!["Align headings\nDrop appendix"]);
            generate_suggestions("master", "client", 1000, &client).await
        };
        let b = {
            let client = ScriptedClient::new(vec!["Align headings\nDrop appendix"]);
            generate_suggestions("master", "client", 1000, &client).await
        };
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn failed_pairs_yield_empty_block() {
        let out = generate_suggestions("master", "client", 1000, &FailingClient).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn empty_inputs_yield_empty_block() {
        let client = ScriptedClient::new(vec!["unused"]);
        let out = generate_suggestions("", "", 1000, &client).await;
        assert!(out.is_empty());
    }
}
