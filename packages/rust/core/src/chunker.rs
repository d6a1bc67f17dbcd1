//! Word-budget text chunking.
//!
//! Documents are compared chunk-by-chunk to respect prompt-size limits.
//! Chunks are cut on line boundaries only — a line is never split, even
//! when it alone exceeds the budget.

use policydiff_shared::{Chunk, ChunkRole};

/// Split `text` into chunks whose cumulative word count stays within
/// `max_words`.
///
/// Lines are accumulated in order and joined by `'\n'`. When adding a line
/// would push the running count over the budget, the buffer is flushed and a
/// new chunk starts with that line. A single line over budget becomes its own
/// oversized chunk. Empty input yields no chunks.
pub fn chunk(text: &str, max_words: usize, role: ChunkRole) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffered_words = 0usize;

    for line in text.split('\n') {
        let line_words = words_in(line);
        if buffered_words + line_words > max_words {
            if !buffer.is_empty() {
                chunks.push(Chunk {
                    text: buffer.join("\n"),
                    role,
                });
            }
            buffer = vec![line];
            buffered_words = line_words;
        } else {
            buffer.push(line);
            buffered_words += line_words;
        }
    }

    if !buffer.is_empty() {
        chunks.push(Chunk {
            text: buffer.join("\n"),
            role,
        });
    }

    chunks
}

/// Whitespace-separated word count of one line.
fn words_in(line: &str) -> usize {
    line.split_whitespace().count()
}
