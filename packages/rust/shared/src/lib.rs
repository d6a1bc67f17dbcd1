//! Shared types, error model, and configuration for PolicyDiff.
//!
//! This crate is the foundation depended on by all other PolicyDiff crates.
//! It provides:
//! - [`PolicyDiffError`] — the unified error type
//! - Domain types ([`Paragraph`], [`Chunk`], [`KeyPoint`], [`ComparisonId`])
//! - Configuration ([`AppConfig`], [`CompareConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CompareConfig, DefaultsConfig, OpenAiConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{PolicyDiffError, Result};
pub use types::{
    Chunk, ChunkRole, ComparisonId, DEFAULT_MAX_CHUNK_WORDS, KeyPoint, MAX_KEY_POINTS,
    MAX_SUGGESTIONS, Paragraph, PatchedParagraph,
};
