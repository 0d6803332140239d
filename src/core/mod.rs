//! Working with recovered records.
//!
//! This module contains:
//! - [`models`] - Output configuration
//! - [`filter`] - Message filtering by date and sender
//! - [`processor`] - Per-owner merging and deduplication
//! - [`search`] - Substring and regex search
//! - [`output`] - Format writers (CSV, JSON, JSONL)

pub mod filter;
pub mod models;
pub mod output;
pub mod processor;
pub mod search;

// Re-export main types for convenience
pub use filter::{FilterConfig, apply_filters};
pub use models::OutputConfig;
pub use processor::{Corpus, ProcessingStats, dedupe_messages};
pub use search::{SearchHit, SearchOptions, search};

// Conditionally re-export output writers
#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use output::{to_json, to_jsonl, write_json, write_jsonl};
