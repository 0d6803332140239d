//! Shared parsing utilities for converted archives.
//!
//! This module contains the small, stateless pieces the normalizer,
//! assembler and discovery code build on:
//!
//! - [`patterns`] - compiled regular expressions
//! - [`lines`] - tag stripping and line classification
//! - [`escape`] - XML entity and protection-marker handling
//! - [`timestamp`] - Cocoa reference-date decoding
//! - [`filename`] - participant extraction and duplicate-file policy

pub mod escape;
pub mod filename;
pub mod lines;
pub mod patterns;
pub mod timestamp;

// Re-export commonly used items
pub use escape::{escape_xml_chars, unescape_xml_chars};
pub use filename::{dedupe_filenames, matches_years, other_name_from_filename};
pub use lines::strip_tags;
pub use timestamp::{cocoa_from_datetime, datetime_from_cocoa};
