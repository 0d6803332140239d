//! # ichatpack
//!
//! Recovers `(sender, timestamp, message)` records from Messages `.ichat`
//! archives.
//!
//! ## Overview
//!
//! Messages stored conversations as keyed-archiver property lists. Once
//! converted to XML with `plutil`, an archive is a flat object table in which
//! message text, sender codes and times are interleaved with attachment
//! records, contact identifiers and archiver bookkeeping. ichatpack cleans
//! that table down to repeating `<integer> <real> <string>` triples, works
//! out who each sender code belongs to, and merges the records of many
//! archives per conversation partner.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ichatpack::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = ArchiveConfig::from_json_file("ichatpack.json")?;
//!     let groups = NameGroups::from_file("names.json")?;
//!     let parser = IChatParser::with_config(config, groups);
//!
//!     let report = parse_directory("converted", &[2014], &parser, None)?;
//!     for (owner, messages) in report.corpus.iter() {
//!         println!("{owner}: {} records", messages.len());
//!     }
//!
//!     let config = OutputConfig::new().with_timestamps();
//!     write_json(&report.corpus.all_messages(), "corpus.json", &config)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Single archives
//!
//! ```rust,no_run
//! use ichatpack::parser::Parser;
//! use ichatpack::parsers::IChatParser;
//!
//! let parser = IChatParser::new();
//! let messages = parser.parse("2014-03-01_Mark on 2014-03-01 at 10.00.00.ichat".as_ref())?;
//! # Ok::<(), ichatpack::IchatError>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`archive`] - finding raw archives and converting them with `plutil`
//! - [`normalizer`] - raw XML text to a clean sequence of typed values
//! - [`assembler`] - sender resolution and record assembly
//! - [`parsers`] - [`IChatParser`](parsers::IChatParser), normalize + assemble per file
//! - [`batch`] - parallel parsing of many archives into a [`Corpus`](core::Corpus)
//! - [`parsing`] - filenames, escaping and timestamp helpers
//! - [`identity`] - name groups and participants
//! - [`config`] - [`ArchiveConfig`](config::ArchiveConfig) and self identity
//! - [`core`] - filtering, deduplication, search and output writers
//! - [`format`] - output format selection
//! - [`progress`] - batch progress callbacks
//! - [`error`] - [`IchatError`] and [`Result`]
//! - [`prelude`] - convenient re-exports

pub mod archive;
pub mod assembler;
pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod identity;
pub mod message;
pub mod normalizer;
pub mod parser;
pub mod parsers;
pub mod parsing;
pub mod progress;

// Re-export the main types at the crate root for convenience
pub use error::{IchatError, Result};
pub use message::Message;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use ichatpack::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Message;

    pub use crate::error::{IchatError, Result};

    pub use crate::parser::Parser;
    pub use crate::parsers::{IChatParser, ParsedArchive};

    pub use crate::config::{ArchiveConfig, CarrierAliases, SelfIdentity};
    pub use crate::identity::{NameGroups, Participant};

    pub use crate::archive::{Converter, PlutilConverter, copy_archives, list_archives};
    pub use crate::batch::{BatchReport, parse_directory, parse_files};

    pub use crate::core::filter::{FilterConfig, apply_filters};
    pub use crate::core::models::OutputConfig;
    pub use crate::core::processor::{Corpus, ProcessingStats, dedupe_messages};
    pub use crate::core::search::{SearchHit, SearchOptions, search};

    // Output (file writers and string converters)
    #[cfg(feature = "csv-output")]
    pub use crate::core::output::{to_csv, write_csv};
    #[cfg(feature = "json-output")]
    pub use crate::core::output::{to_json, to_jsonl, write_json, write_jsonl};

    pub use crate::format::OutputFormat;
    pub use crate::progress::{Progress, ProgressCallback};
}
