//! Converted `.ichat` archive parser.

use std::path::Path;

use tracing::debug;

use crate::Message;
use crate::assembler::assemble;
use crate::config::ArchiveConfig;
use crate::error::Result;
use crate::identity::NameGroups;
use crate::normalizer::normalize;
use crate::parser::{self, Parser};
use crate::parsing::other_name_from_filename;

/// Records of one archive, attributed to its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArchive {
    /// File name the records came from
    pub file_name: String,
    /// Canonical name of the other participant
    pub owner: String,
    /// Records sorted by timestamp
    pub messages: Vec<Message>,
}

/// Parser for Messages archives converted with `plutil -convert xml1`.
///
/// Converted files look like:
/// ```text
/// 2014-03-01_Mark on 2014-03-01 at 10.00.00.ichat
/// ```
/// and hold an XML property list whose object table mixes message payloads
/// with keys, attachments and contact identifiers.
#[derive(Debug, Clone, Default)]
pub struct IChatParser {
    config: ArchiveConfig,
    name_groups: NameGroups,
}

impl IChatParser {
    /// Creates a parser with the default configuration and no name groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with the given configuration and name groups.
    pub fn with_config(config: ArchiveConfig, name_groups: NameGroups) -> Self {
        Self { config, name_groups }
    }

    /// Returns the archive configuration.
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Returns the name-group table.
    pub fn name_groups(&self) -> &NameGroups {
        &self.name_groups
    }

    /// Parses archive text and attributes the records to their owner.
    ///
    /// # Errors
    ///
    /// - [`IchatError::InvalidFilename`](crate::IchatError::InvalidFilename)
    ///   if `file_name` carries no participant
    /// - [`IchatError::Structural`](crate::IchatError::Structural) naming
    ///   `file_name` if the content can't be normalized or assembled
    pub fn parse_archive(&self, content: &str, file_name: &str) -> Result<ParsedArchive> {
        let raw_name = other_name_from_filename(file_name)?;
        let participant = self.name_groups.participant(&raw_name);

        let normalized =
            normalize(content, &participant, &self.config).map_err(|e| e.in_file(file_name))?;
        let mut messages =
            assemble(&normalized, &participant, &self.config).map_err(|e| e.in_file(file_name))?;
        if self.config.debug_mode {
            for message in &mut messages {
                message.source_file = Some(file_name.to_string());
            }
        }

        debug!(
            file = file_name,
            owner = %participant.primary_name,
            messages = messages.len(),
            "parsed archive"
        );
        Ok(ParsedArchive {
            file_name: file_name.to_string(),
            owner: participant.primary_name,
            messages,
        })
    }

    /// Reads and parses one archive file.
    ///
    /// # Errors
    ///
    /// Returns [`IchatError::Io`](crate::IchatError::Io) if the file cannot be
    /// read, otherwise the errors of [`parse_archive`](Self::parse_archive).
    pub fn parse_archive_file(&self, path: &Path) -> Result<ParsedArchive> {
        let content = std::fs::read_to_string(path)?;
        self.parse_archive(&content, parser::file_name_of(path)?)
    }
}

impl Parser for IChatParser {
    fn name(&self) -> &'static str {
        "iChat"
    }

    fn parse_str(&self, content: &str, file_name: &str) -> Result<Vec<Message>> {
        self.parse_archive(content, file_name).map(|archive| archive.messages)
    }
}
