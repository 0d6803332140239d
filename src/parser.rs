//! Parser trait for converted archives.
//!
//! Archive text alone doesn't say who the conversation was with; the other
//! participant is encoded in the file name. Both entry points therefore
//! carry a file name.
//!
//! # Example
//!
//! ```rust,no_run
//! use ichatpack::parser::Parser;
//! use ichatpack::parsers::IChatParser;
//! use std::path::Path;
//!
//! let parser = IChatParser::new();
//! let messages = parser.parse(Path::new(
//!     "converted/2014-03-01_Mark on 2014-03-01 at 10.00.00.ichat",
//! ))?;
//! for msg in &messages {
//!     println!("{}: {}", msg.sender, msg.message);
//! }
//! # Ok::<(), ichatpack::IchatError>(())
//! ```

use std::fs;
use std::path::Path;

use crate::Message;
use crate::error::{IchatError, Result};

/// Parses archive text into message records.
///
/// # Implementation Notes
///
/// Implementors provide [`name`](Parser::name) and
/// [`parse_str`](Parser::parse_str); [`parse`](Parser::parse) reads the file
/// and forwards its name.
pub trait Parser: Send + Sync {
    /// Returns the human-readable name of this parser.
    fn name(&self) -> &'static str;

    /// Parses archive content that was read from `file_name`.
    ///
    /// # Errors
    ///
    /// - [`IchatError::InvalidFilename`] if the name carries no participant
    /// - [`IchatError::Structural`] if the content can't be normalized
    fn parse_str(&self, content: &str, file_name: &str) -> Result<Vec<Message>>;

    /// Reads and parses one converted archive.
    ///
    /// # Errors
    ///
    /// Returns [`IchatError::Io`] if the file cannot be read, otherwise the
    /// errors of [`parse_str`](Parser::parse_str).
    fn parse(&self, path: &Path) -> Result<Vec<Message>> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content, file_name_of(path)?)
    }

    /// Parses a converted archive (convenience method accepting &str path).
    fn parse_file(&self, path: &str) -> Result<Vec<Message>> {
        self.parse(Path::new(path))
    }
}

/// Final path component as UTF-8.
pub(crate) fn file_name_of(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IchatError::invalid_filename(path.display().to_string(), "path has no UTF-8 file name")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoParser;

    impl Parser for EchoParser {
        fn name(&self) -> &'static str {
            "Echo"
        }

        fn parse_str(&self, content: &str, file_name: &str) -> Result<Vec<Message>> {
            let ts = crate::parsing::timestamp::cocoa_epoch();
            Ok(vec![Message::new(file_name, ts, content)])
        }
    }

    #[test]
    fn test_parse_reads_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ichat");
        fs::write(&path, "body").unwrap();

        let messages = EchoParser.parse(&path).unwrap();
        assert_eq!(messages[0].sender, "a.ichat");
        assert_eq!(messages[0].message, "body");
    }

    #[test]
    fn test_parse_missing_file() {
        let err = EchoParser.parse_file("/nonexistent/a.ichat").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_file_name_of_root() {
        assert!(file_name_of(Path::new("/")).is_err());
    }
}
