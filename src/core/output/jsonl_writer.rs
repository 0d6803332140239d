//! JSON Lines (JSONL) output writer.
//!
//! One record per line, so a corpus can be streamed into downstream tools
//! without loading the whole array.

use std::fs::File;
use std::io::{BufWriter, Write};

use super::JsonRecord;
use crate::Message;
use crate::core::models::OutputConfig;
use crate::error::Result;

/// Writes messages to JSONL (JSON Lines) format.
///
/// Each line is a valid JSON object:
/// ```jsonl
/// {"sender":"Mark","message":"Hello"}
/// {"sender":"Me","message":"Hi"}
/// ```
pub fn write_jsonl(messages: &[Message], output_path: &str, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    write_lines(&mut writer, messages, config)?;
    writer.flush()?;
    Ok(())
}

/// Converts messages to a JSONL string.
///
/// Same format as [`write_jsonl`].
pub fn to_jsonl(messages: &[Message], config: &OutputConfig) -> Result<String> {
    let mut buffer = Vec::new();
    write_lines(&mut buffer, messages, config)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_lines<W: Write>(
    writer: &mut W,
    messages: &[Message],
    config: &OutputConfig,
) -> Result<()> {
    for msg in messages {
        let line = serde_json::to_string(&JsonRecord::from_message(msg, config))?;
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader};

    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_write_jsonl_basic() {
        let ts = Utc.with_ymd_and_hms(2014, 6, 15, 12, 30, 0).unwrap();
        let messages = vec![Message::new("Mark", ts, "Hello"), Message::new("Me", ts, "Hi")];

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        write_jsonl(&messages, path, &OutputConfig::new()).unwrap();

        let reader = BufReader::new(std::fs::File::open(path).unwrap());
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["sender"], "Mark");
        assert_eq!(first["message"], "Hello");
    }

    #[test]
    fn test_to_jsonl_fractional_timestamp() {
        let ts = Utc.timestamp_opt(1_400_000_000, 250_000_000).unwrap();
        let config = OutputConfig::new().with_timestamps();
        let jsonl = to_jsonl(&[Message::new("Mark", ts, "Hello")], &config).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(jsonl.trim()).unwrap();
        assert_eq!(parsed["timestamp"], "2014-05-13T16:53:20.250Z");
    }

    #[test]
    fn test_jsonl_no_array_brackets() {
        let ts = Utc.with_ymd_and_hms(2014, 6, 15, 12, 30, 0).unwrap();
        let content = to_jsonl(&[Message::new("Mark", ts, "Hello")], &OutputConfig::new()).unwrap();
        assert!(!content.contains('['));
        assert!(content.ends_with('\n'));
    }
}
