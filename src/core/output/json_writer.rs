//! JSON output writer.

use std::fs::File;
use std::io::Write;

use super::JsonRecord;
use crate::Message;
use crate::core::models::OutputConfig;
use crate::error::Result;

/// Writes messages to JSON file as an array.
///
/// # Format
/// ```json
/// [
///   {"sender": "Mark", "message": "Hello"},
///   {"sender": "Me", "message": "Hi"}
/// ]
/// ```
pub fn write_json(messages: &[Message], output_path: &str, config: &OutputConfig) -> Result<()> {
    let json = to_json(messages, config)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Converts messages to a pretty-printed JSON array.
///
/// Same format as [`write_json`].
pub fn to_json(messages: &[Message], config: &OutputConfig) -> Result<String> {
    let records: Vec<JsonRecord<'_>> = messages
        .iter()
        .map(|m| JsonRecord::from_message(m, config))
        .collect();

    Ok(serde_json::to_string_pretty(&records)?)
}
