//! CSV output writer.

use std::fs::File;
use std::io::Write;

use crate::Message;
use crate::core::models::OutputConfig;
use crate::error::Result;

/// Writes messages to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: Depends on OutputConfig
///   - Basic: `Sender`, `Message`
///   - With timestamps: `Timestamp`, `Sender`, `Message`
///   - With inferred flag: adds `Inferred`
///   - With debug: adds `SenderId`, `SourceFile`
/// - Encoding: UTF-8
pub fn write_csv(messages: &[Message], output_path: &str, config: &OutputConfig) -> Result<()> {
    let file = File::create(output_path)?;
    write_records(file, messages, config)
}

/// Converts messages to a CSV string.
///
/// Same format as [`write_csv`].
pub fn to_csv(messages: &[Message], config: &OutputConfig) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, messages, config)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_records<W: Write>(sink: W, messages: &[Message], config: &OutputConfig) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(sink);

    writer.write_record(build_header(config))?;
    for msg in messages {
        writer.write_record(build_record(msg, config))?;
    }

    writer.flush()?;
    Ok(())
}

/// Build CSV header based on output configuration.
fn build_header(config: &OutputConfig) -> Vec<&'static str> {
    let mut header = Vec::new();

    if config.include_timestamps {
        header.push("Timestamp");
    }
    header.push("Sender");
    header.push("Message");
    if config.include_inferred {
        header.push("Inferred");
    }
    if config.include_debug {
        header.push("SenderId");
        header.push("SourceFile");
    }

    header
}

/// Build CSV record for a single message.
fn build_record(msg: &Message, config: &OutputConfig) -> Vec<String> {
    let mut record = Vec::new();

    if config.include_timestamps {
        record.push(msg.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    record.push(msg.sender.clone());
    record.push(msg.message.clone());
    if config.include_inferred {
        record.push(msg.is_timestamp_inferred.to_string());
    }
    if config.include_debug {
        record.push(msg.sender_id.map(|id| id.to_string()).unwrap_or_default());
        record.push(msg.source_file.clone().unwrap_or_default());
    }

    record
}
