//! Output format writers.
//!
//! - [`write_csv`] / [`to_csv`] - CSV with semicolon delimiter - requires `csv-output` feature
//! - [`write_json`] / [`to_json`] - JSON array of messages - requires `json-output` feature
//! - [`write_jsonl`] / [`to_jsonl`] - JSON Lines, one record per line - requires `json-output`
//!   feature
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn main() -> ichatpack::Result<()> {
//! use ichatpack::core::output::{write_csv, write_json, write_jsonl, to_csv};
//! use ichatpack::core::models::OutputConfig;
//! use ichatpack::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2014, 3, 1, 12, 0, 0).unwrap();
//! let messages = vec![
//!     Message::new("Mark", ts, "Hello!"),
//!     Message::new("Me", ts, "Hi there!"),
//! ];
//!
//! let config = OutputConfig::new().with_timestamps();
//!
//! write_csv(&messages, "output.csv", &config)?;
//! write_json(&messages, "output.json", &config)?;
//! write_jsonl(&messages, "output.jsonl", &config)?;
//!
//! let csv_string = to_csv(&messages, &config)?;
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "csv-output", feature = "json-output")))]
//! # fn main() {}
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;
#[cfg(feature = "json-output")]
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-output")]
pub use jsonl_writer::{to_jsonl, write_jsonl};

#[cfg(feature = "json-output")]
use serde::Serialize;

#[cfg(feature = "json-output")]
use crate::Message;
#[cfg(feature = "json-output")]
use crate::core::models::OutputConfig;

/// ISO 8601 with as many fractional digits as the timestamp needs.
#[cfg(feature = "json-output")]
pub(crate) const JSON_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Record shape shared by the JSON and JSONL writers.
/// Only includes fields enabled in `OutputConfig`.
#[cfg(feature = "json-output")]
#[derive(Serialize)]
pub(crate) struct JsonRecord<'a> {
    sender: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_timestamp_inferred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_file: Option<&'a str>,
}

#[cfg(feature = "json-output")]
impl<'a> JsonRecord<'a> {
    pub(crate) fn from_message(msg: &'a Message, config: &OutputConfig) -> Self {
        Self {
            sender: &msg.sender,
            message: &msg.message,
            timestamp: config
                .include_timestamps
                .then(|| msg.timestamp.format(JSON_TIMESTAMP_FORMAT).to_string()),
            is_timestamp_inferred: config.include_inferred.then_some(msg.is_timestamp_inferred),
            sender_id: msg.sender_id.filter(|_| config.include_debug),
            source_file: msg.source_file.as_deref().filter(|_| config.include_debug),
        }
    }
}
