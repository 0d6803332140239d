//! Message record recovered from an archive.
//!
//! This module provides [`Message`], the single value that outlives
//! per-file processing. The assembler emits one per `(sender, timestamp,
//! text)` group and the corpus merges them per conversation owner.
//!
//! # Examples
//!
//! ```
//! use ichatpack::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2014, 3, 1, 12, 0, 0).unwrap();
//! let msg = Message::new("Mark", ts, "Hello!");
//! assert_eq!(msg.sender(), "Mark");
//! assert!(!msg.is_timestamp_inferred());
//! ```
//!
//! ## Serialization
//!
//! ```
//! use ichatpack::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2014, 3, 1, 12, 0, 0).unwrap();
//! let msg = Message::new("Mark", ts, "Hello!");
//! let json = serde_json::to_string(&msg)?;
//!
//! // debug metadata is omitted when absent
//! assert!(!json.contains("sender_id"));
//! let parsed: Message = serde_json::from_str(&json)?;
//! assert_eq!(msg, parsed);
//! # Ok::<(), serde_json::Error>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single message recovered from an `.ichat` archive.
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `sender` | `String` | Resolved participant name |
/// | `timestamp` | `DateTime<Utc>` | Decoded or inferred send time |
/// | `message` | `String` | Unescaped message text |
/// | `is_timestamp_inferred` | `bool` | Timestamp was carried forward |
/// | `sender_id` | `Option<i64>` | File-scoped sender code (debug mode) |
/// | `source_file` | `Option<String>` | Originating archive (debug mode) |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Resolved participant name, or `Unknown` when the sender codes could
    /// not be mapped.
    pub sender: String,

    /// When the message was sent.
    pub timestamp: DateTime<Utc>,

    /// Message text with archive escapes removed.
    ///
    /// Attachments appear as `(MEDIA)`; multiline messages keep their
    /// newlines.
    pub message: String,

    /// `true` when the archive stored no timestamp for this message and the
    /// previous real timestamp was carried forward.
    #[serde(default)]
    pub is_timestamp_inferred: bool,

    /// File-scoped sender code the name was resolved from.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub sender_id: Option<i64>,

    /// File name of the archive the message came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub source_file: Option<String>,
}

impl Message {
    /// Creates a message with a decoded (not inferred) timestamp.
    pub fn new(
        sender: impl Into<String>,
        timestamp: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            timestamp,
            message: message.into(),
            is_timestamp_inferred: false,
            sender_id: None,
            source_file: None,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Builder method to set the inferred-timestamp flag.
    #[must_use]
    pub fn with_inferred_timestamp(mut self, inferred: bool) -> Self {
        self.is_timestamp_inferred = inferred;
        self
    }

    /// Builder method to attach the file-scoped sender code.
    #[must_use]
    pub fn with_sender_id(mut self, sender_id: i64) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    /// Builder method to attach the originating archive name.
    #[must_use]
    pub fn with_source_file(mut self, file: impl Into<String>) -> Self {
        self.source_file = Some(file.into());
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the sender name.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether the timestamp was inferred.
    pub fn is_timestamp_inferred(&self) -> bool {
        self.is_timestamp_inferred
    }

    /// Returns the identity used for cross-file deduplication.
    pub fn dedupe_key(&self) -> (&str, DateTime<Utc>, &str) {
        (&self.sender, self.timestamp, &self.message)
    }

    /// Returns `true` if debug metadata is attached.
    pub fn has_debug_metadata(&self) -> bool {
        self.sender_id.is_some() || self.source_file.is_some()
    }
}
