//! Line normalizer.
//!
//! Turns the text of one converted archive into a flat run of
//! `(sender code, timestamp, text)` values. The converter output interleaves
//! message payloads with keys, attachment data, contact identifiers and
//! bookkeeping values; the normalizer applies a fixed sequence of corrective
//! passes that remove everything but the messages.
//!
//! Line passes live in [`text`], value passes in [`values`] and the
//! contact-info predicate both of them share in [`contact`].

pub mod contact;
pub mod text;
pub mod values;

use std::fmt;

use tracing::debug;

use crate::config::ArchiveConfig;
use crate::error::Result;
use crate::identity::Participant;

pub use contact::ContactClassifier;

/// A typed value recovered from the archive, in file order.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    /// A file-scoped sender code.
    Integer(i64),
    /// Seconds since 2001-01-01T00:00:00Z.
    Real {
        seconds: f64,
        /// Carried forward from an earlier timestamp.
        inferred: bool,
    },
    /// Message text, still XML-escaped.
    String(String),
}

impl TaggedValue {
    /// Text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TaggedValue::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, TaggedValue::Integer(_))
    }

    pub fn is_real(&self) -> bool {
        matches!(self, TaggedValue::Real { .. })
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TaggedValue::String(_))
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaggedValue::Integer(code) => write!(f, "<integer>{code}</integer>"),
            TaggedValue::Real { seconds, .. } => write!(f, "<real>{seconds}</real>"),
            TaggedValue::String(text) => write!(f, "<string>{text}</string>"),
        }
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedArchive {
    /// Values in `(Integer, Real, String)` groups.
    pub values: Vec<TaggedValue>,
    /// One marker per thread in the file.
    pub thread_starters: Vec<String>,
    /// Texts of the dropped "iMessage with …" notices.
    pub conversation_notices: Vec<String>,
}

impl NormalizedArchive {
    pub fn new(values: Vec<TaggedValue>, thread_starters: Vec<String>) -> Self {
        Self {
            values,
            thread_starters,
            conversation_notices: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_notices(mut self, notices: Vec<String>) -> Self {
        self.conversation_notices = notices;
        self
    }

    /// Number of `(sender, time, text)` groups.
    pub fn group_count(&self) -> usize {
        self.values.len() / 3
    }
}

/// Normalizes the converted text of one archive.
///
/// `participant` is the other party named by the file; `config` supplies
/// the owner's identity and carrier aliases.
///
/// # Errors
///
/// Returns [`IchatError::Structural`](crate::IchatError::Structural) when
/// the text breaks a structural expectation. The error carries no file name;
/// callers attach one with [`IchatError::in_file`](crate::IchatError::in_file).
///
/// # Example
///
/// ```rust
/// use ichatpack::config::ArchiveConfig;
/// use ichatpack::identity::Participant;
/// use ichatpack::normalizer::{TaggedValue, normalize};
///
/// let raw = "\
/// <string>$null</string>
/// <string>5F3C2A10-1B2C-4D5E-8F90-A1B2C3D4E5F6</string>
/// <string>E:mark@example.com</string>
/// <string>mark@example.com</string>
/// <key>Sender</key>
/// <integer>3</integer>
/// <key>NS.time</key>
/// <real>0</real>
/// <key>NS.string</key>
/// <string>hello</string>
/// ";
/// let archive = normalize(raw, &Participant::ungrouped("Mark"), &ArchiveConfig::default())?;
/// assert_eq!(archive.thread_starters, ["mark@example.com"]);
/// assert_eq!(archive.values[2], TaggedValue::String("hello".into()));
/// # Ok::<(), ichatpack::IchatError>(())
/// ```
pub fn normalize(
    raw: &str,
    participant: &Participant,
    config: &ArchiveConfig,
) -> Result<NormalizedArchive> {
    let lines = text::clean_lines(raw);
    let thread_starters = text::detect_thread_starters(&lines)?;
    debug!(lines = lines.len(), threads = thread_starters.len(), "cleaned lines");

    let lines = text::merge_runover_lines(lines)?;
    let lines = text::keep_relevant(lines)?;
    let lines =
        text::protect_contact_lookalikes(lines, &config.identity.email, &participant.emails);
    let lines = text::gate_by_key(lines);
    let tagged = text::to_values(lines)?;
    debug!(values = tagged.len(), "key-gated values");

    let classifier = ContactClassifier::new(
        &config.identity,
        &config.carrier_aliases,
        participant,
        &thread_starters,
    );

    let tagged = values::substitute_attachments(tagged);
    let tagged = values::merge_media(tagged);
    let scan = values::drop_conversation_notices(tagged);
    let tagged = values::strip_leading_contacts(scan.values, &classifier);
    let tagged = values::collapse_orphan_timestamps(tagged);
    let tagged = values::infer_timestamps(tagged, scan.latest_seconds, &classifier)?;
    let tagged = values::trim_trailing(tagged, &classifier);
    let tagged = values::resolve_sender_string_time(tagged, &classifier)?;
    let tagged = values::resolve_adjacent_strings(tagged, &classifier)?;
    values::check_shape(&tagged)?;

    debug!(
        groups = tagged.len() / 3,
        notices = scan.notices.len(),
        "normalized archive"
    );
    Ok(NormalizedArchive::new(tagged, thread_starters).with_notices(scan.notices))
}
