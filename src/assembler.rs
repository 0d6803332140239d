//! Message assembler.
//!
//! Maps the normalizer's `(sender code, timestamp, text)` groups to
//! [`Message`] records. Sender codes are file-scoped integers; which
//! participant a code belongs to depends on how many threads the file holds
//! and on which side started each thread.
//!
//! # Sender resolution
//!
//! | Threads | Codes | Mapping (ascending codes) |
//! |---------|-------|---------------------------|
//! | 1 | 1 | starter side |
//! | 1 | 2 | starter side, other side |
//! | 2 | 1 | first thread's starter |
//! | 2 | 2 | starter of each thread |
//! | 2 | 3 | split by the middle code (see [`resolve_senders`]) |
//! | 2 | 4 | both sides of each thread |
//!
//! Anything else is a structural violation, except that a single-thread
//! file with more than two codes is attributed to [`UNKNOWN_SENDER`] when
//! the file carried a conversation notice or the other party is the
//! owner's own name.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::Message;
use crate::config::ArchiveConfig;
use crate::error::{IchatError, Result};
use crate::identity::Participant;
use crate::normalizer::{NormalizedArchive, TaggedValue, values};
use crate::parsing::{datetime_from_cocoa, unescape_xml_chars};

/// Sender label used when codes can't be attributed.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Codes in this range never appear in a three-code, two-thread file.
const RESERVED_CODES: std::ops::RangeInclusive<i64> = 15..=29;

/// Highest code that still belongs to the first of two threads.
const FIRST_THREAD_MAX_CODE: i64 = 14;

/// Who is on each side of one thread. `starter` has the lower code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadOrder {
    pub starter: String,
    pub responder: String,
}

impl ThreadOrder {
    /// Orders a thread by its start marker.
    pub fn from_marker(
        marker: &str,
        self_name: &str,
        other_name: &str,
        config: &ArchiveConfig,
    ) -> Self {
        let (starter, responder) = if config.identity.is_contact_id(marker) {
            (self_name, other_name)
        } else {
            (other_name, self_name)
        };
        Self {
            starter: starter.to_string(),
            responder: responder.to_string(),
        }
    }
}

/// Thread structure of one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadLayout {
    Single(ThreadOrder),
    Dual(ThreadOrder, ThreadOrder),
}

impl ThreadLayout {
    /// Builds the layout from the file's thread-start markers.
    ///
    /// # Errors
    ///
    /// Returns a structural violation unless there are one or two markers.
    pub fn from_markers(
        markers: &[String],
        self_name: &str,
        other_name: &str,
        config: &ArchiveConfig,
    ) -> Result<Self> {
        let order =
            |marker: &String| ThreadOrder::from_marker(marker, self_name, other_name, config);
        match markers {
            [only] => Ok(ThreadLayout::Single(order(only))),
            [first, second] => Ok(ThreadLayout::Dual(order(first), order(second))),
            other => Err(IchatError::structural(
                format!(
                    "expected 1 or 2 thread start markers, found {}",
                    other.len()
                ),
                other.join(", "),
            )),
        }
    }
}

/// Maps ascending sender codes to participant names.
///
/// In a two-thread file with three codes, a middle code of at most 14 means
/// the first thread holds two codes; otherwise the second does. A code in
/// 15..=29 makes the split ambiguous and is rejected.
///
/// # Errors
///
/// Returns a structural violation when the code count doesn't fit the
/// layout.
pub fn resolve_senders(codes: &[i64], layout: &ThreadLayout) -> Result<BTreeMap<i64, String>> {
    let names: Vec<&str> = match (layout, codes) {
        (ThreadLayout::Single(order), [_]) => vec![order.starter.as_str()],
        (ThreadLayout::Single(order), [_, _]) => {
            vec![order.starter.as_str(), order.responder.as_str()]
        }
        (ThreadLayout::Dual(first, _), [_]) => vec![first.starter.as_str()],
        (ThreadLayout::Dual(first, second), [_, _]) => {
            vec![first.starter.as_str(), second.starter.as_str()]
        }
        (ThreadLayout::Dual(first, second), [_, middle, _]) => {
            if codes.iter().any(|code| RESERVED_CODES.contains(code)) {
                return Err(unresolvable(
                    codes,
                    "a code in 15..=29 makes the thread split ambiguous",
                ));
            }
            if *middle <= FIRST_THREAD_MAX_CODE {
                vec![first.starter.as_str(), first.responder.as_str(), second.starter.as_str()]
            } else {
                vec![first.starter.as_str(), second.starter.as_str(), second.responder.as_str()]
            }
        }
        (ThreadLayout::Dual(first, second), [_, _, _, _]) => vec![
            first.starter.as_str(),
            first.responder.as_str(),
            second.starter.as_str(),
            second.responder.as_str(),
        ],
        (ThreadLayout::Single(_), _) => {
            return Err(unresolvable(codes, "a single thread holds 1 or 2 sender codes"));
        }
        (ThreadLayout::Dual(..), _) => {
            return Err(unresolvable(codes, "two threads hold 1 to 4 sender codes"));
        }
    };
    Ok(codes
        .iter()
        .copied()
        .zip(names.into_iter().map(str::to_string))
        .collect())
}

fn unresolvable(codes: &[i64], reason: &str) -> IchatError {
    let list: Vec<String> = codes.iter().map(ToString::to_string).collect();
    IchatError::structural(
        format!("cannot resolve {} sender code(s): {reason}", codes.len()),
        list.join(", "),
    )
}

/// Distinct sender codes in ascending order.
fn sender_codes(values: &[TaggedValue]) -> Vec<i64> {
    let mut codes: Vec<i64> = values
        .iter()
        .filter_map(|value| match value {
            TaggedValue::Integer(code) => Some(*code),
            _ => None,
        })
        .collect();
    codes.sort_unstable();
    codes.dedup();
    codes
}

/// Builds the records of one normalized archive, sorted by timestamp.
///
/// Records are attributed to `participant.primary_name` and to the owner's
/// display name. In debug mode every record carries its sender code.
///
/// # Errors
///
/// Returns a structural violation when the values aren't in
/// `(Integer, Real, String)` groups, when the senders can't be resolved or
/// when a timestamp can't be represented.
pub fn assemble(
    normalized: &NormalizedArchive,
    participant: &Participant,
    config: &ArchiveConfig,
) -> Result<Vec<Message>> {
    values::check_shape(&normalized.values)?;

    let self_name = config.identity.display_name.as_str();
    let other_name = participant.primary_name.as_str();
    let layout =
        ThreadLayout::from_markers(&normalized.thread_starters, self_name, other_name, config)?;
    let codes = sender_codes(&normalized.values);

    let unattributable = matches!(layout, ThreadLayout::Single(_))
        && codes.len() > 2
        && (!normalized.conversation_notices.is_empty() || config.identity.is_name(other_name));
    let senders = if unattributable {
        warn!(
            other = other_name,
            codes = codes.len(),
            "sender codes don't fit a single thread, labelling them {UNKNOWN_SENDER}"
        );
        codes
            .iter()
            .map(|&code| (code, UNKNOWN_SENDER.to_string()))
            .collect()
    } else {
        resolve_senders(&codes, &layout)?
    };

    let mut records = Vec::with_capacity(normalized.group_count());
    for group in normalized.values.chunks_exact(3) {
        let [
            TaggedValue::Integer(code),
            TaggedValue::Real { seconds, inferred },
            TaggedValue::String(text),
        ] = group
        else {
            return Err(IchatError::structural(
                "group is not (sender, time, text)",
                group.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
            ));
        };

        let sender = senders.get(code).ok_or_else(|| {
            IchatError::structural("sender code was not resolved", code.to_string())
        })?;
        let timestamp = datetime_from_cocoa(*seconds)
            .ok_or_else(|| {
                IchatError::structural("timestamp is out of range", seconds.to_string())
            })?;

        let mut record = Message::new(sender.clone(), timestamp, unescape_xml_chars(text))
            .with_inferred_timestamp(*inferred);
        if config.debug_mode {
            record = record.with_sender_id(*code);
        }
        records.push(record);
    }

    records.sort_by_key(|record| record.timestamp);
    debug!(records = records.len(), other = other_name, "assembled archive");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::config::SelfIdentity;

    fn int(v: i64) -> TaggedValue {
        TaggedValue::Integer(v)
    }

    fn real(seconds: f64) -> TaggedValue {
        TaggedValue::Real {
            seconds,
            inferred: false,
        }
    }

    fn s(text: &str) -> TaggedValue {
        TaggedValue::String(text.to_string())
    }

    fn config() -> ArchiveConfig {
        ArchiveConfig::default().with_identity(SelfIdentity::new(
            "me@example.com",
            "Jane Doe",
            "Jane",
        ))
    }

    fn archive(values: Vec<TaggedValue>, markers: &[&str]) -> NormalizedArchive {
        NormalizedArchive::new(values, markers.iter().map(|m| (*m).to_string()).collect())
    }

    fn senders(records: &[Message]) -> Vec<&str> {
        records.iter().map(Message::sender).collect()
    }

    #[test]
    fn test_single_record_for_other_party() {
        let normalized = archive(vec![int(3), real(0.0), s("hello")], &["+15550001111"]);
        let records = assemble(&normalized, &Participant::ungrouped("Mark"), &config()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sender, "Mark");
        assert_eq!(
            records[0].timestamp,
            Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(records[0].message, "hello");
        assert!(!records[0].is_timestamp_inferred);
        assert!(!records[0].has_debug_metadata());
    }

    #[test]
    fn test_self_marker_orders_self_first() {
        let normalized = archive(
            vec![int(3), real(0.0), s("hi"), int(7), real(1.0), s("hey")],
            &["e:me@example.com"],
        );
        let records = assemble(&normalized, &Participant::ungrouped("Mark"), &config()).unwrap();
        assert_eq!(senders(&records), vec!["Jane", "Mark"]);
    }

    #[test]
    fn test_records_sorted_stably() {
        let normalized = archive(
            vec![
                int(3), real(5.0), s("later"),
                int(7), real(1.0), s("first"),
                int(3), real(1.0), s("second"),
            ],
            &["e:"],
        );
        let records = assemble(&normalized, &Participant::ungrouped("Mark"), &config()).unwrap();
        let texts: Vec<&str> = records.iter().map(Message::message).collect();
        assert_eq!(texts, vec!["first", "second", "later"]);
    }

    #[test]
    fn test_unescape_and_inferred_flag() {
        let normalized = archive(
            vec![
                int(3),
                TaggedValue::Real { seconds: 86400.0, inferred: true },
                s("&lt;b&gt; &amp; me&at;example.com &tel;+15550001111"),
            ],
            &["x"],
        );
        let records = assemble(&normalized, &Participant::ungrouped("Mark"), &config()).unwrap();
        assert_eq!(records[0].message, "<b> & me@example.com +15550001111");
        assert!(records[0].is_timestamp_inferred);
        assert_eq!(
            records[0].timestamp,
            Utc.with_ymd_and_hms(2001, 1, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_debug_mode_sender_id() {
        let normalized = archive(vec![int(3), real(0.0), s("hello")], &["x"]);
        let records = assemble(
            &normalized,
            &Participant::ungrouped("Mark"),
            &config().with_debug_mode(true),
        )
        .unwrap();
        assert_eq!(records[0].sender_id, Some(3));
    }

    #[test]
    fn test_dual_thread_resolution() {
        let config = config();
        let layout = ThreadLayout::from_markers(
            &["e:".to_string(), "+15550001111".to_string()],
            "Jane",
            "Mark",
            &config,
        )
        .unwrap();

        let two = resolve_senders(&[2, 9], &layout).unwrap();
        assert_eq!(two[&2], "Jane");
        assert_eq!(two[&9], "Mark");

        let low_middle = resolve_senders(&[1, 4, 40], &layout).unwrap();
        assert_eq!(
            low_middle.values().collect::<Vec<_>>(),
            ["Jane", "Mark", "Mark"]
        );

        let high_middle = resolve_senders(&[1, 40, 41], &layout).unwrap();
        assert_eq!(
            high_middle.values().collect::<Vec<_>>(),
            ["Jane", "Mark", "Jane"]
        );

        let four = resolve_senders(&[1, 2, 3, 4], &layout).unwrap();
        assert_eq!(
            four.values().collect::<Vec<_>>(),
            ["Jane", "Mark", "Mark", "Jane"]
        );

        assert!(resolve_senders(&[1, 20, 40], &layout).unwrap_err().is_structural());
        assert!(resolve_senders(&[1, 2, 3, 4, 5], &layout).is_err());
    }

    #[test]
    fn test_single_thread_too_many_codes() {
        let normalized = archive(
            vec![int(1), real(0.0), s("a"), int(2), real(0.0), s("b"), int(3), real(0.0), s("c")],
            &["x"],
        );
        let err = assemble(&normalized, &Participant::ungrouped("Mark"), &config()).unwrap_err();
        assert!(err.to_string().contains("single thread"));
    }

    #[test]
    fn test_unknown_fallback_after_notice() {
        let normalized = archive(
            vec![int(1), real(0.0), s("a"), int(2), real(0.0), s("b"), int(3), real(0.0), s("c")],
            &["x"],
        )
        .with_notices(vec!["iMessage with mark@example.com".to_string()]);
        let records = assemble(&normalized, &Participant::ungrouped("Mark"), &config()).unwrap();
        assert!(records.iter().all(|r| r.sender == UNKNOWN_SENDER));
    }

    #[test]
    fn test_unknown_fallback_for_own_name() {
        let normalized = archive(
            vec![int(1), real(0.0), s("a"), int(2), real(0.0), s("b"), int(3), real(0.0), s("c")],
            &["x"],
        );
        let records =
            assemble(&normalized, &Participant::ungrouped("Jane Doe"), &config()).unwrap();
        assert_eq!(senders(&records), vec![UNKNOWN_SENDER; 3]);
    }

    #[test]
    fn test_marker_count() {
        let normalized = archive(vec![int(3), real(0.0), s("hello")], &[]);
        assert!(assemble(&normalized, &Participant::ungrouped("Mark"), &config()).is_err());

        let normalized = archive(vec![int(3), real(0.0), s("hello")], &["a", "b", "c"]);
        let err = assemble(&normalized, &Participant::ungrouped("Mark"), &config()).unwrap_err();
        assert!(err.to_string().contains("found 3"));
    }

    #[test]
    fn test_bad_shape_rejected() {
        let normalized = archive(vec![int(3), s("hello"), real(0.0)], &["x"]);
        assert!(assemble(&normalized, &Participant::ungrouped("Mark"), &config()).is_err());
    }

    #[test]
    fn test_out_of_range_timestamp() {
        let normalized = archive(vec![int(3), real(1e300), s("hello")], &["x"]);
        let err = assemble(&normalized, &Participant::ungrouped("Mark"), &config()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
