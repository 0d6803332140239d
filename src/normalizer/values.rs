//! Value passes: from tagged values to `(sender, time, text)` groups.
//!
//! Each pass converges within one call and leaves the relative order of the
//! surviving values untouched.

use tracing::debug;

use super::TaggedValue;
use super::contact::ContactClassifier;
use crate::error::{IchatError, Result};
use crate::parsing::patterns;

/// Placeholder text for attachments.
pub const MEDIA: &str = "(MEDIA)";

const OBJECT_REPLACEMENT: char = '\u{FFFC}';
const NOTICE_MARKER: &str = "iMessage with";

/// Replaces attachment UUIDs and object-replacement characters with
/// [`MEDIA`].
pub fn substitute_attachments(values: Vec<TaggedValue>) -> Vec<TaggedValue> {
    values
        .into_iter()
        .map(|value| match value {
            TaggedValue::String(text) if patterns::uuid_text().is_match(&text) => {
                TaggedValue::String(MEDIA.to_string())
            }
            TaggedValue::String(text) if text.contains(OBJECT_REPLACEMENT) => {
                TaggedValue::String(text.replace(OBJECT_REPLACEMENT, MEDIA))
            }
            other => other,
        })
        .collect()
}

/// Folds a media placeholder into the string right before it.
pub fn merge_media(mut values: Vec<TaggedValue>) -> Vec<TaggedValue> {
    let mut i = 0;
    while i + 1 < values.len() {
        if values[i + 1].as_str() == Some(MEDIA) {
            if let TaggedValue::String(text) = &mut values[i] {
                text.push(' ');
                text.push_str(MEDIA);
                values.remove(i + 1);
                continue;
            }
        }
        i += 1;
    }
    values
}

/// Output of [`drop_conversation_notices`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NoticeScan {
    pub values: Vec<TaggedValue>,
    pub notices: Vec<String>,
    /// Timestamp of the last notice, seeds timestamp inference.
    pub latest_seconds: Option<f64>,
}

/// Removes synthetic `(0, time, "iMessage with …")` groups.
pub fn drop_conversation_notices(mut values: Vec<TaggedValue>) -> NoticeScan {
    let mut notices: Vec<String> = Vec::new();
    let mut latest_seconds = None;
    let mut i = 0;
    while i + 2 < values.len() {
        if let [
            TaggedValue::Integer(0),
            TaggedValue::Real { seconds, .. },
            TaggedValue::String(text),
        ] = &values[i..i + 3]
        {
            if text.contains(NOTICE_MARKER) {
                latest_seconds = Some(*seconds);
                if !notices.contains(text) {
                    notices.push(text.clone());
                }
                values.drain(i..i + 3);
                continue;
            }
        }
        i += 1;
    }
    NoticeScan {
        values,
        notices,
        latest_seconds,
    }
}

/// Removes contact info sitting right after the first value.
pub fn strip_leading_contacts(
    mut values: Vec<TaggedValue>,
    classifier: &ContactClassifier<'_>,
) -> Vec<TaggedValue> {
    while values.len() > 1 && classifier.is_contact_info(&values[1]) {
        values.remove(1);
    }
    values
}

/// Drops sender codes and timestamps left behind by deleted blank messages.
///
/// Of two adjacent sender codes the first goes; a `sender, time, sender,
/// time` run loses its leading pair.
pub fn collapse_orphan_timestamps(mut values: Vec<TaggedValue>) -> Vec<TaggedValue> {
    let mut i = 0;
    while i + 1 < values.len() {
        if values[i].is_integer() && values[i + 1].is_integer() {
            values.remove(i);
            continue;
        }
        if i + 3 < values.len()
            && values[i].is_integer()
            && values[i + 1].is_real()
            && values[i + 2].is_integer()
            && values[i + 3].is_real()
        {
            values.drain(i..i + 2);
            continue;
        }
        i += 1;
    }
    values
}

/// Gives every sender code a timestamp.
///
/// A sender code followed by contact info loses the contact info; one
/// followed by anything else that isn't a timestamp gets a copy of the
/// latest timestamp seen so far, flagged as inferred.
pub fn infer_timestamps(
    mut values: Vec<TaggedValue>,
    mut latest_seconds: Option<f64>,
    classifier: &ContactClassifier<'_>,
) -> Result<Vec<TaggedValue>> {
    let mut inferred = 0usize;
    let mut i = 0;
    while i + 1 < values.len() {
        if let TaggedValue::Real { seconds, .. } = values[i] {
            latest_seconds = Some(seconds);
        }
        if values[i].is_integer() && !values[i + 1].is_real() {
            if classifier.is_contact_info(&values[i + 1]) {
                values.remove(i + 1);
                continue;
            }
            let seconds = latest_seconds.ok_or_else(|| {
                IchatError::structural(
                    "sender code has no timestamp and none precedes it",
                    values[i].to_string(),
                )
            })?;
            values.insert(
                i + 1,
                TaggedValue::Real {
                    seconds,
                    inferred: true,
                },
            );
            inferred += 1;
        }
        i += 1;
    }
    if inferred > 0 {
        debug!(inferred, "carried timestamps forward");
    }
    Ok(values)
}

/// Drops trailing contact info and dangling timestamps.
pub fn trim_trailing(
    mut values: Vec<TaggedValue>,
    classifier: &ContactClassifier<'_>,
) -> Vec<TaggedValue> {
    loop {
        let len = values.len();
        let integer_at = |back: usize| len >= back && values[len - back].is_integer();
        let removable = len > 0
            && !integer_at(3)
            && !integer_at(2)
            && values[len - 1].is_string()
            && classifier.is_contact_info(&values[len - 1]);
        if !removable {
            break;
        }
        values.pop();
    }
    while values.last().is_some_and(TaggedValue::is_real) {
        values.pop();
    }
    values
}

/// Removes contact info wedged between a sender code and its timestamp.
///
/// A string right after a sender code whose next non-string value is a
/// timestamp must be contact info; anything else is a structural error.
pub fn resolve_sender_string_time(
    mut values: Vec<TaggedValue>,
    classifier: &ContactClassifier<'_>,
) -> Result<Vec<TaggedValue>> {
    let mut i = 0;
    while i + 3 < values.len() {
        if values[i].is_integer() && values[i + 1].is_string() {
            let next_kind = values[i + 2..].iter().find(|value| !value.is_string());
            if next_kind.is_some_and(TaggedValue::is_real) {
                if !classifier.is_contact_info(&values[i + 1]) {
                    return Err(IchatError::structural(
                        "string between a sender code and a timestamp isn't contact info",
                        values[i + 1].to_string(),
                    ));
                }
                values.remove(i + 1);
                continue;
            }
        }
        i += 1;
    }
    Ok(values)
}

/// Resolves two adjacent strings by removing the one that is contact info
/// or the owner's own name.
pub fn resolve_adjacent_strings(
    mut values: Vec<TaggedValue>,
    classifier: &ContactClassifier<'_>,
) -> Result<Vec<TaggedValue>> {
    let mut i = 0;
    while i + 1 < values.len() {
        if !(values[i].is_string() && values[i + 1].is_string()) {
            i += 1;
            continue;
        }
        let pair = || format!("{} / {}", values[i], values[i + 1]);
        match (
            classifier.is_contact_or_own_name(&values[i]),
            classifier.is_contact_or_own_name(&values[i + 1]),
        ) {
            (true, false) => {
                values.remove(i);
            }
            (false, true) => {
                values.remove(i + 1);
            }
            (true, true) => {
                return Err(IchatError::structural(
                    "adjacent strings are both contact info",
                    pair(),
                ));
            }
            (false, false) => {
                return Err(IchatError::structural(
                    "adjacent strings where neither is contact info",
                    pair(),
                ));
            }
        }
    }
    Ok(values)
}

/// Checks the `(Integer, Real, String)` group shape.
pub fn check_shape(values: &[TaggedValue]) -> Result<()> {
    if values.len() % 3 != 0 {
        return Err(IchatError::structural_message(format!(
            "result has {} value(s), not a multiple of 3",
            values.len()
        )));
    }
    for (group, chunk) in values.chunks_exact(3).enumerate() {
        let expectations: [(&TaggedValue, fn(&TaggedValue) -> bool, &str); 3] = [
            (&chunk[0], TaggedValue::is_integer, "an <integer>"),
            (&chunk[1], TaggedValue::is_real, "a <real>"),
            (&chunk[2], TaggedValue::is_string, "a <string>"),
        ];
        for (offset, (value, is_expected, kind)) in expectations.into_iter().enumerate() {
            if !is_expected(value) {
                return Err(IchatError::structural(
                    format!("value {} should be {kind} value", group * 3 + offset),
                    value.to_string(),
                ));
            }
        }
    }
    Ok(())
}
