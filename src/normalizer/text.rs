//! Line passes: from converter output to tagged values.
//!
//! These run on raw lines while the key structure is still present. Every
//! pass takes ownership of the line list and returns the corrected one.

use super::TaggedValue;
use crate::error::{IchatError, Result};
use crate::parsing::escape::{AT_MARKER, TEL_MARKER};
use crate::parsing::lines::{
    self, STRING_CLOSE, STRING_OPEN, first_containing, is_integer_line, is_key_line,
    is_real_line, is_string_line, strip_tags,
};
use crate::parsing::patterns;

const RELEVANT: [&str; 6] = [
    "<key>NS.time",
    "<key>NS.string",
    "<key>Sender</key>",
    "<string>",
    "<real>",
    "<integer>",
];

/// Drops attachment payload rows, strips tab padding and removes blank lines.
pub fn clean_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| !lines::is_data_line(line))
        .map(lines::strip_padding)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Collects the thread-start markers.
///
/// A marker follows a `<string>E:…` line whose predecessor is a UUID
/// string; an `SMS` service line right after it is skipped.
pub fn detect_thread_starters(lines: &[String]) -> Result<Vec<String>> {
    let mut starters = Vec::new();
    for i in 1..lines.len() {
        if !(lines[i].starts_with("<string>E:") && patterns::uuid_line().is_match(&lines[i - 1])) {
            continue;
        }
        let from = if lines.get(i + 1).is_some_and(|next| next == "<string>SMS</string>") {
            i + 2
        } else {
            i + 1
        };
        let line = first_containing(lines, from, STRING_OPEN).ok_or_else(|| {
            IchatError::structural("thread start has no following <string> value", &lines[i])
        })?;
        let starter = strip_tags(line).ok_or_else(|| {
            IchatError::structural("thread start marker is not a tagged line", line)
        })?;
        starters.push(starter);
    }
    Ok(starters)
}

/// Rejoins string values the converter split across lines.
pub fn merge_runover_lines(mut lines: Vec<String>) -> Result<Vec<String>> {
    loop {
        let len = lines.len();
        let runovers: Vec<usize> = (1..len.saturating_sub(1))
            .filter(|&idx| is_string_line(&lines[idx]) && !lines[idx].ends_with(STRING_CLOSE))
            .collect();
        if runovers.is_empty() {
            return Ok(lines);
        }

        for &idx in &runovers {
            let next = &lines[idx + 1];
            if next != STRING_CLOSE && next.starts_with('<') {
                return Err(IchatError::structural(
                    "unterminated <string> is followed by another tag",
                    format!("{}\n{}", lines[idx], next),
                ));
            }
        }

        let mut merged = Vec::with_capacity(len - runovers.len());
        let mut pending = runovers.iter().peekable();
        let mut iter = lines.into_iter().enumerate();
        while let Some((idx, mut line)) = iter.next() {
            if pending.peek() == Some(&&idx) {
                pending.next();
                if let Some((_, continuation)) = iter.next() {
                    line.push('\n');
                    line.push_str(&continuation);
                }
            }
            merged.push(line);
        }
        lines = merged;
    }
}

/// Keeps only key, value and string lines.
pub fn keep_relevant(lines: Vec<String>) -> Result<Vec<String>> {
    let kept: Vec<String> = lines
        .into_iter()
        .filter(|line| RELEVANT.iter().any(|needle| line.contains(needle)))
        .collect();
    if let Some(bad) = kept.iter().find(|l| !(l.starts_with('<') && l.ends_with('>'))) {
        return Err(IchatError::structural("relevant line is not a complete tag", bad));
    }
    Ok(kept)
}

/// Shields messages that are exactly an email address or phone number.
///
/// Such a message is followed later in the file by the matching `mailto:` or
/// `tel:` link value. Emails get `&at;` instead of `@` and phone numbers a
/// `&tel;` prefix so the contact-info classifier leaves them alone.
pub fn protect_contact_lookalikes(
    mut lines: Vec<String>,
    own_email: &str,
    other_emails: &[String],
) -> Vec<String> {
    for i in 0..lines.len().saturating_sub(1) {
        let line = &lines[i];
        let email_message = (!own_email.is_empty()
            && line.contains(own_email)
            && is_linked(&lines, i, own_email, "mailto"))
            || other_emails.iter().any(|email| {
                line.contains(email.as_str()) && is_linked(&lines, i, email, "mailto")
            });

        if email_message {
            lines[i] = lines[i].replace('@', AT_MARKER);
        } else if let Some(number) = patterns::phone_line()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        {
            if is_linked(&lines, i, &number, "tel") {
                lines[i] = lines[i].replace(STRING_OPEN, &format!("{STRING_OPEN}{TEL_MARKER}"));
            }
        }
    }
    lines
}

/// The first later line mentioning `needle` is its `scheme:` link value.
fn is_linked(lines: &[String], i: usize, needle: &str, scheme: &str) -> bool {
    first_containing(lines, i + 1, needle)
        .is_some_and(|line| line == format!("{STRING_OPEN}{scheme}:{needle}{STRING_CLOSE}"))
}

/// Keeps each value only when the key before it names its role, then drops
/// the keys.
///
/// `<string>` needs `NS.string`, `<real>` needs `NS.time` and `<integer>`
/// needs `Sender`. A value with nothing kept before it is dropped, as is
/// every empty string.
pub fn gate_by_key(lines: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let required_key = if is_string_line(&line) {
            Some("<key>NS.string")
        } else if is_real_line(&line) {
            Some("<key>NS.time")
        } else if is_integer_line(&line) {
            Some("<key>Sender")
        } else {
            None
        };

        if let Some(key) = required_key {
            match kept.last() {
                Some(previous) if previous.starts_with(key) => {}
                _ => continue,
            }
        }
        if line == "<string></string>" {
            continue;
        }
        kept.push(line);
    }
    kept.retain(|line| !is_key_line(line));
    kept
}

/// Converts filtered lines to tagged values.
pub fn to_values(lines: Vec<String>) -> Result<Vec<TaggedValue>> {
    lines.into_iter().map(|line| parse_value(&line)).collect()
}

fn parse_value(line: &str) -> Result<TaggedValue> {
    let inner = || strip_tags(line).unwrap_or_default();
    if is_string_line(line) {
        Ok(TaggedValue::String(inner()))
    } else if is_real_line(line) {
        inner()
            .trim()
            .parse::<f64>()
            .map(|seconds| TaggedValue::Real {
                seconds,
                inferred: false,
            })
            .map_err(|_| IchatError::structural("<real> value is not a number", line))
    } else if is_integer_line(line) {
        inner()
            .trim()
            .parse::<i64>()
            .map(TaggedValue::Integer)
            .map_err(|_| IchatError::structural("<integer> value is not a number", line))
    } else {
        Err(IchatError::structural("unexpected line after key filtering", line))
    }
}
