//! Searching message records.
//!
//! # Example
//!
//! ```
//! use ichatpack::core::search::{SearchOptions, search};
//! use ichatpack::Message;
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> ichatpack::Result<()> {
//! let ts = Utc.with_ymd_and_hms(2014, 3, 1, 12, 0, 0).unwrap();
//! let messages = vec![
//!     Message::new("Mark", ts, "Lunch tomorrow?"),
//!     Message::new("Me", ts, "Sure, lunch at noon"),
//! ];
//!
//! let hits = search(&messages, "LUNCH", &SearchOptions::default())?;
//! assert_eq!(hits.len(), 2);
//! assert_eq!(hits[1].span, 6..11);
//! # Ok(())
//! # }
//! ```

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::Message;
use crate::error::{IchatError, Result};

/// How [`search`] matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Case-insensitive matching (default: true)
    pub ignore_case: bool,
    /// Treat the query as a regular expression (default: false)
    pub regex: bool,
    /// Capture group whose span is reported in regex mode (default: whole match)
    pub group: Option<usize>,
    /// Rows of context on either side of a hit (default: 0)
    pub context: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            regex: false,
            group: None,
            context: 0,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }

    #[must_use]
    pub fn with_regex(mut self) -> Self {
        self.regex = true;
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }
}

/// One matching record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Position of the record in the searched slice
    pub index: usize,
    /// Byte range of the match inside the record's text
    pub span: Range<usize>,
    /// Records to show around the hit, clamped to the slice
    pub window: Range<usize>,
}

impl SearchHit {
    /// The matched text.
    pub fn matched<'a>(&self, messages: &'a [Message]) -> Option<&'a str> {
        messages.get(self.index)?.message.get(self.span.clone())
    }
}

enum Matcher {
    Pattern { regex: Regex, group: usize },
    Exact(String),
}

impl Matcher {
    fn build(query: &str, options: &SearchOptions) -> Result<Self> {
        if !options.regex && !options.ignore_case {
            return Ok(Matcher::Exact(query.to_string()));
        }
        let pattern = if options.regex { query.to_string() } else { regex::escape(query) };
        let regex = RegexBuilder::new(&pattern).case_insensitive(options.ignore_case).build()?;
        let group = options.group.filter(|_| options.regex).unwrap_or(0);
        if group >= regex.captures_len() {
            return Err(IchatError::invalid_format(
                "search",
                format!("pattern has no capture group {group}"),
            ));
        }
        Ok(Matcher::Pattern { regex, group })
    }

    fn find(&self, text: &str) -> Option<Range<usize>> {
        match self {
            Matcher::Exact(query) => {
                text.find(query.as_str()).map(|start| start..start + query.len())
            }
            Matcher::Pattern { regex, group: 0 } => regex.find(text).map(|m| m.range()),
            // a group that didn't take part in the match is no hit
            Matcher::Pattern { regex, group } => {
                regex.captures(text)?.get(*group).map(|m| m.range())
            }
        }
    }
}

/// Finds the records whose text matches `query`.
///
/// Substring search by default; with [`SearchOptions::regex`] the query is
/// a regular expression and the reported span is that of the whole match
/// or of [`SearchOptions::group`].
///
/// # Errors
///
/// - [`IchatError::Pattern`] if the regular expression doesn't compile
/// - [`IchatError::InvalidFormat`] if the requested group doesn't exist
pub fn search(
    messages: &[Message],
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<SearchHit>> {
    let matcher = Matcher::build(query, options)?;
    Ok(messages
        .iter()
        .enumerate()
        .filter_map(|(index, msg)| {
            let span = matcher.find(&msg.message)?;
            let window = index.saturating_sub(options.context)
                ..index.saturating_add(options.context).saturating_add(1).min(messages.len());
            Some(SearchHit { index, span, window })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn messages(texts: &[&str]) -> Vec<Message> {
        let ts = Utc.with_ymd_and_hms(2014, 3, 1, 12, 0, 0).unwrap();
        texts.iter().map(|t| Message::new("Mark", ts, *t)).collect()
    }

    #[test]
    fn test_substring_ignores_case_by_default() {
        let msgs = messages(&["Hello there", "nothing", "say HELLO"]);
        let hits = search(&msgs, "hello", &SearchOptions::default()).unwrap();
        assert_eq!(hits.iter().map(|h| h.index).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(hits[1].span, 4..9);
        assert_eq!(hits[1].matched(&msgs), Some("HELLO"));
    }

    #[test]
    fn test_substring_case_sensitive() {
        let msgs = messages(&["Hello", "hello"]);
        let hits = search(&msgs, "hello", &SearchOptions::new().with_case_sensitive()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 1);
    }

    #[test]
    fn test_substring_query_is_literal() {
        let msgs = messages(&["a.b", "axb"]);
        let hits = search(&msgs, "a.b", &SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_regex_group_span() {
        let msgs = messages(&["call me at 5551234", "no number"]);
        let options = SearchOptions::new().with_regex().with_group(1);
        let hits = search(&msgs, r"at (\d+)", &options).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].matched(&msgs), Some("5551234"));
    }

    #[test]
    fn test_regex_unmatched_group_is_no_hit() {
        let msgs = messages(&["abc"]);
        let options = SearchOptions::new().with_regex().with_group(2);
        assert!(search(&msgs, r"(a)|(z)", &options).unwrap().is_empty());
    }

    #[test]
    fn test_regex_errors() {
        let msgs = messages(&["abc"]);
        let err = search(&msgs, "(", &SearchOptions::new().with_regex()).unwrap_err();
        assert!(matches!(err, IchatError::Pattern(_)));

        let err = search(&msgs, "a", &SearchOptions::new().with_regex().with_group(1)).unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_context_window_clamped() {
        let msgs = messages(&["a", "b", "hit", "c"]);
        let hits = search(&msgs, "hit", &SearchOptions::new().with_context(5)).unwrap();
        assert_eq!(hits[0].window, 0..4);

        let hits = search(&msgs, "hit", &SearchOptions::new().with_context(1)).unwrap();
        assert_eq!(hits[0].window, 1..4);
    }
}
