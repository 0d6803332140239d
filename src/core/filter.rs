//! Filter messages by date range and sender.
//!
//! # Filter Types
//!
//! | Filter | Method | Description |
//! |--------|--------|-------------|
//! | Date from | [`with_date_from`](FilterConfig::with_date_from) | Messages on or after date |
//! | Date to | [`with_date_to`](FilterConfig::with_date_to) | Messages on or before date |
//! | Sender | [`with_sender`](FilterConfig::with_sender) | Messages from specific sender |
//!
//! # Examples
//!
//! ```
//! use ichatpack::core::filter::{FilterConfig, apply_filters};
//! use ichatpack::Message;
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> ichatpack::Result<()> {
//! let messages = vec![
//!     Message::new("Mark", Utc.with_ymd_and_hms(2014, 1, 1, 12, 0, 0).unwrap(), "Old"),
//!     Message::new("Me", Utc.with_ymd_and_hms(2014, 6, 15, 12, 0, 0).unwrap(), "New"),
//! ];
//!
//! let config = FilterConfig::new()
//!     .with_date_from("2014-06-01")?
//!     .with_date_to("2014-12-31")?;
//!
//! let filtered = apply_filters(messages, &config);
//! assert_eq!(filtered.len(), 1);
//! assert_eq!(filtered[0].message, "New");
//! # Ok(())
//! # }
//! ```
//!
//! # Behavior Notes
//!
//! - Every record has a timestamp; inferred ones are filtered like real ones
//! - Sender matching is case-insensitive for ASCII characters
//! - Multiple filters are combined with AND logic

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::Message;
use crate::error::{IchatError, Result};

/// Configuration for filtering messages by date and sender.
///
/// Filters are combined with AND logic: a message must match all active
/// filters to be included in the result.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Include only messages on or after this timestamp.
    pub after: Option<DateTime<Utc>>,

    /// Include only messages on or before this timestamp.
    pub before: Option<DateTime<Utc>>,

    /// Include only messages from this sender (case-insensitive).
    pub from: Option<String>,
}

impl FilterConfig {
    /// Creates a new empty filter configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start date filter (inclusive). Date format: `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`IchatError::InvalidDate`] if the format is invalid.
    pub fn with_date_from(mut self, date_str: &str) -> Result<Self> {
        self.after = Some(parse_date(date_str)?.and_time(NaiveTime::MIN).and_utc());
        Ok(self)
    }

    /// Sets the end date filter (inclusive). Date format: `YYYY-MM-DD`.
    ///
    /// The whole day is included, down to its last microsecond.
    ///
    /// # Errors
    ///
    /// Returns [`IchatError::InvalidDate`] if the format is invalid.
    pub fn with_date_to(mut self, date_str: &str) -> Result<Self> {
        let end_of_day =
            NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
        self.before = Some(parse_date(date_str)?.and_time(end_of_day).and_utc());
        Ok(self)
    }

    /// Sets the sender filter.
    ///
    /// ```
    /// use ichatpack::core::filter::FilterConfig;
    ///
    /// // Matches "Mark", "mark", "MARK"
    /// let config = FilterConfig::new().with_sender("Mark");
    /// ```
    #[must_use]
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.from = Some(sender.into());
        self
    }

    /// Sets the start timestamp directly.
    #[must_use]
    pub fn with_after(mut self, dt: DateTime<Utc>) -> Self {
        self.after = Some(dt);
        self
    }

    /// Sets the end timestamp directly.
    #[must_use]
    pub fn with_before(mut self, dt: DateTime<Utc>) -> Self {
        self.before = Some(dt);
        self
    }

    /// Returns `true` if any filter is active.
    pub fn is_active(&self) -> bool {
        self.after.is_some() || self.before.is_some() || self.from.is_some()
    }

    /// Returns `true` if date filters are active.
    pub fn has_date_filter(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }

    /// Returns `true` if a message passes every active filter.
    pub fn matches(&self, msg: &Message) -> bool {
        if self
            .from
            .as_ref()
            .is_some_and(|from| !msg.sender.eq_ignore_ascii_case(from))
        {
            return false;
        }
        if self.after.is_some_and(|after| msg.timestamp < after) {
            return false;
        }
        !self.before.is_some_and(|before| msg.timestamp > before)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| IchatError::invalid_date(date_str))
}

/// Filters messages, keeping those that match all active filters.
///
/// If no filters are active, returns the original messages unchanged.
pub fn apply_filters(messages: Vec<Message>, config: &FilterConfig) -> Vec<Message> {
    if !config.is_active() {
        return messages;
    }
    messages.into_iter().filter(|msg| config.matches(msg)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_msg(sender: &str, content: &str, day: &str) -> Message {
        let naive = NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap();
        let ts = naive.and_hms_opt(12, 0, 0).unwrap().and_utc();
        Message::new(sender, ts, content)
    }

    #[test]
    fn test_filter_by_sender() {
        let messages = vec![
            make_msg("Mark", "Hello", "2014-01-01"),
            make_msg("Me", "Hi", "2014-01-01"),
            make_msg("mark", "Bye", "2014-01-01"),
        ];

        let filtered = apply_filters(messages, &FilterConfig::new().with_sender("Mark"));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|m| m.sender.eq_ignore_ascii_case("Mark")));
    }

    #[test]
    fn test_filter_by_date_range() {
        let messages = vec![
            make_msg("Mark", "Old", "2014-01-01"),
            make_msg("Mark", "Mid", "2014-03-15"),
            make_msg("Mark", "New", "2014-06-15"),
        ];

        let config = FilterConfig::new()
            .with_date_from("2014-03-01")
            .unwrap()
            .with_date_to("2014-03-31")
            .unwrap();
        let filtered = apply_filters(messages, &config);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].message, "Mid");
    }

    #[test]
    fn test_date_to_includes_whole_day() {
        let messages = vec![make_msg("Mark", "Noon", "2014-03-01")];
        let config = FilterConfig::new().with_date_to("2014-03-01").unwrap();
        assert_eq!(apply_filters(messages, &config).len(), 1);
    }

    #[test]
    fn test_invalid_date() {
        let err = FilterConfig::new().with_date_from("03/01/2014").unwrap_err();
        assert!(err.is_invalid_date());
        assert!(FilterConfig::new().with_date_to("2014-13-01").is_err());
    }

    #[test]
    fn test_combined_filters() {
        let messages = vec![
            make_msg("Mark", "a", "2014-01-01"),
            make_msg("Me", "b", "2014-06-01"),
            make_msg("Mark", "c", "2014-06-01"),
        ];
        let config = FilterConfig::new()
            .with_sender("Mark")
            .with_date_from("2014-05-01")
            .unwrap();
        let filtered = apply_filters(messages, &config);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].message, "c");
    }

    #[test]
    fn test_no_filters_passthrough() {
        let messages = vec![make_msg("Mark", "a", "2014-01-01")];
        let config = FilterConfig::new();
        assert!(!config.is_active());
        assert_eq!(apply_filters(messages, &config).len(), 1);
    }
}
