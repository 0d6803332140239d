//! Merging records from many archives.
//!
//! The same conversation can be stored in several archives, so records are
//! merged per owner, sorted and deduplicated on
//! `(sender, timestamp, message)`. Messages sent twice within the same
//! second with identical text collapse into one.

use std::collections::{BTreeMap, HashSet};

use crate::Message;

/// Sorts records by timestamp and drops repeated
/// `(sender, timestamp, message)` records, keeping the first.
///
/// The sort is stable, so records with equal timestamps keep their order.
///
/// # Example
/// Input:  [("Mark", t1, "Hi"), ("Mark", t1, "Hi"), ("Mark", t1, "Hi!")]
/// Output: [("Mark", t1, "Hi"), ("Mark", t1, "Hi!")]
pub fn dedupe_messages(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by_key(|msg| msg.timestamp);
    let mut seen = HashSet::with_capacity(messages.len());
    messages.retain(|msg| seen.insert((msg.sender.clone(), msg.timestamp, msg.message.clone())));
    messages
}

/// Statistics about a merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub original_count: usize,
    pub deduped_count: usize,
}

impl ProcessingStats {
    /// Records removed as duplicates.
    pub fn removed(&self) -> usize {
        self.original_count.saturating_sub(self.deduped_count)
    }

    /// Share of records removed, in percent.
    pub fn duplicate_ratio(&self) -> f64 {
        if self.original_count == 0 {
            return 0.0;
        }
        (self.removed() as f64 / self.original_count as f64) * 100.0
    }
}

/// Records of a batch, keyed by owner (the canonical other participant).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    conversations: BTreeMap<String, Vec<Message>>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends records for `owner`. Call [`finalize`](Self::finalize) once
    /// everything is in.
    pub fn extend(&mut self, owner: impl Into<String>, messages: Vec<Message>) {
        self.conversations
            .entry(owner.into())
            .or_default()
            .extend(messages);
    }

    /// Merges another corpus into this one.
    pub fn merge(&mut self, other: Corpus) {
        for (owner, messages) in other.conversations {
            self.extend(owner, messages);
        }
    }

    /// Sorts and deduplicates every owner's records.
    pub fn finalize(&mut self) -> ProcessingStats {
        let mut stats = ProcessingStats::default();
        for messages in self.conversations.values_mut() {
            stats.original_count += messages.len();
            *messages = dedupe_messages(std::mem::take(messages));
            stats.deduped_count += messages.len();
        }
        stats
    }

    /// Records for `owner`.
    pub fn get(&self, owner: &str) -> Option<&[Message]> {
        self.conversations.get(owner).map(Vec::as_slice)
    }

    /// Owners in name order.
    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.conversations.keys().map(String::as_str)
    }

    /// Iterates `(owner, records)` in owner order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Message])> {
        self.conversations
            .iter()
            .map(|(owner, messages)| (owner.as_str(), messages.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Total records across owners.
    pub fn message_count(&self) -> usize {
        self.conversations.values().map(Vec::len).sum()
    }

    /// Every record, owner by owner.
    pub fn all_messages(&self) -> Vec<Message> {
        self.conversations.values().flatten().cloned().collect()
    }
}
