//! Contact-info recognition.
//!
//! Archives leak the participants' identifiers (phone numbers, emails,
//! account ids) into the string table next to real message bodies. The
//! classifier decides which string values are such leaks.

use super::TaggedValue;
use crate::config::{CarrierAliases, SelfIdentity};
use crate::identity::Participant;
use crate::parsing::patterns;

/// Decides whether a string value is contact info rather than a message.
#[derive(Debug, Clone, Copy)]
pub struct ContactClassifier<'a> {
    identity: &'a SelfIdentity,
    carrier_aliases: &'a CarrierAliases,
    participant: &'a Participant,
    thread_starters: &'a [String],
}

impl<'a> ContactClassifier<'a> {
    pub fn new(
        identity: &'a SelfIdentity,
        carrier_aliases: &'a CarrierAliases,
        participant: &'a Participant,
        thread_starters: &'a [String],
    ) -> Self {
        Self {
            identity,
            carrier_aliases,
            participant,
            thread_starters,
        }
    }

    /// Only string values can be contact info.
    pub fn is_contact_info(&self, value: &TaggedValue) -> bool {
        value.as_str().is_some_and(|text| self.is_contact_text(text))
    }

    /// Classifies the text of a string value.
    pub fn is_contact_text(&self, text: &str) -> bool {
        let other = self.participant.raw_name.as_str();

        patterns::phone_text().is_match(text)
            || (patterns::bare_phone_text().is_match(text) && text == other)
            || self.identity.is_contact_id(text)
            || self.thread_starters.iter().any(|starter| starter == text)
            || (patterns::automated_sender().is_match(other) && text == other)
            || self.carrier_aliases.matches(other, text)
            || self
                .participant
                .emails
                .iter()
                .any(|email| patterns::email().is_match(email) && text == email.to_lowercase())
    }

    /// Contact info, or the owner's own full name.
    pub fn is_contact_or_own_name(&self, value: &TaggedValue) -> bool {
        self.is_contact_info(value)
            || value.as_str().is_some_and(|text| self.identity.is_name(text))
    }
}
