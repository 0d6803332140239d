//! Name groups and participant resolution.
//!
//! A name group maps a canonical participant name to the alternate
//! identifiers (other names, phone numbers, emails) the same person shows up
//! under in archive file names. The table is user supplied JSON:
//!
//! ```json
//! {
//!   "Mark": ["Mark M", "+15550001111", "mark@example.com"],
//!   "Dan": ["dan@example.com"]
//! }
//! ```
//!
//! Alias sets must be pairwise disjoint or the table is rejected at load
//! time, which keeps [`NameGroups::primary_name`] unambiguous.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::{IchatError, Result};
use crate::parsing::patterns;

/// Canonical participant name → alternate identifiers.
///
/// # Example
///
/// ```rust
/// use ichatpack::identity::NameGroups;
///
/// let groups = NameGroups::from_json_str(r#"{"Mark": ["mark@example.com", "+15550001111"]}"#)?;
/// assert_eq!(groups.primary_name("mark@example.com"), "Mark");
/// assert_eq!(groups.primary_name("Mark"), "Mark");
/// assert_eq!(groups.primary_name("Someone Else"), "Someone Else");
/// # Ok::<(), ichatpack::IchatError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameGroups {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl NameGroups {
    /// Creates an empty table. Every name is its own canonical name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from canonical names and alias lists.
    ///
    /// Duplicates inside one list are collapsed; an alias claimed by two
    /// canonical names is an [`IchatError::NameGroups`] error.
    pub fn from_groups<I, K, V, A>(groups: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let groups: BTreeMap<String, BTreeSet<String>> = groups
            .into_iter()
            .map(|(name, aliases)| (name.into(), aliases.into_iter().map(Into::into).collect()))
            .collect();

        let total: usize = groups.values().map(BTreeSet::len).sum();
        let union: BTreeSet<&String> = groups.values().flatten().collect();
        if total != union.len() {
            let mut seen = BTreeSet::new();
            let shared: BTreeSet<&str> = groups
                .values()
                .flatten()
                .filter(|alias| !seen.insert(alias.as_str()))
                .map(String::as_str)
                .collect();
            return Err(IchatError::name_groups(format!(
                "name groups must be pairwise disjoint, shared aliases: {}",
                shared.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }

        Ok(Self { groups })
    }

    /// Parses a table from a JSON object of string arrays.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(content)?;
        Self::from_groups(raw)
    }

    /// Loads a table from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Number of canonical names.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if the table has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the canonical name for `name`.
    ///
    /// `name` itself when it is a canonical name, the owning group when it
    /// is an alias, and `name` unchanged otherwise.
    pub fn primary_name<'a>(&'a self, name: &'a str) -> &'a str {
        if let Some((primary, _)) = self.groups.get_key_value(name) {
            return primary;
        }
        self.groups
            .iter()
            .find(|(_, aliases)| aliases.contains(name))
            .map(|(primary, _)| primary.as_str())
            .unwrap_or(name)
    }

    /// Returns every identifier of the group `name` belongs to.
    ///
    /// For a name outside every group this is just the name itself.
    pub fn all_names(&self, name: &str) -> BTreeSet<String> {
        let primary = self.primary_name(name);
        self.groups
            .get(primary)
            .cloned()
            .unwrap_or_else(|| BTreeSet::from([primary.to_string()]))
    }

    /// Returns the email-shaped identifiers of the group `name` belongs to.
    pub fn emails(&self, name: &str) -> Vec<String> {
        self.all_names(name)
            .into_iter()
            .filter(|alias| patterns::email().is_match(alias))
            .collect()
    }

    /// Resolves everything the pipeline needs to know about the other
    /// participant of one archive.
    pub fn participant(&self, raw_name: &str) -> Participant {
        Participant {
            raw_name: raw_name.to_string(),
            primary_name: self.primary_name(raw_name).to_string(),
            emails: self.emails(raw_name),
        }
    }
}

/// The other participant of one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Identifier as captured from the file name
    pub raw_name: String,
    /// Canonical name records are attributed and merged under
    pub primary_name: String,
    /// Email aliases used to recognise leaked contact info
    pub emails: Vec<String>,
}

impl Participant {
    /// A participant that belongs to no name group.
    pub fn ungrouped(raw_name: impl Into<String>) -> Self {
        let raw_name: String = raw_name.into();
        NameGroups::new().participant(&raw_name)
    }
}
