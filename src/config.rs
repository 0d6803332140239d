//! Configuration types for archive parsing.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies:
//!
//! - [`SelfIdentity`] - who "you" are in the archives (email, names)
//! - [`CarrierAliases`] - carrier-reformatted numbers and their raw forms
//! - [`ArchiveConfig`] - everything a parse run needs besides name groups
//!
//! All of them deserialize from JSON, so a run can be configured from a file:
//!
//! ```json
//! {
//!   "identity": {
//!     "email": "me@example.com",
//!     "name": "Jane Doe",
//!     "display_name": "Jane"
//!   },
//!   "debug_mode": true
//! }
//! ```
//!
//! # Example
//!
//! ```rust
//! use ichatpack::config::{ArchiveConfig, SelfIdentity};
//!
//! let config = ArchiveConfig::new()
//!     .with_identity(SelfIdentity::new("me@example.com", "Jane Doe", "Jane"))
//!     .with_debug_mode(true);
//!
//! assert!(config.identity.is_contact_id("e:me@example.com"));
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default archive file suffix.
pub const DEFAULT_FILE_SUFFIX: &str = ".ichat";

/// First year archive discovery looks at when no years are given.
pub const DEFAULT_START_YEAR: i32 = 2012;

/// The archive owner's own identity.
///
/// Messages archives identify the local account by its iCloud email, in a
/// few spellings (`e:`, `e:EMAIL`, `EMAIL`). Those spellings are the
/// self contact ids the normalizer strips and the assembler uses to decide
/// who started a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfIdentity {
    /// iCloud / iMessage email of the archive owner
    pub email: String,

    /// Full name as it may leak into archive strings (default: empty)
    pub name: String,

    /// How the owner appears as a sender in parsed output (default: "Me")
    pub display_name: String,
}

impl Default for SelfIdentity {
    fn default() -> Self {
        Self {
            email: String::new(),
            name: String::new(),
            display_name: "Me".to_string(),
        }
    }
}

impl SelfIdentity {
    /// Creates an identity from email, full name and display name.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns the contact ids that identify the owner in archives.
    pub fn contact_ids(&self) -> Vec<String> {
        let mut ids = vec!["e:".to_string()];
        if !self.email.is_empty() {
            ids.push(format!("e:{}", self.email));
            ids.push(self.email.clone());
        }
        ids
    }

    /// Returns `true` if `value` is one of the owner's contact ids.
    pub fn is_contact_id(&self, value: &str) -> bool {
        value == "e:"
            || (!self.email.is_empty()
                && (value == self.email
                    || value.strip_prefix("e:").is_some_and(|rest| rest == self.email)))
    }

    /// Returns `true` if `value` is the owner's full name.
    pub fn is_name(&self, value: &str) -> bool {
        !self.name.is_empty() && value == self.name
    }
}

/// Numbers some carriers rewrite before they reach the archive.
///
/// When the other participant's identifier is one of `formatted`, any of
/// the `raw` strings in the file is contact info for that participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierAliases {
    /// Identifiers as they appear in archive file names
    pub formatted: Vec<String>,

    /// The raw numbers those identifiers are stored as
    pub raw: Vec<String>,
}

impl CarrierAliases {
    /// Creates an alias table.
    pub fn new<F, R>(formatted: F, raw: R) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            formatted: formatted.into_iter().map(Into::into).collect(),
            raw: raw.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `other_name` is a carrier-formatted number and
    /// `value` one of the raw numbers.
    pub fn matches(&self, other_name: &str, value: &str) -> bool {
        self.formatted.iter().any(|f| f == other_name) && self.raw.iter().any(|r| r == value)
    }
}

/// Configuration for parsing a set of archives.
///
/// # Example
///
/// ```rust
/// use ichatpack::config::ArchiveConfig;
///
/// let config = ArchiveConfig::default();
/// assert_eq!(config.file_suffix, ".ichat");
/// assert!(!config.debug_mode);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// The archive owner's identity
    pub identity: SelfIdentity,

    /// Carrier-reformatted number aliases
    pub carrier_aliases: CarrierAliases,

    /// Attach sender codes and file names to every message (default: false)
    pub debug_mode: bool,

    /// Archive file suffix (default: ".ichat")
    pub file_suffix: String,

    /// First year to discover when no years are given (default: 2012)
    pub start_year: i32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            identity: SelfIdentity::default(),
            carrier_aliases: CarrierAliases::default(),
            debug_mode: false,
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            start_year: DEFAULT_START_YEAR,
        }
    }
}

impl ArchiveConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Sets the archive owner's identity.
    #[must_use]
    pub fn with_identity(mut self, identity: SelfIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Sets the carrier alias table.
    #[must_use]
    pub fn with_carrier_aliases(mut self, aliases: CarrierAliases) -> Self {
        self.carrier_aliases = aliases;
        self
    }

    /// Enables or disables debug metadata on messages.
    #[must_use]
    pub fn with_debug_mode(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Sets the archive file suffix.
    #[must_use]
    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    /// Sets the first discovery year.
    #[must_use]
    pub fn with_start_year(mut self, year: i32) -> Self {
        self.start_year = year;
        self
    }

    /// Returns the default discovery years: `start_year` through `current`.
    pub fn default_years(&self, current: i32) -> Vec<i32> {
        (self.start_year..=current).collect()
    }
}
