//! Archive file name conventions.
//!
//! Messages names archives `IDENT on YYYY-MM-DD at HH.MM.SS.ichat` inside a
//! per-day directory; conversion prefixes the directory name, giving
//! `YYYY-MM-DD_IDENT on YYYY-MM-DD at HH.MM.SS.ichat`. A second archive with
//! the same name gets a `-N` counter before the suffix.

use std::collections::BTreeMap;

use tracing::info;

use super::patterns;
use crate::error::{IchatError, Result};

/// First conversation date whose same-name archives are distinct
/// conversations rather than snapshots of one.
pub const DISTINCT_DUPLICATES_SINCE: &str = "2014-07-25";

/// Extracts the other participant's identifier from a converted file name.
///
/// ```rust
/// use ichatpack::parsing::other_name_from_filename;
///
/// let name = other_name_from_filename("2014-03-01_Mark on 2014-03-01 at 10.00.00.ichat")?;
/// assert_eq!(name, "Mark");
/// # Ok::<(), ichatpack::IchatError>(())
/// ```
pub fn other_name_from_filename(file_name: &str) -> Result<String> {
    patterns::other_name()
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            IchatError::invalid_filename(file_name, "expected 'YYYY-MM-DD_NAME on YYYY-MM-DD at '")
        })
}

/// Returns the ` on YYYY-MM-DD at ` date of an archive name.
pub fn conversation_date(name: &str) -> Option<&str> {
    patterns::conversation_date()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Substring that selects archives of `year`.
pub fn year_marker(year: i32) -> String {
    format!(" on {year}-")
}

/// Returns `true` if `name` belongs to one of `years` (all names when empty).
pub fn matches_years(name: &str, years: &[i32]) -> bool {
    years.is_empty() || years.iter().any(|&year| name.contains(&year_marker(year)))
}

/// Splits a suffix-less name into its base and duplicate counter.
fn split_counter(name: &str) -> (&str, u64) {
    match patterns::duplicate_suffix().find(name) {
        Some(m) => {
            let counter = name[m.start() + 1..].parse().unwrap_or(u64::MAX);
            (&name[..m.start()], counter)
        }
        None => (name, 0),
    }
}

/// Resolves duplicate-numbered archives.
///
/// Before [`DISTINCT_DUPLICATES_SINCE`] every `-N` copy is a more complete
/// snapshot of the same conversation, so only the highest counter is kept.
/// From that date on, same-name archives are separate conversations and all
/// of them are kept.
///
/// # Errors
///
/// - [`IchatError::DuplicateFiles`] if a `-N` file appears without its base
/// - [`IchatError::InvalidFilename`] if a base carries no conversation date
///
/// ```rust
/// use ichatpack::parsing::dedupe_filenames;
///
/// let names = [
///     "Mark on 2013-01-01 at 10.00.00.ichat",
///     "Mark on 2013-01-01 at 10.00.00-1.ichat",
///     "Dan on 2015-01-01 at 10.00.00.ichat",
///     "Dan on 2015-01-01 at 10.00.00-1.ichat",
/// ];
/// let kept = dedupe_filenames(&names, ".ichat")?;
/// assert_eq!(kept, [
///     "Dan on 2015-01-01 at 10.00.00.ichat",
///     "Dan on 2015-01-01 at 10.00.00-1.ichat",
///     "Mark on 2013-01-01 at 10.00.00-1.ichat",
/// ]);
/// # Ok::<(), ichatpack::IchatError>(())
/// ```
pub fn dedupe_filenames<S: AsRef<str>>(names: &[S], suffix: &str) -> Result<Vec<String>> {
    let mut groups: BTreeMap<&str, Vec<(u64, &str)>> = BTreeMap::new();
    for name in names {
        let name = name.as_ref();
        let stem = name.strip_suffix(suffix).unwrap_or(name);
        let (base, counter) = split_counter(stem);
        groups.entry(base).or_default().push((counter, stem));
    }

    let missing: Vec<String> = groups
        .iter()
        .filter(|(_, variants)| !variants.iter().any(|&(counter, _)| counter == 0))
        .map(|(base, _)| (*base).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IchatError::DuplicateFiles { bases: missing });
    }

    let mut kept = Vec::new();
    for (base, mut variants) in groups {
        let date = conversation_date(base)
            .ok_or_else(|| IchatError::invalid_filename(base, "no ' on YYYY-MM-DD at ' date"))?;
        variants.sort_unstable();
        if date >= DISTINCT_DUPLICATES_SINCE {
            kept.extend(variants.iter().map(|(_, stem)| format!("{stem}{suffix}")));
        } else if let Some((_, stem)) = variants.last() {
            kept.push(format!("{stem}{suffix}"));
        }
    }

    info!(removed = names.len() - kept.len(), "deduplicated archive names");
    Ok(kept)
}
