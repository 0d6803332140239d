//! Finding and converting raw archives.
//!
//! Messages keeps one directory per day under its archive root:
//!
//! ```text
//! Archive/
//!   2014-03-01/
//!     Mark on 2014-03-01 at 10.00.00.ichat
//!     Mark on 2014-03-01 at 10.00.00-1.ichat
//!     Chat with Mark, Dan on 2014-03-01 at 11.00.00.ichat
//! ```
//!
//! Raw archives are binary property lists. [`copy_archives`] selects the
//! ones to keep and hands each to a [`Converter`], which writes
//! `2014-03-01_Mark on 2014-03-01 at 10.00.00.ichat` into the output
//! directory as XML text.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{Datelike, Utc};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::ArchiveConfig;
use crate::error::{IchatError, Result};
use crate::parser::file_name_of;
use crate::parsing::{dedupe_filenames, matches_years};

/// Prefix of group conversations, which carry no single other participant.
pub const GROUP_CHAT_PREFIX: &str = "Chat with";

/// Recursively finds raw archives for `years` (all years when empty).
///
/// Hidden files and group chats are skipped. Results are sorted.
///
/// # Errors
///
/// - [`IchatError::Walk`] if a directory can't be read
/// - [`IchatError::InvalidFormat`] if a selected file lacks `suffix`
pub fn discover_archives(
    root: impl AsRef<Path>,
    years: &[i32],
    suffix: &str,
) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root.as_ref()) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with('.')
            || name.starts_with(GROUP_CHAT_PREFIX)
            || !matches_years(name, years)
        {
            continue;
        }
        found.push(entry.into_path());
    }

    if let Some(stray) = found.iter().find(|path| !path.to_string_lossy().ends_with(suffix)) {
        return Err(IchatError::invalid_format(
            "archive",
            format!(
                "unexpected file without {suffix} suffix: {}",
                stray.display()
            ),
        ));
    }

    found.sort();
    debug!(root = %root.as_ref().display(), found = found.len(), "discovered archives");
    Ok(found)
}

/// Lists converted archives in `dir` for `years` (all years when empty).
///
/// Returns sorted file names.
pub fn list_archives(dir: impl AsRef<Path>, years: &[i32], suffix: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            if name.ends_with(suffix) && matches_years(&name, years) {
                names.push(name);
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Name a converted archive gets: `PARENTDIR_FILENAME`.
///
/// ```rust
/// use ichatpack::archive::converted_name;
/// use std::path::Path;
///
/// let source = Path::new("Archive/2014-03-01/Mark on 2014-03-01 at 10.00.00.ichat");
/// let name = converted_name(source)?;
/// assert_eq!(name, "2014-03-01_Mark on 2014-03-01 at 10.00.00.ichat");
/// # Ok::<(), ichatpack::IchatError>(())
/// ```
pub fn converted_name(source: &Path) -> Result<String> {
    let file = file_name_of(source)?;
    let parent = source
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IchatError::invalid_filename(
                source.display().to_string(),
                "archive has no parent directory",
            )
        })?;
    Ok(format!("{parent}_{file}"))
}

/// Turns a raw archive into text the normalizer can read.
pub trait Converter: Send + Sync {
    /// Converts `source` into `dest_dir`, returning the written path.
    ///
    /// # Errors
    ///
    /// Returns [`IchatError::Converter`] if conversion fails.
    fn convert(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf>;
}

/// Runs `plutil -convert xml1 SRC -o DEST`.
#[derive(Debug, Clone)]
pub struct PlutilConverter {
    program: PathBuf,
}

impl Default for PlutilConverter {
    fn default() -> Self {
        Self {
            program: PathBuf::from("plutil"),
        }
    }
}

impl PlutilConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a different `plutil` executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

impl Converter for PlutilConverter {
    fn convert(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let dest = dest_dir.join(converted_name(source)?);
        let output = Command::new(&self.program)
            .args(["-convert", "xml1"])
            .arg(source)
            .arg("-o")
            .arg(&dest)
            .output()
            .map_err(|e| {
                IchatError::converter(
                    source,
                    format!("failed to run {}: {e}", self.program.display()),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IchatError::converter(
                source,
                format!("{} ({})", output.status, stderr.trim()),
            ));
        }
        Ok(dest)
    }
}

/// Discovers, deduplicates and converts the raw archives of `years`.
///
/// An empty `years` means `config.start_year` through the current year.
/// Returns the converted file names, sorted.
///
/// # Errors
///
/// Discovery errors, [`IchatError::DuplicateFiles`] /
/// [`IchatError::InvalidFilename`] from deduplication, and the first
/// conversion failure.
pub fn copy_archives(
    archive_dir: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    years: &[i32],
    converter: &dyn Converter,
    config: &ArchiveConfig,
) -> Result<Vec<String>> {
    let years = if years.is_empty() {
        config.default_years(Utc::now().year())
    } else {
        years.to_vec()
    };
    info!(?years, "copying archives");

    let found = discover_archives(archive_dir, &years, &config.file_suffix)?;
    info!(found = found.len(), "found archives");
    let paths: Vec<String> = found.iter().map(|p| p.to_string_lossy().into_owned()).collect();
    let kept = dedupe_filenames(&paths, &config.file_suffix)?;

    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let convert = |path: &String| -> Result<String> {
        let written = converter.convert(Path::new(path), out_dir)?;
        Ok(file_name_of(&written)?.to_string())
    };
    #[cfg(feature = "parallel")]
    let converted: Result<Vec<String>> = kept.par_iter().map(convert).collect();
    #[cfg(not(feature = "parallel"))]
    let converted: Result<Vec<String>> = kept.iter().map(convert).collect();

    let mut converted = converted?;
    converted.sort();
    info!(converted = converted.len(), "converted archives");
    Ok(converted)
}
