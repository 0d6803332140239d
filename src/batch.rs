//! Parsing many converted archives at once.
//!
//! A structural problem in one archive costs only that archive: it is
//! recorded in [`BatchReport::failures`] and the rest of the batch goes on.
//! A file name that names no participant, or a name-group table that maps
//! an alias to two people, stops the whole batch.

use std::path::Path;
#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

use crate::core::processor::{Corpus, ProcessingStats};
use crate::error::{IchatError, Result};
use crate::parsers::{IChatParser, ParsedArchive};
use crate::parsing::other_name_from_filename;
use crate::progress::{Progress, ProgressCallback};

use crate::archive::list_archives;

/// An archive that couldn't be parsed.
#[derive(Debug)]
pub struct FileFailure {
    pub file_name: String,
    pub error: IchatError,
}

/// Outcome of [`parse_files`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records per owner, sorted and deduplicated
    pub corpus: Corpus,
    /// Archives skipped because of per-file errors, in file order
    pub failures: Vec<FileFailure>,
    /// Merge statistics
    pub stats: ProcessingStats,
    /// Archives in the batch
    pub files: usize,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Archives that parsed.
    pub fn parsed_count(&self) -> usize {
        self.files.saturating_sub(self.failures.len())
    }
}

/// Parses `names` from `dir` and merges the records per owner.
///
/// Archives are parsed in parallel with the `parallel` feature. Records
/// are merged in file order either way, so the result doesn't depend on
/// scheduling.
///
/// # Errors
///
/// Returns the first batch-fatal error (see
/// [`IchatError::is_batch_fatal`]). Every other error is collected into
/// the report.
pub fn parse_files(
    dir: impl AsRef<Path>,
    names: &[String],
    parser: &IChatParser,
    progress: Option<ProgressCallback>,
) -> Result<BatchReport> {
    let dir = dir.as_ref();
    // Fail before doing any work if a name has no participant.
    for name in names {
        other_name_from_filename(name)?;
    }

    let total = names.len();
    let results = run(dir, names, parser, progress.as_ref(), total);

    let mut report = BatchReport {
        files: total,
        ..BatchReport::default()
    };
    for (name, result) in names.iter().zip(results) {
        match result {
            Ok(archive) => report.corpus.extend(archive.owner, archive.messages),
            Err(error) if error.is_batch_fatal() => return Err(error),
            Err(error) => {
                warn!(file = %name, %error, "skipping archive");
                report.failures.push(FileFailure {
                    file_name: name.clone(),
                    error,
                });
            }
        }
    }

    report.stats = report.corpus.finalize();
    info!(
        files = total,
        failed = report.failures.len(),
        owners = report.corpus.len(),
        messages = report.stats.deduped_count,
        duplicates = report.stats.removed(),
        "parsed batch"
    );
    Ok(report)
}

/// Lists the converted archives of `years` in `dir` and parses them.
///
/// # Errors
///
/// Listing errors, then the errors of [`parse_files`].
pub fn parse_directory(
    dir: impl AsRef<Path>,
    years: &[i32],
    parser: &IChatParser,
    progress: Option<ProgressCallback>,
) -> Result<BatchReport> {
    let dir = dir.as_ref();
    let names = list_archives(dir, years, &parser.config().file_suffix)?;
    info!(dir = %dir.display(), files = names.len(), "parsing archives");
    parse_files(dir, &names, parser, progress)
}

#[cfg(feature = "parallel")]
fn run(
    dir: &Path,
    names: &[String],
    parser: &IChatParser,
    progress: Option<&ProgressCallback>,
    total: usize,
) -> Vec<Result<ParsedArchive>> {
    let done = AtomicUsize::new(0);
    let messages = AtomicUsize::new(0);
    let failures = AtomicUsize::new(0);

    names
        .par_iter()
        .map(|name| {
            let result = parser.parse_archive_file(&dir.join(name));
            match &result {
                Ok(archive) => messages.fetch_add(archive.messages.len(), Ordering::Relaxed),
                Err(_) => failures.fetch_add(1, Ordering::Relaxed),
            };
            let files = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(callback) = progress {
                callback(
                    Progress::new(files, Some(total), messages.load(Ordering::Relaxed))
                        .with_failures(failures.load(Ordering::Relaxed)),
                );
            }
            result
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run(
    dir: &Path,
    names: &[String],
    parser: &IChatParser,
    progress: Option<&ProgressCallback>,
    total: usize,
) -> Vec<Result<ParsedArchive>> {
    let mut messages = 0;
    let mut failures = 0;
    let mut results = Vec::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        let result = parser.parse_archive_file(&dir.join(name));
        match &result {
            Ok(archive) => messages += archive.messages.len(),
            Err(_) => failures += 1,
        }
        if let Some(callback) = progress {
            callback(Progress::new(idx + 1, Some(total), messages).with_failures(failures));
        }
        results.push(result);
    }
    results
}
