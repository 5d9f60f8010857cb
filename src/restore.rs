//! Exports the [`restore`] function, which undoes [`crate::minify::minify`]
//! by copying the cached originals back over the live files and then deleting
//! the cache folder.

use crate::cache::{self, Cache};
use crate::report::{Backup, Entry, FileError, Op, Outcome, Report};
use crate::util::{self, File};
use std::fmt;
use std::path::{Path, PathBuf};

/// Restores every file backed up in `directory`'s cache folder named
/// `cache_name`. Files deleted since the minify are recreated.
///
/// The cache folder is deleted only if every file was restored. Otherwise it is
/// left in place (so the restore can be retried) and the failures are listed in
/// the returned [`Report`].
pub fn restore(directory: &Path, cache_name: &str) -> Result<Report> {
    if !directory.is_dir() {
        return Err(Error::MissingDirectory(directory.to_owned()));
    }

    let cache = Cache::new(directory, cache_name);
    if !cache.exists() {
        return Err(Error::MissingCache(cache.path().to_owned()));
    }

    let mut report = Report::new(directory);
    let (files, failures) = cache.files();
    report.failures.extend(failures);

    for file in files {
        match restore_file(directory, &file) {
            Ok(entry) => report.entries.push(entry),
            Err(err) => {
                tracing::warn!("{}", err);
                report.failures.push(err);
            }
        }
    }

    if report.is_success() {
        cache.remove()?;
        report.cache_removed = true;
    } else {
        tracing::warn!(
            cache = %cache.path().display(),
            "keeping cache folder because some files were not restored"
        );
    }

    tracing::info!(
        directory = %directory.display(),
        files = report.entries.len(),
        failures = report.failures.len(),
        cache_removed = report.cache_removed,
        "restored directory"
    );
    Ok(report)
}

fn restore_file(directory: &Path, file: &File) -> std::result::Result<Entry, FileError> {
    let target = directory.join(&file.name);
    let contents = util::read(&file.path)?;
    let fail = |e| FileError::new(&target, Op::Restore, e);

    // A symlink at the live path is replaced rather than written through, so
    // nothing outside the target directory is touched.
    if let Ok(meta) = std::fs::symlink_metadata(&target) {
        if meta.file_type().is_symlink() {
            tracing::debug!(file = %target.display(), "replacing symlink");
            std::fs::remove_file(&target).map_err(fail)?;
        }
    }
    std::fs::write(&target, &contents).map_err(fail)?;
    tracing::debug!(file = %target.display(), "restored file");
    Ok(Entry {
        name: file.name.clone(),
        backup: Backup::Untouched,
        outcome: Outcome::Restored,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for restoring a directory. These are problems with the
/// directory as a whole; per-file problems are reported in [`Report`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the target directory doesn't exist or isn't a directory.
    MissingDirectory(PathBuf),

    /// Returned when the directory has no cache folder, i.e., there is
    /// nothing to restore. The directory is left untouched.
    MissingCache(PathBuf),

    /// Returned when the cache folder can't be deleted after every file was
    /// restored.
    Cache(cache::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingDirectory(path) => {
                write!(f, "Directory '{}' does not exist", path.display())
            }
            Error::MissingCache(path) => write!(
                f,
                "Nothing to restore: cache folder '{}' does not exist",
                path.display()
            ),
            Error::Cache(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingDirectory(_) => None,
            Error::MissingCache(_) => None,
            Error::Cache(err) => Some(err),
        }
    }
}

impl From<cache::Error> for Error {
    /// Converts [`cache::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: cache::Error) -> Error {
        Error::Cache(err)
    }
}
