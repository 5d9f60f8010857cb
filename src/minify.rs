//! Exports the [`minify`] function, which backs up every regular file in a
//! target directory into its [`Cache`] and then rewrites the file in place
//! with the bytes removed by [`crate::strip`].

use crate::cache::{self, Cache};
use crate::report::{Backup, Entry, FileError, Outcome, Report};
use crate::strip::{is_stripped, strip};
use crate::util::{self, File};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// What [`minify`] does when the target directory already has a cache folder,
/// i.e., when it is minified a second time without a restore in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingCache {
    /// Minify anyway, but never replace a file's existing backup. Files
    /// without a backup (e.g., added since the last minify) are backed up as
    /// usual.
    Preserve,

    /// Refuse to minify the directory.
    Refuse,
}

impl Default for ExistingCache {
    fn default() -> Self {
        ExistingCache::Preserve
    }
}

/// Options for [`minify`].
#[derive(Debug, Clone)]
pub struct Options {
    /// The name of the cache folder inside the target directory.
    pub cache_name: String,

    pub existing_cache: ExistingCache,

    /// If set, compute the report without creating the cache folder or
    /// writing any file.
    pub dry_run: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            cache_name: cache::DEFAULT_NAME.to_owned(),
            existing_cache: ExistingCache::default(),
            dry_run: false,
        }
    }
}

/// Minifies every regular file directly inside `directory`. Failures on
/// individual files are collected into the returned [`Report`] and don't stop
/// the remaining files from being processed; nothing is rolled back.
pub fn minify(directory: &Path, options: &Options) -> Result<Report> {
    if !directory.is_dir() {
        return Err(Error::MissingDirectory(directory.to_owned()));
    }

    let cache = Cache::new(directory, &options.cache_name);
    if cache.exists() && options.existing_cache == ExistingCache::Refuse {
        return Err(Error::CacheExists(cache.path().to_owned()));
    }
    if !options.dry_run {
        cache.create()?;
    }

    let mut report = Report::new(directory);
    report.dry_run = options.dry_run;
    let (files, failures) = util::regular_files(directory);
    report.failures.extend(failures);

    for file in files {
        match minify_file(&cache, &file, options.dry_run) {
            Ok(entry) => report.entries.push(entry),
            Err(err) => {
                tracing::warn!("{}", err);
                report.failures.push(err);
            }
        }
    }

    tracing::info!(
        directory = %directory.display(),
        files = report.entries.len(),
        failures = report.failures.len(),
        bytes_saved = report.bytes_saved(),
        dry_run = options.dry_run,
        "minified directory"
    );
    Ok(report)
}

fn minify_file(cache: &Cache, file: &File, dry_run: bool) -> std::result::Result<Entry, FileError> {
    let backup = if cache.contains(&file.name) {
        tracing::debug!(file = %file.path.display(), "keeping existing backup");
        Backup::Kept
    } else {
        if !dry_run {
            cache.backup(file)?;
        }
        Backup::Created
    };

    let contents = util::read(&file.path)?;
    let outcome = if is_stripped(&contents) {
        Outcome::Unchanged
    } else {
        let stripped = strip(&contents);
        if !dry_run {
            util::write(&file.path, &stripped)?;
        }
        Outcome::Minified {
            before: contents.len(),
            after: stripped.len(),
        }
    };
    tracing::debug!(file = %file.path.display(), ?backup, ?outcome, "minified file");

    Ok(Entry {
        name: file.name.clone(),
        backup,
        outcome,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for minifying a directory. These are problems with the
/// directory as a whole; per-file problems are reported in [`Report`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the target directory doesn't exist or isn't a directory.
    MissingDirectory(PathBuf),

    /// Returned when the directory already has a cache folder and
    /// [`ExistingCache::Refuse`] is in effect.
    CacheExists(PathBuf),

    /// Returned when the cache folder can't be created.
    Cache(cache::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingDirectory(path) => {
                write!(f, "Directory '{}' does not exist", path.display())
            }
            Error::CacheExists(path) => write!(
                f,
                "Cache folder '{}' already exists; restore before minifying again",
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
            Error::CacheExists(_) => None,
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

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_minify_scenario() -> TestResult {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("a.html"), "<p>\n\thello\n</p>")?;

        let report = minify(dir.path(), &Options::default())?;

        assert!(report.is_success());
        assert_eq!("<p>hello</p>", fs::read_to_string(dir.path().join("a.html"))?);
        assert_eq!(
            "<p>\n\thello\n</p>",
            fs::read_to_string(dir.path().join(cache::DEFAULT_NAME).join("a.html"))?
        );
        let entry = report.entry("a.html").ok_or("missing entry")?;
        assert_eq!(Backup::Created, entry.backup);
        assert_eq!(
            Outcome::Minified {
                before: 15,
                after: 12
            },
            entry.outcome
        );
        assert_eq!(3, report.bytes_saved());
        Ok(())
    }

    #[test]
    fn test_minify_empty_directory_creates_empty_cache() -> TestResult {
        let dir = TempDir::new()?;
        let report = minify(dir.path(), &Options::default())?;
        assert!(report.entries.is_empty());
        let cache = dir.path().join(cache::DEFAULT_NAME);
        assert!(cache.is_dir());
        assert_eq!(0, fs::read_dir(cache)?.count());
        Ok(())
    }

    #[test]
    fn test_minify_leaves_subdirectories_alone() -> TestResult {
        let dir = TempDir::new()?;
        fs::create_dir(dir.path().join("nested"))?;
        fs::write(dir.path().join("nested").join("b.html"), "\n")?;
        let report = minify(dir.path(), &Options::default())?;
        assert!(report.entries.is_empty());
        assert_eq!("\n", fs::read_to_string(dir.path().join("nested").join("b.html"))?);
        Ok(())
    }

    #[test]
    fn test_minify_unchanged_file() -> TestResult {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("a.css"), "p{margin:0}")?;
        let report = minify(dir.path(), &Options::default())?;
        let entry = report.entry("a.css").ok_or("missing entry")?;
        assert_eq!(Outcome::Unchanged, entry.outcome);
        assert_eq!(Backup::Created, entry.backup);
        Ok(())
    }

    #[test]
    fn test_minify_twice_preserves_original_backup() -> TestResult {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("a.html"), "<p>\n\thello\n</p>")?;

        minify(dir.path(), &Options::default())?;
        fs::write(dir.path().join("b.html"), "<b>\n</b>")?;
        let report = minify(dir.path(), &Options::default())?;

        let cache = dir.path().join(cache::DEFAULT_NAME);
        assert_eq!("<p>\n\thello\n</p>", fs::read_to_string(cache.join("a.html"))?);
        assert_eq!("<b>\n</b>", fs::read_to_string(cache.join("b.html"))?);
        let a = report.entry("a.html").ok_or("missing entry")?;
        assert_eq!(Backup::Kept, a.backup);
        assert_eq!(Outcome::Unchanged, a.outcome);
        let b = report.entry("b.html").ok_or("missing entry")?;
        assert_eq!(Backup::Created, b.backup);
        Ok(())
    }

    #[test]
    fn test_minify_twice_refused() -> TestResult {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("a.html"), "<p>\n</p>")?;
        let options = Options {
            existing_cache: ExistingCache::Refuse,
            ..Options::default()
        };

        minify(dir.path(), &options)?;
        match minify(dir.path(), &options) {
            Err(Error::CacheExists(_)) => {}
            other => panic!("expected Error::CacheExists, found {:?}", other),
        }
        assert_eq!(
            "<p>\n</p>",
            fs::read_to_string(dir.path().join(cache::DEFAULT_NAME).join("a.html"))?
        );
        Ok(())
    }

    #[test]
    fn test_minify_missing_directory() {
        match minify(Path::new("/nonexistent/squish/_layouts"), &Options::default()) {
            Err(Error::MissingDirectory(_)) => {}
            other => panic!("expected Error::MissingDirectory, found {:?}", other),
        }
    }

    #[test]
    fn test_minify_dry_run_writes_nothing() -> TestResult {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("a.html"), "<p>\n\thello\n</p>")?;
        let options = Options {
            dry_run: true,
            ..Options::default()
        };

        let report = minify(dir.path(), &options)?;

        assert!(report.dry_run);
        assert_eq!(3, report.bytes_saved());
        assert_eq!("<p>\n\thello\n</p>", fs::read_to_string(dir.path().join("a.html"))?);
        assert!(!dir.path().join(cache::DEFAULT_NAME).exists());
        Ok(())
    }

    #[test]
    fn test_minify_custom_cache_name() -> TestResult {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("a.html"), "\ta")?;
        let options = Options {
            cache_name: ".originals".to_owned(),
            ..Options::default()
        };
        minify(dir.path(), &options)?;
        assert_eq!("\ta", fs::read_to_string(dir.path().join(".originals").join("a.html"))?);
        assert!(!dir.path().join(cache::DEFAULT_NAME).exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_minify_continues_after_file_failure() -> TestResult {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new()?;
        let locked = dir.path().join("a.html");
        fs::write(&locked, "<p>\n</p>")?;
        fs::write(dir.path().join("b.html"), "<b>\n</b>")?;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

        // Root can read anything, so there's nothing to observe.
        if fs::read(&locked).is_ok() {
            return Ok(());
        }

        let report = minify(dir.path(), &Options::default())?;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644))?;

        assert!(!report.is_success());
        assert_eq!(1, report.failures.len());
        assert_eq!(locked, report.failures[0].path);
        assert_eq!("<b></b>", fs::read_to_string(dir.path().join("b.html"))?);
        Ok(())
    }
}
