//! Defines the [`Report`], [`Entry`], and [`FileError`] types, which describe
//! what happened to each file when a directory was minified or restored.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The result of processing one target directory. A [`Report`] is returned
/// even when individual files failed; only problems with the directory itself
/// (e.g., it doesn't exist) are returned as errors by [`crate::minify`] and
/// [`crate::restore`].
#[derive(Debug)]
pub struct Report {
    /// The target directory that was processed.
    pub directory: PathBuf,

    /// One entry per file that was processed successfully, in file-name order.
    pub entries: Vec<Entry>,

    /// One entry per file that could not be processed.
    pub failures: Vec<FileError>,

    /// Whether the cache folder was deleted. Only a restore with no failures
    /// deletes it.
    pub cache_removed: bool,

    /// Whether this report describes a dry run, in which case nothing was
    /// written to disk.
    pub dry_run: bool,
}

impl Report {
    pub fn new(directory: &Path) -> Report {
        Report {
            directory: directory.to_owned(),
            entries: Vec::new(),
            failures: Vec::new(),
            cache_removed: false,
            dry_run: false,
        }
    }

    /// Returns `true` if every file in the directory was processed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The number of bytes removed across all minified files.
    pub fn bytes_saved(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry.outcome {
                Outcome::Minified { before, after } => before - after,
                _ => 0,
            })
            .sum()
    }

    /// The number of entries whose outcome matches `pred`.
    pub fn count(&self, pred: impl Fn(&Entry) -> bool) -> usize {
        self.entries.iter().filter(|entry| pred(entry)).count()
    }

    /// Looks up the entry for a file name.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// What happened to one file.
#[derive(Debug)]
pub struct Entry {
    /// The file's name within the target directory.
    pub name: OsString,

    /// What happened to the file's backup in the cache folder.
    pub backup: Backup,

    /// What happened to the live file.
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backup {
    /// The file was copied into the cache folder.
    Created,

    /// A cached copy from an earlier minify already existed and was kept so
    /// the true original isn't replaced by already-minified content.
    Kept,

    /// The cache folder wasn't touched for this file (restores).
    Untouched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was rewritten. `before` and `after` are byte counts.
    Minified { before: usize, after: usize },

    /// The file had nothing to strip and was left alone.
    Unchanged,

    /// The file was overwritten with its cached original.
    Restored,
}

/// The file operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Backup,
    Read,
    Write,
    Restore,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Op::List => "listing",
            Op::Backup => "backing up",
            Op::Read => "reading",
            Op::Write => "writing",
            Op::Restore => "restoring",
        })
    }
}

/// A failure on a single file. The path is the file the operation was acting
/// on, not necessarily the target directory.
#[derive(Debug)]
pub struct FileError {
    pub path: PathBuf,
    pub op: Op,
    pub err: io::Error,
}

impl FileError {
    pub fn new(path: &Path, op: Op, err: io::Error) -> FileError {
        FileError {
            path: path.to_owned(),
            op,
            err,
        }
    }
}

impl fmt::Display for FileError {
    /// Displays a [`FileError`] as presentable text, e.g.
    /// ``writing `_layouts/post.html`: permission denied``.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} `{}`: {}", self.op, self.path.display(), self.err)
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(name: &str, outcome: Outcome) -> Entry {
        Entry {
            name: OsString::from(name),
            backup: Backup::Created,
            outcome,
        }
    }

    #[test]
    fn test_bytes_saved() {
        let mut report = Report::new(Path::new("_layouts"));
        report.entries.push(entry(
            "a.html",
            Outcome::Minified {
                before: 10,
                after: 7,
            },
        ));
        report.entries.push(entry("b.html", Outcome::Unchanged));
        report.entries.push(entry(
            "c.html",
            Outcome::Minified {
                before: 4,
                after: 4,
            },
        ));
        assert_eq!(3, report.bytes_saved());
        assert_eq!(1, report.count(|e| e.outcome == Outcome::Unchanged));
        assert!(report.entry("b.html").is_some());
        assert!(report.entry("d.html").is_none());
        assert!(report.is_success());
    }

    #[test]
    fn test_file_error_display() {
        let err = FileError::new(
            Path::new("_layouts/post.html"),
            Op::Write,
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!("writing `_layouts/post.html`: denied", err.to_string());
    }
}
