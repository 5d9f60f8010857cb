//! Read-only inspection of a target directory: is it currently minified, and
//! which of its files have backups.

use crate::cache::Cache;
use crate::report::FileError;
use crate::util;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Status {
    pub directory: PathBuf,

    /// Whether the directory has a cache folder, i.e., it was minified and not
    /// yet restored.
    pub minified: bool,

    /// Names of the files with a backup in the cache folder.
    pub cached: Vec<OsString>,

    /// Names of live files without a backup. Only populated for minified
    /// directories; these files would not be touched by a restore.
    pub unbacked: Vec<OsString>,
}

pub fn status(directory: &Path, cache_name: &str) -> Result<Status> {
    if !directory.is_dir() {
        return Err(Error::MissingDirectory(directory.to_owned()));
    }

    let cache = Cache::new(directory, cache_name);
    let mut status = Status {
        directory: directory.to_owned(),
        minified: cache.exists(),
        cached: Vec::new(),
        unbacked: Vec::new(),
    };
    if !status.minified {
        return Ok(status);
    }

    let (cached, failures) = cache.files();
    if let Some(err) = failures.into_iter().next() {
        return Err(Error::File(err));
    }
    status.cached = cached.into_iter().map(|f| f.name).collect();

    let (live, failures) = util::regular_files(directory);
    if let Some(err) = failures.into_iter().next() {
        return Err(Error::File(err));
    }
    status.unbacked = live
        .into_iter()
        .map(|f| f.name)
        .filter(|name| !status.cached.contains(name))
        .collect();

    Ok(status)
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Returned when the target directory doesn't exist or isn't a directory.
    MissingDirectory(PathBuf),

    /// Returned when the directory or its cache folder can't be listed.
    File(FileError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingDirectory(path) => {
                write!(f, "Directory '{}' does not exist", path.display())
            }
            Error::File(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingDirectory(_) => None,
            Error::File(err) => Some(err),
        }
    }
}
