//! Defines the [`Cache`] type, the hidden folder inside a target directory
//! which holds the pre-minify originals of its files.

use crate::report::{FileError, Op};
use crate::util::{self, File};
use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// The cache folder name used when none is configured.
pub const DEFAULT_NAME: &str = ".squish-cache";

/// A cache folder. Constructing a [`Cache`] doesn't touch the file system; the
/// folder is created lazily by [`Cache::create`].
pub struct Cache {
    path: PathBuf,
}

impl Cache {
    /// Locates the cache folder named `name` inside `directory`.
    pub fn new(directory: &Path, name: &str) -> Cache {
        Cache {
            path: directory.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Creates the cache folder if it doesn't already exist. Fails if the
    /// reserved name is taken by something other than a directory.
    pub fn create(&self) -> Result<()> {
        if self.exists() {
            return Ok(());
        }
        tracing::debug!(path = %self.path.display(), "creating cache folder");
        std::fs::create_dir(&self.path).map_err(|err| Error::Create {
            path: self.path.clone(),
            err,
        })
    }

    /// Returns `true` if a backup for `name` is present.
    pub fn contains(&self, name: &OsStr) -> bool {
        self.path.join(name).is_file()
    }

    /// Copies `file` into the cache folder under its own name, replacing any
    /// earlier backup of the same name.
    pub fn backup(&self, file: &File) -> std::result::Result<(), FileError> {
        std::fs::copy(&file.path, self.path.join(&file.name))
            .map(|_| ())
            .map_err(|e| FileError::new(&file.path, Op::Backup, e))
    }

    /// Lists the backed-up files. See [`util::regular_files`].
    pub fn files(&self) -> (Vec<File>, Vec<FileError>) {
        util::regular_files(&self.path)
    }

    /// Deletes the cache folder and everything in it. Deleting a cache folder
    /// that doesn't exist is not an error.
    pub fn remove(&self) -> Result<()> {
        tracing::debug!(path = %self.path.display(), "removing cache folder");
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(e) => match e.kind() {
                io::ErrorKind::NotFound => Ok(()),
                _ => Err(Error::Remove {
                    path: self.path.clone(),
                    err: e,
                }),
            },
        }
    }
}

/// Checks that `name` can be used as a cache folder name: a single, normal
/// path component so the cache always lives directly inside the target
/// directory.
pub fn validate_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::InvalidName(name.to_owned())),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents an error managing the cache folder itself. Failures backing up
/// individual files are [`FileError`]s instead.
#[derive(Debug)]
pub enum Error {
    /// Returned when the cache folder can't be created.
    Create { path: PathBuf, err: io::Error },

    /// Returned when the cache folder can't be deleted.
    Remove { path: PathBuf, err: io::Error },

    /// Returned for cache folder names that aren't a single path component.
    InvalidName(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Create { path, err } => {
                write!(f, "Creating cache folder '{}': {}", path.display(), err)
            }
            Error::Remove { path, err } => {
                write!(f, "Removing cache folder '{}': {}", path.display(), err)
            }
            Error::InvalidName(name) => write!(
                f,
                "Invalid cache folder name '{}': must be a single path component",
                name
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Create { path: _, err } => Some(err),
            Error::Remove { path: _, err } => Some(err),
            Error::InvalidName(_) => None,
        }
    }
}
