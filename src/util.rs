//! Small file-system helpers shared by [`crate::minify`], [`crate::restore`],
//! and [`crate::status`].

use crate::report::{FileError, Op};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file directly inside some directory.
pub struct File {
    pub name: OsString,
    pub path: PathBuf,
}

/// Lists the regular files directly inside `dir`, sorted by name. Symlinks
/// aren't followed and subdirectories are skipped, so the cache folder never
/// lists itself. Entries that can't be inspected are returned as failures
/// rather than aborting the listing.
pub fn regular_files(dir: &Path) -> (Vec<File>, Vec<FileError>) {
    let mut files = Vec::new();
    let mut failures = Vec::new();
    for result in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        match result {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    files.push(File {
                        name: entry.file_name().to_owned(),
                        path: entry.path().to_owned(),
                    });
                }
            }
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_owned();
                failures.push(FileError::new(&path, Op::List, e.into()));
            }
        }
    }
    (files, failures)
}

pub fn read(path: &Path) -> Result<Vec<u8>, FileError> {
    std::fs::read(path).map_err(|e| FileError::new(path, Op::Read, e))
}

pub fn write(path: &Path, contents: &[u8]) -> Result<(), FileError> {
    std::fs::write(path, contents).map_err(|e| FileError::new(path, Op::Write, e))
}
