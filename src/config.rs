//! Loads the project configuration from a `squish.yaml` file. The file is
//! optional; without one, [`Config::default`] applies and target directories
//! must be passed on the command line.
//!
//! ```yaml
//! cache_directory: .squish-cache
//! existing_cache: preserve   # or `refuse`
//! directories:
//!   - _layouts
//!   - _includes
//! ```

use crate::cache::{self, validate_name};
use crate::minify::ExistingCache;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "squish.yaml";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default = "default_cache_directory")]
    cache_directory: String,

    #[serde(default)]
    directories: Vec<PathBuf>,

    #[serde(default)]
    existing_cache: ExistingCache,
}

fn default_cache_directory() -> String {
    cache::DEFAULT_NAME.to_owned()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The name of the cache folder inside each target directory.
    pub cache_directory: String,

    /// The target directories to use when none are given on the command line.
    /// Relative paths in the project file are resolved against the directory
    /// containing the project file.
    pub directories: Vec<PathBuf>,

    pub existing_cache: ExistingCache,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_directory: default_cache_directory(),
            directories: Vec::new(),
            existing_cache: ExistingCache::default(),
        }
    }
}

impl Config {
    /// Looks for a [`PROJECT_FILE`] in `dir` and then in each of its parents,
    /// loading the first one found. Returns the defaults if there is none.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.is_file() {
            Config::from_project_file(&path)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Ok(Config::default()),
            }
        }
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        validate_name(&project.cache_directory)?;

        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        tracing::debug!(path = %path.display(), "loaded project file");
        Ok(Config {
            cache_directory: project.cache_directory,
            directories: project
                .directories
                .iter()
                .map(|relpath| project_root.join(relpath))
                .collect(),
            existing_cache: project.existing_cache,
        })
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for loading configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid.
    Parse {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when the configured cache folder name is unusable.
    Cache(cache::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Loading project file '{}': {}", path.display(), err)
            }
            Error::Cache(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
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
    fn test_from_project_file() -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(
            &path,
            "cache_directory: .originals\nexisting_cache: refuse\ndirectories:\n  - _layouts\n  - _includes\n",
        )?;

        let config = Config::from_project_file(&path)?;

        assert_eq!(
            Config {
                cache_directory: String::from(".originals"),
                directories: vec![dir.path().join("_layouts"), dir.path().join("_includes")],
                existing_cache: ExistingCache::Refuse,
            },
            config
        );
        Ok(())
    }

    #[test]
    fn test_defaults_for_missing_keys() -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "directories: [_layouts]\n")?;

        let config = Config::from_project_file(&path)?;

        assert_eq!(cache::DEFAULT_NAME, config.cache_directory);
        assert_eq!(ExistingCache::Preserve, config.existing_cache);
        assert_eq!(vec![dir.path().join("_layouts")], config.directories);
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_parents() -> TestResult {
        let dir = TempDir::new()?;
        fs::write(dir.path().join(PROJECT_FILE), "directories: [_layouts]\n")?;
        let nested = dir.path().join("_posts").join("2021");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;

        assert_eq!(vec![dir.path().join("_layouts")], config.directories);
        Ok(())
    }

    #[test]
    fn test_invalid_cache_directory() -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "cache_directory: ../elsewhere\n")?;
        match Config::from_project_file(&path) {
            Err(Error::Cache(cache::Error::InvalidName(_))) => Ok(()),
            other => panic!("expected Error::Cache, found {:?}", other),
        }
    }

    #[test]
    fn test_unknown_key() -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "cache_dir: .originals\n")?;
        match Config::from_project_file(&path) {
            Err(Error::Parse { .. }) => Ok(()),
            other => panic!("expected Error::Parse, found {:?}", other),
        }
    }
}
