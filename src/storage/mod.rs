pub mod config;
pub mod csv;
pub mod json;

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Catalog, Movie};

pub use config::{Config, ConfigStorage, GeneralConfig, LookupConfig, TomlConfigStorage};
pub use csv::CsvStorage;
pub use json::JsonStorage;

/// Errors raised by the movie storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing file's contents are not parseable in the backend's format.
    #[error("Failed to decode {path}: {detail}")]
    Decode { path: PathBuf, detail: String },

    /// `add` was called for a title already in the catalog.
    #[error("Movie {0:?} already exists in the catalog")]
    DuplicateTitle(String),

    /// `delete`/`update` was called for a title not in the catalog.
    #[error("Movie {0:?} not found in the catalog")]
    TitleNotFound(String),

    /// File I/O failure not otherwise classified (permissions, disk full).
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn decode(path: &Path, detail: impl ToString) -> Self {
        StorageError::Decode {
            path: path.to_path_buf(),
            detail: detail.to_string(),
        }
    }
}

/// Capability contract shared by the movie storage backends.
///
/// Every operation is stateless with respect to the previous one: the
/// backend re-reads the backing file, mutates an in-memory [`Catalog`] and
/// persists the result. Precondition failures (`DuplicateTitle`,
/// `TitleNotFound`) never touch the file.
///
/// A backend owns logical access to one file path for its lifetime. Nothing
/// enforces that at the OS level: two processes operating on the same file
/// race arbitrarily, an accepted limitation of this design.
pub trait MovieStorage: Send + Sync {
    /// Read the entire backing store into a catalog.
    fn list(&self) -> Result<Catalog, StorageError>;

    /// Insert a new entry. Fails with [`StorageError::DuplicateTitle`] if
    /// the title is already present.
    fn add(&self, title: &str, movie: &Movie) -> Result<(), StorageError>;

    /// Remove an entry. Fails with [`StorageError::TitleNotFound`] if the
    /// title is absent.
    fn delete(&self, title: &str) -> Result<(), StorageError>;

    /// Replace the rating of an existing entry, leaving the other fields
    /// untouched. Fails with [`StorageError::TitleNotFound`] if the title
    /// is absent.
    fn update(&self, title: &str, rating: f64) -> Result<(), StorageError>;

    /// The backing file path.
    fn path(&self) -> &Path;
}

/// Storage formats a collection file can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Json,
    Csv,
}

impl StorageKind {
    /// Parse a user-entered format name (`json` or `csv`, case-insensitive,
    /// surrounding whitespace ignored).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "json" => Some(StorageKind::Json),
            "csv" => Some(StorageKind::Csv),
            _ => None,
        }
    }

    /// Open a backend of this kind against `stem` (the backend appends its
    /// own file extension).
    pub fn open(self, stem: &Path) -> Result<Box<dyn MovieStorage>, StorageError> {
        Ok(match self {
            StorageKind::Json => Box::new(JsonStorage::open(stem)?),
            StorageKind::Csv => Box::new(CsvStorage::open(stem)?),
        })
    }
}

/// Append an extension to a path stem without interpreting dots already in
/// the stem, so a stem like `storage/j.doe` becomes `storage/j.doe.json`.
fn path_with_extension(stem: &Path, extension: &str) -> PathBuf {
    let mut os: OsString = stem.as_os_str().to_os_string();
    os.push(".");
    os.push(extension);
    PathBuf::from(os)
}

/// Replace `path`'s contents atomically: write to a `.tmp` sibling, then
/// rename into place. Either the whole new state lands or the prior file
/// remains.
fn write_replace(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let tmp_path = {
        let mut os: OsString = path.as_os_str().to_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    };

    fs::write(&tmp_path, contents).map_err(|e| StorageError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| StorageError::io(path, e))?;

    log::debug!("Replaced {:?} ({} bytes)", path, contents.len());

    Ok(())
}

/// Ensure XDG data and config directories exist
/// Returns (data_dir, config_dir)
///
/// XDG Base Directory Specification:
/// - Data: $XDG_DATA_HOME/reelkeep (default: ~/.local/share/reelkeep)
/// - Config: $XDG_CONFIG_HOME/reelkeep (default: ~/.config/reelkeep)
pub fn ensure_directories() -> anyhow::Result<(PathBuf, PathBuf)> {
    use anyhow::Context;

    let home = env::var("HOME").context("HOME environment variable not set")?;
    let home_path = PathBuf::from(home);

    let data_dir = if let Ok(xdg_data) = env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("reelkeep")
    } else {
        home_path.join(".local/share/reelkeep")
    };

    let config_dir = if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("reelkeep")
    } else {
        home_path.join(".config/reelkeep")
    };

    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

    log::debug!("Data directory: {:?}", data_dir);
    log::debug!("Config directory: {:?}", config_dir);

    Ok((data_dir, config_dir))
}
