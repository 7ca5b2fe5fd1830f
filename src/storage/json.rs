use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Catalog, Movie};

use super::{MovieStorage, StorageError, path_with_extension, write_replace};

/// JSON-backed movie storage.
///
/// The backing file is one pretty-printed object whose top-level keys are
/// titles and whose values carry `Year`, `imdbRating` and `Poster`. Every
/// operation reads the whole document, mutates an in-memory [`Catalog`] and
/// rewrites the file atomically.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    /// Open the storage at `stem` + `.json`, creating an empty document if
    /// the file does not exist. Opening an existing file never truncates it.
    pub fn open(stem: &Path) -> Result<Self, StorageError> {
        let path = path_with_extension(stem, "json");
        if !path.exists() {
            log::info!("Creating new JSON catalog at {:?}", path);
            write_replace(&path, b"{}")?;
        }
        Ok(JsonStorage { path })
    }

    fn read_catalog(&self) -> Result<Catalog, StorageError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        serde_json::from_str(&contents).map_err(|e| StorageError::decode(&self.path, e))
    }

    fn write_catalog(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(catalog)
            .map_err(|e| StorageError::decode(&self.path, e))?;
        write_replace(&self.path, contents.as_bytes())
    }
}

impl MovieStorage for JsonStorage {
    fn list(&self) -> Result<Catalog, StorageError> {
        self.read_catalog()
    }

    fn add(&self, title: &str, movie: &Movie) -> Result<(), StorageError> {
        let mut catalog = self.read_catalog()?;
        if catalog.contains(title) {
            return Err(StorageError::DuplicateTitle(title.to_string()));
        }
        catalog.insert(title, movie.clone());
        self.write_catalog(&catalog)?;
        log::info!("Added {:?} to {:?}", title, self.path);
        Ok(())
    }

    fn delete(&self, title: &str) -> Result<(), StorageError> {
        let mut catalog = self.read_catalog()?;
        if catalog.remove(title).is_none() {
            return Err(StorageError::TitleNotFound(title.to_string()));
        }
        self.write_catalog(&catalog)?;
        log::info!("Deleted {:?} from {:?}", title, self.path);
        Ok(())
    }

    fn update(&self, title: &str, rating: f64) -> Result<(), StorageError> {
        let mut catalog = self.read_catalog()?;
        let Some(existing) = catalog.get(title) else {
            return Err(StorageError::TitleNotFound(title.to_string()));
        };
        let mut movie = existing.clone();
        movie.rating = rating;
        catalog.insert(title, movie);
        self.write_catalog(&catalog)?;
        log::info!("Updated rating of {:?} in {:?}", title, self.path);
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
