use std::path::Path;

use crate::models::{Catalog, Movie, RatingStats, SortDirection, normalize_title};
use crate::storage::{MovieStorage, StorageError};

/// Errors raised by the catalog service on top of storage failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A title was empty after trimming.
    #[error("Movie title must not be empty")]
    EmptyTitle,

    /// A listing or statistics request hit a catalog with zero entries.
    #[error("No movies in the catalog")]
    EmptyCatalog,

    /// A sort direction that is neither ascending nor descending.
    #[error("Invalid sort direction {0:?} (expected 'asc' or 'desc')")]
    InvalidDirection(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Domain-rules layer over a [`MovieStorage`] backend.
///
/// The backend knows nothing about title normalization or presentation
/// policy; this service normalizes every incoming title (trimmed,
/// title-cased) before the backend sees it, so duplicate checks and lookups
/// are case- and whitespace-insensitive, and turns "nothing to show" into a
/// typed failure where the operation calls for it.
pub struct MovieApp {
    storage: Box<dyn MovieStorage>,
}

impl MovieApp {
    pub fn new(storage: Box<dyn MovieStorage>) -> Self {
        MovieApp { storage }
    }

    /// The backing file of the wrapped storage.
    pub fn storage_path(&self) -> &Path {
        self.storage.path()
    }

    /// Normalize a raw title into its catalog key, rejecting titles that
    /// are empty once trimmed.
    fn catalog_key(raw: &str) -> Result<String, AppError> {
        let title = normalize_title(raw);
        if title.is_empty() {
            return Err(AppError::EmptyTitle);
        }
        Ok(title)
    }

    /// The full catalog. Fails with [`AppError::EmptyCatalog`] when there
    /// is nothing to list; an empty collection is a storage-level
    /// non-event but a presentation-level error.
    pub fn list_movies(&self) -> Result<Catalog, AppError> {
        let catalog = self.storage.list()?;
        if catalog.is_empty() {
            return Err(AppError::EmptyCatalog);
        }
        Ok(catalog)
    }

    /// Insert a movie under its normalized title. Returns the title the
    /// entry was stored under.
    pub fn add_movie(&self, raw_title: &str, movie: Movie) -> Result<String, AppError> {
        let title = Self::catalog_key(raw_title)?;
        self.storage.add(&title, &movie)?;
        Ok(title)
    }

    /// Remove a movie by (normalized) title. Returns the removed title.
    pub fn delete_movie(&self, raw_title: &str) -> Result<String, AppError> {
        let title = Self::catalog_key(raw_title)?;
        self.storage.delete(&title)?;
        Ok(title)
    }

    /// Replace a movie's rating, leaving the other fields untouched.
    /// Returns the updated title.
    pub fn update_movie(&self, raw_title: &str, rating: f64) -> Result<String, AppError> {
        let title = Self::catalog_key(raw_title)?;
        self.storage.update(&title, rating)?;
        Ok(title)
    }

    /// Entries ordered by rating. `direction` must parse as a
    /// [`SortDirection`]; anything else fails with
    /// [`AppError::InvalidDirection`] before storage is touched.
    pub fn sort_movies(&self, direction: &str) -> Result<Vec<(String, Movie)>, AppError> {
        let Some(direction) = SortDirection::parse(direction) else {
            return Err(AppError::InvalidDirection(direction.to_string()));
        };
        let catalog = self.storage.list()?;
        Ok(catalog
            .sorted_by_rating(direction)
            .into_iter()
            .map(|(title, movie)| (title.to_string(), movie.clone()))
            .collect())
    }

    /// Max, min and mean rating over the catalog. Fails with
    /// [`AppError::EmptyCatalog`] when the aggregates are undefined.
    pub fn stat_movies(&self) -> Result<RatingStats, AppError> {
        let catalog = self.storage.list()?;
        catalog.rating_stats().ok_or(AppError::EmptyCatalog)
    }
}
