use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{Catalog, Movie};

use super::{MovieStorage, StorageError, path_with_extension, write_replace};

const HEADERS: [&str; 4] = ["Title", "Year", "imdbRating", "Poster"];

/// One data row of the backing file. Field order matches [`HEADERS`].
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "imdbRating")]
    rating: f64,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

impl CsvRow {
    fn from_entry(title: &str, movie: &Movie) -> Self {
        CsvRow {
            title: title.to_string(),
            year: movie.year.clone(),
            rating: movie.rating,
            poster: movie.poster.clone(),
        }
    }
}

/// CSV-backed movie storage.
///
/// The backing file is UTF-8 CSV with the header row
/// `Title,Year,imdbRating,Poster` followed by one row per movie, quoted per
/// RFC 4180 for embedded commas/quotes. The file's row order is the catalog
/// iteration order.
///
/// `add` appends a single row when data rows already exist; `delete` and
/// `update` always rewrite the whole file, since changing or removing a row
/// requires full-file knowledge.
pub struct CsvStorage {
    path: PathBuf,
}

impl CsvStorage {
    /// Open the storage at `stem` + `.csv`, writing the header row if the
    /// file does not exist. Opening an existing file never truncates it.
    pub fn open(stem: &Path) -> Result<Self, StorageError> {
        let path = path_with_extension(stem, "csv");
        let storage = CsvStorage { path };
        if !storage.path.exists() {
            log::info!("Creating new CSV catalog at {:?}", storage.path);
            write_replace(&storage.path, &storage.encode_catalog(&Catalog::new())?)?;
        }
        Ok(storage)
    }

    fn read_catalog(&self) -> Result<Catalog, StorageError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let mut reader = csv::Reader::from_reader(contents.as_bytes());
        let mut catalog = Catalog::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| StorageError::decode(&self.path, e))?;
            catalog.insert(row.title, Movie::new(row.year, row.rating, row.poster));
        }
        Ok(catalog)
    }

    /// Serialize header plus all rows. The header is written explicitly so
    /// an empty catalog still encodes to a well-formed header-only file.
    fn encode_catalog(&self, catalog: &Catalog) -> Result<Vec<u8>, StorageError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(HEADERS)
            .map_err(|e| StorageError::decode(&self.path, e))?;
        for (title, movie) in catalog.iter() {
            writer
                .serialize(CsvRow::from_entry(title, movie))
                .map_err(|e| StorageError::decode(&self.path, e))?;
        }
        writer
            .into_inner()
            .map_err(|e| StorageError::decode(&self.path, e))
    }

    fn write_catalog(&self, catalog: &Catalog) -> Result<(), StorageError> {
        write_replace(&self.path, &self.encode_catalog(catalog)?)
    }

    fn append_row(&self, row: &CsvRow) -> Result<(), StorageError> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .serialize(row)
            .map_err(|e| StorageError::decode(&self.path, e))?;
        writer
            .flush()
            .map_err(|e| StorageError::io(&self.path, e))?;
        Ok(())
    }
}

impl MovieStorage for CsvStorage {
    fn list(&self) -> Result<Catalog, StorageError> {
        self.read_catalog()
    }

    fn add(&self, title: &str, movie: &Movie) -> Result<(), StorageError> {
        let mut catalog = self.read_catalog()?;
        if catalog.contains(title) {
            return Err(StorageError::DuplicateTitle(title.to_string()));
        }
        // Branch on the row count of the read we just did, not on file
        // size: a header-only file has zero data rows but is not empty.
        if catalog.is_empty() {
            catalog.insert(title, movie.clone());
            self.write_catalog(&catalog)?;
        } else {
            self.append_row(&CsvRow::from_entry(title, movie))?;
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn open_in(dir: &tempfile::TempDir) -> CsvStorage {
        CsvStorage::open(&dir.path().join("movies")).unwrap()
    }

    #[test]
    fn test_open_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        let contents = fs::read_to_string(storage.path()).unwrap();
        assert_eq!(contents, "Title,Year,imdbRating,Poster\n");
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        storage
            .add("The Matrix", &Movie::new("1999", 8.7, None))
            .unwrap();

        let reopened = open_in(&dir);
        let catalog = reopened.list().unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("The Matrix"));
    }

    #[test]
    fn test_add_to_header_only_file_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        storage
            .add("Heat", &Movie::new("1995", 8.3, None))
            .unwrap();

        let contents = fs::read_to_string(storage.path()).unwrap();
        assert_eq!(contents, "Title,Year,imdbRating,Poster\nHeat,1995,8.3,\n");
    }

    #[test]
    fn test_add_to_populated_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        storage.add("Heat", &Movie::new("1995", 8.3, None)).unwrap();
        storage.add("Ronin", &Movie::new("1998", 7.2, None)).unwrap();

        let contents = fs::read_to_string(storage.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Title,Year,imdbRating,Poster");
        assert!(lines[2].starts_with("Ronin,"));
    }

    #[test]
    fn test_add_duplicate_fails_without_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        let movie = Movie::new("1995", 8.3, None);
        storage.add("Heat", &movie).unwrap();

        let result = storage.add("Heat", &Movie::new("2001", 5.0, None));
        assert!(matches!(result, Err(StorageError::DuplicateTitle(t)) if t == "Heat"));

        let catalog = storage.list().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Heat"), Some(&movie));
    }

    #[test]
    fn test_delete_rewrites_remaining_rows() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        storage.add("Heat", &Movie::new("1995", 8.3, None)).unwrap();
        storage.add("Ronin", &Movie::new("1998", 7.2, None)).unwrap();

        storage.delete("Heat").unwrap();

        let contents = fs::read_to_string(storage.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Title,Year,imdbRating,Poster");
        assert!(lines[1].starts_with("Ronin,"));
    }

    #[test]
    fn test_delete_missing_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        storage.add("Heat", &Movie::new("1995", 8.3, None)).unwrap();
        let before = fs::read_to_string(storage.path()).unwrap();

        let result = storage.delete("Ronin");
        assert!(matches!(result, Err(StorageError::TitleNotFound(_))));
        assert_eq!(fs::read_to_string(storage.path()).unwrap(), before);
    }

    #[test]
    fn test_update_touches_only_rating() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        let poster = Some("http://example.com/heat.jpg".to_string());
        storage
            .add("Heat", &Movie::new("1995", 8.3, poster.clone()))
            .unwrap();

        storage.update("Heat", 8.9).unwrap();

        let catalog = storage.list().unwrap();
        let movie = catalog.get("Heat").unwrap();
        assert_eq!(movie.rating, 8.9);
        assert_eq!(movie.year, "1995");
        assert_eq!(movie.poster, poster);
    }

    #[test]
    fn test_update_missing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        let result = storage.update("Heat", 9.0);
        assert!(matches!(result, Err(StorageError::TitleNotFound(_))));
    }

    #[test]
    fn test_round_trip_embedded_commas_and_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        let movie = Movie::new("1966", 8.8, Some("http://example.com/g,b&u.jpg".into()));
        let title = "The Good, The Bad And \"The Ugly\"";
        storage.add(title, &movie).unwrap();
        storage.add("Next, One", &Movie::new("1970", 6.0, None)).unwrap();

        let catalog = storage.list().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(title), Some(&movie));
    }

    #[test]
    fn test_file_order_is_iteration_order() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        storage.add("Zulu", &Movie::new("1964", 7.7, None)).unwrap();
        storage.add("Alien", &Movie::new("1979", 8.5, None)).unwrap();

        let titles: Vec<String> = storage
            .list()
            .unwrap()
            .iter()
            .map(|(title, _)| title.to_string())
            .collect();
        assert_eq!(titles, vec!["Zulu", "Alien"]);
    }

    #[test]
    fn test_malformed_row_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        fs::write(
            storage.path(),
            "Title,Year,imdbRating,Poster\nHeat,1995\n",
        )
        .unwrap();

        let result = storage.list();
        assert!(matches!(result, Err(StorageError::Decode { path, .. }) if path == storage.path()));
    }

    #[test]
    fn test_non_numeric_rating_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_in(&dir);
        fs::write(
            storage.path(),
            "Title,Year,imdbRating,Poster\nHeat,1995,N/A,\n",
        )
        .unwrap();

        assert!(matches!(storage.list(), Err(StorageError::Decode { .. })));
    }
}
