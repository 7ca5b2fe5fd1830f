use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Metadata stored for one tracked movie.
///
/// The movie's title is not part of this struct: it is the key under which
/// the entry lives in a [`Catalog`], which keeps the on-disk JSON shape
/// (one object keyed by title) and the CSV row shape in sync with the
/// in-memory representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Release year, stored exactly as the lookup source provided it
    /// (OMDb uses strings like "1999" or "2008–2013").
    #[serde(rename = "Year", deserialize_with = "year_lenient")]
    pub year: String,

    /// Numeric rating. Always written as a number; files written by older
    /// tools may hold it as a string, which is accepted on read.
    #[serde(rename = "imdbRating", deserialize_with = "rating_lenient")]
    pub rating: f64,

    /// Poster URL, or null/empty when the source had none.
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
}

impl Movie {
    pub fn new(year: impl Into<String>, rating: f64, poster: Option<String>) -> Self {
        Movie {
            year: year.into(),
            rating,
            poster,
        }
    }
}

/// Accept a year as either a JSON string or a bare number.
fn year_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Num(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

/// Accept a rating as either a number or a numeric string.
fn rating_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid rating value {s:?}"))),
    }
}

/// A user's movie collection: an insertion-ordered mapping from title to
/// [`Movie`].
///
/// Titles are unique keys. Iteration order is whatever order entries were
/// inserted in, which for the CSV backend is the file's row order; display
/// numbering is assigned freshly on each listing, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    movies: IndexMap<String, Movie>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            movies: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.movies.contains_key(title)
    }

    pub fn get(&self, title: &str) -> Option<&Movie> {
        self.movies.get(title)
    }

    /// Insert an entry, replacing any existing entry under the same title.
    /// Callers that need add-only semantics check [`Catalog::contains`]
    /// first; the storage backends do.
    pub fn insert(&mut self, title: impl Into<String>, movie: Movie) {
        self.movies.insert(title.into(), movie);
    }

    pub fn remove(&mut self, title: &str) -> Option<Movie> {
        // shift_remove keeps the order of the remaining entries
        self.movies.shift_remove(title)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Movie)> {
        self.movies.iter().map(|(title, movie)| (title.as_str(), movie))
    }

    /// Entries ordered by rating. The sort is stable, so entries with equal
    /// ratings keep their catalog iteration order.
    pub fn sorted_by_rating(&self, direction: SortDirection) -> Vec<(&str, &Movie)> {
        let mut entries: Vec<(&str, &Movie)> = self.iter().collect();
        entries.sort_by(|a, b| {
            let ord = a.1.rating.partial_cmp(&b.1.rating).unwrap_or(std::cmp::Ordering::Equal);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        entries
    }

    /// Max, min and mean rating over all entries. `None` on an empty
    /// catalog, where the aggregates are undefined.
    pub fn rating_stats(&self) -> Option<RatingStats> {
        if self.movies.is_empty() {
            return None;
        }
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        let mut sum = 0.0;
        for movie in self.movies.values() {
            max = max.max(movie.rating);
            min = min.min(movie.rating);
            sum += movie.rating;
        }
        Some(RatingStats {
            max,
            min,
            average: sum / self.movies.len() as f64,
        })
    }
}

impl FromIterator<(String, Movie)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, Movie)>>(iter: I) -> Self {
        Catalog {
            movies: iter.into_iter().collect(),
        }
    }
}

/// Sort order for rating-based listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse a user-entered direction. Accepts `asc`/`ascending` and
    /// `desc`/`descending`, case-insensitively, ignoring surrounding
    /// whitespace. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// Aggregate rating figures for a catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingStats {
    pub max: f64,
    pub min: f64,
    /// Arithmetic mean, unrounded. Rounding to two decimals happens at
    /// display time.
    pub average: f64,
}

/// Normalize a raw title into its catalog key form: trimmed, with each
/// whitespace-separated word capitalized and the rest lowercased. Internal
/// whitespace is preserved as typed.
///
/// All service-layer operations key on this form, making lookups and
/// duplicate checks case- and surrounding-whitespace-insensitive.
pub fn normalize_title(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut word_start = true;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            word_start = true;
            out.push(ch);
        } else if word_start {
            out.extend(ch.to_uppercase());
            word_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}
