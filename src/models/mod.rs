pub mod movie;

pub use movie::{Catalog, Movie, RatingStats, SortDirection, normalize_title};
