//! Target path construction and CSV export

use std::str::FromStr;

pub mod csv;
pub mod path;

pub use path::PathBuilder;

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Subdirectory policy for downloaded artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorizeMode {
    /// Flat output directory
    None,
    /// One directory per truncated rating ("7+")
    Rating,
    /// One directory per genre; items fan out into every genre they carry
    Genre,
    /// Nested: rating directory, then genre directory
    RatingGenre,
    /// Nested: genre directory, then rating directory
    GenreRating,
}

impl CategorizeMode {
    /// Whether this mode files items under genre directories, which makes
    /// the download executor fan out once per genre.
    pub fn involves_genre(&self) -> bool {
        matches!(
            self,
            CategorizeMode::Genre | CategorizeMode::RatingGenre | CategorizeMode::GenreRating
        )
    }

    /// Title-cased name used as the default output directory when the user
    /// supplies none ("Rating", "Genre-Rating", ...).
    pub fn title(&self) -> &'static str {
        match self {
            CategorizeMode::None => "None",
            CategorizeMode::Rating => "Rating",
            CategorizeMode::Genre => "Genre",
            CategorizeMode::RatingGenre => "Rating-Genre",
            CategorizeMode::GenreRating => "Genre-Rating",
        }
    }
}

impl FromStr for CategorizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(CategorizeMode::None),
            "rating" => Ok(CategorizeMode::Rating),
            "genre" => Ok(CategorizeMode::Genre),
            "rating-genre" => Ok(CategorizeMode::RatingGenre),
            "genre-rating" => Ok(CategorizeMode::GenreRating),
            _ => Err(format!(
                "Invalid categorization: {s}. Valid options: none, rating, genre, rating-genre, genre-rating"
            )),
        }
    }
}
