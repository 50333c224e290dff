//! Target path construction for downloaded artifacts
//!
//! Pure mapping from item metadata plus categorization policy to a file
//! path (without extension; the executor appends `.torrent` / `.jpg`).
//!
//! Layout, top down:
//! - categorization directories per [`CategorizeMode`] (rating directories
//!   are the integer-truncated rating suffixed `+`)
//! - an optional per-title directory when posters are enabled, so the
//!   descriptor and its poster sit together
//! - filename `"{sanitized_title} {Format} {Quality}"`, optionally suffixed
//!   `" - {imdb_id}"`, always suffixed `" ({hash})"` — the hash keeps two
//!   variants with identical title/format/quality from colliding

use crate::output::CategorizeMode;
use crate::{CatalogItem, TorrentVariant};
use std::path::PathBuf;

/// Builds target paths for one run's configuration.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    root: PathBuf,
    mode: CategorizeMode,
    include_imdb_id: bool,
    per_title_dir: bool,
}

impl PathBuilder {
    /// Create a path builder.
    ///
    /// # Arguments
    /// * `root` - Output root directory
    /// * `mode` - Categorization policy
    /// * `include_imdb_id` - Append the IMDb id to file names
    /// * `per_title_dir` - Add a per-title directory (poster downloads on)
    pub fn new(
        root: impl Into<PathBuf>,
        mode: CategorizeMode,
        include_imdb_id: bool,
        per_title_dir: bool,
    ) -> Self {
        Self {
            root: root.into(),
            mode,
            include_imdb_id,
            per_title_dir,
        }
    }

    /// The categorization mode this builder files under.
    pub fn mode(&self) -> CategorizeMode {
        self.mode
    }

    /// Build the extension-less target path for one (item, variant) pair.
    ///
    /// `genre` selects the genre directory segment for genre-filing modes;
    /// it is ignored by `None` and `Rating`. Genre fan-out is the caller's
    /// job: call once per genre the item belongs to.
    pub fn build(
        &self,
        item: &CatalogItem,
        variant: &TorrentVariant,
        genre: Option<&str>,
    ) -> PathBuf {
        let mut dir = self.root.clone();
        let rating_dir = format!("{}+", item.rating.trunc() as i64);
        let genre_dir = genre.unwrap_or("None");

        match self.mode {
            CategorizeMode::None => {}
            CategorizeMode::Rating => dir.push(&rating_dir),
            CategorizeMode::Genre => dir.push(genre_dir),
            CategorizeMode::RatingGenre => {
                dir.push(&rating_dir);
                dir.push(genre_dir);
            }
            CategorizeMode::GenreRating => {
                dir.push(genre_dir);
                dir.push(&rating_dir);
            }
        }

        if self.per_title_dir {
            dir.push(&item.sanitized_title);
        }

        dir.join(self.file_stem(item, variant))
    }

    fn file_stem(&self, item: &CatalogItem, variant: &TorrentVariant) -> String {
        let mut stem = format!(
            "{} {} {}",
            item.sanitized_title,
            variant.display_format(),
            variant.quality
        );
        if self.include_imdb_id {
            if let Some(imdb) = &item.imdb_code {
                stem.push_str(&format!(" - {imdb}"));
            }
        }
        stem.push_str(&format!(" ({})", variant.hash));
        stem
    }
}
