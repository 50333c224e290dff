//! CSV export writer
//!
//! Appends one row per surviving torrent variant to an export file, creating
//! the header only when the file does not exist yet. Re-runs keep appending,
//! so the export accumulates across invocations the way the original
//! scraper's did.

use crate::output::{OutputError, OutputResult};
use crate::{CatalogItem, TorrentVariant};
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::debug;

/// Default export file name in the working directory.
pub const DEFAULT_CSV_PATH: &str = "YTS-Scraper.csv";

const HEADERS: [&str; 11] = [
    "YTS ID",
    "IMDb ID",
    "Movie Title",
    "Year",
    "Language",
    "Rating",
    "Quality",
    "Format",
    "YTS URL",
    "IMDb URL",
    "Torrent URL",
];

/// CSV writer for listing exports.
pub struct CsvExportWriter {
    writer: Writer<File>,
    rows_written: u64,
}

impl CsvExportWriter {
    /// Open (or create) the export file at `path` in append mode.
    ///
    /// # Errors
    /// Returns [`OutputError::IoError`] when the file cannot be opened and
    /// [`OutputError::CsvError`] when the header cannot be written.
    pub fn open<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        let is_new = !path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| OutputError::IoError(format!("Failed to open {}: {e}", path.display())))?;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .from_writer(file);

        if is_new {
            writer
                .write_record(HEADERS)
                .map_err(|e| OutputError::CsvError(e.to_string()))?;
            debug!(path = %path.display(), "Created CSV export with header row");
        }

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Append one row for an (item, variant) pair.
    pub fn write_row(&mut self, item: &CatalogItem, variant: &TorrentVariant) -> OutputResult<()> {
        let imdb_id = item.imdb_code.clone().unwrap_or_default();
        let imdb_url = if imdb_id.is_empty() {
            String::new()
        } else {
            format!("https://www.imdb.com/title/{imdb_id}")
        };

        self.writer
            .write_record([
                item.id.to_string(),
                imdb_id,
                item.title.clone(),
                item.year.to_string(),
                item.language.clone(),
                item.rating.to_string(),
                variant.quality.clone(),
                variant.display_format(),
                item.listing_url.clone(),
                imdb_url,
                variant.url.clone(),
            ])
            .map_err(|e| OutputError::CsvError(e.to_string()))?;

        self.rows_written += 1;
        Ok(())
    }

    /// Number of rows written by this writer instance.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush buffered rows and finalize the export.
    pub fn close(mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::IoError(format!("Failed to flush CSV: {e}")))
    }
}
