//! # YTS Grabber Library
//!
//! A bulk downloader for YTS movie torrent descriptors. Fetches the paginated
//! listing API, filters by year, format and quality, deduplicates torrents
//! that appear under multiple listing entries, and writes `.torrent` files
//! (plus optional poster images) into a categorized directory tree.
//!
//! ## Features
//!
//! - **Pagination discovery**: total page count is learned from the first
//!   successful response; remaining pages are fetched sequentially or through
//!   a bounded worker pool
//! - **Multi-stage filtering**: minimum release year, format (e.g. WEB or
//!   BluRay) and quality (e.g. 1080p, 2160p, 3D) with `all` wildcards
//! - **Cross-page deduplication**: the same torrent hash is downloaded at
//!   most once per run, no matter how many listing entries reference it
//! - **Categorized storage**: flat, by rating, by genre, or nested
//!   rating/genre layouts, with a per-title subdirectory when posters are on
//! - **Interactive backpressure**: after ten consecutive already-existing
//!   files the run pauses and asks whether to keep going
//!
//! ## Quick Start
//!
//! ```no_run
//! use yts_grabber::client::http::YtsHttpClient;
//! use yts_grabber::pipeline::{PipelineRunner, RunConfig};
//! use yts_grabber::report::ConsoleReporter;
//! use yts_grabber::shutdown::ShutdownCoordinator;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::default();
//! let client = Arc::new(YtsHttpClient::new()?);
//! let reporter = Arc::new(ConsoleReporter::new(false));
//! let shutdown = ShutdownCoordinator::shared();
//!
//! let runner = PipelineRunner::new(config, client.clone(), client, reporter, shutdown);
//! let outcome = runner.run().await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`client`] - Listing API client, response parsing and pagination
//! - [`filter`] - Pure filtering pipeline over catalog pages
//! - [`dedup`] - Cross-page torrent hash deduplication
//! - [`downloader`] - Bounded-concurrency download executor and the
//!   existing-files prompt gate
//! - [`output`] - Target path construction and CSV export
//! - [`report`] - Progress/report sink abstraction and console rendering
//! - [`pipeline`] - End-to-end orchestration
//! - [`cli`] - Command-line interface
//! - [`shutdown`] - Early-exit coordination shared across workers

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// Command-line interface
pub mod cli;

/// Listing API client and pagination
pub mod client;

/// Cross-page torrent deduplication
pub mod dedup;

/// Download execution
pub mod downloader;

/// Catalog filtering pipeline
pub mod filter;

/// Path construction and CSV export
pub mod output;

/// End-to-end pipeline orchestration
pub mod pipeline;

/// Progress and report events
pub mod report;

/// Early-exit coordination shared across modules
pub mod shutdown;

/// Characters stripped from titles before they are used in file paths.
const ILLEGAL_PATH_CHARS: [char; 9] = ['\'', '/', '\\', ':', '*', '?', '<', '>', '|'];

/// Strip filesystem-illegal characters from a movie title.
///
/// The YTS long title can contain `'`, `/`, `\`, `:`, `*`, `?`, `<`, `>` and
/// `|`, none of which are safe in a file name. They are removed outright
/// rather than replaced, matching the naming of previously downloaded
/// libraries.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !ILLEGAL_PATH_CHARS.contains(c))
        .collect()
}

/// One downloadable rendition of a catalog item.
///
/// A movie typically carries several variants (720p/1080p/2160p in WEB or
/// BluRay rips). The `hash` identifies the physical torrent: two variants
/// with equal hashes are the same artifact and must only be fetched once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TorrentVariant {
    /// Quality token as reported by the API (e.g. "1080p", "3D")
    pub quality: String,
    /// Format token as reported by the API (e.g. "web", "bluray")
    pub format: String,
    /// Human-readable size label (e.g. "1.6 GB"); never parsed
    pub size_label: String,
    /// Torrent info hash; dedup identity and filename suffix
    pub hash: String,
    /// Download URL for the torrent descriptor
    pub url: String,
}

impl TorrentVariant {
    /// Format token normalized to title case for display and file names
    /// ("web" becomes "Web", "bluray" becomes "Bluray").
    pub fn display_format(&self) -> String {
        let mut chars = self.format.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(|c| c.to_lowercase()))
                .collect(),
            None => String::new(),
        }
    }
}

/// One listed work returned by the remote API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Listing identifier, stable across pages
    pub id: u64,
    /// Short display title
    pub title: String,
    /// Long title with filesystem-illegal characters stripped
    pub sanitized_title: String,
    /// Release year
    pub year: u32,
    /// Listing rating (0.0 - 10.0)
    pub rating: f64,
    /// Genres; `["None"]` when the listing carries no genre data
    pub genres: Vec<String>,
    /// Audio language token (e.g. "en")
    pub language: String,
    /// IMDb cross-reference, when present
    pub imdb_code: Option<String>,
    /// Listing page URL
    pub listing_url: String,
    /// Poster image URL, when present
    pub poster_url: Option<String>,
    /// Downloadable variants; an item with no surviving variants is dropped
    pub torrents: Vec<TorrentVariant>,
}

impl CatalogItem {
    /// Validate basic invariants of a parsed item.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_empty() {
            return Err("title cannot be empty".to_string());
        }
        if self.torrents.is_empty() {
            return Err(format!("item {} has no torrent variants", self.id));
        }
        for torrent in &self.torrents {
            if torrent.hash.is_empty() {
                return Err(format!("item {} has a torrent without a hash", self.id));
            }
        }
        Ok(())
    }
}

/// One fetched page of catalog items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page ordinal
    pub number: u32,
    /// Items in API response order
    pub items: Vec<CatalogItem>,
}
