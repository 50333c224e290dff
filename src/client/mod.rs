//! Listing API client abstractions
//!
//! The pipeline core talks to the remote catalog through two narrow traits:
//! [`ListingClient`] returns one decoded page of catalog items plus the total
//! result count, and [`ArtifactClient`] returns raw binary content for a URL
//! (torrent descriptors and poster images). HTTP specifics live in [`http`],
//! wire-format decoding in [`parser`], and the page discovery/fan-out state
//! machine in [`pagination`].

use crate::CatalogItem;
use async_trait::async_trait;

pub mod http;
pub mod pagination;
pub mod parser;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network error (timeout, connection refused, non-2xx)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Response body could not be decoded
    #[error("parse error: {0}")]
    ParseError(String),

    /// API returned a well-formed but unusable response
    #[error("API error: {0}")]
    ApiError(String),

    /// First-page retry budget exhausted; the run cannot proceed
    #[error("first page failed after {attempts} attempts: {last_error}")]
    ExhaustedRetries {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        last_error: String,
    },
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// The YTS listing API returns at most 50 entries per page.
pub const PAGE_SIZE: u32 = 50;

/// Sort fields accepted by the listing API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Movie title
    Title,
    /// Release year
    Year,
    /// Listing rating
    Rating,
    /// Seeder count
    Seeds,
    /// Leecher count
    Peers,
    /// Download count
    DownloadCount,
    /// Like count
    LikeCount,
    /// Date the entry was added; implies descending order ("latest")
    DateAdded,
}

impl SortField {
    /// API query token for this sort field.
    pub fn as_api_token(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Year => "year",
            SortField::Rating => "rating",
            SortField::Seeds => "seeds",
            SortField::Peers => "peers",
            SortField::DownloadCount => "download_count",
            SortField::LikeCount => "like_count",
            SortField::DateAdded => "date_added",
        }
    }

    /// Order token paired with this field. Only `date_added` ("latest")
    /// downloads in reverse chronological order; everything else ascends.
    pub fn order_token(&self) -> &'static str {
        match self {
            SortField::DateAdded => "desc",
            _ => "asc",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "year" => Ok(SortField::Year),
            "rating" => Ok(SortField::Rating),
            "seeds" => Ok(SortField::Seeds),
            "peers" => Ok(SortField::Peers),
            "download_count" => Ok(SortField::DownloadCount),
            "like_count" => Ok(SortField::LikeCount),
            "latest" | "date_added" => Ok(SortField::DateAdded),
            _ => Err(format!("Invalid sort field: {s}")),
        }
    }
}

/// Query parameters for one listing request. Page number is supplied
/// separately by the pagination controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    /// Genre filter passed through to the API ("all" disables it)
    pub genre: String,
    /// Minimum rating (0-9) passed through to the API
    pub minimum_rating: u8,
    /// Sort field (and implied order)
    pub sort_by: SortField,
    /// Free-text query term
    pub query_term: String,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            genre: "all".to_string(),
            minimum_rating: 0,
            sort_by: SortField::Title,
            query_term: String::new(),
        }
    }
}

/// One decoded page response: the items plus the API's total result count.
///
/// `movie_count` covers the entire query, not this page; the pagination
/// controller derives the page count from it once.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    /// Total matching items across all pages
    pub movie_count: u64,
    /// Items on this page, in response order
    pub items: Vec<CatalogItem>,
}

impl PageResponse {
    /// Number of pages needed to cover `movie_count` at [`PAGE_SIZE`]
    /// entries per page. Saturates at `u32::MAX` rather than truncating
    /// an absurd count.
    pub fn page_count(&self) -> u32 {
        let pages = self.movie_count.div_ceil(u64::from(PAGE_SIZE));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// Listing client trait: fetch one decoded catalog page.
#[async_trait]
pub trait ListingClient: Send + Sync {
    /// Fetch and decode one page of the listing.
    ///
    /// # Arguments
    /// * `query` - Query parameters shared by every page of the run
    /// * `page` - 1-based page number
    ///
    /// # Errors
    /// Returns [`ClientError::NetworkError`] on transport failures and
    /// [`ClientError::ParseError`] when the body cannot be decoded.
    async fn fetch_page(&self, query: &ListingQuery, page: u32) -> ClientResult<PageResponse>;
}

/// Artifact downloader trait: fetch raw binary content from a URL.
///
/// Used for torrent descriptors (mandatory) and poster images (best-effort).
#[async_trait]
pub trait ArtifactClient: Send + Sync {
    /// Fetch the raw bytes at `url`.
    async fn fetch_bytes(&self, url: &str) -> ClientResult<Vec<u8>>;
}
