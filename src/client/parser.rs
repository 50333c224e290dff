//! Listing response parser
//!
//! Stateless conversion of the YTS `list_movies.json` wire format into the
//! typed [`CatalogItem`]/[`TorrentVariant`] model. Keeping decoding in one
//! place means the HTTP client and tests share identical parsing behavior.

use crate::client::{ClientError, ClientResult, PageResponse};
use crate::{sanitize_title, CatalogItem, TorrentVariant};
use serde::Deserialize;

/// Top-level envelope of a `list_movies.json` response.
#[derive(Debug, Deserialize)]
pub struct ListMoviesResponse {
    /// "ok" on success
    pub status: String,
    /// Error detail accompanying a non-ok status
    #[serde(default)]
    pub status_message: Option<String>,
    /// Payload; absent when the API reports an error
    pub data: Option<ListMoviesData>,
}

/// `data` object of a listing response.
#[derive(Debug, Deserialize)]
pub struct ListMoviesData {
    /// Total matching movies across all pages
    pub movie_count: u64,
    /// Movies on this page; the API omits the key entirely for empty pages
    #[serde(default)]
    pub movies: Option<Vec<WireMovie>>,
}

/// One movie entry on the wire.
#[derive(Debug, Deserialize)]
pub struct WireMovie {
    /// Listing identifier
    pub id: u64,
    /// Short title
    pub title: String,
    /// Long title including year, used for file names after sanitizing
    pub title_long: String,
    /// Release year
    pub year: u32,
    /// Listing rating
    #[serde(default)]
    pub rating: f64,
    /// Genres; missing or empty for some entries
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    /// Audio language
    #[serde(default)]
    pub language: String,
    /// IMDb cross-reference
    #[serde(default)]
    pub imdb_code: Option<String>,
    /// Listing page URL
    #[serde(default)]
    pub url: String,
    /// Poster image URL
    #[serde(default)]
    pub large_cover_image: Option<String>,
    /// Torrent variants; missing for entries without releases
    #[serde(default)]
    pub torrents: Option<Vec<WireTorrent>>,
}

/// One torrent variant on the wire.
#[derive(Debug, Deserialize)]
pub struct WireTorrent {
    /// Quality token (e.g. "1080p", "3D")
    pub quality: String,
    /// Format token; the API calls this field `type`
    #[serde(rename = "type")]
    pub format: String,
    /// Human-readable size
    #[serde(default)]
    pub size: String,
    /// Torrent info hash
    pub hash: String,
    /// Descriptor download URL
    pub url: String,
}

impl From<WireTorrent> for TorrentVariant {
    fn from(wire: WireTorrent) -> Self {
        Self {
            quality: wire.quality,
            format: wire.format,
            size_label: wire.size,
            hash: wire.hash,
            url: wire.url,
        }
    }
}

impl From<WireMovie> for CatalogItem {
    fn from(wire: WireMovie) -> Self {
        let genres = match wire.genres {
            Some(genres) if !genres.is_empty() => genres,
            _ => vec!["None".to_string()],
        };
        Self {
            id: wire.id,
            title: wire.title,
            sanitized_title: sanitize_title(&wire.title_long),
            year: wire.year,
            rating: wire.rating,
            genres,
            language: wire.language,
            imdb_code: wire.imdb_code,
            listing_url: wire.url,
            poster_url: wire.large_cover_image,
            torrents: wire
                .torrents
                .unwrap_or_default()
                .into_iter()
                .map(TorrentVariant::from)
                .collect(),
        }
    }
}

/// Decode a raw `list_movies.json` body into a [`PageResponse`].
///
/// # Errors
/// Returns [`ClientError::ParseError`] for malformed JSON and
/// [`ClientError::ApiError`] when the envelope reports a non-ok status.
pub fn parse_list_response(body: &str) -> ClientResult<PageResponse> {
    let response: ListMoviesResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::ParseError(format!("Failed to decode listing body: {e}")))?;

    if response.status != "ok" {
        return Err(ClientError::ApiError(
            response
                .status_message
                .unwrap_or_else(|| format!("status {}", response.status)),
        ));
    }

    let data = response
        .data
        .ok_or_else(|| ClientError::ParseError("Response has no data object".to_string()))?;

    let items = data
        .movies
        .unwrap_or_default()
        .into_iter()
        .map(CatalogItem::from)
        .collect();

    Ok(PageResponse {
        movie_count: data.movie_count,
        items,
    })
}
