//! End-to-end pipeline runs against scripted clients

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use yts_grabber::client::{
    ArtifactClient, ClientResult, ListingClient, ListingQuery, PageResponse,
};
use yts_grabber::filter::{FilterCriteria, FormatFilter, QualityFilter};
use yts_grabber::pipeline::{PipelineRunner, RunConfig, RunOutcome};
use yts_grabber::report::RecordingReporter;
use yts_grabber::shutdown::ShutdownCoordinator;
use yts_grabber::{CatalogItem, TorrentVariant};

fn variant(quality: &str, format: &str, hash: &str) -> TorrentVariant {
    TorrentVariant {
        quality: quality.to_string(),
        format: format.to_string(),
        size_label: "1 GB".to_string(),
        hash: hash.to_string(),
        url: format!("https://yts.mx/torrent/download/{hash}"),
    }
}

fn item(id: u64, year: u32, torrents: Vec<TorrentVariant>) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("Movie {id}"),
        sanitized_title: format!("Movie {id} ({year})"),
        year,
        rating: 7.0,
        genres: vec!["Action".to_string()],
        language: "en".to_string(),
        imdb_code: None,
        listing_url: format!("https://yts.mx/movies/movie-{id}"),
        poster_url: None,
        torrents,
    }
}

struct FakeCatalog {
    movie_count: u64,
    pages: HashMap<u32, Vec<CatalogItem>>,
}

#[async_trait]
impl ListingClient for FakeCatalog {
    async fn fetch_page(&self, _query: &ListingQuery, page: u32) -> ClientResult<PageResponse> {
        Ok(PageResponse {
            movie_count: self.movie_count,
            items: self.pages.get(&page).cloned().unwrap_or_default(),
        })
    }
}

struct FakeArtifacts;

#[async_trait]
impl ArtifactClient for FakeArtifacts {
    async fn fetch_bytes(&self, url: &str) -> ClientResult<Vec<u8>> {
        Ok(format!("payload for {url}").into_bytes())
    }
}

fn runner(catalog: FakeCatalog, config: RunConfig) -> PipelineRunner {
    PipelineRunner::new(
        config,
        Arc::new(catalog),
        Arc::new(FakeArtifacts),
        Arc::new(RecordingReporter::new()),
        ShutdownCoordinator::shared(),
    )
}

#[tokio::test]
async fn test_full_run_writes_filtered_torrents() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = FakeCatalog {
        movie_count: 60,
        pages: [
            (
                1,
                vec![
                    item(1, 2020, vec![variant("1080p", "web", "AAA")]),
                    item(2, 1999, vec![variant("1080p", "web", "OLD")]),
                ],
            ),
            (
                2,
                vec![item(
                    3,
                    2021,
                    vec![
                        variant("1080p", "web", "BBB"),
                        variant("720p", "bluray", "CCC"),
                    ],
                )],
            ),
        ]
        .into_iter()
        .collect(),
    };

    let config = RunConfig {
        output_dir: Some(dir.path().to_path_buf()),
        criteria: FilterCriteria {
            year_limit: 2000,
            format: FormatFilter::Format("web".to_string()),
            quality: QualityFilter::All,
        },
        ..RunConfig::default()
    };

    let outcome = runner(catalog, config).run().await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            downloaded: 2,
            skipped_existing: 0,
            failed: 0,
        }
    );
    assert!(dir
        .path()
        .join("Movie 1 (2020) Web 1080p (AAA).torrent")
        .is_file());
    assert!(dir
        .path()
        .join("Movie 3 (2021) Web 1080p (BBB).torrent")
        .is_file());
    // The bluray variant was filtered out, not just skipped.
    assert!(!dir
        .path()
        .join("Movie 3 (2021) Bluray 720p (CCC).torrent")
        .exists());
}

#[tokio::test]
async fn test_duplicate_hash_across_pages_downloaded_once() {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = FakeCatalog {
        movie_count: 60,
        pages: [
            (1, vec![item(1, 2020, vec![variant("1080p", "web", "SAME")])]),
            (2, vec![item(2, 2021, vec![variant("1080p", "web", "SAME")])]),
        ]
        .into_iter()
        .collect(),
    };

    let config = RunConfig {
        output_dir: Some(dir.path().to_path_buf()),
        ..RunConfig::default()
    };

    let outcome = runner(catalog, config).run().await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            downloaded: 1,
            skipped_existing: 0,
            failed: 0,
        }
    );
}

#[tokio::test]
async fn test_empty_query_yields_no_results() {
    let catalog = FakeCatalog {
        movie_count: 0,
        pages: HashMap::new(),
    };
    let outcome = runner(catalog, RunConfig::default()).run().await.unwrap();
    assert_eq!(outcome, RunOutcome::NoResults);
}

#[tokio::test]
async fn test_everything_filtered_out_yields_no_results() {
    let catalog = FakeCatalog {
        movie_count: 1,
        pages: [(1, vec![item(1, 1980, vec![variant("720p", "web", "AAA")])])]
            .into_iter()
            .collect(),
    };
    let config = RunConfig {
        criteria: FilterCriteria {
            year_limit: 2000,
            ..FilterCriteria::default()
        },
        ..RunConfig::default()
    };
    let outcome = runner(catalog, config).run().await.unwrap();
    assert_eq!(outcome, RunOutcome::NoResults);
}
