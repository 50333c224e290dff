//! CSV-only and view terminal stages

use async_trait::async_trait;
use std::sync::Arc;
use yts_grabber::client::{
    ArtifactClient, ClientError, ClientResult, ListingClient, ListingQuery, PageResponse,
};
use yts_grabber::pipeline::{PipelineRunner, RunConfig, RunMode, RunOutcome};
use yts_grabber::report::{RecordingReporter, ReportEvent};
use yts_grabber::shutdown::ShutdownCoordinator;
use yts_grabber::{CatalogItem, TorrentVariant};

fn item(id: u64, hashes: &[&str]) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("Movie {id}"),
        sanitized_title: format!("Movie {id} (2020)"),
        year: 2020,
        rating: 7.5,
        genres: vec!["Drama".to_string()],
        language: "en".to_string(),
        imdb_code: Some(format!("tt{id:07}")),
        listing_url: format!("https://yts.mx/movies/movie-{id}"),
        poster_url: None,
        torrents: hashes
            .iter()
            .map(|hash| TorrentVariant {
                quality: "1080p".to_string(),
                format: "web".to_string(),
                size_label: "1.4 GB".to_string(),
                hash: hash.to_string(),
                url: format!("https://yts.mx/torrent/download/{hash}"),
            })
            .collect(),
    }
}

struct FakeCatalog {
    items: Vec<CatalogItem>,
}

#[async_trait]
impl ListingClient for FakeCatalog {
    async fn fetch_page(&self, _query: &ListingQuery, page: u32) -> ClientResult<PageResponse> {
        Ok(PageResponse {
            movie_count: self.items.len() as u64,
            items: if page == 1 {
                self.items.clone()
            } else {
                Vec::new()
            },
        })
    }
}

/// Fails every fetch; csv-only and view runs must never ask for artifacts.
struct NoArtifacts;

#[async_trait]
impl ArtifactClient for NoArtifacts {
    async fn fetch_bytes(&self, url: &str) -> ClientResult<Vec<u8>> {
        Err(ClientError::NetworkError(format!(
            "unexpected artifact fetch: {url}"
        )))
    }
}

fn runner(
    items: Vec<CatalogItem>,
    config: RunConfig,
) -> (PipelineRunner, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::new());
    let runner = PipelineRunner::new(
        config,
        Arc::new(FakeCatalog { items }),
        Arc::new(NoArtifacts),
        reporter.clone(),
        ShutdownCoordinator::shared(),
    );
    (runner, reporter)
}

#[tokio::test]
async fn test_csv_only_writes_rows_and_downloads_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let csv_path = dir.path().join("export.csv");

    let config = RunConfig {
        mode: RunMode::CsvOnly,
        csv_path: csv_path.clone(),
        ..RunConfig::default()
    };
    let items = vec![
        item(1, &["AAA", "BBB"]),
        item(2, &["CCC"]),
        // Same physical torrent as item 1's first variant.
        item(3, &["AAA"]),
    ];

    let (runner, _) = runner(items, config);
    let outcome = runner.run().await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            downloaded: 3,
            skipped_existing: 0,
            failed: 0,
        }
    );

    let content = std::fs::read_to_string(&csv_path).unwrap();
    // Header plus three rows; the duplicate hash is exported once.
    assert_eq!(content.lines().count(), 4);
    assert!(content.lines().next().unwrap().contains("Torrent URL"));
    assert!(content.contains("tt0000002"));
}

#[tokio::test]
async fn test_view_mode_lists_variants_without_downloading() {
    let config = RunConfig {
        mode: RunMode::View,
        ..RunConfig::default()
    };
    let (runner, reporter) = runner(vec![item(1, &["AAA", "BBB"]), item(2, &["CCC"])], config);

    let outcome = runner.run().await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            downloaded: 3,
            skipped_existing: 0,
            failed: 0,
        }
    );

    let listed: Vec<ReportEvent> = reporter
        .events()
        .into_iter()
        .filter(|e| matches!(e, ReportEvent::ItemListed { .. }))
        .collect();
    assert_eq!(listed.len(), 3);
    assert!(matches!(
        &listed[0],
        ReportEvent::ItemListed { name, quality, .. }
            if name == "Movie 1" && quality == "1080p"
    ));
}
