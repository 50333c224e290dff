//! Pagination controller tests against a scripted listing client

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use yts_grabber::client::pagination::{FetchMode, PaginationController};
use yts_grabber::client::{
    ClientError, ClientResult, ListingClient, ListingQuery, PageResponse,
};
use yts_grabber::report::{RecordingReporter, ReportEvent, SharedReporter};
use yts_grabber::shutdown::ShutdownCoordinator;
use yts_grabber::{CatalogItem, TorrentVariant};

fn item(id: u64) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("Movie {id}"),
        sanitized_title: format!("Movie {id} (2020)"),
        year: 2020,
        rating: 6.5,
        genres: vec!["Action".to_string()],
        language: "en".to_string(),
        imdb_code: None,
        listing_url: String::new(),
        poster_url: None,
        torrents: vec![TorrentVariant {
            quality: "1080p".to_string(),
            format: "web".to_string(),
            size_label: "1 GB".to_string(),
            hash: format!("H{id}"),
            url: format!("https://yts.mx/torrent/download/H{id}"),
        }],
    }
}

struct FakeListing {
    movie_count: u64,
    pages: HashMap<u32, Vec<CatalogItem>>,
    fail_pages: HashSet<u32>,
    calls: AtomicU32,
}

impl FakeListing {
    fn with_pages(movie_count: u64, pages: Vec<(u32, Vec<CatalogItem>)>) -> Self {
        Self {
            movie_count,
            pages: pages.into_iter().collect(),
            fail_pages: HashSet::new(),
            calls: AtomicU32::new(0),
        }
    }

    fn failing(mut self, pages: &[u32]) -> Self {
        self.fail_pages = pages.iter().copied().collect();
        self
    }
}

#[async_trait]
impl ListingClient for FakeListing {
    async fn fetch_page(&self, _query: &ListingQuery, page: u32) -> ClientResult<PageResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pages.contains(&page) {
            return Err(ClientError::NetworkError("connection reset".to_string()));
        }
        Ok(PageResponse {
            movie_count: self.movie_count,
            items: self.pages.get(&page).cloned().unwrap_or_default(),
        })
    }
}

fn controller(client: Arc<FakeListing>, mode: FetchMode) -> (PaginationController, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::new());
    let shared: SharedReporter = reporter.clone();
    let ctrl = PaginationController::new(client, shared, ShutdownCoordinator::shared(), mode);
    (ctrl, reporter)
}

#[tokio::test]
async fn test_sequential_fetch_collects_all_pages_in_order() {
    let client = Arc::new(FakeListing::with_pages(
        120,
        vec![
            (1, vec![item(1)]),
            (2, vec![item(2)]),
            (3, vec![item(3)]),
        ],
    ));
    let (ctrl, reporter) = controller(client, FetchMode::Sequential);

    let fetch = ctrl
        .discover_and_fetch_all(&ListingQuery::default(), 1)
        .await
        .unwrap();

    assert_eq!(fetch.movie_count, 120);
    assert_eq!(fetch.page_count, 3);
    let numbers: Vec<u32> = fetch.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let fetched_events = reporter
        .events()
        .iter()
        .filter(|e| matches!(e, ReportEvent::PageFetched(_, _)))
        .count();
    assert_eq!(fetched_events, 3);
}

#[tokio::test]
async fn test_failed_later_page_is_skipped() {
    let client = Arc::new(
        FakeListing::with_pages(
            150,
            vec![(1, vec![item(1)]), (2, vec![item(2)]), (3, vec![item(3)])],
        )
        .failing(&[2]),
    );
    let (ctrl, _) = controller(client, FetchMode::Sequential);

    let fetch = ctrl
        .discover_and_fetch_all(&ListingQuery::default(), 1)
        .await
        .unwrap();

    let numbers: Vec<u32> = fetch.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 3]);
}

#[tokio::test]
async fn test_concurrent_fetch_is_sorted_and_complete() {
    let pages: Vec<(u32, Vec<CatalogItem>)> =
        (1..=8).map(|n| (n, vec![item(n as u64)])).collect();
    let client = Arc::new(FakeListing::with_pages(400, pages));
    let (ctrl, _) = controller(client, FetchMode::Concurrent);

    let fetch = ctrl
        .discover_and_fetch_all(&ListingQuery::default(), 1)
        .await
        .unwrap();

    let numbers: Vec<u32> = fetch.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, (1..=8).collect::<Vec<u32>>());
}

#[tokio::test(start_paused = true)]
async fn test_first_page_retry_exhaustion_is_fatal() {
    let client = Arc::new(FakeListing::with_pages(100, vec![]).failing(&[1, 2, 3, 4, 5]));
    let (ctrl, _) = controller(client.clone(), FetchMode::Sequential);

    let result = ctrl
        .discover_and_fetch_all(&ListingQuery::default(), 1)
        .await;

    match result {
        Err(ClientError::ExhaustedRetries { attempts, .. }) => assert_eq!(attempts, 10),
        other => panic!("expected ExhaustedRetries, got {other:?}"),
    }
    assert_eq!(client.calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn test_zero_results_short_circuits() {
    let client = Arc::new(FakeListing::with_pages(0, vec![]));
    let (ctrl, reporter) = controller(client.clone(), FetchMode::Sequential);

    let fetch = ctrl
        .discover_and_fetch_all(&ListingQuery::default(), 1)
        .await
        .unwrap();

    assert_eq!(fetch.movie_count, 0);
    assert!(fetch.pages.is_empty());
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert!(reporter.events().is_empty());
}

#[tokio::test]
async fn test_start_page_past_last_page_is_harmless() {
    // A debug-level subscriber makes the completion log's fields evaluate.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    // 100 results is two pages; asking for page 5 leaves no remaining range.
    let client = Arc::new(FakeListing::with_pages(100, vec![(5, vec![item(5)])]));
    let (ctrl, _) = controller(client.clone(), FetchMode::Sequential);

    let fetch = ctrl
        .discover_and_fetch_all(&ListingQuery::default(), 5)
        .await
        .unwrap();

    assert_eq!(fetch.page_count, 2);
    let numbers: Vec<u32> = fetch.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![5]);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_start_page_offsets_fetching() {
    let client = Arc::new(FakeListing::with_pages(
        150,
        vec![(2, vec![item(2)]), (3, vec![item(3)])],
    ));
    let (ctrl, _) = controller(client, FetchMode::Sequential);

    let fetch = ctrl
        .discover_and_fetch_all(&ListingQuery::default(), 2)
        .await
        .unwrap();

    let numbers: Vec<u32> = fetch.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![2, 3]);
}
