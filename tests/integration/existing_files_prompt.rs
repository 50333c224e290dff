//! Existing-files prompt behavior across a full run

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use yts_grabber::client::{
    ArtifactClient, ClientResult, ListingClient, ListingQuery, PageResponse,
};
use yts_grabber::downloader::ContinuePrompt;
use yts_grabber::pipeline::{PipelineRunner, RunConfig, RunOutcome};
use yts_grabber::report::RecordingReporter;
use yts_grabber::shutdown::{ShutdownCoordinator, ShutdownReason};
use yts_grabber::{CatalogItem, TorrentVariant};

fn item(id: u64) -> CatalogItem {
    CatalogItem {
        id,
        title: format!("Movie {id}"),
        sanitized_title: format!("Movie {id} (2020)"),
        year: 2020,
        rating: 7.0,
        genres: vec!["Action".to_string()],
        language: "en".to_string(),
        imdb_code: None,
        listing_url: String::new(),
        poster_url: None,
        torrents: vec![TorrentVariant {
            quality: "1080p".to_string(),
            format: "web".to_string(),
            size_label: "1 GB".to_string(),
            hash: format!("H{id:03}"),
            url: format!("https://yts.mx/torrent/download/H{id:03}"),
        }],
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

struct FakeArtifacts;

#[async_trait]
impl ArtifactClient for FakeArtifacts {
    async fn fetch_bytes(&self, _url: &str) -> ClientResult<Vec<u8>> {
        Ok(b"payload".to_vec())
    }
}

struct ScriptedPrompt {
    answer: bool,
    asked: Arc<AtomicU32>,
}

#[async_trait]
impl ContinuePrompt for ScriptedPrompt {
    async fn should_continue(&self, _existing_count: u32) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

fn config_for(dir: &std::path::Path) -> RunConfig {
    RunConfig {
        output_dir: Some(dir.to_path_buf()),
        ..RunConfig::default()
    }
}

fn runner(items: Vec<CatalogItem>, config: RunConfig) -> PipelineRunner {
    PipelineRunner::new(
        config,
        Arc::new(FakeCatalog { items }),
        Arc::new(FakeArtifacts),
        Arc::new(RecordingReporter::new()),
        ShutdownCoordinator::shared(),
    )
}

/// A second identical run lands on every file it wrote the first time. More
/// than ten consecutive hits must raise the prompt exactly once; declining
/// ends the run cleanly.
#[tokio::test]
async fn test_decline_after_threshold_interrupts_run() {
    let dir = tempfile::TempDir::new().unwrap();
    let items: Vec<CatalogItem> = (1..=15).map(item).collect();

    let first = runner(items.clone(), config_for(dir.path()))
        .run()
        .await
        .unwrap();
    assert_eq!(
        first,
        RunOutcome::Completed {
            downloaded: 15,
            skipped_existing: 0,
            failed: 0,
        }
    );

    let asked = Arc::new(AtomicU32::new(0));
    let second = runner(items, config_for(dir.path()))
        .with_prompt(Box::new(ScriptedPrompt {
            answer: false,
            asked: asked.clone(),
        }))
        .run()
        .await
        .unwrap();

    assert_eq!(asked.load(Ordering::SeqCst), 1);
    assert!(matches!(
        second,
        RunOutcome::Interrupted {
            downloaded: 0,
            reason: ShutdownReason::Declined,
        }
    ));
}

#[tokio::test]
async fn test_accept_continues_without_reprompting() {
    let dir = tempfile::TempDir::new().unwrap();
    let items: Vec<CatalogItem> = (1..=30).map(item).collect();

    runner(items.clone(), config_for(dir.path()))
        .run()
        .await
        .unwrap();

    let asked = Arc::new(AtomicU32::new(0));
    let second = runner(items, config_for(dir.path()))
        .with_prompt(Box::new(ScriptedPrompt {
            answer: true,
            asked: asked.clone(),
        }))
        .run()
        .await
        .unwrap();

    // 30 consecutive existing files, one prompt, run finishes.
    assert_eq!(asked.load(Ordering::SeqCst), 1);
    assert_eq!(
        second,
        RunOutcome::Completed {
            downloaded: 0,
            skipped_existing: 30,
            failed: 0,
        }
    );
}

#[tokio::test]
async fn test_few_existing_files_never_prompt() {
    let dir = tempfile::TempDir::new().unwrap();
    let items: Vec<CatalogItem> = (1..=5).map(item).collect();

    runner(items.clone(), config_for(dir.path()))
        .run()
        .await
        .unwrap();

    let asked = Arc::new(AtomicU32::new(0));
    let second = runner(items, config_for(dir.path()))
        .with_prompt(Box::new(ScriptedPrompt {
            answer: false,
            asked: asked.clone(),
        }))
        .run()
        .await
        .unwrap();

    assert_eq!(asked.load(Ordering::SeqCst), 0);
    assert_eq!(
        second,
        RunOutcome::Completed {
            downloaded: 0,
            skipped_existing: 5,
            failed: 0,
        }
    );
}
