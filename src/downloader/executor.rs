//! Download executor
//!
//! Runs the filtered, deduplicated (item, variant) pairs to completion,
//! either sequentially or through a bounded worker pool. Each pair is
//! independent: a failure is counted and reported, never fatal. Shutdown is
//! polled between pairs so Ctrl+C or a declined prompt stops the run at the
//! next boundary without tearing half-written files.

use crate::client::ArtifactClient;
use crate::dedup::Deduplicator;
use crate::downloader::config::{DOWNLOAD_POOL_WIDTH, POSTER_EXTENSION, TORRENT_EXTENSION};
use crate::downloader::gate::ExistingFileGate;
use crate::downloader::{DownloadError, DownloadOutcome, DownloadResult};
use crate::output::PathBuilder;
use crate::report::{ReportEvent, SharedReporter};
use crate::shutdown::SharedShutdown;
use crate::{CatalogItem, TorrentVariant};
use futures_util::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Aggregate counts for one download run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadStats {
    /// Descriptors written to disk
    pub downloaded: u64,
    /// Targets that already existed
    pub skipped_existing: u64,
    /// Variants whose hash was already claimed this run
    pub skipped_duplicate: u64,
    /// Failed downloads or writes
    pub failed: u64,
    /// Pairs not attempted due to shutdown
    pub cancelled: u64,
}

impl DownloadStats {
    fn absorb(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded => self.downloaded += 1,
            DownloadOutcome::SkippedExisting => self.skipped_existing += 1,
            DownloadOutcome::SkippedDuplicate => self.skipped_duplicate += 1,
            DownloadOutcome::Failed => self.failed += 1,
            DownloadOutcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// Appends an extension without treating dots in the stem as an existing
/// extension ("Movie 4.0 (AAA)" must not lose its tail).
fn with_added_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push('.');
    name.push_str(extension);
    path.with_file_name(name)
}

/// Downloads torrent descriptors (and optionally posters) for catalog items.
pub struct DownloadExecutor {
    artifact_client: Arc<dyn ArtifactClient>,
    path_builder: PathBuilder,
    dedup: Arc<Deduplicator>,
    gate: Arc<ExistingFileGate>,
    reporter: SharedReporter,
    shutdown: SharedShutdown,
    download_posters: bool,
    concurrent: bool,
}

impl DownloadExecutor {
    /// Create an executor. Posters off and sequential execution by default.
    pub fn new(
        artifact_client: Arc<dyn ArtifactClient>,
        path_builder: PathBuilder,
        dedup: Arc<Deduplicator>,
        gate: Arc<ExistingFileGate>,
        reporter: SharedReporter,
        shutdown: SharedShutdown,
    ) -> Self {
        Self {
            artifact_client,
            path_builder,
            dedup,
            gate,
            reporter,
            shutdown,
            download_posters: false,
            concurrent: false,
        }
    }

    /// Enable or disable poster downloads.
    pub fn with_posters(mut self, download_posters: bool) -> Self {
        self.download_posters = download_posters;
        self
    }

    /// Run pairs through a bounded worker pool instead of sequentially.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Download every (item, variant) pair across `items`.
    pub async fn run(&self, items: &[CatalogItem]) -> DownloadStats {
        let pairs: Vec<(&CatalogItem, &TorrentVariant)> = items
            .iter()
            .flat_map(|item| item.torrents.iter().map(move |variant| (item, variant)))
            .collect();

        let mut stats = DownloadStats::default();

        if self.concurrent {
            let outcomes: Vec<DownloadOutcome> = stream::iter(pairs)
                .map(|(item, variant)| self.process_pair(item, variant))
                .buffer_unordered(DOWNLOAD_POOL_WIDTH)
                .collect()
                .await;
            for outcome in outcomes {
                stats.absorb(outcome);
            }
        } else {
            for (item, variant) in pairs {
                stats.absorb(self.process_pair(item, variant).await);
            }
        }

        stats
    }

    /// One variant end to end: claim, path fan-out, existence check,
    /// download, write.
    async fn process_pair(&self, item: &CatalogItem, variant: &TorrentVariant) -> DownloadOutcome {
        if self.shutdown.is_shutdown_requested() {
            return DownloadOutcome::Cancelled;
        }

        if !self.dedup.claim(&variant.hash) {
            debug!(hash = %variant.hash, title = %item.sanitized_title, "Duplicate hash, skipping");
            return DownloadOutcome::SkippedDuplicate;
        }

        let targets = self.target_paths(item, variant);
        let torrent_targets: Vec<PathBuf> = targets
            .iter()
            .map(|path| with_added_extension(path, TORRENT_EXTENSION))
            .collect();

        if torrent_targets.iter().all(|path| path.is_file()) {
            self.reporter
                .event(ReportEvent::ItemSkippedExisting(item.sanitized_title.clone()));
            self.gate.record_skip().await;
            return DownloadOutcome::SkippedExisting;
        }

        // Prompt may have been declined while this worker waited on the gate.
        if self.shutdown.is_shutdown_requested() {
            return DownloadOutcome::Cancelled;
        }

        let torrent_bytes = match self.artifact_client.fetch_bytes(&variant.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    title = %item.sanitized_title,
                    hash = %variant.hash,
                    error = %e,
                    "Torrent download failed, skipping"
                );
                return DownloadOutcome::Failed;
            }
        };

        let poster_bytes = if self.download_posters {
            self.fetch_poster(item).await
        } else {
            None
        };

        for (target, torrent_target) in targets.iter().zip(&torrent_targets) {
            if let Err(e) = write_artifact(torrent_target, &torrent_bytes).await {
                warn!(
                    path = %torrent_target.display(),
                    error = %e,
                    "Failed to write torrent descriptor"
                );
                return DownloadOutcome::Failed;
            }
            if let Some(bytes) = &poster_bytes {
                let poster_target = self.poster_path(target, item);
                if let Err(e) = write_artifact(&poster_target, bytes).await {
                    debug!(path = %poster_target.display(), error = %e, "Failed to write poster");
                }
            }
        }

        self.gate.record_success().await;
        self.reporter.event(ReportEvent::ItemDownloaded {
            name: item.sanitized_title.clone(),
            format: variant.display_format(),
            quality: variant.quality.clone(),
            hash: variant.hash.clone(),
        });

        DownloadOutcome::Downloaded
    }

    /// Extension-less target paths, one per genre directory the item files
    /// under (a single path for non-genre modes).
    fn target_paths(&self, item: &CatalogItem, variant: &TorrentVariant) -> Vec<PathBuf> {
        if self.path_builder.mode().involves_genre() {
            item.genres
                .iter()
                .map(|genre| self.path_builder.build(item, variant, Some(genre)))
                .collect()
        } else {
            vec![self.path_builder.build(item, variant, None)]
        }
    }

    /// Poster sits next to the descriptor, named after the title alone so
    /// every variant in the directory shares one image.
    fn poster_path(&self, torrent_target: &Path, item: &CatalogItem) -> PathBuf {
        let dir = torrent_target.parent().unwrap_or_else(|| Path::new(""));
        with_added_extension(&dir.join(&item.sanitized_title), POSTER_EXTENSION)
    }

    /// Best-effort poster fetch. Failures are logged and swallowed; the
    /// descriptor is the artifact that matters.
    async fn fetch_poster(&self, item: &CatalogItem) -> Option<Vec<u8>> {
        let url = item.poster_url.as_ref()?;
        match self.artifact_client.fetch_bytes(url).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(title = %item.sanitized_title, error = %e, "Poster download failed");
                None
            }
        }
    }
}

/// Create the parent directory and write the artifact bytes.
async fn write_artifact(path: &Path, bytes: &[u8]) -> DownloadResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::IoError(format!("{}: {e}", parent.display())))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| DownloadError::IoError(format!("{}: {e}", path.display())))
}
