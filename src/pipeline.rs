//! End-to-end pipeline orchestration
//!
//! Wires pagination, filtering, deduplication and the download executor
//! into one run: discover pages, flatten and filter the catalog, then hand
//! the surviving items to the configured terminal stage (download, CSV
//! export, or listing to the console).

use crate::client::pagination::{FetchMode, PaginationController};
use crate::client::{ArtifactClient, ClientError, ListingClient, ListingQuery};
use crate::dedup::Deduplicator;
use crate::downloader::gate::{ContinuePrompt, ExistingFileGate, StdinPrompt};
use crate::downloader::{DownloadExecutor, DownloadStats};
use crate::filter::{self, FilterCriteria};
use crate::output::csv::{CsvExportWriter, DEFAULT_CSV_PATH};
use crate::output::{CategorizeMode, OutputError, PathBuilder};
use crate::report::{ReportEvent, SharedReporter};
use crate::shutdown::{SharedShutdown, ShutdownReason};
use crate::CatalogItem;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Listing or artifact client failure that aborts the run
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// CSV export failure
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Terminal stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Download torrent descriptors (and optionally posters)
    #[default]
    Download,
    /// Write the CSV export only; nothing is downloaded
    CsvOnly,
    /// Print the surviving variants to the console; nothing is downloaded
    View,
}

/// Everything one run needs to know, assembled by the CLI.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Listing query shared by every page fetch
    pub query: ListingQuery,
    /// First page to fetch (1-based)
    pub start_page: u32,
    /// Year/format/quality criteria
    pub criteria: FilterCriteria,
    /// Directory layout policy
    pub categorize: CategorizeMode,
    /// Output root; `None` resolves to the categorization title, or the
    /// working directory for flat layouts
    pub output_dir: Option<PathBuf>,
    /// Download poster images alongside descriptors
    pub download_posters: bool,
    /// Append the IMDb id to file names
    pub include_imdb_id: bool,
    /// Fetch pages and artifacts through bounded worker pools
    pub concurrent: bool,
    /// Terminal stage
    pub mode: RunMode,
    /// CSV export path for [`RunMode::CsvOnly`]
    pub csv_path: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            query: ListingQuery::default(),
            start_page: 1,
            criteria: FilterCriteria::default(),
            categorize: CategorizeMode::None,
            output_dir: None,
            download_posters: false,
            include_imdb_id: false,
            concurrent: false,
            mode: RunMode::Download,
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
        }
    }
}

impl RunConfig {
    /// Output root for this run: the explicit directory when given, the
    /// categorization title for categorized layouts, the working directory
    /// otherwise.
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None if self.categorize != CategorizeMode::None => {
                PathBuf::from(self.categorize.title())
            }
            None => PathBuf::from("."),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Ran to completion
    Completed {
        /// Descriptors written (or rows exported / variants listed)
        downloaded: u64,
        /// Targets that already existed
        skipped_existing: u64,
        /// Failed downloads
        failed: u64,
    },
    /// The query matched nothing (or everything was filtered out)
    NoResults,
    /// Cut short by Ctrl+C or by the user declining the existing-files prompt
    Interrupted {
        /// Descriptors written before the interruption
        downloaded: u64,
        /// Which trigger ended the run
        reason: ShutdownReason,
    },
}

/// Orchestrates one run from query to terminal stage.
pub struct PipelineRunner {
    config: RunConfig,
    listing_client: Arc<dyn ListingClient>,
    artifact_client: Arc<dyn ArtifactClient>,
    reporter: SharedReporter,
    shutdown: SharedShutdown,
    prompt: Box<dyn ContinuePrompt>,
}

impl PipelineRunner {
    /// Create a runner with the interactive stdin prompt.
    pub fn new(
        config: RunConfig,
        listing_client: Arc<dyn ListingClient>,
        artifact_client: Arc<dyn ArtifactClient>,
        reporter: SharedReporter,
        shutdown: SharedShutdown,
    ) -> Self {
        Self {
            config,
            listing_client,
            artifact_client,
            reporter,
            shutdown,
            prompt: Box::new(StdinPrompt),
        }
    }

    /// Replace the existing-files prompt. Tests script answers through this.
    pub fn with_prompt(mut self, prompt: Box<dyn ContinuePrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Execute the run.
    ///
    /// # Errors
    /// Returns [`PipelineError::Client`] when the starting page never
    /// succeeds and [`PipelineError::Output`] when the CSV export fails.
    /// Per-item download failures are counted, not returned.
    pub async fn run(self) -> PipelineResult<RunOutcome> {
        let fetch_mode = if self.config.concurrent {
            FetchMode::Concurrent
        } else {
            FetchMode::Sequential
        };
        let controller = PaginationController::new(
            Arc::clone(&self.listing_client),
            self.reporter.clone(),
            self.shutdown.clone(),
            fetch_mode,
        );

        let fetch = controller
            .discover_and_fetch_all(&self.config.query, self.config.start_page)
            .await?;

        if fetch.movie_count == 0 {
            info!("Could not find any results with the given parameters");
            return Ok(RunOutcome::NoResults);
        }

        let items: Vec<CatalogItem> = fetch
            .pages
            .into_iter()
            .flat_map(|page| page.items)
            .collect();
        let items = filter::apply(items, &self.config.criteria);

        if items.is_empty() {
            info!("No results left after filtering");
            return Ok(RunOutcome::NoResults);
        }

        let torrent_count = filter::torrent_count(&items);
        debug!(
            items = items.len(),
            torrents = torrent_count,
            "Catalog filtered"
        );

        match self.config.mode {
            RunMode::View => self.run_view(&items),
            RunMode::CsvOnly => self.run_csv_export(&items),
            RunMode::Download => self.run_downloads(&items, torrent_count).await,
        }
    }

    /// List every surviving variant through the reporter.
    fn run_view(&self, items: &[CatalogItem]) -> PipelineResult<RunOutcome> {
        let mut listed = 0u64;
        for item in items {
            for variant in &item.torrents {
                self.reporter.event(ReportEvent::ItemListed {
                    name: item.title.clone(),
                    year: item.year,
                    format: variant.display_format(),
                    quality: variant.quality.clone(),
                    size: variant.size_label.clone(),
                    hash: variant.hash.clone(),
                });
                listed += 1;
            }
        }
        Ok(RunOutcome::Completed {
            downloaded: listed,
            skipped_existing: 0,
            failed: 0,
        })
    }

    /// Export one CSV row per surviving variant; duplicate hashes are
    /// exported once, mirroring the download path.
    fn run_csv_export(&self, items: &[CatalogItem]) -> PipelineResult<RunOutcome> {
        let dedup = Deduplicator::new();
        let mut writer = CsvExportWriter::open(&self.config.csv_path)?;
        for item in items {
            for variant in &item.torrents {
                if dedup.claim(&variant.hash) {
                    writer.write_row(item, variant)?;
                }
            }
        }
        let rows = writer.rows_written();
        writer.close()?;
        info!(rows = rows, path = %self.config.csv_path.display(), "CSV export written");
        Ok(RunOutcome::Completed {
            downloaded: rows,
            skipped_existing: 0,
            failed: 0,
        })
    }

    /// Download every surviving variant into the resolved output tree.
    async fn run_downloads(
        self,
        items: &[CatalogItem],
        torrent_count: u64,
    ) -> PipelineResult<RunOutcome> {
        self.reporter.event(ReportEvent::RunStarted(torrent_count));

        let path_builder = PathBuilder::new(
            self.config.resolved_output_dir(),
            self.config.categorize,
            self.config.include_imdb_id,
            self.config.download_posters,
        );
        let gate = Arc::new(ExistingFileGate::new(
            self.prompt,
            self.reporter.clone(),
            self.shutdown.clone(),
        ));
        let executor = DownloadExecutor::new(
            self.artifact_client,
            path_builder,
            Arc::new(Deduplicator::new()),
            gate,
            self.reporter.clone(),
            self.shutdown.clone(),
        )
        .with_posters(self.config.download_posters)
        .with_concurrency(self.config.concurrent);

        let stats: DownloadStats = executor.run(items).await;
        self.reporter.event(ReportEvent::RunSummary(stats.downloaded));

        if let Some(reason) = self.shutdown.reason() {
            return Ok(RunOutcome::Interrupted {
                downloaded: stats.downloaded,
                reason,
            });
        }
        Ok(RunOutcome::Completed {
            downloaded: stats.downloaded,
            skipped_existing: stats.skipped_existing,
            failed: stats.failed,
        })
    }
}
