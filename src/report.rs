//! Progress and report events
//!
//! The pipeline core never formats console output itself; it emits
//! [`ReportEvent`]s into a [`ReportSink`]. The default sink renders an
//! indicatif progress bar plus per-item lines; a quiet sink backs the
//! csv-only mode and tests.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Shared handle to a report sink.
pub type SharedReporter = Arc<dyn ReportSink>;

/// Structured events emitted by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// A listing page was fetched (`page`, `total_pages`)
    PageFetched(u32, u32),
    /// Download phase is starting with this many eligible torrents
    RunStarted(u64),
    /// View mode: one surviving variant to display
    ItemListed {
        /// Short title
        name: String,
        /// Release year
        year: u32,
        /// Display format (title case)
        format: String,
        /// Quality token
        quality: String,
        /// Human-readable size
        size: String,
        /// Torrent hash
        hash: String,
    },
    /// A torrent descriptor was downloaded and written
    ItemDownloaded {
        /// Sanitized title
        name: String,
        /// Display format (title case)
        format: String,
        /// Quality token
        quality: String,
        /// Torrent hash
        hash: String,
    },
    /// The target file already existed and was skipped
    ItemSkippedExisting(String),
    /// The existing-files prompt is about to block the run
    PromptNeeded,
    /// The run finished; count of downloaded torrents
    RunSummary(u64),
}

/// Sink for pipeline report events. Must tolerate concurrent emission from
/// multiple download workers without interleaving output.
pub trait ReportSink: Send + Sync {
    /// Handle one event.
    fn event(&self, event: ReportEvent);
}

/// Console sink: progress bar for downloads, numbered table rows for view
/// mode, plain lines for everything else.
pub struct ConsoleReporter {
    show_progress: bool,
    bar: Mutex<Option<ProgressBar>>,
    listing_ordinal: AtomicU64,
}

impl ConsoleReporter {
    /// Create a console reporter. `show_progress` enables the progress bar;
    /// view and csv-only runs pass `false`.
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            bar: Mutex::new(None),
            listing_ordinal: AtomicU64::new(1),
        }
    }

    /// Print through the progress bar when one is active so lines do not
    /// tear through the bar redraw.
    fn println(&self, line: &str) {
        let guard = self.bar.lock().expect("report bar lock poisoned");
        match guard.as_ref() {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}

impl ReportSink for ConsoleReporter {
    fn event(&self, event: ReportEvent) {
        match event {
            ReportEvent::PageFetched(page, total) => {
                self.println(&format!("Obtained page {page}/{total}"));
            }
            ReportEvent::RunStarted(total) => {
                if self.show_progress {
                    let bar = ProgressBar::new(total);
                    bar.set_style(
                        ProgressStyle::with_template(
                            "{msg} [{bar:40.cyan/blue}] {pos}/{len} files",
                        )
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                    );
                    bar.set_message("Downloading");
                    *self.bar.lock().expect("report bar lock poisoned") = Some(bar);
                }
            }
            ReportEvent::ItemListed {
                name,
                year,
                format,
                quality,
                size,
                hash,
            } => {
                let ordinal = self.listing_ordinal.fetch_add(1, Ordering::SeqCst);
                self.println(&format!(
                    "#{ordinal} {name} ({year}) [{format}, {quality}, {size}] {hash}"
                ));
            }
            ReportEvent::ItemDownloaded {
                name,
                format,
                quality,
                hash,
            } => {
                self.println(&format!("Downloaded {name} ({format}, {quality}) [{hash}]"));
                if let Some(bar) = self.bar.lock().expect("report bar lock poisoned").as_ref() {
                    bar.inc(1);
                }
            }
            ReportEvent::ItemSkippedExisting(name) => {
                self.println(&format!("{name}: File already exists. Skipping..."));
            }
            ReportEvent::PromptNeeded => {
                // The gate prints the prompt itself while holding its lock;
                // nothing to render here beyond keeping the bar intact.
            }
            ReportEvent::RunSummary(count) => {
                if let Some(bar) = self.bar.lock().expect("report bar lock poisoned").take() {
                    bar.finish_and_clear();
                }
                self.println(&format!("Download finished. {count} files downloaded."));
                info!(downloaded = count, "Run complete");
            }
        }
    }
}

/// Sink that records events in memory. Used by tests and quiet modes.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().expect("recording lock poisoned").clone()
    }
}

impl ReportSink for RecordingReporter {
    fn event(&self, event: ReportEvent) {
        self.events.lock().expect("recording lock poisoned").push(event);
    }
}
