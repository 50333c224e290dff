//! Artifact download orchestration
//!
//! This module turns filtered, deduplicated catalog items into files on
//! disk. For every surviving (item, variant) pair the executor builds the
//! target path(s), downloads the torrent descriptor (and optionally the
//! poster), and writes them atomically enough for an interrupted run to be
//! safely re-run.
//!
//! # Overview
//!
//! 1. **Claiming**: [`crate::dedup::Deduplicator`] grants each torrent hash
//!    to exactly one worker
//! 2. **Path building**: [`crate::output::PathBuilder`] maps metadata to
//!    categorized target paths, fanning out per genre when configured
//! 3. **Existing-file gate**: [`gate::ExistingFileGate`] counts consecutive
//!    skips and asks the user whether to continue past the threshold
//! 4. **Execution**: [`executor::DownloadExecutor`] runs the pairs either
//!    sequentially or through a bounded worker pool
//!
//! # Error Handling
//!
//! A failed torrent download is reported and skipped; it never aborts the
//! run. A failed poster download is logged at debug level only, since the
//! descriptor is the artifact that matters.

pub mod config;
pub mod executor;
pub mod gate;

pub use executor::{DownloadExecutor, DownloadStats};
pub use gate::{ContinuePrompt, ExistingFileGate, StdinPrompt};

/// Download errors
///
/// Fetch failures never surface here: they are reported and counted per
/// pair. Only filesystem writes produce a typed error.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Filesystem error while writing an artifact
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for download operations
pub type DownloadResult<T> = Result<T, DownloadError>;

/// Terminal state of one (item, variant) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Descriptor written to disk
    Downloaded,
    /// Target file already existed
    SkippedExisting,
    /// Hash already claimed by another listing this run
    SkippedDuplicate,
    /// Download or write failed; reported and passed over
    Failed,
    /// Not attempted because shutdown was requested
    Cancelled,
}
