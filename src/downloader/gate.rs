//! Existing-file gate
//!
//! When a run keeps landing on files that already exist, the remaining work
//! is probably redundant. The gate counts consecutive already-existing
//! targets and, once the count passes [`EXISTING_FILE_THRESHOLD`], pauses
//! the run and asks the user whether to continue. Answering no requests
//! shutdown (a clean exit, not an error); answering yes latches the gate so
//! the question is asked at most once per run.
//!
//! The counter and the prompt share one async mutex, so concurrent workers
//! that hit existing files while the prompt is open block behind it rather
//! than asking twice.

use crate::downloader::config::EXISTING_FILE_THRESHOLD;
use crate::report::{ReportEvent, SharedReporter};
use crate::shutdown::{SharedShutdown, ShutdownReason};
use async_trait::async_trait;
use std::io::Write;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Answers the continue-or-stop question. Abstracted so tests can script
/// answers instead of reading stdin.
#[async_trait]
pub trait ContinuePrompt: Send + Sync {
    /// Ask whether the run should continue. `existing_count` is the number
    /// of consecutive already-existing files seen so far.
    async fn should_continue(&self, existing_count: u32) -> bool;
}

/// Interactive prompt on stdin. Re-asks until the answer is Y or N.
pub struct StdinPrompt;

#[async_trait]
impl ContinuePrompt for StdinPrompt {
    async fn should_continue(&self, existing_count: u32) -> bool {
        // Stdin reads block, so hand them to the blocking pool.
        tokio::task::spawn_blocking(move || loop {
            print!(
                "{existing_count} consecutive files already exist. Do you wish to continue? Y/N: "
            );
            let _ = std::io::stdout().flush();

            let mut answer = String::new();
            if std::io::stdin().read_line(&mut answer).is_err() {
                return false;
            }
            match answer.trim() {
                "Y" | "y" => return true,
                "N" | "n" => return false,
                _ => continue,
            }
        })
        .await
        .unwrap_or(false)
    }
}

#[derive(Debug, Default)]
struct GateState {
    consecutive_existing: u32,
    latched: bool,
}

/// Tracks consecutive already-existing targets and escalates to the prompt
/// past the threshold.
pub struct ExistingFileGate {
    state: Mutex<GateState>,
    prompt: Box<dyn ContinuePrompt>,
    reporter: SharedReporter,
    shutdown: SharedShutdown,
    threshold: u32,
}

impl ExistingFileGate {
    /// Create a gate with the default threshold.
    pub fn new(
        prompt: Box<dyn ContinuePrompt>,
        reporter: SharedReporter,
        shutdown: SharedShutdown,
    ) -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            prompt,
            reporter,
            shutdown,
            threshold: EXISTING_FILE_THRESHOLD,
        }
    }

    /// Override the escalation threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Record a successful download, breaking any existing-file streak.
    pub async fn record_success(&self) {
        self.state.lock().await.consecutive_existing = 0;
    }

    /// Record an already-existing target. May block on the user prompt when
    /// the streak passes the threshold; a declined prompt requests shutdown.
    pub async fn record_skip(&self) {
        let mut state = self.state.lock().await;
        state.consecutive_existing += 1;

        if state.latched || state.consecutive_existing <= self.threshold {
            return;
        }
        if self.shutdown.is_shutdown_requested() {
            return;
        }

        let count = state.consecutive_existing;
        debug!(consecutive = count, "Existing-file streak passed threshold");
        self.reporter.event(ReportEvent::PromptNeeded);

        if self.prompt.should_continue(count).await {
            info!("Continuing past existing files without further prompts");
            state.latched = true;
            state.consecutive_existing = 0;
        } else {
            info!("User declined to continue past existing files");
            self.shutdown.request_shutdown(ShutdownReason::Declined);
        }
    }

    /// Current streak length. Exposed for tests.
    pub async fn consecutive_existing(&self) -> u32 {
        self.state.lock().await.consecutive_existing
    }
}
