//! Early-exit coordination.
//!
//! A run can be cut short two ways: Ctrl+C, or the user declining the
//! existing-files prompt. Both funnel into a shared [`ShutdownCoordinator`]
//! that download workers and the pagination loop poll, and the coordinator
//! records which trigger fired first so the run's outcome can report the
//! ending it actually had.

use std::pin::pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared handle to a shutdown coordinator.
pub type SharedShutdown = Arc<ShutdownCoordinator>;

/// Why a run is stopping early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl+C or another external interrupt
    Interrupt,
    /// The user answered "N" to the existing-files prompt
    Declined,
}

const RUNNING: u8 = 0;
const INTERRUPT: u8 = 1;
const DECLINED: u8 = 2;

/// Coordinates early exit across async tasks.
///
/// The state is a single atomic: `RUNNING` until the first
/// [`request_shutdown`](Self::request_shutdown) call, then the encoded
/// reason forever. Later calls with a different reason lose the race and
/// change nothing.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    state: AtomicU8,
    notify: Notify,
}

impl ShutdownCoordinator {
    /// Create a new coordinator.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
            notify: Notify::new(),
        }
    }

    /// Create a new shared coordinator wrapped in [`Arc`].
    pub fn shared() -> SharedShutdown {
        Arc::new(Self::new())
    }

    /// Request shutdown for `reason`. The first caller wins and waiters are
    /// notified exactly once.
    pub fn request_shutdown(&self, reason: ShutdownReason) {
        let encoded = match reason {
            ShutdownReason::Interrupt => INTERRUPT,
            ShutdownReason::Declined => DECLINED,
        };
        if self
            .state
            .compare_exchange(RUNNING, encoded, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.notify.notify_waiters();
        }
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.state.load(Ordering::SeqCst) != RUNNING
    }

    /// The recorded reason, once shutdown has been requested.
    pub fn reason(&self) -> Option<ShutdownReason> {
        match self.state.load(Ordering::SeqCst) {
            INTERRUPT => Some(ShutdownReason::Interrupt),
            DECLINED => Some(ShutdownReason::Declined),
            _ => None,
        }
    }

    /// Wait until shutdown is requested. Returns immediately if already set.
    pub async fn wait_for_shutdown(&self) {
        // Register interest before checking the flag so a request landing
        // in between cannot be missed.
        let mut notified = pin!(self.notify.notified());
        notified.as_mut().enable();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }
}
