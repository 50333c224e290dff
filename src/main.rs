//! Main entry point for the yts-grabber CLI

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use yts_grabber::cli::Cli;
use yts_grabber::pipeline::RunOutcome;
use yts_grabber::shutdown::{ShutdownCoordinator, ShutdownReason};

/// Install the log subscriber: `RUST_LOG` controls the filter (default
/// `yts_grabber=info`), `LOG_FORMAT=json` switches to line-delimited JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("yts_grabber=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok(format) if format.eq_ignore_ascii_case("json") => builder.json().init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    // Ctrl+C and a declined existing-files prompt both funnel into the
    // shared coordinator; workers stop at the next pair boundary.
    let shutdown = ShutdownCoordinator::shared();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - finishing in-flight downloads...");
                shutdown.request_shutdown(ShutdownReason::Interrupt);
            }
        }
    });

    // A query with no matches and a user-declined run are normal endings;
    // only genuine failures (e.g. the first page never succeeding) exit 1.
    match yts_grabber::cli::run(cli, shutdown).await {
        Ok(RunOutcome::Completed { downloaded, .. }) => {
            tracing::info!(downloaded = downloaded, "Run completed");
        }
        Ok(RunOutcome::NoResults) => {
            println!("Could not find any results with the given parameters.");
        }
        Ok(RunOutcome::Interrupted { downloaded, reason }) => {
            tracing::info!(downloaded = downloaded, reason = ?reason, "Run interrupted");
        }
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}
