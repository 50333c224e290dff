//! Argument parsing and run entry point

use crate::cli::CliError;
use crate::client::http::YtsHttpClient;
use crate::client::{ListingQuery, SortField};
use crate::filter::{FilterCriteria, FormatFilter, QualityFilter};
use crate::output::CategorizeMode;
use crate::pipeline::{PipelineRunner, RunConfig, RunMode, RunOutcome};
use crate::report::ConsoleReporter;
use crate::shutdown::SharedShutdown;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// YTS bulk torrent descriptor downloader
#[derive(Parser, Debug)]
#[command(name = "yts-grabber")]
#[command(about = "Bulk download YTS torrent files filtered by year, quality and format", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output directory (defaults to the categorization name, or the
    /// working directory for flat layouts)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Genre passed through to the listing API ("all" disables it)
    #[arg(short, long, default_value = "all")]
    pub genre: String,

    /// Minimum rating (0-9)
    #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=9))]
    pub rating: u8,

    /// Quality to download: all, 720p, 1080p, 2160p or 3d
    #[arg(short, long, default_value = "all")]
    pub quality: String,

    /// Release format: all, web or bluray
    #[arg(short, long, default_value = "all")]
    pub format: String,

    /// Directory layout: none, rating, genre, rating-genre or genre-rating
    #[arg(short, long, default_value = "none")]
    pub categorize_by: String,

    /// Sort field: title, year, rating, seeds, peers, download_count,
    /// like_count or latest
    #[arg(short, long, default_value = "title")]
    pub sort_by: String,

    /// Skip releases older than this year (0 disables the cutoff)
    #[arg(short, long, default_value = "0")]
    pub year_limit: u32,

    /// Page to start fetching from
    #[arg(short, long, default_value = "1")]
    pub page: u32,

    /// Download poster images alongside descriptors
    #[arg(short, long, default_value_t = false)]
    pub background: bool,

    /// Append the IMDb id to file names
    #[arg(short, long, default_value_t = false)]
    pub imdb_id: bool,

    /// Fetch pages and artifacts through bounded worker pools
    #[arg(short, long, default_value_t = false)]
    pub multiprocess: bool,

    /// Write the CSV export only; download nothing
    #[arg(long, default_value_t = false)]
    pub csv_only: bool,

    /// List matching torrents without downloading
    #[arg(long, default_value_t = false)]
    pub view: bool,

    /// Free-text search term
    #[arg(short, long, default_value = "")]
    pub text: String,
}

impl Cli {
    /// Validate the arguments and assemble the run configuration.
    pub fn into_config(self) -> Result<RunConfig, CliError> {
        let quality: QualityFilter = self.quality.parse().map_err(CliError::InvalidArgument)?;
        let format: FormatFilter = self.format.parse().map_err(CliError::InvalidArgument)?;
        let categorize: CategorizeMode = self
            .categorize_by
            .parse()
            .map_err(CliError::InvalidArgument)?;
        let sort_by: SortField = self.sort_by.parse().map_err(CliError::InvalidArgument)?;

        if self.csv_only && self.view {
            return Err(CliError::InvalidArgument(
                "--csv-only and --view are mutually exclusive".to_string(),
            ));
        }

        let mode = if self.csv_only {
            RunMode::CsvOnly
        } else if self.view {
            RunMode::View
        } else {
            RunMode::Download
        };

        Ok(RunConfig {
            query: ListingQuery {
                genre: self.genre,
                minimum_rating: self.rating,
                sort_by,
                query_term: self.text,
            },
            start_page: self.page.max(1),
            criteria: FilterCriteria {
                year_limit: self.year_limit,
                format,
                quality,
            },
            categorize,
            output_dir: self.output,
            download_posters: self.background,
            include_imdb_id: self.imdb_id,
            concurrent: self.multiprocess,
            mode,
            ..RunConfig::default()
        })
    }
}

/// Print the startup banner describing the run.
fn print_banner(config: &RunConfig) {
    println!("YTS Grabber");
    println!("  quality:    {:?}", config.criteria.quality);
    println!("  format:     {:?}", config.criteria.format);
    println!("  genre:      {}", config.query.genre);
    println!("  min rating: {}", config.query.minimum_rating);
    if config.criteria.year_limit > 0 {
        println!("  year limit: {}", config.criteria.year_limit);
    }
    if config.mode == RunMode::Download {
        println!("  output:     {}", config.resolved_output_dir().display());
    }
}

/// Parse arguments, build the pipeline and execute one run.
///
/// # Errors
/// Returns [`CliError::InvalidArgument`] for unusable arguments and
/// propagates pipeline failures.
pub async fn run(cli: Cli, shutdown: SharedShutdown) -> Result<RunOutcome, CliError> {
    let config = cli.into_config()?;
    print_banner(&config);

    let show_progress = config.mode == RunMode::Download;
    let client = Arc::new(YtsHttpClient::new()?);
    let reporter = Arc::new(ConsoleReporter::new(show_progress));

    info!(mode = ?config.mode, "Starting run");
    let runner = PipelineRunner::new(config, client.clone(), client, reporter, shutdown);
    Ok(runner.run().await?)
}
