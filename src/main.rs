//! # Learning Scout
//!
//! Discovers learning resources for a topic across several kinds of sources,
//! scores each one for relevance, level fit and source credibility, and
//! returns a balanced, ranked list.
//!
//! ## Features
//!
//! - Concurrent fetchers for articles, documentation, tutorials, videos and
//!   blog posts (Wikipedia, dev.to, Medium, official docs, YouTube, ...)
//! - Failure isolation: a source that errors or times out contributes nothing
//!   and never fails the run
//! - Deterministic ranking with a quality threshold and a per-category cap
//! - One-off searches rendered as JSON or a Markdown reading list
//! - An HTTP service exposing `POST /scrape_resources` and `GET /health`
//!
//! ## Usage
//!
//! ```sh
//! learning_scout search --topic Python --level beginner
//! learning_scout serve --bind 0.0.0.0:8000
//! ```
//!
//! ## Architecture
//!
//! 1. **Validation**: Reject a blank topic or unknown level before any fetch
//! 2. **Fetching**: Fan out to every fetcher concurrently, each under a time limit
//! 3. **Merging**: Flatten in registration order and drop repeated links
//! 4. **Ranking**: Score, filter, cap per category and sort

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod orchestrator;
mod outputs;
mod pipeline;
mod ranking;
mod scrapers;
mod server;
mod utils;

use cli::{Cli, Command, Format};
use config::Settings;
use models::RankingRequest;
use outputs::{json, markdown, write_output};
use pipeline::ResourceScout;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("learning_scout starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.command, "Parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref())?;
    let scout = Arc::new(ResourceScout::from_settings(&settings)?);

    match args.command {
        Command::Search {
            topic,
            level,
            format,
            output,
        } => {
            let request = RankingRequest::new(&topic, &level)?;
            let response = scout.scout(&request).await;
            let rendered = match format {
                Format::Json => json::to_json(&response)?,
                Format::Markdown => markdown::to_markdown(&request, &response),
            };
            match output {
                Some(path) => write_output(&path, &rendered).await?,
                None => println!("{rendered}"),
            }
        }
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            server::run_server(scout, &bind).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
