//! # Canopy Scraper
//!
//! Crawls the Canopy Forum author index, walks every author's paginated
//! article listing, extracts each article's title, publication date, cover
//! image and tags, and exports the lot as a CSV table.
//!
//! ## Usage
//!
//! ```sh
//! canopy_scraper --log -f cf_data
//! ```
//!
//! ## Architecture
//!
//! 1. **Preflight**: validate mail settings and log in to the relay, if requested
//! 2. **Authors**: read the alphabetical author index
//! 3. **Listings**: follow each author's "next page" chain to collect article links
//! 4. **Articles**: extract metadata per article, one request at a time with a
//!    politeness delay in between
//! 5. **Output**: write the CSV, then email it if requested

use std::error::Error;

use clap::Parser;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod cli;
mod config;
mod delivery;
mod error;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::ScrapeConfig;
use delivery::Mailer;
use fetch::DocumentFetcher;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let default_level = if args.log { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("canopy_scraper starting up");
    debug!(
        directory_url = %args.directory_url,
        filename = %args.filename,
        print = args.print,
        debug_single = args.debug_single,
        "Parsed CLI arguments"
    );

    // ---- Mail preflight (fail fast) ----
    let mailer = match args.mail_settings()? {
        Some(settings) => match Mailer::connect(settings).await {
            Ok(mailer) => Some(mailer),
            Err(e) => {
                error!(error = %e, "Mail login failed; not starting the crawl");
                return Err(e.into());
            }
        },
        None => None,
    };

    let config = ScrapeConfig::from_cli(&args)?;
    if let Some(dir) = &config.print_dir {
        if let Err(e) = ensure_writable_dir(dir) {
            error!(path = %dir.display(), error = %e, "Print directory is not writable");
            return Err(e);
        }
    }

    // ---- Crawl ----
    let directory_url = Url::parse(&args.directory_url)?;
    let fetcher = DocumentFetcher::new(config.timeout)?;
    let results = pipeline::run(&fetcher, &config, &directory_url).await?;

    // ---- Export ----
    let path = outputs::csv::write_results(&results, &args.filename)?;

    // ---- Delivery ----
    if let Some(mailer) = mailer {
        // The export already exists, so a failed send only loses the email.
        if let Err(e) = mailer.send(&path).await {
            error!(error = %e, path = %path.display(), "Failed to email exported data");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        records = results.len(),
        path = %path.display(),
        "Execution complete"
    );
    Ok(())
}
