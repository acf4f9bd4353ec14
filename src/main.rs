//! # Parliament Scrape
//!
//! Harvests member records from the Romanian Chamber of Deputies
//! (`cdep.ro`) and Senate (`senat.ro`), normalizes both sites into one
//! record shape, optionally visits every member's profile page for contact
//! details and CV links, and writes the result as a JSON array.
//!
//! ## Usage
//!
//! ```sh
//! parliament_scrape --chamber all --details -o data/parliament_members.json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Listing**: One adapter per chamber extracts partial records from the
//!    chamber's listing page
//! 2. **Enrichment** (optional): Each profile page is fetched in turn, with
//!    a fixed politeness delay, and searched for contact details
//! 3. **Output**: The ordered record set is written once as JSON

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod documents;
mod enrich;
mod fetch;
mod heuristics;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::Settings;
use fetch::HttpFetcher;
use outputs::json::JsonFileStore;
use pipeline::{Pipeline, RunOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(output) = args.output {
        settings.output_file = output;
    }
    if let Some(delay_ms) = args.delay_ms {
        settings.politeness_delay_ms = delay_ms;
    }

    if args.list_counties {
        for (code, name) in &settings.counties {
            println!("{code:>2}  {name}");
        }
        return Ok(());
    }

    let options = RunOptions {
        chambers: args.chamber.chambers(),
        enrich: args.details,
    };
    info!(chambers = ?options.chambers, enrich = options.enrich, output = %settings.output_file.display(), "parliament_scrape starting up");

    let fetcher = HttpFetcher::new(&settings)?;
    let store = JsonFileStore::new(settings.output_file.clone());
    let mut pipeline = Pipeline::new(&settings, &options, fetcher, store)?;

    match pipeline.run().await {
        Ok(report) => {
            report.log_summary();
            info!(path = %pipeline.store().path().display(), "Scraping complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            Err(e.into())
        }
    }
}
