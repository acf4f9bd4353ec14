//! Command-line interface definitions.
//!
//! Options can be given as flags; the config and output paths also fall back
//! to environment variables.

use crate::models::Chamber;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which chamber(s) to scrape.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChamberSelection {
    All,
    Deputies,
    Senate,
}

impl ChamberSelection {
    pub fn chambers(self) -> Vec<Chamber> {
        match self {
            ChamberSelection::All => Chamber::ALL.to_vec(),
            ChamberSelection::Deputies => vec![Chamber::Deputies],
            ChamberSelection::Senate => vec![Chamber::Senate],
        }
    }
}

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Listing pages of both chambers only
/// parliament_scrape
///
/// # Senators with contact details from their profile pages
/// parliament_scrape --chamber senate --details -o out/senators.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Chamber(s) to scrape
    #[arg(long, value_enum, default_value = "all")]
    pub chamber: ChamberSelection,

    /// Fetch every member's profile page for contact details and CV links
    #[arg(short, long)]
    pub details: bool,

    /// Output JSON file (overrides the configured path)
    #[arg(short, long, env = "PARLIAMENT_SCRAPE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "PARLIAMENT_SCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pause after each profile page request, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Print the county reference table and exit
    #[arg(long)]
    pub list_counties: bool,
}
