//! Listing adapters, one per chamber.
//!
//! Each adapter turns a chamber's listing page into partial [`Record`]s
//! (name, district, affiliation, detail reference). The two sites expose
//! the same entity through different markup:
//!
//! | Chamber | Module | Layout | Profile link pattern |
//! |---------|--------|--------|----------------------|
//! | Camera Deputaților | [`deputies`] | Table rows | `structura2015.mp?` |
//! | Senat | [`senate`] | Free text blocks | `FisaSenator.aspx?ParlamentarID=` |
//!
//! # Common Patterns
//!
//! - Candidates are anchors whose `href` matches the chamber's profile
//!   pattern, so navigation links are never mistaken for members
//! - Anchors with no visible text are skipped silently
//! - Output order equals document order
//! - A page with no profile anchor at all is reported as unrecognized

pub mod deputies;
pub mod senate;

use crate::config::{ConfigError, Settings};
use crate::fetch::{FetchError, PageFetcher};
use crate::models::{Chamber, Record};
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

pub(crate) static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Why a chamber contributed no records.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing page unavailable: {0}")]
    Fetch(#[from] FetchError),
    #[error("listing markup not recognized for {chamber}: {reason}")]
    Unrecognized { chamber: Chamber, reason: String },
}

/// Extraction logic for one chamber's listing page.
pub trait ListingAdapter: Send + Sync {
    fn chamber(&self) -> Chamber;

    fn listing_url(&self) -> &str;

    /// Parse a fetched listing page into partial records, in document order.
    fn extract_listing(&self, page: &str) -> Result<Vec<Record>, ListingError>;
}

/// Build the adapter for `chamber` from its configured locations.
pub fn adapter_for(chamber: Chamber, settings: &Settings) -> Result<Box<dyn ListingAdapter>, ConfigError> {
    let source = settings.source(chamber);
    let base = source.base(chamber)?;
    Ok(match chamber {
        Chamber::Deputies => Box::new(deputies::DeputiesListing::new(base, source.listing_url.clone())),
        Chamber::Senate => Box::new(senate::SenateListing::new(base, source.listing_url.clone())),
    })
}

/// Fetch a chamber's listing page and extract its records.
#[instrument(level = "info", skip_all, fields(chamber = %adapter.chamber(), url = %adapter.listing_url()))]
pub async fn scrape_listing<F: PageFetcher>(
    fetcher: &F,
    adapter: &dyn ListingAdapter,
    timeout: Duration,
) -> Result<Vec<Record>, ListingError> {
    let page = fetcher.fetch(adapter.listing_url(), timeout).await?;
    let records = adapter.extract_listing(&page).inspect_err(|_| {
        debug!(preview = %truncate_for_log(&page, 300), "Unrecognized listing page");
    })?;
    info!(count = records.len(), "Extracted listing records");
    Ok(records)
}

/// Anchors in `document` whose target matches `is_profile`, in document order.
pub(crate) fn profile_anchors<'a>(
    document: &'a Html,
    is_profile: impl Fn(&str) -> bool,
) -> Vec<ElementRef<'a>> {
    document
        .select(&ANCHORS)
        .filter(|a| a.value().attr("href").is_some_and(&is_profile))
        .collect()
}
