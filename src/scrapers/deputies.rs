//! Camera Deputaților listing scraper.
//!
//! The chamber lists its members in a table, one row per deputy:
//!
//! ```text
//! <tr><td><a href="structura2015.mp?idm=…">Name</a></td><td>County</td><td>Group</td>…</tr>
//! ```
//!
//! The second cell holds the district and the third the parliamentary
//! group. Rows with fewer cells leave those fields empty.

use super::{ListingAdapter, ListingError, profile_anchors};
use crate::models::{Chamber, Record};
use crate::utils::{collapse_whitespace, resolve_reference};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

static PROFILE_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"structura2015\.mp\?").unwrap());
static CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

const DISTRICT_CELL: usize = 1;
const AFFILIATION_CELL: usize = 2;

#[derive(Debug, Clone)]
pub struct DeputiesListing {
    base: Url,
    listing_url: String,
}

impl DeputiesListing {
    pub fn new(base: Url, listing_url: String) -> Self {
        Self { base, listing_url }
    }
}

impl ListingAdapter for DeputiesListing {
    fn chamber(&self) -> Chamber {
        Chamber::Deputies
    }

    fn listing_url(&self) -> &str {
        &self.listing_url
    }

    fn extract_listing(&self, page: &str) -> Result<Vec<Record>, ListingError> {
        let document = Html::parse_document(page);
        let anchors = profile_anchors(&document, |href| PROFILE_HREF.is_match(href));
        if anchors.is_empty() {
            return Err(ListingError::Unrecognized {
                chamber: Chamber::Deputies,
                reason: "no deputy profile links found".to_string(),
            });
        }
        debug!(count = anchors.len(), "Found deputy links");

        let records = anchors
            .into_iter()
            .filter_map(|anchor| {
                let name = collapse_whitespace(&anchor.text().collect::<String>());
                let cells = enclosing_row(anchor)
                    .map(|row| {
                        row.select(&CELLS)
                            .map(|td| collapse_whitespace(&td.text().collect::<String>()))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");
                let detail = anchor
                    .value()
                    .attr("href")
                    .and_then(|href| resolve_reference(&self.base, href));
                Record::from_listing(
                    Chamber::Deputies,
                    &name,
                    cell(DISTRICT_CELL),
                    cell(AFFILIATION_CELL),
                    detail,
                )
            })
            .collect();
        Ok(records)
    }
}

fn enclosing_row(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "tr")
}
