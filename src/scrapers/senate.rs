//! Senat listing scraper.
//!
//! The Senate page is not tabular. Each senator's link sits in a block of
//! free text that may mention the electoral district and the parliamentary
//! group on their own lines:
//!
//! ```text
//! <div><a href="FisaSenator.aspx?ParlamentarID=…">Name</a><br>
//!   Circumscripţia electorală nr.13 CLUJ<br>
//!   Grupul parlamentar Partidul X</div>
//! ```
//!
//! Both labels are searched independently in the text of the link's parent
//! element and the rest of the matching line is taken.

use super::{ListingAdapter, ListingError, profile_anchors};
use crate::models::{Chamber, Record};
use crate::utils::{collapse_whitespace, element_text, resolve_reference};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

static PROFILE_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"FisaSenator\.aspx\?ParlamentarID=").unwrap());
// The site mixes cedilla and comma-below spellings.
static DISTRICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Circumscrip[ţț]ia electoral[ăa] nr\.\s*(\d+)\s+([^\n]+)").unwrap());
static AFFILIATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"Grupul parlamentar\s+([^\n]+)").unwrap());

#[derive(Debug, Clone)]
pub struct SenateListing {
    base: Url,
    listing_url: String,
}

impl SenateListing {
    pub fn new(base: Url, listing_url: String) -> Self {
        Self { base, listing_url }
    }
}

impl ListingAdapter for SenateListing {
    fn chamber(&self) -> Chamber {
        Chamber::Senate
    }

    fn listing_url(&self) -> &str {
        &self.listing_url
    }

    fn extract_listing(&self, page: &str) -> Result<Vec<Record>, ListingError> {
        let document = Html::parse_document(page);
        let anchors = profile_anchors(&document, |href| PROFILE_HREF.is_match(href));
        if anchors.is_empty() {
            return Err(ListingError::Unrecognized {
                chamber: Chamber::Senate,
                reason: "no senator profile links found".to_string(),
            });
        }
        debug!(count = anchors.len(), "Found senator links");

        let records = anchors
            .into_iter()
            .filter_map(|anchor| {
                let name = collapse_whitespace(&anchor.text().collect::<String>());
                let context = anchor
                    .parent()
                    .and_then(ElementRef::wrap)
                    .map(element_text)
                    .unwrap_or_default();
                let detail = anchor
                    .value()
                    .attr("href")
                    .and_then(|href| resolve_reference(&self.base, href));
                Record::from_listing(
                    Chamber::Senate,
                    &name,
                    &labelled_line(&DISTRICT, &context, 2),
                    &labelled_line(&AFFILIATION, &context, 1),
                    detail,
                )
            })
            .collect();
        Ok(records)
    }
}

/// Capture `group` of the first match of `pattern` in `text`, or `""`.
fn labelled_line(pattern: &Regex, text: &str, group: usize) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(group))
        .map(|m| collapse_whitespace(m.as_str()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn adapter() -> SenateListing {
        SenateListing::new(
            Url::parse("https://www.senat.ro/").unwrap(),
            "https://www.senat.ro/FisaSenatori.aspx".to_string(),
        )
    }

    #[test]
    fn test_block_with_district_and_group() {
        let html = r#"<div class="senatori">
            <div class="senator"><a href="FisaSenator.aspx?ParlamentarID=ABC-1">Ion Ionescu</a><br>
            Circumscripţia electorală nr.13 CLUJ<br>
            Grupul parlamentar Partidul Național Liberal</div>
        </div>"#;

        let records = adapter().extract_listing(html).unwrap();
        assert_eq!(
            records,
            vec![Record {
                name: "Ion Ionescu".to_string(),
                district: "CLUJ".to_string(),
                affiliation: "Partidul Național Liberal".to_string(),
                chamber: Chamber::Senate,
                detail_reference: Some(
                    "https://www.senat.ro/FisaSenator.aspx?ParlamentarID=ABC-1".to_string()
                ),
                contact_address: None,
                contact_number: None,
                document_reference: None,
            }]
        );
    }

    #[test]
    fn test_comma_below_spelling_and_split_markup() {
        let html = r#"<p><a href="FisaSenator.aspx?ParlamentarID=2">Maria Pop</a>
            <span>Circumscripția electorală nr.</span>42 BUCUREȘTI</p>"#;

        let records = adapter().extract_listing(html).unwrap();
        assert_eq!(records[0].district, "BUCUREȘTI");
        assert_eq!(records[0].affiliation, "");
    }

    #[test]
    fn test_missing_labels_leave_fields_empty() {
        let html = r#"<ul><li><a href="FisaSenator.aspx?ParlamentarID=3">Dan Radu</a></li></ul>"#;
        let records = adapter().extract_listing(html).unwrap();
        assert_eq!(records[0].name, "Dan Radu");
        assert_eq!(records[0].district, "");
        assert_eq!(records[0].affiliation, "");
    }

    #[test]
    fn test_empty_anchor_is_skipped() {
        let html = r#"<div>
            <div><a href="FisaSenator.aspx?ParlamentarID=4"><img src="photo.jpg"></a></div>
            <div><a href="FisaSenator.aspx?ParlamentarID=4">Ana Vlad</a></div>
            <div><a href="FisaSenatori.aspx?Filtru=PSD">PSD</a></div>
        </div>"#;
        let records = adapter().extract_listing(html).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ana Vlad");
    }

    #[test]
    fn test_page_without_profile_links_is_unrecognized() {
        let err = adapter()
            .extract_listing(r#"<a href="FisaSenatori.aspx">Senatori</a>"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ListingError::Unrecognized { chamber: Chamber::Senate, .. }
        ));
    }

    #[test]
    fn test_labelled_line_takes_first_match() {
        let text = "Grupul parlamentar A\nGrupul parlamentar B";
        assert_eq!(labelled_line(&AFFILIATION, text, 1), "A");
        assert_eq!(labelled_line(&AFFILIATION, "nothing", 1), "");
    }
}
