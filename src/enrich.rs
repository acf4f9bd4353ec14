//! Detail-page enrichment.
//!
//! For every record that carries a `detailReference`, the [`Enricher`]
//! fetches the profile page and looks for:
//!
//! - an institutional contact address (generic email pattern, filtered by
//!   the domain allow-list)
//! - a telephone number (ordered patterns, first pattern with a match wins)
//! - a CV link (document file extension first, then a "CV"/"curriculum"
//!   label), resolved against the record's chamber base URL
//!
//! Failures never propagate: a record whose page cannot be fetched keeps
//! exactly the fields it had. Every fetch, successful or not, is followed by
//! the fixed politeness delay. There are no retries.

use crate::config::{ConfigError, Settings};
use crate::documents::extract_document_text;
use crate::fetch::PageFetcher;
use crate::heuristics::{DOCUMENT_EXTENSION, DOCUMENT_LABEL, Heuristics};
use crate::models::{Chamber, DetailFields, Record};
use crate::scrapers::ANCHORS;
use crate::utils::{collapse_whitespace, page_text, resolve_reference};
use scraper::{ElementRef, Html};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// No detail reference; nothing fetched.
    Skipped,
    /// Page fetched and searched; `filled` fields went from absent to present.
    Enriched { filled: usize },
    /// Page could not be fetched; the record is unchanged.
    Failed { reason: String },
}

#[derive(Debug)]
pub struct Enricher {
    heuristics: Heuristics,
    deputies_base: Url,
    senate_base: Url,
    timeout: Duration,
    delay: Duration,
}

impl Enricher {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            heuristics: settings.heuristics()?,
            deputies_base: settings.deputies.base(Chamber::Deputies)?,
            senate_base: settings.senate.base(Chamber::Senate)?,
            timeout: settings.detail_timeout(),
            delay: settings.politeness_delay(),
        })
    }

    fn base_for(&self, chamber: Chamber) -> &Url {
        match chamber {
            Chamber::Deputies => &self.deputies_base,
            Chamber::Senate => &self.senate_base,
        }
    }

    /// Fetch `record`'s detail page and fill its missing optional fields.
    #[instrument(level = "info", skip_all, fields(name = %record.name, chamber = %record.chamber))]
    pub async fn enrich<F: PageFetcher>(&self, fetcher: &F, record: &mut Record) -> EnrichOutcome {
        let Some(url) = record.detail_reference.clone() else {
            debug!("No detail reference; skipping");
            return EnrichOutcome::Skipped;
        };

        let fetched = fetcher.fetch(&url, self.timeout).await;
        let outcome = match fetched {
            Ok(page) => {
                let found = self.extract_details(&page, record.chamber);
                if let Some(document) = &found.document_reference {
                    if let Err(e) = extract_document_text(document) {
                        debug!(error = %e, "Document content not extracted");
                    }
                }
                let filled = record.fill_missing(found);
                info!(filled, present = ?record.present_optional_fields(), "Enriched record");
                EnrichOutcome::Enriched { filled }
            }
            Err(e) => {
                warn!(name = %record.name, error = %e, "Detail page unavailable; keeping listing fields");
                EnrichOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        sleep(self.delay).await;
        outcome
    }

    /// Run every detail heuristic against one profile page.
    pub fn extract_details(&self, page: &str, chamber: Chamber) -> DetailFields {
        let document = Html::parse_document(page);
        let text = page_text(document.root_element());
        DetailFields {
            contact_address: self.heuristics.extract_contact_address(&text),
            contact_number: self.heuristics.extract_contact_number(&text),
            document_reference: find_document_href(&document)
                .and_then(|href| resolve_reference(self.base_for(chamber), href)),
        }
    }
}

/// First document link on the page.
///
/// Links whose target ends in a document extension win over links merely
/// labelled "CV"; within a strategy the first link in document order wins.
fn find_document_href(document: &Html) -> Option<&str> {
    let anchors: Vec<ElementRef<'_>> = document.select(&ANCHORS).collect();

    anchors
        .iter()
        .filter(|a| anchor_href(a).is_some_and(|h| DOCUMENT_EXTENSION.is_match(h)))
        .find_map(anchor_href)
        .or_else(|| {
            anchors
                .iter()
                .filter(|a| DOCUMENT_LABEL.is_match(&collapse_whitespace(&a.text().collect::<String>())))
                .find_map(anchor_href)
        })
}

fn anchor_href<'a>(anchor: &ElementRef<'a>) -> Option<&'a str> {
    anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    const PROFILE: &str = "https://www.cdep.ro/pls/parlam/structura2015.mp?idm=1&cam=2&leg=2024";

    fn settings() -> Settings {
        Settings {
            politeness_delay_ms: 0,
            ..Settings::default()
        }
    }

    fn record(detail: Option<&str>) -> Record {
        Record::from_listing(
            Chamber::Deputies,
            "A. Popescu",
            "CLUJ",
            "Group X",
            detail.map(str::to_string),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fills_all_fields_from_profile() {
        let page = r#"<html><head><script>var t = "pixel@tracker.example";</script></head><body>
            <p>Email: a.popescu@cdep.ro</p>
            <p>Telefon: 0214 141 111</p>
            <a href="/index.html">Acasă</a>
            <a href="cv/cv_popescu.pdf">Descarcă</a>
        </body></html>"#;
        let fetcher = StaticFetcher::new().page(PROFILE, page);
        let enricher = Enricher::new(&settings()).unwrap();
        let mut rec = record(Some(PROFILE));

        let outcome = enricher.enrich(&fetcher, &mut rec).await;

        assert_eq!(outcome, EnrichOutcome::Enriched { filled: 3 });
        assert_eq!(rec.contact_address.as_deref(), Some("a.popescu@cdep.ro"));
        assert_eq!(rec.contact_number.as_deref(), Some("0214 141 111"));
        assert_eq!(
            rec.document_reference.as_deref(),
            Some("https://www.cdep.ro/pls/parlam/cv/cv_popescu.pdf")
        );
    }

    #[test]
    fn test_cv_link_resolves_against_chamber_base() {
        let enricher = Enricher::new(&settings()).unwrap();
        let page = r#"<a href="cv_popescu.pdf">CV</a>"#;

        let deputies = enricher.extract_details(page, Chamber::Deputies);
        assert_eq!(
            deputies.document_reference.as_deref(),
            Some("https://www.cdep.ro/pls/parlam/cv_popescu.pdf")
        );
        let senate = enricher.extract_details(page, Chamber::Senate);
        assert_eq!(
            senate.document_reference.as_deref(),
            Some("https://www.senat.ro/cv_popescu.pdf")
        );
    }

    #[test]
    fn test_extension_match_beats_cv_label() {
        let enricher = Enricher::new(&settings()).unwrap();
        let page = r#"<a href="FisaSenator.aspx?tab=cv">Curriculum Vitae</a>
            <a href="docs/Declaratie.DOCX">Declarație</a>"#;
        let found = enricher.extract_details(page, Chamber::Senate);
        assert_eq!(
            found.document_reference.as_deref(),
            Some("https://www.senat.ro/docs/Declaratie.DOCX")
        );
    }

    #[test]
    fn test_cv_label_fallback() {
        let enricher = Enricher::new(&settings()).unwrap();
        let page = r#"<a href="">CV</a><a href="FisaSenator.aspx?tab=cv"> Curriculum vitae </a>"#;
        let found = enricher.extract_details(page, Chamber::Senate);
        assert_eq!(
            found.document_reference.as_deref(),
            Some("https://www.senat.ro/FisaSenator.aspx?tab=cv")
        );
    }

    #[test]
    fn test_absolute_document_link_kept() {
        let enricher = Enricher::new(&settings()).unwrap();
        let page = r#"<a href="https://files.senat.ro/cv/popescu.pdf">x</a>"#;
        let found = enricher.extract_details(page, Chamber::Deputies);
        assert_eq!(
            found.document_reference.as_deref(),
            Some("https://files.senat.ro/cv/popescu.pdf")
        );
    }

    #[test]
    fn test_contact_domain_allow_list() {
        let settings = Settings {
            contact_domains: vec!["parliament.example".to_string()],
            ..settings()
        };
        let enricher = Enricher::new(&settings).unwrap();

        let allowed = enricher.extract_details("<p>contact: j.popescu@parliament.example</p>", Chamber::Senate);
        assert_eq!(allowed.contact_address.as_deref(), Some("j.popescu@parliament.example"));

        let rejected = enricher.extract_details("<p>contact: j.popescu@tracker.example</p>", Chamber::Senate);
        assert_eq!(rejected.contact_address, None);
    }

    #[test]
    fn test_adjacent_cells_do_not_fuse() {
        let enricher = Enricher::new(&settings()).unwrap();
        let page = "<table><tr><td>0745123456</td><td>ion@senat.ro</td></tr></table>";
        let found = enricher.extract_details(page, Chamber::Senate);
        assert_eq!(found.contact_address.as_deref(), Some("ion@senat.ro"));
        assert_eq!(found.contact_number.as_deref(), Some("0745123456"));
    }

    #[test]
    fn test_inline_markup_does_not_split_contacts() {
        let enricher = Enricher::new(&settings()).unwrap();

        let bold = enricher.extract_details("<p>Tel: <b>0744</b> 111 222</p>", Chamber::Senate);
        assert_eq!(bold.contact_number.as_deref(), Some("0744 111 222"));

        let prefix = enricher.extract_details("<p><span>+40</span> 745 123 456</p>", Chamber::Senate);
        assert_eq!(prefix.contact_number.as_deref(), Some("+40 745 123 456"));

        let line_break = enricher.extract_details("<p>0744<br>111 222</p>", Chamber::Senate);
        assert_eq!(line_break.contact_number.as_deref(), Some("0744 111 222"));

        let address = enricher.extract_details("<p><b>ion.ionescu</b>@senat.ro</p>", Chamber::Senate);
        assert_eq!(address.contact_address.as_deref(), Some("ion.ionescu@senat.ro"));
    }

    #[tokio::test]
    async fn test_missing_reference_is_a_no_op() {
        let fetcher = StaticFetcher::new();
        let enricher = Enricher::new(&settings()).unwrap();
        let mut rec = record(None);
        let before = rec.clone();

        assert_eq!(enricher.enrich(&fetcher, &mut rec).await, EnrichOutcome::Skipped);
        assert_eq!(rec, before);
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_record_unchanged() {
        let fetcher = StaticFetcher::new().status(PROFILE, 500);
        let enricher = Enricher::new(&settings()).unwrap();
        let mut rec = record(Some(PROFILE));
        rec.contact_number = Some("0212 000 000".to_string());
        let before = rec.clone();

        let outcome = enricher.enrich(&fetcher, &mut rec).await;

        assert!(matches!(outcome, EnrichOutcome::Failed { .. }));
        assert_eq!(rec, before);
        assert_eq!(fetcher.requests(), vec![PROFILE]);
    }

    #[tokio::test]
    async fn test_enrichment_is_monotonic_and_idempotent() {
        let page = "<p>a@cdep.ro</p><p>0744 000 000</p><p>0755 111 222</p>";
        let fetcher = StaticFetcher::new().page(PROFILE, page);
        let enricher = Enricher::new(&settings()).unwrap();

        let mut rec = record(Some(PROFILE));
        rec.contact_address = Some("existing@cdep.ro".to_string());
        let fields_before = rec.present_optional_fields();

        enricher.enrich(&fetcher, &mut rec).await;
        let once = rec.clone();
        assert_eq!(
            enricher.enrich(&fetcher, &mut rec).await,
            EnrichOutcome::Enriched { filled: 0 }
        );

        assert_eq!(rec, once);
        assert_eq!(rec.contact_address.as_deref(), Some("existing@cdep.ro"));
        assert_eq!(rec.contact_number.as_deref(), Some("0744 000 000"));
        assert!(fields_before.iter().all(|f| rec.present_optional_fields().contains(f)));
    }

    #[tokio::test]
    async fn test_politeness_delay_follows_every_fetch() {
        let settings = Settings {
            politeness_delay_ms: 30,
            ..Settings::default()
        };
        let enricher = Enricher::new(&settings).unwrap();
        let fetcher = StaticFetcher::new().status(PROFILE, 404);
        let mut rec = record(Some(PROFILE));

        let t0 = Instant::now();
        enricher.enrich(&fetcher, &mut rec).await;
        assert!(t0.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_timeout_is_a_soft_failure_and_still_delays() {
        let settings = Settings {
            politeness_delay_ms: 30,
            ..Settings::default()
        };
        let enricher = Enricher::new(&settings).unwrap();
        let fetcher = StaticFetcher::new().timeout(PROFILE);
        let mut rec = record(Some(PROFILE));
        let before = rec.clone();

        let t0 = Instant::now();
        let outcome = enricher.enrich(&fetcher, &mut rec).await;

        assert_eq!(
            outcome,
            EnrichOutcome::Failed {
                reason: format!("request to {PROFILE} timed out")
            }
        );
        assert_eq!(rec, before);
        assert!(t0.elapsed() >= Duration::from_millis(30));
    }
}
