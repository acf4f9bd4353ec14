//! Data models for legislator records.
//!
//! This module defines the canonical shape shared by every source:
//! - [`Chamber`]: The closed set of sources a record can come from
//! - [`Record`]: One legislator entry, partially filled by a listing adapter
//!   and optionally completed by the detail enricher
//!
//! Field names serialize in camelCase so the persisted JSON document reads
//! `detailReference`, `contactAddress` and so on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The legislative chamber a record was harvested from.
///
/// Set by the listing adapter that produced the record and never inferred
/// from page content. Serialized as the chamber's Romanian display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Chamber {
    /// Camera Deputaților, scraped from `cdep.ro`.
    #[serde(rename = "Camera Deputaților")]
    Deputies,
    /// Senatul României, scraped from `senat.ro`.
    #[serde(rename = "Senat")]
    Senate,
}

impl Chamber {
    /// Every chamber, in the default scrape order.
    pub const ALL: [Chamber; 2] = [Chamber::Deputies, Chamber::Senate];

    pub fn display_name(self) -> &'static str {
        match self {
            Chamber::Deputies => "Camera Deputaților",
            Chamber::Senate => "Senat",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single legislator entry.
///
/// # Lifecycle
///
/// A record is created by a listing adapter once a non-empty name is found.
/// The detail enricher may then fill the optional contact fields, each of
/// which only ever moves from `None` to `Some` (first match wins). The
/// record is read-only after that and flows unchanged into persistence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Display name as shown on the listing page. Never empty.
    pub name: String,
    /// Electoral district; empty when the listing does not expose it.
    pub district: String,
    /// Parliamentary group or party; empty when the listing does not expose it.
    pub affiliation: String,
    /// Source chamber.
    pub chamber: Chamber,
    /// Absolute URL of the member's profile page.
    pub detail_reference: Option<String>,
    /// Institutional email address found on the profile page.
    pub contact_address: Option<String>,
    /// Telephone number found on the profile page, as matched.
    pub contact_number: Option<String>,
    /// Absolute URL of a CV or similar document linked from the profile page.
    pub document_reference: Option<String>,
}

impl Record {
    /// Create a partial record from listing data.
    ///
    /// Returns `None` when `name` is empty after trimming, so a nameless
    /// candidate is never created in the first place.
    pub fn from_listing(
        chamber: Chamber,
        name: &str,
        district: &str,
        affiliation: &str,
        detail_reference: Option<String>,
    ) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            district: district.trim().to_string(),
            affiliation: affiliation.trim().to_string(),
            chamber,
            detail_reference,
            contact_address: None,
            contact_number: None,
            document_reference: None,
        })
    }

    /// Apply enrichment results without overwriting anything already present.
    ///
    /// Returns the number of fields that went from absent to present.
    pub fn fill_missing(&mut self, found: DetailFields) -> usize {
        fill(&mut self.contact_address, found.contact_address)
            + fill(&mut self.contact_number, found.contact_number)
            + fill(&mut self.document_reference, found.document_reference)
    }

    pub fn present_optional_fields(&self) -> Vec<&'static str> {
        [
            ("detailReference", self.detail_reference.is_some()),
            ("contactAddress", self.contact_address.is_some()),
            ("contactNumber", self.contact_number.is_some()),
            ("documentReference", self.document_reference.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) -> usize {
    match (slot.is_none(), value) {
        (true, Some(v)) => {
            *slot = Some(v);
            1
        }
        _ => 0,
    }
}

/// Optional fields recovered from one detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub contact_address: Option<String>,
    pub contact_number: Option<String>,
    pub document_reference: Option<String>,
}
