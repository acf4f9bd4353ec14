//! Run configuration.
//!
//! [`Settings`] carries every tunable the scraper needs: per-chamber URLs,
//! the county reference table, contact heuristics, request headers, pacing
//! and the output path. All fields default to the values the public sites
//! currently need, and an optional YAML file can override any subset:
//!
//! ```yaml
//! politeness_delay_ms: 1000
//! contact_domains: [cdep.ro, senat.ro, parlament.ro]
//! senate:
//!   listing_url: https://www.senat.ro/FisaSenatori.aspx
//! ```

use crate::heuristics::Heuristics;
use crate::models::Chamber;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

/// Problems detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid base url for {chamber}: {source}")]
    BaseUrl {
        chamber: Chamber,
        source: url::ParseError,
    },
    #[error("invalid request header {name}")]
    Header { name: String },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("no sources configured")]
    NoSources,
}

/// Locations for one chamber.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceSettings {
    /// Prefix relative links on this chamber's pages resolve against.
    pub base_url: String,
    /// Page enumerating every member of the chamber.
    pub listing_url: String,
}

impl SourceSettings {
    pub fn base(&self, chamber: Chamber) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl { chamber, source })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub deputies: SourceSettings,
    pub senate: SourceSettings,
    /// County code to display name. Reference data only.
    pub counties: BTreeMap<u8, String>,
    /// Domains a contact address must belong to.
    pub contact_domains: Vec<String>,
    /// Generic email-shaped pattern, filtered by `contact_domains`.
    pub contact_address_pattern: String,
    /// Telephone patterns in priority order.
    pub contact_number_patterns: Vec<String>,
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
    pub listing_timeout_secs: u64,
    pub detail_timeout_secs: u64,
    /// Pause after every detail-page fetch.
    pub politeness_delay_ms: u64,
    pub output_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deputies: SourceSettings {
                base_url: "https://www.cdep.ro/pls/parlam/".to_string(),
                listing_url: "https://www.cdep.ro/pls/parlam/structura2015.de?leg=2024".to_string(),
            },
            senate: SourceSettings {
                base_url: "https://www.senat.ro/".to_string(),
                listing_url: "https://www.senat.ro/FisaSenatori.aspx".to_string(),
            },
            counties: default_counties(),
            contact_domains: vec![
                "cdep.ro".to_string(),
                "senat.ro".to_string(),
                "parlament.ro".to_string(),
            ],
            contact_address_pattern: r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}".to_string(),
            contact_number_patterns: vec![
                r"(\+40|0040)[\s\-]?[237]\d{2}[\s\-]?\d{3}[\s\-]?\d{3}".to_string(),
                r"0[237]\d{2}[\s\-]?\d{3}[\s\-]?\d{3}".to_string(),
            ],
            headers: BTreeMap::from([(
                "User-Agent".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            )]),
            listing_timeout_secs: 15,
            detail_timeout_secs: 10,
            politeness_delay_ms: 500,
            output_file: PathBuf::from("data/parliament_members.json"),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, or the defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn source(&self, chamber: Chamber) -> &SourceSettings {
        match chamber {
            Chamber::Deputies => &self.deputies,
            Chamber::Senate => &self.senate,
        }
    }

    pub fn heuristics(&self) -> Result<Heuristics, ConfigError> {
        Ok(Heuristics::new(
            &self.contact_address_pattern,
            &self.contact_domains,
            &self.contact_number_patterns,
        )?)
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

fn default_counties() -> BTreeMap<u8, String> {
    [
        "ALBA",
        "ARAD",
        "ARGEȘ",
        "BACĂU",
        "BIHOR",
        "BISTRIȚA-NĂSĂUD",
        "BOTOȘANI",
        "BRAȘOV",
        "BRĂILA",
        "BUZĂU",
        "CARAȘ-SEVERIN",
        "CĂLĂRAȘI",
        "CLUJ",
        "CONSTANȚA",
        "COVASNA",
        "DÂMBOVIȚA",
        "DOLJ",
        "GALAȚI",
        "GIURGIU",
        "GORJ",
        "HARGHITA",
        "HUNEDOARA",
        "IALOMIȚA",
        "IAȘI",
        "ILFOV",
        "MARAMUREȘ",
        "MEHEDINȚI",
        "MUREȘ",
        "NEAMȚ",
        "OLT",
        "PRAHOVA",
        "SATU MARE",
        "SĂLAJ",
        "SIBIU",
        "SUCEAVA",
        "TELEORMAN",
        "TIMIȘ",
        "TULCEA",
        "VASLUI",
        "VÂLCEA",
        "VRANCEA",
        "BUCUREȘTI",
        "DIASPORA",
    ]
    .into_iter()
    .zip(1u8..)
    .map(|(name, code)| (code, name.to_string()))
    .collect()
}
