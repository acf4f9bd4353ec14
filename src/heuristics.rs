//! Ordered pattern heuristics for optional contact fields.
//!
//! Each optional field is described by a [`MatcherChain`]: a list of
//! [`Matcher`]s (pattern plus optional validator) evaluated in priority
//! order. The first matcher that yields a valid match wins and later
//! matchers are never consulted, so results are never merged across
//! patterns.
//!
//! Telephone matches are stored as the whole matched text (capture group 0)
//! for every pattern, including ones that declare capture groups.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Anchor targets that point at a downloadable document.
pub static DOCUMENT_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(pdf|doc|docx)$").unwrap());

/// Anchor labels that announce a CV.
pub static DOCUMENT_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)CV|curriculum").unwrap());

type Validator = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// One pattern, optionally paired with a predicate every match must pass.
pub struct Matcher {
    pattern: Regex,
    validator: Option<Validator>,
}

impl Matcher {
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            validator: None,
        }
    }

    pub fn with_validator(pattern: Regex, validator: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            pattern,
            validator: Some(Box::new(validator)),
        }
    }

    /// First match in `text` that passes the validator, if any.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .find(|candidate| self.validator.as_ref().is_none_or(|valid| valid(*candidate)))
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("pattern", &self.pattern.as_str())
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// Matchers tried in order; first success wins.
#[derive(Debug, Default)]
pub struct MatcherChain {
    matchers: Vec<Matcher>,
}

impl MatcherChain {
    pub fn new(matchers: Vec<Matcher>) -> Self {
        Self { matchers }
    }

    pub fn first_match(&self, text: &str) -> Option<String> {
        self.matchers
            .iter()
            .find_map(|matcher| matcher.first_match(text))
            .map(str::to_string)
    }
}

/// `true` when the address's domain is exactly one of the allow-listed
/// domains. Comparison is case-insensitive; subdomains do not qualify.
pub fn domain_allowed(address: &str, allowed: &[String]) -> bool {
    let Some((_, domain)) = address.rsplit_once('@') else {
        return false;
    };
    allowed
        .iter()
        .map(|allowed| allowed.trim().trim_start_matches('@'))
        .any(|allowed| !allowed.is_empty() && domain.eq_ignore_ascii_case(allowed))
}

/// Compiled heuristics for every optional text field.
#[derive(Debug)]
pub struct Heuristics {
    contact_address: MatcherChain,
    contact_number: MatcherChain,
}

impl Heuristics {
    /// Compile the generic address pattern (filtered by `allowed_domains`)
    /// and the ordered telephone patterns.
    pub fn new(
        address_pattern: &str,
        allowed_domains: &[String],
        number_patterns: &[String],
    ) -> Result<Self, regex::Error> {
        let allowed = allowed_domains.to_vec();
        let contact_address = MatcherChain::new(vec![Matcher::with_validator(
            Regex::new(address_pattern)?,
            move |address| domain_allowed(address, &allowed),
        )]);
        let contact_number = MatcherChain::new(
            number_patterns
                .iter()
                .map(|p| Regex::new(p).map(Matcher::new))
                .collect::<Result<Vec<_>, _>>()?,
        );
        Ok(Self {
            contact_address,
            contact_number,
        })
    }

    pub fn extract_contact_address(&self, text: &str) -> Option<String> {
        self.contact_address.first_match(text)
    }

    pub fn extract_contact_number(&self, text: &str) -> Option<String> {
        self.contact_number.first_match(text)
    }
}
