//! Data models for product queries and per-site scrape results.

use crate::sites::client::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A product to look up, e.g. `Samsung 65" 4K Tizen Smart QLED TV - QN65Q60DAFXZC`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Free-text product name, usually with a brand and a model code
    pub name: String,
}

impl ProductQuery {
    /// Creates a new query.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// What one site returned for one query.
///
/// An empty `title` marks a miss; `price` is empty or a finite value >= 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScrapeResult {
    /// Website label, e.g. "BestBuy"
    pub website: String,
    /// Product title as listed by the site
    pub title: String,
    /// Listed price, serialized as a number or `""`
    #[serde(with = "price_field")]
    pub price: Option<f64>,
    /// Promotional validity text, empty when none was found
    pub price_valid_till: String,
}

impl ScrapeResult {
    /// Creates a result for an accepted listing. Invalid prices are dropped.
    pub fn hit(
        website: impl Into<String>,
        title: impl Into<String>,
        price: Option<f64>,
        price_valid_till: impl Into<String>,
    ) -> Self {
        Self {
            website: website.into(),
            title: title.into(),
            price: price.filter(|p| p.is_finite() && *p >= 0.0),
            price_valid_till: price_valid_till.into(),
        }
    }

    /// Creates the empty result reported when a site had no acceptable match.
    pub fn miss(website: impl Into<String>) -> Self {
        Self {
            website: website.into(),
            title: String::new(),
            price: None,
            price_valid_till: String::new(),
        }
    }

    /// Returns true if this result carries no match.
    pub fn is_miss(&self) -> bool {
        self.title.is_empty()
    }
}

/// Per-candidate bookkeeping for a search page that produced no hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateStats {
    /// Candidates looked at within the window
    pub examined: usize,
    /// Skipped as sponsored placements
    pub sponsored: usize,
    /// Skipped for lack of a title
    pub untitled: usize,
    /// Rejected by the match gate
    pub rejected: usize,
    /// Skipped for lack of a parseable price
    pub unpriced: usize,
}

impl fmt::Display for CandidateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} examined: {} sponsored, {} untitled, {} off-target, {} without price",
            self.examined, self.sponsored, self.untitled, self.rejected, self.unpriced
        )
    }
}

/// Why a site produced no result for a query.
#[derive(Debug, Error)]
pub enum MissReason {
    #[error("page fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("search page was empty")]
    EmptyPage,

    #[error("no results container found on page")]
    NoContainer,

    #[error("no acceptable candidate ({0})")]
    NoAcceptableCandidate(CandidateStats),
}

impl MissReason {
    /// True when the site could not be read, as opposed to a page with no match.
    pub fn is_fault(&self) -> bool {
        matches!(self, MissReason::Fetch(_))
    }
}

/// Outcome of one adapter invocation.
#[derive(Debug)]
pub enum SiteOutcome {
    /// An accepted listing
    Hit(ScrapeResult),
    /// No acceptable listing, with the cause kept for diagnostics
    Miss { website: String, reason: MissReason },
}

impl SiteOutcome {
    /// Creates a miss outcome.
    pub fn miss(website: impl Into<String>, reason: impl Into<MissReason>) -> Self {
        SiteOutcome::Miss { website: website.into(), reason: reason.into() }
    }

    /// Returns true for a hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, SiteOutcome::Hit(_))
    }

    /// Website label of the originating site.
    pub fn website(&self) -> &str {
        match self {
            SiteOutcome::Hit(result) => &result.website,
            SiteOutcome::Miss { website, .. } => website,
        }
    }

    /// Returns the miss reason, if any.
    pub fn reason(&self) -> Option<&MissReason> {
        match self {
            SiteOutcome::Hit(_) => None,
            SiteOutcome::Miss { reason, .. } => Some(reason),
        }
    }

    /// Flattens into a `ScrapeResult`; a miss becomes the empty result.
    pub fn into_result(self) -> ScrapeResult {
        match self {
            SiteOutcome::Hit(result) => result,
            SiteOutcome::Miss { website, .. } => ScrapeResult::miss(website),
        }
    }
}

/// `Price` is written as a JSON number, or `""` when absent.
mod price_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(price: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match price {
            Some(value) => serializer.serialize_f64(*value),
            None => serializer.serialize_str(""),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Some(value),
            Raw::Text(text) => crate::extract::parse_amount(&text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_keeps_valid_price() {
        let result = ScrapeResult::hit("Amazon", "LG OLED", Some(1299.99), "");
        assert_eq!(result.price, Some(1299.99));
        assert!(!result.is_miss());
    }

    #[test]
    fn test_hit_drops_invalid_price() {
        assert_eq!(ScrapeResult::hit("A", "T", Some(-1.0), "").price, None);
        assert_eq!(ScrapeResult::hit("A", "T", Some(f64::NAN), "").price, None);
        assert_eq!(ScrapeResult::hit("A", "T", Some(f64::INFINITY), "").price, None);
        assert_eq!(ScrapeResult::hit("A", "T", Some(0.0), "").price, Some(0.0));
    }

    #[test]
    fn test_miss() {
        let result = ScrapeResult::miss("Costco");
        assert_eq!(result.website, "Costco");
        assert!(result.is_miss());
        assert!(result.price.is_none());
        assert!(result.price_valid_till.is_empty());
    }

    #[test]
    fn test_serialize_field_names() {
        let result = ScrapeResult::hit("SiteA", "Samsung QLED", Some(1299.99), "Dec 1, 2024");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["Website"], "SiteA");
        assert_eq!(json["Title"], "Samsung QLED");
        assert_eq!(json["Price"], 1299.99);
        assert_eq!(json["PriceValidTill"], "Dec 1, 2024");
    }

    #[test]
    fn test_serialize_missing_price_as_empty_string() {
        let result = ScrapeResult::hit("Staples", "Hisense 32A4KV", None, "");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""Price":"""#));
    }

    #[test]
    fn test_deserialize_price_forms() {
        let parsed: ScrapeResult = serde_json::from_str(
            r#"{"Website":"A","Title":"T","Price":499.5,"PriceValidTill":""}"#,
        )
        .unwrap();
        assert_eq!(parsed.price, Some(499.5));

        let parsed: ScrapeResult = serde_json::from_str(
            r#"{"Website":"A","Title":"T","Price":"","PriceValidTill":""}"#,
        )
        .unwrap();
        assert_eq!(parsed.price, None);
    }

    #[test]
    fn test_outcome_into_result() {
        let hit = SiteOutcome::Hit(ScrapeResult::hit("Visions", "SONY X77L", Some(999.99), ""));
        assert!(hit.is_hit());
        assert_eq!(hit.website(), "Visions");
        assert!(hit.reason().is_none());
        assert_eq!(hit.into_result().title, "SONY X77L");

        let miss = SiteOutcome::miss("Visions", MissReason::NoContainer);
        assert!(!miss.is_hit());
        assert_eq!(miss.website(), "Visions");
        assert!(matches!(miss.reason(), Some(MissReason::NoContainer)));
        assert!(miss.into_result().is_miss());
    }

    #[test]
    fn test_miss_reason_display() {
        let stats = CandidateStats { examined: 5, sponsored: 1, untitled: 0, rejected: 3, unpriced: 1 };
        let message = MissReason::NoAcceptableCandidate(stats).to_string();
        assert!(message.contains("5 examined"));
        assert!(message.contains("3 off-target"));

        let message = MissReason::from(FetchError::Status(404)).to_string();
        assert!(message.contains("404"));
    }

    #[test]
    fn test_only_fetch_failures_are_faults() {
        assert!(MissReason::from(FetchError::RateLimited).is_fault());
        assert!(MissReason::from(FetchError::Status(500)).is_fault());
        assert!(MissReason::from(FetchError::SessionInit("bad proxy".into())).is_fault());

        assert!(!MissReason::EmptyPage.is_fault());
        assert!(!MissReason::NoContainer.is_fault());
        assert!(!MissReason::NoAcceptableCandidate(CandidateStats::default()).is_fault());
    }

    #[test]
    fn test_query_serde() {
        let query: ProductQuery = serde_json::from_str(r#"{"name":"LG 65\" OLED"}"#).unwrap();
        assert_eq!(query, ProductQuery::new("LG 65\" OLED"));
        assert!(serde_json::from_str::<ProductQuery>(r#"{"title":"x"}"#).is_err());
    }
}
