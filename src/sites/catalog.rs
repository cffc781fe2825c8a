//! Supported retail sites, their default URLs, and brand overrides.

use crate::sites::selectors::{self, SiteRules};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported retailers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Amazon,
    BestBuy,
    Costco,
    Staples,
    Visions,
    LondonDrugs,
    Samsung,
}

impl Site {
    /// Label written into every result's `Website` field.
    pub fn website(&self) -> &'static str {
        match self {
            Site::Amazon => "Amazon",
            Site::BestBuy => "BestBuy",
            Site::Costco => "Costco",
            Site::Staples => "Staples",
            Site::Visions => "Visions",
            Site::LondonDrugs => "LondonDrugs",
            Site::Samsung => "Samsung",
        }
    }

    /// Default base URL, overridable through configuration.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Site::Amazon => "https://www.amazon.ca",
            Site::BestBuy => "https://www.bestbuy.ca",
            Site::Costco => "https://www.costco.ca",
            Site::Staples => "https://www.staples.ca",
            Site::Visions => "https://www.visions.ca",
            Site::LondonDrugs => "https://www.londondrugs.com",
            Site::Samsung => "https://www.samsung.com",
        }
    }

    /// Brand every listing on this site belongs to, for manufacturer storefronts.
    pub fn brand_override(&self) -> Option<&'static str> {
        match self {
            Site::Samsung => Some("Samsung"),
            _ => None,
        }
    }

    /// Extraction rules for this site's search results page.
    pub fn rules(&self) -> &'static SiteRules {
        match self {
            Site::Amazon => &selectors::AMAZON,
            Site::BestBuy => &selectors::BESTBUY,
            Site::Costco => &selectors::COSTCO,
            Site::Staples => &selectors::STAPLES,
            Site::Visions => &selectors::VISIONS,
            Site::LondonDrugs => &selectors::LONDON_DRUGS,
            Site::Samsung => &selectors::SAMSUNG,
        }
    }

    /// Returns all supported sites.
    pub fn all() -> &'static [Site] {
        &[
            Site::Amazon,
            Site::BestBuy,
            Site::Costco,
            Site::Staples,
            Site::Visions,
            Site::LondonDrugs,
            Site::Samsung,
        ]
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            Site::Amazon => "amazon",
            Site::BestBuy => "bestbuy",
            Site::Costco => "costco",
            Site::Staples => "staples",
            Site::Visions => "visions",
            Site::LondonDrugs => "londondrugs",
            Site::Samsung => "samsung",
        };
        write!(f, "{}", id)
    }
}

impl FromStr for Site {
    type Err = SiteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amazon" => Ok(Site::Amazon),
            "bestbuy" | "best-buy" | "best buy" => Ok(Site::BestBuy),
            "costco" => Ok(Site::Costco),
            "staples" => Ok(Site::Staples),
            "visions" => Ok(Site::Visions),
            "londondrugs" | "london-drugs" | "london drugs" => Ok(Site::LondonDrugs),
            "samsung" => Ok(Site::Samsung),
            _ => Err(SiteParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "Unknown site '{0}'. Valid sites: amazon, bestbuy, costco, staples, visions, londondrugs, samsung"
)]
pub struct SiteParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_parsing() {
        assert_eq!(Site::from_str("amazon").unwrap(), Site::Amazon);
        assert_eq!(Site::from_str("BestBuy").unwrap(), Site::BestBuy);
        assert_eq!(Site::from_str("best buy").unwrap(), Site::BestBuy);
        assert_eq!(Site::from_str("costco").unwrap(), Site::Costco);
        assert_eq!(Site::from_str("STAPLES").unwrap(), Site::Staples);
        assert_eq!(Site::from_str("visions").unwrap(), Site::Visions);
        assert_eq!(Site::from_str("london-drugs").unwrap(), Site::LondonDrugs);
        assert_eq!(Site::from_str(" samsung ").unwrap(), Site::Samsung);

        assert!(Site::from_str("walmart").is_err());
        assert!(Site::from_str("").is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for site in Site::all() {
            assert_eq!(Site::from_str(&site.to_string()).unwrap(), *site);
        }
    }

    #[test]
    fn test_website_labels() {
        assert_eq!(Site::Amazon.website(), "Amazon");
        assert_eq!(Site::BestBuy.website(), "BestBuy");
        assert_eq!(Site::LondonDrugs.website(), "LondonDrugs");
        assert_eq!(Site::Samsung.website(), "Samsung");
    }

    #[test]
    fn test_default_base_urls() {
        for site in Site::all() {
            assert!(site.default_base_url().starts_with("https://"));
            assert!(!site.default_base_url().ends_with('/'));
        }
        assert_eq!(Site::Costco.default_base_url(), "https://www.costco.ca");
    }

    #[test]
    fn test_only_manufacturer_sites_override_brand() {
        assert_eq!(Site::Samsung.brand_override(), Some("Samsung"));
        for site in Site::all().iter().filter(|s| **s != Site::Samsung) {
            assert!(site.brand_override().is_none());
        }
    }

    #[test]
    fn test_site_all() {
        let all = Site::all();
        assert_eq!(all.len(), 7);
        assert!(all.contains(&Site::Amazon));
        assert!(all.contains(&Site::Samsung));
    }

    #[test]
    fn test_parse_error_display() {
        let err = Site::from_str("xyz").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("xyz"));
        assert!(msg.contains("Valid sites"));
    }

    #[test]
    fn test_site_serde() {
        let json = serde_json::to_string(&Site::LondonDrugs).unwrap();
        assert_eq!(json, "\"londondrugs\"");

        let parsed: Site = serde_json::from_str("\"bestbuy\"").unwrap();
        assert_eq!(parsed, Site::BestBuy);
    }
}
