//! Generic search-results parser driven by a site's rule table.

use crate::config::Config;
use crate::extract::{
    collapse_whitespace, is_match, parse_amount, parse_money, price_valid_till,
    DEFAULT_MATCH_THRESHOLD,
};
use crate::sites::models::{CandidateStats, MissReason, ScrapeResult, SiteOutcome};
use crate::sites::selectors::{PriceSource, SiteRules};
use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

/// Knobs shared by every site's parser.
#[derive(Debug, Clone, Copy)]
pub struct ParserSettings {
    /// Result items examined per page on multi-result sites
    pub max_candidates: usize,
    /// Minimum title similarity for the match gate
    pub match_threshold: f64,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self { max_candidates: 5, match_threshold: DEFAULT_MATCH_THRESHOLD }
    }
}

impl From<&Config> for ParserSettings {
    fn from(config: &Config) -> Self {
        Self { max_candidates: config.max_candidates, match_threshold: config.match_threshold }
    }
}

/// What happened to a single result item.
enum Verdict {
    Accept(ScrapeResult),
    Sponsored,
    Untitled,
    OffTarget(String),
    Unpriced(String),
}

/// Parser for one site's search results page.
pub struct Parser {
    website: String,
    rules: &'static SiteRules,
    containers: Vec<(&'static str, Selector)>,
    sponsored: Option<Selector>,
    titles: Vec<Selector>,
    prices: Vec<(PriceSource, Selector)>,
    window: usize,
    threshold: f64,
}

fn compile(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| anyhow!("Invalid selector '{}': {:?}", raw, e))
}

impl Parser {
    /// Compiles the rule table for `website`.
    pub fn new(
        website: impl Into<String>,
        rules: &'static SiteRules,
        settings: ParserSettings,
    ) -> Result<Self> {
        let containers = rules
            .containers
            .iter()
            .map(|raw| compile(raw).map(|selector| (*raw, selector)))
            .collect::<Result<Vec<_>>>()?;

        let titles = rules.titles.iter().map(|raw| compile(raw)).collect::<Result<Vec<_>>>()?;

        let prices = rules
            .prices
            .iter()
            .map(|source| compile(source.selector()).map(|selector| (*source, selector)))
            .collect::<Result<Vec<_>>>()?;

        let sponsored = rules.sponsored.map(compile).transpose()?;

        let window = if rules.single_result { 1 } else { settings.max_candidates.max(1) };

        Ok(Self {
            website: website.into(),
            rules,
            containers,
            sponsored,
            titles,
            prices,
            window,
            threshold: settings.match_threshold,
        })
    }

    /// Number of result items examined per page.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Picks the first acceptable item from a search results page.
    ///
    /// `query` must already be normalized.
    pub fn parse_search(&self, html: &str, query: &str) -> SiteOutcome {
        if html.trim().is_empty() {
            return SiteOutcome::miss(&self.website, MissReason::EmptyPage);
        }

        let document = Html::parse_document(html);

        let Some(items) = self.find_items(&document) else {
            debug!("[{}] No results container found", self.website);
            return SiteOutcome::miss(&self.website, MissReason::NoContainer);
        };

        let mut stats = CandidateStats::default();

        for item in items.into_iter().take(self.window) {
            stats.examined += 1;

            match self.judge(item, query) {
                Verdict::Accept(result) => {
                    debug!("[{}] Accepted: {} ({:?})", self.website, result.title, result.price);
                    return SiteOutcome::Hit(result);
                }
                Verdict::Sponsored => {
                    trace!("[{}] Skipping sponsored item", self.website);
                    stats.sponsored += 1;
                }
                Verdict::Untitled => {
                    trace!("[{}] Skipping item without title", self.website);
                    stats.untitled += 1;
                }
                Verdict::OffTarget(title) => {
                    debug!("[{}] Title doesn't match query well enough: {}", self.website, title);
                    stats.rejected += 1;
                }
                Verdict::Unpriced(title) => {
                    debug!("[{}] No valid price for: {}", self.website, title);
                    stats.unpriced += 1;
                }
            }
        }

        SiteOutcome::miss(&self.website, MissReason::NoAcceptableCandidate(stats))
    }

    /// Applies the container selectors in order; the first one with any match wins.
    fn find_items<'a>(&self, document: &'a Html) -> Option<Vec<ElementRef<'a>>> {
        self.containers.iter().find_map(|(raw, selector)| {
            let items: Vec<_> = document.select(selector).collect();
            if items.is_empty() {
                return None;
            }
            trace!("[{}] {} items via '{}'", self.website, items.len(), raw);
            Some(items)
        })
    }

    fn judge(&self, item: ElementRef, query: &str) -> Verdict {
        if self.is_sponsored(item) {
            return Verdict::Sponsored;
        }

        let Some(title) = self.extract_title(item) else {
            return Verdict::Untitled;
        };

        if self.rules.match_gate && !is_match(query, &title, self.threshold) {
            return Verdict::OffTarget(title);
        }

        let price = self.extract_price(item);
        if price.is_none() && self.rules.require_price {
            return Verdict::Unpriced(title);
        }

        let valid_till =
            if self.rules.scan_validity { price_valid_till(item) } else { String::new() };

        Verdict::Accept(ScrapeResult::hit(&self.website, title, price, valid_till))
    }

    fn is_sponsored(&self, item: ElementRef) -> bool {
        self.sponsored.as_ref().is_some_and(|selector| item.select(selector).next().is_some())
    }

    /// First non-empty title among the title selectors.
    fn extract_title(&self, item: ElementRef) -> Option<String> {
        self.titles.iter().find_map(|selector| {
            let element = item.select(selector).next()?;
            let title = collapse_whitespace(&element.text().collect::<String>());
            (!title.is_empty()).then_some(title)
        })
    }

    /// First parseable price across the price sources, in order.
    fn extract_price(&self, item: ElementRef) -> Option<f64> {
        self.prices.iter().find_map(|(source, selector)| {
            item.select(selector).find_map(|element| read_price(source, element))
        })
    }
}

fn read_price(source: &PriceSource, element: ElementRef) -> Option<f64> {
    let text = || element.text().collect::<String>();

    match source {
        PriceSource::Text(_) => parse_money(&text()),
        PriceSource::Attr { attr, text_fallback, .. } => {
            let from_attr = element
                .value()
                .attr(attr)
                .filter(|value| !value.trim().is_empty())
                .and_then(parse_amount);

            match from_attr {
                Some(price) => Some(price),
                None if *text_fallback => parse_money(&text()),
                None => None,
            }
        }
    }
}
