// src/services/offers.rs

//! Offer extraction service.
//!
//! Pulls every offer block out of the listing page using configured CSS
//! selectors and assigns each one a fresh id from the counter.

use chrono::Local;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{NOT_AVAILABLE, Offer, SelectorConfig};
use crate::storage::IdCounter;
use crate::utils::resolve_url;

/// Compiled selectors for one offer block.
#[derive(Debug, Clone)]
pub struct OfferSelectors {
    offer: Selector,
    title: Selector,
    price: Selector,
    currency: Selector,
    availability: Selector,
    full_star: Selector,
    half_star: Selector,
    reviews_count: Selector,
    store_logo: Selector,
    store_name: Selector,
    link: Selector,
}

impl OfferSelectors {
    /// Compile every configured selector.
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            offer: parse_selector(&config.offer)?,
            title: parse_selector(&config.title)?,
            price: parse_selector(&config.price)?,
            currency: parse_selector(&config.currency)?,
            availability: parse_selector(&config.availability)?,
            full_star: parse_selector(&config.full_star)?,
            half_star: parse_selector(&config.half_star)?,
            reviews_count: parse_selector(&config.reviews_count)?,
            store_logo: parse_selector(&config.store_logo)?,
            store_name: parse_selector(&config.store_name)?,
            link: parse_selector(&config.link)?,
        })
    }
}

/// Parser turning listing page markup into raw offers.
#[derive(Debug, Clone)]
pub struct OfferParser {
    selectors: OfferSelectors,
    /// Page URL for resolving relative links
    base_url: Option<Url>,
}

impl OfferParser {
    pub fn new(selectors: OfferSelectors, page_url: &str) -> Self {
        Self {
            selectors,
            base_url: Url::parse(page_url).ok(),
        }
    }

    /// Extract every offer in document order.
    ///
    /// Each offer consumes exactly one id from `counter`.
    pub fn parse(&self, html: &str, counter: &mut IdCounter) -> Vec<Offer> {
        let document = Html::parse_document(html);
        document
            .select(&self.selectors.offer)
            .map(|item| self.parse_offer(item, counter.assign()))
            .collect()
    }

    fn parse_offer(&self, item: ElementRef<'_>, id: u64) -> Offer {
        let s = &self.selectors;

        let link = match attr_of(item, &s.link, "href") {
            Some(href) => match &self.base_url {
                Some(base) => resolve_url(base, &href),
                None => href,
            },
            None => NOT_AVAILABLE.to_string(),
        };

        let reviews_count = first(item, &s.reviews_count)
            .map(|el| {
                text_of(el)
                    .trim_matches(&['(', ')'][..])
                    .to_string()
            })
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Offer {
            id,
            title: text_or_na(item, &s.title),
            price: text_or_na(item, &s.price),
            currency: attr_or_na(item, &s.currency, "content"),
            availability: attr_or_na(item, &s.availability, "href"),
            rating: self.rating(item),
            reviews_count,
            store_logo: attr_or_na(item, &s.store_logo, "src"),
            store_name: text_or_na(item, &s.store_name),
            link,
            timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        }
    }

    /// Full stars count one, half stars a half. No full stars means no rating.
    fn rating(&self, item: ElementRef<'_>) -> Option<f64> {
        let full = item.select(&self.selectors.full_star).count();
        if full == 0 {
            return None;
        }
        let half = item.select(&self.selectors.half_star).count();
        Some(full as f64 + 0.5 * half as f64)
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn first<'a>(item: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    item.select(selector).next()
}

/// Concatenated text with every fragment trimmed.
fn text_of(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

fn text_or_na(item: ElementRef<'_>, selector: &Selector) -> String {
    first(item, selector)
        .map(text_of)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn attr_of(item: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    first(item, selector)
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

fn attr_or_na(item: ElementRef<'_>, selector: &Selector, attr: &str) -> String {
    attr_of(item, selector, attr).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
