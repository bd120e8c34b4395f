// src/services/normalize.rs

//! Field coercion from raw offers to products.

use crate::error::{AppError, Result};
use crate::models::{NormalizeConfig, Offer, Product};

/// Coerces display strings into typed product fields.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Parse a displayed price such as `"123 456 Ft"`.
    ///
    /// The currency marker and all whitespace (thousands separators, including
    /// non-breaking spaces) are removed before parsing.
    pub fn price(&self, raw: &str) -> Option<i64> {
        let digits = strip(raw, &self.config.currency_suffix);
        digits.parse().ok()
    }

    /// Parse a displayed review count such as `"12 vélemény"`.
    ///
    /// Anything that is not a plain run of digits once the suffix word and
    /// whitespace are gone counts as zero reviews.
    pub fn reviews(&self, raw: &str) -> u64 {
        let digits = strip(raw, &self.config.reviews_suffix);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return 0;
        }
        digits.parse().unwrap_or(0)
    }

    /// Normalize one offer. The store logo is dropped.
    pub fn product(&self, offer: Offer) -> Result<Product> {
        let price = self
            .price(&offer.price)
            .ok_or_else(|| AppError::transform(offer.id, format!("unparseable price '{}'", offer.price)))?;

        Ok(Product {
            id: offer.id,
            title: offer.title,
            price,
            currency: offer.currency,
            availability: offer.availability,
            rating: offer.rating,
            reviews_count: self.reviews(&offer.reviews_count),
            store_name: offer.store_name,
            link: offer.link,
            timestamp: offer.timestamp,
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizeConfig::default())
    }
}

fn strip(raw: &str, marker: &str) -> String {
    let without = if marker.is_empty() {
        raw.to_string()
    } else {
        raw.replace(marker, "")
    };
    without.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(price: &str, reviews: &str) -> Offer {
        Offer {
            id: 5,
            title: "Galaxy Tab A9".to_string(),
            price: price.to_string(),
            currency: "HUF".to_string(),
            availability: "http://schema.org/InStock".to_string(),
            rating: Some(5.0),
            reviews_count: reviews.to_string(),
            store_logo: "https://img.example.com/logo.png".to_string(),
            store_name: "Bolt".to_string(),
            link: "https://example.com/jump/5".to_string(),
            timestamp: "2024-11-20T10:00:00.000000".to_string(),
        }
    }

    #[test]
    fn test_price_with_separators_and_suffix() {
        let n = Normalizer::default();
        assert_eq!(n.price("123 456 Ft"), Some(123456));
        assert_eq!(n.price("58\u{a0}990\u{a0}Ft"), Some(58990));
        assert_eq!(n.price("990Ft"), Some(990));
    }

    #[test]
    fn test_price_rejects_non_numbers() {
        let n = Normalizer::default();
        assert_eq!(n.price("N/A"), None);
        assert_eq!(n.price(""), None);
        assert_eq!(n.price("12,5 Ft"), None);
    }

    #[test]
    fn test_reviews_count() {
        let n = Normalizer::default();
        assert_eq!(n.reviews("128 vélemény"), 128);
        assert_eq!(n.reviews("1 234 vélemény"), 1234);
        assert_eq!(n.reviews("N/A"), 0);
        assert_eq!(n.reviews("vélemény"), 0);
        assert_eq!(n.reviews("nincs értékelés"), 0);
        assert_eq!(n.reviews("-3"), 0);
    }

    #[test]
    fn test_product_drops_logo_and_coerces() {
        let product = Normalizer::default()
            .product(offer("123 456 Ft", "Nincs vélemény"))
            .unwrap();

        assert_eq!(product.id, 5);
        assert_eq!(product.price, 123456);
        assert_eq!(product.reviews_count, 0);

        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("store_logo").is_none());
    }

    #[test]
    fn test_product_fails_on_bad_price() {
        let err = Normalizer::default()
            .product(offer("N/A", "3 vélemény"))
            .unwrap_err();
        assert!(matches!(err, AppError::Transform { id: 5, .. }));
    }

    #[test]
    fn test_custom_markers() {
        let n = Normalizer::new(NormalizeConfig {
            currency_suffix: "EUR".to_string(),
            reviews_suffix: "reviews".to_string(),
        });
        assert_eq!(n.price("1 299 EUR"), Some(1299));
        assert_eq!(n.reviews("42 reviews"), 42);
    }
}
