// src/models/offer.rs

//! Offer records, before and after normalization.

use serde::{Deserialize, Serialize};

/// Placeholder for fields missing from the page.
pub const NOT_AVAILABLE: &str = "N/A";

/// A raw offer scraped from the listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    /// Stable record id taken from the persistent counter
    pub id: u64,

    pub title: String,

    /// Price as displayed, e.g. "123 456 Ft"
    pub price: String,

    pub currency: String,

    /// Schema.org availability URI
    pub availability: String,

    /// Star rating, `"N/A"` when the offer shows no stars
    #[serde(with = "rating")]
    pub rating: Option<f64>,

    /// Review count as displayed, e.g. "12 vélemény"
    pub reviews_count: String,

    pub store_logo: String,

    pub store_name: String,

    pub link: String,

    /// Local ISO 8601 time of extraction
    pub timestamp: String,
}

/// A normalized offer ready for storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: i64,
    pub currency: String,
    pub availability: String,
    #[serde(with = "rating")]
    pub rating: Option<f64>,
    pub reviews_count: u64,
    pub store_name: String,
    pub link: String,
    pub timestamp: String,
}

/// Serializes a missing rating as `"N/A"` and accepts either form back.
pub(crate) mod rating {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NOT_AVAILABLE;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_str(NOT_AVAILABLE),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Number(v)) => Some(v),
            Some(Raw::Text(_)) | None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_offer(rating: Option<f64>) -> Offer {
        Offer {
            id: 7,
            title: "Samsung Galaxy Tab A9".to_string(),
            price: "58 990 Ft".to_string(),
            currency: "HUF".to_string(),
            availability: "http://schema.org/InStock".to_string(),
            rating,
            reviews_count: "(12 vélemény)".to_string(),
            store_logo: "https://example.com/logo.png".to_string(),
            store_name: "Bolt".to_string(),
            link: "https://example.com/jump/7".to_string(),
            timestamp: "2024-11-20T10:00:00.000000".to_string(),
        }
    }

    #[test]
    fn missing_rating_is_written_as_placeholder() {
        let json = serde_json::to_value(sample_offer(None)).unwrap();
        assert_eq!(json["rating"], "N/A");

        let json = serde_json::to_value(sample_offer(Some(4.5))).unwrap();
        assert_eq!(json["rating"], 4.5);
    }

    #[test]
    fn rating_reads_number_placeholder_or_null() {
        let mut json = serde_json::to_value(sample_offer(None)).unwrap();
        let offer: Offer = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(offer.rating, None);

        json["rating"] = serde_json::json!(3);
        let offer: Offer = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(offer.rating, Some(3.0));

        json["rating"] = serde_json::Value::Null;
        let offer: Offer = serde_json::from_value(json).unwrap();
        assert_eq!(offer.rating, None);
    }
}
