// src/pipeline/transform.rs

//! Transform stage: raw offers → accumulated products.
//!
//! Records are keyed by id. An id that is already in the transform file is
//! never transformed again, even if the offer's content changed.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{Config, Offer, Product};
use crate::services::Normalizer;
use crate::storage::LocalStorage;
use crate::utils::console;

/// Result of one transform run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutcome {
    /// Offers read from the extract file
    pub loaded: usize,
    /// Offers skipped because their id was already transformed
    pub skipped: usize,
    /// Offers newly transformed in this run
    pub transformed: usize,
    /// Products in the transform file afterwards
    pub total: usize,
}

/// Normalize new offers and append them to the transform file.
pub async fn run_transform(config: &Config, storage: &LocalStorage) -> Result<TransformOutcome> {
    console::header("Transform");

    let input = &config.paths.extract_file;
    let output = &config.paths.transform_file;

    let mut products = load_existing(storage, output).await;
    let offers = load_offers(storage, input).await;

    let mut outcome = TransformOutcome {
        loaded: offers.len(),
        total: products.len(),
        ..TransformOutcome::default()
    };

    if offers.is_empty() {
        log::info!("No data to transform.");
        return Ok(outcome);
    }

    let normalizer = Normalizer::new(config.normalize.clone());
    let mut known: HashSet<u64> = products.iter().map(|p| p.id).collect();

    for offer in offers {
        if !known.insert(offer.id) {
            log::debug!("Skipping already transformed record {}", offer.id);
            outcome.skipped += 1;
            continue;
        }
        products.push(normalizer.product(offer)?);
        outcome.transformed += 1;
    }

    storage.write_json(output, &products).await?;
    outcome.total = products.len();

    console::sub_item(&format!(
        "{} transformed, {} skipped, {} total in {}",
        outcome.transformed, outcome.skipped, outcome.total, output
    ));
    Ok(outcome)
}

/// Previously transformed products. A missing or unreadable file starts fresh.
async fn load_existing(storage: &LocalStorage, key: &str) -> Vec<Product> {
    match storage.read_json::<Vec<Product>>(key).await {
        Ok(Some(products)) => {
            log::info!("Loaded {} existing transformed records from {}", products.len(), key);
            products
        }
        Ok(None) => {
            log::info!("No existing transformed data in {}. Starting fresh.", key);
            Vec::new()
        }
        Err(e) => {
            log::warn!("Existing transformed data in {} is unreadable ({}). Starting fresh.", key, e);
            Vec::new()
        }
    }
}

/// Offers from the extract file. A missing or unreadable file yields nothing.
async fn load_offers(storage: &LocalStorage, key: &str) -> Vec<Offer> {
    match storage.read_json::<Vec<Offer>>(key).await {
        Ok(Some(offers)) => {
            log::info!("Data loaded from {}", key);
            offers
        }
        Ok(None) => {
            log::warn!("File {} not found.", key);
            Vec::new()
        }
        Err(e) => {
            log::warn!("Error decoding JSON from {}: {}", key, e);
            Vec::new()
        }
    }
}
