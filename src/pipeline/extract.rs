// src/pipeline/extract.rs

//! Extract stage: listing page → raw offers file.

use reqwest::Client;

use crate::error::Result;
use crate::models::{Config, Offer};
use crate::services::{OfferParser, OfferSelectors};
use crate::storage::{IdCounter, LocalStorage};
use crate::utils::{console, http};

/// Result of one extract run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    /// Offers found on the page
    pub offers: usize,
    /// Id the next run starts from
    pub next_id: u64,
}

/// Fetch the listing page and write its offers to the extract file.
pub async fn run_extract(
    config: &Config,
    storage: &LocalStorage,
    client: &Client,
) -> Result<ExtractOutcome> {
    console::header("Extract");
    log::info!("Fetching {}", config.source.url);

    let html = http::fetch_page(client, &config.source.url).await?;
    log::debug!("Fetched {} bytes", html.len());

    extract_from_html(config, storage, &html).await
}

/// Parse already fetched markup, persist the counter and the extract file.
///
/// The extract file is always rewritten, so an empty page leaves an empty
/// list behind rather than the previous run's offers.
pub async fn extract_from_html(
    config: &Config,
    storage: &LocalStorage,
    html: &str,
) -> Result<ExtractOutcome> {
    let selectors = OfferSelectors::compile(&config.selectors)?;
    let parser = OfferParser::new(selectors, &config.source.url);

    let mut counter = IdCounter::load(storage, &config.paths.counter_file).await;
    let offers: Vec<Offer> = parser.parse(html, &mut counter);
    counter.save(storage).await?;

    storage.write_json(&config.paths.extract_file, &offers).await?;

    if offers.is_empty() {
        log::warn!("No offers found on the page");
    }
    console::sub_item(&format!(
        "{} offers written to {}",
        offers.len(),
        config.paths.extract_file
    ));
    console::sub_item(&format!("Next record id: {}", counter.peek()));

    Ok(ExtractOutcome {
        offers: offers.len(),
        next_id: counter.peek(),
    })
}
