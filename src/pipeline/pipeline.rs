// src/pipeline/pipeline.rs

use reqwest::Client;

use crate::error::Result;
use crate::models::Config;
use crate::services::GitPublisher;
use crate::storage::LocalStorage;
use crate::utils::console;

use super::extract::{ExtractOutcome, run_extract};
use super::load::{LoadSummary, default_sinks, run_load};
use super::transform::{TransformOutcome, run_transform};

/// What each stage of a full run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub extract: ExtractOutcome,
    pub transform: TransformOutcome,
    pub load: LoadSummary,
}

/// Run extract, transform and load in order.
///
/// The first failing stage is logged and its error returned; later stages
/// do not run.
pub async fn run_pipeline(
    config: &Config,
    storage: &LocalStorage,
    client: &Client,
    publisher: Option<&GitPublisher>,
) -> Result<PipelineSummary> {
    console::header("ETL pipeline");

    console::step(1, 3, "Extract - Fetching offers");
    let extract = run_extract(config, storage, client)
        .await
        .inspect_err(|e| log::error!("Error during extraction: {}", e))?;

    console::step(2, 3, "Transform - Normalizing records");
    let transform = run_transform(config, storage)
        .await
        .inspect_err(|e| log::error!("Error during transformation: {}", e))?;

    console::step(3, 3, "Load - Persisting and publishing");
    let sinks = default_sinks(config, storage);
    let load = run_load(config, storage, &sinks, publisher)
        .await
        .inspect_err(|e| log::error!("Error during loading: {}", e))?;

    console::summary(
        "Pipeline complete",
        &[
            ("Extracted", extract.offers.to_string()),
            ("Transformed", transform.transformed.to_string()),
            ("Skipped", transform.skipped.to_string()),
            ("Total records", load.records.to_string()),
            ("Published", load.published.to_string()),
        ],
    );

    Ok(PipelineSummary {
        extract,
        transform,
        load,
    })
}
