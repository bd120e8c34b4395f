// src/pipeline/load.rs

//! Load stage: transformed products → sinks → git remote.

use crate::error::Result;
use crate::models::{Config, Product};
use crate::services::GitPublisher;
use crate::storage::{DatasetFile, LocalStorage, ProductSink, SqliteStore};
use crate::utils::console;

/// Outcome of persisting to one sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    pub name: String,
    /// Newly stored records, or the error message
    pub outcome: std::result::Result<usize, String>,
}

/// Result of one load run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Products read from the transform file
    pub records: usize,
    pub sinks: Vec<SinkReport>,
    pub published: bool,
}

/// The database and the published dataset file, in that order.
pub fn default_sinks(config: &Config, storage: &LocalStorage) -> Vec<Box<dyn ProductSink>> {
    vec![
        Box::new(SqliteStore::new(storage.path(&config.paths.database_file))),
        Box::new(DatasetFile::new(storage.clone(), config.paths.dataset_file.clone())),
    ]
}

/// Persist transformed products to every sink, then publish.
///
/// Sink and publish failures are logged and reported in the summary. They do
/// not fail the stage.
pub async fn run_load(
    config: &Config,
    storage: &LocalStorage,
    sinks: &[Box<dyn ProductSink>],
    publisher: Option<&GitPublisher>,
) -> Result<LoadSummary> {
    console::header("Load");

    let products = read_products(storage, &config.paths.transform_file).await;
    let mut summary = LoadSummary {
        records: products.len(),
        ..LoadSummary::default()
    };

    if products.is_empty() {
        log::info!("No data to write.");
        return Ok(summary);
    }

    for sink in sinks {
        let outcome = match sink.persist(&products).await {
            Ok(stored) => {
                console::sub_item(&format!("{}: {} new records", sink.name(), stored));
                Ok(stored)
            }
            Err(e) => {
                log::error!("Error writing to {}: {}", sink.name(), e);
                Err(e.to_string())
            }
        };
        summary.sinks.push(SinkReport {
            name: sink.name().to_string(),
            outcome,
        });
    }

    match publisher {
        Some(publisher) => match publisher.publish(products.len()).await {
            Ok(()) => summary.published = true,
            Err(e) => log::error!("Error publishing changes: {}", e),
        },
        None => log::info!("Publishing disabled, skipping git push"),
    }

    Ok(summary)
}

async fn read_products(storage: &LocalStorage, key: &str) -> Vec<Product> {
    match storage.read_json::<Vec<Product>>(key).await {
        Ok(Some(products)) => {
            log::info!("Loaded {} records from {}", products.len(), key);
            products
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
