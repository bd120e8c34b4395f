//! get-a-deal CLI
//!
//! Runs the price-offer ETL stages against the local working tree.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use get_a_deal::{
    error::Result,
    models::Config,
    pipeline,
    services::GitPublisher,
    storage::LocalStorage,
    utils::{console, http},
};

/// get-a-deal - price offer ETL
#[derive(Parser, Debug)]
#[command(
    name = "get-a-deal",
    version,
    about = "Scrape price-comparison offers, normalize them and publish the dataset"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the listing page into the extract file
    Extract,

    /// Normalize new offers into the transform file
    Transform,

    /// Write transformed records to the database and dataset, then publish
    Load {
        /// Skip the git commit and push
        #[arg(long)]
        no_publish: bool,
    },

    /// Dump the database to the export file
    Export,

    /// Run full pipeline: Extract → Transform → Load
    Pipeline {
        /// Skip the git commit and push
        #[arg(long)]
        no_publish: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show the counter and record counts
    Info,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Publisher for a command, honouring `--no-publish`.
fn publisher(config: &Config, no_publish: bool) -> Result<Option<GitPublisher>> {
    if no_publish {
        return Ok(None);
    }
    GitPublisher::from_env(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) if matches!(cli.command, Command::Validate) => {
            log::error!("Cannot read {}: {}", cli.config.display(), e);
            return Err(e);
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };

    let storage = LocalStorage::new(&config.paths.root);

    match cli.command {
        Command::Extract => {
            let client = http::create_client(&config.source)?;
            pipeline::run_extract(&config, &storage, &client).await?;
        }

        Command::Transform => {
            pipeline::run_transform(&config, &storage).await?;
        }

        Command::Load { no_publish } => {
            let publisher = publisher(&config, no_publish)?;
            let sinks = pipeline::default_sinks(&config, &storage);
            let summary =
                pipeline::run_load(&config, &storage, &sinks, publisher.as_ref()).await?;

            let mut items: Vec<(&str, String)> = summary
                .sinks
                .iter()
                .map(|s| {
                    let value = match &s.outcome {
                        Ok(n) => format!("{n} new"),
                        Err(e) => format!("failed ({e})"),
                    };
                    (s.name.as_str(), value)
                })
                .collect();
            items.push(("published", summary.published.to_string()));
            console::summary(&format!("{} records loaded", summary.records), &items);
        }

        Command::Export => {
            pipeline::run_export(&config, &storage).await?;
        }

        Command::Pipeline { no_publish } => {
            let publisher = publisher(&config, no_publish)?;
            let client = http::create_client(&config.source)?;
            pipeline::run_pipeline(&config, &storage, &client, publisher.as_ref()).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (source, selectors, paths and publishing)");

            if config.publish.enabled && std::env::var(&config.publish.token_env).is_err() {
                log::warn!(
                    "Publishing is enabled but {} is not set",
                    config.publish.token_env
                );
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Working tree: {}", storage.root().display());
            log::info!(
                "Database: {}",
                config.paths.resolve(&config.paths.database_file).display()
            );
            let status = pipeline::collect_status(&config, &storage).await;
            console::summary("Pipeline files", &status.items());
        }
    }

    log::info!("Done!");

    Ok(())
}
