// src/models/mod.rs

//! Domain models for the ETL pipeline.

mod config;
mod offer;

pub use config::{
    Config, LoggingConfig, NormalizeConfig, PathsConfig, PublishConfig, SelectorConfig,
    SourceConfig,
};
pub use offer::{NOT_AVAILABLE, Offer, Product};
