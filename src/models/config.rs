//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Page to scrape and HTTP behavior
    #[serde(default)]
    pub source: SourceConfig,

    /// CSS selectors for offer fields
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Field coercion rules
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Git publishing
    #[serde(default)]
    pub publish: PublishConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.source.url)
            .map_err(|e| AppError::validation(format!("source.url is invalid: {e}")))?;

        for (name, file) in self.paths.files() {
            if file.trim().is_empty() {
                return Err(AppError::validation(format!("paths.{name} is empty")));
            }
        }

        for (name, selector) in self.selectors.entries() {
            Selector::parse(selector)
                .map_err(|e| AppError::selector(selector, format!("selectors.{name}: {e:?}")))?;
        }

        if self.publish.enabled {
            let remote = url::Url::parse(&self.publish.remote)
                .map_err(|e| AppError::validation(format!("publish.remote is invalid: {e}")))?;
            if remote.scheme() != "https" {
                return Err(AppError::validation("publish.remote must be an https URL"));
            }
            if self.publish.token_env.trim().is_empty() {
                return Err(AppError::validation("publish.token_env is empty"));
            }
        }
        Ok(())
    }
}

/// Product page and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Listing page holding the offers
    #[serde(default = "defaults::url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// CSS selectors used to pull offers out of the listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Container of a single offer
    #[serde(default = "defaults::offer")]
    pub offer: String,

    #[serde(default = "defaults::title")]
    pub title: String,

    #[serde(default = "defaults::price")]
    pub price: String,

    /// Element carrying the currency in its `content` attribute
    #[serde(default = "defaults::currency")]
    pub currency: String,

    /// Element carrying the availability URI in its `href` attribute
    #[serde(default = "defaults::availability")]
    pub availability: String,

    #[serde(default = "defaults::full_star")]
    pub full_star: String,

    #[serde(default = "defaults::half_star")]
    pub half_star: String,

    #[serde(default = "defaults::reviews_count")]
    pub reviews_count: String,

    /// Store logo image, read from `src`
    #[serde(default = "defaults::store_logo")]
    pub store_logo: String,

    #[serde(default = "defaults::store_name")]
    pub store_name: String,

    /// Jump link to the store offer, read from `href`
    #[serde(default = "defaults::link")]
    pub link: String,
}

impl SelectorConfig {
    /// All selectors with their config key.
    pub fn entries(&self) -> [(&'static str, &str); 11] {
        [
            ("offer", self.offer.as_str()),
            ("title", self.title.as_str()),
            ("price", self.price.as_str()),
            ("currency", self.currency.as_str()),
            ("availability", self.availability.as_str()),
            ("full_star", self.full_star.as_str()),
            ("half_star", self.half_star.as_str()),
            ("reviews_count", self.reviews_count.as_str()),
            ("store_logo", self.store_logo.as_str()),
            ("store_name", self.store_name.as_str()),
            ("link", self.link.as_str()),
        ]
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            offer: defaults::offer(),
            title: defaults::title(),
            price: defaults::price(),
            currency: defaults::currency(),
            availability: defaults::availability(),
            full_star: defaults::full_star(),
            half_star: defaults::half_star(),
            reviews_count: defaults::reviews_count(),
            store_logo: defaults::store_logo(),
            store_name: defaults::store_name(),
            link: defaults::link(),
        }
    }
}

/// Field coercion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Currency marker removed from price strings
    #[serde(default = "defaults::currency_suffix")]
    pub currency_suffix: String,

    /// Word removed from review count strings
    #[serde(default = "defaults::reviews_suffix")]
    pub reviews_suffix: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            currency_suffix: defaults::currency_suffix(),
            reviews_suffix: defaults::reviews_suffix(),
        }
    }
}

/// Locations of every file the pipeline reads or writes.
///
/// All file names are relative to `root`, which is also the git working tree
/// used when publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::root")]
    pub root: PathBuf,

    /// Raw offers written by the extract stage
    #[serde(default = "defaults::extract_file")]
    pub extract_file: String,

    /// Accumulated normalized products
    #[serde(default = "defaults::transform_file")]
    pub transform_file: String,

    #[serde(default = "defaults::database_file")]
    pub database_file: String,

    /// Append-only published dataset
    #[serde(default = "defaults::dataset_file")]
    pub dataset_file: String,

    /// Persisted record id counter
    #[serde(default = "defaults::counter_file")]
    pub counter_file: String,

    /// JSON dump of the database table
    #[serde(default = "defaults::export_file")]
    pub export_file: String,
}

impl PathsConfig {
    /// Full path of a file relative to the root.
    pub fn resolve(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    fn files(&self) -> [(&'static str, &str); 6] {
        [
            ("extract_file", self.extract_file.as_str()),
            ("transform_file", self.transform_file.as_str()),
            ("database_file", self.database_file.as_str()),
            ("dataset_file", self.dataset_file.as_str()),
            ("counter_file", self.counter_file.as_str()),
            ("export_file", self.export_file.as_str()),
        ]
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: defaults::root(),
            extract_file: defaults::extract_file(),
            transform_file: defaults::transform_file(),
            database_file: defaults::database_file(),
            dataset_file: defaults::dataset_file(),
            counter_file: defaults::counter_file(),
            export_file: defaults::export_file(),
        }
    }
}

/// Git publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default = "defaults::publish_enabled")]
    pub enabled: bool,

    /// HTTPS URL of the remote repository (without credentials)
    #[serde(default = "defaults::remote")]
    pub remote: String,

    /// Environment variable holding the access token
    #[serde(default = "defaults::token_env")]
    pub token_env: String,

    /// Commit message template.
    ///
    /// Supported placeholders: `{count}`, `{timestamp}`
    #[serde(default = "defaults::commit_message")]
    pub commit_message: String,
}

impl PublishConfig {
    /// Render the commit message for a run.
    pub fn render_message(&self, count: usize, timestamp: &str) -> String {
        self.commit_message
            .replace("{count}", &count.to_string())
            .replace("{timestamp}", timestamp)
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::publish_enabled(),
            remote: defaults::remote(),
            token_env: defaults::token_env(),
            commit_message: defaults::commit_message(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn url() -> String {
        "https://tablet-pc.arukereso.hu/samsung/galaxy-tab-a9-x210-128gb-p1025165686/#".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Selector defaults
    pub fn offer() -> String {
        "div.optoffer.device-desktop".into()
    }
    pub fn title() -> String {
        r#"h4[data-akjl="Product name||ProductName"]"#.into()
    }
    pub fn price() -> String {
        r#"span[itemprop="price"]"#.into()
    }
    pub fn currency() -> String {
        r#"meta[itemprop="priceCurrency"]"#.into()
    }
    pub fn availability() -> String {
        r#"link[itemprop="availability"]"#.into()
    }
    pub fn full_star() -> String {
        "span.star.icon-star".into()
    }
    pub fn half_star() -> String {
        "span.star.icon-star-half-alt".into()
    }
    pub fn reviews_count() -> String {
        "span.reviews-count".into()
    }
    pub fn store_logo() -> String {
        "img.img-responsive.logo-host".into()
    }
    pub fn store_name() -> String {
        r#"div[data-akjl="Store name||StoreName"]"#.into()
    }
    pub fn link() -> String {
        "a.jumplink-overlay.initial".into()
    }

    // Normalize defaults
    pub fn currency_suffix() -> String {
        "Ft".into()
    }
    pub fn reviews_suffix() -> String {
        "vélemény".into()
    }

    // Path defaults
    pub fn root() -> PathBuf {
        PathBuf::from(".")
    }
    pub fn extract_file() -> String {
        "out.json".into()
    }
    pub fn transform_file() -> String {
        "post.json".into()
    }
    pub fn database_file() -> String {
        "sqlite.db".into()
    }
    pub fn dataset_file() -> String {
        "saved.json".into()
    }
    pub fn counter_file() -> String {
        "counter.json".into()
    }
    pub fn export_file() -> String {
        "sqlite.json".into()
    }

    // Publish defaults
    pub fn publish_enabled() -> bool {
        true
    }
    pub fn remote() -> String {
        "https://github.com/skravco/get-a-deal.git".into()
    }
    pub fn token_env() -> String {
        "GET_A_DEAL_PAT".into()
    }
    pub fn commit_message() -> String {
        "Processed {count} records - fetch data for {timestamp}".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.source.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.selectors.price = "[[invalid".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_file_name() {
        let mut config = Config::default();
        config.paths.counter_file = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_ignores_remote_when_publishing_disabled() {
        let mut config = Config::default();
        config.publish.enabled = false;
        config.publish.remote = "not a url".to_string();
        assert!(config.validate().is_ok());

        config.publish.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [paths]
            root = "data"
            dataset_file = "dataset.json"

            [publish]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.dataset_file, "dataset.json");
        assert_eq!(config.paths.transform_file, "post.json");
        assert_eq!(config.paths.resolve("out.json"), PathBuf::from("data/out.json"));
        assert!(!config.publish.enabled);
        assert_eq!(config.normalize.currency_suffix, "Ft");
    }

    #[test]
    fn commit_message_placeholders() {
        let publish = PublishConfig::default();
        assert_eq!(
            publish.render_message(3, "Mon Jan  1 10:00:00 2024"),
            "Processed 3 records - fetch data for Mon Jan  1 10:00:00 2024"
        );
    }
}
