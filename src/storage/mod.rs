//! Storage abstractions for pipeline files and product persistence.
//!
//! - `LocalStorage`: atomic JSON files under the working tree root
//! - `IdCounter`: persistent record id source
//! - `ProductSink`: destinations the load stage writes products to
//!   (`SqliteStore`, `DatasetFile`)

pub mod counter;
pub mod local;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Product;

// Re-export for convenience
pub use counter::IdCounter;
pub use local::{DatasetFile, LocalStorage};
pub use sqlite::SqliteStore;

/// A destination for normalized products.
///
/// Sinks are independent: a failure in one does not stop the others.
#[async_trait]
pub trait ProductSink: Send + Sync {
    /// Short name used in logs and summaries.
    fn name(&self) -> &str;

    /// Persist products, returning how many were newly stored.
    async fn persist(&self, products: &[Product]) -> Result<usize>;
}
