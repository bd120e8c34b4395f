//! Pipeline entry points.
//!
//! - `run_extract`: Fetch the listing page into the extract file
//! - `run_transform`: Normalize new offers into the transform file
//! - `run_load`: Persist products to the sinks and publish
//! - `run_export`: Dump the database to JSON
//! - `run_pipeline`: Extract, transform and load in one go

pub mod export;
pub mod extract;
pub mod load;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod status;
pub mod transform;

pub use export::run_export;
pub use extract::{ExtractOutcome, extract_from_html, run_extract};
pub use load::{LoadSummary, SinkReport, default_sinks, run_load};
pub use pipeline::{PipelineSummary, run_pipeline};
pub use status::{Status, collect_status};
pub use transform::{TransformOutcome, run_transform};
