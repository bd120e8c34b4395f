//! Service layer for the ETL pipeline.
//!
//! This module contains the business logic for:
//! - Offer extraction (`OfferParser`)
//! - Field coercion (`Normalizer`)
//! - Git publishing (`GitPublisher`)

mod normalize;
mod offers;
mod publish;

pub use normalize::Normalizer;
pub use offers::{OfferParser, OfferSelectors};
pub use publish::GitPublisher;
