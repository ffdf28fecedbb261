//! Service layer for the harvester.
//!
//! This module contains the business logic for:
//! - Item extraction from a fetched page (`extract`)
//! - Page fetching plus extraction per rule (`NewsCrawler`)
//! - Search over stored items (`QueryService`)

mod crawler;
pub mod extract;
mod search;

pub use crawler::NewsCrawler;
pub use extract::{Extraction, RuleSelectors};
pub use search::QueryService;
