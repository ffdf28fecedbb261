// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod item;
mod rule;

// Re-export all public types
pub use config::{
    CleaningConfig, Config, CrawlerConfig, PathsConfig, ServerConfig, StorageConfig,
};
pub use item::{Item, NewsItem};
pub use rule::{ExprSyntax, ExtractMode, ExtractionRule, SourceRule};
