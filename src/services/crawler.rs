// src/services/crawler.rs

//! News crawler service.
//!
//! Fetches a rule's page and runs extraction over it.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{CleaningConfig, Config, SourceRule};
use crate::services::extract::{Extraction, extract};
use crate::utils::http::{HttpFetcher, PageFetcher};

/// Service turning a [`SourceRule`] into extracted items.
#[derive(Clone)]
pub struct NewsCrawler {
    fetcher: Arc<dyn PageFetcher>,
    cleaning: CleaningConfig,
}

impl NewsCrawler {
    /// Create a crawler over an arbitrary page source.
    pub fn new(fetcher: Arc<dyn PageFetcher>, cleaning: CleaningConfig) -> Self {
        Self { fetcher, cleaning }
    }

    /// Create a crawler fetching over HTTP with the configured client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.crawler)?;
        Ok(Self::new(Arc::new(fetcher), config.cleaning.clone()))
    }

    /// Fetch the rule's page and extract its items.
    ///
    /// Fetch failures and unusable rules are returned as errors; per-item
    /// problems are reported inside the [`Extraction`].
    pub async fn harvest(&self, rule: &SourceRule) -> Result<Extraction> {
        log::debug!("Fetching {}", rule.url);
        let html = self.fetcher.fetch(&rule.url).await?;
        log::debug!("Fetched {} bytes from {}", html.len(), rule.url);

        extract(rule, &html, &self.cleaning)
    }
}
