// src/app.rs

//! Application service object.
//!
//! Built once at startup from [`Config`]. Owns the rule catalog, the store
//! handle and the crawler, and hands them out to the scheduler and the
//! search endpoint.

use std::sync::Arc;

use futures::future::join_all;

use crate::config::load_rules;
use crate::error::Result;
use crate::models::{Config, SourceRule};
use crate::pipeline::{CycleOutcome, Scheduler, run_cycle};
use crate::services::{NewsCrawler, QueryService};
use crate::storage::{ItemStorage, SqliteStorage};

pub struct NewsApp {
    config: Arc<Config>,
    rules: Vec<Arc<SourceRule>>,
    crawler: Arc<NewsCrawler>,
    storage: Arc<dyn ItemStorage>,
}

impl NewsApp {
    /// Load rules, open the store and build the HTTP crawler.
    ///
    /// Any failure here is fatal: without valid rules and a store there is
    /// nothing to run.
    pub fn init(config: Config) -> Result<Self> {
        config.validate()?;
        let rules = load_rules(&config.paths.rules_file)?;
        let storage = SqliteStorage::open(&config.storage.database_path)?;
        let crawler = NewsCrawler::from_config(&config)?;

        Ok(Self::with_parts(config, rules, crawler, Arc::new(storage)))
    }

    /// Assemble from already constructed parts.
    pub fn with_parts(
        config: Config,
        rules: Vec<SourceRule>,
        crawler: NewsCrawler,
        storage: Arc<dyn ItemStorage>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            rules: rules.into_iter().map(Arc::new).collect(),
            crawler: Arc::new(crawler),
            storage,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rules(&self) -> &[Arc<SourceRule>] {
        &self.rules
    }

    pub fn storage(&self) -> Arc<dyn ItemStorage> {
        Arc::clone(&self.storage)
    }

    /// Start one repeating updater per rule.
    pub fn start_updaters(&self) -> Scheduler {
        Scheduler::start(&self.rules, Arc::clone(&self.crawler), self.storage())
    }

    /// Run a single cycle for every rule concurrently.
    ///
    /// Results are returned in rule order; one rule failing does not stop
    /// the others.
    pub async fn run_once(&self) -> Vec<(Arc<SourceRule>, Result<CycleOutcome>)> {
        let cycles = self.rules.iter().map(|rule| async move {
            let outcome = run_cycle(&self.crawler, self.storage.as_ref(), rule).await;
            (Arc::clone(rule), outcome)
        });
        join_all(cycles).await
    }

    /// Search service reading from this app's store.
    pub fn query_service(&self) -> QueryService {
        QueryService::new(self.storage())
    }
}
