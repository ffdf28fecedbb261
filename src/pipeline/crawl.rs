// src/pipeline/crawl.rs

//! One harvest cycle: fetch, extract, store.

use std::fmt;

use chrono::Utc;

use crate::error::Result;
use crate::models::SourceRule;
use crate::services::NewsCrawler;
use crate::storage::ItemStorage;

/// Summary of a single cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Items produced by extraction
    pub extracted: usize,
    /// Items stored for the first time
    pub inserted: usize,
    /// Items whose link was already stored
    pub duplicates: usize,
    /// Items dropped because their link could not be normalized
    pub rejected: usize,
    /// Items whose insert failed
    pub store_failures: usize,
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} extracted, {} new, {} known, {} rejected, {} store failures",
            self.extracted, self.inserted, self.duplicates, self.rejected, self.store_failures
        )
    }
}

/// Run one cycle for `rule`.
///
/// A fetch or extraction failure ends the cycle with an error. Store
/// failures are logged per item and counted; they never abort the cycle.
pub async fn run_cycle(
    crawler: &NewsCrawler,
    storage: &dyn ItemStorage,
    rule: &SourceRule,
) -> Result<CycleOutcome> {
    let start_time = Utc::now();
    let extraction = crawler.harvest(rule).await?;

    let mut outcome = CycleOutcome {
        extracted: extraction.items.len(),
        rejected: extraction.rejected.len(),
        ..CycleOutcome::default()
    };

    for item in &extraction.items {
        match storage.insert(item).await {
            Ok(true) => outcome.inserted += 1,
            Ok(false) => {
                outcome.duplicates += 1;
                log::debug!("Already stored: {}", item.link);
            }
            Err(e) => {
                outcome.store_failures += 1;
                log::warn!(
                    "Insert failed for link='{}', title='{}': {}",
                    item.link,
                    item.title,
                    e
                );
            }
        }
    }

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Cycle for {} done in {}ms: {}",
        rule.url,
        elapsed.num_milliseconds(),
        outcome
    );
    Ok(outcome)
}
