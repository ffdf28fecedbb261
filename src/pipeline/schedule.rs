// src/pipeline/schedule.rs

//! Per-rule repeating harvest tasks.
//!
//! Every rule gets its own tokio task that fires immediately and then once
//! per interval until shutdown. Tasks know nothing of each other. Each cycle
//! runs as its own spawned task so that an error or a panic inside it ends
//! that cycle only; the timer keeps going.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::models::SourceRule;
use crate::pipeline::crawl::run_cycle;
use crate::services::NewsCrawler;
use crate::storage::ItemStorage;

/// Handle over the running per-rule tasks.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn one repeating task per rule.
    ///
    /// A rule with a zero interval has no period to repeat on and is skipped.
    pub fn start(
        rules: &[Arc<SourceRule>],
        crawler: Arc<NewsCrawler>,
        storage: Arc<dyn ItemStorage>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);

        let tasks = rules
            .iter()
            .filter(|rule| {
                if rule.interval_minutes == 0 {
                    log::error!("Not scheduling {}: interval is zero", rule.url);
                    return false;
                }
                true
            })
            .map(|rule| {
                tokio::spawn(run_task(
                    Arc::clone(rule),
                    Arc::clone(&crawler),
                    Arc::clone(&storage),
                    shutdown.subscribe(),
                ))
            })
            .collect::<Vec<_>>();

        log::info!("Started {} updaters", tasks.len());
        Self { shutdown, tasks }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tasks.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Signal every task to stop and wait for them.
    ///
    /// A cycle in flight is aborted.
    pub async fn shutdown(self) {
        // Receivers only vanish once their task has already ended.
        let _ = self.shutdown.send(true);

        for task in self.tasks {
            if let Err(e) = task.await {
                log::error!("Updater task ended abnormally: {}", e);
            }
        }
        log::info!("All updaters stopped");
    }
}

async fn run_task(
    rule: Arc<SourceRule>,
    crawler: Arc<NewsCrawler>,
    storage: Arc<dyn ItemStorage>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(rule.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        let mut cycle = tokio::spawn({
            let rule = Arc::clone(&rule);
            let crawler = Arc::clone(&crawler);
            let storage = Arc::clone(&storage);
            async move { run_cycle(&crawler, storage.as_ref(), &rule).await }
        });

        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                cycle.abort();
                break;
            }
            joined = &mut cycle => match joined {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => log::error!("Cycle for {} failed: {}", rule.url, e),
                Err(e) if e.is_panic() => log::error!("Cycle for {} panicked", rule.url),
                Err(e) => log::error!("Cycle for {} was cancelled: {}", rule.url, e),
            },
        }
    }

    log::debug!("Updater for {} stopped", rule.url);
}
