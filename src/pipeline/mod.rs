//! Pipeline entry points for harvesting.
//!
//! - `run_cycle`: one fetch, extract, store pass for a rule
//! - `Scheduler`: repeats `run_cycle` per rule on its interval

pub mod crawl;
pub mod schedule;

pub use crawl::{CycleOutcome, run_cycle};
pub use schedule::Scheduler;
