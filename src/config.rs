// src/config.rs

//! Rule catalog loading.
//!
//! Rules are read once at startup from a JSON array. One malformed entry
//! invalidates the whole catalog: there is nothing useful to schedule from a
//! partially understood file.

use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::SourceRule;
use crate::services::RuleSelectors;

/// Load and validate the rule catalog from a JSON file.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<SourceRule>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::config(format!("cannot read rules from {}: {e}", path.display()))
    })?;

    let rules = parse_rules(&content)
        .map_err(|e| AppError::config(format!("{}: {e}", path.display())))?;

    log::info!("Loaded {} rules from {}", rules.len(), path.display());
    for rule in &rules {
        log::info!(
            "  every {} min: {} (items='{}')",
            rule.interval_minutes,
            rule.url,
            rule.item_selector
        );
    }
    Ok(rules)
}

/// Parse and validate a rule catalog held in memory.
pub fn parse_rules(content: &str) -> Result<Vec<SourceRule>> {
    let rules: Vec<SourceRule> = serde_json::from_str(content)
        .map_err(|e| AppError::config(format!("malformed rules: {e}")))?;

    if rules.is_empty() {
        return Err(AppError::config("no rules defined"));
    }

    for (index, rule) in rules.iter().enumerate() {
        rule.validate()
            .and_then(|()| RuleSelectors::compile(rule).map(drop))
            .map_err(|e| AppError::config(format!("rule #{} ({}): {e}", index + 1, rule.url)))?;
    }

    Ok(rules)
}
