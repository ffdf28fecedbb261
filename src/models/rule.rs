// src/models/rule.rs

//! Source rules: which page to watch and how to pull items out of it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Language the rule expressions are written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExprSyntax {
    /// XPath 1.0, evaluated over the parsed HTML tree
    #[default]
    XPath,
    /// CSS selectors
    Css,
}

/// How a field value is read from a matched node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractMode {
    /// Read the named attribute (e.g. `href`)
    Attribute(String),
    /// Read the concatenated text content
    Text,
}

/// A selector plus the way to read the first node it matches.
///
/// Serialized as `{ "expr": "...", "attr": "..." }`; a missing or empty
/// `attr` means [`ExtractMode::Text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawExtractionRule", into = "RawExtractionRule")]
pub struct ExtractionRule {
    /// Expression evaluated relative to an item node
    pub selector: String,
    pub mode: ExtractMode,
}

impl ExtractionRule {
    /// Rule reading an attribute of the first match.
    pub fn attribute(selector: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            mode: ExtractMode::Attribute(attr.into()),
        }
    }

    /// Rule reading the text content of the first match.
    pub fn text(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            mode: ExtractMode::Text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawExtractionRule {
    expr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attr: Option<String>,
}

impl From<RawExtractionRule> for ExtractionRule {
    fn from(raw: RawExtractionRule) -> Self {
        let mode = match raw.attr {
            Some(attr) if !attr.trim().is_empty() => ExtractMode::Attribute(attr),
            _ => ExtractMode::Text,
        };
        Self {
            selector: raw.expr,
            mode,
        }
    }
}

impl From<ExtractionRule> for RawExtractionRule {
    fn from(rule: ExtractionRule) -> Self {
        let attr = match rule.mode {
            ExtractMode::Attribute(attr) => Some(attr),
            ExtractMode::Text => None,
        };
        Self {
            expr: rule.selector,
            attr,
        }
    }
}

/// One monitored page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRule {
    /// Minutes between two cycles
    pub interval_minutes: u32,

    /// Absolute URL of the page to harvest
    pub url: String,

    /// Expression selecting the item nodes
    #[serde(rename = "newsNodesExpr")]
    pub item_selector: String,

    /// Language of every expression in this rule
    #[serde(default)]
    pub syntax: ExprSyntax,

    /// Field rule producing the item link
    pub link_rule: ExtractionRule,

    /// Field rule producing the item title
    pub title_rule: ExtractionRule,
}

impl SourceRule {
    /// Time between two firings.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_minutes) * 60)
    }

    /// Parsed source URL, used as the base for relative links.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.url).map_err(|e| AppError::config(format!("invalid url '{}': {e}", self.url)))
    }

    /// Check the shape constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.interval_minutes == 0 {
            return Err(AppError::config("intervalMinutes must be > 0"));
        }
        let base = self.base_url()?;
        if base.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "url '{}' cannot serve as a base for relative links",
                self.url
            )));
        }
        if self.item_selector.trim().is_empty() {
            return Err(AppError::config("newsNodesExpr is empty"));
        }
        if self.link_rule.selector.trim().is_empty() {
            return Err(AppError::config("linkRule.expr is empty"));
        }
        if self.title_rule.selector.trim().is_empty() {
            return Err(AppError::config("titleRule.expr is empty"));
        }
        Ok(())
    }
}
