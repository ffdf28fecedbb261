// src/services/extract.rs

//! Rule-driven item extraction.
//!
//! Given a [`SourceRule`] and the body of its page, selects the item nodes
//! and reads a link and a title out of each one. Rules are XPath by default
//! and CSS when they say so. Items are processed independently: a link that
//! cannot be made absolute drops only that item.

use scraper::{ElementRef, Html, Selector};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    CleaningConfig, ExprSyntax, ExtractMode, ExtractionRule, NewsItem, SourceRule,
};
use crate::utils::normalize_link;

/// Outcome of extracting one page.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Items whose link normalized, in document order
    pub items: Vec<NewsItem>,

    /// Per-item failures (normalization errors)
    pub rejected: Vec<AppError>,
}

/// Compiled expressions of a [`SourceRule`].
pub enum RuleSelectors {
    XPath {
        items: XPath,
        link: XPath,
        title: XPath,
    },
    Css {
        items: Selector,
        link: Selector,
        title: Selector,
    },
}

impl RuleSelectors {
    /// Compile every expression of the rule in the rule's syntax.
    pub fn compile(rule: &SourceRule) -> Result<Self> {
        match rule.syntax {
            ExprSyntax::XPath => Ok(Self::XPath {
                items: parse_xpath(&rule.item_selector)?,
                link: parse_xpath(&rule.link_rule.selector)?,
                title: parse_xpath(&rule.title_rule.selector)?,
            }),
            ExprSyntax::Css => Ok(Self::Css {
                items: parse_selector(&rule.item_selector)?,
                link: parse_selector(&rule.link_rule.selector)?,
                title: parse_selector(&rule.title_rule.selector)?,
            }),
        }
    }

    /// Raw link and title of every item node, in document order.
    fn read_items(&self, rule: &SourceRule, html: &str) -> Result<Vec<RawItem>> {
        match self {
            Self::XPath { items, link, title } => read_xpath_items(rule, html, items, link, title),
            Self::Css { items, link, title } => Ok(read_css_items(rule, html, items, link, title)),
        }
    }
}

/// Parse an XPath 1.0 expression.
pub fn parse_xpath(s: &str) -> Result<XPath> {
    Factory::new()
        .build(s)
        .map_err(|e| AppError::selector(s, format!("{e:?}")))?
        .ok_or_else(|| AppError::selector(s, "empty expression"))
}

/// Parse a CSS selector.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

struct RawItem {
    link: String,
    title: String,
}

/// Extract items from the page body of `rule`.
///
/// Fails only when the rule itself is unusable (bad expression or base URL).
pub fn extract(rule: &SourceRule, html: &str, cleaning: &CleaningConfig) -> Result<Extraction> {
    let selectors = RuleSelectors::compile(rule)?;
    let base = rule.base_url()?;
    let raw_items = selectors.read_items(rule, html)?;

    if raw_items.is_empty() {
        log::warn!(
            "Item expression '{}' matched nothing on {}",
            rule.item_selector,
            rule.url
        );
    }

    let mut extraction = Extraction::default();
    for raw in raw_items {
        match build_item(rule, &base, cleaning, raw) {
            Ok(item) => extraction.items.push(item),
            Err(e) => {
                log::warn!("Dropping item from {}: {}", rule.url, e);
                extraction.rejected.push(e);
            }
        }
    }

    Ok(extraction)
}

fn build_item(
    rule: &SourceRule,
    base: &Url,
    cleaning: &CleaningConfig,
    raw: RawItem,
) -> Result<NewsItem> {
    let title = cleaning.clean_title(&raw.title);

    if raw.link.trim().is_empty() {
        warn_empty_field("link", &rule.link_rule, &rule.url);
    }
    if title.is_empty() {
        warn_empty_field("title", &rule.title_rule, &rule.url);
    }

    let link = normalize_link(base, &raw.link)?;
    Ok(NewsItem { link, title })
}

fn read_xpath_items(
    rule: &SourceRule,
    html: &str,
    items: &XPath,
    link: &XPath,
    title: &XPath,
) -> Result<Vec<RawItem>> {
    let package = sxd_html::parse_html(html);
    let document = package.as_document();
    let context = Context::new();

    let nodes = match items.evaluate(&context, document.root()) {
        Ok(Value::Nodeset(nodes)) => nodes.document_order(),
        Ok(_) => {
            return Err(AppError::selector(
                &rule.item_selector,
                "does not select nodes",
            ));
        }
        Err(e) => return Err(AppError::selector(&rule.item_selector, format!("{e:?}"))),
    };

    Ok(nodes
        .into_iter()
        .map(|node| RawItem {
            link: read_xpath_field(&context, node.clone(), link, &rule.link_rule),
            title: read_xpath_field(&context, node, title, &rule.title_rule),
        })
        .collect())
}

/// Evaluate a field expression with `node` as context.
///
/// A node-set yields its first node in document order; a string result is
/// used as is. Anything else resolves to an empty string.
fn read_xpath_field<'d>(
    context: &Context<'d>,
    node: Node<'d>,
    xpath: &XPath,
    rule: &ExtractionRule,
) -> String {
    let found = match xpath.evaluate(context, node) {
        Ok(Value::Nodeset(nodes)) => nodes.document_order().into_iter().next(),
        Ok(Value::String(s)) => return s,
        Ok(_) => None,
        Err(e) => {
            log::debug!("Expression '{}' failed: {:?}", rule.selector, e);
            None
        }
    };

    match (found, &rule.mode) {
        (Some(Node::Element(element)), ExtractMode::Attribute(name)) => element
            .attribute_value(name.as_str())
            .unwrap_or_default()
            .to_string(),
        (Some(_), ExtractMode::Attribute(_)) | (None, _) => String::new(),
        (Some(found), ExtractMode::Text) => found.string_value(),
    }
}

fn read_css_items(
    rule: &SourceRule,
    html: &str,
    items: &Selector,
    link: &Selector,
    title: &Selector,
) -> Vec<RawItem> {
    let document = Html::parse_document(html);
    document
        .select(items)
        .map(|node| RawItem {
            link: read_css_field(&node, link, &rule.link_rule),
            title: read_css_field(&node, title, &rule.title_rule),
        })
        .collect()
}

/// Read one field from the first descendant matching `selector`.
///
/// Resolves to an empty string when nothing matches or the attribute is
/// missing.
fn read_css_field(node: &ElementRef, selector: &Selector, rule: &ExtractionRule) -> String {
    let Some(found) = node.select(selector).next() else {
        return String::new();
    };

    match &rule.mode {
        ExtractMode::Attribute(name) => found.value().attr(name).unwrap_or_default().to_string(),
        ExtractMode::Text => found.text().collect(),
    }
}

fn warn_empty_field(field: &str, rule: &ExtractionRule, url: &str) {
    let attr = match &rule.mode {
        ExtractMode::Attribute(name) => format!(" attr={name}"),
        ExtractMode::Text => String::new(),
    };
    log::warn!(
        "The {} rule (expr='{}'{}) might not be working on {}: empty result",
        field,
        rule.selector,
        attr,
        url
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="item"><a href="article/1">First story</a></div>
          <aside><a href="/ads">Sponsored</a></aside>
          <div class="item"><a href="http://other.com/x">Second
              story</a></div>
        </body></html>
    "#;

    fn rule() -> SourceRule {
        SourceRule {
            interval_minutes: 10,
            url: "http://example.com/news/index.html".to_string(),
            item_selector: "//div[@class='item']".to_string(),
            syntax: ExprSyntax::XPath,
            link_rule: ExtractionRule::attribute(".//a", "href"),
            title_rule: ExtractionRule::text(".//a"),
        }
    }

    fn css_rule() -> SourceRule {
        SourceRule {
            item_selector: "div.item".to_string(),
            syntax: ExprSyntax::Css,
            link_rule: ExtractionRule::attribute("a", "href"),
            title_rule: ExtractionRule::text("a"),
            ..rule()
        }
    }

    fn expected() -> Vec<NewsItem> {
        vec![
            NewsItem::new("http://example.com/news/article/1", "First story"),
            NewsItem::new("http://other.com/x", "Second story"),
        ]
    }

    #[test]
    fn test_extract_two_items_in_document_order() {
        let extraction = extract(&rule(), PAGE, &CleaningConfig::default()).unwrap();

        assert!(extraction.rejected.is_empty());
        assert_eq!(extraction.items, expected());
    }

    #[test]
    fn test_css_rule_extracts_same_items() {
        let extraction = extract(&css_rule(), PAGE, &CleaningConfig::default()).unwrap();

        assert!(extraction.rejected.is_empty());
        assert_eq!(extraction.items, expected());
    }

    #[test]
    fn test_text_mode_concatenates_nested_text() {
        let html = r#"<ul><li><a href="/a"><b>Big</b> news <i>today</i></a></li></ul>"#;
        let mut rule = rule();
        rule.item_selector = "//li".to_string();

        let extraction = extract(&rule, html, &CleaningConfig::default()).unwrap();
        assert_eq!(extraction.items[0].title, "Big news today");

        let mut rule = css_rule();
        rule.item_selector = "li".to_string();

        let extraction = extract(&rule, html, &CleaningConfig::default()).unwrap();
        assert_eq!(extraction.items[0].title, "Big news today");
    }

    #[test]
    fn test_attribute_mode_for_title() {
        let html = r#"<div class="item"><a href="/a" title="From attribute">text</a></div>"#;
        let mut rule = rule();
        rule.title_rule = ExtractionRule::attribute(".//a", "title");

        let extraction = extract(&rule, html, &CleaningConfig::default()).unwrap();
        assert_eq!(extraction.items[0].title, "From attribute");
    }

    #[test]
    fn test_xpath_attribute_node_in_text_mode() {
        let html = r#"<div class="item"><a href="/a">Linked</a></div>"#;
        let mut rule = rule();
        rule.link_rule = ExtractionRule::text(".//a/@href");

        let extraction = extract(&rule, html, &CleaningConfig::default()).unwrap();
        assert_eq!(extraction.items, vec![NewsItem::new("http://example.com/a", "Linked")]);
    }

    #[test]
    fn test_field_expression_is_relative_to_item() {
        let html = r#"
            <div class="item"><h2>Heading one</h2><a href="/one">One</a></div>
            <div class="item"><h2>Heading two</h2><a href="/two">Two</a></div>
        "#;
        let mut rule = rule();
        rule.title_rule = ExtractionRule::text(".//h2");

        let extraction = extract(&rule, html, &CleaningConfig::default()).unwrap();
        assert_eq!(
            extraction.items,
            vec![
                NewsItem::new("http://example.com/one", "Heading one"),
                NewsItem::new("http://example.com/two", "Heading two"),
            ]
        );
    }

    #[test]
    fn test_first_matching_descendant_wins() {
        let html = r#"<div class="item"><a href="/one">One</a><a href="/two">Two</a></div>"#;
        let extraction = extract(&rule(), html, &CleaningConfig::default()).unwrap();

        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].link, "http://example.com/one");
        assert_eq!(extraction.items[0].title, "One");

        let extraction = extract(&css_rule(), html, &CleaningConfig::default()).unwrap();
        assert_eq!(extraction.items[0].link, "http://example.com/one");
    }

    #[test]
    fn test_missing_title_yields_empty_title() {
        let html = r#"<div class="item"><a href="/a">Linked</a></div>"#;
        let mut rule = rule();
        rule.title_rule = ExtractionRule::text(".//h2");

        let extraction = extract(&rule, html, &CleaningConfig::default()).unwrap();
        assert_eq!(extraction.items, vec![NewsItem::new("http://example.com/a", "")]);
    }

    #[test]
    fn test_missing_link_resolves_to_page() {
        let html = r#"
            <div class="item"><span>Only a title</span></div>
            <div class="item"><a href="a/1">A</a></div>
        "#;
        let mut rule = rule();
        rule.title_rule = ExtractionRule::text(".");

        let extraction = extract(&rule, html, &CleaningConfig::default()).unwrap();
        assert!(extraction.rejected.is_empty());
        assert_eq!(
            extraction.items,
            vec![
                NewsItem::new("http://example.com/news/index.html", "Only a title"),
                NewsItem::new("http://example.com/news/a/1", "A"),
            ]
        );
    }

    #[test]
    fn test_bad_link_drops_only_that_item() {
        let html = r#"
            <div class="item"><a href="http://[::1">Broken</a></div>
            <div class="item"><a>No href</a></div>
            <div class="item"><a href="ok/2">Fine</a></div>
        "#;
        let extraction = extract(&rule(), html, &CleaningConfig::default()).unwrap();

        assert_eq!(
            extraction.items,
            vec![
                NewsItem::new("http://example.com/news/index.html", "No href"),
                NewsItem::new("http://example.com/news/ok/2", "Fine"),
            ]
        );
        assert_eq!(extraction.rejected.len(), 1);
        assert!(matches!(
            extraction.rejected[0],
            AppError::Normalization { .. }
        ));
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let mut rule = rule();
        rule.item_selector = "//article[@class='story']".to_string();

        let extraction = extract(&rule, PAGE, &CleaningConfig::default()).unwrap();
        assert!(extraction.items.is_empty());
        assert!(extraction.rejected.is_empty());
    }

    #[test]
    fn test_non_nodeset_item_expression_fails() {
        let mut rule = rule();
        rule.item_selector = "count(//div)".to_string();

        assert!(matches!(
            extract(&rule, PAGE, &CleaningConfig::default()),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn test_invalid_expression_fails_whole_extraction() {
        let mut rule = rule();
        rule.item_selector = "//div[".to_string();
        assert!(matches!(
            extract(&rule, PAGE, &CleaningConfig::default()),
            Err(AppError::Selector { .. })
        ));

        let mut rule = css_rule();
        rule.item_selector = "[[invalid".to_string();
        assert!(matches!(
            extract(&rule, PAGE, &CleaningConfig::default()),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn test_css_selector_is_not_valid_xpath() {
        let mut rule = rule();
        rule.item_selector = "#main > a".to_string();
        assert!(RuleSelectors::compile(&rule).is_err());

        let mut rule = css_rule();
        rule.item_selector = "#main > a".to_string();
        assert!(RuleSelectors::compile(&rule).is_ok());
    }

    #[test]
    fn test_parse_xpath() {
        assert!(parse_xpath("//div[@class='item']").is_ok());
        assert!(parse_xpath(".//a").is_ok());
        assert!(parse_xpath("//tr[td/a]").is_ok());
        assert!(parse_xpath("//div[").is_err());
    }

    #[test]
    fn test_parse_selector() {
        assert!(parse_selector("div.item > a").is_ok());
        assert!(parse_selector("tr:has(a)").is_ok());
        assert!(parse_selector("[[invalid").is_err());
    }
}
