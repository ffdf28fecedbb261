//! Utility functions and helpers.

pub mod http;

use url::{ParseError, Url};

use crate::error::{AppError, Result};

/// Turn an extracted link into an absolute URL.
///
/// A link that already carries a scheme is returned verbatim. Anything else
/// is resolved against `base` following RFC 3986, so an empty link resolves
/// to the base document itself.
pub fn normalize_link(base: &Url, raw: &str) -> Result<String> {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(_) => Ok(raw.to_string()),
        Err(ParseError::RelativeUrlWithoutBase) => base
            .join(raw)
            .map(|u| u.to_string())
            .map_err(|e| AppError::normalization(raw, base.as_str(), e)),
        Err(e) => Err(AppError::normalization(raw, base.as_str(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.com/news/index.html").unwrap()
    }

    #[test]
    fn test_normalize_relative_path() {
        assert_eq!(
            normalize_link(&base(), "article/1").unwrap(),
            "http://example.com/news/article/1"
        );
    }

    #[test]
    fn test_normalize_keeps_absolute_verbatim() {
        assert_eq!(
            normalize_link(&base(), "http://other.com/x").unwrap(),
            "http://other.com/x"
        );
        // verbatim, not re-serialized through the parser
        assert_eq!(
            normalize_link(&base(), "HTTP://Other.com/x").unwrap(),
            "HTTP://Other.com/x"
        );
    }

    #[test]
    fn test_normalize_root_relative_and_dot_segments() {
        assert_eq!(
            normalize_link(&base(), "/root.html").unwrap(),
            "http://example.com/root.html"
        );
        assert_eq!(
            normalize_link(&base(), "../world/2").unwrap(),
            "http://example.com/world/2"
        );
        assert_eq!(
            normalize_link(&base(), "?page=2").unwrap(),
            "http://example.com/news/index.html?page=2"
        );
    }

    #[test]
    fn test_normalize_scheme_relative() {
        assert_eq!(
            normalize_link(&base(), "//cdn.example.net/a").unwrap(),
            "http://cdn.example.net/a"
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            normalize_link(&base(), "  article/1\n").unwrap(),
            "http://example.com/news/article/1"
        );
    }

    #[test]
    fn test_normalize_empty_is_base_document() {
        assert_eq!(
            normalize_link(&base(), "   ").unwrap(),
            "http://example.com/news/index.html"
        );
        let with_fragment = Url::parse("http://example.com/news/index.html#top").unwrap();
        assert_eq!(
            normalize_link(&with_fragment, "").unwrap(),
            "http://example.com/news/index.html"
        );
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert!(matches!(
            normalize_link(&base(), "http://[::1"),
            Err(AppError::Normalization { .. })
        ));
        assert!(matches!(
            normalize_link(&base(), "//exa mple.com/a"),
            Err(AppError::Normalization { .. })
        ));
    }
}
