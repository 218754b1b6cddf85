//! Page-number cursors and next-page rules for listing endpoints.

use scraper::Html;
use serde::Deserialize;
use url::Url;

use crate::http::parse_url;
use crate::source::Result;
use crate::source::utils::select_first;

/// How a 1-based page number is encoded into a listing URL.
///
/// Page 1 always maps to the bare listing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    /// Appends a `page/N/` path segment.
    PathSegment,
    /// Adds a `key=N` query parameter.
    Query(&'static str),
}

impl PageCursor {
    /// Path segment for `page`; empty for page 1 and for query cursors.
    #[must_use]
    pub fn segment(self, page: u32) -> String {
        match self {
            Self::PathSegment if page > 1 => format!("page/{page}/"),
            _ => String::new(),
        }
    }

    /// Builds `{base}/{path}` with the cursor for `page` applied.
    ///
    /// `base` has no trailing slash and `path` no leading one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SourceError::InvalidRequest`] when the result is not a
    /// valid URL.
    pub fn listing_url(self, base: &str, path: &str, page: u32) -> Result<Url> {
        let mut url = parse_url(&format!("{base}/{path}{}", self.segment(page)))?;
        if let Self::Query(key) = self
            && page > 1
        {
            url.query_pairs_mut().append_pair(key, &page.to_string());
        }
        Ok(url)
    }
}

/// How a listing response tells whether another page exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// Next page exists when the selector matches.
    Selector(&'static str),
    /// Next page exists unless the selector matches.
    UnlessPresent(&'static str),
    /// Next page exists while the current page yielded items.
    NonEmpty,
}

impl NextPage {
    /// Evaluates the rule against a parsed listing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SourceError::Parse`] when the selector is invalid.
    pub fn has_next(self, document: &Html, item_count: usize) -> Result<bool> {
        let root = document.root_element();
        match self {
            Self::Selector(css) => Ok(select_first(root, css)?.is_some()),
            Self::UnlessPresent(css) => Ok(select_first(root, css)?.is_none()),
            Self::NonEmpty => Ok(item_count > 0),
        }
    }
}

/// Page metadata embedded in JSON listing responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ApiPage {
    pub page: u32,
    pub pages: u32,
}

impl ApiPage {
    #[must_use]
    pub fn has_next(self) -> bool {
        self.page < self.pages
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const BASE: &str = "https://example.com";

    #[test]
    fn test_path_segment_page_one_is_bare() {
        let url = PageCursor::PathSegment
            .listing_url(BASE, "manga/", 1)
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/manga/");
        assert!(!url.path().contains("page"));
    }

    #[test]
    fn test_path_segment_later_pages() {
        let url = PageCursor::PathSegment
            .listing_url(BASE, "manga/", 3)
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/manga/page/3/");
    }

    #[test]
    fn test_query_cursor() {
        let cursor = PageCursor::Query("page");
        assert_eq!(
            cursor.listing_url(BASE, "books", 1).unwrap().as_str(),
            "https://example.com/books"
        );
        assert_eq!(
            cursor.listing_url(BASE, "books", 2).unwrap().as_str(),
            "https://example.com/books?page=2"
        );
    }

    #[test]
    fn test_cursors_produce_distinct_urls() {
        for cursor in [PageCursor::PathSegment, PageCursor::Query("p")] {
            let urls: HashSet<String> = (1..=50)
                .map(|page| cursor.listing_url(BASE, "manga/", page).unwrap().to_string())
                .collect();
            assert_eq!(urls.len(), 50, "{cursor:?} repeated a URL");
        }
    }

    #[test]
    fn test_next_page_rules() {
        let with_next = Html::parse_document(r##"<nav><a class="next" href="#">»</a></nav>"##);
        let last = Html::parse_document(r#"<div class="no-posts">Nothing</div>"#);

        assert!(NextPage::Selector("a.next").has_next(&with_next, 10).unwrap());
        assert!(!NextPage::Selector("a.next").has_next(&last, 10).unwrap());
        assert!(NextPage::UnlessPresent(".no-posts").has_next(&with_next, 0).unwrap());
        assert!(!NextPage::UnlessPresent(".no-posts").has_next(&last, 5).unwrap());
        assert!(NextPage::NonEmpty.has_next(&last, 1).unwrap());
        assert!(!NextPage::NonEmpty.has_next(&last, 0).unwrap());
    }

    #[test]
    fn test_api_page_has_next() {
        assert!(ApiPage { page: 1, pages: 3 }.has_next());
        assert!(!ApiPage { page: 3, pages: 3 }.has_next());
        assert!(!ApiPage::default().has_next());
    }
}
