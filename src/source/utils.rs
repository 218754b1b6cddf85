//! Shared helpers for source modules: selector queries, text extraction,
//! URL normalization and host matching.

use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use url::Url;

use super::{Result, SourceError};

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Parses a CSS selector.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] naming the selector when it is not valid CSS.
pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|error| SourceError::parse(css, &format!("invalid selector: {error:?}")))
}

/// First descendant of `root` matching `css`.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when `css` is not a valid selector.
pub fn select_first<'a>(root: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    let selector = parse_selector(css)?;
    Ok(root.select(&selector).next())
}

/// Every descendant of `root` matching `css`, in document order.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when `css` is not a valid selector.
pub fn select_all<'a>(root: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let selector = parse_selector(css)?;
    Ok(root.select(&selector).collect())
}

/// Like [`select_first`] but a missing element is a parse error.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] naming `css` when nothing matches.
pub fn require_first<'a>(root: ElementRef<'a>, css: &str) -> Result<ElementRef<'a>> {
    select_first(root, css)?.ok_or_else(|| SourceError::missing(css))
}

/// All text below `element`, whitespace collapsed.
#[must_use]
pub fn text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of the direct text children of `element`, whitespace collapsed.
#[must_use]
pub fn own_text(element: ElementRef<'_>) -> String {
    let raw: String = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect();
    collapse_whitespace(&raw)
}

/// Raw text of every descendant text node, preserving inline script bodies.
#[must_use]
pub fn data(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Trimmed attribute value, `None` when absent or blank.
#[must_use]
pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Joins text with single spaces and trims it.
#[must_use]
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves a possibly relative URL string against a base URL.
///
/// Returns the value as-is if it already starts with `http://` or `https://`;
/// normalizes `//...` to `https:...`; otherwise joins with `base_url`.
#[must_use]
pub fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("https:{value}"));
    }
    base_url.join(value).ok().map(|url| url.to_string())
}

/// Path, query and fragment of an absolute URL; relative input is returned as-is.
///
/// This is the form sources store as manga and chapter identifiers.
#[must_use]
pub fn url_without_domain(value: &str) -> String {
    let Ok(url) = Url::parse(value.trim()) else {
        return value.trim().to_string();
    };
    let mut out = url.path().to_string();
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Absolute `href` of a link element, reduced to its site-relative form.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] naming `field` when the element has no
/// usable `href`.
pub fn relative_href(element: ElementRef<'_>, base_url: &Url, field: &str) -> Result<String> {
    attr(element, "href")
        .and_then(|href| absolutize_url(&href, base_url))
        .map(|absolute| url_without_domain(&absolute))
        .ok_or_else(|| SourceError::parse(field, "element has no href"))
}

/// Image URL from the lazy-loading attributes WordPress themes use, falling
/// back to `src`.
#[must_use]
pub fn image_from_element(element: ElementRef<'_>, base_url: &Url) -> Option<String> {
    let raw = attr(element, "data-src")
        .or_else(|| attr(element, "data-lazy-src"))
        .or_else(|| attr(element, "srcset").and_then(|set| largest_srcset_candidate(&set)))
        .or_else(|| attr(element, "data-cfsrc"))
        .or_else(|| attr(element, "src"))?;
    absolutize_url(&raw, base_url)
}

/// Picks the widest candidate of a `srcset` list; the last one when no widths
/// are given.
fn largest_srcset_candidate(srcset: &str) -> Option<String> {
    let candidates: Vec<(&str, u32)> = srcset
        .split(',')
        .filter_map(|candidate| {
            let mut parts = candidate.split_whitespace();
            let url = parts.next()?;
            let width = parts
                .next()
                .and_then(|w| w.trim_end_matches(['w', 'x']).parse::<u32>().ok())
                .unwrap_or(0);
            Some((url, width))
        })
        .collect();
    candidates
        .iter()
        .max_by_key(|(_, width)| *width)
        .filter(|(_, width)| *width > 0)
        .or(candidates.last())
        .map(|(url, _)| (*url).to_string())
}

/// Normalizes a host string: trim, strip leading "www.", trailing '.', and lowercases.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    host.trim()
        .trim_start_matches("www.")
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

/// Returns true if the two host strings refer to the same host after normalization.
#[must_use]
pub fn hosts_match(lhs: &str, rhs: &str) -> bool {
    canonical_host(lhs) == canonical_host(rhs)
}
