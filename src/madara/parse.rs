//! Default element and document mappers for Madara pages.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

use crate::http::Response;
use crate::model::{Chapter, Manga, Page};
use crate::source::utils::{
    absolutize_url, attr, compile_static_regex, data, image_from_element, own_text,
    relative_href, require_first, select_all, select_first, text, url_without_domain,
};
use crate::source::{Result, SourceError};

use super::Madara;
use super::config::{ChapterFallback, FieldQuery};

static MANGA_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"manga_id\s*=\s*(.*?)\s*;"));

/// Lowercases, deduplicates keeping first occurrences, then uppercases the
/// first character of each genre.
pub fn normalize_genres<I>(genres: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    genres
        .into_iter()
        .map(|genre| genre.as_ref().trim().to_lowercase())
        .filter(|genre| !genre.is_empty() && seen.insert(genre.clone()))
        .map(|genre| capitalize_first(&genre))
        .collect()
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Placeholder text some sites show while metadata is missing.
pub fn not_updating(value: &str) -> bool {
    !value.to_lowercase().contains("updating")
}

fn field_error(query: &FieldQuery) -> SourceError {
    match query {
        FieldQuery::Css(css) => SourceError::missing(css),
        FieldQuery::Labeled {
            row,
            label,
            contains,
            value,
        } => SourceError::missing(&format!("{row} [{label} ~ {contains}] {value}")),
    }
}

/// Manga from a listing element whose link matches `url_selector`.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the element has no link.
pub fn manga_from_link(
    element: ElementRef<'_>,
    page_url: &Url,
    url_selector: &str,
) -> Result<Manga> {
    let link = require_first(element, url_selector)?;
    let url = relative_href(link, page_url, url_selector)?;
    let title = Some(own_text(link))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| text(link));
    let mut manga = Manga::new(url, title);
    manga.thumbnail_url = select_first(element, "img")?.and_then(|img| image_from_element(img, page_url));
    Ok(manga)
}

/// Default listing mapper: the configured popular link selector.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the element has no link.
pub fn default_manga_from_element(
    madara: &Madara,
    element: ElementRef<'_>,
    page_url: &Url,
) -> Result<Manga> {
    manga_from_link(element, page_url, madara.config().popular_url_selector)
}

/// Default detail page mapper.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the title element is absent.
pub fn default_manga_details(madara: &Madara, document: &Html, page_url: &Url) -> Result<Manga> {
    let root = document.root_element();
    let config = madara.config();
    let fields = &config.details;

    let title_element = fields
        .title
        .first(root)?
        .ok_or_else(|| field_error(&fields.title))?;
    let title = Some(own_text(title_element))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| text(title_element));

    let mut manga = Manga::new("", title);
    manga.author = joined_names(&fields.author.select(root)?);
    manga.artist = joined_names(&fields.artist.select(root)?);
    manga.description = description(&fields.description.select(root)?)?;
    manga.thumbnail_url = fields
        .thumbnail
        .first(root)?
        .and_then(|img| image_from_element(img, page_url));
    if let Some(status) = fields.status.select(root)?.last() {
        manga.status = config.status_table.classify(&text(*status));
    }
    manga.genre = normalize_genres(fields.genre.select(root)?.into_iter().map(text));

    if let Some(alt) = fields.alt_name.first(root)? {
        append_alt_name(&mut manga, &own_text(alt), fields.alt_name_prefix);
    }
    Ok(manga)
}

fn joined_names(elements: &[ElementRef<'_>]) -> Option<String> {
    let names: Vec<String> = elements
        .iter()
        .map(|element| text(*element))
        .filter(|name| !name.is_empty() && not_updating(name))
        .collect();
    Some(names.join(", ")).filter(|joined| !joined.is_empty())
}

fn description(elements: &[ElementRef<'_>]) -> Result<Option<String>> {
    let mut paragraphs = Vec::new();
    for element in elements {
        paragraphs.extend(
            select_all(*element, "p")?
                .into_iter()
                .map(text)
                .filter(|paragraph| !paragraph.is_empty()),
        );
    }
    let joined = if paragraphs.is_empty() {
        elements
            .iter()
            .map(|element| text(*element))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        paragraphs.join("\n\n")
    };
    Ok(Some(joined.trim().to_string()).filter(|value| !value.is_empty()))
}

/// Adds alternative names to the end of the description.
pub fn append_alt_name(manga: &mut Manga, alt_name: &str, prefix: &str) {
    let alt_name = alt_name.trim();
    if alt_name.is_empty() || !not_updating(alt_name) {
        return;
    }
    manga.description = Some(match manga.description.take() {
        Some(description) if !description.trim().is_empty() => {
            format!("{description}\n\n{prefix}{alt_name}")
        }
        _ => format!("{prefix}{alt_name}"),
    });
}

/// Chapter from a default chapter list element.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the element has no link.
pub fn chapter_from_element(
    madara: &Madara,
    element: ElementRef<'_>,
    page_url: &Url,
) -> Result<Chapter> {
    let config = madara.config();
    let link = require_first(element, "a")?;
    let href = attr(link, "href")
        .and_then(|href| absolutize_url(&href, page_url))
        .ok_or_else(|| SourceError::parse("a", "chapter link has no href"))?;
    let mut href = match href.split_once("?style=paged") {
        Some((before, _)) => before.to_string(),
        None => href,
    };
    if !href.ends_with(config.chapter_url_suffix) {
        href.push_str(config.chapter_url_suffix);
    }

    let mut chapter = Chapter::new(url_without_domain(&href), text(link));
    let date_text = match select_first(element, "img:not(.thumb)")?.and_then(|img| attr(img, "alt")) {
        Some(alt) => Some(alt),
        None => match select_first(element, "span a")?.and_then(|a| attr(a, "title")) {
            Some(title) => Some(title),
            None => select_first(element, config.chapter_date_selector)?.map(text),
        },
    };
    chapter.date_upload = date_text.map_or(0, |date| config.date_format.parse(&date, Utc::now()));
    Ok(chapter)
}

/// Chapter from a `load_chapters` fallback element.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the element has no usable link.
pub fn fallback_chapter_from_element(
    madara: &Madara,
    fallback: &ChapterFallback,
    element: ElementRef<'_>,
    page_url: &Url,
) -> Result<Chapter> {
    let link = require_first(element, fallback.url_selector)?;
    let url = relative_href(link, page_url, fallback.url_selector)?;
    let name = select_all(element, fallback.name_selector)?
        .into_iter()
        .map(text)
        .collect::<Vec<_>>()
        .join(" ");
    let mut chapter = Chapter::new(url, name);
    chapter.date_upload = select_first(element, fallback.date_selector)?
        .map_or(0, |time| madara.config().date_format.parse(&text(time), Utc::now()));
    Ok(chapter)
}

/// Chapters from every default chapter element in `response`.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when an element has no link.
pub fn chapter_elements(madara: &Madara, response: &Response) -> Result<Vec<Chapter>> {
    let document = response.html();
    chapters_in(madara, &document, &response.url)
}

pub(super) fn chapters_in(madara: &Madara, document: &Html, page_url: &Url) -> Result<Vec<Chapter>> {
    select_all(document.root_element(), madara.config().chapter_list_selector)?
        .into_iter()
        .map(|element| chapter_from_element(madara, element, page_url))
        .collect()
}

/// Chapters from one `load_chapters` response.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when an element has no link.
pub fn fallback_chapters(
    madara: &Madara,
    fallback: &ChapterFallback,
    response: &Response,
) -> Result<Vec<Chapter>> {
    let document = response.html();
    select_all(document.root_element(), fallback.element_selector)?
        .into_iter()
        .map(|element| fallback_chapter_from_element(madara, fallback, element, &response.url))
        .collect()
}

/// Value of the `manga_id = <value>;` assignment in the fallback scripts.
///
/// # Errors
///
/// Returns [`SourceError::Extraction`] when no script carries the assignment.
pub fn inline_manga_id(document: &Html, fallback: &ChapterFallback) -> Result<String> {
    select_all(document.root_element(), fallback.script_selector)?
        .into_iter()
        .map(data)
        .filter(|script| script.contains("manga_id"))
        .find_map(|script| {
            MANGA_ID_RE
                .captures(&script)
                .map(|caps| caps[1].trim().trim_matches(['"', '\'']).to_string())
                .filter(|id| !id.is_empty())
        })
        .ok_or_else(|| {
            SourceError::extraction(
                "manga id",
                &format!("no manga_id assignment in '{}'", fallback.script_selector),
            )
        })
}

/// Pages of a chapter reader document, indexed from zero.
///
/// Every page keeps the reader URL as its deferred URL.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the page selector is invalid.
pub fn pages(madara: &Madara, response: &Response) -> Result<Vec<Page>> {
    let document = response.html();
    let mut seen = HashSet::new();
    let mut pages = Vec::new();
    for element in select_all(document.root_element(), madara.config().page_list_selector)? {
        let image = if element.value().name() == "img" {
            element
        } else {
            match select_first(element, "img")? {
                Some(img) => img,
                None => element,
            }
        };
        if !seen.insert(image.id()) {
            continue;
        }
        if let Some(image_url) = image_from_element(image, &response.url) {
            pages.push(Page {
                index: pages.len(),
                url: Some(response.url.to_string()),
                image_url: Some(image_url),
            });
        }
    }
    Ok(pages)
}
