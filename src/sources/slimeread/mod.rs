//! SlimeRead (`pt-BR`).
//!
//! The site is a client-rendered app; every operation goes to its JSON API on
//! a separate host. Manga are identified by `/book/{id}` and chapters by the
//! `/book_cap_units` query that returns their pages.

mod dto;
pub mod filters;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ORIGIN};
use url::Url;

use crate::http::{RateLimitPolicy, Request, Response, header_value, parse_url, query_value};
use crate::model::{Chapter, FilterList, Manga, MangasPage, Page};
use crate::source::{DeepLink, Result, Source, SourceError};

use dto::{BookDto, BookInfoDto, ChapterDto, LatestResponseDto, PageListDto};

pub const BASE_URL: &str = "https://slimeread.com";
pub const API_URL: &str = "https://ai3.slimeread.com:8443";

/// Deep-link marker: `id:<book id>` opens that book directly.
pub const ID_SEARCH_PREFIX: &str = "id:";

/// Display form of a chapter number: the API counts from zero, so one is
/// added; two decimals; zero-padded below ten; `.00` dropped.
///
/// ```
/// use manga_sources::sources::slimeread::chapter_number_label;
///
/// assert_eq!(chapter_number_label(5.0), "06");
/// assert_eq!(chapter_number_label(9.5), "10.50");
/// assert_eq!(chapter_number_label(99.0), "100");
/// ```
#[must_use]
pub fn chapter_number_label(number: f32) -> String {
    let cap = number + 1.0;
    let formatted = format!("{cap:.2}");
    let padded = if cap < 10.0 {
        format!("0{formatted}")
    } else {
        formatted
    };
    padded.replace(".00", "")
}

/// `cap` query value; whole numbers keep one decimal (`5.0`).
fn cap_param(number: f32) -> String {
    if number.fract().abs() < f32::EPSILON {
        format!("{number:.1}")
    } else {
        number.to_string()
    }
}

/// Adapter for the SlimeRead API.
#[derive(Debug, Clone)]
pub struct SlimeRead {
    base_url: String,
    api_url: String,
}

impl Default for SlimeRead {
    fn default() -> Self {
        Self::new()
    }
}

impl SlimeRead {
    #[must_use]
    pub fn new() -> Self {
        Self::with_urls(BASE_URL, API_URL)
    }

    /// Adapter talking to other hosts, e.g. a mock server.
    #[must_use]
    pub fn with_urls(base_url: &str, api_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, header_value(&self.base_url)?);
        Ok(headers)
    }

    fn api(&self, path: &str) -> Result<Url> {
        parse_url(&format!("{}{path}", self.api_url))
    }

    fn api_get(&self, path: &str) -> Result<Request> {
        Ok(Request::get(self.api(path)?, self.headers()?))
    }

    fn book_listing(response: &Response) -> Result<MangasPage> {
        let books: Vec<BookDto> = response.json()?;
        Ok(MangasPage::new(
            books.into_iter().map(BookDto::into_manga).collect(),
            false,
        ))
    }
}

#[async_trait]
impl Source for SlimeRead {
    fn id(&self) -> &str {
        "slimeread"
    }

    fn name(&self) -> &str {
        "SlimeRead"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn lang(&self) -> &str {
        "pt-BR"
    }

    fn rate_limits(&self) -> Vec<RateLimitPolicy> {
        vec![
            RateLimitPolicy::per_host(&self.base_url, 2, Duration::from_secs(1)),
            RateLimitPolicy::per_host(&self.api_url, 1, Duration::from_secs(1)),
        ]
    }

    fn filters(&self) -> FilterList {
        filters::search_filters()
    }

    /// The weekly ranking; a single page.
    fn popular_manga_request(&self, _page: u32) -> Result<Request> {
        self.api_get("/ranking/semana?nsfw=false")
    }

    fn popular_manga_parse(&self, response: &Response) -> Result<MangasPage> {
        Self::book_listing(response)
    }

    fn latest_updates_request(&self, page: u32) -> Result<Request> {
        self.api_get(&format!("/books?page={page}"))
    }

    fn latest_updates_parse(&self, response: &Response) -> Result<MangasPage> {
        let latest: LatestResponseDto = response.json()?;
        Ok(MangasPage::new(
            latest.data.into_iter().map(BookDto::into_manga).collect(),
            latest.page.has_next(),
        ))
    }

    fn search_manga_request(
        &self,
        _page: u32,
        query: &str,
        filters: &FilterList,
    ) -> Result<Request> {
        let mut url = self.api("/book_search")?;
        filters::apply_search(&mut url, query, filters);
        Ok(Request::get(url, self.headers()?))
    }

    fn search_manga_parse(&self, response: &Response) -> Result<MangasPage> {
        Self::book_listing(response)
    }

    fn manga_details_request(&self, manga: &Manga) -> Result<Request> {
        self.api_get(&manga.url)
    }

    fn manga_details_parse(&self, response: &Response) -> Result<Manga> {
        let info: BookInfoDto = response.json()?;
        Ok(info.into_manga())
    }

    fn chapter_list_request(&self, manga: &Manga) -> Result<Request> {
        let id = manga.url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        if id.is_empty() {
            return Err(SourceError::invalid_request(&format!(
                "no book id in '{}'",
                manga.url
            )));
        }
        let mut url = self.api("/book_cap_units_all")?;
        url.query_pairs_mut().append_pair("manga_id", id);
        Ok(Request::get(url, self.headers()?))
    }

    /// Chapters newest first; the API lists them oldest first.
    fn chapter_list_parse(&self, response: &Response) -> Result<Vec<Chapter>> {
        let manga_id = query_value(&response.request_url, "manga_id")
            .ok_or_else(|| SourceError::extraction("manga id", "request has no manga_id"))?;
        let items: Vec<ChapterDto> = response.json()?;
        Ok(items
            .into_iter()
            .rev()
            .map(|item| {
                let mut chapter = Chapter::new(
                    format!(
                        "/book_cap_units?manga_id={manga_id}&cap={}",
                        cap_param(item.btc_cap)
                    ),
                    format!("Cap {}", chapter_number_label(item.btc_cap)),
                );
                chapter.chapter_number = Some(item.btc_cap);
                chapter.scanlator = item.scan.and_then(|scan| scan.scan_name);
                chapter
            })
            .collect())
    }

    fn page_list_request(&self, chapter: &Chapter) -> Result<Request> {
        self.api_get(&chapter.url)
    }

    fn page_list_parse(&self, response: &Response) -> Result<Vec<Page>> {
        let units: Vec<PageListDto> = response.json()?;
        Ok(units
            .iter()
            .flat_map(|unit| &unit.pages)
            .enumerate()
            .map(|(index, page)| Page::with_image(index, page.url()))
            .collect())
    }

    fn deep_link(&self, query: &str) -> Option<Result<DeepLink>> {
        let id = query.strip_prefix(ID_SEARCH_PREFIX)?.trim();
        if id.is_empty() || !id.bytes().all(|byte| byte.is_ascii_digit()) {
            return Some(Err(SourceError::invalid_request(&format!(
                "book id must be numeric, got '{id}'"
            ))));
        }
        let identifier = dto::book_path(id);
        Some(self.api_get(&identifier).map(|request| DeepLink {
            request,
            identifier,
        }))
    }

    fn manga_web_url(&self, manga: &Manga) -> String {
        format!("{}{}", self.base_url, manga.url.replace("/book/", "/manga/"))
    }

    fn chapter_web_url(&self, chapter: &Chapter) -> String {
        let fallback = || format!("{}{}", self.base_url, chapter.url);
        let Ok(url) = parse_url(&fallback()) else {
            return fallback();
        };
        let id = query_value(&url, "manga_id");
        let cap = query_value(&url, "cap").and_then(|cap| cap.parse::<f32>().ok());
        match (id, cap) {
            (Some(id), Some(cap)) => {
                format!("{}/ler/{id}/cap-{}", self.base_url, chapter_number_label(cap))
            }
            _ => fallback(),
        }
    }
}
