//! The site adapter contract.
//!
//! A [`Source`] maps one website's request and response shapes onto the
//! content model. Every operation is split into a pure request builder and a
//! pure response parser; the `fetch_*` methods drive each pair through a
//! [`Fetch`] implementation.
//!
//! # Architecture
//!
//! - [`Source`] - Async trait every site adapter implements
//! - [`SourceRegistry`] - Lookup of sources by id or by URL host
//! - [`SourceError`] - Error taxonomy shared by every adapter
//! - [`DeepLink`] - Direct lookup derived from a marked search query
//! - [`utils`] - Selector, text and URL helpers used by HTML adapters
//!
//! # Example
//!
//! ```no_run
//! use manga_sources::{ClientSettings, HttpClient, build_default_source_registry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = build_default_source_registry();
//! let source = registry.get("mhscans")?;
//!
//! let client = HttpClient::new(&ClientSettings::default())?;
//! client.declare(&source.rate_limits());
//!
//! let page = source.fetch_popular_manga(&client, 1).await?;
//! for manga in &page.mangas {
//!     println!("{} -> {}", manga.title, manga.url);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod registry;
pub mod utils;

pub use error::{Result, SourceError};
pub use registry::SourceRegistry;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::debug;

use crate::http::{Fetch, RateLimitPolicy, Request, Response, parse_url};
use crate::model::{Chapter, FilterList, Manga, MangasPage, Page};

/// A direct lookup derived from a search query carrying a source's marker.
///
/// `request` fetches the manga details; `identifier` becomes the returned
/// manga's `url`.
#[derive(Debug, Clone)]
pub struct DeepLink {
    pub request: Request,
    pub identifier: String,
}

/// Trait that all site adapters implement.
///
/// Builders are pure given their inputs and the adapter's static
/// configuration. Parsers fail with [`SourceError::Parse`] naming the
/// selector or field when the expected anchor is absent, rather than
/// returning partial results.
///
/// # Object Safety
///
/// This trait uses `async_trait` so the registry can hold `Box<dyn Source>`.
#[async_trait]
pub trait Source: Send + Sync {
    /// Stable identifier, e.g. `"mhscans"`.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Site root without a trailing slash.
    fn base_url(&self) -> &str;

    /// Language tag, e.g. `"es"` or `"pt-BR"`.
    fn lang(&self) -> &str;

    fn supports_latest(&self) -> bool {
        true
    }

    /// Rate-limit policies the HTTP client should enforce for this source.
    fn rate_limits(&self) -> Vec<RateLimitPolicy> {
        Vec::new()
    }

    /// Search filters, built fresh on every call.
    fn filters(&self) -> FilterList {
        FilterList::default()
    }

    fn popular_manga_request(&self, page: u32) -> Result<Request>;
    fn popular_manga_parse(&self, response: &Response) -> Result<MangasPage>;

    fn latest_updates_request(&self, page: u32) -> Result<Request>;
    fn latest_updates_parse(&self, response: &Response) -> Result<MangasPage>;

    fn search_manga_request(&self, page: u32, query: &str, filters: &FilterList)
    -> Result<Request>;
    fn search_manga_parse(&self, response: &Response) -> Result<MangasPage>;

    fn manga_details_request(&self, manga: &Manga) -> Result<Request>;
    fn manga_details_parse(&self, response: &Response) -> Result<Manga>;

    fn chapter_list_request(&self, manga: &Manga) -> Result<Request>;
    fn chapter_list_parse(&self, response: &Response) -> Result<Vec<Chapter>>;

    fn page_list_request(&self, chapter: &Chapter) -> Result<Request>;
    fn page_list_parse(&self, response: &Response) -> Result<Vec<Page>>;

    /// Request for a page whose image URL is resolved lazily.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when the page has no deferred URL.
    fn image_url_request(&self, page: &Page) -> Result<Request> {
        let url = page.url.as_deref().ok_or_else(|| {
            SourceError::invalid_request(&format!("page {} has no deferred URL", page.index))
        })?;
        Ok(Request::get(parse_url(url)?, HeaderMap::new()))
    }

    /// Extracts an image URL from a deferred page response.
    ///
    /// # Errors
    ///
    /// Fails with [`SourceError::UnsupportedOperation`] unless overridden.
    fn image_url_parse(&self, _response: &Response) -> Result<String> {
        Err(SourceError::unsupported(self.id(), "image URL resolution"))
    }

    /// Deep-link lookup for `query`, or `None` when the query is a plain search.
    fn deep_link(&self, _query: &str) -> Option<Result<DeepLink>> {
        None
    }

    /// Browser-facing URL of a manga.
    fn manga_web_url(&self, manga: &Manga) -> String {
        format!("{}{}", self.base_url(), manga.url)
    }

    /// Browser-facing URL of a chapter.
    fn chapter_web_url(&self, chapter: &Chapter) -> String {
        format!("{}{}", self.base_url(), chapter.url)
    }

    async fn fetch_popular_manga(&self, client: &dyn Fetch, page: u32) -> Result<MangasPage> {
        let request = self.popular_manga_request(page)?;
        debug!(source = self.id(), page, url = %request.url, "fetching popular manga");
        let response = client.fetch(request).await?;
        self.popular_manga_parse(&response)
    }

    async fn fetch_latest_updates(&self, client: &dyn Fetch, page: u32) -> Result<MangasPage> {
        if !self.supports_latest() {
            return Err(SourceError::unsupported(self.id(), "latest updates"));
        }
        let request = self.latest_updates_request(page)?;
        debug!(source = self.id(), page, url = %request.url, "fetching latest updates");
        let response = client.fetch(request).await?;
        self.latest_updates_parse(&response)
    }

    /// Runs a search; a query carrying the deep-link marker skips the listing
    /// and returns exactly one manga with no next page.
    async fn fetch_search_manga(
        &self,
        client: &dyn Fetch,
        page: u32,
        query: &str,
        filters: &FilterList,
    ) -> Result<MangasPage> {
        if let Some(link) = self.deep_link(query) {
            let DeepLink {
                request,
                identifier,
            } = link?;
            debug!(source = self.id(), %identifier, "resolving deep link");
            let response = client.fetch(request).await?;
            let mut manga = self.manga_details_parse(&response)?;
            manga.url = identifier;
            return Ok(MangasPage::new(vec![manga], false));
        }

        let request = self.search_manga_request(page, query, filters)?;
        debug!(source = self.id(), page, url = %request.url, "searching");
        let response = client.fetch(request).await?;
        self.search_manga_parse(&response)
    }

    /// Fetches details; the identifier and title of `manga` are kept when the
    /// detail page does not provide them.
    async fn fetch_manga_details(&self, client: &dyn Fetch, manga: &Manga) -> Result<Manga> {
        let request = self.manga_details_request(manga)?;
        let response = client.fetch(request).await?;
        let mut details = self.manga_details_parse(&response)?;
        if details.url.is_empty() {
            details.url.clone_from(&manga.url);
        }
        if details.title.is_empty() {
            details.title.clone_from(&manga.title);
        }
        Ok(details)
    }

    async fn fetch_chapter_list(&self, client: &dyn Fetch, manga: &Manga) -> Result<Vec<Chapter>> {
        let request = self.chapter_list_request(manga)?;
        let response = client.fetch(request).await?;
        self.chapter_list_parse(&response)
    }

    async fn fetch_page_list(&self, client: &dyn Fetch, chapter: &Chapter) -> Result<Vec<Page>> {
        let request = self.page_list_request(chapter)?;
        let response = client.fetch(request).await?;
        self.page_list_parse(&response)
    }

    /// Returns the embedded image URL, or resolves it with one more request.
    async fn fetch_image_url(&self, client: &dyn Fetch, page: &Page) -> Result<String> {
        if let Some(image_url) = &page.image_url {
            return Ok(image_url.clone());
        }
        let request = self.image_url_request(page)?;
        let response = client.fetch(request).await?;
        self.image_url_parse(&response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use reqwest::StatusCode;

    use super::*;

    /// Replays canned bodies and records every request it sees.
    struct Replay {
        body: &'static str,
        seen: Mutex<Vec<Request>>,
    }

    impl Replay {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Fetch for Replay {
        async fn fetch(&self, request: Request) -> Result<Response> {
            let url = request.url.clone();
            self.seen.lock().unwrap().push(request);
            Ok(Response::new(url, StatusCode::OK, self.body))
        }
    }

    /// Minimal adapter whose parsers echo the response body.
    struct Echo;

    impl Echo {
        fn get(path: &str) -> Result<Request> {
            Ok(Request::get(
                parse_url(&format!("https://echo.test{path}"))?,
                HeaderMap::new(),
            ))
        }

        fn listing(response: &Response) -> MangasPage {
            MangasPage::new(vec![Manga::new("/m/1/", response.text())], true)
        }
    }

    #[async_trait]
    impl Source for Echo {
        fn id(&self) -> &str {
            "echo"
        }
        fn name(&self) -> &str {
            "Echo"
        }
        fn base_url(&self) -> &str {
            "https://echo.test"
        }
        fn lang(&self) -> &str {
            "en"
        }
        fn popular_manga_request(&self, page: u32) -> Result<Request> {
            Self::get(&format!("/popular/{page}"))
        }
        fn popular_manga_parse(&self, response: &Response) -> Result<MangasPage> {
            Ok(Self::listing(response))
        }
        fn latest_updates_request(&self, page: u32) -> Result<Request> {
            Self::get(&format!("/latest/{page}"))
        }
        fn latest_updates_parse(&self, response: &Response) -> Result<MangasPage> {
            Ok(Self::listing(response))
        }
        fn search_manga_request(&self, page: u32, query: &str, _: &FilterList) -> Result<Request> {
            Self::get(&format!("/search/{page}?q={query}"))
        }
        fn search_manga_parse(&self, response: &Response) -> Result<MangasPage> {
            Ok(Self::listing(response))
        }
        fn manga_details_request(&self, manga: &Manga) -> Result<Request> {
            Self::get(&manga.url)
        }
        fn manga_details_parse(&self, response: &Response) -> Result<Manga> {
            Ok(Manga::new("", response.text()))
        }
        fn chapter_list_request(&self, manga: &Manga) -> Result<Request> {
            Self::get(&manga.url)
        }
        fn chapter_list_parse(&self, _: &Response) -> Result<Vec<Chapter>> {
            Ok(vec![Chapter::new("/c/1/", "Chapter 1")])
        }
        fn page_list_request(&self, chapter: &Chapter) -> Result<Request> {
            Self::get(&chapter.url)
        }
        fn page_list_parse(&self, _: &Response) -> Result<Vec<Page>> {
            Ok(vec![Page::with_image(0, "https://cdn.test/1.jpg")])
        }
        fn deep_link(&self, query: &str) -> Option<Result<DeepLink>> {
            let id = query.strip_prefix("id:")?;
            Some(Self::get(&format!("/book/{id}")).map(|request| DeepLink {
                request,
                identifier: format!("/book/{id}"),
            }))
        }
    }

    #[tokio::test]
    async fn test_deep_link_bypasses_listing() {
        let client = Replay::new("Deep");
        let page = Echo
            .fetch_search_manga(&client, 1, "id:123", &FilterList::default())
            .await
            .unwrap();

        assert_eq!(page.mangas.len(), 1);
        assert!(!page.has_next_page);
        assert_eq!(page.mangas[0].url, "/book/123");
        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url.path(), "/book/123");
    }

    #[tokio::test]
    async fn test_plain_query_uses_search_request() {
        let client = Replay::new("Result");
        let page = Echo
            .fetch_search_manga(&client, 2, "solo", &FilterList::default())
            .await
            .unwrap();

        assert!(page.has_next_page);
        assert_eq!(client.seen.lock().unwrap()[0].url.path(), "/search/2");
    }

    #[tokio::test]
    async fn test_fetch_details_keeps_input_identifier() {
        let client = Replay::new("Title From Page");
        let manga = Echo
            .fetch_manga_details(&client, &Manga::new("/m/7/", "Old"))
            .await
            .unwrap();
        assert_eq!(manga.url, "/m/7/");
        assert_eq!(manga.title, "Title From Page");
    }

    #[tokio::test]
    async fn test_fetch_image_url_returns_embedded_url_without_request() {
        let client = Replay::new("");
        let page = Page::with_image(0, "https://cdn.test/a.jpg");
        let url = Echo.fetch_image_url(&client, &page).await.unwrap();
        assert_eq!(url, "https://cdn.test/a.jpg");
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_image_url_parse_is_unsupported_by_default() {
        let client = Replay::new("<html></html>");
        let page = Page::deferred(0, "https://echo.test/reader/1");
        let err = Echo.fetch_image_url(&client, &page).await.unwrap_err();
        assert_eq!(err, SourceError::unsupported("echo", "image URL resolution"));
    }

    #[test]
    fn test_web_urls_join_base() {
        assert_eq!(
            Echo.manga_web_url(&Manga::new("/m/1/", "x")),
            "https://echo.test/m/1/"
        );
        assert_eq!(
            Echo.chapter_web_url(&Chapter::new("/c/1/", "x")),
            "https://echo.test/c/1/"
        );
    }
}
