//! Shared adapter for sites built on the Madara WordPress theme.
//!
//! A single generic [`Madara`] source is parameterized by a [`MadaraConfig`]
//! (selectors, date format, chapter transport, keyword tables) and a set of
//! [`MadaraHooks`] (request builders and element mappers). Deployments with
//! quirks override configuration fields or individual hooks.
//!
//! # Chapter retrieval
//!
//! Chapters are read from the detail page when it embeds them. Otherwise the
//! configured [`ChapterTransport`] is requested, and when that also yields
//! nothing and a [`ChapterFallback`] is configured, the `load_chapters`
//! endpoint is paged through until it returns an empty page.

mod config;
mod date;
pub mod filters;
pub mod parse;
mod status;

pub use config::{
    ChapterFallback, ChapterTransport, DEFAULT_ORDER_BY_VALUES, DetailSelectors, FieldQuery,
    MadaraConfig, ORDER_BY_LABELS,
};
pub use date::DateFormat;
pub use status::StatusTable;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, REFERER};
use scraper::{ElementRef, Html};
use tracing::{debug, warn};
use url::Url;

use crate::http::{Fetch, FormBody, RateLimitPolicy, Request, Response, header_value, parse_url};
use crate::model::{Chapter, FilterList, Manga, MangasPage, Page};
use crate::pagination::NextPage;
use crate::source::utils::{require_first, select_all, select_first};
use crate::source::{DeepLink, Result, Source, SourceError};

/// Deep-link marker: `slug:<slug>` opens `/{manga_sub_string}/<slug>/`.
pub const SLUG_SEARCH_PREFIX: &str = "slug:";

/// Builds a listing request for a 1-based page.
pub type RequestHook = fn(&Madara, u32) -> Result<Request>;
/// Maps one listing element to a manga; the URL is the listing page's.
pub type ElementHook = fn(&Madara, ElementRef<'_>, &Url) -> Result<Manga>;
/// Maps a detail document to a manga.
pub type DetailsHook = fn(&Madara, &Html, &Url) -> Result<Manga>;

/// Strategy functions a deployment may replace.
#[derive(Clone, Copy)]
pub struct MadaraHooks {
    pub popular_request: RequestHook,
    pub latest_request: RequestHook,
    pub manga_from_element: ElementHook,
    pub manga_details: DetailsHook,
}

impl Default for MadaraHooks {
    fn default() -> Self {
        Self {
            popular_request: default_popular_request,
            latest_request: default_latest_request,
            manga_from_element: parse::default_manga_from_element,
            manga_details: parse::default_manga_details,
        }
    }
}

impl std::fmt::Debug for MadaraHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MadaraHooks").finish_non_exhaustive()
    }
}

/// `GET {base}/{manga_sub_string}/{page}?m_orderby=views`.
///
/// # Errors
///
/// Returns [`SourceError::InvalidRequest`] when the URL cannot be built.
pub fn default_popular_request(madara: &Madara, page: u32) -> Result<Request> {
    madara.ordered_listing_request("views", page)
}

/// `GET {base}/{manga_sub_string}/{page}?m_orderby=latest`.
///
/// # Errors
///
/// Returns [`SourceError::InvalidRequest`] when the URL cannot be built.
pub fn default_latest_request(madara: &Madara, page: u32) -> Result<Request> {
    madara.ordered_listing_request("latest", page)
}

/// Generic adapter for one Madara deployment.
pub struct Madara {
    config: MadaraConfig,
    hooks: MadaraHooks,
}

impl Madara {
    /// Creates an adapter with the default hooks.
    #[must_use]
    pub fn new(config: MadaraConfig) -> Self {
        Self::with_hooks(config, MadaraHooks::default())
    }

    #[must_use]
    pub fn with_hooks(config: MadaraConfig, hooks: MadaraHooks) -> Self {
        Self { config, hooks }
    }

    #[must_use]
    pub fn config(&self) -> &MadaraConfig {
        &self.config
    }

    /// Headers sent with every request.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when the base URL is not a valid
    /// header value.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, header_value(&format!("{}/", self.config.base_url))?);
        Ok(headers)
    }

    /// Absolute URL for a site-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when the result is not a valid URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return parse_url(path);
        }
        let separator = if path.starts_with('/') { "" } else { "/" };
        parse_url(&format!("{}{separator}{path}", self.config.base_url))
    }

    /// `GET` for a site-relative path with the default headers.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when the URL cannot be built.
    pub fn get(&self, path: &str) -> Result<Request> {
        Ok(Request::get(self.url(path)?, self.headers()?))
    }

    /// AJAX form POST to `wp-admin/admin-ajax.php`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when the URL cannot be built.
    pub fn admin_ajax_request(&self, body: FormBody) -> Result<Request> {
        Ok(Request::xhr_post(
            self.url("/wp-admin/admin-ajax.php")?,
            self.headers()?,
            body,
        ))
    }

    /// Listing of `manga_sub_string` ordered by `order`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when the URL cannot be built.
    pub fn ordered_listing_request(&self, order: &str, page: u32) -> Result<Request> {
        let path = format!("{}/", self.config.manga_sub_string);
        let mut url = self
            .config
            .page_cursor
            .listing_url(&self.config.base_url, &path, page)?;
        url.query_pairs_mut().append_pair("m_orderby", order);
        Ok(Request::get(url, self.headers()?))
    }

    fn parse_listing<F>(
        &self,
        response: &Response,
        selector: &str,
        next_page: NextPage,
        mapper: F,
    ) -> Result<MangasPage>
    where
        F: Fn(ElementRef<'_>) -> Result<Manga>,
    {
        let document = response.html();
        let root = document.root_element();
        if let Some(anchor) = self.config.listing_anchor {
            require_first(root, anchor)?;
        }
        let mangas = select_all(root, selector)?
            .into_iter()
            .map(mapper)
            .collect::<Result<Vec<_>>>()?;
        let has_next_page = next_page.has_next(&document, mangas.len())?;
        Ok(MangasPage::new(mangas, has_next_page))
    }

    fn parse_popular_like(&self, response: &Response) -> Result<MangasPage> {
        self.parse_listing(
            response,
            self.config.popular_selector,
            self.config.popular_next_page,
            |element| (self.hooks.manga_from_element)(self, element, &response.url),
        )
    }

    /// Decides how chapters are obtained from the detail page.
    fn plan_chapters(&self, detail: &Response) -> Result<ChapterPlan> {
        let document = detail.html();
        let root = document.root_element();

        let inline = parse::chapters_in(self, &document, &detail.url)?;
        let holder_id = select_first(root, self.config.chapter_holder_selector)?
            .and_then(|holder| holder.value().attr("data-id"))
            .map(str::to_string);
        let fallback_id = self
            .config
            .chapter_fallback
            .as_ref()
            .map(|fallback| parse::inline_manga_id(&document, fallback));

        let transport = if inline.is_empty() {
            match self.config.chapter_transport {
                ChapterTransport::Ajax => {
                    let manga_url = detail.url.as_str().trim_end_matches('/');
                    Some(Request::xhr_post(
                        parse_url(&format!("{manga_url}/ajax/chapters/"))?,
                        self.headers()?,
                        FormBody::new(),
                    ))
                }
                ChapterTransport::Legacy => match &holder_id {
                    Some(id) => Some(self.admin_ajax_request(
                        FormBody::new()
                            .add("action", "manga_get_chapters")
                            .add("manga", id.clone()),
                    )?),
                    None if self.config.chapter_fallback.is_none() => {
                        return Err(SourceError::missing(self.config.chapter_holder_selector));
                    }
                    None => None,
                },
            }
        } else {
            None
        };

        let view_id = holder_id.or_else(|| fallback_id.clone().and_then(Result::ok));
        Ok(ChapterPlan {
            inline,
            transport,
            fallback_id,
            view_id,
        })
    }

    fn load_chapters_request(&self, manga_id: &str, page: u32) -> Result<Request> {
        self.admin_ajax_request(
            FormBody::new()
                .add("action", "load_chapters")
                .add("mangaid", manga_id)
                .add("page", page.to_string()),
        )
    }

    async fn fetch_chapter_page(
        &self,
        client: &dyn Fetch,
        fallback: &ChapterFallback,
        manga_id: &str,
        page: u32,
    ) -> Result<Vec<Chapter>> {
        let response = client.fetch(self.load_chapters_request(manga_id, page)?).await?;
        let chapters = parse::fallback_chapters(self, fallback, &response)?;
        debug!(page, count = chapters.len(), "load_chapters page fetched");
        Ok(chapters)
    }

    /// Pages through `load_chapters` until a page comes back empty and
    /// returns the concatenation of the non-empty pages in fetch order.
    async fn fetch_fallback_chapters(
        &self,
        client: &dyn Fetch,
        fallback: &ChapterFallback,
        manga_id: &str,
    ) -> Result<Vec<Chapter>> {
        let mut chapters = Vec::new();
        let mut page = 1_u32;
        loop {
            let batch = self.fetch_chapter_page(client, fallback, manga_id, page).await?;
            if batch.is_empty() {
                break;
            }
            chapters.extend(batch);
            page += 1;
        }
        Ok(chapters)
    }

    /// Best-effort `manga_views` ping; failures are only logged.
    async fn count_view(&self, client: &dyn Fetch, manga_id: &str) {
        let request = match self.admin_ajax_request(
            FormBody::new()
                .add("action", "manga_views")
                .add("manga", manga_id),
        ) {
            Ok(request) => request,
            Err(error) => {
                warn!(error = %error, "could not build view count request");
                return;
            }
        };
        match client.fetch(request).await {
            Ok(response) if !response.status.is_success() => {
                debug!(status = response.status.as_u16(), "view count not accepted");
            }
            Ok(_) => {}
            Err(error) => warn!(error = %error, "view count request failed"),
        }
    }
}

impl std::fmt::Debug for Madara {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Madara")
            .field("id", &self.config.id)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// What the detail page tells about where the chapters are.
struct ChapterPlan {
    inline: Vec<Chapter>,
    transport: Option<Request>,
    fallback_id: Option<Result<String>>,
    view_id: Option<String>,
}

#[async_trait]
impl Source for Madara {
    fn id(&self) -> &str {
        self.config.id
    }

    fn name(&self) -> &str {
        self.config.name
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn lang(&self) -> &str {
        self.config.lang
    }

    fn rate_limits(&self) -> Vec<RateLimitPolicy> {
        self.config.rate_limits.clone()
    }

    fn filters(&self) -> FilterList {
        filters::search_filters(&self.config)
    }

    fn popular_manga_request(&self, page: u32) -> Result<Request> {
        (self.hooks.popular_request)(self, page)
    }

    fn popular_manga_parse(&self, response: &Response) -> Result<MangasPage> {
        self.parse_popular_like(response)
    }

    fn latest_updates_request(&self, page: u32) -> Result<Request> {
        (self.hooks.latest_request)(self, page)
    }

    fn latest_updates_parse(&self, response: &Response) -> Result<MangasPage> {
        self.parse_popular_like(response)
    }

    fn search_manga_request(
        &self,
        page: u32,
        query: &str,
        filters: &FilterList,
    ) -> Result<Request> {
        let mut url = self
            .config
            .page_cursor
            .listing_url(&self.config.base_url, "", page)?;
        url.query_pairs_mut()
            .append_pair("s", query.trim())
            .append_pair("post_type", "wp-manga");
        filters::apply_search_filters(&mut url, filters);
        Ok(Request::get(url, self.headers()?))
    }

    fn search_manga_parse(&self, response: &Response) -> Result<MangasPage> {
        self.parse_listing(
            response,
            self.config.search_selector,
            self.config.search_next_page,
            |element| parse::manga_from_link(element, &response.url, self.config.search_url_selector),
        )
    }

    fn manga_details_request(&self, manga: &Manga) -> Result<Request> {
        self.get(&manga.url)
    }

    fn manga_details_parse(&self, response: &Response) -> Result<Manga> {
        let document = response.html();
        (self.hooks.manga_details)(self, &document, &response.url)
    }

    fn chapter_list_request(&self, manga: &Manga) -> Result<Request> {
        self.get(&manga.url)
    }

    fn chapter_list_parse(&self, response: &Response) -> Result<Vec<Chapter>> {
        parse::chapter_elements(self, response)
    }

    fn page_list_request(&self, chapter: &Chapter) -> Result<Request> {
        self.get(&chapter.url)
    }

    fn page_list_parse(&self, response: &Response) -> Result<Vec<Page>> {
        parse::pages(self, response)
    }

    fn deep_link(&self, query: &str) -> Option<Result<DeepLink>> {
        let slug = query.strip_prefix(SLUG_SEARCH_PREFIX)?.trim().trim_matches('/');
        if slug.is_empty() {
            return Some(Err(SourceError::invalid_request("empty slug in deep link")));
        }
        let identifier = format!("/{}/{slug}/", self.config.manga_sub_string);
        Some(self.get(&identifier).map(|request| DeepLink {
            request,
            identifier,
        }))
    }

    #[tracing::instrument(skip(self, client, manga), fields(manga = %manga.url))]
    async fn fetch_chapter_list(&self, client: &dyn Fetch, manga: &Manga) -> Result<Vec<Chapter>> {
        let detail = client.fetch(self.chapter_list_request(manga)?).await?;
        let ChapterPlan {
            inline,
            transport,
            fallback_id,
            view_id,
        } = self.plan_chapters(&detail)?;

        let mut chapters = inline;
        if let Some(request) = transport {
            debug!(url = %request.url, "requesting chapter transport");
            let response = client.fetch(request).await?;
            chapters = parse::chapter_elements(self, &response)?;
        }
        if chapters.is_empty()
            && let Some(fallback) = self.config.chapter_fallback
        {
            let manga_id = fallback_id.unwrap_or_else(|| {
                Err(SourceError::extraction("manga id", "no fallback script configured"))
            })?;
            debug!(%manga_id, "default transport empty, paging load_chapters");
            chapters = self.fetch_fallback_chapters(client, &fallback, &manga_id).await?;
        }

        if self.config.send_view_count
            && let Some(id) = view_id
        {
            self.count_view(client, &id).await;
        }
        Ok(chapters)
    }
}
