//! Mangas No Sekai (`es`).
//!
//! Madara deployment serving manga under `/manganews/` with a redesigned
//! listing card and detail page. Chapters come from the Ajax endpoint, or
//! from the paged `load_chapters` action when that answers with nothing.

use std::time::Duration;

use scraper::{ElementRef, Html};
use url::Url;

use crate::http::{RateLimitPolicy, Request};
use crate::madara::parse::{append_alt_name, normalize_genres};
use crate::madara::{
    ChapterFallback, ChapterTransport, DateFormat, FieldQuery, Madara, MadaraConfig, MadaraHooks,
    default_latest_request, default_popular_request,
};
use crate::model::Manga;
use crate::pagination::NextPage;
use crate::source::utils::{image_from_element, own_text, relative_href, require_first, select_first, text};
use crate::source::{Result, SourceError};

pub const BASE_URL: &str = "https://mangasnosekai.com";

const SINOPSIS_ROW: &str = "section#section-sinopsis div.d-flex";

const fn labeled(contains: &'static str, value: &'static str) -> FieldQuery {
    FieldQuery::Labeled {
        row: SINOPSIS_ROW,
        label: "div",
        contains,
        value,
    }
}

/// The production deployment.
#[must_use]
pub fn source() -> Madara {
    with_base_url(BASE_URL)
}

/// The adapter pointed at another host, e.g. a mirror or a mock server.
#[must_use]
pub fn with_base_url(base_url: &str) -> Madara {
    let mut config = MadaraConfig::new("mangasnosekai", "Mangas No Sekai", base_url, "es");
    config.date_format = DateFormat::new("%B %d, %Y", "es");
    config.manga_sub_string = "manganews";

    config.popular_selector = "div.page-listing-item > div.row > div";
    config.popular_url_selector = "a[href]";
    config.search_next_page = NextPage::Selector("nav.navigation a.next");

    config.details.title = FieldQuery::Css("div.thumble-container p.titleMangaSingle");
    config.details.thumbnail = FieldQuery::Css("div.thumble-container img.img-responsive");
    config.details.description = FieldQuery::Css("section#section-sinopsis > p");
    config.details.status = labeled("Estado", "p");
    config.details.author = labeled("Autor", "p");
    config.details.genre = labeled("Generos", "p a");
    config.details.alt_name = labeled("Otros nombres", "p");
    config.details.alt_name_prefix = "Otros nombres: ";

    config.order_by_values = [
        "",
        "latest2",
        "alphabet",
        "rating",
        "trending",
        "views2",
        "new-manga",
    ];
    config.chapter_transport = ChapterTransport::Ajax;
    config.chapter_fallback = Some(ChapterFallback::default());
    config.rate_limits = vec![RateLimitPolicy::per_host(
        &config.base_url,
        2,
        Duration::from_secs(1),
    )];

    Madara::with_hooks(
        config,
        MadaraHooks {
            popular_request,
            latest_request,
            manga_from_element,
            manga_details,
        },
    )
}

fn popular_request(madara: &Madara, page: u32) -> Result<Request> {
    default_popular_request(madara, page).map(Request::force_network)
}

fn latest_request(madara: &Madara, page: u32) -> Result<Request> {
    default_latest_request(madara, page).map(Request::force_network)
}

/// Listing card: the link wraps a `figure` whose `figcaption` holds the title.
fn manga_from_element(madara: &Madara, element: ElementRef<'_>, page_url: &Url) -> Result<Manga> {
    let url_selector = madara.config().popular_url_selector;
    let link = require_first(element, url_selector)?;
    let url = relative_href(link, page_url, url_selector)?;
    let title = select_first(element, "figcaption")?.map(text).unwrap_or_default();

    let mut manga = Manga::new(url, title);
    manga.thumbnail_url =
        select_first(element, "img")?.and_then(|img| image_from_element(img, page_url));
    Ok(manga)
}

/// Detail page: label/value rows under the synopsis section. Only the first
/// author and status rows count and their nested markup is ignored.
fn manga_details(madara: &Madara, document: &Html, page_url: &Url) -> Result<Manga> {
    let root = document.root_element();
    let config = madara.config();
    let fields = &config.details;

    let title = fields
        .title
        .first(root)?
        .map(own_text)
        .ok_or_else(|| SourceError::missing("div.thumble-container p.titleMangaSingle"))?;

    let mut manga = Manga::new("", title);
    manga.author = fields
        .author
        .first(root)?
        .map(own_text)
        .filter(|author| !author.is_empty());
    let description = fields
        .description
        .select(root)?
        .into_iter()
        .map(text)
        .collect::<Vec<_>>()
        .join(" ");
    manga.description = Some(description).filter(|description| !description.is_empty());
    manga.thumbnail_url = fields
        .thumbnail
        .first(root)?
        .and_then(|img| image_from_element(img, page_url));
    if let Some(status) = fields.status.first(root)? {
        manga.status = config.status_table.classify(&own_text(status));
    }
    manga.genre = normalize_genres(fields.genre.select(root)?.into_iter().map(text));
    if let Some(alt) = fields.alt_name.first(root)? {
        append_alt_name(&mut manga, &own_text(alt), fields.alt_name_prefix);
    }
    Ok(manga)
}
