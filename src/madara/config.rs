//! Configuration record for one Madara deployment.

use scraper::ElementRef;

use crate::http::RateLimitPolicy;
use crate::model::FilterOption;
use crate::pagination::{NextPage, PageCursor};
use crate::source::Result;
use crate::source::utils::select_all;

use super::date::DateFormat;
use super::status::StatusTable;

/// Labels of the order-by filter, paired with [`MadaraConfig::order_by_values`].
pub const ORDER_BY_LABELS: [&str; 7] = [
    "Relevance",
    "Latest",
    "A-Z",
    "Rating",
    "Trending",
    "Most Views",
    "New",
];

/// Default `m_orderby` values, index-aligned with [`ORDER_BY_LABELS`].
pub const DEFAULT_ORDER_BY_VALUES: [&str; 7] = [
    "",
    "latest",
    "alphabet",
    "rating",
    "trending",
    "views",
    "new-manga",
];

/// Where a detail field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldQuery {
    /// Elements matching a CSS selector.
    Css(&'static str),
    /// `value` elements inside the `row` elements whose `label` element text
    /// contains `contains` (case-insensitive).
    Labeled {
        row: &'static str,
        label: &'static str,
        contains: &'static str,
        value: &'static str,
    },
}

impl FieldQuery {
    /// Every matching element in document order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SourceError::Parse`] when a selector is invalid.
    pub fn select<'a>(&self, root: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>> {
        match *self {
            Self::Css(css) => select_all(root, css),
            Self::Labeled {
                row,
                label,
                contains,
                value,
            } => {
                let needle = contains.to_lowercase();
                let mut found = Vec::new();
                for row in select_all(root, row)? {
                    let labelled = select_all(row, label)?.into_iter().any(|label| {
                        label.text().collect::<String>().to_lowercase().contains(&needle)
                    });
                    if labelled {
                        found.extend(select_all(row, value)?);
                    }
                }
                Ok(found)
            }
        }
    }

    /// First matching element.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SourceError::Parse`] when a selector is invalid.
    pub fn first<'a>(&self, root: ElementRef<'a>) -> Result<Option<ElementRef<'a>>> {
        Ok(self.select(root)?.into_iter().next())
    }
}

/// How the chapter list is requested when the detail page does not embed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterTransport {
    /// `POST /wp-admin/admin-ajax.php` with `action=manga_get_chapters` and
    /// the chapter holder's `data-id`.
    Legacy,
    /// `POST {manga url}/ajax/chapters/`.
    Ajax,
}

/// Paginated `load_chapters` endpoint tried when the default transport
/// yields no chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterFallback {
    /// Inline scripts searched for the `manga_id = <value>;` assignment.
    pub script_selector: &'static str,
    pub element_selector: &'static str,
    pub url_selector: &'static str,
    pub name_selector: &'static str,
    pub date_selector: &'static str,
}

impl Default for ChapterFallback {
    fn default() -> Self {
        Self {
            script_selector: "div.tab-summary > script",
            element_selector: "div.wp-manga-chapter",
            url_selector: "a",
            name_selector: "div.text-sm",
            date_selector: "time",
        }
    }
}

/// Detail page field locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailSelectors {
    pub title: FieldQuery,
    pub author: FieldQuery,
    pub artist: FieldQuery,
    pub description: FieldQuery,
    pub thumbnail: FieldQuery,
    pub status: FieldQuery,
    pub genre: FieldQuery,
    pub alt_name: FieldQuery,
    /// Prepended to alternative names when they are added to the description.
    pub alt_name_prefix: &'static str,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            title: FieldQuery::Css("div.post-title h3, div.post-title h1, #manga-title > h1"),
            author: FieldQuery::Css("div.author-content > a"),
            artist: FieldQuery::Css("div.artist-content > a"),
            description: FieldQuery::Css(
                "div.description-summary div.summary__content, div.summary_content div.post-content_item > h5 + div, div.summary_content div.manga-excerpt",
            ),
            thumbnail: FieldQuery::Css("div.summary_image img"),
            status: FieldQuery::Css("div.summary-content"),
            genre: FieldQuery::Css("div.genres-content a"),
            alt_name: FieldQuery::Labeled {
                row: ".post-content_item",
                label: ".summary-heading",
                contains: "Alt",
                value: ".summary-content",
            },
            alt_name_prefix: "Alternative Name: ",
        }
    }
}

/// Everything that distinguishes one Madara deployment from another.
///
/// Start from [`MadaraConfig::new`] and override fields for the site's quirks.
#[derive(Debug, Clone)]
pub struct MadaraConfig {
    pub id: &'static str,
    pub name: &'static str,
    /// Site root without a trailing slash.
    pub base_url: String,
    pub lang: &'static str,
    pub date_format: DateFormat,
    /// Path segment manga pages live under, e.g. `manga`.
    pub manga_sub_string: &'static str,
    pub page_cursor: PageCursor,

    pub popular_selector: &'static str,
    pub popular_url_selector: &'static str,
    pub popular_next_page: NextPage,
    pub search_selector: &'static str,
    pub search_url_selector: &'static str,
    pub search_next_page: NextPage,
    /// Container that must be present for a listing parse to succeed;
    /// `None` accepts any response.
    pub listing_anchor: Option<&'static str>,

    pub details: DetailSelectors,
    pub status_table: StatusTable,

    pub chapter_list_selector: &'static str,
    pub chapter_holder_selector: &'static str,
    pub chapter_date_selector: &'static str,
    /// Appended to chapter URLs so the reader renders every page at once.
    pub chapter_url_suffix: &'static str,
    pub chapter_transport: ChapterTransport,
    pub chapter_fallback: Option<ChapterFallback>,

    pub page_list_selector: &'static str,

    pub order_by_values: [&'static str; 7],
    pub send_view_count: bool,
    pub rate_limits: Vec<RateLimitPolicy>,
}

impl MadaraConfig {
    /// A configuration with the stock Madara theme defaults.
    #[must_use]
    pub fn new(
        id: &'static str,
        name: &'static str,
        base_url: impl Into<String>,
        lang: &'static str,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            id,
            name,
            base_url,
            lang,
            date_format: DateFormat::default(),
            manga_sub_string: "manga",
            page_cursor: PageCursor::PathSegment,
            popular_selector: "div.page-item-detail",
            popular_url_selector: "div.post-title a",
            popular_next_page: NextPage::Selector(
                "div.nav-previous, nav.navigation-ajax, a.nextpostslink",
            ),
            search_selector: "div.c-tabs-item__content",
            search_url_selector: "div.post-title a",
            search_next_page: NextPage::Selector(
                "div.nav-previous, nav.navigation-ajax, a.nextpostslink",
            ),
            listing_anchor: Some("div.c-page-content"),
            details: DetailSelectors::default(),
            status_table: StatusTable::default(),
            chapter_list_selector: "li.wp-manga-chapter",
            chapter_holder_selector: "div[id^=manga-chapters-holder]",
            chapter_date_selector: "span.chapter-release-date",
            chapter_url_suffix: "?style=list",
            chapter_transport: ChapterTransport::Legacy,
            chapter_fallback: None,
            page_list_selector: "div.page-break, li.blocks-gallery-item, .reading-content img",
            order_by_values: DEFAULT_ORDER_BY_VALUES,
            send_view_count: true,
            rate_limits: Vec::new(),
        }
    }

    /// Order-by options as filter options.
    #[must_use]
    pub fn order_by_options(&self) -> Vec<FilterOption> {
        ORDER_BY_LABELS
            .into_iter()
            .zip(self.order_by_values)
            .map(|(label, value)| FilterOption::new(label, value))
            .collect()
    }
}
