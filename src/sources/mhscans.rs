//! MHScans (`es`).
//!
//! Listings are loaded through the theme's `madara_load_more` AJAX action
//! instead of archive pages, so listing responses are bare item fragments.

use std::time::Duration;

use crate::http::{FormBody, RateLimitPolicy, Request};
use crate::madara::{ChapterTransport, DateFormat, Madara, MadaraConfig, MadaraHooks};
use crate::pagination::NextPage;
use crate::source::Result;

pub const BASE_URL: &str = "https://mhscans.com";

const VIEWS_META_KEY: &str = "_wp_manga_views";
const LATEST_META_KEY: &str = "_latest_update";

#[must_use]
pub fn source() -> Madara {
    with_base_url(BASE_URL)
}

#[must_use]
pub fn with_base_url(base_url: &str) -> Madara {
    let mut config = MadaraConfig::new("mhscans", "MHScans", base_url, "es");
    config.date_format = DateFormat::new("%d de %B de %Y", "es");
    config.chapter_transport = ChapterTransport::Ajax;
    config.popular_next_page = NextPage::UnlessPresent(".no-posts");
    config.listing_anchor = Some("div.page-item-detail, .no-posts");
    config.rate_limits = vec![RateLimitPolicy::global(1, Duration::from_secs(3))];

    Madara::with_hooks(
        config,
        MadaraHooks {
            popular_request,
            latest_request,
            ..MadaraHooks::default()
        },
    )
}

/// `madara_load_more` POST; the endpoint counts pages from zero.
fn load_more_request(madara: &Madara, page: u32, meta_key: &str) -> Result<Request> {
    madara.admin_ajax_request(
        FormBody::new()
            .add("action", "madara_load_more")
            .add("page", page.saturating_sub(1).to_string())
            .add("template", "madara-core/content/content-archive")
            .add("vars[paged]", "1")
            .add("vars[orderby]", "meta_value_num")
            .add("vars[template]", "archive")
            .add("vars[sidebar]", "full")
            .add("vars[post_type]", "wp-manga")
            .add("vars[post_status]", "publish")
            .add("vars[meta_key]", meta_key)
            .add("vars[order]", "desc")
            .add("vars[meta_query][relation]", "AND")
            .add("vars[manga_archives_item_layout]", "big_thumbnail"),
    )
}

fn popular_request(madara: &Madara, page: u32) -> Result<Request> {
    load_more_request(madara, page, VIEWS_META_KEY)
}

fn latest_request(madara: &Madara, page: u32) -> Result<Request> {
    load_more_request(madara, page, LATEST_META_KEY)
}
