//! Search filters understood by the Madara search page.

use url::Url;

use crate::model::{Filter, FilterList, FilterOption};

use super::config::MadaraConfig;

const STATUS_OPTIONS: [FilterOption; 4] = [
    FilterOption::new("Completed", "end"),
    FilterOption::new("Ongoing", "on-going"),
    FilterOption::new("Canceled", "canceled"),
    FilterOption::new("On Hold", "on-hold"),
];

const ADULT_OPTIONS: [FilterOption; 3] = [
    FilterOption::new("All", ""),
    FilterOption::new("None", "0"),
    FilterOption::new("Only", "1"),
];

const GENRE_CONDITION_OPTIONS: [FilterOption; 2] = [
    FilterOption::new("OR", ""),
    FilterOption::new("AND", "1"),
];

const TEXT_KEYS: [&str; 3] = ["author", "artist", "release"];

/// Fresh filter list for `config`.
#[must_use]
pub fn search_filters(config: &MadaraConfig) -> FilterList {
    FilterList::new(vec![
        Filter::text("author", "Author"),
        Filter::text("artist", "Artist"),
        Filter::text("release", "Year of Released"),
        Filter::group("status[]", "Status", &STATUS_OPTIONS),
        Filter::select("m_orderby", "Order By", &config.order_by_options()),
        Filter::select("adult", "Adult Content", &ADULT_OPTIONS),
        Filter::select("op", "Genres condition", &GENRE_CONDITION_OPTIONS),
    ])
}

/// Appends the non-default filter values to a search URL.
pub fn apply_search_filters(url: &mut Url, filters: &FilterList) {
    let mut pairs = url.query_pairs_mut();
    for key in TEXT_KEYS {
        if let Some(value) = filters.text_value(key) {
            pairs.append_pair(key, value);
        }
    }
    for value in filters.checked_values("status[]") {
        pairs.append_pair("status[]", value);
    }
    for key in ["m_orderby", "adult", "op"] {
        if let Some(value) = filters.selected_value(key).filter(|value| !value.is_empty()) {
            pairs.append_pair(key, value);
        }
    }
}
