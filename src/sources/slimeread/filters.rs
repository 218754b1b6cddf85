//! `/book_search` filters.

use url::Url;

use crate::model::{Filter, FilterList, FilterOption};

const GENRES: [FilterOption; 17] = [
    FilterOption::new("Todos", ""),
    FilterOption::new("Ação", "Ação"),
    FilterOption::new("Aventura", "Aventura"),
    FilterOption::new("Comédia", "Comédia"),
    FilterOption::new("Drama", "Drama"),
    FilterOption::new("Ecchi", "Ecchi"),
    FilterOption::new("Fantasia", "Fantasia"),
    FilterOption::new("Harém", "Harém"),
    FilterOption::new("Isekai", "Isekai"),
    FilterOption::new("Magia", "Magia"),
    FilterOption::new("Mistério", "Mistério"),
    FilterOption::new("Reencarnação", "Reencarnação"),
    FilterOption::new("Romance", "Romance"),
    FilterOption::new("Shounen", "Shounen"),
    FilterOption::new("Slice of Life", "Slice of Life"),
    FilterOption::new("Sobrenatural", "Sobrenatural"),
    FilterOption::new("Vida Escolar", "Vida Escolar"),
];

const STATUS: [FilterOption; 6] = [
    FilterOption::new("Todos", ""),
    FilterOption::new("Em andamento", "1"),
    FilterOption::new("Completo", "2"),
    FilterOption::new("Dropado", "3"),
    FilterOption::new("Cancelado", "4"),
    FilterOption::new("Hiato", "5"),
];

const SEARCH_METHODS: [FilterOption; 3] = [
    FilterOption::new("Padrão", ""),
    FilterOption::new("Contém", "contains"),
    FilterOption::new("Começa com", "starts_with"),
];

const CATEGORIES: [FilterOption; 4] = [
    FilterOption::new("Mangá", "manga"),
    FilterOption::new("Manhwa", "manhwa"),
    FilterOption::new("Manhua", "manhua"),
    FilterOption::new("Webtoon", "webtoon"),
];

#[must_use]
pub fn search_filters() -> FilterList {
    FilterList::new(vec![
        Filter::select("genre[]", "Gênero", &GENRES),
        Filter::select("status", "Status", &STATUS),
        Filter::select("searchMethod", "Método de busca", &SEARCH_METHODS),
        Filter::group("categories[]", "Categorias", &CATEGORIES),
    ])
}

/// Adds `query` and every non-blank filter value to a `/book_search` URL.
pub fn apply_search(url: &mut Url, query: &str, filters: &FilterList) {
    let mut params = vec![("query", query)];
    for key in ["genre[]", "status", "searchMethod"] {
        params.push((key, filters.selected_value(key).unwrap_or_default()));
    }
    params.extend(
        filters
            .checked_values("categories[]")
            .into_iter()
            .map(|category| ("categories[]", category)),
    );
    params.retain(|(_, value)| !value.trim().is_empty());
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
}
