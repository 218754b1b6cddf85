//! Typed search filters declared by sources.
//!
//! A source hands out a fresh [`FilterList`] from static option tables on every
//! call; the host mutates its copy and passes it back into the search request.

use serde::Serialize;

/// A labelled option of a select or group filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub label: &'static str,
    pub value: &'static str,
}

impl FilterOption {
    #[must_use]
    pub const fn new(label: &'static str, value: &'static str) -> Self {
        Self { label, value }
    }
}

/// A single search parameter. `key` is the query parameter it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Free text input.
    Text {
        key: &'static str,
        name: &'static str,
        value: String,
    },
    /// Exactly one option chosen; index 0 is the default.
    Select {
        key: &'static str,
        name: &'static str,
        options: Vec<FilterOption>,
        selected: usize,
    },
    /// Any number of options checked.
    Group {
        key: &'static str,
        name: &'static str,
        options: Vec<FilterOption>,
        checked: Vec<bool>,
    },
}

impl Filter {
    #[must_use]
    pub fn text(key: &'static str, name: &'static str) -> Self {
        Self::Text {
            key,
            name,
            value: String::new(),
        }
    }

    #[must_use]
    pub fn select(key: &'static str, name: &'static str, options: &[FilterOption]) -> Self {
        Self::Select {
            key,
            name,
            options: options.to_vec(),
            selected: 0,
        }
    }

    #[must_use]
    pub fn group(key: &'static str, name: &'static str, options: &[FilterOption]) -> Self {
        Self::Group {
            key,
            name,
            options: options.to_vec(),
            checked: vec![false; options.len()],
        }
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Text { key, .. } | Self::Select { key, .. } | Self::Group { key, .. } => key,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { name, .. } | Self::Select { name, .. } | Self::Group { name, .. } => name,
        }
    }
}

/// Ordered collection of filters for one search call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterList(Vec<Filter>);

impl FilterList {
    #[must_use]
    pub fn new(filters: Vec<Filter>) -> Self {
        Self(filters)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn find(&self, key: &str) -> Option<&Filter> {
        self.0.iter().find(|filter| filter.key() == key)
    }

    fn find_mut(&mut self, key: &str) -> Option<&mut Filter> {
        self.0.iter_mut().find(|filter| filter.key() == key)
    }

    /// Trimmed value of a text filter, `None` when blank or absent.
    #[must_use]
    pub fn text_value(&self, key: &str) -> Option<&str> {
        match self.find(key)? {
            Filter::Text { value, .. } => Some(value.trim()).filter(|value| !value.is_empty()),
            _ => None,
        }
    }

    /// Value of the selected option of a select filter.
    #[must_use]
    pub fn selected_value(&self, key: &str) -> Option<&'static str> {
        match self.find(key)? {
            Filter::Select {
                options, selected, ..
            } => options.get(*selected).map(|option| option.value),
            _ => None,
        }
    }

    /// Values of every checked option of a group filter, in declaration order.
    #[must_use]
    pub fn checked_values(&self, key: &str) -> Vec<&'static str> {
        match self.find(key) {
            Some(Filter::Group {
                options, checked, ..
            }) => options
                .iter()
                .zip(checked)
                .filter(|(_, is_checked)| **is_checked)
                .map(|(option, _)| option.value)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Applies a `key=value` assignment.
    ///
    /// Text filters take the value verbatim, select filters choose the option
    /// whose value or label matches, group filters check the matching option.
    /// Returns `false` when no filter or option matches.
    pub fn apply(&mut self, key: &str, raw_value: &str) -> bool {
        let Some(filter) = self.find_mut(key) else {
            return false;
        };
        match filter {
            Filter::Text { value, .. } => {
                *value = raw_value.to_string();
                true
            }
            Filter::Select {
                options, selected, ..
            } => match position_of(options, raw_value) {
                Some(index) => {
                    *selected = index;
                    true
                }
                None => false,
            },
            Filter::Group {
                options, checked, ..
            } => match position_of(options, raw_value) {
                Some(index) => {
                    checked[index] = true;
                    true
                }
                None => false,
            },
        }
    }
}

fn position_of(options: &[FilterOption], raw_value: &str) -> Option<usize> {
    options
        .iter()
        .position(|option| option.value == raw_value)
        .or_else(|| {
            options
                .iter()
                .position(|option| option.label.eq_ignore_ascii_case(raw_value))
        })
}

impl<'a> IntoIterator for &'a FilterList {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ORDER: [FilterOption; 3] = [
        FilterOption::new("Relevance", ""),
        FilterOption::new("Latest", "latest"),
        FilterOption::new("Views", "views"),
    ];

    fn sample() -> FilterList {
        FilterList::new(vec![
            Filter::text("author", "Author"),
            Filter::select("m_orderby", "Order by", &ORDER),
            Filter::group("status[]", "Status", &ORDER[1..]),
        ])
    }

    #[test]
    fn test_fresh_list_has_defaults() {
        let filters = sample();
        assert_eq!(filters.len(), 3);
        assert_eq!(filters.text_value("author"), None);
        assert_eq!(filters.selected_value("m_orderby"), Some(""));
        assert!(filters.checked_values("status[]").is_empty());
    }

    #[test]
    fn test_apply_text_select_and_group() {
        let mut filters = sample();
        assert!(filters.apply("author", "  Oda  "));
        assert!(filters.apply("m_orderby", "views"));
        assert!(filters.apply("status[]", "Views"));
        assert_eq!(filters.text_value("author"), Some("Oda"));
        assert_eq!(filters.selected_value("m_orderby"), Some("views"));
        assert_eq!(filters.checked_values("status[]"), vec!["views"]);
    }

    #[test]
    fn test_apply_unknown_key_or_option_is_rejected() {
        let mut filters = sample();
        assert!(!filters.apply("missing", "x"));
        assert!(!filters.apply("m_orderby", "nope"));
        assert_eq!(filters.selected_value("m_orderby"), Some(""));
    }
}
