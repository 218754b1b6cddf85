//! Normalized content model shared by every source.
//!
//! All entities are plain values: each parse call builds fresh instances from
//! a response body and nothing here holds shared mutable state.

mod filter;

pub use filter::{Filter, FilterList, FilterOption};

use serde::Serialize;

/// Publication status of a manga.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MangaStatus {
    #[default]
    Unknown,
    Ongoing,
    Completed,
    OnHiatus,
    Cancelled,
}

impl MangaStatus {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::OnHiatus => "on_hiatus",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A manga as seen by one source.
///
/// `url` is the site-relative identifier. It is unique within a source and
/// stable across requests, so hosts use it as their dedup key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manga {
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub artist: Option<String>,
    /// Display-ordered genres; no two entries are equal.
    pub genre: Vec<String>,
    pub status: MangaStatus,
}

impl Manga {
    /// Creates a manga with only its identifier and title set.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Genres joined as a comma separated display string.
    #[must_use]
    pub fn genre_display(&self) -> String {
        self.genre.join(", ")
    }
}

/// A chapter belonging to exactly one manga.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Chapter {
    /// Site-relative URL used to fetch the page list.
    pub url: String,
    pub name: String,
    pub chapter_number: Option<f32>,
    pub scanlator: Option<String>,
    /// Upload time in epoch milliseconds, `0` when unknown.
    pub date_upload: i64,
}

impl Chapter {
    #[must_use]
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One image of a chapter.
///
/// Either `image_url` is already known, or `url` points at a document from
/// which the image URL is resolved with a second request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub index: usize,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl Page {
    /// A page whose image URL is embedded in the page list response.
    #[must_use]
    pub fn with_image(index: usize, image_url: impl Into<String>) -> Self {
        Self {
            index,
            url: None,
            image_url: Some(image_url.into()),
        }
    }

    /// A page whose image URL has to be resolved from `url`.
    #[must_use]
    pub fn deferred(index: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            url: Some(url.into()),
            image_url: None,
        }
    }
}

/// One page of a listing (popular, latest or search).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MangasPage {
    pub mangas: Vec<Manga>,
    pub has_next_page: bool,
}

impl MangasPage {
    #[must_use]
    pub fn new(mangas: Vec<Manga>, has_next_page: bool) -> Self {
        Self {
            mangas,
            has_next_page,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_display_joins_with_comma() {
        let mut manga = Manga::new("/manga/a/", "A");
        manga.genre = vec!["Action".to_string(), "Fantasy".to_string()];
        assert_eq!(manga.genre_display(), "Action, Fantasy");
    }

    #[test]
    fn test_manga_status_defaults_to_unknown() {
        assert_eq!(MangaStatus::default(), MangaStatus::Unknown);
        assert_eq!(Manga::default().status.as_str(), "unknown");
    }

    #[test]
    fn test_page_constructors() {
        let page = Page::with_image(0, "https://cdn.example.com/1.jpg");
        assert_eq!(page.image_url.as_deref(), Some("https://cdn.example.com/1.jpg"));
        assert!(page.url.is_none());

        let page = Page::deferred(3, "https://example.com/reader/3");
        assert_eq!(page.index, 3);
        assert!(page.image_url.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&MangaStatus::OnHiatus).unwrap();
        assert_eq!(json, "\"on_hiatus\"");
    }
}
