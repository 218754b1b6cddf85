//! JSON shapes returned by the SlimeRead API.

use serde::Deserialize;

use crate::model::{Manga, MangaStatus};
use crate::pagination::ApiPage;

/// Host serving chapter images; page entries carry paths relative to it.
pub const IMAGE_HOST: &str = "https://objects.slimeread.com";

/// Listing entry (ranking, latest and search).
#[derive(Debug, Clone, Deserialize)]
pub struct BookDto {
    pub book_id: u64,
    pub book_name_original: String,
    #[serde(default)]
    pub book_image: Option<String>,
}

impl BookDto {
    #[must_use]
    pub fn into_manga(self) -> Manga {
        let mut manga = Manga::new(book_path(self.book_id), self.book_name_original);
        manga.thumbnail_url = self.book_image.filter(|image| !image.is_empty());
        manga
    }
}

/// `/books?page=N` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestResponseDto {
    #[serde(flatten)]
    pub page: ApiPage,
    pub data: Vec<BookDto>,
}

/// `/book/{id}` document.
#[derive(Debug, Clone, Deserialize)]
pub struct BookInfoDto {
    pub book_id: u64,
    pub book_name_original: String,
    #[serde(default)]
    pub book_image: Option<String>,
    #[serde(default)]
    pub book_synopsis: Option<String>,
    #[serde(default)]
    pub book_status: i32,
    #[serde(default)]
    pub book_categories: Vec<CategoryDto>,
}

impl BookInfoDto {
    #[must_use]
    pub fn into_manga(self) -> Manga {
        let mut manga = Manga::new(book_path(self.book_id), self.book_name_original);
        manga.thumbnail_url = self.book_image.filter(|image| !image.is_empty());
        manga.description = self.book_synopsis.filter(|synopsis| !synopsis.trim().is_empty());
        manga.status = status_from_code(self.book_status);
        for category in self.book_categories {
            let name = category.categories.name;
            if !name.is_empty() && !manga.genre.contains(&name) {
                manga.genre.push(name);
            }
        }
        manga
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDto {
    pub categories: CategoryNameDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryNameDto {
    #[serde(rename = "cat_name_ptBR")]
    pub name: String,
}

/// One entry of `/book_cap_units_all`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterDto {
    pub btc_cap: f32,
    #[serde(default)]
    pub scan: Option<ScanDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanDto {
    #[serde(default)]
    pub scan_name: Option<String>,
}

/// One entry of `/book_cap_units`; a chapter may be split over several.
#[derive(Debug, Clone, Deserialize)]
pub struct PageListDto {
    #[serde(rename = "book_temp_caps")]
    pub pages: Vec<PageDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageDto {
    #[serde(rename = "btcu_image")]
    pub path: String,
}

impl PageDto {
    /// Absolute image URL.
    #[must_use]
    pub fn url(&self) -> String {
        if self.path.starts_with("http://") || self.path.starts_with("https://") {
            self.path.clone()
        } else {
            format!("{IMAGE_HOST}/{}", self.path.trim_start_matches('/'))
        }
    }
}

/// Site-relative identifier of a book.
#[must_use]
pub fn book_path(id: impl std::fmt::Display) -> String {
    format!("/book/{id}")
}

/// Maps the API's numeric status.
#[must_use]
pub fn status_from_code(code: i32) -> MangaStatus {
    match code {
        1 => MangaStatus::Ongoing,
        2 => MangaStatus::Completed,
        3 | 4 => MangaStatus::Cancelled,
        5 => MangaStatus::OnHiatus,
        _ => MangaStatus::Unknown,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(status_from_code(1), MangaStatus::Ongoing);
        assert_eq!(status_from_code(2), MangaStatus::Completed);
        assert_eq!(status_from_code(3), MangaStatus::Cancelled);
        assert_eq!(status_from_code(4), MangaStatus::Cancelled);
        assert_eq!(status_from_code(5), MangaStatus::OnHiatus);
        assert_eq!(status_from_code(0), MangaStatus::Unknown);
        assert_eq!(status_from_code(9), MangaStatus::Unknown);
    }

    #[test]
    fn test_latest_envelope_flattens_page_info() {
        let dto: LatestResponseDto = serde_json::from_str(
            r#"{"page":1,"pages":3,"data":[{"book_id":7,"book_name_original":"Slime","book_image":null}]}"#,
        )
        .unwrap();
        assert!(dto.page.has_next());
        assert_eq!(dto.data.len(), 1);
        let manga = dto.data.into_iter().next().unwrap().into_manga();
        assert_eq!(manga.url, "/book/7");
        assert_eq!(manga.thumbnail_url, None);
    }

    #[test]
    fn test_book_info_categories_keep_order() {
        let dto: BookInfoDto = serde_json::from_str(
            r#"{"book_id":3,"book_name_original":"Tensei","book_status":5,
                "book_synopsis":"  ",
                "book_categories":[
                    {"categories":{"cat_name_ptBR":"Ação"}},
                    {"categories":{"cat_name_ptBR":"Fantasia"}},
                    {"categories":{"cat_name_ptBR":"Ação"}}]}"#,
        )
        .unwrap();
        let manga = dto.into_manga();
        assert_eq!(manga.genre, vec!["Ação", "Fantasia"]);
        assert_eq!(manga.status, MangaStatus::OnHiatus);
        assert_eq!(manga.description, None);
    }

    #[test]
    fn test_page_url_prefixes_relative_paths() {
        let relative = PageDto {
            path: "/caps/1/01.jpg".to_string(),
        };
        assert_eq!(relative.url(), "https://objects.slimeread.com/caps/1/01.jpg");
        let absolute = PageDto {
            path: "https://cdn.test/01.jpg".to_string(),
        };
        assert_eq!(absolute.url(), "https://cdn.test/01.jpg");
    }
}
