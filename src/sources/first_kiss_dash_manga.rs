//! 1st Kiss-Manga (unoriginal) (`en`). A stock Madara deployment using the
//! legacy `manga_get_chapters` transport.

use crate::madara::{ChapterTransport, Madara, MadaraConfig};

pub const BASE_URL: &str = "https://1st-kissmanga.online";

#[must_use]
pub fn source() -> Madara {
    with_base_url(BASE_URL)
}

#[must_use]
pub fn with_base_url(base_url: &str) -> Madara {
    let mut config = MadaraConfig::new(
        "firstkissdashmanga",
        "1st Kiss-Manga (unoriginal)",
        base_url,
        "en",
    );
    config.chapter_transport = ChapterTransport::Legacy;
    Madara::new(config)
}
