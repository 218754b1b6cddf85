//! Integration tests for Madara deployments against a mock site.
//!
//! Covers the chapter retrieval chain (inline list, legacy and Ajax
//! transports, `load_chapters` paging), listings and deep links.

use manga_sources::sources::{first_kiss_dash_manga, mangas_no_sekai, mhscans};
use manga_sources::{Chapter, Manga, Source, SourceError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;
use support::unthrottled_client;

const ADMIN_AJAX: &str = "/wp-admin/admin-ajax.php";

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

fn load_chapters_page(chapters: &[(&str, &str)]) -> String {
    chapters
        .iter()
        .map(|(slug, name)| {
            format!(
                r#"<div class="wp-manga-chapter"><a href="/manganews/solo/{slug}/">
                    <div class="text-sm">{name}</div></a><time>2 days ago</time></div>"#
            )
        })
        .collect()
}

#[tokio::test]
async fn test_fallback_pages_until_empty_and_concatenates() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/manganews/solo/"))
        .respond_with(html(
            r#"<div class="tab-summary"><script>var manga_id = 42;</script></div>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/manganews/solo/ajax/chapters/"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(html(""))
        .expect(1)
        .mount(&server)
        .await;
    for (page, body) in [
        (1, load_chapters_page(&[("capitulo-3", "Capítulo 3"), ("capitulo-2", "Capítulo 2")])),
        (2, load_chapters_page(&[("capitulo-1", "Capítulo 1")])),
        (3, String::new()),
    ] {
        Mock::given(method("POST"))
            .and(path(ADMIN_AJAX))
            .and(body_string_contains("action=load_chapters"))
            .and(body_string_contains("mangaid=42"))
            .and(body_string_contains(format!("page={page}")))
            .respond_with(html(&body))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path(ADMIN_AJAX))
        .and(body_string_contains("action=manga_views"))
        .and(body_string_contains("manga=42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let source = mangas_no_sekai::with_base_url(&server.uri());
    let client = unthrottled_client();
    let chapters = source
        .fetch_chapter_list(&client, &Manga::new("/manganews/solo/", "Solo"))
        .await
        .expect("fallback should produce chapters");

    let urls: Vec<&str> = chapters.iter().map(|chapter| chapter.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "/manganews/solo/capitulo-3/",
            "/manganews/solo/capitulo-2/",
            "/manganews/solo/capitulo-1/",
        ]
    );
    assert_eq!(chapters[2].name, "Capítulo 1");
    assert!(chapters.iter().all(|chapter| chapter.date_upload > 0));
}

#[tokio::test]
async fn test_fallback_without_manga_id_is_extraction_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/manganews/solo/"))
        .respond_with(html(r#"<div class="tab-summary"><script>var x = 1;</script></div>"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/manganews/solo/ajax/chapters/"))
        .respond_with(html(""))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADMIN_AJAX))
        .and(body_string_contains("action=load_chapters"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let source = mangas_no_sekai::with_base_url(&server.uri());
    let err = source
        .fetch_chapter_list(&unthrottled_client(), &Manga::new("/manganews/solo/", "Solo"))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Extraction { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_ajax_transport_result_skips_fallback() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/manga/tower/"))
        .respond_with(html(r#"<div class="tab-summary"><script>var manga_id = 9;</script></div>"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/manga/tower/ajax/chapters/"))
        .respond_with(html(
            r#"<ul><li class="wp-manga-chapter"><a href="/manga/tower/capitulo-2/">Capítulo 2</a>
                   <span class="chapter-release-date"><i>05 de diciembre de 2023</i></span></li>
               <li class="wp-manga-chapter"><a href="/manga/tower/capitulo-1/">Capítulo 1</a></li></ul>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADMIN_AJAX))
        .and(body_string_contains("action=load_chapters"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let source = mhscans::with_base_url(&server.uri());
    let chapters = source
        .fetch_chapter_list(&unthrottled_client(), &Manga::new("/manga/tower/", "Tower"))
        .await
        .expect("ajax chapters");
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].url, "/manga/tower/capitulo-2/?style=list");
    assert_eq!(chapters[0].date_upload, 1_701_734_400_000);
    assert_eq!(chapters[1].date_upload, 0);
}

#[tokio::test]
async fn test_legacy_transport_posts_holder_id() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/manga/kiss/"))
        .respond_with(html(r#"<div id="manga-chapters-holder" data-id="77"></div>"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADMIN_AJAX))
        .and(body_string_contains("action=manga_get_chapters"))
        .and(body_string_contains("manga=77"))
        .respond_with(html(
            r#"<li class="wp-manga-chapter"><a href="/manga/kiss/chapter-1/">Chapter 1</a>
                 <span class="chapter-release-date"><i>January 1st, 2024</i></span></li>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADMIN_AJAX))
        .and(body_string_contains("action=manga_views"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let source = first_kiss_dash_manga::with_base_url(&server.uri());
    let chapters = source
        .fetch_chapter_list(&unthrottled_client(), &Manga::new("/manga/kiss/", "Kiss"))
        .await
        .expect("a failed view count must not fail the chapter list");
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].name, "Chapter 1");
    assert_eq!(chapters[0].date_upload, 1_704_067_200_000);
}

#[tokio::test]
async fn test_legacy_page_without_holder_is_parse_error() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/manga/kiss/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html><body>Not Found</body></html>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADMIN_AJAX))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let source = first_kiss_dash_manga::with_base_url(&server.uri());
    let err = source
        .fetch_chapter_list(&unthrottled_client(), &Manga::new("/manga/kiss/", "Kiss"))
        .await
        .unwrap_err();
    assert_eq!(err, SourceError::missing("div[id^=manga-chapters-holder]"));
}

#[tokio::test]
async fn test_inline_chapters_need_no_second_request() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/manga/kiss/"))
        .respond_with(html(
            r#"<div id="manga-chapters-holder" data-id="77"><ul>
                 <li class="wp-manga-chapter"><a href="/manga/kiss/chapter-2/">Chapter 2</a></li>
                 <li class="wp-manga-chapter"><a href="/manga/kiss/chapter-1/">Chapter 1</a></li>
               </ul></div>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADMIN_AJAX))
        .and(body_string_contains("action=manga_get_chapters"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ADMIN_AJAX))
        .and(body_string_contains("action=manga_views"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let source = first_kiss_dash_manga::with_base_url(&server.uri());
    let chapters = source
        .fetch_chapter_list(&unthrottled_client(), &Manga::new("/manga/kiss/", "Kiss"))
        .await
        .expect("inline chapters");
    assert_eq!(chapters.len(), 2);
}

#[tokio::test]
async fn test_mhscans_popular_uses_load_more() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("POST"))
        .and(path(ADMIN_AJAX))
        .and(body_string_contains("action=madara_load_more"))
        .and(body_string_contains("page=1"))
        .respond_with(html(
            r#"<div class="page-item-detail"><div class="post-title"><h3>
                 <a href="/manga/tower/">Tower</a></h3></div></div>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let source = mhscans::with_base_url(&server.uri());
    let page = source
        .fetch_popular_manga(&unthrottled_client(), 2)
        .await
        .expect("popular");
    assert_eq!(page.mangas.len(), 1);
    assert_eq!(page.mangas[0].title, "Tower");
    assert!(page.has_next_page);
}

#[tokio::test]
async fn test_slug_deep_link_returns_single_manga() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/manga/solo-leveling/"))
        .respond_with(html(
            r#"<div class="post-title"><h1>Solo Leveling</h1></div>
               <div class="post-status"><div class="summary-content">OnGoing</div></div>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let source = first_kiss_dash_manga::with_base_url(&server.uri());
    let page = source
        .fetch_search_manga(
            &unthrottled_client(),
            1,
            "slug:solo-leveling",
            &source.filters(),
        )
        .await
        .expect("deep link");
    assert!(!page.has_next_page);
    assert_eq!(page.mangas.len(), 1);
    assert_eq!(page.mangas[0].url, "/manga/solo-leveling/");
    assert_eq!(page.mangas[0].title, "Solo Leveling");
}

#[tokio::test]
async fn test_page_list_and_image_resolution() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/manga/kiss/chapter-1/"))
        .respond_with(html(
            r#"<div class="reading-content">
                 <div class="page-break"><img data-src="/img/1.jpg"></div>
                 <div class="page-break"><img src="/img/2.jpg"></div>
               </div>"#,
        ))
        .mount(&server)
        .await;

    let source = first_kiss_dash_manga::with_base_url(&server.uri());
    let client = unthrottled_client();
    let pages = source
        .fetch_page_list(&client, &Chapter::new("/manga/kiss/chapter-1/?style=list", "Chapter 1"))
        .await
        .expect("pages");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].index, 1);
    let image = source.fetch_image_url(&client, &pages[0]).await.expect("image");
    assert_eq!(image, format!("{}/img/1.jpg", server.uri()));
}
