//! Integration tests for pixiv-inline
//!
//! These tests run the whole inline pipeline against a mock server standing in
//! for the pixiv OAuth endpoint, the App API and the image reverse proxy.

use mockito::{Matcher, Mock, ServerGuard};
use pixiv_inline::config::Config;
use pixiv_inline::inline::{EmptyReason, QueryStage, MAX_PAGES};
use pixiv_inline::InlineHandler;

const ILLUST_ID: &str = "61198649";
const ORIGINAL_PATH: &str = "/img-original/img/2017/02/08/00/00/07/61198649_p0.jpg";
const LARGE_PATH: &str = "/c/600x1200_90/img-master/img/2017/02/08/00/00/07/61198649_p0_master1200.jpg";

/// Configuration pointing every upstream at the mock server
fn config_for(server: &ServerGuard) -> Config {
    let mut config = Config::template();
    config.telegram.bot_token = "123:abc".to_string();
    config.pixiv.refresh_token = "rtoken".to_string();
    config.pixiv.client_id = "cid".to_string();
    config.pixiv.client_secret = "csecret".to_string();
    config.pixiv.oauth_base_url = server.url();
    config.pixiv.api_base_url = format!("{}/v1", server.url());
    config.pixiv.reverse_proxy_url = Some(format!("{}/", server.url()));
    config
}

fn handler_for(server: &ServerGuard) -> InlineHandler {
    let config = config_for(server);
    config.validate().unwrap();
    InlineHandler::from_config(&config).unwrap()
}

async fn mock_token(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("POST", "/auth/token")
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "bearer-123", "expires_in": 3600}"#)
        .expect(hits)
        .create_async()
        .await
}

fn page_json(index: usize) -> String {
    format!(
        r#"{{"image_urls": {{
            "square_medium": "https://i.pximg.net/c/360x360_70/img-master/img/2017/02/08/00/00/07/{id}_p{i}_square1200.jpg",
            "medium": "https://i.pximg.net/c/540x540_70/img-master/img/2017/02/08/00/00/07/{id}_p{i}_master1200.jpg",
            "large": "https://i.pximg.net/c/600x1200_90/img-master/img/2017/02/08/00/00/07/{id}_p{i}_master1200.jpg",
            "original": "https://i.pximg.net/img-original/img/2017/02/08/00/00/07/{id}_p{i}.jpg"
        }}}}"#,
        id = ILLUST_ID,
        i = index
    )
}

fn detail_json(page_count: usize) -> String {
    let (single_original, meta_pages) = if page_count == 1 {
        (
            format!(
                r#"{{"original_image_url": "https://i.pximg.net{}"}}"#,
                ORIGINAL_PATH
            ),
            "[]".to_string(),
        )
    } else {
        let pages: Vec<String> = (0..page_count).map(page_json).collect();
        ("{}".to_string(), format!("[{}]", pages.join(",")))
    };

    format!(
        r#"{{"illust": {{
            "id": {id},
            "title": "Evening <Glow>",
            "caption": "Drawn for the event<br />Thanks <a href=\"https://twitter.com/x\" target=\"_blank\" rel=\"noopener\">x</a>",
            "width": 1200,
            "height": 1600,
            "page_count": {count},
            "user": {{"id": 1234, "name": "Test Artist", "account": "artist"}},
            "image_urls": {{
                "square_medium": "https://i.pximg.net/c/360x360_70/img-master/img/2017/02/08/00/00/07/{id}_p0_square1200.jpg",
                "medium": "https://i.pximg.net/c/540x540_70/img-master/img/2017/02/08/00/00/07/{id}_p0_master1200.jpg",
                "large": "https://i.pximg.net{large}"
            }},
            "meta_single_page": {single},
            "meta_pages": {pages}
        }}}}"#,
        id = ILLUST_ID,
        count = page_count,
        large = LARGE_PATH,
        single = single_original,
        pages = meta_pages
    )
}

async fn mock_detail(server: &mut ServerGuard, page_count: usize) -> Mock {
    server
        .mock("GET", "/v1/illust/detail")
        .match_query(Matcher::UrlEncoded("illust_id".into(), ILLUST_ID.into()))
        .match_header("authorization", "Bearer bearer-123")
        .with_header("content-type", "application/json")
        .with_body(detail_json(page_count))
        .create_async()
        .await
}

async fn mock_original(server: &mut ServerGuard, content_type: &str, size: u64) -> Mock {
    server
        .mock("HEAD", Matcher::Regex(r"^/img-original/".to_string()))
        .match_header("referer", "https://www.pixiv.net/")
        .with_header("content-type", content_type)
        .with_header("content-length", &size.to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_single_page_jpeg_original() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let _detail = mock_detail(&mut server, 1).await;
    let _head = mock_original(&mut server, "image/jpeg", 2_000_000).await;

    let outcome = handler_for(&server)
        .answer("https://www.pixiv.net/en/artworks/61198649")
        .await;

    assert_eq!(outcome.stage, QueryStage::Replied);
    assert_eq!(outcome.results.len(), 1);

    let item = &outcome.results[0];
    assert_eq!(item.id, "61198649_0");
    assert_eq!(item.photo_url, format!("{}{}", server.url(), ORIGINAL_PATH));
    assert!(item.thumbnail_url.starts_with(&server.url()));
    assert_eq!((item.width, item.height), (1200, 1600));
    assert_eq!(
        item.caption_html,
        "Evening &lt;Glow&gt; by <a href=\"https://www.pixiv.net/users/1234\">Test Artist</a>\n\
         https://www.pixiv.net/artworks/61198649\n\
         Drawn for the event\nThanks <a href=\"https://twitter.com/x\">x</a>"
    );
}

#[tokio::test]
async fn test_png_original_falls_back_to_large() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let _detail = mock_detail(&mut server, 1).await;
    let _head = mock_original(&mut server, "image/png", 2_000_000).await;

    let outcome = handler_for(&server).answer(ILLUST_ID).await;

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(
        outcome.results[0].photo_url,
        format!("{}{}", server.url(), LARGE_PATH)
    );
}

#[tokio::test]
async fn test_oversized_original_falls_back_to_large() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let _detail = mock_detail(&mut server, 1).await;
    let _head = mock_original(&mut server, "image/jpeg", 5_000_001).await;

    let outcome = handler_for(&server)
        .answer("https://www.pixiv.net/member_illust.php?mode=medium&illust_id=61198649")
        .await;

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(
        outcome.results[0].photo_url,
        format!("{}{}", server.url(), LARGE_PATH)
    );
}

#[tokio::test]
async fn test_not_a_pixiv_link_makes_no_upstream_calls() {
    let mut server = mockito::Server::new_async().await;
    let token = mock_token(&mut server, 0).await;
    let detail = server
        .mock("GET", "/v1/illust/detail")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let outcome = handler_for(&server).answer("not a pixiv link").await;

    assert_eq!(outcome.stage, QueryStage::RepliedEmpty(EmptyReason::NoIllustId));
    assert!(outcome.results.is_empty());
    token.assert_async().await;
    detail.assert_async().await;
}

#[tokio::test]
async fn test_error_envelope_replies_empty() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let _detail = server
        .mock("GET", "/v1/illust/detail")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"user_message": "The page does not exist.", "message": "", "reason": "", "user_message_details": {}}}"#)
        .create_async()
        .await;

    let outcome = handler_for(&server).answer(ILLUST_ID).await;

    assert_eq!(outcome.stage, QueryStage::RepliedEmpty(EmptyReason::FetchFailed));
    assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn test_failed_refresh_replies_empty() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/auth/token")
        .with_status(400)
        .with_body(r#"{"has_error": true, "errors": {"system": {"message": "Invalid refresh token"}}}"#)
        .create_async()
        .await;

    let outcome = handler_for(&server).answer(ILLUST_ID).await;

    assert_eq!(outcome.stage, QueryStage::RepliedEmpty(EmptyReason::FetchFailed));
}

#[tokio::test]
async fn test_twenty_pages_capped_at_eight() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let _detail = mock_detail(&mut server, 20).await;
    let head = server
        .mock("HEAD", Matcher::Regex(r"^/img-original/".to_string()))
        .with_header("content-type", "image/jpeg")
        .with_header("content-length", "1000000")
        .expect(MAX_PAGES)
        .create_async()
        .await;

    let outcome = handler_for(&server).answer(ILLUST_ID).await;

    assert_eq!(outcome.results.len(), MAX_PAGES);
    for (index, item) in outcome.results.iter().enumerate() {
        assert_eq!(item.id, format!("61198649_{}", index));
        assert!(item.photo_url.ends_with(&format!("61198649_p{}.jpg", index)));
        assert!(item.caption_html.contains(&format!("[{}/20]", index + 1)));
    }

    let last = &outcome.results[MAX_PAGES - 1];
    assert!(last.caption_html.contains("12 more pages are only available on pixiv."));
    assert!(outcome.results[..MAX_PAGES - 1]
        .iter()
        .all(|item| !item.caption_html.contains("more pages")));

    head.assert_async().await;
}

#[tokio::test]
async fn test_three_pages_not_annotated_as_capped() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let _detail = mock_detail(&mut server, 3).await;
    let _head = mock_original(&mut server, "image/jpeg", 1_000_000).await;

    let outcome = handler_for(&server).answer(ILLUST_ID).await;

    assert_eq!(outcome.results.len(), 3);
    assert!(outcome
        .results
        .iter()
        .all(|item| !item.caption_html.contains("more pages")));

    // Range reads are not mocked, so only page 0 has known dimensions.
    assert_eq!((outcome.results[0].width, outcome.results[0].height), (1200, 1600));
    assert_eq!(outcome.results[2].width, pixiv_inline::inline::SENTINEL_DIMENSION);
}

#[tokio::test]
async fn test_token_reused_across_queries() {
    let mut server = mockito::Server::new_async().await;
    let token = mock_token(&mut server, 1).await;
    let _detail = mock_detail(&mut server, 1).await;
    let _head = mock_original(&mut server, "image/jpeg", 2_000_000).await;

    let handler = handler_for(&server);
    let first = handler.answer(ILLUST_ID).await;
    let second = handler
        .answer("https://www.pixiv.net/artworks/61198649")
        .await;

    assert_eq!(first, second);
    token.assert_async().await;
}
