use super::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_against(server: &MockServer, max_retries: u32) -> (MarketClient, String) {
    let client = MarketClient::new(5, "dealhawk-test/0.1", max_retries, 0)
        .expect("client should build");
    (client, format!("{}/s", server.uri()))
}

#[tokio::test]
async fn fetch_page_returns_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>results</html>"))
        .mount(&server)
        .await;

    let (client, url) = client_against(&server, 0).await;
    let body = client.fetch_page(&url).await.expect("fetch should succeed");
    assert_eq!(body, "<html>results</html>");
}

#[tokio::test]
async fn captcha_body_is_a_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>Enter the characters you see below</html>"),
        )
        .mount(&server)
        .await;

    let (client, url) = client_against(&server, 3).await;
    let err = client.fetch_page(&url).await.expect_err("expected error");
    assert!(matches!(err, ScraperError::CaptchaChallenge { .. }));
}

#[tokio::test]
async fn not_found_is_typed_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (client, url) = client_against(&server, 3).await;
    let err = client.fetch_page(&url).await.expect_err("expected error");
    assert!(matches!(err, ScraperError::NotFound { .. }));
}

#[tokio::test]
async fn rate_limit_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let (client, url) = client_against(&server, 3).await;
    let body = client.fetch_page(&url).await.expect("fetch should succeed");
    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn rate_limit_reads_retry_after_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
        .mount(&server)
        .await;

    let (client, url) = client_against(&server, 0).await;
    let err = client.fetch_page(&url).await.expect_err("expected error");
    match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => assert_eq!(retry_after_secs, 17),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_typed_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (client, url) = client_against(&server, 0).await;
    let err = client.fetch_page(&url).await.expect_err("expected error");
    match err {
        ScraperError::UnexpectedStatus { status, .. } => assert_eq!(status, 503),
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}
